//! Money-rails error catalog (spec §4.7).

use settld_types::{ErrorClass, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MoneyRailsError {
    #[error("money rail operation {0} not found")]
    OperationNotFound(String),

    #[error("money rail operation {operation_id} is in state {state}, which does not accept this transition")]
    IllegalStateTransition {
        operation_id: String,
        state: String,
    },

    #[error("payout for party {party_id} blocked: outstanding chargeback exposure for provider {provider_id}")]
    PayoutBlockedOnChargebackExposure {
        party_id: String,
        provider_id: String,
    },

    #[error("triage row for key {0} not found")]
    TriageRowNotFound(String),

    #[error("event payload failed validation: {0}")]
    EventPayloadInvalid(String),

    #[error("codec error: {0}")]
    Codec(#[from] settld_codec::CodecError),
}

impl ErrorCode for MoneyRailsError {
    fn code(&self) -> &'static str {
        match self {
            MoneyRailsError::OperationNotFound(_) => "MONEY_RAILS_OPERATION_NOT_FOUND",
            MoneyRailsError::IllegalStateTransition { .. } => {
                "MONEY_RAILS_ILLEGAL_STATE_TRANSITION"
            }
            MoneyRailsError::PayoutBlockedOnChargebackExposure { .. } => {
                "MONEY_RAILS_PAYOUT_BLOCKED_ON_CHARGEBACK_EXPOSURE"
            }
            MoneyRailsError::TriageRowNotFound(_) => "MONEY_RAILS_TRIAGE_ROW_NOT_FOUND",
            MoneyRailsError::EventPayloadInvalid(_) => "EVENT_PAYLOAD_INVALID",
            MoneyRailsError::Codec(e) => e.code(),
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            MoneyRailsError::OperationNotFound(_) | MoneyRailsError::TriageRowNotFound(_) => {
                ErrorClass::Precondition
            }
            MoneyRailsError::IllegalStateTransition { .. } => ErrorClass::Conflict,
            MoneyRailsError::PayoutBlockedOnChargebackExposure { .. } => ErrorClass::Policy,
            MoneyRailsError::EventPayloadInvalid(_) => ErrorClass::Schema,
            MoneyRailsError::Codec(_) => ErrorClass::Integrity,
        }
    }
}
