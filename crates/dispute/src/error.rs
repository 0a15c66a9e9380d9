//! Dispute/arbitration error catalog (spec §4.9).

use settld_types::{ErrorClass, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DisputeError {
    #[error("dispute case {0} not found")]
    CaseNotFound(String),

    #[error("arbitration case {0} not found")]
    ArbitrationNotFound(String),

    #[error("dispute case {case_id} is in state {state}, which does not accept this transition")]
    IllegalStateTransition { case_id: String, state: String },

    #[error("gate {0} has not settled and cannot be disputed")]
    GateNotSettled(String),

    #[error("gate {gate_id}'s dispute window closed at {closed_at}")]
    DisputeWindowClosed { gate_id: String, closed_at: String },

    #[error("downstream action is missing bindingEvidence for gate {0}")]
    BindingEvidenceRequired(String),

    #[error("downstream action's bindingEvidence does not match gate {0}'s request binding")]
    BindingEvidenceMismatch(String),

    #[error("arbitration verdict must be 'uphold' or 'reverse', got '{0}'")]
    InvalidVerdict(String),

    #[error("event payload failed validation: {0}")]
    EventPayloadInvalid(String),

    #[error("x402 error: {0}")]
    X402(#[from] settld_x402::X402Error),

    #[error("codec error: {0}")]
    Codec(#[from] settld_codec::CodecError),
}

impl ErrorCode for DisputeError {
    fn code(&self) -> &'static str {
        match self {
            DisputeError::CaseNotFound(_) => "DISPUTE_CASE_NOT_FOUND",
            DisputeError::ArbitrationNotFound(_) => "ARBITRATION_CASE_NOT_FOUND",
            DisputeError::IllegalStateTransition { .. } => "DISPUTE_ILLEGAL_STATE_TRANSITION",
            DisputeError::GateNotSettled(_) => "DISPUTE_GATE_NOT_SETTLED",
            DisputeError::DisputeWindowClosed { .. } => "DISPUTE_WINDOW_CLOSED",
            DisputeError::BindingEvidenceRequired(_) => "DISPUTE_BINDING_EVIDENCE_REQUIRED",
            DisputeError::BindingEvidenceMismatch(_) => "DISPUTE_BINDING_EVIDENCE_MISMATCH",
            DisputeError::InvalidVerdict(_) => "ARBITRATION_INVALID_VERDICT",
            DisputeError::EventPayloadInvalid(_) => "EVENT_PAYLOAD_INVALID",
            DisputeError::X402(e) => e.code(),
            DisputeError::Codec(e) => e.code(),
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            DisputeError::CaseNotFound(_) | DisputeError::ArbitrationNotFound(_) => {
                ErrorClass::Precondition
            }
            DisputeError::IllegalStateTransition { .. } => ErrorClass::Conflict,
            DisputeError::GateNotSettled(_) => ErrorClass::Precondition,
            DisputeError::DisputeWindowClosed { .. } => ErrorClass::Policy,
            DisputeError::BindingEvidenceRequired(_) | DisputeError::BindingEvidenceMismatch(_) => {
                ErrorClass::Integrity
            }
            DisputeError::InvalidVerdict(_) => ErrorClass::Schema,
            DisputeError::EventPayloadInvalid(_) => ErrorClass::Schema,
            DisputeError::X402(e) => e.class(),
            DisputeError::Codec(_) => ErrorClass::Integrity,
        }
    }
}
