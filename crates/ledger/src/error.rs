//! The ledger error catalog (spec §4.6, §3 "Invariants (global)").

use settld_types::{ErrorClass, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger entry {postings_summary} is not balanced for currency {currency}: debits {debits} != credits {credits}")]
    ZeroSumViolation {
        currency: String,
        debits: i64,
        credits: i64,
        postings_summary: String,
    },

    #[error("hold {0} not found")]
    HoldNotFound(String),

    #[error("hold {0} is not active")]
    HoldNotActive(String),

    #[error("release amountCents {release_cents} exceeds hold {hold_id}'s amountCents {hold_cents}")]
    ReleaseExceedsHold {
        hold_id: String,
        release_cents: i64,
        hold_cents: i64,
    },

    #[error("month close {0} was not found")]
    MonthCloseNotFound(String),

    #[error("month close {0} is already closed")]
    MonthCloseAlreadyClosed(String),

    #[error("month close {0} is not closed, cannot reopen")]
    MonthCloseNotClosed(String),

    #[error("period end {period_end} is not after period start {period_start}")]
    InvalidPeriod {
        period_start: String,
        period_end: String,
    },

    #[error("event payload failed validation: {0}")]
    EventPayloadInvalid(String),

    #[error("codec error: {0}")]
    Codec(#[from] settld_codec::CodecError),
}

impl ErrorCode for LedgerError {
    fn code(&self) -> &'static str {
        match self {
            LedgerError::ZeroSumViolation { .. } => "LEDGER_ZERO_SUM_VIOLATION",
            LedgerError::HoldNotFound(_) => "LEDGER_HOLD_NOT_FOUND",
            LedgerError::HoldNotActive(_) => "LEDGER_HOLD_NOT_ACTIVE",
            LedgerError::ReleaseExceedsHold { .. } => "LEDGER_RELEASE_EXCEEDS_HOLD",
            LedgerError::MonthCloseNotFound(_) => "LEDGER_MONTH_CLOSE_NOT_FOUND",
            LedgerError::MonthCloseAlreadyClosed(_) => "LEDGER_MONTH_CLOSE_ALREADY_CLOSED",
            LedgerError::MonthCloseNotClosed(_) => "LEDGER_MONTH_CLOSE_NOT_CLOSED",
            LedgerError::InvalidPeriod { .. } => "LEDGER_INVALID_PERIOD",
            LedgerError::EventPayloadInvalid(_) => "EVENT_PAYLOAD_INVALID",
            LedgerError::Codec(e) => e.code(),
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            LedgerError::ZeroSumViolation { .. } => ErrorClass::Integrity,
            LedgerError::HoldNotFound(_) | LedgerError::MonthCloseNotFound(_) => {
                ErrorClass::Precondition
            }
            LedgerError::HoldNotActive(_)
            | LedgerError::MonthCloseAlreadyClosed(_)
            | LedgerError::MonthCloseNotClosed(_) => ErrorClass::Conflict,
            LedgerError::ReleaseExceedsHold { .. } => ErrorClass::Precondition,
            LedgerError::InvalidPeriod { .. } => ErrorClass::Schema,
            LedgerError::EventPayloadInvalid(_) => ErrorClass::Schema,
            LedgerError::Codec(_) => ErrorClass::Integrity,
        }
    }
}
