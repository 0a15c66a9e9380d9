//! Billing/subscriptions error catalog (spec §4.10).

use settld_types::{ErrorClass, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("webhook signature header is missing")]
    WebhookSignatureMissing,

    #[error("webhook signature does not match the computed HMAC")]
    WebhookSignatureMismatch,

    #[error("webhook timestamp {ts} is outside the tolerance window of {tolerance_seconds}s")]
    WebhookTimestampOutOfTolerance { ts: i64, tolerance_seconds: i64 },

    #[error("webhook timestamp header is malformed: {0}")]
    WebhookTimestampMalformed(String),

    #[error("no plan is registered for priceId '{0}'")]
    PlanNotFound(String),

    #[error("circuit breaker for '{0}' is open")]
    CircuitOpen(String),

    #[error("dead-letter entry '{0}' not found")]
    DeadLetterNotFound(String),

    #[error("dead-letter entry '{0}' is not marked replayable")]
    DeadLetterNotReplayable(String),

    #[error("codec error: {0}")]
    Codec(#[from] settld_codec::CodecError),
}

impl ErrorCode for BillingError {
    fn code(&self) -> &'static str {
        match self {
            BillingError::WebhookSignatureMissing => "BILLING_WEBHOOK_SIGNATURE_MISSING",
            BillingError::WebhookSignatureMismatch => "BILLING_WEBHOOK_SIGNATURE_MISMATCH",
            BillingError::WebhookTimestampOutOfTolerance { .. } => {
                "BILLING_WEBHOOK_TIMESTAMP_OUT_OF_TOLERANCE"
            }
            BillingError::WebhookTimestampMalformed(_) => "BILLING_WEBHOOK_TIMESTAMP_MALFORMED",
            BillingError::PlanNotFound(_) => "BILLING_PLAN_NOT_FOUND",
            BillingError::CircuitOpen(_) => "BILLING_CIRCUIT_OPEN",
            BillingError::DeadLetterNotFound(_) => "BILLING_DEAD_LETTER_NOT_FOUND",
            BillingError::DeadLetterNotReplayable(_) => "BILLING_DEAD_LETTER_NOT_REPLAYABLE",
            BillingError::Codec(e) => e.code(),
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            BillingError::WebhookSignatureMissing | BillingError::WebhookSignatureMismatch => {
                ErrorClass::Auth
            }
            BillingError::WebhookTimestampOutOfTolerance { .. }
            | BillingError::WebhookTimestampMalformed(_) => ErrorClass::Schema,
            BillingError::PlanNotFound(_) => ErrorClass::Precondition,
            BillingError::CircuitOpen(_) => ErrorClass::Upstream,
            BillingError::DeadLetterNotFound(_) => ErrorClass::Precondition,
            BillingError::DeadLetterNotReplayable(_) => ErrorClass::Conflict,
            BillingError::Codec(_) => ErrorClass::Integrity,
        }
    }
}
