use settld_api::SignerLifecycleOutcome;
use settld_types::{ErrorClass, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KernelError {
    /// `expectedPrevChainHash` did not match the stream head (spec §4.3 (b)).
    #[error("expectedPrevChainHash mismatch: expected {expected:?}, got {actual:?}")]
    ChainConflict {
        expected: Option<String>,
        actual: Option<String>,
    },

    /// The route declares the event chain-sensitive but no
    /// `expectedPrevChainHash` was supplied (HTTP 428 per spec §4.3 (b)).
    #[error("missing expectedPrevChainHash for a chain-sensitive append")]
    MissingPrecondition,

    /// A replay of `(tenantId, idempotencyKey, routeBindingHash)` arrived
    /// with a different body than the original (spec §8).
    #[error("idempotency key reused with a different request body")]
    IdempotencyConflict,

    /// The signer key was not in an `active` lifecycle state at `at` (spec
    /// §4.3 (c)); `reason` is one of `SIGNER_KEY_{ROTATED,REVOKED,
    /// NOT_YET_VALID,EXPIRED,NOT_REGISTERED,NOT_ACTIVE}`.
    #[error("signer key lifecycle check failed: {0:?}")]
    SignerLifecycle(SignerLifecycleOutcome),

    /// A stored event's payload no longer validates against its declared
    /// schema; reduction halts rather than skipping it (spec §4.3).
    #[error("stored event payload is invalid: {0}")]
    EventPayloadInvalid(String),

    #[error("store error: {0}")]
    Store(#[from] settld_api::StoreError),

    #[error("codec error: {0}")]
    Codec(#[from] settld_codec::CodecError),
}

impl ErrorCode for KernelError {
    fn code(&self) -> &'static str {
        match self {
            KernelError::ChainConflict { .. } => "CHAIN_CONFLICT",
            KernelError::MissingPrecondition => "MISSING_PRECONDITION",
            KernelError::IdempotencyConflict => "IDEMPOTENCY_CONFLICT",
            KernelError::SignerLifecycle(outcome) => outcome.reason_code(),
            KernelError::EventPayloadInvalid(_) => "EVENT_PAYLOAD_INVALID",
            KernelError::Store(e) => e.code(),
            KernelError::Codec(e) => e.code(),
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            KernelError::ChainConflict { .. } | KernelError::IdempotencyConflict => {
                ErrorClass::Conflict
            }
            KernelError::MissingPrecondition => ErrorClass::Precondition,
            KernelError::SignerLifecycle(_) => ErrorClass::Auth,
            KernelError::EventPayloadInvalid(_) => ErrorClass::Schema,
            KernelError::Store(e) => e.class(),
            KernelError::Codec(_) => ErrorClass::Integrity,
        }
    }
}
