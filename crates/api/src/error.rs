//! The top-level error façade, composing every subsystem's error enum behind
//! one `CoordinatorError` the way `ioi_api::error` re-exports and aggregates
//! the kernel's per-subsystem errors.

use settld_types::{ErrorClass, ErrorCode};
use thiserror::Error;

/// Errors raised directly by the Store port (spec §4.2) rather than by a
/// specific aggregate's reducer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested row was not present.
    #[error("not found: {0}")]
    NotFound(String),
    /// A `commitTx` op list referenced an unknown or mistyped filter/op.
    #[error("schema invalid: {0}")]
    SchemaInvalid(String),
    /// An optimistic-concurrency precondition failed (`expectedPrevChainHash`
    /// mismatch, duplicate unique key, etc.).
    #[error("conflict: {0}")]
    Conflict(String),
    /// The underlying backend failed for a reason outside this port's
    /// control (disk, serialization).
    #[error("backend error: {0}")]
    Backend(String),
}

impl ErrorCode for StoreError {
    fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "STORE_NOT_FOUND",
            StoreError::SchemaInvalid(_) => "SCHEMA_INVALID",
            StoreError::Conflict(_) => "STORE_CONFLICT",
            StoreError::Backend(_) => "STORE_BACKEND_ERROR",
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            StoreError::NotFound(_) => ErrorClass::Precondition,
            StoreError::SchemaInvalid(_) => ErrorClass::Schema,
            StoreError::Conflict(_) => ErrorClass::Conflict,
            StoreError::Backend(_) => ErrorClass::Fatal,
        }
    }
}

/// The façade error every handler ultimately returns. Each subsystem crate
/// owns its own `thiserror` enum (spec §7's taxonomy applied per component);
/// this composes them with `#[from]` the same way `ioi_types::error`'s
/// `ChainError`/`CoreError` compose `StateError`/`BlockError`/etc.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("codec error: {0}")]
    Codec(#[from] settld_codec::CodecError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ErrorCode for CoordinatorError {
    fn code(&self) -> &'static str {
        match self {
            CoordinatorError::Store(e) => e.code(),
            CoordinatorError::Codec(e) => e.code(),
            CoordinatorError::Other(_) => "COORDINATOR_INTERNAL_ERROR",
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            CoordinatorError::Store(e) => e.class(),
            CoordinatorError::Codec(_) => ErrorClass::Integrity,
            CoordinatorError::Other(_) => ErrorClass::Fatal,
        }
    }
}
