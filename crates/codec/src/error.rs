//! Errors for canonicalization, hashing, and signing (spec §4.1).

use settld_types::{ErrorClass, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    /// A value contained a non-finite number (`NaN`/`Infinity`) or a cycle
    /// and cannot be canonicalized (spec §4.1).
    #[error("value is not canonicalizable: {0}")]
    NonCanonical(String),

    /// `serde_json` failed to serialize or deserialize the value at all.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A key, signature, or digest had the wrong byte length or was otherwise
    /// malformed.
    #[error("invalid cryptographic material: {0}")]
    InvalidMaterial(String),

    /// Signature verification did not pass.
    #[error("signature verification failed")]
    VerificationFailed,
}

impl ErrorCode for CodecError {
    fn code(&self) -> &'static str {
        match self {
            CodecError::NonCanonical(_) => "ENCODE_NON_CANONICAL",
            CodecError::Json(_) => "ENCODE_JSON_ERROR",
            CodecError::InvalidMaterial(_) => "CRYPTO_INVALID_MATERIAL",
            CodecError::VerificationFailed => "CRYPTO_VERIFICATION_FAILED",
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            CodecError::NonCanonical(_) | CodecError::Json(_) => ErrorClass::Schema,
            CodecError::InvalidMaterial(_) | CodecError::VerificationFailed => ErrorClass::Auth,
        }
    }
}
