//! Shared error taxonomy for the settlement coordinator.
//!
//! Every subsystem crate defines its own `thiserror`-derived error enum and
//! implements [`ErrorCode`] on it so callers can match on a stable string
//! rather than `Display` text (spec §6 "Error envelope", §7 "Error taxonomy").
//! This mirrors the teacher's `ioi_types::error` module, where each domain
//! error type carries its own `code()` impl instead of a single god-enum.

use std::fmt;

/// Assigns a stable, machine-readable string code to an error variant.
///
/// Codes are published (conceptually, per spec §6) alongside the SDK and
/// OpenAPI surface; they must never change once shipped, only gain new
/// variants.
pub trait ErrorCode {
    /// The unique, stable identifier for this error variant, e.g.
    /// `"X402_REQUEST_BINDING_EVIDENCE_REQUIRED"`.
    fn code(&self) -> &'static str;

    /// Which of the spec §7 error kinds this error belongs to, used to pick
    /// the equivalent HTTP status class in a (non-core) transport layer.
    fn class(&self) -> ErrorClass;
}

/// The error taxonomy from spec §7. Not HTTP status codes themselves —
/// a transport layer maps each class to a status — but the class a core
/// error belongs to is itself part of the stable contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Input fails canonical validation; no side effects occurred.
    Schema,
    /// Missing/invalid token, wrong scope, wrong tenant.
    Auth,
    /// Chain context missing or mismatched.
    Precondition,
    /// Idempotency mismatch, illegal state transition, agent lifecycle.
    Conflict,
    /// Grant/policy/prompt-risk denial.
    Policy,
    /// Binding-evidence required/mismatch.
    Integrity,
    /// Rail, signer, or webhook provider unreachable or erroring; retryable.
    Upstream,
    /// Invariant violated; the aggregate is refused further processing.
    Fatal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorClass::Schema => "schema",
            ErrorClass::Auth => "auth",
            ErrorClass::Precondition => "precondition",
            ErrorClass::Conflict => "conflict",
            ErrorClass::Policy => "policy",
            ErrorClass::Integrity => "integrity",
            ErrorClass::Upstream => "upstream",
            ErrorClass::Fatal => "fatal",
        };
        f.write_str(s)
    }
}
