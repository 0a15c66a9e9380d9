//! The signer-lifecycle seam the kernel consults when appending a signed
//! event (spec §4.3 step (c), §4.4). Lives here rather than in
//! `settld-identity` so the kernel crate can depend on this contract
//! without depending on the identity crate that implements it.

use settld_types::Timestamp;

/// The outcome of checking a signer key's lifecycle at a given instant
/// (spec §4.4 `evaluateSignerLifecycle`). Every non-OK variant carries the
/// exact stable reason code spec §4.3 enumerates, reused across every
/// caller rather than re-derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerLifecycleOutcome {
    Active,
    Rotated,
    Revoked,
    NotYetValid,
    Expired,
    NotRegistered,
    /// Registered, with a lifecycle status other than `active`/`rotated`/
    /// `revoked` that nonetheless isn't currently valid (defensive catch-all
    /// matching the source's `SIGNER_KEY_NOT_ACTIVE`).
    NotActive,
}

impl SignerLifecycleOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, SignerLifecycleOutcome::Active)
    }

    pub fn reason_code(&self) -> &'static str {
        match self {
            SignerLifecycleOutcome::Active => "SIGNER_KEY_ACTIVE",
            SignerLifecycleOutcome::Rotated => "SIGNER_KEY_ROTATED",
            SignerLifecycleOutcome::Revoked => "SIGNER_KEY_REVOKED",
            SignerLifecycleOutcome::NotYetValid => "SIGNER_KEY_NOT_YET_VALID",
            SignerLifecycleOutcome::Expired => "SIGNER_KEY_EXPIRED",
            SignerLifecycleOutcome::NotRegistered => "SIGNER_KEY_NOT_REGISTERED",
            SignerLifecycleOutcome::NotActive => "SIGNER_KEY_NOT_ACTIVE",
        }
    }
}

/// Resolves a registered signer key's verifying key and lifecycle status.
/// `settld-identity` implements this against its own `Agent`/signer-key
/// snapshots; `settld-kernel` depends only on the trait.
pub trait SignerRegistry: Send + Sync {
    /// The hex-encoded Ed25519 public key registered under `key_id`, if any.
    fn verifying_key_hex(&self, tenant_id: &settld_types::TenantId, key_id: &str) -> Option<String>;

    /// Evaluates the key's lifecycle at `at` (spec §4.4
    /// `evaluateSignerLifecycle(key, at)`).
    fn evaluate_lifecycle(
        &self,
        tenant_id: &settld_types::TenantId,
        key_id: &str,
        at: Timestamp,
    ) -> SignerLifecycleOutcome;
}
