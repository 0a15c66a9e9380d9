//! Signer-key lifecycle (spec §4.4): `{active, rotated, revoked}` plus a
//! validity window. `evaluate_signer_lifecycle` is the single reason-code
//! authority every caller (the kernel, x402 binding checks, artifact
//! verification) consults — never re-derived locally.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use settld_api::{SignerLifecycleOutcome, SignerRegistry};
use settld_types::{KeyId, TenantId, Timestamp};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerKeyStatus {
    Active,
    Rotated,
    Revoked,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignerKeyRecord {
    pub key_id: KeyId,
    pub public_key_hex: String,
    pub status: SignerKeyStatus,
    pub valid_from: Timestamp,
    /// `None` means the key has no declared expiry while `active`.
    pub valid_to: Option<Timestamp>,
}

/// Evaluates a signer key's lifecycle at `at` (spec §4.4
/// `evaluateSignerLifecycle(key, at)`): "returns `ok` only if status is
/// `active` and `notBefore ≤ at ≤ notAfter`".
pub fn evaluate_signer_lifecycle(record: &SignerKeyRecord, at: Timestamp) -> SignerLifecycleOutcome {
    if at < record.valid_from {
        return SignerLifecycleOutcome::NotYetValid;
    }
    if let Some(valid_to) = record.valid_to {
        if at > valid_to {
            return SignerLifecycleOutcome::Expired;
        }
    }
    match record.status {
        SignerKeyStatus::Active => SignerLifecycleOutcome::Active,
        SignerKeyStatus::Rotated => SignerLifecycleOutcome::Rotated,
        SignerKeyStatus::Revoked => SignerLifecycleOutcome::Revoked,
    }
}

/// A process-local registry of signer keys, keyed by `(tenantId, keyId)`.
/// Rebuildable from the `Agent`/governance event streams that register and
/// rotate keys — the teacher's "global mutable state is a per-process
/// singleton, rebuildable from storage" rule (spec §9) applies here exactly
/// as it does to the kernel's stream-lock map.
#[derive(Default)]
pub struct SignerKeyRegistry {
    keys: DashMap<(TenantId, String), SignerKeyRecord>,
}

impl SignerKeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tenant_id: &TenantId, record: SignerKeyRecord) {
        self.keys
            .insert((tenant_id.clone(), record.key_id.as_str().to_string()), record);
    }

    pub fn rotate(&self, tenant_id: &TenantId, key_id: &str) {
        if let Some(mut entry) = self.keys.get_mut(&(tenant_id.clone(), key_id.to_string())) {
            entry.status = SignerKeyStatus::Rotated;
        }
    }

    pub fn revoke(&self, tenant_id: &TenantId, key_id: &str) {
        if let Some(mut entry) = self.keys.get_mut(&(tenant_id.clone(), key_id.to_string())) {
            entry.status = SignerKeyStatus::Revoked;
        }
    }

    pub fn get(&self, tenant_id: &TenantId, key_id: &str) -> Option<SignerKeyRecord> {
        self.keys
            .get(&(tenant_id.clone(), key_id.to_string()))
            .map(|e| e.clone())
    }
}

impl SignerRegistry for SignerKeyRegistry {
    fn verifying_key_hex(&self, tenant_id: &TenantId, key_id: &str) -> Option<String> {
        self.get(tenant_id, key_id).map(|r| r.public_key_hex)
    }

    fn evaluate_lifecycle(
        &self,
        tenant_id: &TenantId,
        key_id: &str,
        at: Timestamp,
    ) -> SignerLifecycleOutcome {
        match self.get(tenant_id, key_id) {
            Some(record) => evaluate_signer_lifecycle(&record, at),
            None => SignerLifecycleOutcome::NotRegistered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant() -> TenantId {
        TenantId::default_tenant()
    }

    #[test]
    fn active_key_within_window_is_ok() {
        let registry = SignerKeyRegistry::new();
        registry.register(
            &tenant(),
            SignerKeyRecord {
                key_id: KeyId::from("key_1".to_string()),
                public_key_hex: "aa".to_string(),
                status: SignerKeyStatus::Active,
                valid_from: Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
                valid_to: None,
            },
        );
        let at = Timestamp::parse("2026-01-15T00:00:00Z").unwrap();
        assert_eq!(
            registry.evaluate_lifecycle(&tenant(), "key_1", at),
            SignerLifecycleOutcome::Active
        );
    }

    #[test]
    fn rotated_key_is_rejected_for_events_after_rotation() {
        let registry = SignerKeyRegistry::new();
        registry.register(
            &tenant(),
            SignerKeyRecord {
                key_id: KeyId::from("key_1".to_string()),
                public_key_hex: "aa".to_string(),
                status: SignerKeyStatus::Active,
                valid_from: Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
                valid_to: None,
            },
        );
        registry.rotate(&tenant(), "key_1");
        let at = Timestamp::parse("2026-01-15T00:00:00Z").unwrap();
        assert_eq!(
            registry.evaluate_lifecycle(&tenant(), "key_1", at),
            SignerLifecycleOutcome::Rotated
        );
    }

    #[test]
    fn unregistered_key_is_not_registered() {
        let registry = SignerKeyRegistry::new();
        let at = Timestamp::parse("2026-01-15T00:00:00Z").unwrap();
        assert_eq!(
            registry.evaluate_lifecycle(&tenant(), "ghost", at),
            SignerLifecycleOutcome::NotRegistered
        );
    }
}
