//! A fixed-seed signer keypair plus a trivial [`SignerRegistry`] that always
//! reports the registered key as active, for tests that don't exercise
//! signer-lifecycle transitions themselves.

use dashmap::DashMap;
use settld_api::{SignerLifecycleOutcome, SignerRegistry};
use settld_codec::SigningKeyPair;
use settld_types::{TenantId, Timestamp};

/// A deterministic Ed25519 key pair, stable across test runs.
pub fn fixed_signer_keypair() -> SigningKeyPair {
    SigningKeyPair::from_seed(&[42u8; 32]).unwrap_or_else(|_| {
        // `from_seed` only fails on malformed key material; a 32-byte all-42s
        // seed is always well-formed, so this arm is unreachable in practice.
        SigningKeyPair::generate().expect("key generation")
    })
}

/// An in-memory [`SignerRegistry`] fixture. Registers keys as always-active
/// unless explicitly marked otherwise, so most tests need only
/// `register(tenant, key_id, &keypair)`.
#[derive(Default)]
pub struct FakeSignerRegistry {
    keys: DashMap<(TenantId, String), (String, SignerLifecycleOutcome)>,
}

impl FakeSignerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tenant_id: &TenantId, key_id: &str, key_pair: &SigningKeyPair) {
        self.keys.insert(
            (tenant_id.clone(), key_id.to_string()),
            (key_pair.verifying_key().to_hex(), SignerLifecycleOutcome::Active),
        );
    }

    pub fn set_outcome(&self, tenant_id: &TenantId, key_id: &str, outcome: SignerLifecycleOutcome) {
        if let Some(mut entry) = self.keys.get_mut(&(tenant_id.clone(), key_id.to_string())) {
            entry.1 = outcome;
        }
    }
}

impl SignerRegistry for FakeSignerRegistry {
    fn verifying_key_hex(&self, tenant_id: &TenantId, key_id: &str) -> Option<String> {
        self.keys
            .get(&(tenant_id.clone(), key_id.to_string()))
            .map(|e| e.0.clone())
    }

    fn evaluate_lifecycle(
        &self,
        tenant_id: &TenantId,
        key_id: &str,
        _at: Timestamp,
    ) -> SignerLifecycleOutcome {
        self.keys
            .get(&(tenant_id.clone(), key_id.to_string()))
            .map(|e| e.1)
            .unwrap_or(SignerLifecycleOutcome::NotRegistered)
    }
}
