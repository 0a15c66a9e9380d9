//! `WalletAuthorizationDecisionToken` (spec §4.5, SPEC_FULL.md §11.2): an
//! opaque, signed token issued by the wallet issuer endpoint, encoding
//! delegation lineage and a maximum spend, required when a gate targets a
//! sponsor wallet.

use serde::{Deserialize, Serialize};
use settld_codec::VerifyingKey;
use settld_types::{Cents, Timestamp};

use crate::error::X402Error;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletAuthorizationDecisionToken {
    pub wallet_ref: String,
    pub max_amount_cents: Cents,
    pub delegation_lineage: Vec<String>,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
}

impl WalletAuthorizationDecisionToken {
    /// The canonical core signed by the wallet issuer — everything except
    /// the signature itself, the same "hash the core, sign the hash"
    /// discipline spec §4.1 uses for events and artifacts.
    fn core(&self) -> &Self {
        self
    }
}

/// Verifies a token against the issuer's registered key, and that it covers
/// `wallet_ref` at `>= amount_cents`, at instant `at`. Mismatch or expiry
/// surfaces `X402_WALLET_ISSUER_DECISION_REQUIRED` per spec §4.5.
pub fn verify_wallet_authorization(
    token: &WalletAuthorizationDecisionToken,
    signature_hex: &str,
    issuer_key: &VerifyingKey,
    wallet_ref: &str,
    amount_cents: Cents,
    at: Timestamp,
) -> Result<(), X402Error> {
    issuer_key
        .verify_canon(token.core(), signature_hex)
        .map_err(|_| X402Error::WalletIssuerDecisionRequired)?;

    if token.wallet_ref != wallet_ref {
        return Err(X402Error::WalletIssuerDecisionInvalid(
            "wallet_ref mismatch".to_string(),
        ));
    }
    if token.max_amount_cents < amount_cents {
        return Err(X402Error::WalletIssuerDecisionInvalid(
            "amountCents exceeds token max_amount_cents".to_string(),
        ));
    }
    if at < token.issued_at || at > token.expires_at {
        return Err(X402Error::WalletIssuerDecisionInvalid(
            "token is outside its validity window".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use settld_codec::SigningKeyPair;

    fn token() -> WalletAuthorizationDecisionToken {
        WalletAuthorizationDecisionToken {
            wallet_ref: "wallet_1".to_string(),
            max_amount_cents: 1000,
            delegation_lineage: vec!["grant_root".to_string()],
            issued_at: Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
            expires_at: Timestamp::parse("2026-01-02T00:00:00Z").unwrap(),
        }
    }

    #[test]
    fn valid_token_within_limits_passes() {
        let pair = SigningKeyPair::generate().unwrap();
        let t = token();
        let sig = pair.sign_canon(&t).unwrap();
        verify_wallet_authorization(
            &t,
            &sig,
            &pair.verifying_key(),
            "wallet_1",
            400,
            Timestamp::parse("2026-01-01T12:00:00Z").unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn amount_over_token_max_is_rejected() {
        let pair = SigningKeyPair::generate().unwrap();
        let t = token();
        let sig = pair.sign_canon(&t).unwrap();
        let err = verify_wallet_authorization(
            &t,
            &sig,
            &pair.verifying_key(),
            "wallet_1",
            5000,
            Timestamp::parse("2026-01-01T12:00:00Z").unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, X402Error::WalletIssuerDecisionInvalid(_)));
    }

    #[test]
    fn tampered_token_fails_signature_check() {
        let pair = SigningKeyPair::generate().unwrap();
        let mut t = token();
        let sig = pair.sign_canon(&t).unwrap();
        t.max_amount_cents = 999_999;
        let err = verify_wallet_authorization(
            &t,
            &sig,
            &pair.verifying_key(),
            "wallet_1",
            400,
            Timestamp::parse("2026-01-01T12:00:00Z").unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, X402Error::WalletIssuerDecisionRequired));
    }
}
