//! Ed25519 signing and verification over canonical content hashes.
//!
//! Mirrors the shape of the teacher's `ioi_crypto::sign::eddsa` module (an
//! `Ed25519KeyPair` wrapping `dcrypt::sign::eddsa`, plus `to_bytes`/
//! `from_bytes` on each key type) but drops the `SigningKeyPair`/
//! `VerifyingKey` trait abstraction, since this crate has exactly one
//! signature scheme and no plugin surface for others.
//!
//! Per spec §4.1, the signature covers the content hash **hex string**
//! bytes, not the raw 32-byte digest and not the pre-hash canonical JSON.

use crate::error::CodecError;
use crate::hash::sha256_hex_of_canon;
use dcrypt::sign::eddsa;
use rand::rngs::OsRng;
use serde::Serialize;

/// An Ed25519 key pair used to sign events, grants, and artifacts.
#[derive(Clone)]
pub struct SigningKeyPair {
    public_key: eddsa::Ed25519PublicKey,
    secret_key: eddsa::Ed25519SecretKey,
}

/// An Ed25519 public key, held independently once a signer is rotated away
/// from (verification of historical signatures must keep working).
#[derive(Clone)]
pub struct VerifyingKey(eddsa::Ed25519PublicKey);

impl SigningKeyPair {
    /// Generates a new random key pair.
    pub fn generate() -> Result<Self, CodecError> {
        let mut rng = OsRng;
        let (public_key, secret_key) = eddsa::Ed25519::keypair(&mut rng)
            .map_err(|e| CodecError::InvalidMaterial(format!("keygen: {e}")))?;
        Ok(Self {
            public_key,
            secret_key,
        })
    }

    /// Rebuilds a key pair from a 32-byte seed (for fixed-seed test
    /// fixtures and key-store round-trips).
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, CodecError> {
        let secret_key = eddsa::Ed25519SecretKey::from_seed(seed)
            .map_err(|e| CodecError::InvalidMaterial(format!("from_seed: {e:?}")))?;
        let public_key = secret_key
            .public_key()
            .map_err(|e| CodecError::InvalidMaterial(format!("derive public key: {e:?}")))?;
        Ok(Self {
            public_key,
            secret_key,
        })
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.public_key.clone())
    }

    /// Signs raw bytes, returning a lower-hex signature.
    pub fn sign_bytes(&self, message: &[u8]) -> Result<String, CodecError> {
        let sig = eddsa::Ed25519::sign(message, &self.secret_key)
            .map_err(|e| CodecError::InvalidMaterial(format!("sign: {e}")))?;
        Ok(hex::encode(sig.to_bytes()))
    }

    /// Signs `SHA256(canon(value)).to_hex()`, the scheme used for every
    /// signed record in the coordinator (spec §4.1).
    pub fn sign_canon<T: Serialize>(&self, value: &T) -> Result<String, CodecError> {
        let hash_hex = sha256_hex_of_canon(value)?;
        self.sign_bytes(hash_hex.as_bytes())
    }
}

impl VerifyingKey {
    pub fn from_hex(hex_str: &str) -> Result<Self, CodecError> {
        let bytes =
            hex::decode(hex_str).map_err(|e| CodecError::InvalidMaterial(format!("{e}")))?;
        let key = eddsa::Ed25519PublicKey::from_bytes(&bytes)
            .map_err(|e| CodecError::InvalidMaterial(format!("public key: {e:?}")))?;
        Ok(Self(key))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_bytes())
    }

    /// Verifies a lower-hex signature over raw bytes.
    pub fn verify_bytes(&self, message: &[u8], signature_hex: &str) -> Result<(), CodecError> {
        let sig_bytes =
            hex::decode(signature_hex).map_err(|e| CodecError::InvalidMaterial(format!("{e}")))?;
        let sig = eddsa::Ed25519Signature::from_bytes(&sig_bytes)
            .map_err(|e| CodecError::InvalidMaterial(format!("signature: {e:?}")))?;
        eddsa::Ed25519::verify(message, &sig, &self.0)
            .map_err(|_| CodecError::VerificationFailed)
    }

    /// Verifies a signature over `SHA256(canon(value)).to_hex()`.
    pub fn verify_canon<T: Serialize>(
        &self,
        value: &T,
        signature_hex: &str,
    ) -> Result<(), CodecError> {
        let hash_hex = sha256_hex_of_canon(value)?;
        self.verify_bytes(hash_hex.as_bytes(), signature_hex)
    }
}
