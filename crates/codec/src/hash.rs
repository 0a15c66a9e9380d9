//! SHA-256 hashing over canonical bytes. Wraps `dcrypt`'s implementation the
//! same way the teacher's `ioi_crypto::algorithms::hash` module wraps it:
//! a thin, testable function rather than calling the dependency inline at
//! every call site.

use crate::error::CodecError;
use dcrypt::algorithms::hash::sha2::Sha256 as DcryptSha256;
use dcrypt::algorithms::hash::HashFunction as DcryptHashFunction;
use dcrypt::algorithms::mac::Hmac;
use dcrypt::algorithms::ByteSerializable;

/// SHA-256 digest of raw bytes.
pub fn sha256(bytes: &[u8]) -> Result<[u8; 32], CodecError> {
    let digest = DcryptSha256::digest(bytes)
        .map_err(|e| CodecError::InvalidMaterial(format!("sha256: {e}")))?;
    let raw = digest.to_bytes();
    raw.as_slice()
        .try_into()
        .map_err(|_| CodecError::InvalidMaterial("sha256 digest was not 32 bytes".to_string()))
}

/// Lower-hex-encoded SHA-256 digest of raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> Result<String, CodecError> {
    sha256(bytes).map(|d| hex::encode(d))
}

/// `SHA256(canon(value))` — the universal hash used throughout the
/// coordinator (spec §4.1): events, artifacts, and grants are all hashed
/// this way.
pub fn sha256_hex_of_canon<T: serde::Serialize>(value: &T) -> Result<String, CodecError> {
    let canonical = crate::canonical::canon(value)?;
    sha256_hex(canonical.as_bytes())
}

/// HMAC-SHA256 of `message` under `key`, via `dcrypt`'s own MAC primitive
/// (the same `Hmac<Sha256>::mac` the teacher's hybrid-KEM transport uses to
/// derive its application key) rather than a hand-rolled RFC 2104 loop.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<[u8; 32], CodecError> {
    let tag = Hmac::<DcryptSha256>::mac(key, message)
        .map_err(|e| CodecError::InvalidMaterial(format!("hmac_sha256: {e}")))?;
    (&tag[..])
        .try_into()
        .map_err(|_| CodecError::InvalidMaterial("hmac tag was not 32 bytes".to_string()))
}
