//! Content-addressed artifact construction and verification (spec §3
//! "Artifact", §4.8): "Artifact construction is a pure function from
//! snapshot + events. The hash is over the *core* object with
//! `artifactHash` field omitted; verifiers re-canonicalize, recompute, and
//! compare byte-for-byte."

use serde::Serialize;
use serde_json::Value;
use settld_codec::sha256_hex_of_canon;

use crate::error::ArtifactError;

/// An `artifactType` string always carries a `.vN` version suffix, e.g.
/// `"PartyStatement.v1"` or `"AuditPacket.v1"` (spec §3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactType(String);

impl ArtifactType {
    pub fn new(name: &str, version: u32) -> Self {
        Self(format!("{name}.v{version}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A content-addressed artifact: `artifactHash = SHA256(canon(core))`, and
/// the storage key is derived from `artifactType`/`artifactHash`, never
/// from the caller (spec §3).
#[derive(Clone, Debug)]
pub struct Artifact {
    pub artifact_id: String,
    pub artifact_type: ArtifactType,
    pub artifact_hash: String,
    pub core: Value,
}

impl Artifact {
    /// The canonical storage key, `{prefix}/artifacts/{artifactType}/{artifactHash}.json`
    /// (spec §3).
    pub fn storage_key(&self, prefix: &str) -> String {
        format!(
            "{prefix}/artifacts/{}/{}.json",
            self.artifact_type.as_str(),
            self.artifact_hash
        )
    }
}

/// Builds an `Artifact` from a core value that must NOT itself carry an
/// `artifact_hash` field — that field is derived, never supplied, so a core
/// struct that already has one is a caller bug rather than data to merge
/// (spec §4.8: "The hash is over the *core* object with `artifactHash`
/// field omitted").
pub fn build_artifact<T: Serialize>(
    artifact_id: impl Into<String>,
    artifact_type: ArtifactType,
    core: &T,
) -> Result<Artifact, ArtifactError> {
    let core_value: Value = serde_json::to_value(core).map_err(settld_codec::CodecError::Json)?;
    if let Value::Object(map) = &core_value {
        if map.contains_key("artifact_hash") {
            return Err(ArtifactError::CoreCarriesOwnHash);
        }
    }
    let artifact_hash = sha256_hex_of_canon(core)?;
    Ok(Artifact {
        artifact_id: artifact_id.into(),
        artifact_type,
        artifact_hash,
        core: core_value,
    })
}

/// Re-canonicalizes `core`, recomputes its hash, and compares it
/// byte-for-byte against `expected_hash` (spec §4.8). Used both when
/// loading an artifact back out of storage and when verifying one
/// delivered inside an audit packet.
pub fn verify_artifact(
    artifact_id: &str,
    core: &Value,
    expected_hash: &str,
) -> Result<(), ArtifactError> {
    let recomputed = sha256_hex_of_canon(core)?;
    if recomputed != expected_hash {
        return Err(ArtifactError::HashMismatch {
            artifact_id: artifact_id.to_string(),
            stored: expected_hash.to_string(),
            recomputed,
        });
    }
    Ok(())
}
