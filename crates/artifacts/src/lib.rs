//! Content-addressed artifacts and audit-packet assembly (spec §2 C8, §3
//! "Artifact", §4.8).
//!
//! Artifact construction is a pure function from a snapshot/event payload
//! to a hashed, versioned core object; audit packets bundle a set of such
//! artifacts into a deterministic zip with a `SHA256SUMS` manifest, and any
//! zip read back in goes through [`safe_zip::safe_unzip`] first.

pub mod audit_packet;
pub mod core;
pub mod error;
pub mod safe_zip;

pub use audit_packet::{assemble_audit_packet, PacketEntry};
pub use core::{build_artifact, verify_artifact, Artifact, ArtifactType};
pub use error::ArtifactError;
pub use safe_zip::{safe_unzip, UnzipLimits, UnzippedEntry};
