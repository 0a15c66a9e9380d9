#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
//! Agents, signer-key lifecycle, and the grant/delegation/capability system
//! (spec §2 C4, §4.4): `Agent` registration and wallet status, signer-key
//! `{active, rotated, revoked}` lifecycle, `AuthorityGrant` /
//! `DelegationGrant` / `CapabilityAttestation` issuance, revocation, and
//! chain-binding lineage resolution, plus session provenance/taint tracking
//! (SPEC_FULL.md §11.1).

pub mod agent;
pub mod error;
pub mod grants;
pub mod operator;
pub mod robot;
pub mod session;
pub mod signer_key;

pub use agent::{AgentReducer, AgentSnapshot, AgentStatus};
pub use error::IdentityError;
pub use grants::authority::AuthorityGrantReducer;
pub use grants::capability::CapabilityAttestationReducer;
pub use grants::delegation::DelegationGrantReducer;
pub use grants::lineage::resolve_effective_delegation_hash;
pub use grants::{ChainBinding, GrantKind, GrantRecord, ScopePredicates, SpendLimit, Validity};
pub use operator::{OperatorReducer, OperatorSnapshot, OperatorStatus};
pub use robot::{RobotReducer, RobotSnapshot, RobotStatus};
pub use session::{EvidenceRef, SessionReducer, SessionSnapshot, TaintState};
pub use signer_key::{evaluate_signer_lifecycle, SignerKeyRecord, SignerKeyRegistry, SignerKeyStatus};
