//! The universal `Event` envelope (spec §3 "Event") that every aggregate's
//! stream is built from.

use crate::ids::{EventId, KeyId, StreamId, TenantId};
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// Which aggregate kind a stream belongs to (spec §3 "Stream kinds and
/// aggregates"). Kept as a closed enum — new aggregate kinds are a
/// deliberate, reviewed addition, not a free-form string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum StreamKind {
    Agent,
    Robot,
    Operator,
    Job,
    Run,
    X402Gate,
    DelegationGrant,
    AuthorityGrant,
    CapabilityAttestation,
    Session,
    MonthClose,
    DisputeCase,
    ArbitrationCase,
    MoneyRailOperation,
    Governance,
}

/// Who performed the action that produced an event: either a principal's
/// agent, an operator, or the coordinator itself (e.g. a worker tick).
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    Agent { agent_id: crate::ids::AgentId },
    Operator { operator_id: String },
    System { component: String },
}

/// A single, chain-hashed, append-only event (spec §3 "Event").
///
/// `chain_hash` binds this event to everything before it in `stream_id`:
/// `chain_hash = SHA256(canon({prev_chain_hash, type, at, actor, payload,
/// stream_id}))`. The hash is computed by `settld-kernel`, not here — this
/// type is the pure data envelope both the kernel and the reducers operate
/// on.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub stream_id: StreamId,
    pub stream_kind: StreamKind,
    #[serde(rename = "type")]
    pub event_type: String,
    pub at: Timestamp,
    pub actor: Actor,
    pub payload: serde_json::Value,
    pub prev_chain_hash: Option<String>,
    pub chain_hash: String,
    pub signature: Option<String>,
    pub key_id: Option<KeyId>,
    pub tenant_id: TenantId,
}

impl Event {
    /// The canonical structure that is hashed to produce `chain_hash` (spec
    /// §3). Field order here is irrelevant — `settld-codec`'s canonicalizer
    /// sorts object keys before hashing — but the *field set* is exactly
    /// what the spec names.
    pub fn chain_hash_input(
        prev_chain_hash: &Option<String>,
        event_type: &str,
        at: &Timestamp,
        actor: &Actor,
        payload: &serde_json::Value,
        stream_id: &StreamId,
    ) -> serde_json::Value {
        serde_json::json!({
            "prevChainHash": prev_chain_hash,
            "type": event_type,
            "at": at.to_rfc3339(),
            "actor": actor,
            "payload": payload,
            "streamId": stream_id.as_str(),
        })
    }
}
