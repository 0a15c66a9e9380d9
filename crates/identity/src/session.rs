//! Session provenance / taint tracking (SPEC_FULL.md §11.1). A `Session`
//! accumulates content-hashed `SessionEvent`s; `TaintState` is derived by
//! reducing those events through a small fixed rule set, the same shape the
//! teacher's `agentic::rules::ActionRules`/`Verdict` pair uses for policy
//! evaluation over an action log.

use serde::{Deserialize, Serialize};
use settld_api::Reducer;
use settld_codec::sha256_hex_of_canon;
use settld_types::{Event, SessionId};

/// One evidence reference captured during a session, in the
/// `session:event:<hash>` / `session:chain:<hash>` form spec §4.5 requires
/// `verify` to reproduce when a session was tainted at authorize time.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceRef(pub String);

impl EvidenceRef {
    pub fn session_event(event_hash: &str) -> Self {
        Self(format!("session:event:{event_hash}"))
    }

    pub fn session_chain(chain_hash: &str) -> Self {
        Self(format!("session:chain:{chain_hash}"))
    }
}

/// The outcome of reducing a session's events through the taint rules.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaintState {
    Clean,
    Tainted { refs: Vec<EvidenceRef> },
}

impl TaintState {
    pub fn is_tainted(&self) -> bool {
        matches!(self, TaintState::Tainted { .. })
    }

    pub fn evidence_refs(&self) -> &[EvidenceRef] {
        match self {
            TaintState::Clean => &[],
            TaintState::Tainted { refs } => refs,
        }
    }
}

/// A single recorded occurrence within a session's provenance log — a tool
/// call, an inbound prompt chunk, an output emission — each content-hashed
/// into `event_hash` so evidence refs are stable and independently
/// verifiable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionEventRecord {
    pub event_hash: String,
    pub kind: String,
    /// Set by a prompt-risk classifier upstream; the reducer itself applies
    /// no classification logic, only accumulates what it is told (spec §9:
    /// "The re-implementation should express [defensive validation] once
    /// via declared schema objects" — classification policy lives in the
    /// x402 gate's prompt-risk evaluation, not here).
    pub flagged_tainted: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub agent_id: String,
    pub events: Vec<SessionEventRecord>,
    pub chain_hash: String,
    pub taint: TaintState,
    pub revision: u64,
}

#[derive(Default)]
pub struct SessionReducer;

impl Reducer for SessionReducer {
    type Snapshot = SessionSnapshot;

    fn apply(
        &self,
        snapshot: Option<Self::Snapshot>,
        event: &Event,
    ) -> Result<Self::Snapshot, settld_api::CoordinatorError> {
        apply_session_event(snapshot, event)
            .map_err(|e| settld_api::CoordinatorError::Other(anyhow::anyhow!(e)))
    }
}

fn apply_session_event(
    snapshot: Option<SessionSnapshot>,
    event: &Event,
) -> Result<SessionSnapshot, crate::error::IdentityError> {
    use crate::error::IdentityError;

    if event.event_type != "session.event.recorded" {
        return Err(IdentityError::EventPayloadInvalid(format!(
            "unrecognized Session event type '{}'",
            event.event_type
        )));
    }
    let payload = &event.payload;
    let kind = payload
        .get("kind")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| IdentityError::EventPayloadInvalid("missing field 'kind'".into()))?
        .to_string();
    let flagged_tainted = payload
        .get("flaggedTainted")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false);

    let event_hash = sha256_hex_of_canon(&payload)?;

    let mut snap = snapshot.unwrap_or_else(|| SessionSnapshot {
        session_id: SessionId::from(event.stream_id.as_str().to_string()),
        agent_id: payload
            .get("agentId")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string(),
        events: Vec::new(),
        chain_hash: String::new(),
        taint: TaintState::Clean,
        revision: 0,
    });

    snap.events.push(SessionEventRecord {
        event_hash: event_hash.clone(),
        kind,
        flagged_tainted,
    });
    snap.chain_hash = event.chain_hash.clone();
    snap.revision += 1;

    if flagged_tainted {
        let mut refs = match &snap.taint {
            TaintState::Tainted { refs } => refs.clone(),
            TaintState::Clean => Vec::new(),
        };
        refs.push(EvidenceRef::session_event(&event_hash));
        refs.push(EvidenceRef::session_chain(&snap.chain_hash));
        snap.taint = TaintState::Tainted { refs };
    }

    Ok(snap)
}
