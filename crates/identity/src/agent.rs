//! The `Agent` aggregate (spec §3): an autonomous software agent's registered
//! identity, wallet balance, and coarse lifecycle status. Reduced from
//! `AgentEvent`s the same way the teacher's `state::manager` folds committed
//! transactions into an account tree — one pure `apply` per event type.

use serde::{Deserialize, Serialize};
use settld_api::Reducer;
use settld_types::{AgentId, Cents, Currency, Event};

use crate::error::IdentityError;

/// Coarse operating status gating x402 gate authorization (spec §4.5
/// "Payer/payee `active` — else `X402_AGENT_{NOT_ACTIVE|SUSPENDED|
/// THROTTLED}`").
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Active,
    Suspended,
    Throttled,
}

/// The reduced state of one `Agent` stream.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: AgentId,
    pub owner: String,
    pub declared_capabilities: Vec<String>,
    pub public_key_hex: String,
    pub status: AgentStatus,
    pub available_cents: Cents,
    /// Sum of this agent's active escrow holds (invariant (iv) of spec §3).
    pub escrow_locked_cents: Cents,
    pub currency: Currency,
    pub revision: u64,
}

impl AgentSnapshot {
    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }
}

/// Reduces `Agent` stream events (`register`, `wallet.credit`,
/// `wallet.reserve`, `wallet.release`, `wallet.settle`, `status.changed`)
/// into an [`AgentSnapshot`].
#[derive(Default)]
pub struct AgentReducer;

impl Reducer for AgentReducer {
    type Snapshot = AgentSnapshot;

    fn apply(
        &self,
        snapshot: Option<Self::Snapshot>,
        event: &Event,
    ) -> Result<Self::Snapshot, settld_api::CoordinatorError> {
        apply_agent_event(snapshot, event)
            .map_err(|e| settld_api::CoordinatorError::Other(anyhow::anyhow!(e)))
    }
}

fn apply_agent_event(
    snapshot: Option<AgentSnapshot>,
    event: &Event,
) -> Result<AgentSnapshot, IdentityError> {
    let payload = &event.payload;
    match event.event_type.as_str() {
        "agent.registered" => {
            let agent_id = AgentId::from(
                field_str(payload, "agentId")?.to_string(),
            );
            Ok(AgentSnapshot {
                agent_id,
                owner: field_str(payload, "owner")?.to_string(),
                declared_capabilities: field_str_array(payload, "declaredCapabilities"),
                public_key_hex: field_str(payload, "publicKeyHex")?.to_string(),
                status: AgentStatus::Active,
                available_cents: 0,
                escrow_locked_cents: 0,
                currency: Currency::usd(),
                revision: 1,
            })
        }
        "agent.wallet.credited" => {
            let mut snap = require(snapshot)?;
            let amount = field_i64(payload, "amountCents")?;
            snap.available_cents += amount;
            snap.revision += 1;
            Ok(snap)
        }
        "agent.wallet.reserved" => {
            let mut snap = require(snapshot)?;
            let amount = field_i64(payload, "amountCents")?;
            snap.available_cents -= amount;
            snap.escrow_locked_cents += amount;
            snap.revision += 1;
            Ok(snap)
        }
        "agent.wallet.released" => {
            let mut snap = require(snapshot)?;
            let amount = field_i64(payload, "amountCents")?;
            snap.escrow_locked_cents -= amount;
            snap.available_cents += amount;
            snap.revision += 1;
            Ok(snap)
        }
        "agent.wallet.settled" => {
            // Funds leave escrow permanently (paid out to the payee side);
            // unlike `released`, they do not return to `available_cents`.
            let mut snap = require(snapshot)?;
            let amount = field_i64(payload, "amountCents")?;
            snap.escrow_locked_cents -= amount;
            snap.revision += 1;
            Ok(snap)
        }
        "agent.status.changed" => {
            let mut snap = require(snapshot)?;
            snap.status = match field_str(payload, "status")? {
                "active" => AgentStatus::Active,
                "suspended" => AgentStatus::Suspended,
                "throttled" => AgentStatus::Throttled,
                other => {
                    return Err(IdentityError::EventPayloadInvalid(format!(
                        "unknown agent status '{other}'"
                    )))
                }
            };
            snap.revision += 1;
            Ok(snap)
        }
        other => Err(IdentityError::EventPayloadInvalid(format!(
            "unrecognized Agent event type '{other}'"
        ))),
    }
}

fn require(snapshot: Option<AgentSnapshot>) -> Result<AgentSnapshot, IdentityError> {
    snapshot.ok_or_else(|| {
        IdentityError::EventPayloadInvalid("event applied to a stream with no snapshot".into())
    })
}

fn field_str<'a>(v: &'a serde_json::Value, field: &str) -> Result<&'a str, IdentityError> {
    v.get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| IdentityError::EventPayloadInvalid(format!("missing field '{field}'")))
}

fn field_i64(v: &serde_json::Value, field: &str) -> Result<i64, IdentityError> {
    v.get(field)
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| IdentityError::EventPayloadInvalid(format!("missing field '{field}'")))
}

fn field_str_array(v: &serde_json::Value, field: &str) -> Vec<String> {
    v.get(field)
        .and_then(serde_json::Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|x| x.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use settld_types::{Actor, StreamId, StreamKind, TenantId, Timestamp};

    fn event(event_type: &str, payload: serde_json::Value) -> Event {
        Event {
            id: settld_types::EventId::from("evt_1".to_string()),
            stream_id: StreamId::from("agent_1".to_string()),
            stream_kind: StreamKind::Agent,
            event_type: event_type.to_string(),
            at: Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
            actor: Actor::System {
                component: "test".to_string(),
            },
            payload,
            prev_chain_hash: None,
            chain_hash: "h".to_string(),
            signature: None,
            key_id: None,
            tenant_id: TenantId::default_tenant(),
        }
    }

    #[test]
    fn register_then_credit_then_reserve() {
        let reducer = AgentReducer;
        let registered = event(
            "agent.registered",
            serde_json::json!({"agentId": "agent_1", "owner": "acct_1", "declaredCapabilities": ["http"], "publicKeyHex": "aa"}),
        );
        let snap = reducer.apply(None, &registered).unwrap();
        assert!(snap.is_active());

        let credited = event("agent.wallet.credited", serde_json::json!({"amountCents": 5000}));
        let snap = reducer.apply(Some(snap), &credited).unwrap();
        assert_eq!(snap.available_cents, 5000);

        let reserved = event("agent.wallet.reserved", serde_json::json!({"amountCents": 400}));
        let snap = reducer.apply(Some(snap), &reserved).unwrap();
        assert_eq!(snap.available_cents, 4600);
        assert_eq!(snap.escrow_locked_cents, 400);
    }

    #[test]
    fn malformed_payload_halts_reduction() {
        let reducer = AgentReducer;
        let bad = event("agent.wallet.credited", serde_json::json!({}));
        let registered = event(
            "agent.registered",
            serde_json::json!({"agentId": "agent_1", "owner": "acct_1", "declaredCapabilities": [], "publicKeyHex": "aa"}),
        );
        let snap = reducer.apply(None, &registered).unwrap();
        assert!(reducer.apply(Some(snap), &bad).is_err());
    }
}
