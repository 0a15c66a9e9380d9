//! `MoneyRailOperation` lifecycle (spec §4.7): "created when a payout is
//! enqueued and moves through `initiated → submitted → confirmed →
//! {released | reversed | failed}`. Ingest is idempotent on `(providerId,
//! eventId)`. Reversal is allowed only from `confirmed`; submit/confirm from
//! `initiated`."

use serde::{Deserialize, Serialize};
use settld_api::Reducer;
use settld_types::{Cents, Currency, Event, MoneyRailOperationId, PartyId, ProviderId};

use crate::error::MoneyRailsError;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoneyRailOperationState {
    Initiated,
    Submitted,
    Confirmed,
    Released,
    Reversed,
    Failed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MoneyRailOperationSnapshot {
    pub operation_id: MoneyRailOperationId,
    pub provider_id: ProviderId,
    pub party_id: PartyId,
    pub amount_cents: Cents,
    pub currency: Currency,
    pub state: MoneyRailOperationState,
    /// `(providerId, eventId)` pairs already ingested for this operation, so
    /// a replayed terminal rail event is a no-op rather than a double
    /// transition.
    pub ingested_provider_events: Vec<String>,
    pub revision: u64,
}

#[derive(Default)]
pub struct MoneyRailOperationReducer;

impl Reducer for MoneyRailOperationReducer {
    type Snapshot = MoneyRailOperationSnapshot;

    fn apply(
        &self,
        snapshot: Option<Self::Snapshot>,
        event: &Event,
    ) -> Result<Self::Snapshot, settld_api::CoordinatorError> {
        apply_operation_event(snapshot, event)
            .map_err(|e| settld_api::CoordinatorError::Other(anyhow::anyhow!(e)))
    }
}

fn apply_operation_event(
    snapshot: Option<MoneyRailOperationSnapshot>,
    event: &Event,
) -> Result<MoneyRailOperationSnapshot, MoneyRailsError> {
    let payload = &event.payload;
    match event.event_type.as_str() {
        "money_rail_operation.initiated" => Ok(MoneyRailOperationSnapshot {
            operation_id: MoneyRailOperationId::from(event.stream_id.as_str().to_string()),
            provider_id: ProviderId::from(field_str(payload, "providerId")?.to_string()),
            party_id: PartyId::from(field_str(payload, "partyId")?.to_string()),
            amount_cents: field_i64(payload, "amountCents")?,
            currency: Currency::new(field_str(payload, "currency")?),
            state: MoneyRailOperationState::Initiated,
            ingested_provider_events: Vec::new(),
            revision: 1,
        }),
        "money_rail_operation.submitted" => {
            transition(snapshot, payload, MoneyRailOperationState::Initiated, MoneyRailOperationState::Submitted)
        }
        "money_rail_operation.confirmed" => {
            transition(snapshot, payload, MoneyRailOperationState::Submitted, MoneyRailOperationState::Confirmed)
        }
        "money_rail_operation.released" => {
            transition(snapshot, payload, MoneyRailOperationState::Confirmed, MoneyRailOperationState::Released)
        }
        "money_rail_operation.reversed" => {
            transition(snapshot, payload, MoneyRailOperationState::Confirmed, MoneyRailOperationState::Reversed)
        }
        "money_rail_operation.failed" => {
            let mut snap = require(snapshot)?;
            record_ingest(&mut snap, payload);
            snap.state = MoneyRailOperationState::Failed;
            snap.revision += 1;
            Ok(snap)
        }
        other => Err(MoneyRailsError::EventPayloadInvalid(format!(
            "unrecognized MoneyRailOperation event type '{other}'"
        ))),
    }
}

fn transition(
    snapshot: Option<MoneyRailOperationSnapshot>,
    payload: &serde_json::Value,
    expected: MoneyRailOperationState,
    next: MoneyRailOperationState,
) -> Result<MoneyRailOperationSnapshot, MoneyRailsError> {
    let mut snap = require(snapshot)?;
    if is_duplicate_ingest(&snap, payload) {
        return Ok(snap);
    }
    if snap.state != expected {
        return Err(MoneyRailsError::IllegalStateTransition {
            operation_id: snap.operation_id.to_string(),
            state: format!("{:?}", snap.state),
        });
    }
    record_ingest(&mut snap, payload);
    snap.state = next;
    snap.revision += 1;
    Ok(snap)
}

fn is_duplicate_ingest(snap: &MoneyRailOperationSnapshot, payload: &serde_json::Value) -> bool {
    ingest_key(snap, payload)
        .map(|key| snap.ingested_provider_events.contains(&key))
        .unwrap_or(false)
}

fn record_ingest(snap: &mut MoneyRailOperationSnapshot, payload: &serde_json::Value) {
    if let Some(key) = ingest_key(snap, payload) {
        snap.ingested_provider_events.push(key);
    }
}

fn ingest_key(snap: &MoneyRailOperationSnapshot, payload: &serde_json::Value) -> Option<String> {
    payload
        .get("providerEventId")
        .and_then(serde_json::Value::as_str)
        .map(|event_id| format!("{}:{}", snap.provider_id, event_id))
}

fn require(
    snapshot: Option<MoneyRailOperationSnapshot>,
) -> Result<MoneyRailOperationSnapshot, MoneyRailsError> {
    snapshot.ok_or_else(|| {
        MoneyRailsError::EventPayloadInvalid("event applied to a stream with no snapshot".into())
    })
}

fn field_str<'a>(v: &'a serde_json::Value, field: &str) -> Result<&'a str, MoneyRailsError> {
    v.get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| MoneyRailsError::EventPayloadInvalid(format!("missing field '{field}'")))
}

fn field_i64(v: &serde_json::Value, field: &str) -> Result<i64, MoneyRailsError> {
    v.get(field)
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| MoneyRailsError::EventPayloadInvalid(format!("missing field '{field}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use settld_types::{Actor, StreamId, StreamKind, TenantId, Timestamp};

    fn event(event_type: &str, payload: serde_json::Value) -> Event {
        Event {
            id: settld_types::EventId::from("evt_1".to_string()),
            stream_id: StreamId::from("op_1".to_string()),
            stream_kind: StreamKind::MoneyRailOperation,
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
    fn happy_path_lifecycle() {
        let reducer = MoneyRailOperationReducer;
        let snap = reducer
            .apply(
                None,
                &event(
                    "money_rail_operation.initiated",
                    serde_json::json!({"providerId": "stripe", "partyId": "party_1", "amountCents": 5000, "currency": "usd"}),
                ),
            )
            .unwrap();
        let snap = reducer
            .apply(
                Some(snap),
                &event("money_rail_operation.submitted", serde_json::json!({"providerEventId": "evt_a"})),
            )
            .unwrap();
        assert_eq!(snap.state, MoneyRailOperationState::Submitted);
        let snap = reducer
            .apply(
                Some(snap),
                &event("money_rail_operation.confirmed", serde_json::json!({"providerEventId": "evt_b"})),
            )
            .unwrap();
        let snap = reducer
            .apply(
                Some(snap),
                &event("money_rail_operation.released", serde_json::json!({"providerEventId": "evt_c"})),
            )
            .unwrap();
        assert_eq!(snap.state, MoneyRailOperationState::Released);
    }

    #[test]
    fn reversal_only_allowed_from_confirmed() {
        let reducer = MoneyRailOperationReducer;
        let snap = reducer
            .apply(
                None,
                &event(
                    "money_rail_operation.initiated",
                    serde_json::json!({"providerId": "stripe", "partyId": "party_1", "amountCents": 5000, "currency": "usd"}),
                ),
            )
            .unwrap();
        let err = reducer.apply(
            Some(snap),
            &event("money_rail_operation.reversed", serde_json::json!({"providerEventId": "evt_x"})),
        );
        assert!(err.is_err());
    }

    #[test]
    fn duplicate_provider_event_ingest_is_a_no_op() {
        let reducer = MoneyRailOperationReducer;
        let snap = reducer
            .apply(
                None,
                &event(
                    "money_rail_operation.initiated",
                    serde_json::json!({"providerId": "stripe", "partyId": "party_1", "amountCents": 5000, "currency": "usd"}),
                ),
            )
            .unwrap();
        let snap = reducer
            .apply(
                Some(snap),
                &event("money_rail_operation.submitted", serde_json::json!({"providerEventId": "evt_a"})),
            )
            .unwrap();
        let replayed = reducer
            .apply(
                Some(snap.clone()),
                &event("money_rail_operation.submitted", serde_json::json!({"providerEventId": "evt_a"})),
            )
            .unwrap();
        assert_eq!(replayed.revision, snap.revision);
        assert_eq!(replayed.state, MoneyRailOperationState::Submitted);
    }
}
