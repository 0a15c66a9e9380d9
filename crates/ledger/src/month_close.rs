//! `MonthClose` aggregate (spec §4.6): "A `MonthClose` aggregate is `OPEN →
//! CLOSED`. On close, the worker produces a `MonthlyStatement.v1` artifact
//! per tenant+month and freezes the basis; reopening is allowed only via an
//! explicit event and clears `statementArtifactId/Hash`."

use serde::{Deserialize, Serialize};
use settld_api::Reducer;
use settld_types::{ArtifactId, Event, MonthCloseId, TenantId};

use crate::error::LedgerError;
use crate::statement::StatementBasis;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthCloseState {
    Open,
    Closed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonthCloseSnapshot {
    pub month_close_id: MonthCloseId,
    pub tenant_id: TenantId,
    pub month: String,
    pub state: MonthCloseState,
    pub basis: Option<StatementBasis>,
    pub statement_artifact_id: Option<ArtifactId>,
    pub statement_artifact_hash: Option<String>,
    pub revision: u64,
}

#[derive(Default)]
pub struct MonthCloseReducer;

impl Reducer for MonthCloseReducer {
    type Snapshot = MonthCloseSnapshot;

    fn apply(
        &self,
        snapshot: Option<Self::Snapshot>,
        event: &Event,
    ) -> Result<Self::Snapshot, settld_api::CoordinatorError> {
        apply_month_close_event(snapshot, event)
            .map_err(|e| settld_api::CoordinatorError::Other(anyhow::anyhow!(e)))
    }
}

fn apply_month_close_event(
    snapshot: Option<MonthCloseSnapshot>,
    event: &Event,
) -> Result<MonthCloseSnapshot, LedgerError> {
    let payload = &event.payload;
    match event.event_type.as_str() {
        "month_close.opened" => Ok(MonthCloseSnapshot {
            month_close_id: MonthCloseId::from(event.stream_id.as_str().to_string()),
            tenant_id: event.tenant_id.clone(),
            month: field_str(payload, "month")?.to_string(),
            state: MonthCloseState::Open,
            basis: None,
            statement_artifact_id: None,
            statement_artifact_hash: None,
            revision: 1,
        }),
        "month_close.closed" => {
            let mut snap = require(snapshot)?;
            if snap.state == MonthCloseState::Closed {
                return Err(LedgerError::MonthCloseAlreadyClosed(
                    snap.month_close_id.to_string(),
                ));
            }
            snap.state = MonthCloseState::Closed;
            snap.basis = Some(StatementBasis::SettledAt);
            snap.statement_artifact_id = Some(ArtifactId::from(
                field_str(payload, "statementArtifactId")?.to_string(),
            ));
            snap.statement_artifact_hash =
                Some(field_str(payload, "statementArtifactHash")?.to_string());
            snap.revision += 1;
            Ok(snap)
        }
        "month_close.reopened" => {
            let mut snap = require(snapshot)?;
            if snap.state != MonthCloseState::Closed {
                return Err(LedgerError::MonthCloseNotClosed(
                    snap.month_close_id.to_string(),
                ));
            }
            snap.state = MonthCloseState::Open;
            snap.statement_artifact_id = None;
            snap.statement_artifact_hash = None;
            snap.revision += 1;
            Ok(snap)
        }
        other => Err(LedgerError::EventPayloadInvalid(format!(
            "unrecognized MonthClose event type '{other}'"
        ))),
    }
}

fn require(snapshot: Option<MonthCloseSnapshot>) -> Result<MonthCloseSnapshot, LedgerError> {
    snapshot.ok_or_else(|| {
        LedgerError::EventPayloadInvalid("event applied to a stream with no snapshot".into())
    })
}

fn field_str<'a>(v: &'a serde_json::Value, field: &str) -> Result<&'a str, LedgerError> {
    v.get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| LedgerError::EventPayloadInvalid(format!("missing field '{field}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use settld_types::{Actor, StreamId, StreamKind, Timestamp};

    fn event(event_type: &str, payload: serde_json::Value) -> Event {
        Event {
            id: settld_types::EventId::from("evt_1".to_string()),
            stream_id: StreamId::from("monthclose_2026-01".to_string()),
            stream_kind: StreamKind::MonthClose,
            event_type: event_type.to_string(),
            at: Timestamp::parse("2026-02-01T00:00:00Z").unwrap(),
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
    fn open_then_close_then_reopen_clears_statement_refs() {
        let reducer = MonthCloseReducer;
        let snap = reducer
            .apply(None, &event("month_close.opened", serde_json::json!({"month": "2026-01"})))
            .unwrap();
        assert_eq!(snap.state, MonthCloseState::Open);

        let snap = reducer
            .apply(
                Some(snap),
                &event(
                    "month_close.closed",
                    serde_json::json!({
                        "statementArtifactId": "artifact_1",
                        "statementArtifactHash": "hash_1",
                    }),
                ),
            )
            .unwrap();
        assert_eq!(snap.state, MonthCloseState::Closed);
        assert_eq!(snap.statement_artifact_hash.as_deref(), Some("hash_1"));

        let snap = reducer
            .apply(Some(snap), &event("month_close.reopened", serde_json::json!({})))
            .unwrap();
        assert_eq!(snap.state, MonthCloseState::Open);
        assert!(snap.statement_artifact_hash.is_none());
    }

    #[test]
    fn closing_twice_fails() {
        let reducer = MonthCloseReducer;
        let snap = reducer
            .apply(None, &event("month_close.opened", serde_json::json!({"month": "2026-01"})))
            .unwrap();
        let snap = reducer
            .apply(
                Some(snap),
                &event(
                    "month_close.closed",
                    serde_json::json!({
                        "statementArtifactId": "artifact_1",
                        "statementArtifactHash": "hash_1",
                    }),
                ),
            )
            .unwrap();
        let result = reducer.apply(
            Some(snap),
            &event(
                "month_close.closed",
                serde_json::json!({
                    "statementArtifactId": "artifact_2",
                    "statementArtifactHash": "hash_2",
                }),
            ),
        );
        assert!(result.is_err());
    }
}
