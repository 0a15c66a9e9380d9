//! The `Run` aggregate (spec §3, §6 `POST /agents/{id}/runs`,
//! `POST /agents/{id}/runs/{runId}/events`): one attempt by a specific agent
//! at executing a `Job`. A `Run` accumulates a log of step events
//! (tool calls, gate references) until it finishes, fails, or is aborted.
//! Mirrors the shape of [`crate::job::JobSnapshot`] one level down.

use serde::{Deserialize, Serialize};
use settld_api::Reducer;
use settld_types::{AgentId, Event, GateId, JobId, RunId, Timestamp};

use crate::error::CoordinatorDomainError;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Started,
    InProgress,
    Succeeded,
    Failed,
    Aborted,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed | RunState::Aborted)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunStepRecord {
    pub step_type: String,
    pub at: Timestamp,
    pub gate_id: Option<GateId>,
    pub detail: serde_json::Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub run_id: RunId,
    pub job_id: JobId,
    pub agent_id: AgentId,
    pub state: RunState,
    pub steps: Vec<RunStepRecord>,
    pub revision: u64,
}

#[derive(Default)]
pub struct RunReducer;

impl Reducer for RunReducer {
    type Snapshot = RunSnapshot;

    fn apply(
        &self,
        snapshot: Option<Self::Snapshot>,
        event: &Event,
    ) -> Result<Self::Snapshot, settld_api::CoordinatorError> {
        apply_run_event(snapshot, event)
            .map_err(|e| settld_api::CoordinatorError::Other(anyhow::anyhow!(e)))
    }
}

fn apply_run_event(
    snapshot: Option<RunSnapshot>,
    event: &Event,
) -> Result<RunSnapshot, CoordinatorDomainError> {
    let payload = &event.payload;
    match event.event_type.as_str() {
        "run.started" => Ok(RunSnapshot {
            run_id: RunId::from(event.stream_id.as_str().to_string()),
            job_id: JobId::from(field_str(payload, "jobId")?.to_string()),
            agent_id: AgentId::from(field_str(payload, "agentId")?.to_string()),
            state: RunState::InProgress,
            steps: Vec::new(),
            revision: 1,
        }),
        "run.step_recorded" => {
            let mut snap = require(snapshot)?;
            ensure_not_terminal(&snap)?;
            snap.steps.push(RunStepRecord {
                step_type: field_str(payload, "stepType")?.to_string(),
                at: event.at,
                gate_id: payload
                    .get("gateId")
                    .and_then(serde_json::Value::as_str)
                    .map(|s| GateId::from(s.to_string())),
                detail: payload.get("detail").cloned().unwrap_or(serde_json::Value::Null),
            });
            snap.revision += 1;
            Ok(snap)
        }
        "run.succeeded" => {
            let mut snap = require(snapshot)?;
            ensure_not_terminal(&snap)?;
            snap.state = RunState::Succeeded;
            snap.revision += 1;
            Ok(snap)
        }
        "run.failed" => {
            let mut snap = require(snapshot)?;
            ensure_not_terminal(&snap)?;
            snap.state = RunState::Failed;
            snap.revision += 1;
            Ok(snap)
        }
        "run.aborted" => {
            let mut snap = require(snapshot)?;
            ensure_not_terminal(&snap)?;
            snap.state = RunState::Aborted;
            snap.revision += 1;
            Ok(snap)
        }
        other => Err(CoordinatorDomainError::EventPayloadInvalid(format!(
            "unrecognized Run event type '{other}'"
        ))),
    }
}

fn ensure_not_terminal(snap: &RunSnapshot) -> Result<(), CoordinatorDomainError> {
    if snap.state.is_terminal() {
        return Err(CoordinatorDomainError::IllegalStateTransition {
            aggregate: "Run".to_string(),
            id: snap.run_id.to_string(),
            state: format!("{:?}", snap.state),
        });
    }
    Ok(())
}

fn require(snapshot: Option<RunSnapshot>) -> Result<RunSnapshot, CoordinatorDomainError> {
    snapshot.ok_or_else(|| {
        CoordinatorDomainError::EventPayloadInvalid(
            "event applied to a stream with no snapshot".into(),
        )
    })
}

fn field_str<'a>(v: &'a serde_json::Value, field: &str) -> Result<&'a str, CoordinatorDomainError> {
    v.get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| CoordinatorDomainError::EventPayloadInvalid(format!("missing field '{field}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use settld_types::{Actor, EventId, StreamId, StreamKind, TenantId};

    fn event(event_type: &str, payload: serde_json::Value) -> Event {
        Event {
            id: EventId::from("evt_1".to_string()),
            stream_id: StreamId::from("run_1".to_string()),
            stream_kind: StreamKind::Run,
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
    fn started_then_step_then_succeeded() {
        let reducer = RunReducer;
        let snap = reducer
            .apply(
                None,
                &event(
                    "run.started",
                    serde_json::json!({"jobId": "job_1", "agentId": "agent_1"}),
                ),
            )
            .unwrap();
        assert_eq!(snap.state, RunState::InProgress);

        let snap = reducer
            .apply(
                Some(snap),
                &event(
                    "run.step_recorded",
                    serde_json::json!({"stepType": "tool_call", "gateId": "gate_1"}),
                ),
            )
            .unwrap();
        assert_eq!(snap.steps.len(), 1);

        let snap = reducer.apply(Some(snap), &event("run.succeeded", serde_json::json!({}))).unwrap();
        assert_eq!(snap.state, RunState::Succeeded);
    }

    #[test]
    fn terminal_run_rejects_further_events() {
        let reducer = RunReducer;
        let snap = reducer
            .apply(
                None,
                &event(
                    "run.started",
                    serde_json::json!({"jobId": "job_1", "agentId": "agent_1"}),
                ),
            )
            .unwrap();
        let snap = reducer.apply(Some(snap), &event("run.failed", serde_json::json!({}))).unwrap();
        assert!(reducer
            .apply(Some(snap), &event("run.succeeded", serde_json::json!({})))
            .is_err());
    }
}
