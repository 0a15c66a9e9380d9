//! The `Job` aggregate (spec §3 "Stream kinds and aggregates"): a
//! principal-created work order with a quoted price and SLA window, ahead
//! of any particular agent's execution of it (spec §1 "Principals create
//! *runs* (jobs) with a quoted price and SLA window; agents execute them").
//! One `Job` may fan out into several `Run`s (e.g. retries); this reducer
//! only tracks which runs are linked, not their individual progress —
//! that's [`crate::run::RunSnapshot`]'s job.

use serde::{Deserialize, Serialize};
use settld_api::Reducer;
use settld_types::{Cents, Currency, Event, JobId, RunId, Timestamp};

use crate::error::CoordinatorDomainError;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Open,
    Assigned,
    Completed,
    Canceled,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub job_id: JobId,
    pub principal: String,
    pub description: String,
    pub quoted_price_cents: Cents,
    pub currency: Currency,
    pub sla_deadline: Option<Timestamp>,
    pub state: JobState,
    pub assigned_agent_id: Option<String>,
    pub run_ids: Vec<RunId>,
    pub revision: u64,
}

#[derive(Default)]
pub struct JobReducer;

impl Reducer for JobReducer {
    type Snapshot = JobSnapshot;

    fn apply(
        &self,
        snapshot: Option<Self::Snapshot>,
        event: &Event,
    ) -> Result<Self::Snapshot, settld_api::CoordinatorError> {
        apply_job_event(snapshot, event)
            .map_err(|e| settld_api::CoordinatorError::Other(anyhow::anyhow!(e)))
    }
}

fn apply_job_event(
    snapshot: Option<JobSnapshot>,
    event: &Event,
) -> Result<JobSnapshot, CoordinatorDomainError> {
    let payload = &event.payload;
    match event.event_type.as_str() {
        "job.created" => Ok(JobSnapshot {
            job_id: JobId::from(event.stream_id.as_str().to_string()),
            principal: field_str(payload, "principal")?.to_string(),
            description: field_str(payload, "description")?.to_string(),
            quoted_price_cents: field_i64(payload, "quotedPriceCents")?,
            currency: Currency::new(field_str(payload, "currency")?),
            sla_deadline: payload
                .get("slaDeadline")
                .and_then(serde_json::Value::as_str)
                .and_then(|s| Timestamp::parse(s).ok()),
            state: JobState::Open,
            assigned_agent_id: None,
            run_ids: Vec::new(),
            revision: 1,
        }),
        "job.assigned" => {
            let mut snap = require(snapshot)?;
            snap.assigned_agent_id = Some(field_str(payload, "agentId")?.to_string());
            snap.state = JobState::Assigned;
            snap.revision += 1;
            Ok(snap)
        }
        "job.run_linked" => {
            let mut snap = require(snapshot)?;
            snap.run_ids.push(RunId::from(field_str(payload, "runId")?.to_string()));
            snap.revision += 1;
            Ok(snap)
        }
        "job.completed" => {
            let mut snap = require(snapshot)?;
            if snap.state == JobState::Canceled {
                return Err(CoordinatorDomainError::IllegalStateTransition {
                    aggregate: "Job".to_string(),
                    id: snap.job_id.to_string(),
                    state: "canceled".to_string(),
                });
            }
            snap.state = JobState::Completed;
            snap.revision += 1;
            Ok(snap)
        }
        "job.canceled" => {
            let mut snap = require(snapshot)?;
            snap.state = JobState::Canceled;
            snap.revision += 1;
            Ok(snap)
        }
        other => Err(CoordinatorDomainError::EventPayloadInvalid(format!(
            "unrecognized Job event type '{other}'"
        ))),
    }
}

fn require(snapshot: Option<JobSnapshot>) -> Result<JobSnapshot, CoordinatorDomainError> {
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

fn field_i64(v: &serde_json::Value, field: &str) -> Result<i64, CoordinatorDomainError> {
    v.get(field)
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| CoordinatorDomainError::EventPayloadInvalid(format!("missing field '{field}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use settld_types::{Actor, StreamId, StreamKind, TenantId};

    fn event(event_type: &str, payload: serde_json::Value) -> Event {
        Event {
            id: settld_types::EventId::from("evt_1".to_string()),
            stream_id: StreamId::from("job_1".to_string()),
            stream_kind: StreamKind::Job,
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
    fn created_then_assigned_then_linked_then_completed() {
        let reducer = JobReducer;
        let snap = reducer
            .apply(
                None,
                &event(
                    "job.created",
                    serde_json::json!({
                        "principal": "acct_1",
                        "description": "scrape and summarize",
                        "quotedPriceCents": 400,
                        "currency": "USD",
                    }),
                ),
            )
            .unwrap();
        assert_eq!(snap.state, JobState::Open);

        let snap = reducer
            .apply(Some(snap), &event("job.assigned", serde_json::json!({"agentId": "agent_1"})))
            .unwrap();
        assert_eq!(snap.state, JobState::Assigned);

        let snap = reducer
            .apply(Some(snap), &event("job.run_linked", serde_json::json!({"runId": "run_1"})))
            .unwrap();
        assert_eq!(snap.run_ids.len(), 1);

        let snap = reducer.apply(Some(snap), &event("job.completed", serde_json::json!({}))).unwrap();
        assert_eq!(snap.state, JobState::Completed);
    }

    #[test]
    fn completing_a_canceled_job_fails() {
        let reducer = JobReducer;
        let snap = reducer
            .apply(
                None,
                &event(
                    "job.created",
                    serde_json::json!({
                        "principal": "acct_1",
                        "description": "d",
                        "quotedPriceCents": 100,
                        "currency": "USD",
                    }),
                ),
            )
            .unwrap();
        let snap = reducer
            .apply(Some(snap), &event("job.canceled", serde_json::json!({})))
            .unwrap();
        assert!(reducer.apply(Some(snap), &event("job.completed", serde_json::json!({}))).is_err());
    }
}
