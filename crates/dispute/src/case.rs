//! The `DisputeCase` aggregate (spec §4.9 "Two parallel state machines with
//! the binding-evidence requirement applied to each transition ... A
//! dispute that expires its window transitions to `auto_closed`.").
//!
//! ```text
//!     open → escalated → closed
//!       ↘ auto_closed       ↘ closed
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use settld_api::Reducer;
use settld_types::{DisputeCaseId, Event, GateId, Timestamp};

use crate::error::DisputeError;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeCaseState {
    Open,
    Escalated,
    Closed,
    AutoClosed,
}

impl DisputeCaseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisputeCaseState::Open => "open",
            DisputeCaseState::Escalated => "escalated",
            DisputeCaseState::Closed => "closed",
            DisputeCaseState::AutoClosed => "auto_closed",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisputeCaseSnapshot {
    pub case_id: DisputeCaseId,
    pub gate_id: GateId,
    pub opened_by: String,
    pub reason: String,
    pub state: DisputeCaseState,
    pub evidence_refs: Vec<String>,
    pub arbitration_case_id: Option<String>,
    pub revision: u64,
}

#[derive(Default)]
pub struct DisputeCaseReducer;

impl Reducer for DisputeCaseReducer {
    type Snapshot = DisputeCaseSnapshot;

    fn apply(
        &self,
        snapshot: Option<Self::Snapshot>,
        event: &Event,
    ) -> Result<Self::Snapshot, settld_api::CoordinatorError> {
        apply_dispute_case_event(snapshot, event)
            .map_err(|e| settld_api::CoordinatorError::Other(anyhow::anyhow!(e)))
    }
}

fn apply_dispute_case_event(
    snapshot: Option<DisputeCaseSnapshot>,
    event: &Event,
) -> Result<DisputeCaseSnapshot, DisputeError> {
    let payload = &event.payload;
    match event.event_type.as_str() {
        "dispute_case.opened" => Ok(DisputeCaseSnapshot {
            case_id: DisputeCaseId::from(field_str(payload, "caseId")?.to_string()),
            gate_id: GateId::from(field_str(payload, "gateId")?.to_string()),
            opened_by: field_str(payload, "openedBy")?.to_string(),
            reason: field_str(payload, "reason")?.to_string(),
            state: DisputeCaseState::Open,
            evidence_refs: Vec::new(),
            arbitration_case_id: None,
            revision: 1,
        }),
        "dispute_case.evidence_submitted" => {
            let mut snap = require(snapshot)?;
            if snap.state != DisputeCaseState::Open {
                return Err(DisputeError::IllegalStateTransition {
                    case_id: snap.case_id.to_string(),
                    state: snap.state.as_str().to_string(),
                });
            }
            if let Some(refs) = payload.get("evidenceRefs").and_then(Value::as_array) {
                for r in refs {
                    if let Some(s) = r.as_str() {
                        snap.evidence_refs.push(s.to_string());
                    }
                }
            }
            snap.revision += 1;
            Ok(snap)
        }
        "dispute_case.escalated" => {
            let mut snap = require(snapshot)?;
            if snap.state != DisputeCaseState::Open {
                return Err(DisputeError::IllegalStateTransition {
                    case_id: snap.case_id.to_string(),
                    state: snap.state.as_str().to_string(),
                });
            }
            snap.state = DisputeCaseState::Escalated;
            snap.arbitration_case_id = payload
                .get("arbitrationCaseId")
                .and_then(Value::as_str)
                .map(str::to_string);
            snap.revision += 1;
            Ok(snap)
        }
        "dispute_case.closed" => {
            let mut snap = require(snapshot)?;
            if !matches!(
                snap.state,
                DisputeCaseState::Open | DisputeCaseState::Escalated
            ) {
                return Err(DisputeError::IllegalStateTransition {
                    case_id: snap.case_id.to_string(),
                    state: snap.state.as_str().to_string(),
                });
            }
            snap.state = DisputeCaseState::Closed;
            snap.revision += 1;
            Ok(snap)
        }
        "dispute_case.auto_closed" => {
            let mut snap = require(snapshot)?;
            if snap.state != DisputeCaseState::Open {
                return Err(DisputeError::IllegalStateTransition {
                    case_id: snap.case_id.to_string(),
                    state: snap.state.as_str().to_string(),
                });
            }
            snap.state = DisputeCaseState::AutoClosed;
            snap.revision += 1;
            Ok(snap)
        }
        other => Err(DisputeError::EventPayloadInvalid(format!(
            "unrecognized DisputeCase event type '{other}'"
        ))),
    }
}

/// The payloads needed to open a dispute: the `dispute_case.opened` event
/// (new `DisputeCase` stream) plus the `x402_gate.disputed` event that
/// folds into the gate's own state machine (spec §4.5 "Dispute window &
/// arbitration"). Both are produced here so the caller appends them inside
/// one coordinator-level operation; the kernel itself only ever appends to
/// one stream per call.
pub struct OpenDisputeDecision {
    pub dispute_case_payload: Value,
    pub gate_event_payload: Value,
}

pub struct OpenDisputeInput {
    pub case_id: DisputeCaseId,
    pub gate_id: GateId,
    pub opened_by: String,
    pub reason: String,
    pub binding_evidence: Option<String>,
    pub gate_request_binding_hash: String,
    pub gate_settled: bool,
    pub dispute_window_days: u32,
    pub gate_settled_at: Timestamp,
    pub now: Timestamp,
}

/// Decides whether a dispute may be opened against a settled gate (spec
/// §4.9, §4.5 "A configurable `disputeWindowDays` starts at release;
/// during it the payer can open a dispute").
pub fn decide_open_dispute(input: OpenDisputeInput) -> Result<OpenDisputeDecision, DisputeError> {
    if !input.gate_settled {
        return Err(DisputeError::GateNotSettled(input.gate_id.to_string()));
    }
    let closes_at = Timestamp::from_offset(
        input.gate_settled_at.as_offset() + time::Duration::days(i64::from(input.dispute_window_days)),
    );
    if input.now >= closes_at {
        return Err(DisputeError::DisputeWindowClosed {
            gate_id: input.gate_id.to_string(),
            closed_at: closes_at.to_rfc3339(),
        });
    }
    check_binding(
        &input.gate_id,
        input.binding_evidence.as_deref(),
        &input.gate_request_binding_hash,
    )?;

    Ok(OpenDisputeDecision {
        dispute_case_payload: json!({
            "caseId": input.case_id.as_str(),
            "gateId": input.gate_id.as_str(),
            "openedBy": input.opened_by,
            "reason": input.reason,
        }),
        gate_event_payload: json!({
            "bindingEvidence": input.binding_evidence,
        }),
    })
}

pub struct SubmitEvidenceInput {
    pub evidence_refs: Vec<String>,
    pub binding_evidence: Option<String>,
    pub gate_request_binding_hash: String,
    pub gate_id: GateId,
}

/// Decides the `dispute_case.evidence_submitted` payload (spec §4.9 "the
/// binding-evidence requirement applied to each transition").
pub fn decide_submit_evidence(input: SubmitEvidenceInput) -> Result<Value, DisputeError> {
    check_binding(
        &input.gate_id,
        input.binding_evidence.as_deref(),
        &input.gate_request_binding_hash,
    )?;
    Ok(json!({ "evidenceRefs": input.evidence_refs }))
}

pub struct EscalateDisputeDecision {
    pub dispute_case_payload: Value,
    pub gate_event_payload: Value,
}

pub struct EscalateDisputeInput {
    pub arbitration_case_id: String,
    pub binding_evidence: Option<String>,
    pub gate_request_binding_hash: String,
    pub gate_id: GateId,
}

/// Decides the payloads for escalating an open dispute into arbitration:
/// `dispute_case.escalated` plus `x402_gate.arbitrating`.
pub fn decide_escalate_dispute(
    input: EscalateDisputeInput,
) -> Result<EscalateDisputeDecision, DisputeError> {
    check_binding(
        &input.gate_id,
        input.binding_evidence.as_deref(),
        &input.gate_request_binding_hash,
    )?;
    Ok(EscalateDisputeDecision {
        dispute_case_payload: json!({
            "arbitrationCaseId": input.arbitration_case_id,
        }),
        gate_event_payload: json!({
            "bindingEvidence": input.binding_evidence,
        }),
    })
}

fn check_binding(
    gate_id: &GateId,
    binding_evidence: Option<&str>,
    expected: &str,
) -> Result<(), DisputeError> {
    match binding_evidence {
        None => Err(DisputeError::BindingEvidenceRequired(gate_id.to_string())),
        Some(evidence) if evidence != expected => {
            Err(DisputeError::BindingEvidenceMismatch(gate_id.to_string()))
        }
        Some(_) => Ok(()),
    }
}

fn require(snapshot: Option<DisputeCaseSnapshot>) -> Result<DisputeCaseSnapshot, DisputeError> {
    snapshot.ok_or_else(|| {
        DisputeError::EventPayloadInvalid("event applied to a stream with no snapshot".into())
    })
}

fn field_str<'a>(v: &'a Value, field: &str) -> Result<&'a str, DisputeError> {
    v.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| DisputeError::EventPayloadInvalid(format!("missing field '{field}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(event_type: &str, payload: Value) -> Event {
        Event {
            id: settld_types::EventId::from("evt_1".to_string()),
            stream_id: settld_types::StreamId::from("dispute_case_1".to_string()),
            stream_kind: settld_types::StreamKind::DisputeCase,
            event_type: event_type.to_string(),
            at: Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
            actor: settld_types::Actor::Operator {
                operator_id: "operator_1".to_string(),
            },
            payload,
            prev_chain_hash: None,
            chain_hash: "deadbeef".to_string(),
            signature: None,
            key_id: None,
            tenant_id: settld_types::TenantId::default_tenant(),
        }
    }

    #[test]
    fn opening_then_escalating_then_closing_advances_state() {
        let opened = apply_dispute_case_event(
            None,
            &event(
                "dispute_case.opened",
                json!({"caseId": "case_1", "gateId": "gate_1", "openedBy": "agent_payer", "reason": "quality"}),
            ),
        )
        .unwrap();
        assert_eq!(opened.state, DisputeCaseState::Open);

        let escalated = apply_dispute_case_event(
            Some(opened),
            &event(
                "dispute_case.escalated",
                json!({"arbitrationCaseId": "arb_1"}),
            ),
        )
        .unwrap();
        assert_eq!(escalated.state, DisputeCaseState::Escalated);
        assert_eq!(escalated.arbitration_case_id.as_deref(), Some("arb_1"));

        let closed =
            apply_dispute_case_event(Some(escalated), &event("dispute_case.closed", json!({})))
                .unwrap();
        assert_eq!(closed.state, DisputeCaseState::Closed);
    }

    #[test]
    fn cannot_escalate_a_closed_case() {
        let opened = apply_dispute_case_event(
            None,
            &event(
                "dispute_case.opened",
                json!({"caseId": "case_1", "gateId": "gate_1", "openedBy": "agent_payer", "reason": "quality"}),
            ),
        )
        .unwrap();
        let closed =
            apply_dispute_case_event(Some(opened), &event("dispute_case.closed", json!({})))
                .unwrap();
        let err = apply_dispute_case_event(
            Some(closed),
            &event(
                "dispute_case.escalated",
                json!({"arbitrationCaseId": "arb_1"}),
            ),
        )
        .unwrap_err();
        assert!(matches!(err, DisputeError::IllegalStateTransition { .. }));
    }

    #[test]
    fn decide_open_dispute_rejects_unsettled_gate() {
        let err = decide_open_dispute(OpenDisputeInput {
            case_id: DisputeCaseId::from("case_1".to_string()),
            gate_id: GateId::from("gate_1".to_string()),
            opened_by: "agent_payer".to_string(),
            reason: "quality".to_string(),
            binding_evidence: Some("hash_1".to_string()),
            gate_request_binding_hash: "hash_1".to_string(),
            gate_settled: false,
            dispute_window_days: 7,
            gate_settled_at: Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
            now: Timestamp::parse("2026-01-02T00:00:00Z").unwrap(),
        })
        .unwrap_err();
        assert!(matches!(err, DisputeError::GateNotSettled(_)));
    }

    #[test]
    fn decide_open_dispute_rejects_after_window_closes() {
        let err = decide_open_dispute(OpenDisputeInput {
            case_id: DisputeCaseId::from("case_1".to_string()),
            gate_id: GateId::from("gate_1".to_string()),
            opened_by: "agent_payer".to_string(),
            reason: "quality".to_string(),
            binding_evidence: Some("hash_1".to_string()),
            gate_request_binding_hash: "hash_1".to_string(),
            gate_settled: true,
            dispute_window_days: 1,
            gate_settled_at: Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
            now: Timestamp::parse("2026-01-03T00:00:00Z").unwrap(),
        })
        .unwrap_err();
        assert!(matches!(err, DisputeError::DisputeWindowClosed { .. }));
    }

    #[test]
    fn decide_open_dispute_requires_binding_evidence() {
        let err = decide_open_dispute(OpenDisputeInput {
            case_id: DisputeCaseId::from("case_1".to_string()),
            gate_id: GateId::from("gate_1".to_string()),
            opened_by: "agent_payer".to_string(),
            reason: "quality".to_string(),
            binding_evidence: None,
            gate_request_binding_hash: "hash_1".to_string(),
            gate_settled: true,
            dispute_window_days: 7,
            gate_settled_at: Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
            now: Timestamp::parse("2026-01-02T00:00:00Z").unwrap(),
        })
        .unwrap_err();
        assert!(matches!(err, DisputeError::BindingEvidenceRequired(_)));
    }
}
