//! The `ArbitrationCase` aggregate (spec §4.9): opened when a dispute
//! escalates, resolved by a binary arbiter verdict (`uphold | reverse`)
//! that is translated into ledger adjustments and folds back into the
//! gate's `x402_gate.resolved` event.
//!
//! ```text
//!     opened → resolved
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use settld_api::Reducer;
use settld_types::{ArbitrationCaseId, Cents, DisputeCaseId, Event, GateId};

use crate::error::DisputeError;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbitrationCaseState {
    Opened,
    Resolved,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Uphold,
    Reverse,
}

impl Verdict {
    pub fn parse(s: &str) -> Result<Self, DisputeError> {
        match s {
            "uphold" => Ok(Verdict::Uphold),
            "reverse" => Ok(Verdict::Reverse),
            other => Err(DisputeError::InvalidVerdict(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Uphold => "uphold",
            Verdict::Reverse => "reverse",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArbitrationCaseSnapshot {
    pub case_id: ArbitrationCaseId,
    pub dispute_case_id: DisputeCaseId,
    pub gate_id: GateId,
    pub arbiter_id: String,
    pub state: ArbitrationCaseState,
    pub verdict: Option<Verdict>,
    pub revision: u64,
}

#[derive(Default)]
pub struct ArbitrationCaseReducer;

impl Reducer for ArbitrationCaseReducer {
    type Snapshot = ArbitrationCaseSnapshot;

    fn apply(
        &self,
        snapshot: Option<Self::Snapshot>,
        event: &Event,
    ) -> Result<Self::Snapshot, settld_api::CoordinatorError> {
        apply_arbitration_case_event(snapshot, event)
            .map_err(|e| settld_api::CoordinatorError::Other(anyhow::anyhow!(e)))
    }
}

fn apply_arbitration_case_event(
    snapshot: Option<ArbitrationCaseSnapshot>,
    event: &Event,
) -> Result<ArbitrationCaseSnapshot, DisputeError> {
    let payload = &event.payload;
    match event.event_type.as_str() {
        "arbitration_case.opened" => Ok(ArbitrationCaseSnapshot {
            case_id: ArbitrationCaseId::from(field_str(payload, "caseId")?.to_string()),
            dispute_case_id: DisputeCaseId::from(field_str(payload, "disputeCaseId")?.to_string()),
            gate_id: GateId::from(field_str(payload, "gateId")?.to_string()),
            arbiter_id: field_str(payload, "arbiterId")?.to_string(),
            state: ArbitrationCaseState::Opened,
            verdict: None,
            revision: 1,
        }),
        "arbitration_case.resolved" => {
            let mut snap = require(snapshot)?;
            if snap.state != ArbitrationCaseState::Opened {
                return Err(DisputeError::IllegalStateTransition {
                    case_id: snap.case_id.to_string(),
                    state: "resolved".to_string(),
                });
            }
            snap.verdict = Some(Verdict::parse(field_str(payload, "verdict")?)?);
            snap.state = ArbitrationCaseState::Resolved;
            snap.revision += 1;
            Ok(snap)
        }
        other => Err(DisputeError::EventPayloadInvalid(format!(
            "unrecognized ArbitrationCase event type '{other}'"
        ))),
    }
}

pub struct OpenArbitrationInput {
    pub case_id: ArbitrationCaseId,
    pub dispute_case_id: DisputeCaseId,
    pub gate_id: GateId,
    pub arbiter_id: String,
}

/// Decides the `arbitration_case.opened` payload (spec §4.9 "Escalation
/// moves to `arbitrating`").
pub fn decide_open_arbitration(input: OpenArbitrationInput) -> Value {
    json!({
        "caseId": input.case_id.as_str(),
        "disputeCaseId": input.dispute_case_id.as_str(),
        "gateId": input.gate_id.as_str(),
        "arbiterId": input.arbiter_id,
    })
}

/// The payloads a resolved arbitration produces: `arbitration_case.resolved`
/// on the `ArbitrationCase` stream, `dispute_case.closed` on the
/// `DisputeCase` stream, and `x402_gate.resolved` on the `X402Gate` stream,
/// carrying the released/refunded split the verdict implies (spec §4.9
/// "Terminal states map to ledger adjustments").
pub struct ResolveArbitrationDecision {
    pub arbitration_payload: Value,
    pub dispute_case_payload: Value,
    pub gate_event_payload: Value,
    pub released_cents: Cents,
    pub refunded_cents: Cents,
}

pub struct ResolveArbitrationInput {
    pub verdict: Verdict,
    pub amount_cents: Cents,
    pub already_released_cents: Cents,
    pub already_refunded_cents: Cents,
    pub binding_evidence: Option<String>,
    pub gate_request_binding_hash: String,
    pub gate_id: GateId,
}

/// Translates a binary verdict into a final released/refunded split
/// (spec §4.9). `uphold` keeps the settlement that already happened;
/// `reverse` moves every cent the payee had received back to the payer, so
/// the case's final state is always fully released or fully refunded,
/// never a partial carry-over from the pre-dispute split.
pub fn decide_resolve_arbitration(
    input: ResolveArbitrationInput,
) -> Result<ResolveArbitrationDecision, DisputeError> {
    check_binding(
        &input.gate_id,
        input.binding_evidence.as_deref(),
        &input.gate_request_binding_hash,
    )?;

    let (released_cents, refunded_cents) = match input.verdict {
        Verdict::Uphold => (input.already_released_cents, input.already_refunded_cents),
        Verdict::Reverse => (0, input.amount_cents),
    };

    Ok(ResolveArbitrationDecision {
        arbitration_payload: json!({ "verdict": input.verdict.as_str() }),
        dispute_case_payload: json!({}),
        gate_event_payload: json!({
            "releasedCents": released_cents,
            "refundedCents": refunded_cents,
            "bindingEvidence": input.binding_evidence,
        }),
        released_cents,
        refunded_cents,
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

fn require(
    snapshot: Option<ArbitrationCaseSnapshot>,
) -> Result<ArbitrationCaseSnapshot, DisputeError> {
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
    use settld_types::{Actor, EventId, StreamId, StreamKind, TenantId, Timestamp};

    fn event(event_type: &str, payload: Value) -> Event {
        Event {
            id: EventId::from("evt_1".to_string()),
            stream_id: StreamId::from("arbitration_case_1".to_string()),
            stream_kind: StreamKind::ArbitrationCase,
            event_type: event_type.to_string(),
            at: Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
            actor: Actor::Operator {
                operator_id: "arbiter_1".to_string(),
            },
            payload,
            prev_chain_hash: None,
            chain_hash: "deadbeef".to_string(),
            signature: None,
            key_id: None,
            tenant_id: TenantId::default_tenant(),
        }
    }

    #[test]
    fn opening_then_resolving_records_verdict() {
        let opened = apply_arbitration_case_event(
            None,
            &event(
                "arbitration_case.opened",
                json!({"caseId": "arb_1", "disputeCaseId": "case_1", "gateId": "gate_1", "arbiterId": "arbiter_1"}),
            ),
        )
        .unwrap();
        assert_eq!(opened.state, ArbitrationCaseState::Opened);

        let resolved = apply_arbitration_case_event(
            Some(opened),
            &event("arbitration_case.resolved", json!({"verdict": "reverse"})),
        )
        .unwrap();
        assert_eq!(resolved.state, ArbitrationCaseState::Resolved);
        assert_eq!(resolved.verdict, Some(Verdict::Reverse));
    }

    #[test]
    fn reverse_verdict_refunds_the_full_amount() {
        let decision = decide_resolve_arbitration(ResolveArbitrationInput {
            verdict: Verdict::Reverse,
            amount_cents: 1000,
            already_released_cents: 1000,
            already_refunded_cents: 0,
            binding_evidence: Some("hash_1".to_string()),
            gate_request_binding_hash: "hash_1".to_string(),
            gate_id: GateId::from("gate_1".to_string()),
        })
        .unwrap();
        assert_eq!(decision.released_cents, 0);
        assert_eq!(decision.refunded_cents, 1000);
    }

    #[test]
    fn uphold_verdict_keeps_the_prior_split() {
        let decision = decide_resolve_arbitration(ResolveArbitrationInput {
            verdict: Verdict::Uphold,
            amount_cents: 1000,
            already_released_cents: 800,
            already_refunded_cents: 200,
            binding_evidence: Some("hash_1".to_string()),
            gate_request_binding_hash: "hash_1".to_string(),
            gate_id: GateId::from("gate_1".to_string()),
        })
        .unwrap();
        assert_eq!(decision.released_cents, 800);
        assert_eq!(decision.refunded_cents, 200);
    }

    #[test]
    fn invalid_verdict_string_is_rejected() {
        let err = Verdict::parse("maybe").unwrap_err();
        assert!(matches!(err, DisputeError::InvalidVerdict(_)));
    }
}
