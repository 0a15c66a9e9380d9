//! The `X402Gate` aggregate and state machine (spec §4.5):
//!
//! ```text
//!     created → authorized → verified → (released | refunded | partial)
//!         ↘ canceled           ↘ disputed → arbitrating → resolved
//! ```
//!
//! Business-rule validation (agent lifecycle, delegation caps, prompt-risk,
//! binding evidence, the release matrix) lives in the `decide_*` command
//! functions, which are pure and return the event payload to append; the
//! [`GateReducer`] itself only re-validates payload shape and folds already-
//! decided events into the snapshot (spec §4.3 "every payload is re-checked
//! against its schema at reduce time").

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use settld_api::Reducer;
use settld_identity::TaintState;
use settld_types::{AgentId, Cents, Currency, Event, GateId};

use crate::binding::{
    check_binding_evidence, check_prompt_risk_evidence, check_request_binding_evidence,
    RequestBinding,
};
use crate::error::X402Error;
use crate::prompt_risk::{enforce_prompt_risk, evaluate_prompt_risk, ForceMode, PromptRiskOverride};
use crate::release_policy::{compute_release, ReleaseOutcome, ReleasePolicy, VerificationStatus};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    Created,
    Authorized,
    Verified,
    Released,
    Refunded,
    Partial,
    AwaitingManual,
    Canceled,
    Disputed,
    Arbitrating,
    Resolved,
}

impl GateState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateState::Created => "created",
            GateState::Authorized => "authorized",
            GateState::Verified => "verified",
            GateState::Released => "released",
            GateState::Refunded => "refunded",
            GateState::Partial => "partial",
            GateState::AwaitingManual => "awaiting_manual",
            GateState::Canceled => "canceled",
            GateState::Disputed => "disputed",
            GateState::Arbitrating => "arbitrating",
            GateState::Resolved => "resolved",
        }
    }

    /// States from which spec §4.5's dispute window may be opened: only
    /// after funds actually moved.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            GateState::Released | GateState::Refunded | GateState::Partial
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthorizationRecord {
    pub hold_id: String,
    pub delegation_grant_ref: Option<String>,
    pub execution_intent_idempotency_key: Option<String>,
    pub request_binding: RequestBinding,
    pub request_binding_hash: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub verification_status: VerificationStatus,
    pub run_status: String,
    pub evidence_refs: Vec<String>,
    pub verifier_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub released_cents: Cents,
    pub refunded_cents: Cents,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptRiskRecord {
    pub outcome: ForceMode,
    pub override_recorded: Option<PromptRiskOverride>,
    pub required_session_refs: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateSnapshot {
    pub gate_id: GateId,
    pub payer_agent_id: AgentId,
    pub payee_agent_id: AgentId,
    pub amount_cents: Cents,
    pub currency: Currency,
    pub tool_id: Option<String>,
    pub policy_ref: String,
    pub state: GateState,
    pub authorization: Option<AuthorizationRecord>,
    pub verification: Option<VerificationRecord>,
    pub settlement: Option<SettlementRecord>,
    pub prompt_risk: Option<PromptRiskRecord>,
    pub revision: u64,
}

impl GateSnapshot {
    pub fn requires_binding_evidence(
        &self,
        binding_evidence: Option<&str>,
    ) -> Result<(), X402Error> {
        let Some(authorization) = &self.authorization else {
            return Err(X402Error::BindingEvidenceRequired(
                self.gate_id.as_str().to_string(),
            ));
        };
        check_binding_evidence(
            self.gate_id.as_str(),
            binding_evidence,
            &authorization.request_binding_hash,
        )
    }
}

// ---------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------

pub struct CreateGateInput {
    pub gate_id: GateId,
    pub payer_agent_id: AgentId,
    pub payee_agent_id: AgentId,
    pub amount_cents: Cents,
    pub currency: Currency,
    pub tool_id: Option<String>,
    pub policy_ref: String,
    pub max_amount_cents: Cents,
    pub payer_active: bool,
    pub payee_active: bool,
}

/// Decides the `x402_gate.created` event payload (spec §4.5 "Create").
pub fn decide_create(input: CreateGateInput) -> Result<Value, X402Error> {
    if !input.payer_active {
        return Err(X402Error::AgentNotActive(input.payer_agent_id.to_string()));
    }
    if !input.payee_active {
        return Err(X402Error::AgentNotActive(input.payee_agent_id.to_string()));
    }
    if input.amount_cents > input.max_amount_cents {
        return Err(X402Error::AmountExceedsPolicy {
            amount_cents: input.amount_cents,
            max_amount_cents: input.max_amount_cents,
        });
    }
    Ok(json!({
        "gateId": input.gate_id.as_str(),
        "payerAgentId": input.payer_agent_id.as_str(),
        "payeeAgentId": input.payee_agent_id.as_str(),
        "amountCents": input.amount_cents,
        "currency": input.currency.0,
        "toolId": input.tool_id,
        "policyRef": input.policy_ref,
    }))
}

// ---------------------------------------------------------------------
// Authorize
// ---------------------------------------------------------------------

pub struct DelegationCheck {
    pub grant_ref: String,
    pub revoked: bool,
    pub per_call_limit_cents: Option<Cents>,
    pub daily_limit_cents: Option<Cents>,
    pub cumulative_today_cents: Cents,
}

pub struct AuthorizeInput {
    pub hold_id: String,
    pub payer_active: bool,
    pub payee_active: bool,
    pub delegation: Option<DelegationCheck>,
    pub global_force_mode: ForceMode,
    pub per_principal_force_mode: Option<ForceMode>,
    pub taint: TaintState,
    pub prompt_risk_override: Option<PromptRiskOverride>,
    pub wallet_decision_verified: Option<bool>,
    pub execution_intent_present: bool,
    pub execution_intent_idempotency_key: Option<String>,
    pub request_binding: RequestBinding,
}

/// Decides the `x402_gate.authorized` event payload (spec §4.5
/// "Authorize-payment").
pub fn decide_authorize(
    snapshot: &GateSnapshot,
    input: AuthorizeInput,
) -> Result<Value, X402Error> {
    if snapshot.state != GateState::Created {
        return Err(X402Error::IllegalStateTransition {
            gate_id: snapshot.gate_id.to_string(),
            state: snapshot.state.as_str().to_string(),
        });
    }
    if !input.payer_active {
        return Err(X402Error::AgentNotActive(snapshot.payer_agent_id.to_string()));
    }
    if !input.payee_active {
        return Err(X402Error::AgentNotActive(snapshot.payee_agent_id.to_string()));
    }

    if let Some(delegation) = &input.delegation {
        if delegation.revoked {
            return Err(X402Error::DelegationGrantRevoked(delegation.grant_ref.clone()));
        }
        if let Some(max) = delegation.per_call_limit_cents {
            if snapshot.amount_cents > max {
                return Err(X402Error::DelegationGrantPerCallExceeded(
                    delegation.grant_ref.clone(),
                ));
            }
        }
        if let Some(max) = delegation.daily_limit_cents {
            if delegation.cumulative_today_cents + snapshot.amount_cents > max {
                return Err(X402Error::DelegationGrantTotalExceeded(
                    delegation.grant_ref.clone(),
                ));
            }
        }
    }

    let outcome = evaluate_prompt_risk(
        input.global_force_mode,
        input.per_principal_force_mode,
        &input.taint,
    );
    enforce_prompt_risk(outcome, input.prompt_risk_override.as_ref())?;

    if input.wallet_decision_verified == Some(false) {
        return Err(X402Error::WalletIssuerDecisionRequired);
    }

    if !input.execution_intent_present {
        return Err(X402Error::ExecutionIntentRequired);
    }

    let required_session_refs = match &input.taint {
        TaintState::Tainted { refs } => refs.iter().map(|r| r.0.clone()).collect(),
        TaintState::Clean => Vec::new(),
    };

    let binding_hash = input.request_binding.binding_hash()?;

    Ok(json!({
        "holdId": input.hold_id,
        "delegationGrantRef": input.delegation.map(|d| d.grant_ref),
        "executionIntentIdempotencyKey": input.execution_intent_idempotency_key,
        "requestBinding": input.request_binding,
        "requestBindingHash": binding_hash,
        "promptRisk": {
            "outcome": outcome,
            "overrideRecorded": input.prompt_risk_override,
            "requiredSessionRefs": required_session_refs,
        },
    }))
}

// ---------------------------------------------------------------------
// Verify
// ---------------------------------------------------------------------

pub struct VerifyInput {
    pub verification_status: VerificationStatus,
    pub run_status: String,
    pub evidence_refs: Vec<String>,
    pub verifier_id: Option<String>,
    pub expected_request_sha256: String,
    pub expected_response_sha256: String,
    pub release_policy: ReleasePolicy,
}

pub struct VerifyOutcome {
    pub payload: Value,
    pub next_state: GateState,
}

/// Decides the verify-step event payload and resulting terminal/manual
/// state (spec §4.5 "Verify").
pub fn decide_verify(
    snapshot: &GateSnapshot,
    input: VerifyInput,
) -> Result<VerifyOutcome, X402Error> {
    if snapshot.state != GateState::Authorized {
        return Err(X402Error::IllegalStateTransition {
            gate_id: snapshot.gate_id.to_string(),
            state: snapshot.state.as_str().to_string(),
        });
    }

    check_request_binding_evidence(
        &input.evidence_refs,
        &input.expected_request_sha256,
        &input.expected_response_sha256,
    )?;

    if let Some(prompt_risk) = &snapshot.prompt_risk {
        check_prompt_risk_evidence(&input.evidence_refs, &prompt_risk.required_session_refs)?;
    }

    let release_outcome = compute_release(
        snapshot.amount_cents,
        input.verification_status,
        &input.release_policy,
    );

    let (next_state, released_cents, refunded_cents) = match release_outcome {
        ReleaseOutcome::AwaitingManual => (GateState::AwaitingManual, None, None),
        ReleaseOutcome::Split { released, refunded } => {
            let state = if released == snapshot.amount_cents {
                GateState::Released
            } else if refunded == snapshot.amount_cents {
                GateState::Refunded
            } else {
                GateState::Partial
            };
            (state, Some(released), Some(refunded))
        }
    };

    let payload = json!({
        "verificationStatus": input.verification_status,
        "runStatus": input.run_status,
        "evidenceRefs": input.evidence_refs,
        "verifierId": input.verifier_id,
        "releasedCents": released_cents,
        "refundedCents": refunded_cents,
        "nextState": next_state,
    });

    Ok(VerifyOutcome { payload, next_state })
}

// ---------------------------------------------------------------------
// Reducer
// ---------------------------------------------------------------------

#[derive(Default)]
pub struct GateReducer;

impl Reducer for GateReducer {
    type Snapshot = GateSnapshot;

    fn apply(
        &self,
        snapshot: Option<Self::Snapshot>,
        event: &Event,
    ) -> Result<Self::Snapshot, settld_api::CoordinatorError> {
        apply_gate_event(snapshot, event)
            .map_err(|e| settld_api::CoordinatorError::Other(anyhow::anyhow!(e)))
    }
}

fn apply_gate_event(
    snapshot: Option<GateSnapshot>,
    event: &Event,
) -> Result<GateSnapshot, X402Error> {
    let payload = &event.payload;
    match event.event_type.as_str() {
        "x402_gate.created" => Ok(GateSnapshot {
            gate_id: GateId::from(field_str(payload, "gateId")?.to_string()),
            payer_agent_id: AgentId::from(field_str(payload, "payerAgentId")?.to_string()),
            payee_agent_id: AgentId::from(field_str(payload, "payeeAgentId")?.to_string()),
            amount_cents: field_i64(payload, "amountCents")?,
            currency: Currency::new(field_str(payload, "currency")?),
            tool_id: payload
                .get("toolId")
                .and_then(Value::as_str)
                .map(str::to_string),
            policy_ref: field_str(payload, "policyRef")?.to_string(),
            state: GateState::Created,
            authorization: None,
            verification: None,
            settlement: None,
            prompt_risk: None,
            revision: 1,
        }),
        "x402_gate.authorized" => {
            let mut snap = require(snapshot)?;
            let request_binding: RequestBinding =
                serde_json::from_value(payload.get("requestBinding").cloned().ok_or_else(
                    || X402Error::EventPayloadInvalid("missing requestBinding".into()),
                )?)
                .map_err(settld_codec::CodecError::from)?;
            let prompt_risk = payload.get("promptRisk").ok_or_else(|| {
                X402Error::EventPayloadInvalid("missing promptRisk".into())
            })?;
            snap.authorization = Some(AuthorizationRecord {
                hold_id: field_str(payload, "holdId")?.to_string(),
                delegation_grant_ref: payload
                    .get("delegationGrantRef")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                execution_intent_idempotency_key: payload
                    .get("executionIntentIdempotencyKey")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                request_binding,
                request_binding_hash: field_str(payload, "requestBindingHash")?.to_string(),
            });
            snap.prompt_risk = Some(PromptRiskRecord {
                outcome: serde_json::from_value(
                    prompt_risk.get("outcome").cloned().unwrap_or(Value::Null),
                )
                .map_err(settld_codec::CodecError::from)?,
                override_recorded: prompt_risk
                    .get("overrideRecorded")
                    .cloned()
                    .filter(|v| !v.is_null())
                    .map(serde_json::from_value)
                    .transpose()
                    .map_err(settld_codec::CodecError::from)?,
                required_session_refs: prompt_risk
                    .get("requiredSessionRefs")
                    .and_then(Value::as_array)
                    .map(|a| a.iter().filter_map(|x| x.as_str().map(str::to_string)).collect())
                    .unwrap_or_default(),
            });
            snap.state = GateState::Authorized;
            snap.revision += 1;
            Ok(snap)
        }
        "x402_gate.verified" => {
            let mut snap = require(snapshot)?;
            snap.verification = Some(VerificationRecord {
                verification_status: serde_json::from_value(
                    payload
                        .get("verificationStatus")
                        .cloned()
                        .ok_or_else(|| X402Error::EventPayloadInvalid("missing verificationStatus".into()))?,
                )
                .map_err(settld_codec::CodecError::from)?,
                run_status: field_str(payload, "runStatus")?.to_string(),
                evidence_refs: payload
                    .get("evidenceRefs")
                    .and_then(Value::as_array)
                    .map(|a| a.iter().filter_map(|x| x.as_str().map(str::to_string)).collect())
                    .unwrap_or_default(),
                verifier_id: payload
                    .get("verifierId")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            });
            let next_state: GateState = serde_json::from_value(
                payload
                    .get("nextState")
                    .cloned()
                    .ok_or_else(|| X402Error::EventPayloadInvalid("missing nextState".into()))?,
            )
            .map_err(settld_codec::CodecError::from)?;
            if let (Some(released), Some(refunded)) = (
                payload.get("releasedCents").and_then(Value::as_i64),
                payload.get("refundedCents").and_then(Value::as_i64),
            ) {
                snap.settlement = Some(SettlementRecord {
                    released_cents: released,
                    refunded_cents: refunded,
                });
            }
            snap.state = next_state;
            snap.revision += 1;
            Ok(snap)
        }
        "x402_gate.canceled" => {
            let mut snap = require(snapshot)?;
            snap.state = GateState::Canceled;
            snap.revision += 1;
            Ok(snap)
        }
        "x402_gate.disputed" => {
            let mut snap = require(snapshot)?;
            snap.state = GateState::Disputed;
            snap.revision += 1;
            Ok(snap)
        }
        "x402_gate.arbitrating" => {
            let mut snap = require(snapshot)?;
            snap.state = GateState::Arbitrating;
            snap.revision += 1;
            Ok(snap)
        }
        "x402_gate.resolved" => {
            let mut snap = require(snapshot)?;
            if let (Some(released), Some(refunded)) = (
                payload.get("releasedCents").and_then(Value::as_i64),
                payload.get("refundedCents").and_then(Value::as_i64),
            ) {
                snap.settlement = Some(SettlementRecord {
                    released_cents: released,
                    refunded_cents: refunded,
                });
            }
            snap.state = GateState::Resolved;
            snap.revision += 1;
            Ok(snap)
        }
        other => Err(X402Error::EventPayloadInvalid(format!(
            "unrecognized X402Gate event type '{other}'"
        ))),
    }
}

fn require(snapshot: Option<GateSnapshot>) -> Result<GateSnapshot, X402Error> {
    snapshot.ok_or_else(|| {
        X402Error::EventPayloadInvalid("event applied to a stream with no snapshot".into())
    })
}

fn field_str<'a>(v: &'a Value, field: &str) -> Result<&'a str, X402Error> {
    v.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| X402Error::EventPayloadInvalid(format!("missing field '{field}'")))
}

fn field_i64(v: &Value, field: &str) -> Result<i64, X402Error> {
    v.get(field)
        .and_then(Value::as_i64)
        .ok_or_else(|| X402Error::EventPayloadInvalid(format!("missing field '{field}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_snapshot() -> GateSnapshot {
        GateSnapshot {
            gate_id: GateId::from("gate_1".to_string()),
            payer_agent_id: AgentId::from("agent_payer".to_string()),
            payee_agent_id: AgentId::from("agent_payee".to_string()),
            amount_cents: 400,
            currency: Currency::usd(),
            tool_id: None,
            policy_ref: "policy_default".to_string(),
            state: GateState::Created,
            authorization: None,
            verification: None,
            settlement: None,
            prompt_risk: None,
            revision: 1,
        }
    }

    fn binding() -> RequestBinding {
        RequestBinding {
            method: "POST".to_string(),
            host: "api.example.com".to_string(),
            path: "/tools/search".to_string(),
            request_body_sha256: "h1".to_string(),
        }
    }

    #[test]
    fn create_rejects_amount_over_policy_max() {
        let input = CreateGateInput {
            gate_id: GateId::from("gate_1".to_string()),
            payer_agent_id: AgentId::from("agent_payer".to_string()),
            payee_agent_id: AgentId::from("agent_payee".to_string()),
            amount_cents: 10_000,
            currency: Currency::usd(),
            tool_id: None,
            policy_ref: "policy_default".to_string(),
            max_amount_cents: 5_000,
            payer_active: true,
            payee_active: true,
        };
        let err = decide_create(input).unwrap_err();
        assert!(matches!(err, X402Error::AmountExceedsPolicy { .. }));
    }

    #[test]
    fn authorize_requires_execution_intent() {
        let snapshot = base_snapshot();
        let input = AuthorizeInput {
            hold_id: "hold_1".to_string(),
            payer_active: true,
            payee_active: true,
            delegation: None,
            global_force_mode: ForceMode::Allow,
            per_principal_force_mode: None,
            taint: TaintState::Clean,
            prompt_risk_override: None,
            wallet_decision_verified: None,
            execution_intent_present: false,
            execution_intent_idempotency_key: None,
            request_binding: binding(),
        };
        let err = decide_authorize(&snapshot, input).unwrap_err();
        assert!(matches!(err, X402Error::ExecutionIntentRequired));
    }

    #[test]
    fn authorize_enforces_delegation_per_call_cap() {
        let snapshot = base_snapshot();
        let input = AuthorizeInput {
            hold_id: "hold_1".to_string(),
            payer_active: true,
            payee_active: true,
            delegation: Some(DelegationCheck {
                grant_ref: "grant_1".to_string(),
                revoked: false,
                per_call_limit_cents: Some(100),
                daily_limit_cents: None,
                cumulative_today_cents: 0,
            }),
            global_force_mode: ForceMode::Allow,
            per_principal_force_mode: None,
            taint: TaintState::Clean,
            prompt_risk_override: None,
            wallet_decision_verified: None,
            execution_intent_present: true,
            execution_intent_idempotency_key: Some("idem_1".to_string()),
            request_binding: binding(),
        };
        let err = decide_authorize(&snapshot, input).unwrap_err();
        assert!(matches!(err, X402Error::DelegationGrantPerCallExceeded(_)));
    }

    #[test]
    fn happy_path_create_authorize_verify_releases_in_full() {
        let reducer = GateReducer;
        let create_input = CreateGateInput {
            gate_id: GateId::from("gate_1".to_string()),
            payer_agent_id: AgentId::from("agent_payer".to_string()),
            payee_agent_id: AgentId::from("agent_payee".to_string()),
            amount_cents: 400,
            currency: Currency::usd(),
            tool_id: None,
            policy_ref: "policy_default".to_string(),
            max_amount_cents: 5_000,
            payer_active: true,
            payee_active: true,
        };
        let created_payload = decide_create(create_input).unwrap();
        let created_event = test_event("x402_gate.created", created_payload);
        let snapshot = reducer.apply(None, &created_event).unwrap();

        let authorize_input = AuthorizeInput {
            hold_id: "hold_1".to_string(),
            payer_active: true,
            payee_active: true,
            delegation: None,
            global_force_mode: ForceMode::Allow,
            per_principal_force_mode: None,
            taint: TaintState::Clean,
            prompt_risk_override: None,
            wallet_decision_verified: None,
            execution_intent_present: true,
            execution_intent_idempotency_key: Some("idem_1".to_string()),
            request_binding: binding(),
        };
        let authorized_payload = decide_authorize(&snapshot, authorize_input).unwrap();
        let authorized_event = test_event("x402_gate.authorized", authorized_payload);
        let snapshot = reducer.apply(Some(snapshot), &authorized_event).unwrap();

        let verify_input = VerifyInput {
            verification_status: VerificationStatus::Green,
            run_status: "succeeded".to_string(),
            evidence_refs: vec![
                "http:request_sha256:h1".to_string(),
                "http:response_sha256:h2".to_string(),
            ],
            verifier_id: Some("verifier_a".to_string()),
            expected_request_sha256: "h1".to_string(),
            expected_response_sha256: "h2".to_string(),
            release_policy: ReleasePolicy::auto_release_on_green_only(),
        };
        let outcome = decide_verify(&snapshot, verify_input).unwrap();
        assert_eq!(outcome.next_state, GateState::Released);
        let verified_event = test_event("x402_gate.verified", outcome.payload);
        let snapshot = reducer.apply(Some(snapshot), &verified_event).unwrap();
        assert_eq!(snapshot.state, GateState::Released);
        let settlement = snapshot.settlement.unwrap();
        assert_eq!(settlement.released_cents, 400);
        assert_eq!(settlement.refunded_cents, 0);
    }

    #[test]
    fn verify_missing_binding_evidence_is_rejected() {
        let reducer = GateReducer;
        let created_payload = decide_create(CreateGateInput {
            gate_id: GateId::from("gate_1".to_string()),
            payer_agent_id: AgentId::from("agent_payer".to_string()),
            payee_agent_id: AgentId::from("agent_payee".to_string()),
            amount_cents: 400,
            currency: Currency::usd(),
            tool_id: None,
            policy_ref: "policy_default".to_string(),
            max_amount_cents: 5_000,
            payer_active: true,
            payee_active: true,
        })
        .unwrap();
        let snapshot = reducer
            .apply(None, &test_event("x402_gate.created", created_payload))
            .unwrap();
        let authorized_payload = decide_authorize(
            &snapshot,
            AuthorizeInput {
                hold_id: "hold_1".to_string(),
                payer_active: true,
                payee_active: true,
                delegation: None,
                global_force_mode: ForceMode::Allow,
                per_principal_force_mode: None,
                taint: TaintState::Clean,
                prompt_risk_override: None,
                wallet_decision_verified: None,
                execution_intent_present: true,
                execution_intent_idempotency_key: Some("idem_1".to_string()),
                request_binding: binding(),
            },
        )
        .unwrap();
        let snapshot = reducer
            .apply(Some(snapshot), &test_event("x402_gate.authorized", authorized_payload))
            .unwrap();

        let err = decide_verify(
            &snapshot,
            VerifyInput {
                verification_status: VerificationStatus::Green,
                run_status: "succeeded".to_string(),
                evidence_refs: vec![],
                verifier_id: None,
                expected_request_sha256: "h1".to_string(),
                expected_response_sha256: "h2".to_string(),
                release_policy: ReleasePolicy::auto_release_on_green_only(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, X402Error::RequestBindingEvidenceRequired));
    }

    fn test_event(event_type: &str, payload: Value) -> Event {
        Event {
            id: settld_types::EventId::from("evt_1".to_string()),
            stream_id: settld_types::StreamId::from("gate_1".to_string()),
            stream_kind: settld_types::StreamKind::X402Gate,
            event_type: event_type.to_string(),
            at: settld_types::Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
            actor: settld_types::Actor::System {
                component: "test".to_string(),
            },
            payload,
            prev_chain_hash: None,
            chain_hash: "h".to_string(),
            signature: None,
            key_id: None,
            tenant_id: settld_types::TenantId::default_tenant(),
        }
    }
}
