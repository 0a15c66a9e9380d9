//! Hand-written end-to-end cases for spec §8's concrete scenarios, built
//! against the `Coordinator`'s public command surface and a real
//! `InMemoryStore` rather than any single subsystem's unit tests (SPEC_FULL.md
//! §10.4: "the §8 concrete scenarios are hand-written `#[tokio::test]` cases
//! in `tests/scenarios.rs`").

use std::sync::Arc;

use settld_api::{RecordKind, SignerRegistry, Store};
use settld_coordinator::workers::MonthCloseTick;
use settld_coordinator::Coordinator;
use settld_identity::TaintState;
use settld_ops::WorkerTick;
use settld_storage::InMemoryStore;
use settld_test_support::{test_tenant, CannedClock, FakeSignerRegistry};
use settld_types::{
    AgentId, Clock, Currency, GateId, HoldId, IdempotencyKey, LedgerEntryId, MonthCloseId,
};
use settld_x402::{
    AuthorizeInput, CreateGateInput, ForceMode, ReleasePolicy, RequestBinding, VerificationStatus,
    VerifyInput,
};

fn harness() -> (Coordinator, Arc<dyn Store>, Arc<CannedClock>) {
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    let signers: Arc<dyn SignerRegistry> = Arc::new(FakeSignerRegistry::new());
    let clock = Arc::new(CannedClock::new());
    let clock_dyn: Arc<dyn Clock> = clock.clone();
    let coordinator = Coordinator::new(store.clone(), signers, clock_dyn);
    (coordinator, store, clock)
}

fn binding() -> RequestBinding {
    RequestBinding {
        method: "POST".to_string(),
        host: "api.example.com".to_string(),
        path: "/tools/search".to_string(),
        request_body_sha256: "h1".to_string(),
    }
}

async fn register_payer_and_payee(coordinator: &Coordinator, tenant_id: &settld_types::TenantId) {
    coordinator
        .register_agent(
            tenant_id.clone(),
            AgentId::from("agent_payer".to_string()),
            "acct_payer".to_string(),
            vec!["http".to_string()],
            "aa".to_string(),
            None,
        )
        .await
        .unwrap();
    coordinator
        .register_agent(
            tenant_id.clone(),
            AgentId::from("agent_payee".to_string()),
            "acct_payee".to_string(),
            vec!["http".to_string()],
            "bb".to_string(),
            None,
        )
        .await
        .unwrap();
    coordinator
        .credit_wallet(
            tenant_id.clone(),
            AgentId::from("agent_payer".to_string()),
            5_000,
            None,
        )
        .await
        .unwrap();
}

fn create_gate_input() -> CreateGateInput {
    CreateGateInput {
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
    }
}

fn authorize_input() -> AuthorizeInput {
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
    }
}

/// Scenario 1 ("Happy release"): credit a payer 5000, open a 400-cent gate,
/// authorize it (placing a hold), verify green under a full auto-release
/// policy with matching binding evidence, and check the settlement split and
/// both wallets move accordingly.
#[tokio::test]
async fn happy_release_moves_funds_end_to_end() {
    let (coordinator, store, _clock) = harness();
    let tenant_id = test_tenant();

    register_payer_and_payee(&coordinator, &tenant_id).await;
    coordinator
        .gate_create(tenant_id.clone(), create_gate_input())
        .await
        .unwrap();
    coordinator
        .gate_authorize(
            tenant_id.clone(),
            GateId::from("gate_1".to_string()),
            HoldId::from("hold_1".to_string()),
            authorize_input(),
        )
        .await
        .unwrap();

    let gate_snapshot = coordinator
        .gate_verify(
            tenant_id.clone(),
            GateId::from("gate_1".to_string()),
            HoldId::from("hold_1".to_string()),
            LedgerEntryId::from("ledger_1".to_string()),
            VerifyInput {
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
            },
        )
        .await
        .unwrap();

    assert_eq!(gate_snapshot["state"], serde_json::json!("released"));
    assert_eq!(gate_snapshot["settlement"]["released_cents"], serde_json::json!(400));
    assert_eq!(gate_snapshot["settlement"]["refunded_cents"], serde_json::json!(0));

    let payer = store
        .get(&tenant_id, RecordKind::Snapshot, "agent_payer")
        .await
        .unwrap()
        .expect("payer snapshot exists");
    assert_eq!(payer["available_cents"], serde_json::json!(4_600));
    assert_eq!(payer["escrow_locked_cents"], serde_json::json!(0));

    let payee = store
        .get(&tenant_id, RecordKind::Snapshot, "agent_payee")
        .await
        .unwrap()
        .expect("payee snapshot exists");
    assert_eq!(payee["available_cents"], serde_json::json!(400));
}

/// Scenario 2 ("Binding evidence missing"): omitting the request/response
/// binding refs at verify must reject before any funds move and leave the
/// hold's escrow lock untouched.
#[tokio::test]
async fn verify_missing_binding_evidence_is_rejected_and_funds_stay_locked() {
    let (coordinator, store, _clock) = harness();
    let tenant_id = test_tenant();

    register_payer_and_payee(&coordinator, &tenant_id).await;
    coordinator
        .gate_create(tenant_id.clone(), create_gate_input())
        .await
        .unwrap();
    coordinator
        .gate_authorize(
            tenant_id.clone(),
            GateId::from("gate_1".to_string()),
            HoldId::from("hold_1".to_string()),
            authorize_input(),
        )
        .await
        .unwrap();

    let result = coordinator
        .gate_verify(
            tenant_id.clone(),
            GateId::from("gate_1".to_string()),
            HoldId::from("hold_1".to_string()),
            LedgerEntryId::from("ledger_1".to_string()),
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
        .await;
    assert!(result.is_err());

    let payer = store
        .get(&tenant_id, RecordKind::Snapshot, "agent_payer")
        .await
        .unwrap()
        .expect("payer snapshot exists");
    assert_eq!(payer["escrow_locked_cents"], serde_json::json!(400));
    assert_eq!(payer["available_cents"], serde_json::json!(4_600));
}

/// Scenario 3 ("Delegation per-call cap"): a gate whose amount exceeds the
/// bound delegation grant's per-call limit is rejected at authorize, before
/// any hold is placed.
#[tokio::test]
async fn authorize_rejects_amount_over_delegation_per_call_cap() {
    let (coordinator, store, _clock) = harness();
    let tenant_id = test_tenant();

    register_payer_and_payee(&coordinator, &tenant_id).await;
    coordinator
        .gate_create(tenant_id.clone(), create_gate_input())
        .await
        .unwrap();

    let mut input = authorize_input();
    input.delegation = Some(settld_x402::DelegationCheck {
        grant_ref: "grant_1".to_string(),
        revoked: false,
        per_call_limit_cents: Some(100),
        daily_limit_cents: None,
        cumulative_today_cents: 0,
    });

    let result = coordinator
        .gate_authorize(
            tenant_id.clone(),
            GateId::from("gate_1".to_string()),
            HoldId::from("hold_1".to_string()),
            input,
        )
        .await;
    assert!(result.is_err());

    let payer = store
        .get(&tenant_id, RecordKind::Snapshot, "agent_payer")
        .await
        .unwrap()
        .expect("payer snapshot exists");
    assert_eq!(payer["escrow_locked_cents"], serde_json::json!(0));
    assert_eq!(payer["available_cents"], serde_json::json!(5_000));
}

/// Scenario 5 ("Month close"): an opened period is closed by a single
/// `MonthCloseTick` pass, producing a `MonthlyStatement.v1` artifact whose
/// hash is stable across repeated reads (artifact immutability, spec §3
/// invariant (ii)).
#[tokio::test]
async fn month_close_tick_closes_open_period_with_stable_artifact_hash() {
    let (coordinator, store, clock) = harness();
    let coordinator = Arc::new(coordinator);
    let tenant_id = test_tenant();

    coordinator
        .open_month_close(
            tenant_id.clone(),
            MonthCloseId::from("monthclose_2026-01".to_string()),
            "2026-01".to_string(),
            "settled_at".to_string(),
        )
        .await
        .unwrap();

    let tick = MonthCloseTick::new(store.clone(), coordinator.clone(), tenant_id.clone());
    tick.tick(clock.now()).await.unwrap();

    let snapshot = store
        .get(&tenant_id, RecordKind::Snapshot, "monthclose_2026-01")
        .await
        .unwrap()
        .expect("month close snapshot exists");
    assert_eq!(snapshot["state"], serde_json::json!("closed"));
    let hash_first = snapshot["statement_artifact_hash"]
        .as_str()
        .expect("hash recorded")
        .to_string();

    let artifact_id = snapshot["statement_artifact_id"]
        .as_str()
        .expect("artifact id recorded")
        .to_string();
    let artifact = store
        .get(&tenant_id, RecordKind::Artifact, &artifact_id)
        .await
        .unwrap()
        .expect("artifact persisted");
    assert_eq!(artifact["artifact_hash"], serde_json::json!(hash_first));
}

/// Spec §3 invariant (vi): replaying an idempotent request with the same key
/// and body returns a byte-identical response rather than re-appending.
#[tokio::test]
async fn idempotent_agent_registration_replays_same_response() {
    let (coordinator, _store, _clock) = harness();
    let tenant_id = test_tenant();
    let key = Some(IdempotencyKey::from("idem_register_1".to_string()));

    let first = coordinator
        .register_agent(
            tenant_id.clone(),
            AgentId::from("agent_payer".to_string()),
            "acct_payer".to_string(),
            vec![],
            "aa".to_string(),
            key.clone(),
        )
        .await
        .unwrap();
    let second = coordinator
        .register_agent(
            tenant_id.clone(),
            AgentId::from("agent_payer".to_string()),
            "acct_payer".to_string(),
            vec![],
            "aa".to_string(),
            key,
        )
        .await
        .unwrap();
    assert_eq!(first, second);
}
