//! The composition root's command surface (spec §6): one `Coordinator`
//! struct wiring the kernel, store, signer registry, and every domain
//! crate together into the handful of high-level operations the routes in
//! spec §6 ultimately call. Mirrors the shape of the teacher's top-level
//! `node::Node` struct, which holds the chain state machine plus its
//! storage and mempool collaborators behind one set of public methods.

use std::sync::Arc;

use settld_api::{CoordinatorError, SignerRegistry, Store};
use settld_identity::{AgentReducer, DelegationGrantReducer};
use settld_kernel::{AppendInput, EventKernel};
use settld_ledger::{refund_hold, release_hold, HoldRecord, LedgerEntry, MonthCloseReducer};
use settld_types::{
    Actor, AgentId, Cents, Clock, Currency, GateId, GrantId, HoldId, JobId, LedgerEntryId,
    MonthCloseId, RunId, StreamId, StreamKind, TenantId,
};
use settld_x402::{
    decide_authorize, decide_create, decide_verify, AuthorizeInput, CreateGateInput, GateReducer,
    ReleasePolicy, VerifyInput,
};

use crate::governance::GovernanceReducer;
use crate::job::JobReducer;
use crate::run::RunReducer;

/// Everything a command method needs beyond its own arguments: the kernel
/// that serializes and chain-hashes every append, the raw store for
/// non-event-sourced side tables (holds, ledger entries), and a clock
/// (spec §9: "wall-clock reads inside reducers are forbidden") supplying
/// `at` for every command.
pub struct Coordinator {
    kernel: EventKernel,
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl Coordinator {
    pub fn new(store: Arc<dyn Store>, signer_registry: Arc<dyn SignerRegistry>, clock: Arc<dyn Clock>) -> Self {
        let kernel = EventKernel::new(store.clone(), signer_registry, Default::default());
        Self {
            kernel,
            store,
            clock,
        }
    }

    fn system_actor(component: &str) -> Actor {
        Actor::System {
            component: component.to_string(),
        }
    }

    /// Thin wrapper around `EventKernel::append` translating its
    /// `KernelError` into the façade `CoordinatorError` every command
    /// method returns.
    async fn append(
        &self,
        input: AppendInput,
        reducer: &dyn settld_kernel::DynReducer,
    ) -> Result<settld_kernel::AppendResult, CoordinatorError> {
        self.kernel
            .append(input, reducer)
            .await
            .map_err(|e| CoordinatorError::Other(anyhow::anyhow!(e)))
    }

    /// `POST /agents` (spec §6): registers a new `Agent` stream.
    pub async fn register_agent(
        &self,
        tenant_id: TenantId,
        agent_id: AgentId,
        owner: String,
        declared_capabilities: Vec<String>,
        public_key_hex: String,
        idempotency_key: Option<settld_types::IdempotencyKey>,
    ) -> Result<serde_json::Value, CoordinatorError> {
        let at = self.clock.now();
        let result = self
            .append(
                AppendInput {
                    tenant_id,
                    stream_id: StreamId::from(agent_id.as_str().to_string()),
                    stream_kind: StreamKind::Agent,
                    event_type: "agent.registered".to_string(),
                    actor: Self::system_actor("coordinator"),
                    payload: serde_json::json!({
                        "agentId": agent_id.as_str(),
                        "owner": owner,
                        "declaredCapabilities": declared_capabilities,
                        "publicKeyHex": public_key_hex,
                    }),
                    at,
                    expected_prev_chain_hash: Some(None),
                    chain_sensitive: true,
                    idempotency_key,
                    route_binding_hash: "POST /agents".to_string(),
                    signature: None,
                    key_id: None,
                },
                &AgentReducer,
            )
            .await?;
        Ok(result.snapshot)
    }

    /// Credits an agent's wallet balance (spec §3's `Agent.availableCents`).
    pub async fn credit_wallet(
        &self,
        tenant_id: TenantId,
        agent_id: AgentId,
        amount_cents: Cents,
        idempotency_key: Option<settld_types::IdempotencyKey>,
    ) -> Result<serde_json::Value, CoordinatorError> {
        let at = self.clock.now();
        let stream_id = StreamId::from(agent_id.as_str().to_string());
        let head = self.stream_head(&tenant_id, &stream_id).await?;
        let result = self
            .append(
                AppendInput {
                    tenant_id,
                    stream_id,
                    stream_kind: StreamKind::Agent,
                    event_type: "agent.wallet.credited".to_string(),
                    actor: Self::system_actor("coordinator"),
                    payload: serde_json::json!({"amountCents": amount_cents}),
                    at,
                    expected_prev_chain_hash: Some(head),
                    chain_sensitive: true,
                    idempotency_key,
                    route_binding_hash: "POST /agents/{id}/wallet/credit".to_string(),
                    signature: None,
                    key_id: None,
                },
                &AgentReducer,
            )
            .await?;
        Ok(result.snapshot)
    }

    /// `POST /jobs` (spec §1 "Principals create *runs* (jobs) with a quoted
    /// price and SLA window"): opens a new `Job` stream.
    pub async fn create_job(
        &self,
        tenant_id: TenantId,
        job_id: JobId,
        principal: String,
        description: String,
        quoted_price_cents: Cents,
        currency: Currency,
        sla_deadline: Option<settld_types::Timestamp>,
    ) -> Result<serde_json::Value, CoordinatorError> {
        let at = self.clock.now();
        let result = self
            .append(
                AppendInput {
                    tenant_id,
                    stream_id: StreamId::from(job_id.as_str().to_string()),
                    stream_kind: StreamKind::Job,
                    event_type: "job.created".to_string(),
                    actor: Self::system_actor("coordinator"),
                    payload: serde_json::json!({
                        "principal": principal,
                        "description": description,
                        "quotedPriceCents": quoted_price_cents,
                        "currency": currency.0,
                        "slaDeadline": sla_deadline.map(|t| t.to_rfc3339()),
                    }),
                    at,
                    expected_prev_chain_hash: Some(None),
                    chain_sensitive: true,
                    idempotency_key: None,
                    route_binding_hash: "POST /jobs".to_string(),
                    signature: None,
                    key_id: None,
                },
                &JobReducer,
            )
            .await?;
        Ok(result.snapshot)
    }

    /// `POST /agents/{id}/runs` (spec §6): assigns `job_id` to `agent_id`
    /// and starts a `Run` stream for the attempt, linking it back onto the
    /// job.
    pub async fn create_run(
        &self,
        tenant_id: TenantId,
        run_id: RunId,
        job_id: JobId,
        agent_id: AgentId,
    ) -> Result<serde_json::Value, CoordinatorError> {
        let at = self.clock.now();

        let job_stream = StreamId::from(job_id.as_str().to_string());
        let job_head = self.stream_head(&tenant_id, &job_stream).await?;
        self.append(
            AppendInput {
                tenant_id: tenant_id.clone(),
                stream_id: job_stream.clone(),
                stream_kind: StreamKind::Job,
                event_type: "job.assigned".to_string(),
                actor: Self::system_actor("coordinator"),
                payload: serde_json::json!({"agentId": agent_id.as_str()}),
                at,
                expected_prev_chain_hash: Some(job_head),
                chain_sensitive: true,
                idempotency_key: None,
                route_binding_hash: "POST /agents/{id}/runs#assign".to_string(),
                signature: None,
                key_id: None,
            },
            &JobReducer,
        )
        .await?;

        let run_result = self
            .append(
                AppendInput {
                    tenant_id: tenant_id.clone(),
                    stream_id: StreamId::from(run_id.as_str().to_string()),
                    stream_kind: StreamKind::Run,
                    event_type: "run.started".to_string(),
                    actor: Self::system_actor("coordinator"),
                    payload: serde_json::json!({
                        "jobId": job_id.as_str(),
                        "agentId": agent_id.as_str(),
                    }),
                    at,
                    expected_prev_chain_hash: Some(None),
                    chain_sensitive: true,
                    idempotency_key: None,
                    route_binding_hash: "POST /agents/{id}/runs".to_string(),
                    signature: None,
                    key_id: None,
                },
                &RunReducer,
            )
            .await?;

        let job_head = self.stream_head(&tenant_id, &job_stream).await?;
        self.append(
            AppendInput {
                tenant_id,
                stream_id: job_stream,
                stream_kind: StreamKind::Job,
                event_type: "job.run_linked".to_string(),
                actor: Self::system_actor("coordinator"),
                payload: serde_json::json!({"runId": run_id.as_str()}),
                at,
                expected_prev_chain_hash: Some(job_head),
                chain_sensitive: true,
                idempotency_key: None,
                route_binding_hash: "POST /agents/{id}/runs#link".to_string(),
                signature: None,
                key_id: None,
            },
            &JobReducer,
        )
        .await?;

        Ok(run_result.snapshot)
    }

    /// `POST /agents/{id}/runs/{runId}/events` (spec §6): appends one step
    /// (tool call, gate reference) to an in-progress run.
    pub async fn record_run_step(
        &self,
        tenant_id: TenantId,
        run_id: RunId,
        step_type: String,
        gate_id: Option<GateId>,
        detail: serde_json::Value,
    ) -> Result<serde_json::Value, CoordinatorError> {
        let at = self.clock.now();
        let stream_id = StreamId::from(run_id.as_str().to_string());
        let head = self.stream_head(&tenant_id, &stream_id).await?;
        let result = self
            .append(
                AppendInput {
                    tenant_id,
                    stream_id,
                    stream_kind: StreamKind::Run,
                    event_type: "run.step_recorded".to_string(),
                    actor: Self::system_actor("coordinator"),
                    payload: serde_json::json!({
                        "stepType": step_type,
                        "gateId": gate_id.map(|g| g.as_str().to_string()),
                        "detail": detail,
                    }),
                    at,
                    expected_prev_chain_hash: Some(head),
                    chain_sensitive: true,
                    idempotency_key: None,
                    route_binding_hash: "POST /agents/{id}/runs/{runId}/events".to_string(),
                    signature: None,
                    key_id: None,
                },
                &RunReducer,
            )
            .await?;
        Ok(result.snapshot)
    }

    /// `POST /x402/gates` (spec §4.5 "Create"): opens a payment gate between
    /// a payer and payee agent, after checking both are active and the
    /// amount fits under `policy.maxAmountCents`.
    pub async fn gate_create(
        &self,
        tenant_id: TenantId,
        input: CreateGateInput,
    ) -> Result<serde_json::Value, CoordinatorError> {
        let at = self.clock.now();
        let gate_id = input.gate_id.clone();
        let payload = decide_create(input).map_err(|e| CoordinatorError::Other(anyhow::anyhow!(e)))?;
        let result = self
            .append(
                AppendInput {
                    tenant_id,
                    stream_id: StreamId::from(gate_id.as_str().to_string()),
                    stream_kind: StreamKind::X402Gate,
                    event_type: "x402_gate.created".to_string(),
                    actor: Self::system_actor("coordinator"),
                    payload,
                    at,
                    expected_prev_chain_hash: Some(None),
                    chain_sensitive: true,
                    idempotency_key: None,
                    route_binding_hash: "POST /x402/gates".to_string(),
                    signature: None,
                    key_id: None,
                },
                &GateReducer,
            )
            .await?;
        Ok(result.snapshot)
    }

    /// `POST /x402/gates/{id}/authorize` (spec §4.5 "Authorize-payment"):
    /// runs the full gate-authorize decision (delegation caps, prompt-risk
    /// ternary, wallet-issuer decision, execution intent) and, if it
    /// succeeds, places an escrow hold on the payer's wallet for the gate's
    /// amount.
    pub async fn gate_authorize(
        &self,
        tenant_id: TenantId,
        gate_id: GateId,
        hold_id: HoldId,
        input: AuthorizeInput,
    ) -> Result<serde_json::Value, CoordinatorError> {
        let at = self.clock.now();
        let stream_id = StreamId::from(gate_id.as_str().to_string());
        let snapshot_value = self
            .store
            .get(&tenant_id, settld_api::RecordKind::Snapshot, stream_id.as_str())
            .await?
            .ok_or_else(|| CoordinatorError::Other(anyhow::anyhow!("gate {gate_id} not found")))?;
        let snapshot: settld_x402::GateSnapshot = serde_json::from_value(snapshot_value)
            .map_err(settld_codec::CodecError::from)?;

        let payer_agent_id = snapshot.payer_agent_id.clone();
        let amount_cents = snapshot.amount_cents;
        let currency = snapshot.currency.clone();

        let payload =
            decide_authorize(&snapshot, input).map_err(|e| CoordinatorError::Other(anyhow::anyhow!(e)))?;

        let head = self.stream_head(&tenant_id, &stream_id).await?;
        let result = self
            .append(
                AppendInput {
                    tenant_id: tenant_id.clone(),
                    stream_id,
                    stream_kind: StreamKind::X402Gate,
                    event_type: "x402_gate.authorized".to_string(),
                    actor: Self::system_actor("coordinator"),
                    payload,
                    at,
                    expected_prev_chain_hash: Some(head),
                    chain_sensitive: true,
                    idempotency_key: None,
                    route_binding_hash: "POST /x402/gates/{id}/authorize".to_string(),
                    signature: None,
                    key_id: None,
                },
                &GateReducer,
            )
            .await?;

        let hold = HoldRecord::new_active(hold_id, payer_agent_id.clone(), amount_cents, currency);
        self.store
            .commit_tx(settld_api::TxInput {
                tenant_id: tenant_id.clone(),
                at,
                ops: vec![settld_api::StoreOp {
                    kind: settld_api::RecordKind::Hold,
                    id: hold.hold_id.as_str().to_string(),
                    value: serde_json::to_value(&hold).map_err(settld_codec::CodecError::from)?,
                    idempotency: None,
                }],
            })
            .await?;

        // Moves `amount_cents` out of the payer's available balance into
        // escrow so `AgentSnapshot.escrow_locked_cents` keeps tracking the
        // sum of active holds (spec §3 invariant).
        let payer_stream = StreamId::from(payer_agent_id.as_str().to_string());
        let payer_head = self.stream_head(&tenant_id, &payer_stream).await?;
        self.append(
            AppendInput {
                tenant_id,
                stream_id: payer_stream,
                stream_kind: StreamKind::Agent,
                event_type: "agent.wallet.reserved".to_string(),
                actor: Self::system_actor("coordinator"),
                payload: serde_json::json!({"amountCents": amount_cents}),
                at,
                expected_prev_chain_hash: Some(payer_head),
                chain_sensitive: true,
                idempotency_key: None,
                route_binding_hash: "POST /x402/gates/{id}/authorize#reserve".to_string(),
                signature: None,
                key_id: None,
            },
            &AgentReducer,
        )
        .await?;

        Ok(result.snapshot)
    }

    /// `POST /x402/gates/{id}/verify` (spec §4.5 "Verify"): checks binding
    /// evidence and prompt-risk evidence, computes the release split via the
    /// release-policy matrix, appends the gate event, and settles the
    /// escrow hold + ledger entry to match.
    pub async fn gate_verify(
        &self,
        tenant_id: TenantId,
        gate_id: GateId,
        hold_id: HoldId,
        ledger_entry_id: LedgerEntryId,
        input: VerifyInput,
    ) -> Result<serde_json::Value, CoordinatorError> {
        let at = self.clock.now();
        let stream_id = StreamId::from(gate_id.as_str().to_string());
        let snapshot_value = self
            .store
            .get(&tenant_id, settld_api::RecordKind::Snapshot, stream_id.as_str())
            .await?
            .ok_or_else(|| CoordinatorError::Other(anyhow::anyhow!("gate {gate_id} not found")))?;
        let snapshot: settld_x402::GateSnapshot = serde_json::from_value(snapshot_value)
            .map_err(settld_codec::CodecError::from)?;
        let payee_agent_id = snapshot.payee_agent_id.clone();

        let outcome =
            decide_verify(&snapshot, input).map_err(|e| CoordinatorError::Other(anyhow::anyhow!(e)))?;

        let head = self.stream_head(&tenant_id, &stream_id).await?;
        let result = self
            .append(
                AppendInput {
                    tenant_id: tenant_id.clone(),
                    stream_id,
                    stream_kind: StreamKind::X402Gate,
                    event_type: "x402_gate.verified".to_string(),
                    actor: Self::system_actor("coordinator"),
                    payload: outcome.payload,
                    at,
                    expected_prev_chain_hash: Some(head),
                    chain_sensitive: true,
                    idempotency_key: None,
                    route_binding_hash: "POST /x402/gates/{id}/verify".to_string(),
                    signature: None,
                    key_id: None,
                },
                &GateReducer,
            )
            .await?;

        if outcome.next_state != settld_x402::GateState::AwaitingManual {
            let hold_value = self
                .store
                .get(&tenant_id, settld_api::RecordKind::Hold, hold_id.as_str())
                .await?
                .ok_or_else(|| CoordinatorError::Other(anyhow::anyhow!("hold {hold_id} not found")))?;
            let hold: HoldRecord =
                serde_json::from_value(hold_value).map_err(settld_codec::CodecError::from)?;

            let released_cents = result
                .snapshot
                .get("settlement")
                .and_then(|s| s.get("released_cents"))
                .and_then(serde_json::Value::as_i64)
                .unwrap_or(0);
            let refunded_cents = result
                .snapshot
                .get("settlement")
                .and_then(|s| s.get("refunded_cents"))
                .and_then(serde_json::Value::as_i64)
                .unwrap_or(0);

            let (next_hold, entry) = release_hold(
                &hold,
                ledger_entry_id,
                at,
                &payee_agent_id,
                released_cents,
                refunded_cents,
            )
            .map_err(|e| CoordinatorError::Other(anyhow::anyhow!(e)))?;

            self.commit_settlement(&tenant_id, at, &next_hold, &entry).await?;
            self.settle_escrow(&tenant_id, &hold.agent_id, &payee_agent_id, at, released_cents, refunded_cents)
                .await?;
        }

        Ok(result.snapshot)
    }

    /// Folds a settled hold's `(released, refunded)` split back onto the
    /// payer's and payee's `Agent` wallet streams: `refunded_cents` returns
    /// to the payer's available balance, `released_cents` leaves escrow for
    /// good and lands in the payee's available balance.
    async fn settle_escrow(
        &self,
        tenant_id: &TenantId,
        payer_agent_id: &AgentId,
        payee_agent_id: &AgentId,
        at: settld_types::Timestamp,
        released_cents: Cents,
        refunded_cents: Cents,
    ) -> Result<(), CoordinatorError> {
        if refunded_cents > 0 {
            let payer_stream = StreamId::from(payer_agent_id.as_str().to_string());
            let payer_head = self.stream_head(tenant_id, &payer_stream).await?;
            self.append(
                AppendInput {
                    tenant_id: tenant_id.clone(),
                    stream_id: payer_stream,
                    stream_kind: StreamKind::Agent,
                    event_type: "agent.wallet.released".to_string(),
                    actor: Self::system_actor("coordinator"),
                    payload: serde_json::json!({"amountCents": refunded_cents}),
                    at,
                    expected_prev_chain_hash: Some(payer_head),
                    chain_sensitive: true,
                    idempotency_key: None,
                    route_binding_hash: "x402_gate.verify#refund".to_string(),
                    signature: None,
                    key_id: None,
                },
                &AgentReducer,
            )
            .await?;
        }
        if released_cents > 0 {
            let payer_stream = StreamId::from(payer_agent_id.as_str().to_string());
            let payer_head = self.stream_head(tenant_id, &payer_stream).await?;
            self.append(
                AppendInput {
                    tenant_id: tenant_id.clone(),
                    stream_id: payer_stream,
                    stream_kind: StreamKind::Agent,
                    event_type: "agent.wallet.settled".to_string(),
                    actor: Self::system_actor("coordinator"),
                    payload: serde_json::json!({"amountCents": released_cents}),
                    at,
                    expected_prev_chain_hash: Some(payer_head),
                    chain_sensitive: true,
                    idempotency_key: None,
                    route_binding_hash: "x402_gate.verify#settle_payer".to_string(),
                    signature: None,
                    key_id: None,
                },
                &AgentReducer,
            )
            .await?;

            let payee_stream = StreamId::from(payee_agent_id.as_str().to_string());
            let payee_head = self.stream_head(tenant_id, &payee_stream).await?;
            self.append(
                AppendInput {
                    tenant_id: tenant_id.clone(),
                    stream_id: payee_stream,
                    stream_kind: StreamKind::Agent,
                    event_type: "agent.wallet.credited".to_string(),
                    actor: Self::system_actor("coordinator"),
                    payload: serde_json::json!({"amountCents": released_cents}),
                    at,
                    expected_prev_chain_hash: Some(payee_head),
                    chain_sensitive: true,
                    idempotency_key: None,
                    route_binding_hash: "x402_gate.verify#settle_payee".to_string(),
                    signature: None,
                    key_id: None,
                },
                &AgentReducer,
            )
            .await?;
        }
        Ok(())
    }

    /// `POST /x402/gates/{id}/cancel`: refunds the full hold in one step
    /// rather than going through the verify/release-matrix path.
    pub async fn gate_cancel_refund(
        &self,
        tenant_id: TenantId,
        hold_id: HoldId,
        ledger_entry_id: LedgerEntryId,
    ) -> Result<(), CoordinatorError> {
        let at = self.clock.now();
        let hold_value = self
            .store
            .get(&tenant_id, settld_api::RecordKind::Hold, hold_id.as_str())
            .await?
            .ok_or_else(|| CoordinatorError::Other(anyhow::anyhow!("hold {hold_id} not found")))?;
        let hold: HoldRecord =
            serde_json::from_value(hold_value).map_err(settld_codec::CodecError::from)?;
        let (next_hold, entry) = refund_hold(&hold, ledger_entry_id, at)
            .map_err(|e| CoordinatorError::Other(anyhow::anyhow!(e)))?;
        self.commit_settlement(&tenant_id, at, &next_hold, &entry).await?;
        self.settle_escrow(&tenant_id, &hold.agent_id, &hold.agent_id, at, 0, hold.amount_cents)
            .await
    }

    async fn commit_settlement(
        &self,
        tenant_id: &TenantId,
        at: settld_types::Timestamp,
        hold: &HoldRecord,
        entry: &LedgerEntry,
    ) -> Result<(), CoordinatorError> {
        self.store
            .commit_tx(settld_api::TxInput {
                tenant_id: tenant_id.clone(),
                at,
                ops: vec![
                    settld_api::StoreOp {
                        kind: settld_api::RecordKind::Hold,
                        id: hold.hold_id.as_str().to_string(),
                        value: serde_json::to_value(hold).map_err(settld_codec::CodecError::from)?,
                        idempotency: None,
                    },
                    settld_api::StoreOp {
                        kind: settld_api::RecordKind::LedgerEntry,
                        id: entry.entry_id.as_str().to_string(),
                        value: serde_json::to_value(entry).map_err(settld_codec::CodecError::from)?,
                        idempotency: None,
                    },
                ],
            })
            .await?;
        Ok(())
    }

    /// `POST /delegation-grants` (spec §4.4): issues a new `DelegationGrant`
    /// chain-bound to its parent.
    pub async fn issue_delegation_grant(
        &self,
        tenant_id: TenantId,
        grant_id: GrantId,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, CoordinatorError> {
        let at = self.clock.now();
        let result = self
            .append(
                AppendInput {
                    tenant_id,
                    stream_id: StreamId::from(grant_id.as_str().to_string()),
                    stream_kind: StreamKind::DelegationGrant,
                    event_type: "delegation_grant.issued".to_string(),
                    actor: Self::system_actor("coordinator"),
                    payload,
                    at,
                    expected_prev_chain_hash: Some(None),
                    chain_sensitive: true,
                    idempotency_key: None,
                    route_binding_hash: "POST /delegation-grants".to_string(),
                    signature: None,
                    key_id: None,
                },
                &DelegationGrantReducer,
            )
            .await?;
        Ok(result.snapshot)
    }

    /// `POST /delegation-grants/{id}/revoke` (spec §4.4).
    pub async fn revoke_delegation_grant(
        &self,
        tenant_id: TenantId,
        grant_id: GrantId,
        reason: String,
    ) -> Result<serde_json::Value, CoordinatorError> {
        let at = self.clock.now();
        let stream_id = StreamId::from(grant_id.as_str().to_string());
        let head = self.stream_head(&tenant_id, &stream_id).await?;
        let result = self
            .append(
                AppendInput {
                    tenant_id,
                    stream_id,
                    stream_kind: StreamKind::DelegationGrant,
                    event_type: "delegation_grant.revoked".to_string(),
                    actor: Self::system_actor("coordinator"),
                    payload: serde_json::json!({"reason": reason}),
                    at,
                    expected_prev_chain_hash: Some(head),
                    chain_sensitive: true,
                    idempotency_key: None,
                    route_binding_hash: "POST /delegation-grants/{id}/revoke".to_string(),
                    signature: None,
                    key_id: None,
                },
                &DelegationGrantReducer,
            )
            .await?;
        Ok(result.snapshot)
    }

    /// `POST /month-close/{month}/open` (spec §4.6 month-close lifecycle).
    pub async fn open_month_close(
        &self,
        tenant_id: TenantId,
        month_close_id: MonthCloseId,
        month: String,
        basis: String,
    ) -> Result<serde_json::Value, CoordinatorError> {
        let at = self.clock.now();
        let result = self
            .append(
                AppendInput {
                    tenant_id,
                    stream_id: StreamId::from(month_close_id.as_str().to_string()),
                    stream_kind: StreamKind::MonthClose,
                    event_type: "month_close.opened".to_string(),
                    actor: Self::system_actor("coordinator"),
                    payload: serde_json::json!({"month": month, "basis": basis}),
                    at,
                    expected_prev_chain_hash: Some(None),
                    chain_sensitive: true,
                    idempotency_key: None,
                    route_binding_hash: "POST /month-close/{month}/open".to_string(),
                    signature: None,
                    key_id: None,
                },
                &MonthCloseReducer,
            )
            .await?;
        Ok(result.snapshot)
    }

    /// `POST /month-close/{month}/close`: closes the period against a
    /// previously assembled `MonthlyStatement.v1` artifact (spec §8 scenario
    /// 5).
    pub async fn close_month_close(
        &self,
        tenant_id: TenantId,
        month_close_id: MonthCloseId,
        statement_artifact_id: settld_types::ArtifactId,
        statement_artifact_hash: String,
    ) -> Result<serde_json::Value, CoordinatorError> {
        let at = self.clock.now();
        let stream_id = StreamId::from(month_close_id.as_str().to_string());
        let head = self.stream_head(&tenant_id, &stream_id).await?;
        let result = self
            .append(
                AppendInput {
                    tenant_id,
                    stream_id,
                    stream_kind: StreamKind::MonthClose,
                    event_type: "month_close.closed".to_string(),
                    actor: Self::system_actor("coordinator"),
                    payload: serde_json::json!({
                        "statementArtifactId": statement_artifact_id.as_str(),
                        "statementArtifactHash": statement_artifact_hash,
                    }),
                    at,
                    expected_prev_chain_hash: Some(head),
                    chain_sensitive: true,
                    idempotency_key: None,
                    route_binding_hash: "POST /month-close/{month}/close".to_string(),
                    signature: None,
                    key_id: None,
                },
                &MonthCloseReducer,
            )
            .await?;
        Ok(result.snapshot)
    }

    /// Reads the current global governance snapshot, defaulting to
    /// `forceMode: allow` plus the green-only auto-release policy if no
    /// `Governance` event has ever been appended for this tenant.
    pub async fn governance_snapshot(
        &self,
        tenant_id: &TenantId,
    ) -> Result<crate::governance::GovernanceSnapshot, CoordinatorError> {
        let value = self
            .store
            .get(tenant_id, settld_api::RecordKind::Snapshot, "governance")
            .await?;
        Ok(match value {
            Some(v) => serde_json::from_value(v).map_err(settld_codec::CodecError::from)?,
            None => crate::governance::GovernanceSnapshot::default(),
        })
    }

    /// Sets the tenant's default release policy (spec §4.5's matrix, held
    /// on the `Governance` stream per SPEC_FULL.md §11.3).
    pub async fn set_default_release_policy(
        &self,
        tenant_id: TenantId,
        policy: ReleasePolicy,
    ) -> Result<serde_json::Value, CoordinatorError> {
        let at = self.clock.now();
        let stream_id = StreamId::from("governance".to_string());
        let head = self.stream_head(&tenant_id, &stream_id).await?;
        let result = self
            .append(
                AppendInput {
                    tenant_id,
                    stream_id,
                    stream_kind: StreamKind::Governance,
                    event_type: "governance.release_policy_set".to_string(),
                    actor: Self::system_actor("coordinator"),
                    payload: serde_json::json!({
                        "releasePolicy": serde_json::to_value(&policy).map_err(settld_codec::CodecError::from)?,
                    }),
                    at,
                    expected_prev_chain_hash: Some(head),
                    chain_sensitive: true,
                    idempotency_key: None,
                    route_binding_hash: "governance.release_policy_set".to_string(),
                    signature: None,
                    key_id: None,
                },
                &GovernanceReducer,
            )
            .await?;
        Ok(result.snapshot)
    }

    async fn stream_head(
        &self,
        tenant_id: &TenantId,
        stream_id: &StreamId,
    ) -> Result<Option<String>, CoordinatorError> {
        Ok(self.store.stream_head(tenant_id, stream_id.as_str()).await?)
    }
}
