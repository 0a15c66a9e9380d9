//! Concrete [`settld_ops::WorkerTick`] implementations for the periodic
//! maintenance jobs spec §4.11 lists beyond generic retention: month-close,
//! finance-reconcile, and delivery-ack. Each is handed its own collaborators
//! rather than the whole [`Coordinator`] surface, the way `settld-ops`'s own
//! [`settld_ops::retention::RetentionExecutor`] is a narrow trait rather than
//! a full store handle — a tick only gets what its one job needs.

use std::sync::Arc;

use async_trait::async_trait;
use settld_api::{ListFilter, RecordKind, Store};
use settld_artifacts::{build_artifact, ArtifactType};
use settld_billing::{DeadLetterStore, RetryPolicy};
use settld_money_rails::{
    compute_triage_key, reconcile, ExpectedPayout, MoneyRailOperationSnapshot, TriageQueue,
    TriageUpdate,
};
use settld_ops::WorkerTick;
use settld_types::{ArtifactId, MonthCloseId, TenantId, Timestamp};

use crate::service::Coordinator;

/// Closes every `MonthClose` stream that is still `open`, assembling a
/// `MonthlyStatement.v1` artifact out of the tenant's ledger entries before
/// calling [`Coordinator::close_month_close`] (spec §8 scenario 5: "month
/// close produces an immutable artifact").
///
/// `MonthClose` snapshots share `RecordKind::Snapshot` storage with every
/// other aggregate, so this scans for the `month` field rather than a
/// dedicated kind — no other reducer's snapshot shape carries one.
pub struct MonthCloseTick {
    store: Arc<dyn Store>,
    coordinator: Arc<Coordinator>,
    tenant_id: TenantId,
}

impl MonthCloseTick {
    pub fn new(store: Arc<dyn Store>, coordinator: Arc<Coordinator>, tenant_id: TenantId) -> Self {
        Self {
            store,
            coordinator,
            tenant_id,
        }
    }
}

#[async_trait]
impl WorkerTick for MonthCloseTick {
    async fn tick(&self, at: Timestamp) -> anyhow::Result<()> {
        let snapshots = self
            .store
            .list(
                &self.tenant_id,
                RecordKind::Snapshot,
                ListFilter::new().eq("state", serde_json::json!("open")),
            )
            .await?;

        for snap in snapshots {
            let (Some(month), Some(month_close_id)) = (
                snap.get("month").and_then(serde_json::Value::as_str),
                snap.get("month_close_id").and_then(serde_json::Value::as_str),
            ) else {
                continue;
            };
            // `basis` is only frozen onto the snapshot once the period
            // closes (spec §4.6 "freezes the basis"); while still `open`
            // it's the default/only basis this workspace supports.
            let basis = "settled_at";

            let ledger_entries = self
                .store
                .list(&self.tenant_id, RecordKind::LedgerEntry, ListFilter::new())
                .await?;

            let statement_core = serde_json::json!({
                "tenantId": self.tenant_id.as_str(),
                "month": month,
                "basis": basis,
                "closedAt": at.to_rfc3339(),
                "postingCount": ledger_entries.len(),
            });
            let artifact = build_artifact(
                format!("artifact_monthly_statement_{month}"),
                ArtifactType::new("MonthlyStatement", 1),
                &statement_core,
            )?;

            self.coordinator
                .close_month_close(
                    self.tenant_id.clone(),
                    MonthCloseId::from(month_close_id.to_string()),
                    ArtifactId::from(artifact.artifact_id.clone()),
                    artifact.artifact_hash.clone(),
                )
                .await?;
            tracing::info!(month, month_close_id, "closed month-close period");
        }
        Ok(())
    }
}

/// Re-runs reconciliation (spec §4.7) for every `PayoutInstruction.v1`
/// artifact against the terminal state of its `MoneyRailOperation`, opening
/// or refreshing a triage row for each divergence.
pub struct FinanceReconcileTick {
    store: Arc<dyn Store>,
    triage_queue: Arc<TriageQueue>,
    tenant_id: TenantId,
}

impl FinanceReconcileTick {
    pub fn new(store: Arc<dyn Store>, triage_queue: Arc<TriageQueue>, tenant_id: TenantId) -> Self {
        Self {
            store,
            triage_queue,
            tenant_id,
        }
    }
}

#[async_trait]
impl WorkerTick for FinanceReconcileTick {
    async fn tick(&self, at: Timestamp) -> anyhow::Result<()> {
        let artifacts = self
            .store
            .list(&self.tenant_id, RecordKind::Artifact, ListFilter::new())
            .await?;
        let expected: Vec<ExpectedPayout> = artifacts
            .iter()
            .filter(|a| {
                a.get("artifact_type").and_then(serde_json::Value::as_str)
                    == Some("PayoutInstruction.v1")
            })
            .filter_map(|a| serde_json::from_value(a.get("core")?.clone()).ok())
            .collect();

        let operation_snapshots = self
            .store
            .list(
                &self.tenant_id,
                RecordKind::Snapshot,
                ListFilter::new(),
            )
            .await?;
        let operations: Vec<MoneyRailOperationSnapshot> = operation_snapshots
            .iter()
            .filter(|s| s.get("operation_id").is_some())
            .filter_map(|s| serde_json::from_value(s.clone()).ok())
            .collect();

        let mismatches = reconcile(&expected, &operations);
        for mismatch in &mismatches {
            let key = compute_triage_key(
                "money_rail_reconcile",
                mismatch.mismatch_type,
                &mismatch.mismatch_key,
            )?;
            let row = self.triage_queue.open_or_get(key.clone());
            self.triage_queue.apply_update(
                self.tenant_id.as_str(),
                &format!("reconcile_{}_{}", key.as_str(), at.to_rfc3339()),
                key,
                TriageUpdate {
                    status: None,
                    owner_principal_id: row.owner_principal_id,
                    note: Some(mismatch.mismatch_code.clone()),
                    severity: None,
                },
            )?;
        }
        if !mismatches.is_empty() {
            tracing::warn!(count = mismatches.len(), "finance-reconcile pass found mismatches");
        }
        Ok(())
    }
}

/// Replays dead-lettered webhook deliveries that are still within their
/// [`RetryPolicy`]'s attempt budget once their backoff window has elapsed
/// (spec §4.10 "replay endpoints reapply the event idempotently").
pub struct DeliveryAckTick {
    dead_letters: Arc<DeadLetterStore>,
    retry_policy: RetryPolicy,
    event_ids: Vec<String>,
}

impl DeliveryAckTick {
    pub fn new(dead_letters: Arc<DeadLetterStore>, retry_policy: RetryPolicy, event_ids: Vec<String>) -> Self {
        Self {
            dead_letters,
            retry_policy,
            event_ids,
        }
    }
}

#[async_trait]
impl WorkerTick for DeliveryAckTick {
    async fn tick(&self, at: Timestamp) -> anyhow::Result<()> {
        for event_id in &self.event_ids {
            let Some(entry) = self.dead_letters.get(event_id) else {
                continue;
            };
            if !entry.replayable || self.retry_policy.exhausted(entry.attempt_count) {
                continue;
            }
            let last_failed = Timestamp::parse(&entry.last_failed_at)?;
            let backoff = self.retry_policy.backoff_for(entry.attempt_count);
            let elapsed_ms = (at.as_offset() - last_failed.as_offset()).whole_milliseconds();
            if elapsed_ms < backoff.as_millis() as i128 {
                continue;
            }
            let idempotency_key = format!("delivery_ack_tick_{event_id}_{}", entry.attempt_count);
            match self.dead_letters.replay(event_id, &idempotency_key) {
                Ok(replayed) => {
                    tracing::info!(event_id = replayed.event_id, "replayed dead-lettered delivery");
                }
                Err(err) => {
                    tracing::warn!(event_id, error = %err, "dead-letter replay attempt failed");
                }
            }
        }
        Ok(())
    }
}

