//! Retention cleanup (spec §4.11 "retention cleanup (dry-run supported)"),
//! adapted from the teacher's `RetentionManager::calculate_prune_plan`: a
//! pure plan computation, executed only when `dry_run` is false.

use serde::{Deserialize, Serialize};
use settld_types::{Timestamp, TenantId};

/// One category of record eligible for pruning (e.g. expired idempotency
/// records, superseded snapshots) older than `older_than`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetentionTarget {
    pub tenant_id: TenantId,
    pub record_kind: String,
    pub older_than: Timestamp,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetentionPlan {
    pub targets: Vec<RetentionTarget>,
    pub dry_run: bool,
}

/// Computes the horizon each record kind is pruned up to, given `now` and
/// a retention window per kind. Pure — callers execute or merely log the
/// plan depending on `dry_run`.
pub fn calculate_retention_plan(
    tenant_id: TenantId,
    now: Timestamp,
    windows: &[(&str, time::Duration)],
    dry_run: bool,
) -> RetentionPlan {
    let targets = windows
        .iter()
        .map(|(kind, window)| RetentionTarget {
            tenant_id: tenant_id.clone(),
            record_kind: kind.to_string(),
            older_than: Timestamp::from_offset(now.as_offset() - *window),
        })
        .collect();
    RetentionPlan { targets, dry_run }
}

/// Executes a [`RetentionPlan`]'s deletions against the store. Implemented
/// by the coordinator, which owns the `Store` handle; this crate only
/// decides what should be pruned.
#[async_trait::async_trait]
pub trait RetentionExecutor: Send + Sync {
    async fn prune(&self, target: &RetentionTarget) -> anyhow::Result<u64>;
}

/// Runs [`calculate_retention_plan`] and, unless `plan.dry_run`, hands every
/// target to `executor`.
pub async fn run_retention_tick(
    tenant_id: TenantId,
    now: Timestamp,
    windows: &[(&str, time::Duration)],
    dry_run: bool,
    executor: &dyn RetentionExecutor,
) -> anyhow::Result<RetentionPlan> {
    let plan = calculate_retention_plan(tenant_id, now, windows, dry_run);
    if !plan.dry_run {
        for target in &plan.targets {
            executor.prune(target).await?;
        }
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopExecutor;

    #[async_trait::async_trait]
    impl RetentionExecutor for NoopExecutor {
        async fn prune(&self, _target: &RetentionTarget) -> anyhow::Result<u64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn dry_run_computes_plan_without_executing() {
        let plan = run_retention_tick(
            TenantId::default_tenant(),
            Timestamp::parse("2026-02-01T00:00:00Z").unwrap(),
            &[("idempotency_record", time::Duration::days(30))],
            true,
            &NoopExecutor,
        )
        .await
        .unwrap();
        assert!(plan.dry_run);
        assert_eq!(plan.targets.len(), 1);
        assert_eq!(
            plan.targets[0].older_than,
            Timestamp::parse("2026-01-02T00:00:00Z").unwrap()
        );
    }
}
