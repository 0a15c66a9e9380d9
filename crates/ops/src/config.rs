//! Per-worker configuration (spec §4.11, SPEC_FULL.md §10.3): each
//! periodic worker gets its own interval and, where relevant, a dry-run
//! flag, mirroring the teacher's one-config-struct-per-subsystem
//! convention (`kernel::KernelConfig`, `x402::GateConfig`, ...).

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RetentionWorkerConfig {
    pub interval_ms: u64,
    pub lease_ttl_ms: u64,
    /// When `true`, the worker computes and logs its prune plan but never
    /// calls the executor (spec §4.11 "retention cleanup (dry-run
    /// supported)").
    pub dry_run: bool,
}

impl Default for RetentionWorkerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 60 * 60 * 1000,
            lease_ttl_ms: 5 * 60 * 1000,
            dry_run: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FinanceReconcileWorkerConfig {
    pub interval_ms: u64,
    pub lease_ttl_ms: u64,
}

impl Default for FinanceReconcileWorkerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 15 * 60 * 1000,
            lease_ttl_ms: 5 * 60 * 1000,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MonthCloseWorkerConfig {
    pub interval_ms: u64,
    pub lease_ttl_ms: u64,
}

impl Default for MonthCloseWorkerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 24 * 60 * 60 * 1000,
            lease_ttl_ms: 30 * 60 * 1000,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DeliveryAckWorkerConfig {
    pub interval_ms: u64,
    pub lease_ttl_ms: u64,
}

impl Default for DeliveryAckWorkerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5 * 60 * 1000,
            lease_ttl_ms: 60 * 1000,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct OpsConfig {
    pub retention: RetentionWorkerConfig,
    pub finance_reconcile: FinanceReconcileWorkerConfig,
    pub month_close: MonthCloseWorkerConfig,
    pub delivery_ack: DeliveryAckWorkerConfig,
}
