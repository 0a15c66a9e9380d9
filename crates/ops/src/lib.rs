#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
//! Periodic maintenance workers and worker leasing (spec §2 C11, §4.11):
//! retention cleanup, finance-reconcile, month-close, and delivery-ack
//! scanning, each run by the generic [`worker::run_worker_loop`] harness
//! under a [`lease::LeaseManager`]-held shard lease. The concrete store
//! calls each tick makes (pruning rows, re-running reconciliation, closing
//! a month) are supplied by the coordinator crate, which owns the `Store`
//! handle; this crate only decides what each tick should do and when.

pub mod config;
pub mod error;
pub mod lease;
pub mod retention;
pub mod worker;

pub use config::{
    DeliveryAckWorkerConfig, FinanceReconcileWorkerConfig, MonthCloseWorkerConfig, OpsConfig,
    RetentionWorkerConfig,
};
pub use error::OpsError;
pub use lease::{Lease, LeaseManager};
pub use retention::{
    calculate_retention_plan, run_retention_tick, RetentionExecutor, RetentionPlan, RetentionTarget,
};
pub use worker::{run_worker_loop, WorkerTick};
