#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
//! The composition root (spec §6): `Job`/`Run`/`Governance` reducers that
//! have no dedicated component write-up of their own, the `Coordinator`
//! command surface wiring every subsystem crate together, and the concrete
//! `settld-ops::WorkerTick` implementations the periodic maintenance
//! workers run.

pub mod error;
pub mod governance;
pub mod job;
pub mod run;
pub mod service;
pub mod workers;

pub use error::CoordinatorDomainError;
pub use governance::{GovernanceReducer, GovernanceSnapshot};
pub use job::{JobReducer, JobSnapshot, JobState};
pub use run::{RunReducer, RunSnapshot, RunState, RunStepRecord};
pub use service::Coordinator;
pub use workers::{DeliveryAckTick, FinanceReconcileTick, MonthCloseTick};
