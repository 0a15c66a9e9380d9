//! External money-rail payout operations, reconciliation, triage, and
//! chargeback exposure (spec §2 C7, §4.7).

pub mod chargeback;
pub mod config;
pub mod error;
pub mod operation;
pub mod reconcile;
pub mod triage;

pub use chargeback::ChargebackExposureTracker;
pub use config::RailsConfig;
pub use error::MoneyRailsError;
pub use operation::{MoneyRailOperationReducer, MoneyRailOperationSnapshot, MoneyRailOperationState};
pub use reconcile::{reconcile, ExpectedPayout, MismatchType, ReconcileMismatch};
pub use triage::{compute_triage_key, TriageQueue, TriageRow, TriageSeverity, TriageStatus, TriageUpdate};
