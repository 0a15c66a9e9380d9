#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
//! Logging/tracing init and metrics (SPEC_FULL.md §10.1), mirroring the
//! teacher's `ioi-telemetry` crate: a single idempotent `tracing` +
//! `tracing-subscriber` init entry point plus a `prometheus` registry.
//! There is no HTTP `/metrics` endpoint here — the HTTP surface is an
//! explicit spec §1 Non-goal — but the registry is queryable in-process,
//! which is all the ops workers and tests in this workspace need.

pub mod init;
pub mod metrics;

pub use init::{init_tracing, LogConfig, LogFormat};
pub use metrics::Metrics;
