#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
//! The event-sourced aggregate kernel (spec §2 C3, §4.3): chained per-stream
//! event appends, reducer dispatch, signer-lifecycle enforcement, and
//! idempotency memoization. Domain crates (`settld-identity`, `settld-x402`,
//! `settld-ledger`, ...) depend on this crate; it depends on nothing
//! domain-specific beyond the `settld-api` port contracts.

pub mod config;
pub mod dyn_reducer;
pub mod error;
pub mod kernel;

pub use config::{KernelConfig, LockStrategy};
pub use dyn_reducer::DynReducer;
pub use error::KernelError;
pub use kernel::{AppendInput, AppendResult, EventKernel};
