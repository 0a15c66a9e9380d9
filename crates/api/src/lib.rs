#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
//! The Store port, the reducer contract, and the top-level error façade
//! (spec §4.2, §4.3, §7). Every component crate depends on this one; it
//! depends on nothing domain-specific.

pub mod error;
pub mod reducer;
pub mod signer;
pub mod store;

pub use error::{CoordinatorError, StoreError};
pub use reducer::Reducer;
pub use signer::{SignerLifecycleOutcome, SignerRegistry};
pub use store::{IdempotencyRecord, ListFilter, RecordKind, Store, StoreOp, TxInput};
