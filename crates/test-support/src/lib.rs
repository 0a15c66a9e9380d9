#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
//! Shared fixtures for integration tests across the coordinator workspace
//! (spec §10.4 "Test tooling"), grounded on the teacher's `ioi-test_utils`
//! crate: fixed-seed key material, a canned clock instead of wall-clock
//! reads, and a ready-to-use in-memory `Store`.

mod clock;
mod signer;
mod store;

pub use clock::CannedClock;
pub use signer::{fixed_signer_keypair, FakeSignerRegistry};
pub use store::test_tenant;

pub use settld_storage::InMemoryStore;
