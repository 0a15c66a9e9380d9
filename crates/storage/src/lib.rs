#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
//! The in-memory reference implementation of the Store port (spec §4.2).
//!
//! Postgres/SQL backends are an explicit Non-goal of this workspace (spec
//! §1: "the in-memory vs Postgres store backends ... treated as a single
//! `Store` port"); this crate is the one concrete backend that ships,
//! structured the way the teacher's `dashmap`-backed in-process stores are
//! (see `RetentionManager`): one `DashMap` per logical table, guarded
//! individually rather than behind one global lock.

mod memory;

pub use memory::InMemoryStore;
