//! The Store port (spec §4.2): "a narrow port: `withTx(fn)` (atomic
//! multi-op), per-kind `put/get/list` operations, and idempotency
//! memoization." Concrete backends (in-memory, Postgres) are explicitly out
//! of scope per spec §1 except as implementations of this trait; only the
//! in-memory reference backend (`settld-storage`) lives in this workspace.
//!
//! Mirrors the shape of the teacher's `api::storage::NodeStore` trait: an
//! `async_trait`, `Send + Sync`, one atomic commit method plus synchronous
//! read methods, and a dedicated error type distinct from domain errors.

use async_trait::async_trait;
use serde_json::Value;
use settld_types::{IdempotencyKey, TenantId, Timestamp};
use std::collections::BTreeMap;

use crate::error::StoreError;

/// The record kinds `commitTx` can write and `list`/`get` can read. Mirrors
/// spec §4.2's op list (`EVENT_APPEND, SNAPSHOT_UPSERT, ARTIFACT_PUT,
/// LEDGER_ENTRY_APPEND, GRANT_UPSERT, HOLD_UPDATE, GATE_UPSERT,
/// IDEMPOTENCY_PUT, …`); the trailing ellipsis there is why this list is
/// wider than the eight named explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    Event,
    Snapshot,
    Artifact,
    LedgerEntry,
    Grant,
    Hold,
    Gate,
    Idempotency,
    MoneyRailOperation,
    TriageRow,
    DisputeCase,
    ArbitrationCase,
    DeadLetter,
    Lease,
    SessionEvent,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Event => "event",
            RecordKind::Snapshot => "snapshot",
            RecordKind::Artifact => "artifact",
            RecordKind::LedgerEntry => "ledger_entry",
            RecordKind::Grant => "grant",
            RecordKind::Hold => "hold",
            RecordKind::Gate => "gate",
            RecordKind::Idempotency => "idempotency",
            RecordKind::MoneyRailOperation => "money_rail_operation",
            RecordKind::TriageRow => "triage_row",
            RecordKind::DisputeCase => "dispute_case",
            RecordKind::ArbitrationCase => "arbitration_case",
            RecordKind::DeadLetter => "dead_letter",
            RecordKind::Lease => "lease",
            RecordKind::SessionEvent => "session_event",
        }
    }
}

/// A single write inside a `commitTx` batch. `id` is the record's primary
/// key within its kind (e.g. an `EventId`, a `GateId`); `value` is the
/// already-validated canonical JSON body. Appends (`Event`, `LedgerEntry`,
/// `SessionEvent`) must not be reused for an `id` that already exists within
/// the same kind; upserts (`Snapshot`, `Grant`, `Hold`, `Gate`, ...) replace
/// whatever was there.
#[derive(Debug, Clone)]
pub struct StoreOp {
    pub kind: RecordKind,
    pub id: String,
    pub value: Value,
    /// Set only on `IDEMPOTENCY_PUT`: the route-scoped fingerprint under
    /// which later identical requests are recognized as replays (spec §4.3
    /// step (a), invariant (vi)).
    pub idempotency: Option<IdempotencyRecord>,
}

#[derive(Debug, Clone)]
pub struct IdempotencyRecord {
    pub key: IdempotencyKey,
    pub route_binding_hash: String,
    pub response: Value,
}

/// The full input to one atomic transaction: "either commits all or none"
/// (spec §4.2).
#[derive(Debug, Clone)]
pub struct TxInput {
    pub tenant_id: TenantId,
    pub at: Timestamp,
    pub ops: Vec<StoreOp>,
}

/// A `list` query filter. `equals` values are matched by JSON equality
/// against the corresponding field of each stored record's `value`; an
/// unrecognized field name or a value of the wrong JSON type for a
/// recognized field is a caller bug surfaced as `SCHEMA_INVALID`, never
/// silently ignored (spec §4.2 "validate filter types strictly").
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub equals: BTreeMap<String, Value>,
    pub limit: Option<usize>,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: Value) -> Self {
        self.equals.insert(field.to_string(), value);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// The Store port. Every write path in the coordinator funnels through
/// `commit_tx`; reads are synchronous-shaped (`Result` without `.await`) at
/// the trait level but the trait itself is `async_trait` so backends that
/// need network I/O for reads (a Postgres implementation) still fit.
#[async_trait]
pub trait Store: Send + Sync {
    /// Atomically applies every op in `input.ops`, or none of them.
    async fn commit_tx(&self, input: TxInput) -> Result<(), StoreError>;

    /// Fetches one record by kind + id, tenant-scoped.
    async fn get(
        &self,
        tenant_id: &TenantId,
        kind: RecordKind,
        id: &str,
    ) -> Result<Option<Value>, StoreError>;

    /// Lists records of one kind matching `filter`, sorted by `(id ASC)`
    /// (spec §4.2 "List methods sort by (id ASC) deterministically").
    async fn list(
        &self,
        tenant_id: &TenantId,
        kind: RecordKind,
        filter: ListFilter,
    ) -> Result<Vec<Value>, StoreError>;

    /// Returns the memoized response for `(tenantId, idempotencyKey,
    /// routeBindingHash)` if this exact request was already applied
    /// (invariant (vi)).
    async fn idempotency_get(
        &self,
        tenant_id: &TenantId,
        key: &IdempotencyKey,
        route_binding_hash: &str,
    ) -> Result<Option<Value>, StoreError>;

    /// The chain head of an event stream: the last appended event's
    /// `chainHash`, or `None` for an empty stream.
    async fn stream_head(
        &self,
        tenant_id: &TenantId,
        stream_id: &str,
    ) -> Result<Option<String>, StoreError>;

    /// All events of a stream in append order, used to rebuild a snapshot
    /// from scratch (spec §8 "rebuilding the snapshot from any prefix").
    async fn stream_events(
        &self,
        tenant_id: &TenantId,
        stream_id: &str,
    ) -> Result<Vec<Value>, StoreError>;
}
