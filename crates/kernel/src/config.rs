//! Per-stream lock strategy and idempotency TTL (spec §9 "Dynamic option
//! bags in the source are re-expressed as explicit configuration structs").

/// How the kernel serializes concurrent appends to the same stream (spec
/// §5: "the EventKernel acquires a per-stream lock (advisory DB lock or
/// in-memory mutex keyed by `(tenantId, streamId)`)").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStrategy {
    /// `dashmap`-backed in-process mutex, one per `(tenantId, streamId)`.
    InMemoryMutex,
    /// `SELECT ... FOR UPDATE`-style advisory lock, delegated to the Store
    /// backend. No SQL backend ships in this workspace (spec §1 Non-goal);
    /// this variant documents the seam for one.
    AdvisoryDbLock,
}

#[derive(Debug, Clone)]
pub struct KernelConfig {
    pub lock_strategy: LockStrategy,
    /// How long an idempotency memo is honored before a replay is treated
    /// as a fresh request. `None` means memos never expire, which is the
    /// default — spec §3 invariant (vi) does not mention expiry.
    pub idempotency_ttl_seconds: Option<u64>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            lock_strategy: LockStrategy::InMemoryMutex,
            idempotency_ttl_seconds: None,
        }
    }
}
