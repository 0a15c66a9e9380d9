//! Worker leasing (spec §4.11 "All workers take a lease keyed on worker-id
//! + shard so at-most-one runs per shard."), shaped after the teacher's
//! `RetentionManager`/`RetentionHandle` pair: a `DashMap`-backed registry
//! handing out a drop-released handle per caller, except a lease here also
//! carries an expiry and a monotonic fencing token so a worker that has
//! lost its lease (crashed, stalled past `expires_at`) can't mistake a
//! later holder's work for its own.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use settld_types::Timestamp;

use crate::error::OpsError;

struct LeaseRow {
    holder: String,
    fencing_token: u64,
    expires_at: Timestamp,
}

/// Keyed on `(worker_id, shard)` — actually just `shard`, since only one
/// worker may hold a shard's lease at a time; `worker_id` is the identity
/// asking for it, not part of the key.
#[derive(Default)]
pub struct LeaseManager {
    rows: DashMap<String, LeaseRow>,
    next_fencing_token: AtomicU64,
}

/// A held lease. Dropping it releases the shard immediately, the same way
/// dropping a `RetentionHandle` deregisters its retention floor.
pub struct Lease {
    manager: Arc<LeaseManager>,
    shard: String,
    pub worker_id: String,
    pub fencing_token: u64,
    pub acquired_at: Timestamp,
    pub expires_at: Timestamp,
}

impl LeaseManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Acquires `shard` for `worker_id` until `now + ttl` if no unexpired
    /// lease is currently held, or if the existing lease has expired.
    /// Every successful acquisition mints a new, strictly increasing
    /// fencing token so late effects from a previous holder can be
    /// rejected by comparing tokens.
    pub fn acquire(
        self: &Arc<Self>,
        worker_id: &str,
        shard: &str,
        now: Timestamp,
        ttl: time::Duration,
    ) -> Result<Lease, OpsError> {
        if let Some(existing) = self.rows.get(shard) {
            if existing.expires_at > now {
                return Err(OpsError::LeaseHeld {
                    worker_id: worker_id.to_string(),
                    shard: shard.to_string(),
                    held_fencing_token: existing.fencing_token,
                });
            }
        }

        let fencing_token = self.next_fencing_token.fetch_add(1, Ordering::Relaxed) + 1;
        let expires_at = Timestamp::from_offset(now.as_offset() + ttl);
        self.rows.insert(
            shard.to_string(),
            LeaseRow {
                holder: worker_id.to_string(),
                fencing_token,
                expires_at,
            },
        );

        Ok(Lease {
            manager: Arc::clone(self),
            shard: shard.to_string(),
            worker_id: worker_id.to_string(),
            fencing_token,
            acquired_at: now,
            expires_at,
        })
    }

    fn release_if_current(&self, shard: &str, fencing_token: u64) {
        if let Some(row) = self.rows.get(shard) {
            if row.fencing_token != fencing_token {
                return;
            }
        } else {
            return;
        }
        self.rows.remove(shard);
    }
}

impl Lease {
    /// Extends the lease's expiry, proving liveness mid-tick for
    /// long-running worker units of work.
    pub fn renew(&mut self, now: Timestamp, ttl: time::Duration) -> Result<(), OpsError> {
        let mut row = self
            .manager
            .rows
            .get_mut(&self.shard)
            .ok_or_else(|| OpsError::StaleFencingToken(self.worker_id.clone()))?;
        if row.fencing_token != self.fencing_token {
            return Err(OpsError::StaleFencingToken(self.worker_id.clone()));
        }
        row.expires_at = Timestamp::from_offset(now.as_offset() + ttl);
        self.expires_at = row.expires_at;
        Ok(())
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.manager.release_if_current(&self.shard, self.fencing_token);
    }
}
