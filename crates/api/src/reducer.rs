//! The reducer contract (spec §4.3): "Deterministic functions: they must be
//! (i) total over the event type's validated payload, (ii) order-independent
//! only for commuting event pairs ..., (iii) free of wall-clock side effects
//! (they take `event.at`)."

use serde::{de::DeserializeOwned, Serialize};
use settld_types::Event;

use crate::error::CoordinatorError;

/// Implemented once per stream kind (`Agent`, `Run`, `X402Gate`, ...). The
/// kernel (spec §4.3) is the only caller: it loads the current snapshot,
/// calls `apply`, and persists the result in the same `commitTx` as the
/// event append.
pub trait Reducer: Send + Sync {
    type Snapshot: Serialize + DeserializeOwned + Clone + Send + Sync;

    /// Applies one event to a snapshot, returning the next snapshot.
    /// `snapshot` is `None` only for the first event of a stream.
    ///
    /// Must not read a clock; must not perform I/O; must fail with
    /// `EVENT_PAYLOAD_INVALID` (surfaced as [`CoordinatorError`]) rather than
    /// skip a malformed payload (spec §4.3 "a malformed stored event halts
    /// reduction").
    fn apply(
        &self,
        snapshot: Option<Self::Snapshot>,
        event: &Event,
    ) -> Result<Self::Snapshot, CoordinatorError>;

    /// Rebuilds a snapshot from scratch by folding every event of a stream
    /// in order. Used by the §8 invariant test ("rebuilding the snapshot
    /// from any prefix yields chain-hash equal to that prefix's last
    /// event's `chainHash`") and by cache-rebuild/ops tooling.
    fn rebuild<'a, I>(&self, events: I) -> Result<Option<Self::Snapshot>, CoordinatorError>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut snapshot = None;
        for event in events {
            snapshot = Some(self.apply(snapshot, event)?);
        }
        Ok(snapshot)
    }
}
