//! Dead-letter bookkeeping for failed webhook deliveries (spec §4.10
//! "Failed webhook deliveries land in a **dead-letter** store with
//! `{eventId, reason, replayable}`; replay endpoints reapply the event
//! idempotently", SPEC_FULL.md §11.4 supplementing `{attempt_count,
//! first_failed_at, last_failed_at, last_error_code, replayable}`).

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::BillingError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeadLetterEntry {
    pub event_id: String,
    pub reason: String,
    pub replayable: bool,
    pub attempt_count: u32,
    pub first_failed_at: String,
    pub last_failed_at: String,
    pub last_error_code: String,
}

/// Keyed on `eventId`, `dashmap`-backed the same way the money-rails
/// triage queue and chargeback tracker are.
#[derive(Default)]
pub struct DeadLetterStore {
    entries: DashMap<String, DeadLetterEntry>,
    replayed_idempotency_keys: DashMap<String, DeadLetterEntry>,
}

impl DeadLetterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failed delivery, accumulating `attempt_count` if the
    /// event already has an entry rather than overwriting history.
    pub fn record_failure(
        &self,
        event_id: &str,
        reason: &str,
        error_code: &str,
        at: &str,
        replayable: bool,
    ) -> DeadLetterEntry {
        let mut entry = self
            .entries
            .get(event_id)
            .map(|e| e.clone())
            .unwrap_or_else(|| DeadLetterEntry {
                event_id: event_id.to_string(),
                reason: reason.to_string(),
                replayable,
                attempt_count: 0,
                first_failed_at: at.to_string(),
                last_failed_at: at.to_string(),
                last_error_code: error_code.to_string(),
            });
        entry.attempt_count += 1;
        entry.last_failed_at = at.to_string();
        entry.last_error_code = error_code.to_string();
        entry.reason = reason.to_string();
        entry.replayable = replayable;
        self.entries.insert(event_id.to_string(), entry.clone());
        entry
    }

    pub fn get(&self, event_id: &str) -> Option<DeadLetterEntry> {
        self.entries.get(event_id).map(|e| e.clone())
    }

    /// Replays a dead-lettered event idempotently on `idempotency_key`: a
    /// repeated replay call with the same key returns the same entry
    /// without re-validating `replayable` (spec §4.10 "replay endpoints
    /// reapply the event idempotently").
    pub fn replay(
        &self,
        event_id: &str,
        idempotency_key: &str,
    ) -> Result<DeadLetterEntry, BillingError> {
        if let Some(memoized) = self.replayed_idempotency_keys.get(idempotency_key) {
            return Ok(memoized.clone());
        }
        let entry = self
            .entries
            .get(event_id)
            .map(|e| e.clone())
            .ok_or_else(|| BillingError::DeadLetterNotFound(event_id.to_string()))?;
        if !entry.replayable {
            return Err(BillingError::DeadLetterNotReplayable(event_id.to_string()));
        }
        self.replayed_idempotency_keys
            .insert(idempotency_key.to_string(), entry.clone());
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_failures_accumulate_attempt_count() {
        let store = DeadLetterStore::new();
        store.record_failure("evt_1", "timeout", "UPSTREAM_TIMEOUT", "t1", true);
        let second = store.record_failure("evt_1", "timeout", "UPSTREAM_TIMEOUT", "t2", true);
        assert_eq!(second.attempt_count, 2);
        assert_eq!(second.first_failed_at, "t1");
        assert_eq!(second.last_failed_at, "t2");
    }

    #[test]
    fn replay_is_idempotent_on_key() {
        let store = DeadLetterStore::new();
        store.record_failure("evt_1", "timeout", "UPSTREAM_TIMEOUT", "t1", true);
        let first = store.replay("evt_1", "idem_1").unwrap();
        let second = store.replay("evt_1", "idem_1").unwrap();
        assert_eq!(first.event_id, second.event_id);
    }

    #[test]
    fn non_replayable_entries_reject_replay() {
        let store = DeadLetterStore::new();
        store.record_failure("evt_1", "schema invalid", "EVENT_PAYLOAD_INVALID", "t1", false);
        let err = store.replay("evt_1", "idem_1").unwrap_err();
        assert!(matches!(err, BillingError::DeadLetterNotReplayable(_)));
    }
}
