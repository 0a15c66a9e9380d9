//! A clock fixture that returns a fixed, advanceable instant instead of
//! reading the wall clock, so tests stay deterministic (spec §9 "Wall-clock
//! reads inside reducers are forbidden").

use parking_lot::Mutex;
use settld_types::{Clock, Timestamp};

/// A [`Clock`] that starts at a caller-supplied instant and only moves when
/// [`CannedClock::advance`] is called explicitly.
pub struct CannedClock {
    current: Mutex<Timestamp>,
}

impl CannedClock {
    /// Builds a clock pinned to `2026-01-01T00:00:00Z`.
    pub fn new() -> Self {
        Self::at("2026-01-01T00:00:00Z")
    }

    /// Builds a clock pinned to an explicit RFC 3339 instant.
    pub fn at(rfc3339: &str) -> Self {
        let ts = Timestamp::parse(rfc3339).unwrap_or_else(|_| {
            Timestamp::parse("2026-01-01T00:00:00Z").expect("fallback literal always parses")
        });
        Self {
            current: Mutex::new(ts),
        }
    }

    /// Advances the clock by `seconds` and returns the new instant.
    pub fn advance(&self, seconds: i64) -> Timestamp {
        let mut guard = self.current.lock();
        let next = Timestamp::from_offset(guard.as_offset() + time::Duration::seconds(seconds));
        *guard = next;
        next
    }
}

impl Default for CannedClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for CannedClock {
    fn now(&self) -> Timestamp {
        *self.current.lock()
    }
}
