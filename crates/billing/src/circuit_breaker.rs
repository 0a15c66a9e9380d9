//! Per-provider circuit breaker (spec §4.10 "a circuit breaker (failure
//! threshold → `open` for `openMs`) shield upstream provider calls").

use parking_lot::Mutex;

use crate::error::BillingError;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at_unix_ms: i64,
}

/// One breaker per `providerId`. `parking_lot::Mutex`-guarded rather than
/// `dashmap`-sharded since a breaker's own state transitions (closed → open
/// → half-open → closed) must be observed and mutated atomically as a unit,
/// unlike the money-rails triage queue's independent per-key rows.
pub struct CircuitBreaker {
    provider_id: String,
    failure_threshold: u32,
    open_ms: i64,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(provider_id: impl Into<String>, failure_threshold: u32, open_ms: i64) -> Self {
        Self {
            provider_id: provider_id.into(),
            failure_threshold,
            open_ms,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at_unix_ms: 0,
            }),
        }
    }

    /// Call before attempting an upstream call. `open` past `open_ms`
    /// transitions to `half_open` (one trial call allowed) rather than
    /// staying open forever.
    pub fn check(&self, now_unix_ms: i64) -> Result<(), BillingError> {
        let mut inner = self.inner.lock();
        match inner.state {
            BreakerState::Closed | BreakerState::HalfOpen => Ok(()),
            BreakerState::Open => {
                if now_unix_ms - inner.opened_at_unix_ms >= self.open_ms {
                    inner.state = BreakerState::HalfOpen;
                    Ok(())
                } else {
                    Err(BillingError::CircuitOpen(self.provider_id.clone()))
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        inner.state = BreakerState::Closed;
        inner.consecutive_failures = 0;
    }

    pub fn record_failure(&self, now_unix_ms: i64) {
        let mut inner = self.inner.lock();
        inner.consecutive_failures += 1;
        if inner.state == BreakerState::HalfOpen || inner.consecutive_failures >= self.failure_threshold {
            inner.state = BreakerState::Open;
            inner.opened_at_unix_ms = now_unix_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_threshold_consecutive_failures() {
        let breaker = CircuitBreaker::new("stripe", 3, 10_000);
        breaker.check(0).unwrap();
        breaker.record_failure(0);
        breaker.record_failure(0);
        breaker.check(0).unwrap();
        breaker.record_failure(0);
        let err = breaker.check(0).unwrap_err();
        assert!(matches!(err, BillingError::CircuitOpen(_)));
    }

    #[test]
    fn half_opens_after_open_ms_elapses_then_closes_on_success() {
        let breaker = CircuitBreaker::new("stripe", 1, 1_000);
        breaker.record_failure(0);
        breaker.check(0).unwrap_err();
        breaker.check(1_000).unwrap();
        breaker.record_success();
        breaker.check(1_000).unwrap();
    }

    #[test]
    fn a_failure_while_half_open_reopens_immediately() {
        let breaker = CircuitBreaker::new("stripe", 1, 1_000);
        breaker.record_failure(0);
        breaker.check(1_000).unwrap();
        breaker.record_failure(1_000);
        let err = breaker.check(1_000).unwrap_err();
        assert!(matches!(err, BillingError::CircuitOpen(_)));
    }
}
