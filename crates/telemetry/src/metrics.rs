//! An in-process `prometheus` metrics registry (SPEC_FULL.md §10.1),
//! counting event appends, gate transitions, ledger postings, and payout
//! operations. No HTTP exposition — queried directly in-process by ops
//! workers and tests, matching the teacher's `ioi_telemetry::prometheus`
//! module's registry construction but without its `axum` exposition route,
//! which would fall under the HTTP-surface Non-goal (spec §1).

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

/// Named counters every subsystem increments as side effects happen. Held
/// behind `Arc` by callers so one instance can be shared across the
/// coordinator and its background workers.
pub struct Metrics {
    registry: Registry,
    pub events_appended_total: IntCounterVec,
    pub gate_transitions_total: IntCounterVec,
    pub ledger_postings_total: IntCounter,
    pub payout_operations_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let events_appended_total = IntCounterVec::new(
            Opts::new(
                "settld_events_appended_total",
                "Events appended to any aggregate stream, by stream kind",
            ),
            &["stream_kind"],
        )?;
        let gate_transitions_total = IntCounterVec::new(
            Opts::new(
                "settld_gate_transitions_total",
                "X402Gate state transitions, by resulting state",
            ),
            &["state"],
        )?;
        let ledger_postings_total = IntCounter::new(
            "settld_ledger_postings_total",
            "Individual ledger posting legs written",
        )?;
        let payout_operations_total = IntCounterVec::new(
            Opts::new(
                "settld_payout_operations_total",
                "MoneyRailOperation transitions, by resulting state",
            ),
            &["state"],
        )?;

        registry.register(Box::new(events_appended_total.clone()))?;
        registry.register(Box::new(gate_transitions_total.clone()))?;
        registry.register(Box::new(ledger_postings_total.clone()))?;
        registry.register(Box::new(payout_operations_total.clone()))?;

        Ok(Self {
            registry,
            events_appended_total,
            gate_transitions_total,
            ledger_postings_total,
            payout_operations_total,
        })
    }

    /// The underlying `prometheus::Registry`, exposed so a (non-core, spec
    /// §1 Non-goal) HTTP layer could wire up `/metrics` without this crate
    /// needing to know about HTTP at all.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_queryable_in_process() {
        let metrics = Metrics::new().unwrap();
        metrics
            .events_appended_total
            .with_label_values(&["agent"])
            .inc();
        metrics.ledger_postings_total.inc_by(2);
        assert_eq!(
            metrics
                .events_appended_total
                .with_label_values(&["agent"])
                .get(),
            1
        );
        assert_eq!(metrics.ledger_postings_total.get(), 2);
    }
}
