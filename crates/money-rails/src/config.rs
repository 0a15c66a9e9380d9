//! Money-rails configuration (SPEC_FULL.md §10.3 ambient config surface).

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RailsConfig {
    /// How often the finance-reconcile worker runs a pass, in seconds
    /// (spec §4.11 "finance-reconcile (configurable interval)").
    pub reconcile_interval_seconds: u64,
    /// Default triage severity assigned to a freshly opened mismatch row.
    pub default_triage_severity: crate::triage::TriageSeverity,
}

impl Default for RailsConfig {
    fn default() -> Self {
        Self {
            reconcile_interval_seconds: 3600,
            default_triage_severity: crate::triage::TriageSeverity::Medium,
        }
    }
}
