//! The release-policy matrix (spec §4.5 "Release matrix", SPEC_FULL.md
//! §11.3): a small data table rather than a matched if/else chain, mirroring
//! the teacher's `agentic::rules::ActionRules { rules, defaults }` shape.

use serde::{Deserialize, Serialize};
use settld_types::{money::split_by_rate_pct, Cents};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseMode {
    Auto,
    Manual,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Green,
    Amber,
    Red,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ReleaseRule {
    pub auto_release: bool,
    pub release_rate_pct: u8,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReleasePolicy {
    pub mode: ReleaseMode,
    pub green: ReleaseRule,
    pub amber: ReleaseRule,
    pub red: ReleaseRule,
}

impl ReleasePolicy {
    /// The default `autoReleaseOnGreen: true, greenReleaseRatePct: 100`
    /// example from spec §8 scenario 1, with amber/red defaulting to no
    /// auto-release (full refund) unless configured otherwise.
    pub fn auto_release_on_green_only() -> Self {
        Self {
            mode: ReleaseMode::Auto,
            green: ReleaseRule {
                auto_release: true,
                release_rate_pct: 100,
            },
            amber: ReleaseRule {
                auto_release: false,
                release_rate_pct: 0,
            },
            red: ReleaseRule {
                auto_release: false,
                release_rate_pct: 0,
            },
        }
    }

    fn rule_for(&self, status: VerificationStatus) -> ReleaseRule {
        match status {
            VerificationStatus::Green => self.green,
            VerificationStatus::Amber => self.amber,
            VerificationStatus::Red => self.red,
        }
    }
}

/// The result of applying a [`ReleasePolicy`] to a verified gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// `policy.mode == manual`: no funds move; the gate enters
    /// `awaiting_manual`.
    AwaitingManual,
    Split { released: Cents, refunded: Cents },
}

/// Computes `releasedAmountCents`/`refundedAmountCents` for `amount_cents`
/// given `status` and `policy` (spec §4.5 "Release matrix"). Always holds
/// `released + refunded == amount_cents` when a split is returned.
pub fn compute_release(
    amount_cents: Cents,
    status: VerificationStatus,
    policy: &ReleasePolicy,
) -> ReleaseOutcome {
    if policy.mode == ReleaseMode::Manual {
        return ReleaseOutcome::AwaitingManual;
    }
    let rule = policy.rule_for(status);
    if !rule.auto_release {
        return ReleaseOutcome::Split {
            released: 0,
            refunded: amount_cents,
        };
    }
    let (released, refunded) = split_by_rate_pct(amount_cents, rule.release_rate_pct);
    ReleaseOutcome::Split { released, refunded }
}
