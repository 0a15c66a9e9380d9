//! Wallet escrow holds (spec §3 "Hold"): "an agent's `escrowLockedCents`
//! equals the sum of its active-hold amounts; `availableCents ≥ 0`."

use serde::{Deserialize, Serialize};
use settld_types::{AgentId, Cents, Currency, HoldId};

use crate::error::LedgerError;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldState {
    Active,
    Released,
    Refunded,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HoldRecord {
    pub hold_id: HoldId,
    pub agent_id: AgentId,
    pub amount_cents: Cents,
    pub currency: Currency,
    pub state: HoldState,
}

impl HoldRecord {
    pub fn new_active(
        hold_id: HoldId,
        agent_id: AgentId,
        amount_cents: Cents,
        currency: Currency,
    ) -> Self {
        Self {
            hold_id,
            agent_id,
            amount_cents,
            currency,
            state: HoldState::Active,
        }
    }

    /// Transitions an active hold to `released`, the terminal state
    /// `releaseHold` commits (spec §4.6). `amount_cents` must not exceed the
    /// hold's full amount — partial release of a hold is modeled as a full
    /// release for `released_cents` plus a paired refund for the remainder,
    /// not a hold left dangling at a reduced size.
    pub fn release(&self, amount_cents: Cents) -> Result<HoldRecord, LedgerError> {
        if self.state != HoldState::Active {
            return Err(LedgerError::HoldNotActive(self.hold_id.to_string()));
        }
        if amount_cents > self.amount_cents {
            return Err(LedgerError::ReleaseExceedsHold {
                hold_id: self.hold_id.to_string(),
                release_cents: amount_cents,
                hold_cents: self.amount_cents,
            });
        }
        let mut next = self.clone();
        next.state = HoldState::Released;
        Ok(next)
    }

    pub fn refund(&self) -> Result<HoldRecord, LedgerError> {
        if self.state != HoldState::Active {
            return Err(LedgerError::HoldNotActive(self.hold_id.to_string()));
        }
        let mut next = self.clone();
        next.state = HoldState::Refunded;
        Ok(next)
    }
}

/// Spec §3's escrow invariant: `escrowLockedCents == Σ active-hold amounts`.
pub fn escrow_locked_cents(holds: &[HoldRecord]) -> Cents {
    holds
        .iter()
        .filter(|h| h.state == HoldState::Active)
        .map(|h| h.amount_cents)
        .sum()
}
