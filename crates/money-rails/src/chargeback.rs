//! Chargeback exposure tracking (spec §4.7): "An ingested `reversed` event
//! for a confirmed payout creates chargeback exposure aggregated per
//! `(providerId, partyId, period)`; enqueuing a new payout for that party
//! while outstanding exposure exists fails closed with a well-known code."

use dashmap::DashMap;
use settld_types::{Cents, PartyId, ProviderId};

use crate::error::MoneyRailsError;

fn exposure_key(provider_id: &ProviderId, party_id: &PartyId, period: &str) -> String {
    format!("{provider_id}:{party_id}:{period}")
}

/// Tracks outstanding chargeback exposure per `(providerId, partyId,
/// period)`. `dashmap`-backed for the same reason the identity crate's
/// signer registry and this crate's triage queue are — an in-process side
/// table the `Store` port's ledger/op tables don't model directly.
#[derive(Default)]
pub struct ChargebackExposureTracker {
    exposure_cents: DashMap<String, Cents>,
}

impl ChargebackExposureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a reversed payout's amount as new exposure for the party.
    pub fn record_reversal(
        &self,
        provider_id: &ProviderId,
        party_id: &PartyId,
        period: &str,
        amount_cents: Cents,
    ) {
        *self
            .exposure_cents
            .entry(exposure_key(provider_id, party_id, period))
            .or_insert(0) += amount_cents;
    }

    /// Clears exposure once it has been recovered or written off (an
    /// explicit operator action, not modeled further here).
    pub fn clear(&self, provider_id: &ProviderId, party_id: &PartyId, period: &str) {
        self.exposure_cents
            .remove(&exposure_key(provider_id, party_id, period));
    }

    pub fn outstanding_cents(
        &self,
        provider_id: &ProviderId,
        party_id: &PartyId,
        period: &str,
    ) -> Cents {
        self.exposure_cents
            .get(&exposure_key(provider_id, party_id, period))
            .map(|v| *v)
            .unwrap_or(0)
    }

    /// Fails closed (`MONEY_RAILS_PAYOUT_BLOCKED_ON_CHARGEBACK_EXPOSURE`) if
    /// `party_id` has any outstanding exposure against `provider_id` for
    /// `period` (spec §4.7).
    pub fn check_payout_allowed(
        &self,
        provider_id: &ProviderId,
        party_id: &PartyId,
        period: &str,
    ) -> Result<(), MoneyRailsError> {
        if self.outstanding_cents(provider_id, party_id, period) > 0 {
            return Err(MoneyRailsError::PayoutBlockedOnChargebackExposure {
                party_id: party_id.to_string(),
                provider_id: provider_id.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payout_blocked_while_exposure_outstanding() {
        let tracker = ChargebackExposureTracker::new();
        let provider = ProviderId::from("stripe".to_string());
        let party = PartyId::from("party_1".to_string());
        tracker.record_reversal(&provider, &party, "2026-01", 5000);
        let err = tracker
            .check_payout_allowed(&provider, &party, "2026-01")
            .unwrap_err();
        assert!(matches!(
            err,
            MoneyRailsError::PayoutBlockedOnChargebackExposure { .. }
        ));
    }

    #[test]
    fn clearing_exposure_unblocks_payout() {
        let tracker = ChargebackExposureTracker::new();
        let provider = ProviderId::from("stripe".to_string());
        let party = PartyId::from("party_1".to_string());
        tracker.record_reversal(&provider, &party, "2026-01", 5000);
        tracker.clear(&provider, &party, "2026-01");
        tracker
            .check_payout_allowed(&provider, &party, "2026-01")
            .unwrap();
    }

    #[test]
    fn exposure_is_scoped_per_period() {
        let tracker = ChargebackExposureTracker::new();
        let provider = ProviderId::from("stripe".to_string());
        let party = PartyId::from("party_1".to_string());
        tracker.record_reversal(&provider, &party, "2026-01", 5000);
        tracker
            .check_payout_allowed(&provider, &party, "2026-02")
            .unwrap();
    }
}
