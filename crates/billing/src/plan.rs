//! Plan resolution (spec §4.10 component summary: "plan resolution"): a
//! small registry mapping a provider's `priceId` to the coordinator's own
//! `Plan`, so webhook ingestion can translate a `checkout.session.completed`
//! or `invoice.paid` event into a concrete entitlement change without the
//! provider's price catalog leaking into the rest of the system.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use settld_types::Cents;

use crate::error::BillingError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Plan {
    pub plan_id: String,
    pub price_id: String,
    pub price_cents: Cents,
    pub interval: BillingInterval,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    Monthly,
    Annual,
}

#[derive(Default)]
pub struct PlanRegistry {
    plans_by_price_id: DashMap<String, Plan>,
}

impl PlanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, plan: Plan) {
        self.plans_by_price_id.insert(plan.price_id.clone(), plan);
    }

    pub fn resolve(&self, price_id: &str) -> Result<Plan, BillingError> {
        self.plans_by_price_id
            .get(price_id)
            .map(|p| p.clone())
            .ok_or_else(|| BillingError::PlanNotFound(price_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_a_registered_plan_by_price_id() {
        let registry = PlanRegistry::new();
        registry.register(Plan {
            plan_id: "plan_pro".to_string(),
            price_id: "price_123".to_string(),
            price_cents: 4900,
            interval: BillingInterval::Monthly,
        });
        let plan = registry.resolve("price_123").unwrap();
        assert_eq!(plan.plan_id, "plan_pro");
    }

    #[test]
    fn unknown_price_id_fails_closed() {
        let registry = PlanRegistry::new();
        let err = registry.resolve("price_unknown").unwrap_err();
        assert!(matches!(err, BillingError::PlanNotFound(_)));
    }
}
