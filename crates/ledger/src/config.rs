//! Ledger configuration (SPEC_FULL.md §10.3 ambient config surface).

use serde::{Deserialize, Serialize};

use crate::statement::StatementBasis;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// The basis `computePartyStatement` sums under until a `MonthClose`
    /// freezes it (spec §4.6).
    pub statement_basis: StatementBasis,
    /// Minor-unit precision asserted for every currency this deployment
    /// accepts; cents (precision 2) for every currency in the current
    /// catalog.
    pub currency_precision: u8,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            statement_basis: StatementBasis::SettledAt,
            currency_precision: 2,
        }
    }
}
