//! Integer-cents money types shared by the ledger, x402 gate, and money-rails
//! subsystems. Amounts are always `i64` cents; no floating point ever
//! represents money anywhere in this workspace.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An ISO-4217 currency code, e.g. `"USD"`. Stored upper-case.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(pub String);

impl Currency {
    /// Builds a currency code, upper-casing it so `"usd"` and `"USD"` compare equal.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().to_ascii_uppercase())
    }

    pub fn usd() -> Self {
        Self::new("USD")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A direction for a ledger posting leg.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Debit,
    Credit,
}

/// A signed amount in minor currency units (cents). Never a float.
pub type Cents = i64;

/// Splits `total` into a released/refunded pair given an integer percentage,
/// rounding the release down and assigning the remainder to refund — the
/// rounding rule spec §4.5 "Release matrix" mandates so `released + refunded
/// == total` always holds exactly.
pub fn split_by_rate_pct(total: Cents, rate_pct: u8) -> (Cents, Cents) {
    debug_assert!(rate_pct <= 100, "rate_pct must be a percentage 0..=100");
    let rate_pct = rate_pct.min(100) as i64;
    let released = (total * rate_pct) / 100;
    let refunded = total - released;
    (released, refunded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_rounds_release_down() {
        let (released, refunded) = split_by_rate_pct(401, 50);
        assert_eq!(released, 200);
        assert_eq!(refunded, 201);
        assert_eq!(released + refunded, 401);
    }

    #[test]
    fn split_full_and_zero() {
        assert_eq!(split_by_rate_pct(1000, 100), (1000, 0));
        assert_eq!(split_by_rate_pct(1000, 0), (0, 1000));
    }

    #[test]
    fn currency_normalizes_case() {
        assert_eq!(Currency::new("usd"), Currency::new("USD"));
    }
}
