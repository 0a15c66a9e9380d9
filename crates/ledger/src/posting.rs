//! Double-entry postings and `LedgerEntry` (spec §3 "Ledger", §4.6):
//! "`Σ debits == Σ credits` per entry and per currency." Grounded on the same
//! group-by-asset, sum-to-zero check a minimal double-entry ledger service
//! performs before committing a transaction.

use serde::{Deserialize, Serialize};
use settld_types::{money::Direction, Cents, Currency, LedgerEntryId, PartyId, Timestamp};

use crate::error::LedgerError;

/// Attributes a posting to a settlement party (spec §3 "Allocations
/// attribute posting amounts to `{partyId, partyRole}`").
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartyRef {
    pub party_id: PartyId,
    pub party_role: String,
}

/// A well-known internal account a posting debits or credits (spec §4.6:
/// "payer wallet, payee wallet, provider suspense, SLA-credit liability,
/// tax, fees"). Kept as string keys rather than a closed enum since the
/// account namespace is open-ended per provider/agent, but constructed only
/// through these helpers so the naming stays consistent everywhere.
pub fn account_payer_wallet(agent_id: &str) -> String {
    format!("wallet:payer:{agent_id}")
}

pub fn account_payee_wallet(agent_id: &str) -> String {
    format!("wallet:payee:{agent_id}")
}

pub fn account_escrow(agent_id: &str) -> String {
    format!("escrow:{agent_id}")
}

pub fn account_provider_suspense(provider_id: &str) -> String {
    format!("suspense:{provider_id}")
}

pub fn account_sla_credit_liability() -> String {
    "liability:sla_credit".to_string()
}

pub fn account_tax() -> String {
    "account:tax".to_string()
}

pub fn account_fees() -> String {
    "account:fees".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Posting {
    pub posting_id: String,
    pub account_id: String,
    pub direction: Direction,
    pub currency: Currency,
    pub amount_cents: Cents,
    pub party_ref: Option<PartyRef>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub entry_id: LedgerEntryId,
    pub at: Timestamp,
    pub postings: Vec<Posting>,
}

/// Validates spec §3's zero-sum invariant: debits equal credits, grouped
/// independently by currency (a multi-currency entry is legal as long as
/// each currency balances on its own).
pub fn validate_zero_sum(postings: &[Posting]) -> Result<(), LedgerError> {
    use std::collections::BTreeMap;

    let mut totals: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for posting in postings {
        let entry = totals.entry(posting.currency.0.as_str()).or_insert((0, 0));
        match posting.direction {
            Direction::Debit => entry.0 += posting.amount_cents,
            Direction::Credit => entry.1 += posting.amount_cents,
        }
    }
    for (currency, (debits, credits)) in totals {
        if debits != credits {
            return Err(LedgerError::ZeroSumViolation {
                currency: currency.to_string(),
                debits,
                credits,
                postings_summary: postings
                    .iter()
                    .map(|p| p.posting_id.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
            });
        }
    }
    Ok(())
}

impl LedgerEntry {
    pub fn new(
        entry_id: LedgerEntryId,
        at: Timestamp,
        postings: Vec<Posting>,
    ) -> Result<Self, LedgerError> {
        validate_zero_sum(&postings)?;
        Ok(Self {
            entry_id,
            at,
            postings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(account: &str, direction: Direction, amount: i64) -> Posting {
        Posting {
            posting_id: format!("p_{account}_{amount}"),
            account_id: account.to_string(),
            direction,
            currency: Currency::usd(),
            amount_cents: amount,
            party_ref: None,
        }
    }

    #[test]
    fn balanced_entry_passes() {
        let postings = vec![
            posting("escrow:agent_1", Direction::Debit, 400),
            posting("wallet:payee:agent_2", Direction::Credit, 400),
        ];
        validate_zero_sum(&postings).unwrap();
    }

    #[test]
    fn unbalanced_entry_fails() {
        let postings = vec![
            posting("escrow:agent_1", Direction::Debit, 400),
            posting("wallet:payee:agent_2", Direction::Credit, 350),
        ];
        let err = validate_zero_sum(&postings).unwrap_err();
        assert!(matches!(err, LedgerError::ZeroSumViolation { .. }));
    }

    #[test]
    fn each_currency_balances_independently() {
        let postings = vec![
            posting("escrow:agent_1", Direction::Debit, 400),
            posting("wallet:payee:agent_2", Direction::Credit, 400),
            Posting {
                posting_id: "p_eur".to_string(),
                account_id: "escrow:agent_1".to_string(),
                direction: Direction::Debit,
                currency: Currency::new("eur"),
                amount_cents: 100,
                party_ref: None,
            },
        ];
        let err = validate_zero_sum(&postings).unwrap_err();
        match err {
            LedgerError::ZeroSumViolation { currency, .. } => assert_eq!(currency, "EUR"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
