//! `computePartyStatement` (spec §4.6): "sums postings whose `at` falls in
//! `[periodStart, periodEnd)` under the chosen basis (`settledAt`
//! initially), producing `PartyStatement.v1` with `payoutCents` and
//! `statementHash`."

use serde::{Deserialize, Serialize};
use settld_codec::sha256_hex_of_canon;
use settld_types::{money::Direction, Cents, Currency, PartyId, TenantId, Timestamp};

use crate::error::LedgerError;
use crate::posting::{LedgerEntry, PartyRef};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementBasis {
    SettledAt,
}

/// The `PartyStatement.v1` artifact core (spec §3 "Artifact": "`artifactHash
/// = SHA256(canon(artifactCore))`"). `statement_hash` is computed over this
/// struct by [`compute_party_statement`] and is NOT a field of the struct
/// itself — the same "hash the core, store the hash beside it" split the
/// x402 wallet token and event chain hash both use.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PartyStatementCore {
    pub tenant_id: TenantId,
    pub party_id: PartyId,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
    pub basis: StatementBasis,
    pub currency: Currency,
    pub payout_cents: Cents,
    pub posting_count: u64,
}

pub struct PartyStatement {
    pub core: PartyStatementCore,
    pub statement_hash: String,
}

/// Sums every posting attributed to `party_id` whose `entry.at` falls in
/// `[period_start, period_end)`, crediting payouts and debiting deductions
/// (spec §4.6). Only entries whose postings carry a [`PartyRef`] matching
/// `party_id` contribute.
pub fn compute_party_statement(
    tenant_id: TenantId,
    party_id: PartyId,
    period_start: Timestamp,
    period_end: Timestamp,
    basis: StatementBasis,
    currency: Currency,
    entries: &[LedgerEntry],
) -> Result<PartyStatement, LedgerError> {
    if period_end <= period_start {
        return Err(LedgerError::InvalidPeriod {
            period_start: period_start.to_rfc3339(),
            period_end: period_end.to_rfc3339(),
        });
    }

    let mut payout_cents: Cents = 0;
    let mut posting_count: u64 = 0;
    for entry in entries {
        if !entry.at.in_half_open_range(&period_start, &period_end) {
            continue;
        }
        for posting in &entry.postings {
            let matches_party = matches!(
                &posting.party_ref,
                Some(PartyRef { party_id: p, .. }) if *p == party_id
            );
            if !matches_party || posting.currency != currency {
                continue;
            }
            posting_count += 1;
            match posting.direction {
                Direction::Credit => payout_cents += posting.amount_cents,
                Direction::Debit => payout_cents -= posting.amount_cents,
            }
        }
    }

    let core = PartyStatementCore {
        tenant_id,
        party_id,
        period_start,
        period_end,
        basis,
        currency,
        payout_cents,
        posting_count,
    };
    let statement_hash = sha256_hex_of_canon(&core)?;
    Ok(PartyStatement {
        core,
        statement_hash,
    })
}
