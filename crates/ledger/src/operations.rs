//! `releaseHold`/`refundHold` (spec §4.6): "`releaseHold(holdId,
//! amountCents)` decrements locked escrow, credits the payee wallet, and
//! writes a `LedgerEntry` with both sides; `refundHold` symmetrically
//! credits the payer's available balance."

use settld_types::{AgentId, Cents, LedgerEntryId, Timestamp};

use crate::error::LedgerError;
use crate::hold::HoldRecord;
use crate::posting::{account_escrow, account_payer_wallet, account_payee_wallet, LedgerEntry, Posting};
use settld_types::money::Direction;

/// Settles a hold per the x402 release matrix's `(released, refunded)` pair
/// (spec §4.5 "Release matrix", §4.6). `released_cents + refunded_cents`
/// must equal the hold's full `amount_cents` — a hold always settles in
/// full; there is no notion of a partially-settled hold left active.
pub fn release_hold(
    hold: &HoldRecord,
    entry_id: LedgerEntryId,
    at: Timestamp,
    payee_agent_id: &AgentId,
    released_cents: Cents,
    refunded_cents: Cents,
) -> Result<(HoldRecord, LedgerEntry), LedgerError> {
    let next_hold = hold.release(released_cents + refunded_cents)?;

    let mut postings = Vec::new();
    let total = released_cents + refunded_cents;
    if total > 0 {
        postings.push(Posting {
            posting_id: format!("{}-escrow-debit", hold.hold_id),
            account_id: account_escrow(hold.agent_id.as_str()),
            direction: Direction::Debit,
            currency: hold.currency.clone(),
            amount_cents: total,
            party_ref: None,
        });
    }
    if released_cents > 0 {
        postings.push(Posting {
            posting_id: format!("{}-payee-credit", hold.hold_id),
            account_id: account_payee_wallet(payee_agent_id.as_str()),
            direction: Direction::Credit,
            currency: hold.currency.clone(),
            amount_cents: released_cents,
            party_ref: None,
        });
    }
    if refunded_cents > 0 {
        postings.push(Posting {
            posting_id: format!("{}-payer-credit", hold.hold_id),
            account_id: account_payer_wallet(hold.agent_id.as_str()),
            direction: Direction::Credit,
            currency: hold.currency.clone(),
            amount_cents: refunded_cents,
            party_ref: None,
        });
    }

    let entry = LedgerEntry::new(entry_id, at, postings)?;
    Ok((next_hold, entry))
}

/// A hold refunded in full before settlement (e.g. a canceled gate),
/// crediting the payer's available balance for the whole amount.
pub fn refund_hold(
    hold: &HoldRecord,
    entry_id: LedgerEntryId,
    at: Timestamp,
) -> Result<(HoldRecord, LedgerEntry), LedgerError> {
    let next_hold = hold.refund()?;
    let postings = vec![
        Posting {
            posting_id: format!("{}-escrow-debit", hold.hold_id),
            account_id: account_escrow(hold.agent_id.as_str()),
            direction: Direction::Debit,
            currency: hold.currency.clone(),
            amount_cents: hold.amount_cents,
            party_ref: None,
        },
        Posting {
            posting_id: format!("{}-payer-credit", hold.hold_id),
            account_id: account_payer_wallet(hold.agent_id.as_str()),
            direction: Direction::Credit,
            currency: hold.currency.clone(),
            amount_cents: hold.amount_cents,
            party_ref: None,
        },
    ];
    let entry = LedgerEntry::new(entry_id, at, postings)?;
    Ok((next_hold, entry))
}
