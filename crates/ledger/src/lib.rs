//! Double-entry ledger: postings, escrow holds, party statements, and
//! month-close (spec §2 C6, §4.6).

pub mod config;
pub mod error;
pub mod hold;
pub mod month_close;
pub mod operations;
pub mod posting;
pub mod statement;

pub use config::LedgerConfig;
pub use error::LedgerError;
pub use hold::{escrow_locked_cents, HoldRecord, HoldState};
pub use month_close::{MonthCloseReducer, MonthCloseSnapshot, MonthCloseState};
pub use operations::{refund_hold, release_hold};
pub use posting::{
    account_escrow, account_fees, account_payee_wallet, account_payer_wallet,
    account_provider_suspense, account_sla_credit_liability, account_tax, validate_zero_sum,
    LedgerEntry, PartyRef, Posting,
};
pub use statement::{compute_party_statement, PartyStatement, PartyStatementCore, StatementBasis};
