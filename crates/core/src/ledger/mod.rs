//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Posting validation for the single journal write path
//! - Reversing journals as the only correction mechanism
//! - Balance aggregation, trial balance and account ledgers
//! - Error types for ledger operations

pub mod balance;
pub mod error;
pub mod reversal;
pub mod service;
pub mod types;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod service_props;

pub use balance::{
    AccountBalance, AccountLedgerRow, BalanceEntry, LedgerMovement, TrialBalance, TrialBalanceRow,
    account_ledger, calculate_account_balances, entries_from_lines, roll_up_headers, trial_balance,
};
pub use error::{LedgerError, UnknownAccountReason};
pub use reversal::ReversalService;
pub use service::{AccountInfo, PostingService};
pub use types::{
    Journal, JournalLine, JournalLineInput, JournalTotals, MAX_LINE_AMOUNT, PostJournalInput,
    PostingReceipt, REVERSAL_REFERENCE_TYPE, ValidatedJournal, ValidatedLine,
};
