//! Ledger error types for posting and journal lookup.

use std::fmt;

use chrono::NaiveDate;
use koperasi_shared::types::{AccountId, JournalId, PeriodId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::MAX_LINE_AMOUNT;

/// Why an account reference was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownAccountReason {
    /// No such account for the tenant.
    NotFound,
    /// Account belongs to another tenant.
    OtherTenant,
    /// Account has been deactivated.
    Inactive,
    /// Account is an aggregation header.
    Header,
}

impl fmt::Display for UnknownAccountReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "not found",
            Self::OtherTenant => "belongs to another tenant",
            Self::Inactive => "is inactive",
            Self::Header => "is a header account",
        })
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Journal has no lines.
    #[error("Journal must have at least one line")]
    EmptyJournal,

    /// A line carries a negative amount.
    #[error("Line for account {account_id} has a negative amount")]
    NegativeAmount {
        /// Offending line's account.
        account_id: AccountId,
    },

    /// Bad, inactive, header or foreign account reference.
    #[error("Account {account_id} {reason}")]
    UnknownAccount {
        /// Referenced account.
        account_id: AccountId,
        /// Rejection cause.
        reason: UnknownAccountReason,
    },

    /// A line amount, or a journal total, is larger than the ledger stores.
    #[error("Amount out of range: line amounts must be below {max}", max = MAX_LINE_AMOUNT)]
    AmountOutOfRange {
        /// Offending line's account; `None` when a total overflowed.
        account_id: Option<AccountId>,
    },

    /// Debits and credits differ.
    #[error("Journal is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// Total debit.
        debit: Decimal,
        /// Total credit.
        credit: Decimal,
    },

    // ========== Period Errors ==========
    /// Transaction date falls inside a closed period.
    #[error("Transaction date {date} falls in closed period {period_id}")]
    PeriodClosed {
        /// Requested transaction date.
        date: NaiveDate,
        /// The closed period.
        period_id: PeriodId,
    },

    // ========== Lookup Errors ==========
    /// Journal unknown to the tenant.
    #[error("Journal not found: {0}")]
    JournalNotFound(JournalId),

    // ========== Storage Errors ==========
    /// Transient store failure. Nothing was written.
    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyJournal => "EMPTY_JOURNAL",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
            Self::UnknownAccount { .. } => "UNKNOWN_ACCOUNT",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::PeriodClosed { .. } => "PERIOD_CLOSED",
            Self::JournalNotFound(_) => "JOURNAL_NOT_FOUND",
            Self::StorageFailure(_) => "STORAGE_FAILURE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - caller-fixable input
            Self::EmptyJournal | Self::NegativeAmount { .. } | Self::AmountOutOfRange { .. } => 400,

            // 422 Unprocessable - well-formed but violates a ledger rule
            Self::UnknownAccount { .. } | Self::UnbalancedEntry { .. } => 422,

            // 409 Conflict - locked period
            Self::PeriodClosed { .. } => 409,

            // 404 Not Found
            Self::JournalNotFound(_) => 404,

            // 503 Service Unavailable - retry with the same reference id
            Self::StorageFailure(_) => 503,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageFailure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::EmptyJournal.error_code(), "EMPTY_JOURNAL");
        assert_eq!(
            LedgerError::UnbalancedEntry {
                debit: dec!(1000),
                credit: dec!(500),
            }
            .error_code(),
            "UNBALANCED_ENTRY"
        );
        assert_eq!(
            LedgerError::PeriodClosed {
                date: NaiveDate::from_ymd_opt(2024, 12, 15).unwrap(),
                period_id: PeriodId::new(),
            }
            .error_code(),
            "PERIOD_CLOSED"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::EmptyJournal.http_status_code(), 400);
        assert_eq!(
            LedgerError::UnknownAccount {
                account_id: AccountId::new(),
                reason: UnknownAccountReason::Header,
            }
            .http_status_code(),
            422
        );
        assert_eq!(
            LedgerError::JournalNotFound(JournalId::new()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::StorageFailure("pool".into()).http_status_code(),
            503
        );
    }

    #[test]
    fn test_amount_out_of_range_is_caller_fixable() {
        let err = LedgerError::AmountOutOfRange {
            account_id: Some(AccountId::new()),
        };
        assert_eq!(err.error_code(), "AMOUNT_OUT_OF_RANGE");
        assert_eq!(err.http_status_code(), 400);
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Amount out of range: line amounts must be below 1000000000000000"
        );
    }

    #[test]
    fn test_only_storage_failures_are_retryable() {
        assert!(LedgerError::StorageFailure("timeout".into()).is_retryable());
        assert!(!LedgerError::EmptyJournal.is_retryable());
        assert!(
            !LedgerError::UnbalancedEntry {
                debit: dec!(1),
                credit: dec!(2),
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::UnbalancedEntry {
            debit: dec!(1000.00),
            credit: dec!(500.00),
        };
        assert_eq!(
            err.to_string(),
            "Journal is not balanced. Debit: 1000.00, Credit: 500.00"
        );

        let account_id = AccountId::new();
        let err = LedgerError::UnknownAccount {
            account_id,
            reason: UnknownAccountReason::Inactive,
        };
        assert_eq!(err.to_string(), format!("Account {account_id} is inactive"));
    }
}
