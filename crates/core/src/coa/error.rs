//! Chart of accounts errors.

use thiserror::Error;

use super::types::{AccountType, NormalBalance};

/// Errors raised when extending a tenant's chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoaError {
    /// Code or name is blank.
    #[error("Account {0} must not be empty")]
    MissingField(&'static str),

    /// Another account of the tenant already uses the code.
    #[error("Account code {0} already exists")]
    DuplicateCode(String),

    /// Explicit normal balance contradicts the account type.
    #[error("Account type {account_type} requires normal balance {expected}, got {given}")]
    NormalBalanceMismatch {
        /// Requested type.
        account_type: AccountType,
        /// Balance implied by the type.
        expected: NormalBalance,
        /// Balance supplied by the caller.
        given: NormalBalance,
    },

    /// Parent code does not exist in the tenant's chart.
    #[error("Parent account {0} not found")]
    ParentNotFound(String),

    /// Parent exists but is not a header account.
    #[error("Parent account {0} is not a header account")]
    ParentNotHeader(String),

    /// Parent belongs to a different account class.
    #[error("Parent account {parent_code} is {parent_type}, child is {child_type}")]
    ParentTypeMismatch {
        /// Parent code.
        parent_code: String,
        /// Parent's type.
        parent_type: AccountType,
        /// Requested child type.
        child_type: AccountType,
    },

    /// Child code is not nested under the parent code.
    #[error("Account code {code} does not start with parent code {parent_code}")]
    CodeOutsideParent {
        /// Requested code.
        code: String,
        /// Parent code.
        parent_code: String,
    },

    /// Account id unknown to the tenant.
    #[error("Account not found: {0}")]
    NotFound(String),
}

impl CoaError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::DuplicateCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::NormalBalanceMismatch { .. } => "NORMAL_BALANCE_MISMATCH",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::ParentNotHeader(_) => "PARENT_NOT_HEADER",
            Self::ParentTypeMismatch { .. } => "PARENT_TYPE_MISMATCH",
            Self::CodeOutsideParent { .. } => "CODE_OUTSIDE_PARENT",
            Self::NotFound(_) => "ACCOUNT_NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::DuplicateCode(_) => 409,
            Self::NotFound(_) => 404,
            _ => 400,
        }
    }
}
