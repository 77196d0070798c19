//! Repository abstractions for data access.
//!
//! Every operation opens its own tenant-scoped transaction
//! ([`crate::rls::RlsConnection`]).

pub mod account;
pub mod journal;
pub mod period;
pub mod report;

pub use account::{AccountRepoError, AccountRepository};
pub use journal::{JournalFilter, JournalRepository};
pub use period::{PeriodRepoError, PeriodRepository};
pub use report::{AccountLedger, ReportError, ReportRepository};

use sea_orm::{DbErr, SqlErr};

/// True if `err` is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
