//! Period manager errors.

use chrono::NaiveDate;
use koperasi_shared::types::PeriodId;
use thiserror::Error;

/// Errors raised by period creation and closing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// Start date is after end date.
    #[error("Period start {start} is after end {end}")]
    InvalidDateRange {
        /// Requested start.
        start: NaiveDate,
        /// Requested end.
        end: NaiveDate,
    },

    /// Range overlaps an existing period of the tenant.
    #[error("Period overlaps existing period {0}")]
    Overlapping(String),

    /// Period unknown to the tenant.
    #[error("Period not found: {0}")]
    NotFound(PeriodId),

    /// Period has already been closed.
    #[error("Period {0} is already closed")]
    AlreadyClosed(PeriodId),
}

impl PeriodError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::Overlapping(_) => "PERIOD_OVERLAP",
            Self::NotFound(_) => "PERIOD_NOT_FOUND",
            Self::AlreadyClosed(_) => "PERIOD_ALREADY_CLOSED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidDateRange { .. } => 400,
            Self::Overlapping(_) | Self::AlreadyClosed(_) => 409,
            Self::NotFound(_) => 404,
        }
    }
}
