//! Accounting period types and rules.

use chrono::{DateTime, NaiveDate, Utc};
use koperasi_shared::types::{PeriodId, TenantId, UserId};
use serde::{Deserialize, Serialize};

use super::error::PeriodError;

/// A tenant-scoped, inclusive date range that can be locked against posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingPeriod {
    /// Unique identifier.
    pub id: PeriodId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Display name (e.g., "Desember 2024").
    pub name: String,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Locked against postings.
    pub is_closed: bool,
    /// When the period was closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Who closed the period.
    pub closed_by: Option<UserId>,
}

impl AccountingPeriod {
    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Transitions the period from open to closed.
    pub fn close(&mut self, closed_by: UserId, at: DateTime<Utc>) -> Result<(), PeriodError> {
        if self.is_closed {
            return Err(PeriodError::AlreadyClosed(self.id));
        }
        self.is_closed = true;
        self.closed_at = Some(at);
        self.closed_by = Some(closed_by);
        Ok(())
    }
}

/// Request to create a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPeriod {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Display name.
    pub name: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
}

/// Validates that `start_date <= end_date`. Single-day periods are allowed.
pub fn validate_date_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), PeriodError> {
    if start_date > end_date {
        return Err(PeriodError::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }
    Ok(())
}

/// Checks if two inclusive date ranges overlap.
///
/// `[a_start, a_end]` and `[b_start, b_end]` overlap iff
/// `a_start <= b_end && a_end >= b_start`.
#[must_use]
pub fn date_ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Validates a new period against the tenant's existing periods and builds it open.
pub fn validate_new_period(
    input: &NewPeriod,
    existing: &[AccountingPeriod],
) -> Result<AccountingPeriod, PeriodError> {
    validate_date_range(input.start_date, input.end_date)?;

    if let Some(clash) = existing.iter().find(|p| {
        date_ranges_overlap(input.start_date, input.end_date, p.start_date, p.end_date)
    }) {
        return Err(PeriodError::Overlapping(clash.name.clone()));
    }

    Ok(AccountingPeriod {
        id: PeriodId::new(),
        tenant_id: input.tenant_id,
        name: input.name.clone(),
        start_date: input.start_date,
        end_date: input.end_date,
        is_closed: false,
        closed_at: None,
        closed_by: None,
    })
}

/// Returns the period containing `date`, if any.
#[must_use]
pub fn find_period_for_date(
    periods: &[AccountingPeriod],
    date: NaiveDate,
) -> Option<&AccountingPeriod> {
    periods.iter().find(|p| p.contains_date(date))
}

/// Returns the closed period containing `date`, if any.
///
/// Dates outside every period are postable.
#[must_use]
pub fn closed_period_containing(
    periods: &[AccountingPeriod],
    date: NaiveDate,
) -> Option<&AccountingPeriod> {
    periods.iter().find(|p| p.is_closed && p.contains_date(date))
}
