//! Fiscal-year calendar helpers.

use chrono::{Datelike, NaiveDate};
use koperasi_shared::types::TenantId;

use super::error::PeriodError;
use super::types::{NewPeriod, validate_date_range};

const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Returns the last day of a month, or `None` for an out-of-range month.
#[must_use]
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }?;
    first_of_next.pred_opt()
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
}

/// Splits `[start_date, end_date]` into calendar-month periods.
///
/// The first and last periods are truncated to the range, so a fiscal year
/// starting mid-month yields a short first period.
pub fn generate_monthly_periods(
    tenant_id: TenantId,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<NewPeriod>, PeriodError> {
    validate_date_range(start_date, end_date)?;
    let invalid = || PeriodError::InvalidDateRange {
        start: start_date,
        end: end_date,
    };

    let mut periods = Vec::new();
    let mut current = start_date;
    while current <= end_date {
        let month_end = last_day_of_month(current.year(), current.month()).ok_or_else(invalid)?;
        let period_end = month_end.min(end_date);
        let month_name = MONTH_NAMES[current.month0() as usize];

        periods.push(NewPeriod {
            tenant_id,
            name: format!("{month_name} {}", current.year()),
            start_date: current,
            end_date: period_end,
        });

        current = first_of_next_month(current).ok_or_else(invalid)?;
    }
    Ok(periods)
}
