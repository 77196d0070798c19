//! Accounting period management.
//!
//! Periods are tenant-scoped date ranges. Closing is one-way: there is no
//! transition from closed back to open.

pub mod calendar;
pub mod error;
pub mod types;

pub use calendar::{generate_monthly_periods, last_day_of_month};
pub use error::PeriodError;
pub use types::{
    AccountingPeriod, NewPeriod, closed_period_containing, date_ranges_overlap,
    find_period_for_date, validate_date_range, validate_new_period,
};
