//! Entity re-exports.

pub use super::accounting_periods::Entity as AccountingPeriods;
pub use super::accounts::Entity as Accounts;
pub use super::journal_lines::Entity as JournalLines;
pub use super::journals::Entity as Journals;
