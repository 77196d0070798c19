//! `SeaORM` entity definitions for the ledger tables.

pub mod prelude;

pub mod accounting_periods;
pub mod accounts;
pub mod journal_lines;
pub mod journals;
pub mod sea_orm_active_enums;
