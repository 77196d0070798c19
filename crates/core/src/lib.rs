//! Core ledger logic for the Koperasi platform.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `coa` - Chart of accounts: types, validation, the default cooperative chart
//! - `ledger` - Journal posting rules, reversals and balance aggregation
//! - `period` - Accounting periods and the one-way close
//! - `statements` - Balance sheet, income statement, cash flow, equity changes, ratios

pub mod coa;
pub mod ledger;
pub mod period;
pub mod statements;
