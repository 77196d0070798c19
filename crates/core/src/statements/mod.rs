//! Financial statement classification.
//!
//! Turns account balances into the balance sheet, income statement, cash
//! flow, statement of changes in equity and financial ratios. Grouping is
//! driven by a [`ClassificationRules`] table instead of hard-coded code
//! ranges.

pub mod comparison;
pub mod rules;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use comparison::{PeriodSnapshot, PeriodStatements, compare_periods};
pub use rules::{Bucket, ClassificationRule, ClassificationRules, RuleError};
pub use service::{RATIO_SCALE, StatementService, safe_ratio};
pub use types::{
    AssetSection, BalanceSheet, CashFlowItem, CashFlowSection, CashFlowStatement, EquityChanges,
    EquityComponent, EquityComponentKind, EquitySection, FinancialRatios, FinancialStatements,
    IncomeStatement, LiabilitySection, LiquidityRatios, ProfitabilityRatios, SolvencyRatios,
    StatementLine, StatementSection,
};
