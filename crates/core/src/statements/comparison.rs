//! Full statement sets and multi-period comparison.

use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rules::ClassificationRules;
use super::service::{StatementService, period_movements};
use super::types::FinancialStatements;
use crate::ledger::AccountBalance;

impl FinancialStatements {
    /// Generates all five statements for one period.
    ///
    /// `opening` is the balance set at the start of the period (empty for
    /// "since inception") and `closing` the set at its end.
    #[must_use]
    pub fn generate(
        opening: &[AccountBalance],
        closing: &[AccountBalance],
        beginning_cash: Option<Decimal>,
        rules: &ClassificationRules,
    ) -> Self {
        let balance_sheet = StatementService::classify_balance_sheet(closing, rules);
        let cash_flow = StatementService::classify_cash_flow(opening, closing, beginning_cash, rules);
        let equity_changes = StatementService::classify_equity_changes(opening, closing, rules);
        let income_statement = StatementService::classify_income_statement(
            &period_movements(opening, closing),
            rules,
        );
        let ratios = StatementService::calculate_financial_ratios(
            &balance_sheet,
            &income_statement,
            &cash_flow,
            &equity_changes,
        );

        Self {
            balance_sheet,
            income_statement,
            cash_flow,
            equity_changes,
            ratios,
        }
    }
}

/// Balances bracketing one period of a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodSnapshot {
    /// Label shown in the comparison (e.g. "2024", "Q1 2025").
    pub label: String,
    /// Balances at the start of the period.
    pub opening: Vec<AccountBalance>,
    /// Balances at the end of the period.
    pub closing: Vec<AccountBalance>,
    /// Assumed cash at the start of the period.
    #[serde(default)]
    pub beginning_cash: Option<Decimal>,
}

/// Statements of one labelled period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodStatements {
    /// Period label.
    pub label: String,
    /// Generated statements.
    pub statements: FinancialStatements,
}

/// Generates statements for several periods in parallel, preserving input
/// order.
#[must_use]
pub fn compare_periods(
    snapshots: &[PeriodSnapshot],
    rules: &ClassificationRules,
) -> Vec<PeriodStatements> {
    snapshots
        .par_iter()
        .map(|snapshot| PeriodStatements {
            label: snapshot.label.clone(),
            statements: FinancialStatements::generate(
                &snapshot.opening,
                &snapshot.closing,
                snapshot.beginning_cash,
                rules,
            ),
        })
        .collect()
}
