//! Financial statement types.

use koperasi_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rules::Bucket;

/// One account shown on a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    /// The account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Bucket the account was classified into.
    pub bucket: Bucket,
    /// Amount, positive on the section's natural side.
    pub amount: Decimal,
}

/// A group of statement lines with their total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementSection {
    /// Lines sorted by account code.
    pub lines: Vec<StatementLine>,
    /// Sum of line amounts.
    pub total: Decimal,
}

impl StatementSection {
    /// Adds a line and its amount to the total.
    pub fn push(&mut self, line: StatementLine) {
        self.total += line.amount;
        self.lines.push(line);
    }

    /// Sorts lines by code.
    pub(crate) fn sort(&mut self) {
        self.lines.sort_by(|a, b| a.code.cmp(&b.code));
    }

    /// Total of lines in one bucket.
    #[must_use]
    pub fn bucket_total(&self, bucket: Bucket) -> Decimal {
        self.lines
            .iter()
            .filter(|l| l.bucket == bucket)
            .map(|l| l.amount)
            .sum()
    }
}

/// Asset side of the balance sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSection {
    /// Cash, receivables and other current assets.
    pub current: StatementSection,
    /// Fixed and other non-current assets.
    pub non_current: StatementSection,
    /// Total assets.
    pub total: Decimal,
}

/// Liabilities on the balance sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiabilitySection {
    /// Due within a year.
    pub current: StatementSection,
    /// Due after a year.
    pub long_term: StatementSection,
    /// Total liabilities.
    pub total: Decimal,
}

/// Equity on the balance sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquitySection {
    /// Member capital.
    pub paid_in_capital: StatementSection,
    /// Reserves and retained surplus.
    pub retained_earnings: StatementSection,
    /// Current-year earning (SHU berjalan): revenue minus expense of the
    /// same balance set, not yet closed into retained earnings.
    pub current_earnings: Decimal,
    /// Total equity including current earnings.
    pub total: Decimal,
}

/// Balance sheet (neraca).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    /// Assets.
    pub assets: AssetSection,
    /// Liabilities.
    pub liabilities: LiabilitySection,
    /// Equity.
    pub equity: EquitySection,
    /// Liabilities plus equity.
    pub total_liabilities_and_equity: Decimal,
    /// Total assets minus liabilities and equity; non-zero means the ledger
    /// or the classification is inconsistent.
    pub difference: Decimal,
    /// Whether `difference` is zero.
    pub is_balanced: bool,
}

/// Income statement (laporan SHU).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeStatement {
    /// Revenue from core business.
    pub operating_revenue: StatementSection,
    /// Expenses of core business.
    pub operating_expense: StatementSection,
    /// Operating revenue minus operating expense.
    pub operating_profit: Decimal,
    /// Non-operating revenue.
    pub other_revenue: StatementSection,
    /// Non-operating expenses.
    pub other_expense: StatementSection,
    /// All revenue.
    pub total_revenue: Decimal,
    /// All expense.
    pub total_expense: Decimal,
    /// Operating profit plus other revenue minus other expense.
    pub net_profit: Decimal,
}

/// One adjustment in a cash flow section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowItem {
    /// The account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Bucket of the account.
    pub bucket: Bucket,
    /// Change of the account's balance on its normal side.
    pub change: Decimal,
    /// Effect on cash: negative for an asset increase, positive for a
    /// liability or equity increase.
    pub cash_effect: Decimal,
}

/// One activity of the cash flow statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowSection {
    /// Adjustments sorted by code.
    pub items: Vec<CashFlowItem>,
    /// Net cash from this activity.
    pub total: Decimal,
}

/// Cash flow statement, indirect method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowStatement {
    /// Net profit of the period, the starting point of operating cash flow.
    pub net_profit: Decimal,
    /// Operating activities; `total` includes `net_profit`.
    pub operating: CashFlowSection,
    /// Investing activities.
    pub investing: CashFlowSection,
    /// Financing activities.
    pub financing: CashFlowSection,
    /// Operating plus investing plus financing.
    pub net_change_in_cash: Decimal,
    /// Assumed cash at the start of the period.
    pub beginning_cash: Decimal,
    /// Beginning cash plus net change.
    pub ending_cash: Decimal,
    /// Balance of the cash accounts at the end of the period.
    pub actual_ending_cash: Decimal,
    /// Actual minus computed ending cash.
    pub discrepancy: Decimal,
    /// Whether `discrepancy` is zero.
    pub is_reconciled: bool,
}

/// Kind of equity roll-forward component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquityComponentKind {
    /// Member capital.
    PaidInCapital,
    /// Reserves and retained surplus.
    RetainedEarnings,
    /// Unclosed revenue minus expense.
    CurrentEarnings,
}

/// Beginning-to-ending movement of one equity component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityComponent {
    /// Component.
    pub kind: EquityComponentKind,
    /// Balance at the start of the period.
    pub beginning: Decimal,
    /// Movement during the period.
    pub change: Decimal,
    /// Balance at the end of the period.
    pub ending: Decimal,
}

/// Statement of changes in equity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityChanges {
    /// Paid-in capital, retained earnings, current earnings, in that order.
    pub components: Vec<EquityComponent>,
    /// Total equity at the start of the period.
    pub beginning_equity: Decimal,
    /// Total change.
    pub total_change: Decimal,
    /// Total equity at the end of the period.
    pub ending_equity: Decimal,
}

impl EquityChanges {
    /// Looks up one component.
    #[must_use]
    pub fn component(&self, kind: EquityComponentKind) -> Option<&EquityComponent> {
        self.components.iter().find(|c| c.kind == kind)
    }
}

/// Liquidity ratios.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityRatios {
    /// Current assets / current liabilities.
    pub current_ratio: Decimal,
    /// Cash / current liabilities.
    pub cash_ratio: Decimal,
    /// Operating cash flow / current liabilities.
    pub operating_cash_flow_ratio: Decimal,
}

/// Solvency ratios.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvencyRatios {
    /// Total liabilities / total equity.
    pub debt_to_equity_ratio: Decimal,
    /// Total liabilities / total assets.
    pub debt_to_asset_ratio: Decimal,
}

/// Profitability ratios.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitabilityRatios {
    /// Net profit / total revenue.
    pub net_profit_margin: Decimal,
    /// Operating profit / operating revenue.
    pub operating_margin: Decimal,
    /// Net profit / total assets.
    pub return_on_assets: Decimal,
    /// Net profit / total equity.
    pub return_on_equity: Decimal,
}

/// Financial ratios; every ratio with a zero denominator is zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRatios {
    /// Liquidity.
    pub liquidity: LiquidityRatios,
    /// Solvency.
    pub solvency: SolvencyRatios,
    /// Profitability.
    pub profitability: ProfitabilityRatios,
    /// Equity change / beginning equity.
    pub equity_growth: Decimal,
}

/// All five statements for one period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialStatements {
    /// Balance sheet at the end of the period.
    pub balance_sheet: BalanceSheet,
    /// Income statement of the period's activity.
    pub income_statement: IncomeStatement,
    /// Cash flow of the period.
    pub cash_flow: CashFlowStatement,
    /// Equity roll-forward of the period.
    pub equity_changes: EquityChanges,
    /// Ratios derived from the four statements.
    pub ratios: FinancialRatios,
}
