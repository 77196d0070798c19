//! Statement classifier.
//!
//! Five stateless transforms from account balances to reports. Each is
//! deterministic in its inputs and safe to call concurrently. Header
//! accounts are skipped; their amounts are carried by their descendants.

use std::collections::HashMap;

use koperasi_shared::types::AccountId;
use rust_decimal::{Decimal, RoundingStrategy};

use super::rules::{Bucket, ClassificationRules};
use super::types::{
    BalanceSheet, CashFlowItem, CashFlowSection, CashFlowStatement, EquityChanges,
    EquityComponent, EquityComponentKind, FinancialRatios, IncomeStatement, LiquidityRatios,
    ProfitabilityRatios, SolvencyRatios, StatementLine, StatementSection,
};
use crate::coa::AccountType;
use crate::ledger::AccountBalance;

/// Decimal places of every ratio.
pub const RATIO_SCALE: u32 = 4;

/// Service for classifying balances into financial statements.
pub struct StatementService;

impl StatementService {
    /// Classifies a balance set into a balance sheet.
    ///
    /// Assets are summed on the debit side, liabilities and equity on the
    /// credit side. Revenue minus expense of the same set is injected into
    /// equity as current earnings. Any residual difference is reported in
    /// `difference`, never absorbed.
    #[must_use]
    pub fn classify_balance_sheet(
        balances: &[AccountBalance],
        rules: &ClassificationRules,
    ) -> BalanceSheet {
        let mut sheet = BalanceSheet::default();

        for balance in postable(balances) {
            let bucket = rules.classify(&balance.code, balance.account_type);
            match balance.account_type {
                AccountType::Asset => {
                    let line = statement_line(balance, bucket, balance.debit_side());
                    if bucket.is_current_asset() {
                        sheet.assets.current.push(line);
                    } else {
                        sheet.assets.non_current.push(line);
                    }
                }
                AccountType::Liability => {
                    let line = statement_line(balance, bucket, balance.credit_side());
                    if bucket == Bucket::CurrentLiability {
                        sheet.liabilities.current.push(line);
                    } else {
                        sheet.liabilities.long_term.push(line);
                    }
                }
                AccountType::Equity => {
                    let line = statement_line(balance, bucket, balance.credit_side());
                    if bucket == Bucket::PaidInCapital {
                        sheet.equity.paid_in_capital.push(line);
                    } else {
                        sheet.equity.retained_earnings.push(line);
                    }
                }
                AccountType::Revenue | AccountType::Expense => {}
            }
        }

        for section in [
            &mut sheet.assets.current,
            &mut sheet.assets.non_current,
            &mut sheet.liabilities.current,
            &mut sheet.liabilities.long_term,
            &mut sheet.equity.paid_in_capital,
            &mut sheet.equity.retained_earnings,
        ] {
            section.sort();
        }

        sheet.assets.total = sheet.assets.current.total + sheet.assets.non_current.total;
        sheet.liabilities.total =
            sheet.liabilities.current.total + sheet.liabilities.long_term.total;
        sheet.equity.current_earnings = Self::classify_income_statement(balances, rules).net_profit;
        sheet.equity.total = sheet.equity.paid_in_capital.total
            + sheet.equity.retained_earnings.total
            + sheet.equity.current_earnings;
        sheet.total_liabilities_and_equity = sheet.liabilities.total + sheet.equity.total;
        sheet.difference = sheet.assets.total - sheet.total_liabilities_and_equity;
        sheet.is_balanced = sheet.difference.is_zero();
        sheet
    }

    /// Classifies a balance set into an income statement.
    ///
    /// `operating_profit = operating revenue - operating expense` and
    /// `net_profit = operating_profit + other revenue - other expense`.
    #[must_use]
    pub fn classify_income_statement(
        balances: &[AccountBalance],
        rules: &ClassificationRules,
    ) -> IncomeStatement {
        let mut statement = IncomeStatement::default();

        for balance in postable(balances) {
            let bucket = rules.classify(&balance.code, balance.account_type);
            match bucket {
                Bucket::OperatingRevenue => statement
                    .operating_revenue
                    .push(statement_line(balance, bucket, balance.credit_side())),
                Bucket::OtherRevenue => statement
                    .other_revenue
                    .push(statement_line(balance, bucket, balance.credit_side())),
                Bucket::OperatingExpense => statement
                    .operating_expense
                    .push(statement_line(balance, bucket, balance.debit_side())),
                Bucket::OtherExpense => statement
                    .other_expense
                    .push(statement_line(balance, bucket, balance.debit_side())),
                _ => {}
            }
        }

        for section in [
            &mut statement.operating_revenue,
            &mut statement.operating_expense,
            &mut statement.other_revenue,
            &mut statement.other_expense,
        ] {
            section.sort();
        }

        statement.operating_profit =
            statement.operating_revenue.total - statement.operating_expense.total;
        statement.total_revenue = statement.operating_revenue.total + statement.other_revenue.total;
        statement.total_expense = statement.operating_expense.total + statement.other_expense.total;
        statement.net_profit = statement.operating_profit + statement.other_revenue.total
            - statement.other_expense.total;
        statement
    }

    /// Builds a cash flow statement (indirect method) from the balances at
    /// the start and end of a period.
    ///
    /// The period's activity is `closing - opening` per account; an empty
    /// `opening` means "since inception". Net profit of that activity is
    /// adjusted by the change in receivables and other current assets
    /// (subtracted) and in current liabilities (added) for operating cash
    /// flow. Investing flow is the negated change in non-current assets,
    /// financing flow the change in long-term liabilities and equity.
    ///
    /// `beginning_cash` defaults to the opening balance of the cash
    /// accounts. The computed ending cash is reconciled against the actual
    /// closing cash balance and any gap is reported as `discrepancy`.
    #[must_use]
    pub fn classify_cash_flow(
        opening: &[AccountBalance],
        closing: &[AccountBalance],
        beginning_cash: Option<Decimal>,
        rules: &ClassificationRules,
    ) -> CashFlowStatement {
        let movements = period_movements(opening, closing);
        let net_profit = Self::classify_income_statement(&movements, rules).net_profit;

        let mut operating = CashFlowSection::default();
        let mut investing = CashFlowSection::default();
        let mut financing = CashFlowSection::default();

        for movement in postable(&movements) {
            let bucket = rules.classify(&movement.code, movement.account_type);
            let (section, cash_effect) = match bucket {
                Bucket::Receivable | Bucket::OtherCurrentAsset => {
                    (&mut operating, -movement.debit_side())
                }
                Bucket::CurrentLiability => (&mut operating, movement.credit_side()),
                Bucket::NonCurrentAsset => (&mut investing, -movement.debit_side()),
                Bucket::LongTermLiability | Bucket::PaidInCapital | Bucket::RetainedEarnings => {
                    (&mut financing, movement.credit_side())
                }
                _ => continue,
            };
            if movement.balance.is_zero() {
                continue;
            }
            section.total += cash_effect;
            section.items.push(CashFlowItem {
                account_id: movement.account_id,
                code: movement.code.clone(),
                name: movement.name.clone(),
                bucket,
                change: movement.balance,
                cash_effect,
            });
        }

        for section in [&mut operating, &mut investing, &mut financing] {
            section.items.sort_by(|a, b| a.code.cmp(&b.code));
        }
        operating.total += net_profit;

        let opening_cash = cash_total(opening, rules);
        let actual_ending_cash = cash_total(closing, rules);
        let beginning_cash = beginning_cash.unwrap_or(opening_cash);
        let net_change_in_cash = operating.total + investing.total + financing.total;
        let ending_cash = beginning_cash + net_change_in_cash;
        let discrepancy = actual_ending_cash - ending_cash;

        CashFlowStatement {
            net_profit,
            operating,
            investing,
            financing,
            net_change_in_cash,
            beginning_cash,
            ending_cash,
            actual_ending_cash,
            discrepancy,
            is_reconciled: discrepancy.is_zero(),
        }
    }

    /// Builds the beginning-to-ending equity roll-forward.
    ///
    /// Paid-in capital and retained earnings come from the equity accounts;
    /// current earnings is revenue minus expense at each end, so its change
    /// equals the period's net profit.
    #[must_use]
    pub fn classify_equity_changes(
        opening: &[AccountBalance],
        closing: &[AccountBalance],
        rules: &ClassificationRules,
    ) -> EquityChanges {
        let begin = Self::classify_balance_sheet(opening, rules).equity;
        let end = Self::classify_balance_sheet(closing, rules).equity;

        let component = |kind, beginning: Decimal, ending: Decimal| EquityComponent {
            kind,
            beginning,
            change: ending - beginning,
            ending,
        };

        let components = vec![
            component(
                EquityComponentKind::PaidInCapital,
                begin.paid_in_capital.total,
                end.paid_in_capital.total,
            ),
            component(
                EquityComponentKind::RetainedEarnings,
                begin.retained_earnings.total,
                end.retained_earnings.total,
            ),
            component(
                EquityComponentKind::CurrentEarnings,
                begin.current_earnings,
                end.current_earnings,
            ),
        ];

        EquityChanges {
            components,
            beginning_equity: begin.total,
            total_change: end.total - begin.total,
            ending_equity: end.total,
        }
    }

    /// Derives ratios from the four statements. A zero denominator yields 0.
    #[must_use]
    pub fn calculate_financial_ratios(
        balance_sheet: &BalanceSheet,
        income_statement: &IncomeStatement,
        cash_flow: &CashFlowStatement,
        equity_changes: &EquityChanges,
    ) -> FinancialRatios {
        let current_liabilities = balance_sheet.liabilities.current.total;
        let cash = balance_sheet.assets.current.bucket_total(Bucket::Cash);
        let net_profit = income_statement.net_profit;

        FinancialRatios {
            liquidity: LiquidityRatios {
                current_ratio: safe_ratio(balance_sheet.assets.current.total, current_liabilities),
                cash_ratio: safe_ratio(cash, current_liabilities),
                operating_cash_flow_ratio: safe_ratio(cash_flow.operating.total, current_liabilities),
            },
            solvency: SolvencyRatios {
                debt_to_equity_ratio: safe_ratio(
                    balance_sheet.liabilities.total,
                    balance_sheet.equity.total,
                ),
                debt_to_asset_ratio: safe_ratio(
                    balance_sheet.liabilities.total,
                    balance_sheet.assets.total,
                ),
            },
            profitability: ProfitabilityRatios {
                net_profit_margin: safe_ratio(net_profit, income_statement.total_revenue),
                operating_margin: safe_ratio(
                    income_statement.operating_profit,
                    income_statement.operating_revenue.total,
                ),
                return_on_assets: safe_ratio(net_profit, balance_sheet.assets.total),
                return_on_equity: safe_ratio(net_profit, balance_sheet.equity.total),
            },
            equity_growth: safe_ratio(equity_changes.total_change, equity_changes.beginning_equity),
        }
    }
}

/// `numerator / denominator` rounded to [`RATIO_SCALE`], or 0 when the
/// denominator is 0.
#[must_use]
pub fn safe_ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator
        .checked_div(denominator)
        .map_or(Decimal::ZERO, |r| {
            r.round_dp_with_strategy(RATIO_SCALE, RoundingStrategy::MidpointNearestEven)
        })
}

fn postable(balances: &[AccountBalance]) -> impl Iterator<Item = &AccountBalance> {
    balances.iter().filter(|b| !b.is_header)
}

fn statement_line(balance: &AccountBalance, bucket: Bucket, amount: Decimal) -> StatementLine {
    StatementLine {
        account_id: balance.account_id,
        code: balance.code.clone(),
        name: balance.name.clone(),
        bucket,
        amount,
    }
}

fn cash_total(balances: &[AccountBalance], rules: &ClassificationRules) -> Decimal {
    postable(balances)
        .filter(|b| rules.classify(&b.code, b.account_type) == Bucket::Cash)
        .map(AccountBalance::debit_side)
        .sum()
}

/// Per-account `closing - opening`, keyed by account id. Accounts missing
/// from `opening` start at zero; accounts only in `opening` end at zero.
pub(crate) fn period_movements(opening: &[AccountBalance], closing: &[AccountBalance]) -> Vec<AccountBalance> {
    let mut start: HashMap<AccountId, &AccountBalance> =
        opening.iter().map(|b| (b.account_id, b)).collect();

    let mut movements: Vec<AccountBalance> = closing
        .iter()
        .map(|end| {
            let mut movement = end.clone();
            if let Some(begin) = start.remove(&end.account_id) {
                movement.balance -= begin.balance;
            }
            movement
        })
        .collect();

    let mut closed_out: Vec<AccountBalance> = start
        .into_values()
        .map(|begin| {
            let mut movement = begin.clone();
            movement.balance = -begin.balance;
            movement
        })
        .collect();
    closed_out.sort_by(|a, b| a.code.cmp(&b.code));
    movements.extend(closed_out);
    movements
}
