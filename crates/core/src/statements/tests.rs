//! Scenario and property-based tests for the statement classifier.

use std::collections::HashMap;

use koperasi_shared::types::TenantId;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::comparison::{PeriodSnapshot, compare_periods};
use super::rules::{Bucket, ClassificationRules};
use super::service::{StatementService, safe_ratio};
use super::types::{EquityComponentKind, FinancialStatements};
use crate::coa::{Account, AccountType, NewAccount, instantiate_default_chart, validate_new_account};
use crate::ledger::{AccountBalance, BalanceEntry, calculate_account_balances};

struct Ledger {
    accounts: Vec<Account>,
    by_code: HashMap<String, Account>,
}

impl Ledger {
    fn cooperative() -> Self {
        let accounts = instantiate_default_chart(TenantId::new()).unwrap();
        let by_code = accounts.iter().map(|a| (a.code.clone(), a.clone())).collect();
        Self { accounts, by_code }
    }

    fn entry(&self, debit: &str, credit: &str, amount: Decimal) -> BalanceEntry {
        BalanceEntry {
            account_debit: Some(self.by_code[debit].id),
            account_credit: Some(self.by_code[credit].id),
            amount,
        }
    }

    fn balances(&self, entries: &[BalanceEntry]) -> Vec<AccountBalance> {
        calculate_account_balances(&self.accounts, entries, None)
    }

    /// Maps generated `(debit, credit, cents)` triples onto postable accounts.
    fn generated(&self, raw: &[(usize, usize, i64)]) -> Vec<BalanceEntry> {
        let codes: Vec<&str> = self
            .accounts
            .iter()
            .filter(|a| !a.is_header)
            .map(|a| a.code.as_str())
            .collect();
        raw.iter()
            .map(|(d, c, cents)| {
                self.entry(codes[d % codes.len()], codes[c % codes.len()], Decimal::new(*cents, 2))
            })
            .collect()
    }
}

/// A year of typical cooperative activity.
fn sample_year(ledger: &Ledger) -> Vec<BalanceEntry> {
    vec![
        ledger.entry("1-1001", "3-1001", dec!(10000000)),
        ledger.entry("1-1002", "3-1002", dec!(25000000)),
        ledger.entry("1-1002", "2-2001", dec!(50000000)),
        ledger.entry("1-2003", "1-1002", dec!(12000000)),
        ledger.entry("1-1101", "1-1002", dec!(40000000)),
        ledger.entry("1-1002", "1-1101", dec!(15000000)),
        ledger.entry("1-1001", "4-1001", dec!(6000000)),
        ledger.entry("1-1201", "2-1002", dec!(8000000)),
        ledger.entry("1-1001", "4-1002", dec!(9000000)),
        ledger.entry("5-1001", "1-1201", dec!(6000000)),
        ledger.entry("5-1002", "1-1001", dec!(3500000)),
        ledger.entry("5-1003", "2-1002", dec!(400000)),
        ledger.entry("1-1002", "4-2001", dec!(250000)),
        ledger.entry("5-2001", "1-1002", dec!(50000)),
        ledger.entry("1-1002", "2-1001", dec!(7000000)),
    ]
}

#[test]
fn test_cash_and_capital_balance_sheet() {
    let cash = validate_new_account(
        &NewAccount {
            tenant_id: TenantId::new(),
            code: "1-1001".into(),
            name: "Kas".into(),
            account_type: AccountType::Asset,
            normal_balance: None,
            parent_code: None,
            is_header: false,
        },
        &[],
    )
    .unwrap();
    let capital = validate_new_account(
        &NewAccount {
            tenant_id: cash.tenant_id,
            code: "3-1001".into(),
            name: "Simpanan Pokok".into(),
            account_type: AccountType::Equity,
            normal_balance: None,
            parent_code: None,
            is_header: false,
        },
        &[],
    )
    .unwrap();
    let entries = vec![BalanceEntry {
        account_debit: Some(cash.id),
        account_credit: Some(capital.id),
        amount: dec!(1000000),
    }];
    let balances = calculate_account_balances(&[cash, capital], &entries, None);
    let sheet = StatementService::classify_balance_sheet(&balances, &ClassificationRules::default());

    assert_eq!(sheet.assets.total, dec!(1000000));
    assert_eq!(sheet.total_liabilities_and_equity, dec!(1000000));
    assert_eq!(sheet.assets.current.bucket_total(Bucket::Cash), dec!(1000000));
    assert_eq!(sheet.equity.paid_in_capital.total, dec!(1000000));
    assert!(sheet.is_balanced);
    assert_eq!(sheet.difference, Decimal::ZERO);
}

#[test]
fn test_sample_year_statements() {
    let ledger = Ledger::cooperative();
    let rules = ClassificationRules::default();
    let balances = ledger.balances(&sample_year(&ledger));

    let income = StatementService::classify_income_statement(&balances, &rules);
    assert_eq!(income.operating_revenue.total, dec!(15000000));
    assert_eq!(income.operating_expense.total, dec!(9900000));
    assert_eq!(income.operating_profit, dec!(5100000));
    assert_eq!(income.other_revenue.total, dec!(250000));
    assert_eq!(income.other_expense.total, dec!(50000));
    assert_eq!(income.net_profit, dec!(5300000));

    let sheet = StatementService::classify_balance_sheet(&balances, &rules);
    assert!(sheet.is_balanced);
    assert_eq!(sheet.equity.current_earnings, income.net_profit);
    assert_eq!(sheet.liabilities.long_term.total, dec!(50000000));
    assert_eq!(sheet.liabilities.current.total, dec!(15400000));
    assert_eq!(sheet.assets.non_current.total, dec!(12000000));
    let codes: Vec<&str> = sheet.assets.current.lines.iter().map(|l| l.code.as_str()).collect();
    let mut sorted = codes.clone();
    sorted.sort_unstable();
    assert_eq!(codes, sorted);
}

#[test]
fn test_unbalanced_balances_surface_difference() {
    let ledger = Ledger::cooperative();
    let mut entries = sample_year(&ledger);
    entries.push(BalanceEntry {
        account_debit: Some(ledger.by_code["1-1001"].id),
        account_credit: None,
        amount: dec!(123),
    });
    let sheet = StatementService::classify_balance_sheet(&ledger.balances(&entries), &ClassificationRules::default());
    assert!(!sheet.is_balanced);
    assert_eq!(sheet.difference, dec!(123));
}

#[test]
fn test_headers_are_excluded() {
    let ledger = Ledger::cooperative();
    let balances = crate::ledger::roll_up_headers(&ledger.balances(&sample_year(&ledger)));
    let sheet = StatementService::classify_balance_sheet(&balances, &ClassificationRules::default());
    assert!(sheet.is_balanced);
    assert!(
        sheet
            .assets
            .current
            .lines
            .iter()
            .chain(&sheet.assets.non_current.lines)
            .all(|l| l.code.len() == 6)
    );
}

#[test]
fn test_cash_flow_reconciles_across_periods() {
    let ledger = Ledger::cooperative();
    let rules = ClassificationRules::default();
    let entries = sample_year(&ledger);
    let opening = ledger.balances(&entries[..5]);
    let closing = ledger.balances(&entries);

    let cash_flow = StatementService::classify_cash_flow(&opening, &closing, None, &rules);
    assert_eq!(cash_flow.beginning_cash, dec!(33000000));
    assert_eq!(cash_flow.actual_ending_cash, dec!(66700000));
    assert_eq!(cash_flow.net_change_in_cash, dec!(33700000));
    assert_eq!(cash_flow.operating.total, dec!(33700000));
    assert!(cash_flow.is_reconciled);
    assert_eq!(cash_flow.discrepancy, Decimal::ZERO);

    assert_eq!(cash_flow.net_profit, dec!(5300000));
    assert_eq!(cash_flow.investing.total, Decimal::ZERO);
    assert_eq!(cash_flow.financing.total, Decimal::ZERO);
    let receivable = cash_flow
        .operating
        .items
        .iter()
        .find(|i| i.bucket == Bucket::Receivable)
        .unwrap();
    assert_eq!(receivable.change, dec!(-15000000));
    assert_eq!(receivable.cash_effect, dec!(15000000));
}

#[test]
fn test_cash_flow_surfaces_wrong_beginning_cash() {
    let ledger = Ledger::cooperative();
    let balances = ledger.balances(&sample_year(&ledger));
    let cash_flow =
        StatementService::classify_cash_flow(&[], &balances, Some(dec!(100)), &ClassificationRules::default());
    assert!(!cash_flow.is_reconciled);
    assert_eq!(cash_flow.discrepancy, dec!(-100));
}

#[test]
fn test_equity_changes_roll_forward() {
    let ledger = Ledger::cooperative();
    let rules = ClassificationRules::default();
    let entries = sample_year(&ledger);
    let opening = ledger.balances(&entries[..2]);
    let closing = ledger.balances(&entries);

    let changes = StatementService::classify_equity_changes(&opening, &closing, &rules);
    assert_eq!(changes.beginning_equity, dec!(35000000));
    assert_eq!(changes.ending_equity, dec!(40300000));
    assert_eq!(changes.total_change, dec!(5300000));

    let earnings = changes.component(EquityComponentKind::CurrentEarnings).unwrap();
    assert_eq!(earnings.beginning, Decimal::ZERO);
    assert_eq!(earnings.change, dec!(5300000));
    let paid_in = changes.component(EquityComponentKind::PaidInCapital).unwrap();
    assert_eq!(paid_in.change, Decimal::ZERO);
    assert_eq!(
        changes.ending_equity,
        StatementService::classify_balance_sheet(&closing, &rules).equity.total
    );
}

#[test]
fn test_no_debt_gives_zero_debt_to_equity() {
    let ledger = Ledger::cooperative();
    let rules = ClassificationRules::default();
    let balances = ledger.balances(&[ledger.entry("1-1001", "3-1001", dec!(1000000))]);

    let statements = FinancialStatements::generate(&[], &balances, None, &rules);
    assert_eq!(statements.ratios.solvency.debt_to_equity_ratio, Decimal::ZERO);
    assert_eq!(statements.ratios.solvency.debt_to_asset_ratio, Decimal::ZERO);
    assert_eq!(statements.ratios.liquidity.current_ratio, Decimal::ZERO);
    assert_eq!(statements.ratios.profitability.net_profit_margin, Decimal::ZERO);
}

#[test]
fn test_ratios_for_sample_year() {
    let ledger = Ledger::cooperative();
    let rules = ClassificationRules::default();
    let balances = ledger.balances(&sample_year(&ledger));
    let statements = FinancialStatements::generate(&[], &balances, None, &rules);
    let ratios = &statements.ratios;

    // 40,300,000 equity; 65,400,000 liabilities; 105,700,000 assets.
    assert_eq!(statements.balance_sheet.equity.total, dec!(40300000));
    assert_eq!(ratios.solvency.debt_to_equity_ratio, dec!(1.6228));
    assert_eq!(ratios.solvency.debt_to_asset_ratio, dec!(0.6187));
    assert_eq!(ratios.profitability.net_profit_margin, dec!(0.3475));
    assert_eq!(ratios.profitability.return_on_equity, dec!(0.1315));
    // Since-inception roll-forward starts from zero equity.
    assert_eq!(ratios.equity_growth, Decimal::ZERO);
}

#[test]
fn test_empty_ledger_yields_well_formed_zero_reports() {
    let rules = ClassificationRules::default();
    let statements = FinancialStatements::generate(&[], &[], None, &rules);
    assert!(statements.balance_sheet.is_balanced);
    assert!(statements.balance_sheet.assets.current.lines.is_empty());
    assert_eq!(statements.income_statement.net_profit, Decimal::ZERO);
    assert!(statements.cash_flow.is_reconciled);
    assert_eq!(statements.equity_changes.components.len(), 3);
    assert_eq!(statements.ratios, super::types::FinancialRatios::default());
}

#[test]
fn test_safe_ratio_rounds_and_guards_zero() {
    assert_eq!(safe_ratio(dec!(1), dec!(3)), dec!(0.3333));
    assert_eq!(safe_ratio(dec!(2), dec!(3)), dec!(0.6667));
    assert_eq!(safe_ratio(dec!(5), Decimal::ZERO), Decimal::ZERO);
    assert_eq!(safe_ratio(Decimal::ZERO, dec!(5)), Decimal::ZERO);
}

#[test]
fn test_compare_periods_preserves_order() {
    let ledger = Ledger::cooperative();
    let rules = ClassificationRules::default();
    let entries = sample_year(&ledger);
    let snapshots: Vec<PeriodSnapshot> = (1..=entries.len())
        .map(|n| PeriodSnapshot {
            label: format!("P{n}"),
            opening: ledger.balances(&entries[..n - 1]),
            closing: ledger.balances(&entries[..n]),
            beginning_cash: None,
        })
        .collect();

    let compared = compare_periods(&snapshots, &rules);
    assert_eq!(compared.len(), snapshots.len());
    for (result, snapshot) in compared.iter().zip(&snapshots) {
        assert_eq!(result.label, snapshot.label);
        assert_eq!(
            result.statements,
            FinancialStatements::generate(&snapshot.opening, &snapshot.closing, None, &rules)
        );
        assert!(result.statements.cash_flow.is_reconciled);
    }
}

fn raw_entries() -> impl Strategy<Value = Vec<(usize, usize, i64)>> {
    prop::collection::vec((0usize..64, 0usize..64, 1i64..1_000_000_000i64), 0..60)
}

proptest! {
    #[test]
    fn prop_balanced_ledger_gives_balanced_sheet(raw in raw_entries()) {
        let ledger = Ledger::cooperative();
        let balances = ledger.balances(&ledger.generated(&raw));
        let sheet = StatementService::classify_balance_sheet(&balances, &ClassificationRules::default());
        prop_assert!(sheet.is_balanced);
        prop_assert_eq!(sheet.difference, Decimal::ZERO);
    }

    #[test]
    fn prop_current_earnings_equal_net_profit(raw in raw_entries()) {
        let ledger = Ledger::cooperative();
        let rules = ClassificationRules::default();
        let balances = ledger.balances(&ledger.generated(&raw));
        prop_assert_eq!(
            StatementService::classify_balance_sheet(&balances, &rules).equity.current_earnings,
            StatementService::classify_income_statement(&balances, &rules).net_profit
        );
    }

    #[test]
    fn prop_cash_flow_reconciles_for_any_split(raw in raw_entries(), split in 0usize..60) {
        let ledger = Ledger::cooperative();
        let entries = ledger.generated(&raw);
        let split = split.min(entries.len());
        let opening = ledger.balances(&entries[..split]);
        let closing = ledger.balances(&entries);

        let cash_flow = StatementService::classify_cash_flow(
            &opening, &closing, None, &ClassificationRules::default(),
        );
        prop_assert!(cash_flow.is_reconciled);
        prop_assert_eq!(cash_flow.ending_cash, cash_flow.actual_ending_cash);
    }

    #[test]
    fn prop_equity_roll_forward_matches_balance_sheets(raw in raw_entries(), split in 0usize..60) {
        let ledger = Ledger::cooperative();
        let rules = ClassificationRules::default();
        let entries = ledger.generated(&raw);
        let split = split.min(entries.len());
        let opening = ledger.balances(&entries[..split]);
        let closing = ledger.balances(&entries);

        let changes = StatementService::classify_equity_changes(&opening, &closing, &rules);
        let component_total: Decimal = changes.components.iter().map(|c| c.ending).sum();
        prop_assert_eq!(changes.ending_equity, component_total);
        prop_assert_eq!(
            changes.beginning_equity,
            StatementService::classify_balance_sheet(&opening, &rules).equity.total
        );

        let period_profit = FinancialStatements::generate(&opening, &closing, None, &rules)
            .income_statement
            .net_profit;
        let earnings = changes.component(EquityComponentKind::CurrentEarnings).unwrap();
        prop_assert_eq!(earnings.change, period_profit);
    }

    #[test]
    fn prop_statements_are_deterministic(raw in raw_entries()) {
        let ledger = Ledger::cooperative();
        let rules = ClassificationRules::default();
        let balances = ledger.balances(&ledger.generated(&raw));
        prop_assert_eq!(
            FinancialStatements::generate(&[], &balances, None, &rules),
            FinancialStatements::generate(&[], &balances, None, &rules)
        );
    }
}
