//! Property-based tests for balance aggregation.

use koperasi_shared::types::TenantId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{BalanceEntry, calculate_account_balances, trial_balance};
use crate::coa::{Account, instantiate_default_chart};

fn chart_accounts() -> Vec<Account> {
    instantiate_default_chart(TenantId::new()).unwrap()
}

/// Strategy producing balanced transfers between postable chart accounts.
fn entries_strategy(accounts: usize) -> impl Strategy<Value = Vec<(usize, usize, i64)>> {
    prop::collection::vec((0..accounts, 0..accounts, 1i64..5_000_000i64), 0..40)
}

fn to_entries(accounts: &[Account], raw: &[(usize, usize, i64)]) -> Vec<BalanceEntry> {
    let postable: Vec<&Account> = accounts.iter().filter(|a| !a.is_header).collect();
    raw.iter()
        .map(|(d, c, cents)| BalanceEntry {
            account_debit: Some(postable[*d % postable.len()].id),
            account_credit: Some(postable[*c % postable.len()].id),
            amount: Decimal::new(*cents, 2),
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_balances_are_order_independent(
        (raw, shuffled) in entries_strategy(64)
            .prop_flat_map(|raw| (Just(raw.clone()), Just(raw).prop_shuffle())),
    ) {
        let accounts = chart_accounts();
        prop_assert_eq!(
            calculate_account_balances(&accounts, &to_entries(&accounts, &raw), None),
            calculate_account_balances(&accounts, &to_entries(&accounts, &shuffled), None)
        );
    }

    #[test]
    fn prop_balanced_entries_give_balanced_trial_balance(raw in entries_strategy(64)) {
        let accounts = chart_accounts();
        let entries = to_entries(&accounts, &raw);
        let tb = trial_balance(&calculate_account_balances(&accounts, &entries, None));
        prop_assert!(tb.is_balanced);
    }

    #[test]
    fn prop_output_follows_account_order(raw in entries_strategy(64)) {
        let accounts = chart_accounts();
        let balances = calculate_account_balances(&accounts, &to_entries(&accounts, &raw), None);
        prop_assert_eq!(balances.len(), accounts.len());
        for (balance, account) in balances.iter().zip(&accounts) {
            prop_assert_eq!(balance.account_id, account.id);
        }
    }
}
