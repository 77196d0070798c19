//! Account balance aggregation.
//!
//! Balances are never stored. They are derived on demand from posted lines
//! in a single pass, signed so that every account's balance grows on its
//! normal side.

use std::collections::HashMap;

use chrono::NaiveDate;
use koperasi_shared::types::{AccountId, JournalId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::JournalLine;
use crate::coa::{Account, AccountType, NormalBalance};

/// One movement: `amount` debited to `account_debit` and/or credited to
/// `account_credit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    /// Account on the debit side.
    pub account_debit: Option<AccountId>,
    /// Account on the credit side.
    pub account_credit: Option<AccountId>,
    /// Movement amount.
    pub amount: Decimal,
}

/// Flattens journal lines into balance entries, one per non-zero side.
#[must_use]
pub fn entries_from_lines<'a, I>(lines: I) -> Vec<BalanceEntry>
where
    I: IntoIterator<Item = &'a JournalLine>,
{
    let mut entries = Vec::new();
    for line in lines {
        if !line.debit.is_zero() {
            entries.push(BalanceEntry {
                account_debit: Some(line.account_id),
                account_credit: None,
                amount: line.debit,
            });
        }
        if !line.credit.is_zero() {
            entries.push(BalanceEntry {
                account_debit: None,
                account_credit: Some(line.account_id),
                amount: line.credit,
            });
        }
    }
    entries
}

/// Derived balance of one account over a selected set of lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account class.
    pub account_type: AccountType,
    /// Side on which the balance grows.
    pub normal_balance: NormalBalance,
    /// Parent header code.
    pub parent_code: Option<String>,
    /// Aggregation node flag.
    pub is_header: bool,
    /// Balance signed by the account's normal side.
    pub balance: Decimal,
}

impl AccountBalance {
    /// Zero balance for an account.
    #[must_use]
    pub fn zero(account: &Account) -> Self {
        Self {
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            account_type: account.account_type,
            normal_balance: account.normal_balance,
            parent_code: account.parent_code.clone(),
            is_header: account.is_header,
            balance: Decimal::ZERO,
        }
    }

    /// Balance expressed as a debit-side amount.
    #[must_use]
    pub fn debit_side(&self) -> Decimal {
        match self.normal_balance {
            NormalBalance::Debit => self.balance,
            NormalBalance::Credit => -self.balance,
        }
    }

    /// Balance expressed as a credit-side amount.
    #[must_use]
    pub fn credit_side(&self) -> Decimal {
        -self.debit_side()
    }
}

fn signed(normal_balance: NormalBalance, side: NormalBalance, amount: Decimal) -> Decimal {
    if normal_balance == side { amount } else { -amount }
}

/// Computes per-account balances in one pass over `entries`.
///
/// Every account starts at its initial balance (default zero). A debit adds
/// to debit-normal accounts and subtracts from credit-normal ones; credits
/// are symmetric. Entries referencing accounts not in `accounts` are
/// ignored. Output order follows `accounts`.
#[must_use]
pub fn calculate_account_balances(
    accounts: &[Account],
    entries: &[BalanceEntry],
    initial_balances: Option<&HashMap<AccountId, Decimal>>,
) -> Vec<AccountBalance> {
    let mut balances: Vec<AccountBalance> = accounts
        .iter()
        .map(|account| {
            let mut balance = AccountBalance::zero(account);
            if let Some(initial) = initial_balances.and_then(|m| m.get(&account.id)) {
                balance.balance = *initial;
            }
            balance
        })
        .collect();

    let index: HashMap<AccountId, usize> = accounts
        .iter()
        .enumerate()
        .map(|(i, account)| (account.id, i))
        .collect();

    for entry in entries {
        if let Some(&i) = entry.account_debit.as_ref().and_then(|id| index.get(id)) {
            let b = &mut balances[i];
            b.balance += signed(b.normal_balance, NormalBalance::Debit, entry.amount);
        }
        if let Some(&i) = entry.account_credit.as_ref().and_then(|id| index.get(id)) {
            let b = &mut balances[i];
            b.balance += signed(b.normal_balance, NormalBalance::Credit, entry.amount);
        }
    }

    balances
}

/// Replaces every header's balance with the sum of its postable descendants.
///
/// Parent links follow `parent_code`. Headers have the same type, and hence
/// the same normal side, as their descendants.
#[must_use]
pub fn roll_up_headers(balances: &[AccountBalance]) -> Vec<AccountBalance> {
    let parents: HashMap<&str, Option<&str>> = balances
        .iter()
        .map(|b| (b.code.as_str(), b.parent_code.as_deref()))
        .collect();

    let mut totals: HashMap<&str, Decimal> = HashMap::new();
    for leaf in balances.iter().filter(|b| !b.is_header) {
        let mut parent = leaf.parent_code.as_deref();
        let mut depth = 0;
        while let Some(code) = parent {
            *totals.entry(code).or_default() += leaf.balance;
            parent = parents.get(code).copied().flatten();
            depth += 1;
            if depth > balances.len() {
                break;
            }
        }
    }

    balances
        .iter()
        .map(|b| {
            let mut rolled = b.clone();
            if b.is_header {
                rolled.balance = totals.get(b.code.as_str()).copied().unwrap_or_default();
            }
            rolled
        })
        .collect()
}

/// One row of a trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// The account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Debit column.
    pub debit: Decimal,
    /// Credit column.
    pub credit: Decimal,
}

/// Trial balance over postable accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalance {
    /// Rows sorted by code.
    pub rows: Vec<TrialBalanceRow>,
    /// Sum of the debit column.
    pub total_debit: Decimal,
    /// Sum of the credit column.
    pub total_credit: Decimal,
    /// Whether the columns agree.
    pub is_balanced: bool,
}

/// Builds a trial balance. A balance sitting on the side opposite to the
/// account's normal side is shown in the other column.
#[must_use]
pub fn trial_balance(balances: &[AccountBalance]) -> TrialBalance {
    let mut rows: Vec<TrialBalanceRow> = balances
        .iter()
        .filter(|b| !b.is_header)
        .map(|b| {
            let net_debit = b.debit_side();
            let (debit, credit) = if net_debit >= Decimal::ZERO {
                (net_debit, Decimal::ZERO)
            } else {
                (Decimal::ZERO, -net_debit)
            };
            TrialBalanceRow {
                account_id: b.account_id,
                code: b.code.clone(),
                name: b.name.clone(),
                debit,
                credit,
            }
        })
        .collect();
    rows.sort_by(|a, b| a.code.cmp(&b.code));

    let total_debit: Decimal = rows.iter().map(|r| r.debit).sum();
    let total_credit: Decimal = rows.iter().map(|r| r.credit).sum();
    TrialBalance {
        rows,
        total_debit,
        total_credit,
        is_balanced: total_debit == total_credit,
    }
}

/// One posted movement on an account, in posting order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerMovement {
    /// Journal that carried the movement.
    pub journal_id: JournalId,
    /// Journal date.
    pub transaction_date: NaiveDate,
    /// Journal or line narrative.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

/// A general-ledger row with the balance after the movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLedgerRow {
    /// The movement.
    #[serde(flatten)]
    pub movement: LedgerMovement,
    /// Balance after applying this movement.
    pub running_balance: Decimal,
}

/// General-ledger view of one account starting from `opening_balance`.
#[must_use]
pub fn account_ledger(
    normal_balance: NormalBalance,
    opening_balance: Decimal,
    movements: Vec<LedgerMovement>,
) -> Vec<AccountLedgerRow> {
    let mut running = opening_balance;
    movements
        .into_iter()
        .map(|movement| {
            running += signed(normal_balance, NormalBalance::Debit, movement.debit)
                + signed(normal_balance, NormalBalance::Credit, movement.credit);
            AccountLedgerRow {
                movement,
                running_balance: running,
            }
        })
        .collect()
}
