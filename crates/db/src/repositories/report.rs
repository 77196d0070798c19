//! Report repository: balances and statements derived from posted lines.
//!
//! Balances are never stored. Each report aggregates journal lines per
//! account in SQL and feeds the sums through the core balance aggregator.

use chrono::NaiveDate;
use koperasi_core::coa::Account;
use koperasi_core::ledger::{
    AccountBalance, AccountLedgerRow, BalanceEntry, LedgerMovement, TrialBalance, account_ledger,
    calculate_account_balances, trial_balance,
};
use koperasi_core::period::AccountingPeriod;
use koperasi_core::statements::{
    ClassificationRules, FinancialStatements, PeriodSnapshot, PeriodStatements, compare_periods,
};
use koperasi_shared::types::{AccountId, JournalId, PeriodId, TenantId};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, FromQueryResult,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use serde::Serialize;
use uuid::Uuid;

use super::account::load_accounts;
use super::period::load_periods;
use crate::entities::{journal_lines, journals};
use crate::rls::RlsConnection;

/// Error types for report operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Account not found for the tenant.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Period not found for the tenant.
    #[error("Accounting period not found: {0}")]
    PeriodNotFound(PeriodId),

    /// `from` is after `to`.
    #[error("Invalid date range: {from} is after {to}")]
    InvalidRange {
        /// Range start.
        from: NaiveDate,
        /// Range end.
        to: NaiveDate,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// General ledger of one account over a date range.
#[derive(Debug, Clone, Serialize)]
pub struct AccountLedger {
    /// The account.
    pub account: Account,
    /// Balance before the first movement.
    pub opening_balance: Decimal,
    /// Movements with running balance.
    pub rows: Vec<AccountLedgerRow>,
    /// Balance after the last movement.
    pub closing_balance: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct AccountTotals {
    account_id: Uuid,
    total_debit: Option<Decimal>,
    total_credit: Option<Decimal>,
}

#[derive(Debug, FromQueryResult)]
struct MovementRow {
    journal_id: Uuid,
    transaction_date: NaiveDate,
    journal_description: String,
    description: Option<String>,
    debit: Decimal,
    credit: Decimal,
}

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Balances of every account over all lines dated on or before `as_of`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn balances_as_of(
        &self,
        tenant_id: TenantId,
        as_of: NaiveDate,
    ) -> Result<Vec<AccountBalance>, ReportError> {
        let scope = RlsConnection::new(&self.db, tenant_id).await?;
        let accounts = load_accounts(scope.transaction(), tenant_id).await?;
        let balances = balances_in(scope.transaction(), tenant_id, &accounts, None, Some(as_of)).await?;
        scope.commit().await?;
        Ok(balances)
    }

    /// Balances of every account over lines dated within `[from, to]` only.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` if `from > to`, or a database error.
    pub async fn balances_between(
        &self,
        tenant_id: TenantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AccountBalance>, ReportError> {
        check_range(from, to)?;
        let scope = RlsConnection::new(&self.db, tenant_id).await?;
        let accounts = load_accounts(scope.transaction(), tenant_id).await?;
        let balances = balances_in(scope.transaction(), tenant_id, &accounts, Some(from), Some(to)).await?;
        scope.commit().await?;
        Ok(balances)
    }

    /// Trial balance as of `as_of`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn trial_balance(&self, tenant_id: TenantId, as_of: NaiveDate) -> Result<TrialBalance, ReportError> {
        let balances = self.balances_as_of(tenant_id, as_of).await?;
        Ok(trial_balance(&balances))
    }

    /// General ledger of one account between `from` and `to` (both optional).
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`, `InvalidRange`, or a database error.
    pub async fn account_ledger(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<AccountLedger, ReportError> {
        if let (Some(from), Some(to)) = (from, to) {
            check_range(from, to)?;
        }

        let scope = RlsConnection::new(&self.db, tenant_id).await?;
        let txn = scope.transaction();
        let accounts = load_accounts(txn, tenant_id).await?;
        let account = accounts
            .iter()
            .find(|a| a.id == account_id)
            .cloned()
            .ok_or(ReportError::AccountNotFound(account_id))?;

        let opening_balance = match from.and_then(|d| d.pred_opt()) {
            Some(day_before) => {
                balances_in(txn, tenant_id, std::slice::from_ref(&account), None, Some(day_before))
                    .await?
                    .first()
                    .map_or(Decimal::ZERO, |b| b.balance)
            }
            None => Decimal::ZERO,
        };

        let mut query = journal_lines::Entity::find()
            .select_only()
            .column(journal_lines::Column::JournalId)
            .column(journal_lines::Column::Description)
            .column(journal_lines::Column::Debit)
            .column(journal_lines::Column::Credit)
            .column(journals::Column::TransactionDate)
            .column_as(journals::Column::Description, "journal_description")
            .join(JoinType::InnerJoin, journal_lines::Relation::Journals.def())
            .filter(journal_lines::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(journal_lines::Column::AccountId.eq(account_id.into_inner()));
        if let Some(from) = from {
            query = query.filter(journals::Column::TransactionDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(journals::Column::TransactionDate.lte(to));
        }

        let rows = query
            .order_by_asc(journals::Column::TransactionDate)
            .order_by_asc(journals::Column::CreatedAt)
            .order_by_asc(journal_lines::Column::LineNo)
            .into_model::<MovementRow>()
            .all(txn)
            .await?;
        scope.commit().await?;

        let movements = rows
            .into_iter()
            .map(|row| LedgerMovement {
                journal_id: JournalId::from_uuid(row.journal_id),
                transaction_date: row.transaction_date,
                description: row.description.unwrap_or(row.journal_description),
                debit: row.debit,
                credit: row.credit,
            })
            .collect();

        let rows = account_ledger(account.normal_balance, opening_balance, movements);
        let closing_balance = rows.last().map_or(opening_balance, |r| r.running_balance);

        Ok(AccountLedger {
            account,
            opening_balance,
            rows,
            closing_balance,
        })
    }

    /// Generates the full statement set for `[from, to]`.
    ///
    /// Without `from` the period runs from inception. `beginning_cash`
    /// defaults to the cash balance on the day before `from`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` if `from > to`, or a database error.
    pub async fn financial_statements(
        &self,
        tenant_id: TenantId,
        from: Option<NaiveDate>,
        to: NaiveDate,
        beginning_cash: Option<Decimal>,
        rules: &ClassificationRules,
    ) -> Result<FinancialStatements, ReportError> {
        if let Some(from) = from {
            check_range(from, to)?;
        }

        let scope = RlsConnection::new(&self.db, tenant_id).await?;
        let (opening, closing) = bracket(scope.transaction(), tenant_id, from, to).await?;
        scope.commit().await?;

        Ok(FinancialStatements::generate(&opening, &closing, beginning_cash, rules))
    }

    /// Generates statements for each period, in the order given.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` for an id unknown to the tenant, or a
    /// database error.
    pub async fn compare_periods(
        &self,
        tenant_id: TenantId,
        period_ids: &[PeriodId],
        rules: &ClassificationRules,
    ) -> Result<Vec<PeriodStatements>, ReportError> {
        let scope = RlsConnection::new(&self.db, tenant_id).await?;
        let periods = load_periods(scope.transaction(), tenant_id).await?;

        let mut snapshots = Vec::with_capacity(period_ids.len());
        for period_id in period_ids {
            let period: &AccountingPeriod = periods
                .iter()
                .find(|p| p.id == *period_id)
                .ok_or(ReportError::PeriodNotFound(*period_id))?;
            let (opening, closing) =
                bracket(scope.transaction(), tenant_id, Some(period.start_date), period.end_date).await?;
            snapshots.push(PeriodSnapshot {
                label: period.name.clone(),
                opening,
                closing,
                beginning_cash: None,
            });
        }
        scope.commit().await?;

        Ok(compare_periods(&snapshots, rules))
    }
}

fn check_range(from: NaiveDate, to: NaiveDate) -> Result<(), ReportError> {
    if from > to {
        return Err(ReportError::InvalidRange { from, to });
    }
    Ok(())
}

/// Opening (day before `from`, empty from inception) and closing (`to`) balances.
async fn bracket(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    from: Option<NaiveDate>,
    to: NaiveDate,
) -> Result<(Vec<AccountBalance>, Vec<AccountBalance>), DbErr> {
    let accounts = load_accounts(txn, tenant_id).await?;
    let opening = match from.and_then(|d| d.pred_opt()) {
        Some(day_before) => balances_in(txn, tenant_id, &accounts, None, Some(day_before)).await?,
        None => Vec::new(),
    };
    let closing = balances_in(txn, tenant_id, &accounts, None, Some(to)).await?;
    Ok((opening, closing))
}

/// Aggregates lines dated within the optional bounds and derives balances.
async fn balances_in(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    accounts: &[Account],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<AccountBalance>, DbErr> {
    let mut query = journal_lines::Entity::find()
        .select_only()
        .column(journal_lines::Column::AccountId)
        .column_as(journal_lines::Column::Debit.sum(), "total_debit")
        .column_as(journal_lines::Column::Credit.sum(), "total_credit")
        .join(JoinType::InnerJoin, journal_lines::Relation::Journals.def())
        .filter(journal_lines::Column::TenantId.eq(tenant_id.into_inner()));
    if let Some(from) = from {
        query = query.filter(journals::Column::TransactionDate.gte(from));
    }
    if let Some(to) = to {
        query = query.filter(journals::Column::TransactionDate.lte(to));
    }

    let totals = query
        .group_by(journal_lines::Column::AccountId)
        .into_model::<AccountTotals>()
        .all(txn)
        .await?;

    Ok(calculate_account_balances(accounts, &totals_to_entries(totals), None))
}

fn totals_to_entries(totals: Vec<AccountTotals>) -> Vec<BalanceEntry> {
    let mut entries = Vec::with_capacity(totals.len() * 2);
    for row in totals {
        let account_id = AccountId::from_uuid(row.account_id);
        entries.push(BalanceEntry {
            account_debit: Some(account_id),
            account_credit: None,
            amount: row.total_debit.unwrap_or_default(),
        });
        entries.push(BalanceEntry {
            account_debit: None,
            account_credit: Some(account_id),
            amount: row.total_credit.unwrap_or_default(),
        });
    }
    entries
}
