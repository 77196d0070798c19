//! Accounting period repository.
//!
//! Closing locks the period row `FOR UPDATE`; posting reads the periods that
//! cover its date `FOR SHARE`. Whichever commits first wins and the other
//! observes its result.

use chrono::{NaiveDate, Utc};
use koperasi_core::period::{
    AccountingPeriod, NewPeriod, PeriodError, generate_monthly_periods, validate_new_period,
};
use koperasi_shared::types::{PeriodId, TenantId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::accounting_periods;
use crate::rls::{RlsConnection, lock_tenant};

/// Error types for period operations.
#[derive(Debug, thiserror::Error)]
pub enum PeriodRepoError {
    /// Period rule violated.
    #[error(transparent)]
    Period(#[from] PeriodError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Accounting period repository.
#[derive(Debug, Clone)]
pub struct PeriodRepository {
    db: DatabaseConnection,
}

impl PeriodRepository {
    /// Creates a new period repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an open period.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is inverted, overlaps an existing period
    /// of the tenant, or the database operation fails.
    pub async fn create_period(&self, input: NewPeriod) -> Result<AccountingPeriod, PeriodRepoError> {
        let scope = RlsConnection::new(&self.db, input.tenant_id).await?;
        lock_tenant(scope.transaction(), input.tenant_id).await?;

        let existing = load_periods(scope.transaction(), input.tenant_id).await?;
        let period = validate_new_period(&input, &existing)?;
        insert_period(scope.transaction(), &period).await?;
        scope.commit().await?;

        tracing::info!(
            tenant_id = %period.tenant_id,
            period_id = %period.id,
            start = %period.start_date,
            end = %period.end_date,
            "accounting period created"
        );
        Ok(period)
    }

    /// Creates one period per calendar month between `start_date` and
    /// `end_date`, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is inverted, any generated month
    /// overlaps an existing period, or the database operation fails.
    pub async fn create_fiscal_year(
        &self,
        tenant_id: TenantId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<AccountingPeriod>, PeriodRepoError> {
        let months = generate_monthly_periods(tenant_id, start_date, end_date)?;

        let scope = RlsConnection::new(&self.db, tenant_id).await?;
        lock_tenant(scope.transaction(), tenant_id).await?;

        let mut existing = load_periods(scope.transaction(), tenant_id).await?;
        let mut created = Vec::with_capacity(months.len());
        for month in &months {
            let period = validate_new_period(month, &existing)?;
            insert_period(scope.transaction(), &period).await?;
            existing.push(period.clone());
            created.push(period);
        }
        scope.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            periods = created.len(),
            "fiscal year created"
        );
        Ok(created)
    }

    /// Lists the tenant's periods ordered by start date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_periods(&self, tenant_id: TenantId) -> Result<Vec<AccountingPeriod>, PeriodRepoError> {
        let scope = RlsConnection::new(&self.db, tenant_id).await?;
        let periods = load_periods(scope.transaction(), tenant_id).await?;
        scope.commit().await?;
        Ok(periods)
    }

    /// Gets one period of the tenant.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is unknown to the tenant.
    pub async fn find_period(
        &self,
        tenant_id: TenantId,
        period_id: PeriodId,
    ) -> Result<AccountingPeriod, PeriodRepoError> {
        let scope = RlsConnection::new(&self.db, tenant_id).await?;
        let model = accounting_periods::Entity::find_by_id(period_id.into_inner())
            .filter(accounting_periods::Column::TenantId.eq(tenant_id.into_inner()))
            .one(scope.transaction())
            .await?
            .ok_or(PeriodError::NotFound(period_id))?;
        scope.commit().await?;
        Ok(model.into())
    }

    /// Returns the period containing `date`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_period_for_date(
        &self,
        tenant_id: TenantId,
        date: NaiveDate,
    ) -> Result<Option<AccountingPeriod>, PeriodRepoError> {
        let scope = RlsConnection::new(&self.db, tenant_id).await?;
        let model = accounting_periods::Entity::find()
            .filter(accounting_periods::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(accounting_periods::Column::StartDate.lte(date))
            .filter(accounting_periods::Column::EndDate.gte(date))
            .one(scope.transaction())
            .await?;
        scope.commit().await?;
        Ok(model.map(AccountingPeriod::from))
    }

    /// Closes a period. Postings dated inside it are rejected from then on.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, `AlreadyClosed` if the period is
    /// closed, or a database error.
    pub async fn close_period(
        &self,
        tenant_id: TenantId,
        period_id: PeriodId,
        closed_by: UserId,
    ) -> Result<AccountingPeriod, PeriodRepoError> {
        let scope = RlsConnection::new(&self.db, tenant_id).await?;

        // Waits for in-flight postings holding FOR SHARE on this row.
        let model = accounting_periods::Entity::find_by_id(period_id.into_inner())
            .filter(accounting_periods::Column::TenantId.eq(tenant_id.into_inner()))
            .lock_exclusive()
            .one(scope.transaction())
            .await?
            .ok_or(PeriodError::NotFound(period_id))?;

        let mut period = AccountingPeriod::from(model.clone());
        let now = Utc::now();
        period.close(closed_by, now)?;

        let mut active: accounting_periods::ActiveModel = model.into();
        active.is_closed = Set(true);
        active.closed_at = Set(Some(now.into()));
        active.closed_by = Set(Some(closed_by.into_inner()));
        active.update(scope.transaction()).await?;
        scope.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            period_id = %period_id,
            closed_by = %closed_by,
            "accounting period closed"
        );
        Ok(period)
    }
}

/// Loads the tenant's periods ordered by start date.
pub(crate) async fn load_periods(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
) -> Result<Vec<AccountingPeriod>, DbErr> {
    let models = accounting_periods::Entity::find()
        .filter(accounting_periods::Column::TenantId.eq(tenant_id.into_inner()))
        .order_by_asc(accounting_periods::Column::StartDate)
        .all(txn)
        .await?;
    Ok(models.into_iter().map(AccountingPeriod::from).collect())
}

/// Reads the periods covering `date` with `FOR SHARE`, blocking concurrent
/// closes of those periods until the caller's transaction ends.
pub(crate) async fn lock_periods_covering(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    date: NaiveDate,
) -> Result<Vec<AccountingPeriod>, DbErr> {
    let models = accounting_periods::Entity::find()
        .filter(accounting_periods::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(accounting_periods::Column::StartDate.lte(date))
        .filter(accounting_periods::Column::EndDate.gte(date))
        .lock_shared()
        .all(txn)
        .await?;
    Ok(models.into_iter().map(AccountingPeriod::from).collect())
}

async fn insert_period(txn: &DatabaseTransaction, period: &AccountingPeriod) -> Result<(), DbErr> {
    let model = accounting_periods::ActiveModel {
        id: Set(period.id.into_inner()),
        tenant_id: Set(period.tenant_id.into_inner()),
        name: Set(period.name.clone()),
        start_date: Set(period.start_date),
        end_date: Set(period.end_date),
        is_closed: Set(period.is_closed),
        closed_at: Set(None),
        closed_by: Set(None),
        created_at: Set(Utc::now().into()),
    };
    model.insert(txn).await?;
    Ok(())
}
