//! Account repository: tenant chart of accounts.
//!
//! Accounts are created through [`validate_new_account`] and afterwards only
//! ever deactivated. Codes, types and normal balances are never rewritten.

use chrono::Utc;
use koperasi_core::coa::{Account, CoaError, NewAccount, instantiate_default_chart, validate_new_account};
use koperasi_shared::types::{AccountId, TenantId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use super::is_unique_violation;
use crate::entities::accounts;
use crate::rls::RlsConnection;

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountRepoError {
    /// Chart of accounts rule violated.
    #[error(transparent)]
    Coa(#[from] CoaError),

    /// Account not found for the tenant.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Adds an account to the tenant's chart.
    ///
    /// # Errors
    ///
    /// Returns an error if the account breaks a chart rule (duplicate code,
    /// unknown or non-header parent, normal balance not matching the type) or
    /// the database operation fails.
    pub async fn create_account(&self, input: NewAccount) -> Result<Account, AccountRepoError> {
        let scope = RlsConnection::new(&self.db, input.tenant_id).await?;
        let existing = load_accounts(scope.transaction(), input.tenant_id).await?;
        let account = validate_new_account(&input, &existing)?;

        insert_account(scope.transaction(), &account)
            .await
            .map_err(|err| duplicate_or_db(err, &account.code))?;
        scope
            .commit()
            .await
            .map_err(|err| duplicate_or_db(err, &account.code))?;

        tracing::info!(
            tenant_id = %account.tenant_id,
            account_id = %account.id,
            code = %account.code,
            "account created"
        );
        Ok(account)
    }

    /// Lists the tenant's accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        tenant_id: TenantId,
        include_inactive: bool,
    ) -> Result<Vec<Account>, AccountRepoError> {
        let scope = RlsConnection::new(&self.db, tenant_id).await?;
        let mut accounts = load_accounts(scope.transaction(), tenant_id).await?;
        scope.commit().await?;

        if !include_inactive {
            accounts.retain(|a| a.is_active);
        }
        Ok(accounts)
    }

    /// Gets one account of the tenant.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is unknown to the tenant.
    pub async fn find_account(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
    ) -> Result<Account, AccountRepoError> {
        let scope = RlsConnection::new(&self.db, tenant_id).await?;
        let model = find_model(scope.transaction(), tenant_id, account_id).await?;
        scope.commit().await?;
        Ok(model.into())
    }

    /// Soft-deactivates an account so it rejects new postings.
    ///
    /// Deactivating an inactive account is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is unknown to the tenant.
    pub async fn deactivate_account(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
    ) -> Result<Account, AccountRepoError> {
        let scope = RlsConnection::new(&self.db, tenant_id).await?;
        let model = find_model(scope.transaction(), tenant_id, account_id).await?;

        let model = if model.is_active {
            let mut active: accounts::ActiveModel = model.into();
            active.is_active = Set(false);
            active.updated_at = Set(Utc::now().into());
            active.update(scope.transaction()).await?
        } else {
            model
        };
        scope.commit().await?;

        tracing::info!(tenant_id = %tenant_id, account_id = %account_id, "account deactivated");
        Ok(model.into())
    }

    /// Seeds the built-in cooperative chart of accounts.
    ///
    /// Codes the tenant already has are left untouched, so seeding twice is
    /// harmless. Returns the tenant's full chart afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn seed_default_chart(&self, tenant_id: TenantId) -> Result<Vec<Account>, AccountRepoError> {
        let scope = RlsConnection::new(&self.db, tenant_id).await?;
        let existing = load_accounts(scope.transaction(), tenant_id).await?;

        let mut inserted = 0usize;
        for account in instantiate_default_chart(tenant_id)? {
            if existing.iter().any(|a| a.code == account.code) {
                continue;
            }
            insert_account(scope.transaction(), &account).await?;
            inserted += 1;
        }

        let accounts = load_accounts(scope.transaction(), tenant_id).await?;
        scope.commit().await?;

        tracing::info!(tenant_id = %tenant_id, inserted, "default chart seeded");
        Ok(accounts)
    }
}

/// Loads every account of the tenant ordered by code.
pub(crate) async fn load_accounts(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
) -> Result<Vec<Account>, DbErr> {
    let models = accounts::Entity::find()
        .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
        .order_by_asc(accounts::Column::Code)
        .all(txn)
        .await?;
    Ok(models.into_iter().map(Account::from).collect())
}

async fn find_model(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    account_id: AccountId,
) -> Result<accounts::Model, AccountRepoError> {
    accounts::Entity::find_by_id(account_id.into_inner())
        .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
        .one(txn)
        .await?
        .ok_or(AccountRepoError::NotFound(account_id))
}

async fn insert_account(txn: &DatabaseTransaction, account: &Account) -> Result<(), DbErr> {
    let now = Utc::now().into();
    let model = accounts::ActiveModel {
        id: Set(account.id.into_inner()),
        tenant_id: Set(account.tenant_id.into_inner()),
        code: Set(account.code.clone()),
        name: Set(account.name.clone()),
        account_type: Set(account.account_type.into()),
        normal_balance: Set(account.normal_balance.into()),
        parent_code: Set(account.parent_code.clone()),
        level: Set(account.level),
        is_header: Set(account.is_header),
        is_active: Set(account.is_active),
        created_at: Set(now),
        updated_at: Set(now),
    };
    model.insert(txn).await?;
    Ok(())
}

// A concurrent insert of the same code loses on `uq_accounts_tenant_code`.
fn duplicate_or_db(err: DbErr, code: &str) -> AccountRepoError {
    if is_unique_violation(&err) {
        AccountRepoError::Coa(CoaError::DuplicateCode(code.to_string()))
    } else {
        AccountRepoError::Database(err)
    }
}
