//! Row-Level Security (RLS) context management.
//!
//! Every tenant table carries a `tenant_isolation` policy keyed on the
//! `app.current_tenant_id` setting. Repositories open a [`RlsConnection`]
//! per operation so that each statement, and every trigger it fires, only
//! sees the calling tenant's rows.
//!
//! # Usage
//!
//! ```ignore
//! use koperasi_db::rls::RlsConnection;
//!
//! let scope = RlsConnection::new(&db, tenant_id).await?;
//! let accounts = accounts::Entity::find().all(scope.transaction()).await?;
//! scope.commit().await?;
//! ```

use koperasi_shared::types::TenantId;
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

/// A transaction with the tenant RLS context applied.
///
/// Dropping it without calling [`RlsConnection::commit`] rolls back.
pub struct RlsConnection {
    txn: DatabaseTransaction,
}

impl RlsConnection {
    /// Begins a transaction and scopes it to `tenant_id` with `SET LOCAL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the RLS
    /// context cannot be set.
    pub async fn new(db: &DatabaseConnection, tenant_id: TenantId) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        set_rls_context(&txn, tenant_id).await?;
        Ok(Self { txn })
    }

    /// Returns the underlying transaction for executing queries.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails, including deferred constraint
    /// triggers raised at commit time.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }
}

/// Sets the RLS context on an existing transaction.
///
/// # Errors
///
/// Returns an error if the RLS context cannot be set.
pub async fn set_rls_context(txn: &DatabaseTransaction, tenant_id: TenantId) -> Result<(), DbErr> {
    txn.execute_unprepared(&rls_context_sql(tenant_id)).await?;
    Ok(())
}

/// Serializes one tenant lock per transaction (`pg_advisory_xact_lock`).
///
/// Used where a uniqueness rule spans rows that may not exist yet, such as
/// period ranges that must not overlap.
///
/// # Errors
///
/// Returns an error if the lock statement fails.
pub async fn lock_tenant(txn: &DatabaseTransaction, tenant_id: TenantId) -> Result<(), DbErr> {
    let sql = format!("SELECT pg_advisory_xact_lock(hashtext('{tenant_id}'))");
    txn.execute_unprepared(&sql).await?;
    Ok(())
}

// The value is a formatted UUID, never caller text.
fn rls_context_sql(tenant_id: TenantId) -> String {
    format!("SET LOCAL app.current_tenant_id = '{tenant_id}'")
}
