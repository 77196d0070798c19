//! Journal repository: the single ledger write path and journal reads.
//!
//! [`JournalRepository::post_journal`] runs every posting rule inside one
//! tenant-scoped transaction and inserts the header and all lines
//! atomically. There is no update or delete; corrections are posted as
//! reversing journals.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use koperasi_core::ledger::{
    AccountInfo, Journal, LedgerError, PostJournalInput, PostingReceipt, PostingService,
    ReversalService, ValidatedJournal,
};
use koperasi_core::period::closed_period_containing;
use koperasi_shared::types::{AccountId, JournalId, JournalLineId, PageRequest, PageResponse, TenantId, UserId};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::is_unique_violation;
use super::period::lock_periods_covering;
use crate::entities::{accounts, journal_lines, journals};
use crate::mapping::journal_from_models;
use crate::rls::RlsConnection;

/// Filter options for listing journals.
#[derive(Debug, Clone, Default)]
pub struct JournalFilter {
    /// Filter by date range start (inclusive).
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end (inclusive).
    pub date_to: Option<NaiveDate>,
    /// Filter by producing business unit.
    pub business_unit: Option<String>,
    /// Filter by producer reference kind.
    pub reference_type: Option<String>,
}

/// Why an attempt did not commit.
enum PostError {
    Rejected(LedgerError),
    Store(DbErr),
}

impl From<LedgerError> for PostError {
    fn from(err: LedgerError) -> Self {
        Self::Rejected(err)
    }
}

impl From<DbErr> for PostError {
    fn from(err: DbErr) -> Self {
        Self::Store(err)
    }
}

/// Journal repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
    currency_scale: u32,
}

impl JournalRepository {
    /// Creates a journal repository rounding amounts to `currency_scale`
    /// decimal places.
    #[must_use]
    pub const fn new(db: DatabaseConnection, currency_scale: u32) -> Self {
        Self { db, currency_scale }
    }

    /// Posts a journal.
    ///
    /// Either the whole journal commits or nothing does. A request whose
    /// `(reference_type, reference_id)` was already posted for the tenant
    /// returns the existing journal with `replayed = true`.
    ///
    /// # Errors
    ///
    /// - `EmptyJournal`, `NegativeAmount`, `UnknownAccount` for malformed input
    /// - `PeriodClosed` if the date falls inside a closed period
    /// - `UnbalancedEntry` if debits and credits differ
    /// - `StorageFailure` if the store fails; nothing was written and the
    ///   request may be retried with the same reference
    pub async fn post_journal(&self, input: PostJournalInput) -> Result<PostingReceipt, LedgerError> {
        self.post(&input, None).await
    }

    /// Posts the mirror image of an existing journal dated `reversal_date`.
    ///
    /// Reversing the same journal twice returns the first reversal.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound` for an unknown id, otherwise the same errors
    /// as [`Self::post_journal`] (the reversal date must not be in a closed
    /// period).
    pub async fn reverse_journal(
        &self,
        tenant_id: TenantId,
        journal_id: JournalId,
        reversal_date: NaiveDate,
        created_by: UserId,
        reason: Option<&str>,
    ) -> Result<PostingReceipt, LedgerError> {
        let original = self.get_journal(tenant_id, journal_id).await?;
        let input = ReversalService::build_reversal(&original, reversal_date, created_by, reason);
        self.post(&input, Some(original.id)).await
    }

    /// Gets a journal with its lines.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound` if the id is unknown to the tenant.
    pub async fn get_journal(&self, tenant_id: TenantId, journal_id: JournalId) -> Result<Journal, LedgerError> {
        let scope = RlsConnection::new(&self.db, tenant_id).await.map_err(storage_failure)?;

        let header = journals::Entity::find_by_id(journal_id.into_inner())
            .filter(journals::Column::TenantId.eq(tenant_id.into_inner()))
            .one(scope.transaction())
            .await
            .map_err(storage_failure)?
            .ok_or(LedgerError::JournalNotFound(journal_id))?;

        let lines = journal_lines::Entity::find()
            .filter(journal_lines::Column::JournalId.eq(header.id))
            .order_by_asc(journal_lines::Column::LineNo)
            .all(scope.transaction())
            .await
            .map_err(storage_failure)?;
        scope.commit().await.map_err(storage_failure)?;

        Ok(journal_from_models(header, lines))
    }

    /// Lists journals, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageFailure` if the database query fails.
    pub async fn list_journals(
        &self,
        tenant_id: TenantId,
        filter: &JournalFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<Journal>, LedgerError> {
        let page = page.normalized();
        let scope = RlsConnection::new(&self.db, tenant_id).await.map_err(storage_failure)?;
        let txn = scope.transaction();

        let mut query = journals::Entity::find().filter(journals::Column::TenantId.eq(tenant_id.into_inner()));
        if let Some(date_from) = filter.date_from {
            query = query.filter(journals::Column::TransactionDate.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(journals::Column::TransactionDate.lte(date_to));
        }
        if let Some(business_unit) = &filter.business_unit {
            query = query.filter(journals::Column::BusinessUnit.eq(business_unit.as_str()));
        }
        if let Some(reference_type) = &filter.reference_type {
            query = query.filter(journals::Column::ReferenceType.eq(reference_type.as_str()));
        }

        let total = query.clone().count(txn).await.map_err(storage_failure)?;
        let headers = query
            .order_by_desc(journals::Column::TransactionDate)
            .order_by_desc(journals::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(txn)
            .await
            .map_err(storage_failure)?;

        let ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
        let mut lines_by_journal: HashMap<Uuid, Vec<journal_lines::Model>> = HashMap::new();
        if !ids.is_empty() {
            let lines = journal_lines::Entity::find()
                .filter(journal_lines::Column::JournalId.is_in(ids))
                .order_by_asc(journal_lines::Column::JournalId)
                .order_by_asc(journal_lines::Column::LineNo)
                .all(txn)
                .await
                .map_err(storage_failure)?;
            for line in lines {
                lines_by_journal.entry(line.journal_id).or_default().push(line);
            }
        }
        scope.commit().await.map_err(storage_failure)?;

        let data = headers
            .into_iter()
            .map(|header| {
                let lines = lines_by_journal.remove(&header.id).unwrap_or_default();
                journal_from_models(header, lines)
            })
            .collect();

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    async fn post(
        &self,
        input: &PostJournalInput,
        reverses: Option<JournalId>,
    ) -> Result<PostingReceipt, LedgerError> {
        let result = match self.try_post(input, reverses).await {
            Ok(receipt) => Ok(receipt),
            Err(PostError::Rejected(err)) => Err(err),
            // Lost the race against a concurrent request with the same reference.
            Err(PostError::Store(err)) if is_unique_violation(&err) && reference(input).is_some() => {
                self.replay(input).await
            }
            Err(PostError::Store(err)) => Err(storage_failure(err)),
        };

        match &result {
            Ok(receipt) => tracing::info!(
                tenant_id = %input.tenant_id,
                journal_id = %receipt.journal_id,
                business_unit = %input.business_unit,
                replayed = receipt.replayed,
                "journal posted"
            ),
            Err(err @ LedgerError::StorageFailure(_)) => tracing::error!(
                tenant_id = %input.tenant_id,
                business_unit = %input.business_unit,
                error = %err,
                "journal posting failed"
            ),
            Err(err) => tracing::warn!(
                tenant_id = %input.tenant_id,
                business_unit = %input.business_unit,
                code = err.error_code(),
                error = %err,
                "journal rejected"
            ),
        }

        result
    }

    async fn try_post(
        &self,
        input: &PostJournalInput,
        reverses: Option<JournalId>,
    ) -> Result<PostingReceipt, PostError> {
        let scope = RlsConnection::new(&self.db, input.tenant_id).await?;
        let txn = scope.transaction();

        if let Some((reference_type, reference_id)) = reference(input)
            && let Some(existing) = find_by_reference(txn, input.tenant_id, reference_type, reference_id).await?
        {
            scope.commit().await?;
            return Ok(PostingReceipt {
                journal_id: JournalId::from_uuid(existing.id),
                replayed: true,
            });
        }

        let accounts = load_posting_accounts(txn, input).await?;
        let periods = lock_periods_covering(txn, input.tenant_id, input.transaction_date).await?;

        let validated = PostingService::validate(
            input,
            self.currency_scale,
            |id| accounts.get(&id).copied(),
            |date| closed_period_containing(&periods, date).map(|p| p.id),
        )?;

        let journal_id = JournalId::new();
        insert_journal(txn, journal_id, input, reverses, &validated).await?;
        scope.commit().await?;

        Ok(PostingReceipt {
            journal_id,
            replayed: false,
        })
    }

    async fn replay(&self, input: &PostJournalInput) -> Result<PostingReceipt, LedgerError> {
        let Some((reference_type, reference_id)) = reference(input) else {
            return Err(LedgerError::StorageFailure("missing reference for replay".to_string()));
        };

        let scope = RlsConnection::new(&self.db, input.tenant_id).await.map_err(storage_failure)?;
        let existing = find_by_reference(scope.transaction(), input.tenant_id, reference_type, reference_id)
            .await
            .map_err(storage_failure)?;
        scope.commit().await.map_err(storage_failure)?;

        existing
            .map(|journal| PostingReceipt {
                journal_id: JournalId::from_uuid(journal.id),
                replayed: true,
            })
            .ok_or_else(|| LedgerError::StorageFailure("duplicate reference not visible".to_string()))
    }
}

/// `(reference_type, reference_id)` with blanks treated as absent.
fn reference(input: &PostJournalInput) -> Option<(Option<&str>, &str)> {
    let reference_id = input.reference_id.as_deref().filter(|r| !r.is_empty())?;
    let reference_type = input.reference_type.as_deref().filter(|t| !t.is_empty());
    Some((reference_type, reference_id))
}

async fn find_by_reference(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    reference_type: Option<&str>,
    reference_id: &str,
) -> Result<Option<journals::Model>, DbErr> {
    let query = journals::Entity::find()
        .filter(journals::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(journals::Column::ReferenceId.eq(reference_id));
    let query = match reference_type {
        Some(reference_type) => query.filter(journals::Column::ReferenceType.eq(reference_type)),
        None => query.filter(journals::Column::ReferenceType.is_null()),
    };
    query.one(txn).await
}

/// Resolves the accounts referenced by the journal, visible to the tenant.
async fn load_posting_accounts(
    txn: &DatabaseTransaction,
    input: &PostJournalInput,
) -> Result<HashMap<AccountId, AccountInfo>, DbErr> {
    let ids: HashSet<Uuid> = input.lines.iter().map(|l| l.account_id.into_inner()).collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let models = accounts::Entity::find()
        .filter(accounts::Column::Id.is_in(ids))
        .all(txn)
        .await?;

    Ok(models
        .into_iter()
        .map(|model| {
            let info = AccountInfo {
                id: AccountId::from_uuid(model.id),
                tenant_id: TenantId::from_uuid(model.tenant_id),
                is_active: model.is_active,
                is_header: model.is_header,
            };
            (info.id, info)
        })
        .collect())
}

async fn insert_journal(
    txn: &DatabaseTransaction,
    journal_id: JournalId,
    input: &PostJournalInput,
    reverses: Option<JournalId>,
    validated: &ValidatedJournal,
) -> Result<(), PostError> {
    let (reference_type, reference_id) = match reference(input) {
        Some((reference_type, reference_id)) => (reference_type.map(str::to_string), Some(reference_id.to_string())),
        None => (None, None),
    };

    let header = journals::ActiveModel {
        id: Set(journal_id.into_inner()),
        tenant_id: Set(input.tenant_id.into_inner()),
        business_unit: Set(input.business_unit.clone()),
        transaction_date: Set(input.transaction_date),
        description: Set(input.description.clone()),
        reference_id: Set(reference_id),
        reference_type: Set(reference_type),
        reverses_journal_id: Set(reverses.map(JournalId::into_inner)),
        created_by: Set(input.created_by.into_inner()),
        created_at: Set(Utc::now().into()),
    };
    journals::Entity::insert(header).exec(txn).await?;

    let mut lines = Vec::with_capacity(validated.lines.len());
    for (index, line) in validated.lines.iter().enumerate() {
        let line_no = i32::try_from(index + 1)
            .map_err(|_| LedgerError::StorageFailure("too many journal lines".to_string()))?;
        lines.push(journal_lines::ActiveModel {
            id: Set(JournalLineId::new().into_inner()),
            tenant_id: Set(input.tenant_id.into_inner()),
            journal_id: Set(journal_id.into_inner()),
            line_no: Set(line_no),
            account_id: Set(line.account_id.into_inner()),
            debit: Set(line.debit),
            credit: Set(line.credit),
            description: Set(line.description.clone()),
        });
    }
    journal_lines::Entity::insert_many(lines).exec(txn).await?;

    Ok(())
}

fn storage_failure(err: DbErr) -> LedgerError {
    LedgerError::StorageFailure(err.to_string())
}
