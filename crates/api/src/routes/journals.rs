//! Journal routes: the producer-facing posting interface.
//!
//! Journals are append-only. There are no PUT, PATCH or DELETE routes; a
//! mistake is corrected by posting a reversal.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use koperasi_core::ledger::{Journal, JournalLineInput, PostJournalInput, PostingReceipt};
use koperasi_db::{JournalFilter, JournalRepository};
use koperasi_shared::types::{JournalId, PageRequest, PageResponse, TenantId, UserId};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

/// Creates the journal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/journals",
            get(list_journals).post(post_journal),
        )
        .route("/tenants/{tenant_id}/journals/{journal_id}", get(get_journal))
        .route(
            "/tenants/{tenant_id}/journals/{journal_id}/reverse",
            post(reverse_journal),
        )
}

/// Request body for posting a journal.
#[derive(Debug, Deserialize)]
pub struct PostJournalRequest {
    /// Producing business unit.
    pub business_unit: String,
    /// Accounting date (YYYY-MM-DD).
    pub transaction_date: NaiveDate,
    /// Narrative.
    pub description: String,
    /// Producer-side id; retries with the same id are replayed.
    #[serde(default)]
    pub reference_id: Option<String>,
    /// Producer-side reference kind.
    #[serde(default)]
    pub reference_type: Option<String>,
    /// Debit/credit lines.
    pub lines: Vec<JournalLineInput>,
    /// Author.
    pub created_by: UserId,
}

/// Request body for reversing a journal.
#[derive(Debug, Deserialize)]
pub struct ReverseJournalRequest {
    /// Date of the reversing journal.
    pub reversal_date: NaiveDate,
    /// Author of the reversal.
    pub created_by: UserId,
    /// Optional reason, appended to the description.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Query parameters for listing journals.
#[derive(Debug, Default, Deserialize)]
pub struct ListJournalsQuery {
    /// Date range start (inclusive).
    pub from: Option<NaiveDate>,
    /// Date range end (inclusive).
    pub to: Option<NaiveDate>,
    /// Producing business unit.
    pub business_unit: Option<String>,
    /// Producer reference kind.
    pub reference_type: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// POST `/tenants/{tenant_id}/journals`
///
/// Responds 201 for a new journal and 200 for a replayed retry.
async fn post_journal(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    Json(payload): Json<PostJournalRequest>,
) -> Result<(StatusCode, Json<PostingReceipt>), ApiError> {
    if payload.business_unit.trim().is_empty() {
        return Err(ApiError::validation("business_unit must not be empty"));
    }

    let repo = JournalRepository::new((*state.db).clone(), state.currency_scale);
    let receipt = repo
        .post_journal(PostJournalInput {
            tenant_id,
            business_unit: payload.business_unit,
            transaction_date: payload.transaction_date,
            description: payload.description,
            reference_id: payload.reference_id,
            reference_type: payload.reference_type,
            lines: payload.lines,
            created_by: payload.created_by,
        })
        .await?;

    let status = if receipt.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(receipt)))
}

/// GET `/tenants/{tenant_id}/journals`
async fn list_journals(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    Query(query): Query<ListJournalsQuery>,
) -> Result<Json<PageResponse<Journal>>, ApiError> {
    let defaults = PageRequest::default();
    let page = PageRequest {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };
    let filter = JournalFilter {
        date_from: query.from,
        date_to: query.to,
        business_unit: query.business_unit,
        reference_type: query.reference_type,
    };

    let repo = JournalRepository::new((*state.db).clone(), state.currency_scale);
    Ok(Json(repo.list_journals(tenant_id, &filter, &page).await?))
}

/// GET `/tenants/{tenant_id}/journals/{journal_id}`
async fn get_journal(
    State(state): State<AppState>,
    Path((tenant_id, journal_id)): Path<(TenantId, JournalId)>,
) -> Result<Json<Journal>, ApiError> {
    let repo = JournalRepository::new((*state.db).clone(), state.currency_scale);
    Ok(Json(repo.get_journal(tenant_id, journal_id).await?))
}

/// POST `/tenants/{tenant_id}/journals/{journal_id}/reverse`
async fn reverse_journal(
    State(state): State<AppState>,
    Path((tenant_id, journal_id)): Path<(TenantId, JournalId)>,
    Json(payload): Json<ReverseJournalRequest>,
) -> Result<(StatusCode, Json<PostingReceipt>), ApiError> {
    let repo = JournalRepository::new((*state.db).clone(), state.currency_scale);
    let receipt = repo
        .reverse_journal(
            tenant_id,
            journal_id,
            payload.reversal_date,
            payload.created_by,
            payload.reason.as_deref(),
        )
        .await?;

    let status = if receipt.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(receipt)))
}
