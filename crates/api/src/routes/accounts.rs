//! Chart of accounts routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use koperasi_core::coa::{Account, AccountType, NewAccount, NormalBalance};
use koperasi_db::{AccountLedger, AccountRepository, ReportRepository};
use koperasi_shared::types::{AccountId, TenantId};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/accounts",
            get(list_accounts).post(create_account),
        )
        .route("/tenants/{tenant_id}/accounts/seed", post(seed_default_chart))
        .route("/tenants/{tenant_id}/accounts/{account_id}", get(get_account))
        .route(
            "/tenants/{tenant_id}/accounts/{account_id}/deactivate",
            post(deactivate_account),
        )
        .route(
            "/tenants/{tenant_id}/accounts/{account_id}/ledger",
            get(account_ledger),
        )
}

/// Query parameters for listing accounts.
#[derive(Debug, Default, Deserialize)]
pub struct ListAccountsQuery {
    /// Include deactivated accounts.
    #[serde(default)]
    pub include_inactive: bool,
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Hierarchical code, e.g. `1-1003`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account class.
    pub account_type: AccountType,
    /// Optional explicit normal balance.
    #[serde(default)]
    pub normal_balance: Option<NormalBalance>,
    /// Parent header code.
    #[serde(default)]
    pub parent_code: Option<String>,
    /// Aggregation node flag.
    #[serde(default)]
    pub is_header: bool,
}

/// Query parameters for the account ledger.
#[derive(Debug, Default, Deserialize)]
pub struct LedgerQuery {
    /// First date (inclusive).
    pub from: Option<NaiveDate>,
    /// Last date (inclusive).
    pub to: Option<NaiveDate>,
}

/// GET `/tenants/{tenant_id}/accounts`
async fn list_accounts(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<Vec<Account>>, ApiError> {
    let repo = AccountRepository::new((*state.db).clone());
    let accounts = repo.list_accounts(tenant_id, query.include_inactive).await?;
    Ok(Json(accounts))
}

/// POST `/tenants/{tenant_id}/accounts`
async fn create_account(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>), ApiError> {
    let repo = AccountRepository::new((*state.db).clone());
    let account = repo
        .create_account(NewAccount {
            tenant_id,
            code: payload.code,
            name: payload.name,
            account_type: payload.account_type,
            normal_balance: payload.normal_balance,
            parent_code: payload.parent_code,
            is_header: payload.is_header,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET `/tenants/{tenant_id}/accounts/{account_id}`
async fn get_account(
    State(state): State<AppState>,
    Path((tenant_id, account_id)): Path<(TenantId, AccountId)>,
) -> Result<Json<Account>, ApiError> {
    let repo = AccountRepository::new((*state.db).clone());
    Ok(Json(repo.find_account(tenant_id, account_id).await?))
}

/// POST `/tenants/{tenant_id}/accounts/{account_id}/deactivate`
async fn deactivate_account(
    State(state): State<AppState>,
    Path((tenant_id, account_id)): Path<(TenantId, AccountId)>,
) -> Result<Json<Account>, ApiError> {
    let repo = AccountRepository::new((*state.db).clone());
    Ok(Json(repo.deactivate_account(tenant_id, account_id).await?))
}

/// POST `/tenants/{tenant_id}/accounts/seed`
async fn seed_default_chart(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
) -> Result<(StatusCode, Json<Vec<Account>>), ApiError> {
    let repo = AccountRepository::new((*state.db).clone());
    let accounts = repo.seed_default_chart(tenant_id).await?;
    Ok((StatusCode::CREATED, Json(accounts)))
}

/// GET `/tenants/{tenant_id}/accounts/{account_id}/ledger`
async fn account_ledger(
    State(state): State<AppState>,
    Path((tenant_id, account_id)): Path<(TenantId, AccountId)>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<AccountLedger>, ApiError> {
    let repo = ReportRepository::new((*state.db).clone());
    let ledger = repo
        .account_ledger(tenant_id, account_id, query.from, query.to)
        .await?;
    Ok(Json(ledger))
}
