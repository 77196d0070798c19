//! Accounting period routes.
//!
//! Periods are created open and closed once; there is no reopen route.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use koperasi_core::period::{AccountingPeriod, NewPeriod};
use koperasi_db::PeriodRepository;
use koperasi_shared::types::{PeriodId, TenantId, UserId};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

/// Creates the period routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/periods",
            get(list_periods).post(create_period),
        )
        .route("/tenants/{tenant_id}/periods/{period_id}", get(get_period))
        .route("/tenants/{tenant_id}/periods/{period_id}/close", post(close_period))
        .route("/tenants/{tenant_id}/fiscal-years", post(create_fiscal_year))
}

/// Request body for creating a period.
#[derive(Debug, Deserialize)]
pub struct CreatePeriodRequest {
    /// Display name, e.g. "Januari 2025".
    pub name: String,
    /// First day (YYYY-MM-DD).
    pub start_date: NaiveDate,
    /// Last day (YYYY-MM-DD).
    pub end_date: NaiveDate,
}

/// Request body for creating a fiscal year of monthly periods.
#[derive(Debug, Deserialize)]
pub struct CreateFiscalYearRequest {
    /// First day of the fiscal year.
    pub start_date: NaiveDate,
    /// Last day of the fiscal year.
    pub end_date: NaiveDate,
}

/// Request body for closing a period.
#[derive(Debug, Deserialize)]
pub struct ClosePeriodRequest {
    /// User closing the period.
    pub closed_by: UserId,
}

/// GET `/tenants/{tenant_id}/periods`
async fn list_periods(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
) -> Result<Json<Vec<AccountingPeriod>>, ApiError> {
    let repo = PeriodRepository::new((*state.db).clone());
    Ok(Json(repo.list_periods(tenant_id).await?))
}

/// POST `/tenants/{tenant_id}/periods`
async fn create_period(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    Json(payload): Json<CreatePeriodRequest>,
) -> Result<(StatusCode, Json<AccountingPeriod>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Period name must not be empty"));
    }

    let repo = PeriodRepository::new((*state.db).clone());
    let period = repo
        .create_period(NewPeriod {
            tenant_id,
            name: payload.name.trim().to_string(),
            start_date: payload.start_date,
            end_date: payload.end_date,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(period)))
}

/// GET `/tenants/{tenant_id}/periods/{period_id}`
async fn get_period(
    State(state): State<AppState>,
    Path((tenant_id, period_id)): Path<(TenantId, PeriodId)>,
) -> Result<Json<AccountingPeriod>, ApiError> {
    let repo = PeriodRepository::new((*state.db).clone());
    Ok(Json(repo.find_period(tenant_id, period_id).await?))
}

/// POST `/tenants/{tenant_id}/periods/{period_id}/close`
async fn close_period(
    State(state): State<AppState>,
    Path((tenant_id, period_id)): Path<(TenantId, PeriodId)>,
    Json(payload): Json<ClosePeriodRequest>,
) -> Result<Json<AccountingPeriod>, ApiError> {
    let repo = PeriodRepository::new((*state.db).clone());
    let period = repo.close_period(tenant_id, period_id, payload.closed_by).await?;
    Ok(Json(period))
}

/// POST `/tenants/{tenant_id}/fiscal-years`
async fn create_fiscal_year(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    Json(payload): Json<CreateFiscalYearRequest>,
) -> Result<(StatusCode, Json<Vec<AccountingPeriod>>), ApiError> {
    let repo = PeriodRepository::new((*state.db).clone());
    let periods = repo
        .create_fiscal_year(tenant_id, payload.start_date, payload.end_date)
        .await?;
    Ok((StatusCode::CREATED, Json(periods)))
}
