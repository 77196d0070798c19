//! Reporting routes: balances, trial balance and financial statements.
//!
//! `to` falls back to `as_of`, then to today. Without `from` a report runs
//! from the tenant's first journal.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::{NaiveDate, Utc};
use koperasi_core::ledger::{AccountBalance, TrialBalance, roll_up_headers};
use koperasi_core::statements::{
    BalanceSheet, CashFlowStatement, EquityChanges, FinancialRatios, FinancialStatements,
    IncomeStatement, PeriodStatements,
};
use koperasi_db::ReportRepository;
use koperasi_shared::types::{PeriodId, TenantId};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{AppState, error::ApiError};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tenants/{tenant_id}/reports/balances", get(balances))
        .route("/tenants/{tenant_id}/reports/trial-balance", get(trial_balance))
        .route("/tenants/{tenant_id}/reports/balance-sheet", get(balance_sheet))
        .route("/tenants/{tenant_id}/reports/income-statement", get(income_statement))
        .route("/tenants/{tenant_id}/reports/cash-flow", get(cash_flow))
        .route("/tenants/{tenant_id}/reports/equity-changes", get(equity_changes))
        .route("/tenants/{tenant_id}/reports/ratios", get(ratios))
        .route("/tenants/{tenant_id}/reports/statements", get(statements))
        .route("/tenants/{tenant_id}/reports/comparison", get(comparison))
}

/// Query parameters shared by the report endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// Period start (inclusive).
    pub from: Option<NaiveDate>,
    /// Period end (inclusive).
    pub to: Option<NaiveDate>,
    /// Alias for `to`.
    pub as_of: Option<NaiveDate>,
    /// Overrides the derived opening cash of the cash flow statement.
    pub beginning_cash: Option<Decimal>,
    /// Fill header accounts with the sum of their descendants.
    #[serde(default)]
    pub rollup: bool,
}

impl ReportQuery {
    fn end_date(&self) -> NaiveDate {
        self.to
            .or(self.as_of)
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Query parameters for the period comparison.
#[derive(Debug, Deserialize)]
pub struct ComparisonQuery {
    /// Comma-separated period ids, in display order.
    pub periods: String,
}

fn parse_period_ids(raw: &str) -> Result<Vec<PeriodId>, ApiError> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<PeriodId>()
                .map_err(|_| ApiError::validation(format!("Invalid period id: {s}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if ids.is_empty() {
        return Err(ApiError::validation("At least one period id is required"));
    }
    Ok(ids)
}

/// GET `/tenants/{tenant_id}/reports/balances`
async fn balances(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<AccountBalance>>, ApiError> {
    let repo = ReportRepository::new((*state.db).clone());
    let to = query.end_date();
    let balances = match query.from {
        Some(from) => repo.balances_between(tenant_id, from, to).await?,
        None => repo.balances_as_of(tenant_id, to).await?,
    };

    if query.rollup {
        return Ok(Json(roll_up_headers(&balances)));
    }
    Ok(Json(balances))
}

/// GET `/tenants/{tenant_id}/reports/trial-balance`
async fn trial_balance(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<TrialBalance>, ApiError> {
    let repo = ReportRepository::new((*state.db).clone());
    Ok(Json(repo.trial_balance(tenant_id, query.end_date()).await?))
}

async fn generate(
    state: &AppState,
    tenant_id: TenantId,
    query: &ReportQuery,
) -> Result<FinancialStatements, ApiError> {
    let repo = ReportRepository::new((*state.db).clone());
    let statements = repo
        .financial_statements(
            tenant_id,
            query.from,
            query.end_date(),
            query.beginning_cash,
            &state.rules,
        )
        .await?;
    Ok(statements)
}

/// GET `/tenants/{tenant_id}/reports/balance-sheet`
async fn balance_sheet(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<BalanceSheet>, ApiError> {
    let statements = generate(&state, tenant_id, &query).await?;
    Ok(Json(statements.balance_sheet))
}

/// GET `/tenants/{tenant_id}/reports/income-statement`
async fn income_statement(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<IncomeStatement>, ApiError> {
    let statements = generate(&state, tenant_id, &query).await?;
    Ok(Json(statements.income_statement))
}

/// GET `/tenants/{tenant_id}/reports/cash-flow`
async fn cash_flow(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<CashFlowStatement>, ApiError> {
    let statements = generate(&state, tenant_id, &query).await?;
    Ok(Json(statements.cash_flow))
}

/// GET `/tenants/{tenant_id}/reports/equity-changes`
async fn equity_changes(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<EquityChanges>, ApiError> {
    let statements = generate(&state, tenant_id, &query).await?;
    Ok(Json(statements.equity_changes))
}

/// GET `/tenants/{tenant_id}/reports/ratios`
async fn ratios(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<FinancialRatios>, ApiError> {
    let statements = generate(&state, tenant_id, &query).await?;
    Ok(Json(statements.ratios))
}

/// GET `/tenants/{tenant_id}/reports/statements`
async fn statements(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<FinancialStatements>, ApiError> {
    Ok(Json(generate(&state, tenant_id, &query).await?))
}

/// GET `/tenants/{tenant_id}/reports/comparison?periods=a,b`
async fn comparison(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    Query(query): Query<ComparisonQuery>,
) -> Result<Json<Vec<PeriodStatements>>, ApiError> {
    let period_ids = parse_period_ids(&query.periods)?;
    let repo = ReportRepository::new((*state.db).clone());
    let comparison = repo
        .compare_periods(tenant_id, &period_ids, &state.rules)
        .await?;
    Ok(Json(comparison))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_period_ids_keeps_order() {
        let a = PeriodId::new();
        let b = PeriodId::new();
        let ids = parse_period_ids(&format!("{b}, {a}")).unwrap();
        assert_eq!(ids, vec![b, a]);
    }

    #[test]
    fn test_parse_period_ids_rejects_garbage() {
        let err = parse_period_ids("not-a-uuid").unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_parse_period_ids_requires_one() {
        assert!(parse_period_ids(" , ").is_err());
    }

    #[test]
    fn test_end_date_prefers_to_over_as_of() {
        let query = ReportQuery {
            to: NaiveDate::from_ymd_opt(2025, 3, 31),
            as_of: NaiveDate::from_ymd_opt(2025, 1, 31),
            ..ReportQuery::default()
        };
        assert_eq!(query.end_date(), NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());

        let query = ReportQuery {
            as_of: NaiveDate::from_ymd_opt(2025, 1, 31),
            ..ReportQuery::default()
        };
        assert_eq!(query.end_date(), NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
    }
}
