//! API route definitions.
//!
//! Tenant-scoped resources live under `/tenants/{tenant_id}`.

use axum::Router;

use crate::AppState;

pub mod accounts;
pub mod health;
pub mod journals;
pub mod periods;
pub mod reports;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(periods::routes())
        .merge(journals::routes())
        .merge(reports::routes())
}
