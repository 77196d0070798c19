//! HTTP API layer with Axum routes.
//!
//! This crate exposes the ledger to producer subsystems (point of sale,
//! loans, savings, bill payments, rentals). The tenant is explicit in every
//! path; authentication is handled in front of this service.

pub mod error;
pub mod routes;

use axum::Router;
use koperasi_core::statements::{ClassificationRules, RuleError};
use koperasi_shared::config::{ConfigError, LedgerConfig};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Invalid ledger configuration.
#[derive(Debug, Error)]
pub enum StateError {
    /// A classification rule is invalid.
    #[error(transparent)]
    Rules(#[from] RuleError),
    /// A ledger setting the store cannot honour.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Statement classification table.
    pub rules: Arc<ClassificationRules>,
    /// Decimal places journal amounts are rounded to.
    pub currency_scale: u32,
}

impl AppState {
    /// Builds the state from a connection and the ledger configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured classification rule is invalid or
    /// `currency_scale` is finer than the store keeps.
    pub fn new(db: DatabaseConnection, ledger: &LedgerConfig) -> Result<Self, StateError> {
        ledger.validate()?;
        let rules = ClassificationRules::from_config(&ledger.classification_rules)?;
        Ok(Self {
            db: Arc::new(db),
            rules: Arc::new(rules),
            currency_scale: ledger.currency_scale,
        })
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
