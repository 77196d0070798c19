//! Error responses.
//!
//! Every failure renders as `{"error": <CODE>, "message": <text>,
//! "retryable": <bool>}` with the status code of the underlying domain error.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use koperasi_core::coa::CoaError;
use koperasi_core::ledger::LedgerError;
use koperasi_core::period::PeriodError;
use koperasi_db::{AccountRepoError, PeriodRepoError, ReportError};
use koperasi_shared::AppError;
use serde_json::json;

/// An error rendered as a JSON response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    retryable: bool,
}

impl ApiError {
    fn new(status: u16, code: &'static str, message: String, retryable: bool) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code,
            message,
            retryable,
        }
    }

    /// Malformed request input.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into()).into()
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.code, message = %self.message, "request failed");
        }
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message,
                "retryable": self.retryable,
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::new(err.status_code(), err.error_code(), err.to_string(), err.is_retryable())
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::new(err.http_status_code(), err.error_code(), err.to_string(), err.is_retryable())
    }
}

impl From<CoaError> for ApiError {
    fn from(err: CoaError) -> Self {
        Self::new(err.http_status_code(), err.error_code(), err.to_string(), false)
    }
}

impl From<PeriodError> for ApiError {
    fn from(err: PeriodError) -> Self {
        Self::new(err.http_status_code(), err.error_code(), err.to_string(), false)
    }
}

impl From<AccountRepoError> for ApiError {
    fn from(err: AccountRepoError) -> Self {
        match err {
            AccountRepoError::Coa(err) => err.into(),
            AccountRepoError::NotFound(id) => AppError::NotFound(format!("Account {id}")).into(),
            AccountRepoError::Database(err) => AppError::Database(err.to_string()).into(),
        }
    }
}

impl From<PeriodRepoError> for ApiError {
    fn from(err: PeriodRepoError) -> Self {
        match err {
            PeriodRepoError::Period(err) => err.into(),
            PeriodRepoError::Database(err) => AppError::Database(err.to_string()).into(),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::AccountNotFound(_) | ReportError::PeriodNotFound(_) => {
                AppError::NotFound(err.to_string()).into()
            }
            ReportError::InvalidRange { .. } => AppError::Validation(err.to_string()).into(),
            ReportError::Database(err) => AppError::Database(err.to_string()).into(),
        }
    }
}
