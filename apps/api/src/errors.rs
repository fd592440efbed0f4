use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::search::SearchError;

/// A profile payload failed validation. Carries the offending field so
/// callers can point the user at it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid field '{field}': {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the matching pipeline to its caller.
///
/// Scoring failures never appear here: the scorer always recovers via the
/// heuristic fallback.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("search unavailable after {attempts} attempts: {last_error}")]
    SearchUnavailable { attempts: u32, last_error: String },

    #[error("search failed: {0}")]
    Search(SearchError),
}

impl From<SearchError> for MatchError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Unavailable {
                attempts,
                last_error,
            } => MatchError::SearchUnavailable {
                attempts,
                last_error,
            },
            other => MatchError::Search(other),
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Search unavailable: {0}")]
    SearchUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::Validation(e) => AppError::Validation(e),
            e @ MatchError::SearchUnavailable { .. } => AppError::SearchUnavailable(e.to_string()),
            MatchError::Search(e) => AppError::Internal(anyhow::anyhow!(e)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                e.to_string(),
            ),
            AppError::SearchUnavailable(msg) => {
                tracing::error!("Search unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SEARCH_UNAVAILABLE",
                    "The search provider is currently unavailable".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
