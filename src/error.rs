// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.
//!
//! The document store enforces no foreign keys, so reference and ownership
//! failures are detected in the service layer and surfaced here as typed
//! errors. No failure path returns a default/empty success.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A child identifier submitted with a parent payload does not resolve.
    #[error("Dangling reference: {0}")]
    DanglingReference(String),

    /// A child document already belongs to a different parent.
    #[error("Ownership conflict: {0}")]
    OwnershipConflict(String),

    /// Delete blocked because other documents still reference the target.
    #[error("Entity in use: {0}")]
    ReferencedEntityInUse(String),

    /// Mutation attempted on a session in a terminal state.
    #[error("Session is immutable: {0}")]
    SessionImmutable(String),

    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// Transient store failure (timeout, connectivity). Retryable by caller.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A composite write failed and the compensating cleanup failed too.
    /// Carries the child ids left behind so an operator can run repair.
    #[error("Partial write could not be rolled back, orphaned ids: {orphaned:?}")]
    PartialWriteUnrecovered { orphaned: Vec<String> },

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    orphaned_ids: Option<Vec<String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details, orphaned) = match &self {
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, "not_found", Some(msg.clone()), None)
            }
            AppError::DanglingReference(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "dangling_reference",
                Some(msg.clone()),
                None,
            ),
            AppError::OwnershipConflict(msg) => (
                StatusCode::CONFLICT,
                "ownership_conflict",
                Some(msg.clone()),
                None,
            ),
            AppError::ReferencedEntityInUse(msg) => (
                StatusCode::CONFLICT,
                "entity_in_use",
                Some(msg.clone()),
                None,
            ),
            AppError::SessionImmutable(msg) => (
                StatusCode::CONFLICT,
                "session_immutable",
                Some(msg.clone()),
                None,
            ),
            AppError::InvalidTransition { .. } => (
                StatusCode::CONFLICT,
                "invalid_transition",
                Some(self.to_string()),
                None,
            ),
            AppError::StoreUnavailable(msg) => {
                tracing::error!(error = %msg, "Store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "store_unavailable",
                    None,
                    None,
                )
            }
            AppError::PartialWriteUnrecovered { orphaned } => {
                tracing::error!(orphaned = ?orphaned, "Partial write left orphaned children");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "partial_write_unrecovered",
                    None,
                    Some(orphaned.clone()),
                )
            }
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                Some(msg.clone()),
                None,
            ),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    None,
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
            orphaned_ids: orphaned,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers and services
pub type Result<T> = std::result::Result<T, AppError>;
