//! Giveaway engine error types with HTTP status code mapping.
//!
//! [`GiveawayError`] is the central error type for the engine. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{GiveawayId, UserId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2003,
///     "message": "user 42 already entered giveaway ...",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`GiveawayError`] code ranges).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Engine error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 / 503                    |
#[derive(Debug, thiserror::Error)]
pub enum GiveawayError {
    /// Malformed input such as a bad duration string or winner count.
    #[error("invalid request: {0}")]
    Validation(String),

    /// No giveaway with the given ID exists.
    #[error("giveaway not found: {0}")]
    NotFound(GiveawayId),

    /// Entry attempted after the end time or on a completed giveaway.
    #[error("giveaway {0} is no longer accepting entries")]
    NotActive(GiveawayId),

    /// The user already holds an entry in this giveaway.
    #[error("user {user_id} already entered giveaway {giveaway_id}")]
    DuplicateEntry {
        /// Giveaway entered.
        giveaway_id: GiveawayId,
        /// Repeat entrant.
        user_id: UserId,
    },

    /// Reroll attempted on a giveaway that is still active.
    #[error("giveaway {0} has not completed yet")]
    NotCompleted(GiveawayId),

    /// Reroll attempted with fewer candidates than winners requested.
    #[error("not enough entries to reroll: {available} available, {requested} requested")]
    InsufficientEntries {
        /// Candidates available for the draw.
        available: usize,
        /// Winners the giveaway asks for.
        requested: u32,
    },

    /// The persistence layer could not be reached or failed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GiveawayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::NotFound(_) => 2001,
            Self::NotActive(_) => 2002,
            Self::DuplicateEntry { .. } => 2003,
            Self::NotCompleted(_) => 2004,
            Self::InsufficientEntries { .. } => 2005,
            Self::StoreUnavailable(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::NotActive(_)
            | Self::DuplicateEntry { .. }
            | Self::NotCompleted(_)
            | Self::InsufficientEntries { .. } => StatusCode::CONFLICT,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for GiveawayError {
    fn from(e: sqlx::Error) -> Self {
        Self::StoreUnavailable(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for GiveawayError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        Self::StoreUnavailable(format!("migration failed: {e}"))
    }
}

impl IntoResponse for GiveawayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
