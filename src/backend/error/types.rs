/**
 * Backend Error Types
 *
 * Every failure a handler can return, with the HTTP status and the stable
 * `category` string clients switch on.
 *
 * # Error Categories
 *
 * | Category | Status | Meaning |
 * |---|---|---|
 * | `route_not_found` | 404 | route has no content; provision it |
 * | `content_not_found` | 404 | edit target has no content |
 * | `upstream_unavailable` | 503 | backing store failed; retry later |
 * | `malformed_content` | 502 | stored content has the wrong shape |
 * | `patch_conflict` | 409 | patch path runs into a non-object |
 * | `unparseable_instruction` | 422 | instruction was not understood |
 * | `token_expired` | 401 | session token expired |
 * | `token_invalid` | 401 | session token missing or invalid |
 * | `bad_request` | 400 | malformed request or unknown backend |
 */

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::auth::AuthError;
use crate::layout::LayoutError;
use crate::shared::SharedError;

#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g. unknown backend, malformed body)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Resolve, patch or provisioning failure
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Session token rejected
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Shared error (bad mode, bad route name, ...)
    #[error(transparent)]
    SharedError(#[from] SharedError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Layout(err) => match err {
                LayoutError::RouteNotFound { .. } | LayoutError::ContentNotFound { .. } => {
                    StatusCode::NOT_FOUND
                }
                LayoutError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                LayoutError::MalformedContent { .. } => StatusCode::BAD_GATEWAY,
                LayoutError::PatchConflict(_) => StatusCode::CONFLICT,
                LayoutError::UnparseableInstruction(_) => StatusCode::UNPROCESSABLE_ENTITY,
                LayoutError::RouteExists { .. }
                | LayoutError::ProtectedRoute { .. }
                | LayoutError::Invalid(_) => StatusCode::BAD_REQUEST,
            },
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::SharedError(SharedError::ValidationError { .. }) => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable machine-readable category
    pub fn category(&self) -> &'static str {
        match self {
            Self::HandlerError { status, .. } => match *status {
                StatusCode::BAD_REQUEST => "bad_request",
                StatusCode::UNAUTHORIZED => "token_invalid",
                StatusCode::NOT_FOUND => "not_found",
                _ => "internal",
            },
            Self::Layout(err) => err.category(),
            Self::Auth(AuthError::Expired) => "token_expired",
            Self::Auth(_) => "token_invalid",
            Self::SharedError(SharedError::ValidationError { .. }) => "bad_request",
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::Layout(err) => err.to_string(),
            Self::Auth(err) => err.to_string(),
            Self::SharedError(err) => err.to_string(),
        }
    }
}

impl From<JsonRejection> for BackendError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for BackendError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for BackendError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}
