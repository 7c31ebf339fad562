//! Unified error handling with Sentry integration.
//!
//! Page handlers return `Result<T, AppError>`. Backend and internal failures
//! are captured to Sentry; the visitor sees a short plain-text message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::ApiError;
use crate::session::{LoaderError, LoaderErrorKind};

/// Application-level error type for the dashboard.
#[derive(Debug, Error)]
pub enum AppError {
    /// A page loader failed.
    #[error("Loader error: {0}")]
    Loader(#[from] LoaderError),

    /// A backend call outside a loader failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Loader(err) => match err.kind() {
                LoaderErrorKind::AuthToken => StatusCode::UNAUTHORIZED,
                LoaderErrorKind::Backend => StatusCode::BAD_GATEWAY,
                LoaderErrorKind::Other => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Api(err) if err.is_unauthorized() => StatusCode::UNAUTHORIZED,
            Self::Api(_) => StatusCode::BAD_GATEWAY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to visitors
        let message = match &self {
            Self::BadRequest(msg) => msg.clone(),
            _ if status == StatusCode::UNAUTHORIZED => "Session expired".to_string(),
            _ if status == StatusCode::BAD_GATEWAY => "Backend unavailable".to_string(),
            _ => "Internal server error".to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
