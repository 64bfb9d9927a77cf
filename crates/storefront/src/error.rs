//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side failures to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`, and every variant renders the JSON envelope:
//!
//! ```text
//! {"success": false, "error": "<message>"}
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use marketplace_core::Envelope;
use thiserror::Error;

use crate::backend::BackendError;
use crate::services::auth::AuthError;

/// Application-level error type for the gateway.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request from client (field-specific message).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Caller is authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Backend could not be reached or is misrouted.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Backend answered with something we cannot interpret.
    #[error("Bad gateway: {message}")]
    BadGateway {
        message: String,
        details: Option<String>,
    },

    /// Backend rejected the request; its status is passed through.
    #[error("Upstream {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unavailable { base, .. } => Self::Unavailable(unavailable_message(&base)),
            BackendError::Client(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                Self::BadRequest("Email and password are required".to_string())
            }
            AuthError::Validation(message) => Self::BadRequest(message),
            AuthError::Backend(e) => e.into(),
            AuthError::RouteNotFound { route, url } => Self::Unavailable(format!(
                "{route} route not found at {url}. Check that API_URL points at the PHP API server."
            )),
            AuthError::InvalidResponse { snippet } => Self::BadGateway {
                message: "Backend returned an invalid response".to_string(),
                details: Some(snippet),
            },
            AuthError::Rejected { status, message } => Self::Upstream { status, message },
            AuthError::MissingToken => Self::BadGateway {
                message: "Backend response did not include a token".to_string(),
                details: None,
            },
            AuthError::NotAdmin => {
                Self::Forbidden("Access denied. Admin privileges required.".to_string())
            }
        }
    }
}

/// Message returned whenever the backend cannot be reached.
#[must_use]
pub fn unavailable_message(base: &str) -> String {
    format!("Backend unavailable. Start PHP API server at {base}")
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            Self::Upstream { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(_) | Self::BadGateway { .. } => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Request error"
                );
            }
            Self::Unavailable(_) => tracing::warn!(error = %self, "Backend unavailable"),
            _ => {}
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let envelope: Envelope = match self {
            Self::Internal(_) => Envelope::error("Internal server error"),
            Self::BadGateway { message, details } => {
                let envelope = Envelope::error(message);
                match details {
                    Some(details) => envelope.details(details),
                    None => envelope,
                }
            }
            Self::BadRequest(message)
            | Self::Forbidden(message)
            | Self::Unavailable(message)
            | Self::Upstream { message, .. } => Envelope::error(message),
        };

        (status, Json(envelope)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after a successful login.
pub fn set_sentry_user(email: Option<&str>, role: Option<&str>) {
    sentry::configure_scope(|scope| {
        let mut user = sentry::User {
            email: email.map(String::from),
            ..Default::default()
        };
        if let Some(role) = role {
            user.other
                .insert("role".to_string(), serde_json::Value::String(role.to_string()));
        }
        scope.set_user(Some(user));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
