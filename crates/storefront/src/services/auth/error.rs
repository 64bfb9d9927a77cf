//! Authentication error types.

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::BackendError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password missing from the request.
    #[error("email and password are required")]
    MissingCredentials,

    /// A registration field failed validation.
    #[error("{0}")]
    Validation(String),

    /// Backend could not be reached.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Backend answered 404 for an auth route; the base URL is likely wrong.
    #[error("{route} route not found at {url}")]
    RouteNotFound { route: &'static str, url: String },

    /// Backend body was not JSON.
    #[error("backend returned a non-JSON response")]
    InvalidResponse { snippet: String },

    /// Backend refused the request.
    #[error("backend rejected request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    /// Backend reported success without a token.
    #[error("backend response did not include a token")]
    MissingToken,

    /// The user authenticated but is not an admin.
    #[error("admin privileges required")]
    NotAdmin,
}

impl From<marketplace_core::EmailError> for AuthError {
    fn from(_: marketplace_core::EmailError) -> Self {
        Self::Validation("Invalid email address".to_string())
    }
}

impl From<marketplace_core::PasswordError> for AuthError {
    fn from(err: marketplace_core::PasswordError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<marketplace_core::PromoCodeError> for AuthError {
    fn from(err: marketplace_core::PromoCodeError) -> Self {
        Self::Validation(err.to_string())
    }
}
