//! Admin authentication extractor.
//!
//! Asks the backend who owns the caller's token and decides whether the
//! request may continue. The backend still checks the token on every
//! proxied call, so this only decides what to show.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

use marketplace_core::Role;

use crate::backend::bearer_token_for_path;
use crate::services::auth::{AuthService, CurrentUser};
use crate::state::AppState;

use super::ADMIN_LOGIN_PAGE;

/// Backend route that reports the token's owner.
const WHO_AM_I: &str = "auth/me";

/// What to do with a request after asking the backend.
#[derive(Debug)]
pub enum GateDecision {
    /// Caller is an admin.
    Allow(CurrentUser),
    /// No usable session.
    RedirectToLogin,
    /// Signed in, but not as an admin.
    RedirectToDashboard(Role),
}

impl GateDecision {
    /// Decide from the backend's answer.
    ///
    /// `None` covers every failure: unreachable backend, non-2xx reply, or a
    /// reply without a recognizable role.
    #[must_use]
    pub fn from_user(user: Option<CurrentUser>) -> Self {
        match user {
            None => Self::RedirectToLogin,
            Some(user) if user.role == Role::Admin => Self::Allow(user),
            Some(user) => Self::RedirectToDashboard(user.role),
        }
    }
}

/// Extractor that requires an admin session.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     Json(admin.user)
/// }
/// ```
pub struct RequireAdmin(pub CurrentUser);

/// Rejection for [`RequireAdmin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    /// Redirect to the admin login page.
    RedirectToLogin,
    /// Redirect to the caller's own dashboard.
    RedirectToDashboard(Role),
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(ADMIN_LOGIN_PAGE).into_response(),
            Self::RedirectToDashboard(role) => Redirect::to(role.dashboard_path()).into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = GateRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token_for_path(&parts.headers, WHO_AM_I);

        let user = AuthService::new(state.backend())
            .current_user(token.as_deref())
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Admin gate could not reach backend");
                None
            });

        match GateDecision::from_user(user) {
            GateDecision::Allow(user) => Ok(Self(user)),
            GateDecision::RedirectToLogin => {
                debug!(path = %parts.uri.path(), "Admin gate: no session");
                Err(GateRejection::RedirectToLogin)
            }
            GateDecision::RedirectToDashboard(role) => {
                debug!(%role, "Admin gate: not an admin");
                Err(GateRejection::RedirectToDashboard(role))
            }
        }
    }
}
