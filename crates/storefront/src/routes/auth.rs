//! Authentication route handlers.
//!
//! Credentials are relayed to the backend; on success the backend token is
//! stored in cookies so that later proxied calls can carry it.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use marketplace_core::{Envelope, Role};

use crate::cookies::{
    ADMIN_SESSION_MAX_AGE, AuthSession, CookiePolicy, SetCookies, USER_SESSION_MAX_AGE,
};
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::services::auth::{AuthError, AuthOutcome, AuthService, Registration};
use crate::state::AppState;

/// Successful auth response: status, cookies, and `{success, user}`.
type AuthResponse = (StatusCode, SetCookies, Json<Envelope>);

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration request body.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
    pub promo_code: Option<String>,
}

/// Unreadable login bodies get the same answer as blank credentials.
fn login_body(body: std::result::Result<Json<LoginRequest>, JsonRejection>) -> Result<LoginRequest> {
    body.map(|Json(request)| request)
        .map_err(|_| AuthError::MissingCredentials.into())
}

/// Cookie values for a login outcome.
///
/// Falls back to the submitted email when the backend omits it.
fn session_for(outcome: &AuthOutcome, submitted_email: &str, role: &str) -> Result<AuthSession> {
    let token = outcome.token.clone().ok_or(AuthError::MissingToken)?;
    let email = outcome
        .summary
        .email
        .clone()
        .unwrap_or_else(|| submitted_email.trim().to_string());
    Ok(AuthSession {
        token,
        email,
        role: role.to_string(),
    })
}

/// Admin login.
///
/// POST /api/auth/admin-login
///
/// Sets the admin cookies and the generic auth cookies for one day. Non-admin
/// accounts get 403 and no cookies.
///
/// # Errors
///
/// See [`AppError`]'s conversion from [`AuthError`].
pub async fn admin_login(
    State(state): State<AppState>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<AuthResponse> {
    let request = login_body(body)?;

    let outcome = AuthService::new(state.backend())
        .admin_login(&request.email, &request.password)
        .await?;

    let session = session_for(&outcome, &request.email, Role::Admin.as_str())?;
    let policy = state.cookie_policy();
    let mut cookies = policy.admin_cookies(&session, ADMIN_SESSION_MAX_AGE);
    cookies.extend(policy.auth_cookies(&session, ADMIN_SESSION_MAX_AGE));

    set_sentry_user(Some(&session.email), Some(Role::Admin.as_str()));
    info!("Admin logged in");

    Ok((
        StatusCode::OK,
        SetCookies(cookies),
        Json(Envelope::with_user(outcome.user)),
    ))
}

/// Seller or customer login.
///
/// POST /api/auth/login
///
/// Sets the auth cookies for seven days. Admins logging in here also get the
/// admin cookies.
///
/// # Errors
///
/// See [`AppError`]'s conversion from [`AuthError`].
pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<AuthResponse> {
    let request = login_body(body)?;

    let outcome = AuthService::new(state.backend())
        .login(&request.email, &request.password)
        .await?;

    let role = outcome.summary.role.clone().unwrap_or_default();
    let session = session_for(&outcome, &request.email, &role)?;
    let cookies = login_cookies(state.cookie_policy(), &session, outcome.summary.is_admin());

    set_sentry_user(Some(&session.email), Some(&role));
    info!(role = %role, "User logged in");

    Ok((
        StatusCode::OK,
        SetCookies(cookies),
        Json(Envelope::with_user(outcome.user)),
    ))
}

fn login_cookies(
    policy: CookiePolicy,
    session: &AuthSession,
    is_admin: bool,
) -> Vec<tower_sessions::cookie::Cookie<'static>> {
    let mut cookies = policy.auth_cookies(session, USER_SESSION_MAX_AGE);
    if is_admin {
        cookies.extend(policy.admin_cookies(session, USER_SESSION_MAX_AGE));
    }
    cookies
}

/// Self-service registration.
///
/// POST /api/auth/register
///
/// Validates the fields locally, forwards to the backend, and answers 201.
/// When the backend issues a token the auth cookies are set as for login.
///
/// # Errors
///
/// Returns 400 with a field-specific message for invalid input, otherwise
/// see [`AppError`]'s conversion from [`AuthError`].
pub async fn register(
    State(state): State<AppState>,
    body: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<AuthResponse> {
    let Json(request) =
        body.map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e.body_text())))?;

    let registration = Registration::validate(
        &request.name,
        &request.email,
        &request.password,
        request.role.as_deref(),
        request.promo_code.as_deref(),
    )?;

    let outcome = AuthService::new(state.backend())
        .register(&registration)
        .await?;

    let cookies = match &outcome.token {
        Some(_) => {
            let role = outcome
                .summary
                .role
                .clone()
                .unwrap_or_else(|| registration.role.as_str().to_string());
            let session = session_for(&outcome, registration.email.as_str(), &role)?;
            state
                .cookie_policy()
                .auth_cookies(&session, USER_SESSION_MAX_AGE)
        }
        None => Vec::new(),
    };

    info!(role = %registration.role, "User registered");

    let user = match outcome.user {
        Value::Null => registration_echo(&registration),
        user => user,
    };

    Ok((
        StatusCode::CREATED,
        SetCookies(cookies),
        Json(Envelope::with_user(user)),
    ))
}

/// The submitted fields, for backends that return no user object.
fn registration_echo(registration: &Registration) -> Value {
    serde_json::json!({
        "name": registration.name,
        "email": registration.email.as_str(),
        "role": registration.role.as_str(),
    })
}

/// Logout.
///
/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>) -> (SetCookies, Json<Envelope>) {
    clear_sentry_user();
    (
        SetCookies(state.cookie_policy().cleared_cookies()),
        Json(Envelope::empty()),
    )
}
