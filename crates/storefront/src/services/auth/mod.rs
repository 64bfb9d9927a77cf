//! Authentication service.
//!
//! Credentials are never checked locally: login and registration are relayed
//! to the backend's `auth/*` routes and this service only interprets the
//! replies. The interpretation is shared by every auth route so they report
//! backend trouble the same way:
//!
//! | Backend reply                         | Result                          |
//! |---------------------------------------|---------------------------------|
//! | no response                           | `AuthError::Backend`            |
//! | 404                                   | `AuthError::RouteNotFound`      |
//! | body is not JSON                      | `AuthError::InvalidResponse`    |
//! | non-2xx, or `success` is not `true`   | `AuthError::Rejected`           |
//! | success                               | [`AuthOutcome`]                 |

mod error;

pub use error::AuthError;

use axum::http::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use marketplace_core::{Email, PromoCode, Role, UserSummary, validate_password};

use crate::backend::{BackendClient, BackendReply};

/// A successful login or registration as reported by the backend.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    /// Bearer token, if the backend issued one.
    pub token: Option<String>,
    /// The backend's user object, relayed to the client unchanged.
    pub user: Value,
    /// Decoded fields of `user`.
    pub summary: UserSummary,
}

/// The user the backend reports for a token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: Value,
    pub summary: UserSummary,
    pub role: Role,
}

/// A validated self-service registration.
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: Email,
    password: SecretString,
    pub role: Role,
    pub promo_code: Option<PromoCode>,
}

impl Registration {
    /// Validate raw registration fields.
    ///
    /// `role` defaults to customer. Sellers must supply a four-digit promo
    /// code; customers' promo codes are ignored.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with a field-specific message.
    pub fn validate(
        name: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
        promo_code: Option<&str>,
    ) -> Result<Self, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::Validation("Name is required".to_string()));
        }

        let email = Email::parse(email)?;
        validate_password(password)?;

        let role = match role.map(str::trim).filter(|r| !r.is_empty()) {
            None => Role::Customer,
            Some(raw) => raw
                .to_ascii_lowercase()
                .parse::<Role>()
                .ok()
                .filter(|r| r.is_self_registrable())
                .ok_or_else(|| AuthError::Validation("Invalid role".to_string()))?,
        };

        let promo_code = match role {
            Role::Seller => Some(PromoCode::parse(promo_code.unwrap_or_default())?),
            Role::Admin | Role::Customer => None,
        };

        Ok(Self {
            name: name.to_string(),
            email,
            password: SecretString::from(password.to_string()),
            role,
            promo_code,
        })
    }

    /// Body sent to the backend's `auth/register`.
    fn to_backend_json(&self) -> Value {
        let mut body = json!({
            "name": self.name,
            "email": self.email.as_str(),
            "password": self.password.expose_secret(),
            "role": self.role.as_str(),
        });
        if let (Some(code), Some(obj)) = (&self.promo_code, body.as_object_mut()) {
            obj.insert("promo_code".to_string(), Value::String(code.to_string()));
        }
        body
    }
}

/// Authentication service.
///
/// Relays credentials to the backend and interprets its replies.
pub struct AuthService<'a> {
    backend: &'a BackendClient,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(backend: &'a BackendClient) -> Self {
        Self { backend }
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` for blank input, and any of
    /// the reply errors in the module table. A success without a token is
    /// `AuthError::MissingToken`.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthOutcome, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.trim().is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let reply = self
            .backend
            .post_json("auth/login", &json!({ "email": email, "password": password }))
            .await?;

        let outcome = interpret_reply(&reply, "Login", StatusCode::UNAUTHORIZED, "Invalid credentials")?;
        if outcome.token.is_none() {
            return Err(AuthError::MissingToken);
        }

        debug!(role = ?outcome.summary.role, "Backend login succeeded");
        Ok(outcome)
    }

    /// Log in and require the admin role.
    ///
    /// # Errors
    ///
    /// Everything [`AuthService::login`] returns, plus `AuthError::NotAdmin`
    /// when the backend reports any other role.
    pub async fn admin_login(&self, email: &str, password: &str) -> Result<AuthOutcome, AuthError> {
        let outcome = self.login(email, password).await?;
        if !outcome.summary.is_admin() {
            warn!(role = ?outcome.summary.role, "Non-admin attempted admin login");
            return Err(AuthError::NotAdmin);
        }
        Ok(outcome)
    }

    /// Register a new seller or customer.
    ///
    /// # Errors
    ///
    /// Returns any of the reply errors in the module table.
    #[instrument(skip(self, registration), fields(role = %registration.role))]
    pub async fn register(&self, registration: &Registration) -> Result<AuthOutcome, AuthError> {
        let reply = self
            .backend
            .post_json("auth/register", &registration.to_backend_json())
            .await?;

        interpret_reply(&reply, "Register", StatusCode::BAD_REQUEST, "Registration failed")
    }

    /// Ask the backend who owns `token`.
    ///
    /// Returns `Ok(None)` when the backend does not answer 2xx with a
    /// recognizable role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Backend` when the backend cannot be reached.
    pub async fn current_user(&self, token: Option<&str>) -> Result<Option<CurrentUser>, AuthError> {
        let reply = self.backend.get_authorized("auth/me", token).await?;
        if !reply.status.is_success() {
            debug!(status = %reply.status, "auth/me rejected token");
            return Ok(None);
        }

        let Ok(body) = reply.json() else {
            return Ok(None);
        };

        Ok(extract_user(&body).and_then(|user| {
            let summary = UserSummary::from_json(user)?;
            let role = summary.role()?;
            Some(CurrentUser {
                user: user.clone(),
                summary,
                role,
            })
        }))
    }
}

/// Interpret a backend auth reply.
///
/// `route` names the route in the not-found message. `failure_status` is
/// used when the backend answers 2xx with `success: false`.
///
/// # Errors
///
/// See the module table.
pub fn interpret_reply(
    reply: &BackendReply,
    route: &'static str,
    failure_status: StatusCode,
    failure_message: &str,
) -> Result<AuthOutcome, AuthError> {
    if reply.status == StatusCode::NOT_FOUND {
        return Err(AuthError::RouteNotFound {
            route,
            url: reply.url.clone(),
        });
    }

    let body = reply.json().map_err(|_| AuthError::InvalidResponse {
        snippet: reply.snippet(),
    })?;

    // A 2xx without an explicit flag counts as success
    let success = body
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or_else(|| reply.status.is_success());

    if !reply.status.is_success() || !success {
        let status = if reply.status.is_success() {
            failure_status
        } else {
            reply.status
        };
        let message = ["error", "message"]
            .iter()
            .filter_map(|key| body.get(*key).and_then(Value::as_str))
            .find(|m| !m.is_empty())
            .unwrap_or(failure_message)
            .to_string();
        return Err(AuthError::Rejected { status, message });
    }

    let data = body.get("data");
    let token = data
        .and_then(|d| d.get("token"))
        .or_else(|| body.get("token"))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(String::from);

    let user = extract_user(&body).cloned().unwrap_or(Value::Null);
    let summary = UserSummary::from_json(&user).unwrap_or_default();

    Ok(AuthOutcome {
        token,
        user,
        summary,
    })
}

/// Locate the user object in a backend envelope.
///
/// Accepts `data.user`, `user`, a `data` object that is itself the user, or
/// a bare user object.
#[must_use]
pub fn extract_user(body: &Value) -> Option<&Value> {
    let looks_like_user = |v: &&Value| v.get("role").is_some() || v.get("email").is_some();
    let data = body.get("data");

    data.and_then(|d| d.get("user"))
        .or_else(|| body.get("user"))
        .or_else(|| data.filter(looks_like_user))
        .or_else(|| Some(body).filter(looks_like_user))
        .filter(|user| user.is_object())
}
