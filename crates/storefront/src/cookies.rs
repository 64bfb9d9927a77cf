//! Auth cookie names, reading, and issuing.
//!
//! The backend issues an opaque bearer token at login. The gateway keeps it
//! in cookies so that page requests and proxied API calls carry it without
//! client code handling the token:
//!
//! | Cookie        | HttpOnly | Set by                     |
//! |---------------|----------|----------------------------|
//! | `auth_token`  | yes      | every login                |
//! | `user_role`   | yes      | every login                |
//! | `user_email`  | yes      | every login                |
//! | `admin_token` | no       | admin login                |
//! | `admin_email` | no       | admin login                |
//!
//! The admin cookies are readable by client script so the admin panel can
//! show who is signed in. All cookies are `Path=/` and `SameSite=Lax`.

use std::convert::Infallible;

use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::{IntoResponseParts, ResponseParts};
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::{Cookie, SameSite};

pub const AUTH_TOKEN: &str = "auth_token";
pub const USER_ROLE: &str = "user_role";
pub const USER_EMAIL: &str = "user_email";
pub const ADMIN_TOKEN: &str = "admin_token";
pub const ADMIN_EMAIL: &str = "admin_email";

/// Access token cookie written by the external session provider.
pub const SESSION_PROVIDER_TOKEN: &str = "sb-access-token";

/// Lifetime of cookies issued by admin login.
pub const ADMIN_SESSION_MAX_AGE: Duration = Duration::days(1);

/// Lifetime of cookies issued by user login and registration.
pub const USER_SESSION_MAX_AGE: Duration = Duration::days(7);

/// Read a cookie value from request headers.
///
/// Empty values are treated as absent. When the same name appears more than
/// once, the first occurrence wins.
#[must_use]
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Values written into cookies after a successful login.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub email: String,
    pub role: String,
}

/// Cookie attributes shared by every issued cookie.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    /// Add the `Secure` attribute.
    pub secure: bool,
}

impl CookiePolicy {
    fn build(
        self,
        name: &'static str,
        value: String,
        http_only: bool,
        max_age: Duration,
    ) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(http_only)
            .secure(self.secure)
            .max_age(max_age)
            .build()
    }

    /// The generic auth cookies every role receives.
    #[must_use]
    pub fn auth_cookies(self, session: &AuthSession, max_age: Duration) -> Vec<Cookie<'static>> {
        vec![
            self.build(AUTH_TOKEN, session.token.clone(), true, max_age),
            self.build(USER_ROLE, session.role.clone(), true, max_age),
            self.build(USER_EMAIL, session.email.clone(), true, max_age),
        ]
    }

    /// The client-readable admin cookies.
    #[must_use]
    pub fn admin_cookies(self, session: &AuthSession, max_age: Duration) -> Vec<Cookie<'static>> {
        vec![
            self.build(ADMIN_TOKEN, session.token.clone(), false, max_age),
            self.build(ADMIN_EMAIL, session.email.clone(), false, max_age),
        ]
    }

    /// Expired copies of all five auth cookies.
    #[must_use]
    pub fn cleared_cookies(self) -> Vec<Cookie<'static>> {
        [
            (AUTH_TOKEN, true),
            (USER_ROLE, true),
            (USER_EMAIL, true),
            (ADMIN_TOKEN, false),
            (ADMIN_EMAIL, false),
        ]
        .into_iter()
        .map(|(name, http_only)| self.build(name, String::new(), http_only, Duration::ZERO))
        .collect()
    }
}

/// Response part that appends one `Set-Cookie` header per cookie.
#[derive(Debug, Default)]
pub struct SetCookies(pub Vec<Cookie<'static>>);

impl IntoResponseParts for SetCookies {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        for cookie in self.0 {
            match HeaderValue::from_str(&cookie.to_string()) {
                Ok(value) => {
                    res.headers_mut().append(header::SET_COOKIE, value);
                }
                Err(e) => tracing::error!(cookie = %cookie.name(), error = %e, "Invalid cookie value"),
            }
        }
        Ok(res)
    }
}
