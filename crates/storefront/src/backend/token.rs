//! Bearer token selection for backend calls.

use axum::http::HeaderMap;

use crate::cookies::{ADMIN_TOKEN, AUTH_TOKEN, read_cookie};

/// Path prefix of backend routes that expect the admin token.
const ADMIN_PREFIX: &str = "admin/";

/// Choose which token to send for a backend path.
///
/// Paths under `admin/` prefer the admin token and fall back to the generic
/// auth token. Every other path uses the auth token only; the admin token is
/// never sent outside the admin tree.
#[must_use]
pub fn token_for_path<'a>(
    path: &str,
    auth_token: Option<&'a str>,
    admin_token: Option<&'a str>,
) -> Option<&'a str> {
    let auth_token = auth_token.filter(|t| !t.is_empty());
    if path.trim_start_matches('/').starts_with(ADMIN_PREFIX) {
        admin_token.filter(|t| !t.is_empty()).or(auth_token)
    } else {
        auth_token
    }
}

/// Read the auth cookies from `headers` and pick the token for `path`.
#[must_use]
pub fn bearer_token_for_path(headers: &HeaderMap, path: &str) -> Option<String> {
    let auth = read_cookie(headers, AUTH_TOKEN);
    let admin = read_cookie(headers, ADMIN_TOKEN);
    token_for_path(path, auth.as_deref(), admin.as_deref()).map(String::from)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, header};

    use super::*;

    const NON_ADMIN_PATHS: &[&str] = &[
        "products",
        "auth/me",
        "seller/withdrawals",
        "administrator",
        "admins/list",
        "api/admin/orders",
        "",
    ];

    const ADMIN_PATHS: &[&str] = &["admin/orders", "admin/", "/admin/settings", "admin/promo-codes/7"];

    #[test]
    fn test_non_admin_paths_never_use_admin_token() {
        for path in NON_ADMIN_PATHS {
            assert_eq!(token_for_path(path, Some("user"), Some("admin")), Some("user"));
            assert_eq!(token_for_path(path, None, Some("admin")), None, "path {path:?}");
        }
    }

    #[test]
    fn test_admin_paths_prefer_admin_token() {
        for path in ADMIN_PATHS {
            assert_eq!(token_for_path(path, Some("user"), Some("admin")), Some("admin"));
        }
    }

    #[test]
    fn test_admin_paths_fall_back_to_auth_token() {
        for path in ADMIN_PATHS {
            assert_eq!(token_for_path(path, Some("user"), None), Some("user"));
            assert_eq!(token_for_path(path, Some("user"), Some("")), Some("user"));
        }
    }

    #[test]
    fn test_no_tokens() {
        assert_eq!(token_for_path("admin/orders", None, None), None);
        assert_eq!(token_for_path("orders", Some(""), None), None);
    }

    #[test]
    fn test_bearer_token_from_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("auth_token=user-tok; admin_token=admin-tok"),
        );
        assert_eq!(
            bearer_token_for_path(&headers, "admin/orders").as_deref(),
            Some("admin-tok")
        );
        assert_eq!(
            bearer_token_for_path(&headers, "orders").as_deref(),
            Some("user-tok")
        );
    }
}
