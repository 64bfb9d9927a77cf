//! Integration tests for the edge middleware and the admin gate.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use marketplace_integration_tests::{
    ADMIN_TOKEN, ANON_KEY, MockBackend, PAGES_DIR, PROVIDER_TOKEN, SELLER_TOKEN, fetch, gateway,
    gateway_with, gateway_with_provider, unreachable_url,
};

// ============================================================================
// Edge middleware
// ============================================================================

#[tokio::test]
async fn test_admin_panel_without_cookie_redirects_to_login() {
    let mock = MockBackend::start().await;
    let app = gateway(&mock.url);

    for path in ["/admin-panel", "/admin-panel/", "/admin-panel/withdrawals"] {
        let response = fetch(&app, path, None).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{path}");
        assert_eq!(response.location(), Some("/admin-panel/login"), "{path}");
    }
}

#[tokio::test]
async fn test_admin_panel_empty_cookie_redirects() {
    let mock = MockBackend::start().await;
    let app = gateway(&mock.url);

    let response = fetch(&app, "/admin-panel/orders", Some("admin_token=")).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_admin_panel_with_cookie_passes() {
    let mock = MockBackend::start().await;
    let app = gateway(&mock.url);

    // Cookie presence is enough; the page itself is absent in tests
    let response = fetch(&app, "/admin-panel/orders", Some("admin_token=anything")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_login_page_bypasses_gate() {
    let mock = MockBackend::start().await;
    let app = gateway(&mock.url);

    let response = fetch(&app, "/admin-panel/login", None).await;
    assert_ne!(response.status, StatusCode::SEE_OTHER);
    assert!(response.location().is_none());
}

#[tokio::test]
async fn test_static_assets_are_exempt() {
    let mock = MockBackend::start().await;
    let app = gateway_with_provider(&mock);

    for path in ["/static/app.js", "/favicon.ico", "/health"] {
        let response = fetch(&app, path, None).await;
        assert_ne!(response.status, StatusCode::SEE_OTHER, "{path}");
    }
}

#[tokio::test]
async fn test_dashboards_open_without_provider() {
    let mock = MockBackend::start().await;
    let app = gateway(&mock.url);

    for path in ["/seller", "/customer/orders"] {
        let response = fetch(&app, path, None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn test_dashboards_require_provider_session() {
    let mock = MockBackend::start().await;
    let app = gateway_with_provider(&mock);

    for path in ["/seller", "/seller/products", "/customer"] {
        let response = fetch(&app, path, None).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{path}");
        assert_eq!(response.location(), Some("/auth/login"), "{path}");
    }

    let response = fetch(&app, "/seller", Some("sb-access-token=expired")).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let cookie = format!("sb-access-token={PROVIDER_TOKEN}");
    let response = fetch(&app, "/seller/products", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_pages_pass_with_provider() {
    let mock = MockBackend::start().await;
    let app = gateway_with_provider(&mock);

    let response = fetch(&app, "/auth/login", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_page_served_with_cookie() {
    let mock = MockBackend::start().await;
    let app = gateway_with(&mock.url, &[("STATIC_DIR", PAGES_DIR)]);

    let response = fetch(&app, "/admin-panel/orders.html", Some("admin_token=anything")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("Admin orders"));
}

#[tokio::test]
async fn test_encoded_admin_paths_are_gated() {
    let mock = MockBackend::start().await;
    let app = gateway_with(&mock.url, &[("STATIC_DIR", PAGES_DIR)]);

    for path in [
        "/admin-panel/orders.html",
        "//admin-panel/orders.html",
        "/admin%2Dpanel/orders.html",
        "/admin-panel%2Forders.html",
        "/./admin-panel/orders.html",
        "/static/../admin-panel/orders.html",
    ] {
        let response = fetch(&app, path, None).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{path}");
        assert_eq!(response.location(), Some("/admin-panel/login"), "{path}");
        assert!(!response.text().contains("Admin orders"), "{path}");
    }
}

#[tokio::test]
async fn test_encoded_seller_paths_are_gated() {
    let mock = MockBackend::start().await;
    let app = gateway_with(
        &mock.url,
        &[
            ("STATIC_DIR", PAGES_DIR),
            ("SUPABASE_URL", &mock.url),
            ("SUPABASE_ANON_KEY", ANON_KEY),
        ],
    );

    for path in ["//seller/products.html", "/s%65ller/products.html", "/seller%2Fproducts.html"] {
        let response = fetch(&app, path, None).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{path}");
        assert_eq!(response.location(), Some("/auth/login"), "{path}");
    }

    let cookie = format!("sb-access-token={PROVIDER_TOKEN}");
    let response = fetch(&app, "/seller/products.html", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("Seller products"));
}

#[tokio::test]
async fn test_undecodable_path_is_rejected() {
    let mock = MockBackend::start().await;
    let app = gateway_with(&mock.url, &[("STATIC_DIR", PAGES_DIR)]);

    let response = fetch(&app, "/admin%FFpanel/orders.html", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Admin gate
// ============================================================================

#[tokio::test]
async fn test_admin_session_for_admin() {
    let mock = MockBackend::start().await;
    let app = gateway(&mock.url);

    let cookie = format!("auth_token={ADMIN_TOKEN}");
    let response = fetch(&app, "/api/admin/session", Some(&cookie)).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn test_admin_session_redirects_seller_to_dashboard() {
    let mock = MockBackend::start().await;
    let app = gateway(&mock.url);

    let cookie = format!("auth_token={SELLER_TOKEN}");
    let response = fetch(&app, "/api/admin/session", Some(&cookie)).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/seller"));
}

#[tokio::test]
async fn test_admin_session_uses_auth_token_not_admin_token() {
    let mock = MockBackend::start().await;
    let app = gateway(&mock.url);

    let cookie = format!("admin_token={ADMIN_TOKEN}");
    let response = fetch(&app, "/api/admin/session", Some(&cookie)).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/admin-panel/login"));
}

#[tokio::test]
async fn test_admin_session_without_cookie_redirects_to_login() {
    let mock = MockBackend::start().await;
    let app = gateway(&mock.url);

    let response = fetch(&app, "/api/admin/session", None).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/admin-panel/login"));
}

#[tokio::test]
async fn test_admin_session_backend_down_redirects_to_login() {
    let url = unreachable_url().await;
    let app = gateway(&url);

    let cookie = format!("auth_token={ADMIN_TOKEN}");
    let response = fetch(&app, "/api/admin/session", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/admin-panel/login"));
}
