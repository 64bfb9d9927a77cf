//! Integration tests for the marketplace gateway.
//!
//! Each test builds the gateway router in-process and drives it with
//! `tower::ServiceExt::oneshot`. The backend API and the session provider are
//! played by a small axum app bound to an ephemeral `127.0.0.1` port.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p marketplace-integration-tests
//! ```
//!
//! # Mock backend accounts
//!
//! | Email                | Login reply                                  |
//! |----------------------|----------------------------------------------|
//! | `admin@shop.test`    | token `admin-tok`, role `admin` (nested)     |
//! | `seller@shop.test`   | token `seller-tok`, role `seller` (top level) |
//! | `boss@shop.test`     | token `boss-tok`, role `Admin` (wrong case)  |
//! | `notoken@shop.test`  | success without a token                      |
//! | `html@shop.test`     | HTML body                                    |
//! | anything else        | 401 `Invalid credentials`                    |
//!
//! Unrouted `/api/*` paths echo the request back as JSON (see [`echo`]).

#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;

use axum::{
    Json, Router,
    body::{Body, Bytes, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;

use marketplace_storefront::config::StorefrontConfig;
use marketplace_storefront::state::AppState;

pub const ADMIN_EMAIL: &str = "admin@shop.test";
pub const SELLER_EMAIL: &str = "seller@shop.test";
pub const ADMIN_TOKEN: &str = "admin-tok";
pub const SELLER_TOKEN: &str = "seller-tok";
pub const REGISTER_TOKEN: &str = "register-tok";
/// Account whose backend role is `"Admin"` rather than `"admin"`.
pub const MIXED_CASE_ADMIN_EMAIL: &str = "boss@shop.test";

/// Session provider token the mock accepts.
pub const PROVIDER_TOKEN: &str = "sb-valid";
/// Anon key the mock session provider expects.
pub const ANON_KEY: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6";

/// A mock server listening on an ephemeral port.
pub struct MockBackend {
    pub url: String,
}

impl MockBackend {
    /// Start the standard mock backend.
    pub async fn start() -> Self {
        Self::serve(mock_router()).await
    }

    /// Serve an arbitrary router.
    pub async fn serve(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Mock backend has no address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Self {
            url: format!("http://{addr}"),
        }
    }
}

/// A URL nothing is listening on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe port");
    let addr = listener.local_addr().expect("Probe port has no address");
    drop(listener);
    format!("http://{addr}")
}

/// Build the gateway against `api_url` with extra variables.
///
/// The local probe is disabled so `api_url` is always the base.
pub fn gateway_with(api_url: &str, extra: &[(&str, &str)]) -> Router {
    let vars: HashMap<String, String> = [
        ("API_URL", api_url),
        ("LOCAL_API_URL", ""),
        ("STATIC_DIR", "tests/static-missing"),
    ]
    .into_iter()
    .chain(extra.iter().copied())
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let config = StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
        .expect("Invalid test configuration");
    let state = AppState::new(config).expect("Failed to build state");
    marketplace_storefront::app(state)
}

/// Build the gateway against `api_url`.
pub fn gateway(api_url: &str) -> Router {
    gateway_with(api_url, &[])
}

/// Static directory holding one admin page and one seller page.
pub const PAGES_DIR: &str = "tests/pages";

/// Build the gateway with the mock session provider enabled.
pub fn gateway_with_provider(mock: &MockBackend) -> Router {
    gateway_with(
        &mock.url,
        &[("SUPABASE_URL", &mock.url), ("SUPABASE_ANON_KEY", ANON_KEY)],
    )
}

/// A buffered gateway response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Body parsed as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }

    /// Body as text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Every `Set-Cookie` header.
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(String::from)
            .collect()
    }

    /// The `Set-Cookie` header for `name`.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let prefix = format!("{name}=");
        self.set_cookies().into_iter().find(|c| c.starts_with(&prefix))
    }

    /// The `Location` header.
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// Send one request through the gateway.
pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    TestResponse {
        status,
        headers,
        body,
    }
}

/// GET `uri` with an optional `Cookie` header.
pub async fn fetch(app: &Router, uri: &str, cookie: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    send(app, builder.body(Body::empty()).expect("Invalid request")).await
}

/// POST a JSON body to `uri`.
pub async fn post_json(app: &Router, uri: &str, body: &Value) -> TestResponse {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("Invalid request");
    send(app, request).await
}

// =============================================================================
// Mock backend
// =============================================================================

/// Routes of the mock backend and session provider.
pub fn mock_router() -> Router {
    Router::new()
        .route("/api/health", get(|| async { "ok" }))
        .route("/api/auth/login", post(mock_login))
        .route("/api/auth/register", post(mock_register))
        .route("/api/auth/me", get(mock_me))
        .route("/api/untyped", get(mock_untyped))
        .route("/auth/v1/user", get(mock_provider_user))
        .fallback(echo)
}

async fn mock_login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    match email {
        ADMIN_EMAIL => Json(json!({
            "success": true,
            "data": {
                "token": ADMIN_TOKEN,
                "user": {"id": 1, "email": ADMIN_EMAIL, "role": "admin", "name": "Ada"}
            }
        }))
        .into_response(),
        SELLER_EMAIL => Json(json!({
            "success": true,
            "token": SELLER_TOKEN,
            "user": {"id": 2, "email": SELLER_EMAIL, "role": "seller", "name": "Sam"}
        }))
        .into_response(),
        MIXED_CASE_ADMIN_EMAIL => Json(json!({
            "success": true,
            "data": {
                "token": "boss-tok",
                "user": {"id": 4, "email": MIXED_CASE_ADMIN_EMAIL, "role": "Admin"}
            }
        }))
        .into_response(),
        "notoken@shop.test" => Json(json!({
            "success": true,
            "data": {"user": {"id": 3, "email": "notoken@shop.test", "role": "admin"}}
        }))
        .into_response(),
        "html@shop.test" => (
            [(header::CONTENT_TYPE, "text/html")],
            "<html>Fatal error</html>",
        )
            .into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "Invalid credentials"})),
        )
            .into_response(),
    }
}

/// Echoes the backend field names so tests can check what was sent.
async fn mock_register(Json(body): Json<Value>) -> Response {
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": {
                "token": REGISTER_TOKEN,
                "user": {
                    "id": 10,
                    "name": body["name"],
                    "email": body["email"],
                    "role": body["role"],
                    "promo_code": body["promo_code"]
                }
            }
        })),
    )
        .into_response()
}

async fn mock_me(headers: HeaderMap) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if auth == format!("Bearer {ADMIN_TOKEN}") {
        Json(json!({"success": true, "data": {"id": 1, "email": ADMIN_EMAIL, "role": "admin"}}))
            .into_response()
    } else if auth == format!("Bearer {SELLER_TOKEN}") {
        Json(json!({"success": true, "user": {"id": 2, "email": SELLER_EMAIL, "role": "seller"}}))
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "error": "Unauthorized"})),
        )
            .into_response()
    }
}

/// A reply without `Content-Type`.
async fn mock_untyped() -> Response {
    Response::new(Body::from("plain bytes"))
}

async fn mock_provider_user(headers: HeaderMap) -> StatusCode {
    let header_is = |name: &str, expected: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected)
    };
    if header_is("apikey", ANON_KEY)
        && header_is("authorization", &format!("Bearer {PROVIDER_TOKEN}"))
    {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    }
}

/// Echo the received request as JSON.
///
/// ```text
/// {"method", "path", "query", "authorization", "host", "request_id",
///  "content_type", "cookie", "body"}
/// ```
pub async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let get_header = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "authorization": get_header(header::AUTHORIZATION),
        "host": get_header(header::HOST),
        "request_id": get_header(header::HeaderName::from_static("x-request-id")),
        "content_type": get_header(header::CONTENT_TYPE),
        "cookie": get_header(header::COOKIE),
        "body": String::from_utf8_lossy(&body),
    }))
}
