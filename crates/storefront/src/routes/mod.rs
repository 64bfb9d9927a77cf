//! HTTP route handlers for the gateway.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Backend reachability check
//!
//! # Auth
//! POST /api/auth/admin-login    - Admin login (sets admin + auth cookies)
//! POST /api/auth/login          - Seller/customer login
//! POST /api/auth/register       - Seller/customer registration
//! POST /api/auth/logout         - Clear all auth cookies
//!
//! # Admin
//! GET  /api/admin/session       - Backend-confirmed admin user
//!
//! # Backend
//! ANY  /api/backend/{*path}     - Reverse proxy to <base>/api/{path}
//!
//! # Client
//! GET  /api/config              - Endpoints for client pages
//!
//! # Pages
//! *    fallback                 - Static pages, gated by the edge middleware
//! ```

pub mod admin;
pub mod auth;
pub mod backend;
pub mod config;
pub mod health;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    middleware::{from_fn, from_fn_with_state},
    routing::{any, get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{edge_middleware, request_id_middleware};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/admin-login", post(auth::admin_login))
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the backend proxy router.
pub fn backend_routes(max_body_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/backend/{*path}", any(backend::proxy))
        .layer(DefaultBodyLimit::max(max_body_bytes))
}

/// Create all API and health routes.
pub fn routes(max_body_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/auth", auth_routes())
        .route("/api/admin/session", get(admin::session))
        .route("/api/config", get(config::client_config))
        .merge(backend_routes(max_body_bytes))
}

/// Build the full application: routes, static fallback, and middleware.
///
/// Sentry layers are added by the binary so tests can run without a client.
pub fn app(state: AppState) -> Router {
    let config = state.config();
    let pages = ServeDir::new(&config.static_dir);

    routes(config.max_body_bytes)
        .fallback_service(pages)
        .layer(from_fn_with_state(state.clone(), edge_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}
