//! HTTP middleware stack for the gateway.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Edge gate (cookie/session checks per path tree)
//!
//! The admin gate is an extractor, not a layer: handlers that need a
//! backend-confirmed admin take [`RequireAdmin`] as an argument.

pub mod edge;
pub mod gate;
pub mod request_id;

pub use edge::{ADMIN_LOGIN_PAGE, USER_LOGIN_PAGE, edge_middleware};
pub use gate::{GateDecision, RequireAdmin};
pub use request_id::request_id_middleware;
