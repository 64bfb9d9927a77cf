//! Reverse proxy to the backend API.
//!
//! `/api/backend/<rest>` is relayed to `<base>/api/<rest>` with the caller's
//! method, query, headers, and body. The bearer token comes from the auth
//! cookies (see [`bearer_token_for_path`]).

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, Uri, header},
    response::{IntoResponse, Response},
};

use crate::backend::{BackendReply, ForwardRequest, bearer_token_for_path};
use crate::error::Result;
use crate::state::AppState;

/// Prefix stripped from the inbound path.
pub const PROXY_PREFIX: &str = "/api/backend/";

/// Used when the backend omits `Content-Type`.
const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Relay a request to the backend.
///
/// ANY /api/backend/{*path}
///
/// # Errors
///
/// Returns 503 with the "start the backend" message when the backend cannot
/// be reached.
pub async fn proxy(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let path = backend_path(&uri);
    let token = bearer_token_for_path(&headers, &path);

    let request = ForwardRequest {
        method,
        path,
        query: uri.query().map(String::from),
        headers,
        body,
    };

    let reply = state.backend().forward(request, token.as_deref()).await?;
    Ok(relay(reply))
}

/// The backend path for an inbound URI, without the proxy prefix.
#[must_use]
pub fn backend_path(uri: &Uri) -> String {
    uri.path()
        .strip_prefix(PROXY_PREFIX)
        .unwrap_or_default()
        .to_string()
}

/// Turn a backend reply into the client response.
fn relay(reply: BackendReply) -> Response {
    let content_type = reply
        .content_type
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    (reply.status, [(header::CONTENT_TYPE, content_type)], reply.body).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn test_backend_path_strips_prefix() {
        let uri: Uri = "/api/backend/admin/orders?page=2".parse().unwrap_or_default();
        assert_eq!(backend_path(&uri), "admin/orders");

        let uri: Uri = "/api/backend/products/12/reviews".parse().unwrap_or_default();
        assert_eq!(backend_path(&uri), "products/12/reviews");
    }

    #[test]
    fn test_relay_keeps_status_and_content_type() {
        let response = relay(BackendReply {
            status: StatusCode::CREATED,
            url: "http://api.test/api/products".into(),
            content_type: Some("text/plain; charset=utf-8".into()),
            body: Bytes::from_static(b"created"),
        });
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_relay_defaults_content_type() {
        let response = relay(BackendReply {
            status: StatusCode::OK,
            url: "http://api.test/api/products".into(),
            content_type: None,
            body: Bytes::new(),
        });
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }
}
