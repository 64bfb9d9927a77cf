//! Client for the external backend API.
//!
//! # Base URL selection
//!
//! Every call resolves a base URL first: the local backend (`LOCAL_API_URL`)
//! is probed with `GET <local>/api/health` under a short timeout, and wins if
//! it answers 2xx. Otherwise the configured `API_URL` is used. This lets a
//! developer run the backend locally without reconfiguring the gateway.
//!
//! All backend paths are relative to `<base>/api/`.

mod token;

pub use token::{bearer_token_for_path, token_for_path};

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, header};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::BackendConfig;

/// Longest slice of a malformed backend body echoed back for diagnostics.
pub const SNIPPET_LEN: usize = 200;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced a response (refused, DNS, timeout).
    #[error("backend at {base} unavailable: {source}")]
    Unavailable {
        base: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),
}

/// A fully-read backend response.
#[derive(Debug, Clone)]
pub struct BackendReply {
    /// Upstream status.
    pub status: StatusCode,
    /// URL that was called.
    pub url: String,
    /// Upstream `Content-Type`, if any.
    pub content_type: Option<String>,
    /// Raw body.
    pub body: Bytes,
}

impl BackendReply {
    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the body is not JSON.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// The first [`SNIPPET_LEN`] characters of the body, lossily decoded.
    #[must_use]
    pub fn snippet(&self) -> String {
        String::from_utf8_lossy(&self.body)
            .chars()
            .take(SNIPPET_LEN)
            .collect()
    }
}

/// A request to relay verbatim to the backend.
#[derive(Debug)]
pub struct ForwardRequest {
    pub method: Method,
    /// Path below `/api/`, without a leading slash.
    pub path: String,
    /// Raw query string, without the `?`.
    pub query: Option<String>,
    pub headers: HeaderMap,
    /// Body to send; ignored for GET and HEAD.
    pub body: Bytes,
}

/// Client for the backend API.
///
/// Cheaply cloneable; the underlying connection pool is shared.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    api_url: String,
    local_url: Option<String>,
    probe_timeout: Duration,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Client` if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(BackendError::Client)?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                api_url: config.api_url.clone(),
                local_url: config.local_url.clone(),
                probe_timeout: config.probe_timeout,
            }),
        })
    }

    /// The underlying HTTP client, for other services sharing its pool.
    #[must_use]
    pub fn http(&self) -> reqwest::Client {
        self.inner.client.clone()
    }

    /// Pick the base URL for this request.
    ///
    /// Prefers the local backend when its health probe answers 2xx within
    /// the probe timeout.
    pub async fn base_url(&self) -> String {
        if let Some(local) = &self.inner.local_url
            && local != &self.inner.api_url
            && self.is_healthy(local).await
        {
            debug!(base = %local, "Using local backend");
            return local.clone();
        }
        self.inner.api_url.clone()
    }

    /// Probe `<base>/api/health`.
    pub async fn is_healthy(&self, base: &str) -> bool {
        let url = endpoint(base, "health", None);
        match self
            .inner
            .client
            .get(&url)
            .timeout(self.inner.probe_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(url = %url, error = %e, "Health probe failed");
                false
            }
        }
    }

    /// Relay a request to the backend and read the full response.
    ///
    /// The caller's headers are copied except `Host`, hop-by-hop headers, and
    /// `Accept-Encoding` (the body is relayed without re-encoding). `token`,
    /// when present, replaces any inbound `Authorization`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unavailable` when no response is received.
    #[instrument(skip(self, request, token), fields(method = %request.method, path = %request.path))]
    pub async fn forward(
        &self,
        request: ForwardRequest,
        token: Option<&str>,
    ) -> Result<BackendReply, BackendError> {
        let base = self.base_url().await;
        let url = endpoint(&base, &request.path, request.query.as_deref());

        let mut headers = relay_headers(&request.headers);
        if let Some(token) = token
            && let Ok(value) = header::HeaderValue::from_str(&format!("Bearer {token}"))
        {
            headers.insert(header::AUTHORIZATION, value);
        }

        let mut builder = self
            .inner
            .client
            .request(request.method.clone(), &url)
            .headers(headers);

        if carries_body(&request.method) {
            builder = builder.body(request.body);
        }

        self.send(builder, base, url).await
    }

    /// POST a JSON body to `<base>/api/<path>`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unavailable` when no response is received.
    #[instrument(skip(self, body))]
    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<BackendReply, BackendError> {
        let base = self.base_url().await;
        let url = endpoint(&base, path, None);
        let builder = self
            .inner
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(body);
        self.send(builder, base, url).await
    }

    /// GET `<base>/api/<path>` with an optional bearer token.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unavailable` when no response is received.
    #[instrument(skip(self, token))]
    pub async fn get_authorized(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<BackendReply, BackendError> {
        let base = self.base_url().await;
        let url = endpoint(&base, path, None);
        let mut builder = self
            .inner
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        self.send(builder, base, url).await
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        base: String,
        url: String,
    ) -> Result<BackendReply, BackendError> {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(source) => {
                warn!(url = %url, error = %source, "Backend request failed");
                return Err(BackendError::Unavailable { base, source });
            }
        };

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(source) => {
                warn!(url = %url, error = %source, "Backend response body failed");
                return Err(BackendError::Unavailable { base, source });
            }
        };

        debug!(url = %url, status = %status, "Backend responded");

        Ok(BackendReply {
            status,
            url,
            content_type,
            body,
        })
    }
}

/// Build `<base>/api/<path>[?<query>]`.
#[must_use]
pub fn endpoint(base: &str, path: &str, query: Option<&str>) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match query.filter(|q| !q.is_empty()) {
        Some(query) => format!("{base}/api/{path}?{query}"),
        None => format!("{base}/api/{path}"),
    }
}

/// Whether a forwarded request of this method carries the caller's body.
#[must_use]
pub fn carries_body(method: &Method) -> bool {
    method != Method::GET && method != Method::HEAD
}

/// Headers that describe the client connection rather than the request.
const STRIPPED_HEADERS: &[&str] = &[
    "host",
    "connection",
    "keep-alive",
    "proxy-connection",
    "content-length",
    "transfer-encoding",
    "upgrade",
    "te",
    "trailer",
    "accept-encoding",
];

/// Copy inbound headers for relaying upstream.
#[must_use]
pub fn relay_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    for name in STRIPPED_HEADERS {
        headers.remove(*name);
    }
    headers
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_endpoint_joins_path_and_query() {
        assert_eq!(
            endpoint("http://api.test", "products", Some("page=2&q=tea")),
            "http://api.test/api/products?page=2&q=tea"
        );
        assert_eq!(
            endpoint("http://api.test/", "/admin/orders", None),
            "http://api.test/api/admin/orders"
        );
        assert_eq!(
            endpoint("http://api.test", "auth/me", Some("")),
            "http://api.test/api/auth/me"
        );
    }

    #[test]
    fn test_get_and_head_carry_no_body() {
        assert!(!carries_body(&Method::GET));
        assert!(!carries_body(&Method::HEAD));
        assert!(carries_body(&Method::POST));
        assert!(carries_body(&Method::DELETE));
        assert!(carries_body(&Method::PATCH));
    }

    #[test]
    fn test_relay_headers_strips_host() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::HOST, HeaderValue::from_static("shop.test"));
        inbound.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        inbound.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        inbound.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        inbound.insert("x-seller-id", HeaderValue::from_static("42"));

        let relayed = relay_headers(&inbound);
        assert!(relayed.get(header::HOST).is_none());
        assert!(relayed.get(header::CONNECTION).is_none());
        assert!(relayed.get(header::ACCEPT_ENCODING).is_none());
        assert_eq!(relayed.get(header::ACCEPT).unwrap(), "application/json");
        assert_eq!(relayed.get("x-seller-id").unwrap(), "42");
    }

    #[test]
    fn test_snippet_truncates() {
        let reply = BackendReply {
            status: StatusCode::OK,
            url: "http://api.test/api/auth/login".to_string(),
            content_type: Some("text/html".to_string()),
            body: Bytes::from("x".repeat(500)),
        };
        assert_eq!(reply.snippet().len(), SNIPPET_LEN);
        assert!(reply.json().is_err());
    }
}
