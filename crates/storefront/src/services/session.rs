//! External session provider.
//!
//! When `SUPABASE_URL` and `SUPABASE_ANON_KEY` are configured, the seller and
//! customer trees require a provider session. A session is present when the
//! provider's access-token cookie is set and the provider accepts it at
//! `GET <url>/auth/v1/user`.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::config::SessionProviderConfig;
use crate::cookies::{SESSION_PROVIDER_TOKEN, read_cookie};

/// Timeout for a session lookup.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Checks request cookies against the session provider.
#[derive(Clone)]
pub struct SessionVerifier {
    inner: Arc<SessionVerifierInner>,
}

struct SessionVerifierInner {
    client: reqwest::Client,
    user_url: String,
    anon_key: SecretString,
}

impl SessionVerifier {
    /// Create a verifier sharing `client`'s connection pool.
    #[must_use]
    pub fn new(config: &SessionProviderConfig, client: reqwest::Client) -> Self {
        Self {
            inner: Arc::new(SessionVerifierInner {
                client,
                user_url: format!("{}/auth/v1/user", config.url),
                anon_key: config.anon_key.clone(),
            }),
        }
    }

    /// Whether the request carries a session the provider accepts.
    ///
    /// Transport failures count as "no session".
    pub async fn has_session(&self, headers: &HeaderMap) -> bool {
        let Some(token) = read_cookie(headers, SESSION_PROVIDER_TOKEN) else {
            return false;
        };

        match self
            .inner
            .client
            .get(&self.inner.user_url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(token)
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => {
                debug!(status = %response.status(), "Session lookup");
                response.status().is_success()
            }
            Err(e) => {
                warn!(error = %e, "Session provider unreachable");
                false
            }
        }
    }
}
