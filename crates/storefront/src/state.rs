//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{BackendClient, BackendError};
use crate::config::StorefrontConfig;
use crate::cookies::CookiePolicy;
use crate::services::session::SessionVerifier;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: BackendClient,
    sessions: Option<SessionVerifier>,
    cookie_policy: CookiePolicy,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;
        let sessions = config
            .session_provider
            .as_ref()
            .map(|provider| SessionVerifier::new(provider, backend.http()));
        let cookie_policy = CookiePolicy {
            secure: config.secure_cookies(),
        };

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                sessions,
                cookie_policy,
            }),
        })
    }

    /// Get a reference to the gateway configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// The session verifier, when a provider is configured.
    #[must_use]
    pub fn sessions(&self) -> Option<&SessionVerifier> {
        self.inner.sessions.as_ref()
    }

    /// Attributes for cookies issued by this gateway.
    #[must_use]
    pub fn cookie_policy(&self) -> CookiePolicy {
        self.inner.cookie_policy
    }
}
