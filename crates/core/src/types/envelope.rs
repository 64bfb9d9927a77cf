//! The `{success, data|error}` JSON wrapper shared with the backend.

use serde::{Deserialize, Serialize};

/// JSON response envelope.
///
/// Both the backend API and the gateway's own routes answer with this shape:
///
/// ```text
/// {"success": true,  "data": {...}}
/// {"success": true,  "user": {...}}
/// {"success": false, "error": "Promo code must be exactly 4 digits"}
/// ```
///
/// The HTTP status carries the failure class; `error` carries the
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Diagnostic snippet attached to upstream-format failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl<T> Envelope<T> {
    /// A successful envelope carrying `data`.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            user: None,
            error: None,
            details: None,
        }
    }

    /// A successful envelope with no payload.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            success: true,
            data: None,
            user: None,
            error: None,
            details: None,
        }
    }

    /// A successful envelope carrying the authenticated user.
    #[must_use]
    pub const fn with_user(user: serde_json::Value) -> Self {
        Self {
            success: true,
            data: None,
            user: Some(user),
            error: None,
            details: None,
        }
    }

    /// A failed envelope with a message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            user: None,
            error: Some(message.into()),
            details: None,
        }
    }

    /// Attach a diagnostic snippet.
    #[must_use]
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
