//! Projection of the backend's user record.

use serde::{Deserialize, Serialize};

use crate::Role;

/// The fields of a backend user that the gateway reads.
///
/// The backend owns the full record; routes relay it to clients as-is and
/// only decode this summary to check the role and fill cookie values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Backend identifier (numeric or string, kept as JSON).
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub email: Option<String>,
    /// Raw role string as sent by the backend.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl UserSummary {
    /// Decode a summary from an arbitrary JSON user object.
    ///
    /// Returns `None` unless `value` is an object.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// The parsed role, if present and recognized.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(|r| r.parse().ok())
    }

    /// Whether the backend reports this user as an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_json_reads_role() {
        let user = UserSummary::from_json(&json!({
            "id": 7,
            "email": "admin@shop.test",
            "role": "admin",
            "created_at": "2024-01-01"
        }))
        .unwrap();
        assert_eq!(user.id, Some(json!(7)));
        assert!(user.is_admin());
    }

    #[test]
    fn test_unknown_role_is_none() {
        let user = UserSummary::from_json(&json!({"role": "moderator"})).unwrap();
        assert_eq!(user.role(), None);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_role_must_match_exactly() {
        for raw in ["Admin", "ADMIN ", " admin"] {
            let user = UserSummary::from_json(&json!({"role": raw})).unwrap();
            assert_eq!(user.role(), None, "{raw:?}");
            assert!(!user.is_admin(), "{raw:?}");
        }
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(UserSummary::from_json(&json!("admin")).is_none());
        assert!(UserSummary::from_json(&json!(null)).is_none());
    }

    #[test]
    fn test_mistyped_field_rejected() {
        assert!(UserSummary::from_json(&json!({"email": 42})).is_none());
    }
}
