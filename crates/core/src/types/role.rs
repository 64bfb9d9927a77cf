//! Marketplace account roles.

use serde::{Deserialize, Serialize};

/// Error returned when a role string is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0}")]
pub struct RoleError(pub String);

/// Account role as reported by the backend.
///
/// Roles decide which dashboard tree a user lands in and whether the admin
/// cookies are issued at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Marketplace operator with access to `/admin-panel`.
    Admin,
    /// Vendor with access to `/seller`.
    Seller,
    /// Shopper with access to `/customer`.
    Customer,
}

impl Role {
    /// The value stored in the `user_role` cookie and sent to the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Seller => "seller",
            Self::Customer => "customer",
        }
    }

    /// Landing path for this role's dashboard.
    #[must_use]
    pub const fn dashboard_path(self) -> &'static str {
        match self {
            Self::Admin => "/admin-panel",
            Self::Seller => "/seller",
            Self::Customer => "/customer",
        }
    }

    /// Whether the role may be chosen at self-service registration.
    #[must_use]
    pub const fn is_self_registrable(self) -> bool {
        matches!(self, Self::Seller | Self::Customer)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, lowercase role names only. Callers normalize client input first.
impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "seller" => Ok(Self::Seller),
            "customer" => Ok(Self::Customer),
            _ => Err(RoleError(s.to_string())),
        }
    }
}
