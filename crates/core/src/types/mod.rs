//! Core types for the marketplace.
//!
//! This module provides type-safe wrappers for the values the gateway
//! validates before talking to the backend.

pub mod email;
pub mod envelope;
pub mod password;
pub mod promo_code;
pub mod role;
pub mod user;

pub use email::{Email, EmailError};
pub use envelope::Envelope;
pub use password::{PasswordError, validate_password};
pub use promo_code::{PromoCode, PromoCodeError};
pub use role::{Role, RoleError};
pub use user::UserSummary;
