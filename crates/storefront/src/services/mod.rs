//! Business logic services for the gateway.
//!
//! # Services
//!
//! - `auth` - Login, registration, and current-user lookups relayed to the backend
//! - `session` - Optional external session provider checks

pub mod auth;
pub mod session;
