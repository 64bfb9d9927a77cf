//! Marketplace Core - Shared types library.
//!
//! This crate provides the value types used by the marketplace gateway:
//! - `storefront` - HTTP gateway in front of the backend API
//! - `integration-tests` - in-process HTTP flow tests
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients. Everything the backend owns (products, orders, sellers) is relayed
//! as opaque JSON and has no mirror here.
//!
//! # Modules
//!
//! - [`types`] - Validated newtypes for emails, roles, promo codes, passwords,
//!   and the JSON response envelope

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
