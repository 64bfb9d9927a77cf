//! Marketplace gateway library.
//!
//! This crate provides the gateway as a library so the router can be driven
//! in-process by tests. The binary in `main.rs` adds Sentry and serves it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod cookies;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
