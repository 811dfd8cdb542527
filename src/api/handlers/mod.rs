//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Authentication handlers (register, authenticate).
pub mod auth;
/// Demo endpoint guarded by the access policy.
pub mod demo;
/// Liveness endpoint.
pub mod health;
