//! HTTP API Handlers and Routes
//!
//! This module provides the reference REST surface for Gatehouse, built on
//! the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Authentication (`/api/v1/auth`, public)
//! - `POST /api/v1/auth/register` - Register a new user and receive a token
//! - `POST /api/v1/auth/authenticate` - Login and receive a token
//!
//! ## Protected
//! - `GET /api/v1/demo-controller` - Greets the authenticated caller
//!
//! ## Health (public)
//! - `GET /health` - Liveness check
//!
//! # Authentication
//!
//! Protected endpoints require `Authorization: Bearer <token>`. Requests
//! without a usable token are answered with `403 Forbidden`.

/// Request handlers.
pub mod handlers;
/// Router construction.
pub mod routes;
