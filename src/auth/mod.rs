//! Bearer-token authentication and route authorization
//!
//! This module holds the request pipeline that sits in front of every
//! handler:
//!
//! - [`auth::jwt`](crate::auth::jwt) - HS256 token issuance and verification
//! - [`auth::password`](crate::auth::password) - Password hashing seam and its Argon2id adapter
//! - [`auth::provider`](crate::auth::provider) - Credential checks at login
//! - [`auth::context`](crate::auth::context) - Per-request holder of the authenticated principal
//! - [`auth::middleware`](crate::auth::middleware) - The authentication filter and handler extractor
//! - [`auth::policy`](crate::auth::policy) - Public/protected route rules
//!
//! # Request flow
//!
//! ```text
//! request ─▶ authentication_filter ─▶ access_policy ─▶ handler
//!              (fail-open)              (fail-closed)
//! ```
//!
//! The filter never rejects: a missing, malformed, expired or forged token
//! simply leaves the [`SecurityContext`](context::SecurityContext) empty.
//! The policy then rejects any route that is not public. A route missing from
//! the public list is therefore protected, and a route added to it is open to
//! everyone, so review the list with care.
//!
//! # Usage
//!
//! ```ignore
//! use gatehouse::auth::{jwt::TokenService, middleware::AuthUser};
//!
//! let tokens = TokenService::new(&base64_key, 3_600_000)?;
//! let token = tokens.issue(&principal)?;
//!
//! async fn protected_handler(AuthUser(principal): AuthUser) -> String {
//!     format!("Hello, {}!", principal.identifier)
//! }
//! ```

/// Per-request security context.
pub mod context;
/// JWT token generation and verification.
pub mod jwt;
/// Authentication filter middleware and extractors.
pub mod middleware;
/// Password hashing.
pub mod password;
/// Route-level access policy.
pub mod policy;
/// Login-time credential verification.
pub mod provider;

pub use context::SecurityContext;
pub use jwt::TokenService;
pub use middleware::{AuthUser, AuthenticationFilter};
pub use password::{Argon2Hasher, PasswordHasher};
pub use policy::AccessPolicy;
pub use provider::AuthenticationProvider;
