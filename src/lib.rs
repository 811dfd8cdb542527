//! # Gatehouse - Stateless Bearer-Token Authentication
//!
//! Gatehouse issues and verifies HMAC-signed JSON Web Tokens and wires them
//! into an axum request pipeline: a filter that turns a bearer token into an
//! authenticated principal, and an access policy that decides which routes
//! need one.
//!
//! ## Overview
//!
//! Gatehouse can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `gatehouse-server` binary
//! 2. **As a library** - Mount its layers in front of your own routes
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use gatehouse::{AppState, GatehouseConfig, InMemoryUserStore};
//! use std::sync::Arc;
//!
//! let config = GatehouseConfig::load("gatehouse.toml")?;
//! let state = AppState::new(config, Arc::new(InMemoryUserStore::new()))?;
//! let app = gatehouse::api::routes::create_router(state);
//! ```
//!
//! ### Issuing and verifying tokens directly
//!
//! ```rust,ignore
//! use gatehouse::{Principal, Role, TokenService};
//!
//! let tokens = TokenService::new("<base64 key of at least 32 bytes>", 86_400_000)?;
//! let principal = Principal::new("alice@example.com", "<hash>", Role::User);
//! let token = tokens.issue(&principal)?;
//! let claims = tokens.verify(&token)?;
//! assert_eq!(claims.sub, "alice@example.com");
//! ```
//!
//! ## Modules
//!
//! - [`api`] - REST handlers and router
//! - [`auth`] - Tokens, the authentication filter, provider and access policy
//! - [`cli`] - Command-line interface for the server binary
//! - [`db`] - User lookup and storage
//! - [`types`] - Common types and error handling
//! - [`utils`] - TOML configuration

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// JWT authentication and middleware.
pub mod auth;
/// Command-line interface.
pub mod cli;
/// User lookup and storage.
pub mod db;
/// Core types (principals, claims, errors).
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

// Re-export commonly used types
pub use auth::{
    AccessPolicy, Argon2Hasher, AuthenticationFilter, AuthenticationProvider, PasswordHasher,
    SecurityContext, TokenService,
};
pub use db::{InMemoryUserStore, UserLookup, UserStore};
pub use types::{AppError, Claims, Credentials, Principal, Result, Role};
pub use utils::toml_config::GatehouseConfig;

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Configuration the state was built from
    pub config: Arc<GatehouseConfig>,
    /// Token issuing and verification
    pub token_service: Arc<TokenService>,
    /// Registered principals
    pub users: Arc<dyn UserStore>,
    /// Password hashing used at registration
    pub hasher: Arc<dyn PasswordHasher>,
    /// Credential check used at login
    pub auth_provider: Arc<AuthenticationProvider>,
    /// Bearer-token filter run on every request
    pub auth_filter: Arc<AuthenticationFilter>,
    /// Route access rules
    pub access_policy: Arc<AccessPolicy>,
}

impl AppState {
    /// Build the state with the default Argon2 password hasher
    pub fn new<S>(config: GatehouseConfig, users: Arc<S>) -> Result<Self>
    where
        S: UserStore + 'static,
    {
        Self::with_hasher(config, users, Arc::new(Argon2Hasher::new()))
    }

    /// Build the state with a caller-supplied password hasher
    pub fn with_hasher<S>(
        config: GatehouseConfig,
        users: Arc<S>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Result<Self>
    where
        S: UserStore + 'static,
    {
        let token_service = Arc::new(config.token_service()?);
        let access_policy = Arc::new(config.access_policy()?);

        let lookup: Arc<dyn UserLookup> = users.clone();
        let auth_provider = Arc::new(AuthenticationProvider::new(lookup.clone(), hasher.clone()));
        let auth_filter = Arc::new(AuthenticationFilter::new(token_service.clone(), lookup));

        Ok(Self {
            config: Arc::new(config),
            token_service,
            users,
            hasher,
            auth_provider,
            auth_filter,
            access_policy,
        })
    }
}
