//! User store abstraction traits
//!
//! The authentication core only ever needs to resolve a principal by its
//! identifier, so that is all [`UserLookup`] asks of a backend. Registration
//! additionally needs to persist new principals, which [`UserStore`] adds.
//!
//! # Example
//!
//! ```rust,ignore
//! use gatehouse::db::{InMemoryUserStore, UserLookup};
//!
//! let store = InMemoryUserStore::new();
//! let principal = store.find_by_identifier("a@b.com").await?;
//! ```

use crate::types::{Principal, Result};
use async_trait::async_trait;

/// Resolves principals by identifier.
///
/// A miss is `Ok(None)`; errors are reserved for backend failures such as a
/// lost connection. Callers decide how a miss is reported.
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// Find a principal by its unique identifier
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Principal>>;
}

/// A [`UserLookup`] that can also persist new principals.
#[async_trait]
pub trait UserStore: UserLookup {
    /// Persist a new principal.
    ///
    /// Fails with [`AppError::Conflict`](crate::types::AppError::Conflict) if
    /// the identifier is already taken.
    async fn save(&self, principal: Principal) -> Result<()>;
}
