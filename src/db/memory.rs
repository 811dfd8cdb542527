//! In-memory user store.
//!
//! Suitable for development, tests and single-instance deployments where
//! losing registrations on restart is acceptable.

use super::traits::{UserLookup, UserStore};
use crate::types::{AppError, Principal, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Principals keyed by identifier behind a read-write lock.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, Principal>>,
}

impl InMemoryUserStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with the given principals.
    pub fn with_principals(principals: impl IntoIterator<Item = Principal>) -> Self {
        let users = principals
            .into_iter()
            .map(|p| (p.identifier.clone(), p))
            .collect();

        Self {
            users: RwLock::new(users),
        }
    }

    /// Number of stored principals.
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    /// Whether the store holds no principals.
    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

#[async_trait]
impl UserLookup for InMemoryUserStore {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Principal>> {
        Ok(self.users.read().get(identifier).cloned())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn save(&self, principal: Principal) -> Result<()> {
        let mut users = self.users.write();

        if users.contains_key(&principal.identifier) {
            return Err(AppError::Conflict(format!(
                "User '{}' already exists",
                principal.identifier
            )));
        }

        users.insert(principal.identifier.clone(), principal);
        Ok(())
    }
}
