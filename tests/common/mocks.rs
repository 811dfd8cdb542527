//! Mock collaborators for testing.
//!
//! Built with `mockall` so tests can script user-store and hasher behaviour,
//! including failures the in-memory store never produces.

use async_trait::async_trait;
use gatehouse::types::{Principal, Result};
use gatehouse::{PasswordHasher, UserLookup, UserStore};
use mockall::mock;

mock! {
    // User store with scripted lookups and saves
    pub Store {}

    #[async_trait]
    impl UserLookup for Store {
        async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Principal>>;
    }

    #[async_trait]
    impl UserStore for Store {
        async fn save(&self, principal: Principal) -> Result<()>;
    }
}

mock! {
    // Password hasher with scripted results
    pub Hasher {}

    impl PasswordHasher for Hasher {
        fn hash(&self, secret: &str) -> Result<String>;
        fn verify(&self, secret: &str, hash: &str) -> Result<bool>;
    }
}
