use crate::auth::password::PasswordHasher;
use crate::db::UserLookup;
use crate::types::{AuthError, Credentials, Principal};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// Verifies raw credentials against a stored principal at login time.
///
/// Never used by the per-request filter; bearer tokens are the only
/// credential accepted after login.
pub struct AuthenticationProvider {
    users: Arc<dyn UserLookup>,
    hasher: Arc<dyn PasswordHasher>,
    /// Hash verified against when the identifier is unknown, so both failure
    /// paths cost one hash verification.
    decoy_hash: OnceLock<Option<String>>,
}

impl AuthenticationProvider {
    /// Creates a provider over a user lookup and a password hasher.
    pub fn new(users: Arc<dyn UserLookup>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            users,
            hasher,
            decoy_hash: OnceLock::new(),
        }
    }

    /// Resolves and checks the credentials.
    ///
    /// Fails with [`AuthError::UserNotFound`] for an unknown identifier and
    /// [`AuthError::BadCredentials`] for a secret that does not match.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Principal, AuthError> {
        let principal = self
            .users
            .find_by_identifier(&credentials.identifier)
            .await
            .map_err(|e| {
                warn!(error = %e, "User lookup failed during login");
                AuthError::Backend(e.to_string())
            })?;

        let Some(principal) = principal else {
            self.burn_decoy(&credentials.secret);
            debug!(identifier = %credentials.identifier, "Login for unknown identifier");
            return Err(AuthError::UserNotFound);
        };

        let matches = self
            .hasher
            .verify(&credentials.secret, &principal.password_hash)
            .map_err(|e| {
                warn!(identifier = %principal.identifier, error = %e, "Stored credential hash is unusable");
                AuthError::Backend(e.to_string())
            })?;

        if !matches {
            debug!(identifier = %principal.identifier, "Login with bad credentials");
            return Err(AuthError::BadCredentials);
        }

        Ok(principal)
    }

    fn burn_decoy(&self, secret: &str) {
        let decoy = self
            .decoy_hash
            .get_or_init(|| self.hasher.hash("gatehouse-decoy-secret").ok());

        if let Some(hash) = decoy {
            let _ = self.hasher.verify(secret, hash);
        }
    }
}
