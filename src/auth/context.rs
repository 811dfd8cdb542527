//! Per-request security context.

use crate::types::{Principal, Role};
use std::collections::BTreeSet;

/// Holder of the authenticated principal for a single request.
///
/// Created empty when a request enters the pipeline and written at most once.
/// It travels in the request's extensions and is dropped with the request.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    principal: Option<Principal>,
    authorities: BTreeSet<String>,
}

impl SecurityContext {
    /// An empty, unauthenticated context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Populates the context. First write wins: returns `false` and leaves the
    /// context untouched if a principal is already present.
    pub fn set(&mut self, principal: Principal) -> bool {
        if self.principal.is_some() {
            return false;
        }

        self.authorities.insert(principal.role.authority().to_string());
        self.principal = Some(principal);
        true
    }

    /// The authenticated principal, if any.
    pub fn get(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Granted authority names, e.g. `"USER"`.
    pub fn authorities(&self) -> &BTreeSet<String> {
        &self.authorities
    }

    /// Whether a principal has been set.
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Whether the principal's authorities include `role`.
    pub fn has_role(&self, role: Role) -> bool {
        self.authorities.contains(role.authority())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(identifier: &str, role: Role) -> Principal {
        Principal::new(identifier, "$argon2id$unused", role)
    }

    #[test]
    fn test_new_context_is_empty() {
        let context = SecurityContext::new();

        assert!(context.get().is_none());
        assert!(!context.is_authenticated());
        assert!(context.authorities().is_empty());
    }

    #[test]
    fn test_set_populates_principal_and_authority() {
        let mut context = SecurityContext::new();

        assert!(context.set(principal("a@b.com", Role::Admin)));

        assert_eq!(context.get().map(|p| p.identifier.as_str()), Some("a@b.com"));
        assert!(context.has_role(Role::Admin));
        assert!(!context.has_role(Role::User));
        assert_eq!(context.authorities().len(), 1);
    }

    #[test]
    fn test_first_write_wins() {
        let mut context = SecurityContext::new();

        assert!(context.set(principal("first@b.com", Role::User)));
        assert!(!context.set(principal("second@b.com", Role::Admin)));

        let current = context.get().expect("principal should be set");
        assert_eq!(current.identifier, "first@b.com");
        assert!(!context.has_role(Role::Admin), "authorities must not be merged");
    }
}
