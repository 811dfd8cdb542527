//! Shared fixtures for integration tests.
#![allow(dead_code)]

pub mod mocks;

use gatehouse::{GatehouseConfig, Principal, Role, TokenService};

/// base64("0123456789abcdef0123456789abcdef")
pub const TEST_KEY: &str = "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=";

/// A different 32-byte key, base64("fedcba9876543210fedcba9876543210")
pub const OTHER_KEY: &str = "ZmVkY2JhOTg3NjU0MzIxMGZlZGNiYTk4NzY1NDMyMTA=";

/// Configuration with an inline key, one-hour tokens and an admin-only area.
pub fn test_config() -> GatehouseConfig {
    GatehouseConfig::parse(&format!(
        r#"
[auth]
secret_key = "{}"
expiration_millis = 3600000
public_paths = ["/api/v1/auth/**", "/health"]

[[auth.role_rules]]
pattern = "/api/v1/admin/**"
roles = ["ADMIN"]
"#,
        TEST_KEY
    ))
    .expect("test config should be valid")
}

pub fn test_tokens() -> TokenService {
    TokenService::new(TEST_KEY, 3_600_000).expect("valid test key")
}

pub fn principal(identifier: &str, role: Role) -> Principal {
    Principal::new(identifier, "unused-hash", role).with_names("Test", "User")
}
