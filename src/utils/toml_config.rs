//! TOML-based configuration for Gatehouse
//!
//! Settings are read once at startup from `gatehouse.toml` and never change
//! afterwards. The signing key itself is normally kept out of the file and
//! read from the environment variable named by `auth.secret_key_env`.

use crate::auth::jwt::TokenService;
use crate::auth::policy::AccessPolicy;
use crate::types::{AppError, Role};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure loaded from gatehouse.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatehouseConfig {
    /// `[server]` section
    #[serde(default)]
    pub server: ServerConfig,

    /// `[auth]` section
    #[serde(default)]
    pub auth: AuthConfig,
}

// ============= Server Configuration =============

/// Listener and logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Fallback `tracing` filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

// ============= Authentication Configuration =============

/// Signing key, token lifetime and route rules
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Inline base64 signing key. Takes precedence over `secret_key_env`.
    #[serde(default, skip_serializing)]
    pub secret_key: Option<String>,

    /// Environment variable name containing the base64 signing key
    #[serde(default = "default_secret_key_env")]
    pub secret_key_env: String,

    /// Token lifetime in milliseconds
    #[serde(default = "default_expiration_millis")]
    pub expiration_millis: i64,

    /// Ordered path patterns reachable without authentication
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,

    /// Optional role restrictions for protected paths
    #[serde(default)]
    pub role_rules: Vec<RoleRuleConfig>,
}

/// One `[[auth.role_rules]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRuleConfig {
    /// Path pattern the rule covers
    pub pattern: String,
    /// Roles allowed through
    pub roles: Vec<Role>,
}

fn default_secret_key_env() -> String {
    "GATEHOUSE_SECRET_KEY".to_string()
}

fn default_expiration_millis() -> i64 {
    // 24 hours
    86_400_000
}

fn default_public_paths() -> Vec<String> {
    vec!["/api/v1/auth/**".to_string(), "/health".to_string()]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            secret_key_env: default_secret_key_env(),
            expiration_millis: default_expiration_millis(),
            public_paths: default_public_paths(),
            role_rules: Vec::new(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("secret_key_env", &self.secret_key_env)
            .field("expiration_millis", &self.expiration_millis)
            .field("public_paths", &self.public_paths)
            .field("role_rules", &self.role_rules)
            .finish()
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The path does not exist
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O failure while reading
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Not valid TOML for this schema
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Parsed, but a component could not be built from it
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// `secret_key_env` names an unset variable
    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl GatehouseConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file without validating it
    ///
    /// Used by `config` to display settings even when the signing key is not
    /// available in the current environment.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: GatehouseConfig = toml::from_str(content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that every auth component can be built from this configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.token_service()?;
        AccessPolicy::from_config(&self.auth).map_err(validation_error)?;
        Ok(())
    }

    /// Resolve the base64 signing key, preferring the inline value
    pub fn secret_key(&self) -> Result<String, ConfigError> {
        if let Some(ref key) = self.auth.secret_key {
            return Ok(key.clone());
        }

        std::env::var(&self.auth.secret_key_env)
            .map_err(|_| ConfigError::MissingEnvVar(self.auth.secret_key_env.clone()))
    }

    /// Build the token service described by the `[auth]` section
    pub fn token_service(&self) -> Result<TokenService, ConfigError> {
        let key = self.secret_key()?;
        TokenService::new(&key, self.auth.expiration_millis).map_err(validation_error)
    }

    /// Build the access policy described by the `[auth]` section
    pub fn access_policy(&self) -> Result<AccessPolicy, ConfigError> {
        AccessPolicy::from_config(&self.auth).map_err(validation_error)
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn validation_error(err: AppError) -> ConfigError {
    match err {
        AppError::Config(msg) => ConfigError::ValidationError(msg),
        other => ConfigError::ValidationError(other.to_string()),
    }
}
