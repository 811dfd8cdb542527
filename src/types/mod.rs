use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============= Identity Types =============

/// Authorization label attached 1:1 to a [`Principal`].
///
/// Roles are flat: `Admin` does not imply `User`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular account, granted on registration
    #[default]
    User,
    /// Administrative account
    Admin,
}

impl Role {
    /// The authority string granted to a principal holding this role.
    pub fn authority(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.authority())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(AppError::InvalidInput(format!("Unknown role: {}", other))),
        }
    }
}

/// An identity record as held by the user store.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    /// Unique, stable identifier (the e-mail address in the bundled API)
    pub identifier: String,
    /// Given name, may be empty
    pub first_name: String,
    /// Family name, may be empty
    pub last_name: String,
    /// PHC-formatted credential hash
    pub password_hash: String,
    /// The single role held
    pub role: Role,
}

impl Principal {
    /// Creates a principal with empty display names.
    pub fn new(identifier: impl Into<String>, password_hash: impl Into<String>, role: Role) -> Self {
        Self {
            identifier: identifier.into(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: password_hash.into(),
            role,
        }
    }

    /// Sets the display names.
    pub fn with_names(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    /// First and last name joined by a space, trimmed.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("identifier", &self.identifier)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Raw login credentials. Never persisted.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// Claimed identifier
    pub identifier: String,
    /// Plaintext password
    pub secret: String,
}

impl Credentials {
    /// Pairs an identifier with its secret.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Verified token payload.
///
/// Timestamps are carried as milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Principal identifier
    pub sub: String,
    /// Issued-at instant
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub iat: DateTime<Utc>,
    /// Expiry instant; the token is rejected from this millisecond on
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub exp: DateTime<Utc>,
}

// ============= Authentication Types =============

/// Body of `POST /api/v1/auth/register`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Given name
    pub firstname: String,
    /// Family name
    pub lastname: String,
    /// E-mail address, used as the identifier
    pub email: String,
    /// Plaintext password, at least 8 characters
    pub password: String,
}

/// Body of `POST /api/v1/auth/authenticate`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthenticationRequest {
    /// Registered e-mail address
    pub email: String,
    /// Plaintext password
    pub password: String,
}

impl From<AuthenticationRequest> for Credentials {
    fn from(request: AuthenticationRequest) -> Self {
        Credentials::new(request.email, request.password)
    }
}

/// Token returned by both auth endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthenticationResponse {
    /// Compact JWS bearer token
    pub token: String,
}

/// Public view of the caller returned by protected endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct PrincipalView {
    /// Principal identifier
    pub identifier: String,
    /// Display name
    pub name: String,
    /// Held role
    pub role: Role,
}

impl From<&Principal> for PrincipalView {
    fn from(principal: &Principal) -> Self {
        Self {
            identifier: principal.identifier.clone(),
            name: principal.display_name(),
            role: principal.role,
        }
    }
}

/// Body returned by the demo endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct GreetingResponse {
    /// Greeting text
    pub message: String,
    /// Who was greeted
    pub principal: PrincipalView,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`
    pub status: String,
    /// Crate version
    pub version: String,
}

// ============= Error Types =============

/// Token verification failures. Handled locally by the authentication filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Not a decodable HS256 token with a `sub` claim
    #[error("token is malformed")]
    Malformed,

    /// Signature does not match the configured key
    #[error("token signature is invalid")]
    SignatureInvalid,

    /// `exp` is at or before the current time
    #[error("token has expired")]
    Expired,
}

/// Login failures, reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No principal with the given identifier
    #[error("user not found")]
    UserNotFound,

    /// The secret does not match the stored hash
    #[error("bad credentials")]
    BadCredentials,

    /// The store or hasher failed
    #[error("authentication backend failure: {0}")]
    Backend(String),
}

/// Raised by the access policy when a request may not proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    /// The route is protected and the context does not satisfy it
    #[error("access denied")]
    Forbidden,
}

/// Crate-wide error, rendered as `{"error": ...}` with a matching status.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Invalid key, lifetime or pattern (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// User store failure (500)
    #[error("Database error: {0}")]
    Database(String),

    /// Login rejected (401)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Access policy denial (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Identifier already taken (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request body failed validation (400)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Anything else (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            // One message for both so the login surface does not enumerate accounts
            AuthError::UserNotFound | AuthError::BadCredentials => {
                AppError::Auth("Invalid credentials".to_string())
            }
            AuthError::Backend(msg) => AppError::Internal(msg),
        }
    }
}

impl From<AuthorizationError> for AppError {
    fn from(err: AuthorizationError) -> Self {
        AppError::Forbidden(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Config(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Database(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Auth(msg) => (axum::http::StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (axum::http::StatusCode::FORBIDDEN, msg),
            AppError::Conflict(msg) => (axum::http::StatusCode::CONFLICT, msg),
            AppError::InvalidInput(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Result alias over [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
