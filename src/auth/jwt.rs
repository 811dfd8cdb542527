use crate::types::{AppError, Claims, Principal, Result, TokenError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::fmt;

/// Issues and verifies HS256-signed bearer tokens.
///
/// The signing key is decoded once at construction and never changes for the
/// lifetime of the service, so a single instance is shared by every request.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiration: Duration,
}

impl TokenService {
    /// Minimum decoded key length in bytes (256 bits, the HS256 output size)
    pub const MIN_KEY_LENGTH: usize = 32;

    /// Creates a new TokenService.
    ///
    /// # Arguments
    /// * `secret_key` - Base64-encoded symmetric key (at least 32 bytes once decoded)
    /// * `expiration_millis` - Token lifetime in milliseconds
    pub fn new(secret_key: &str, expiration_millis: i64) -> Result<Self> {
        let key = STANDARD
            .decode(secret_key.trim())
            .map_err(|e| AppError::Config(format!("Secret key is not valid base64: {}", e)))?;

        Self::from_bytes(&key, expiration_millis)
    }

    /// Creates a TokenService from raw key bytes.
    pub fn from_bytes(key: &[u8], expiration_millis: i64) -> Result<Self> {
        if key.len() < Self::MIN_KEY_LENGTH {
            return Err(AppError::Config(format!(
                "Secret key too short: got {} bytes, need at least {}",
                key.len(),
                Self::MIN_KEY_LENGTH
            )));
        }
        if expiration_millis <= 0 {
            return Err(AppError::Config(format!(
                "Token expiration must be positive, got {}ms",
                expiration_millis
            )));
        }

        let expiration = Duration::try_milliseconds(expiration_millis)
            .filter(|lifetime| Utc::now().checked_add_signed(*lifetime).is_some())
            .ok_or_else(|| {
                AppError::Config(format!(
                    "Token expiration {}ms is beyond the representable time range",
                    expiration_millis
                ))
            })?;

        // Expiry is checked against an explicit clock in `verify_at`, so the
        // library's own second-resolution exp check is switched off.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(key),
            decoding_key: DecodingKey::from_secret(key),
            validation,
            expiration,
        })
    }

    /// Configured token lifetime.
    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// Issues a token for the principal, valid from now.
    pub fn issue(&self, principal: &Principal) -> Result<String> {
        self.issue_at(principal, Utc::now())
    }

    /// Issues a token for the principal as if the current time were `now`.
    pub fn issue_at(&self, principal: &Principal, now: DateTime<Utc>) -> Result<String> {
        let issued_at = truncate_to_millis(now)?;
        let expires_at = issued_at
            .checked_add_signed(self.expiration)
            .ok_or_else(|| AppError::Internal("Token expiry is out of range".to_string()))?;
        let claims = Claims {
            sub: principal.identifier.clone(),
            iat: issued_at,
            exp: expires_at,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token against the wall clock and returns its claims.
    pub fn verify(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies a token as if the current time were `now`.
    ///
    /// The signature is checked before the payload is trusted; the HMAC
    /// comparison performed by the signing backend is constant-time.
    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                _ => TokenError::Malformed,
            })?;

        if claims.exp <= now {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::HS256)
            .field("expiration_ms", &self.expiration.num_milliseconds())
            .finish_non_exhaustive()
    }
}

fn truncate_to_millis(now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(now.timestamp_millis())
        .ok_or_else(|| AppError::Internal("Clock out of range".to_string()))
}
