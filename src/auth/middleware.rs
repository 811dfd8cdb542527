use crate::auth::context::SecurityContext;
use crate::auth::jwt::TokenService;
use crate::db::UserLookup;
use crate::types::{AppError, Principal, TokenError};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

const BEARER_PREFIX: &str = "Bearer ";

/// What the filter did with a request. Informational only: every outcome
/// forwards the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// No `Authorization: Bearer` header
    NoCredentials,
    /// Token failed verification
    InvalidToken(TokenError),
    /// Token verified but its subject is not a known principal
    UnknownSubject,
    /// The user store could not be queried
    LookupFailed,
    /// Context already held a principal and was left as is
    AlreadyAuthenticated,
    /// Context populated with the token's principal
    Authenticated,
}

/// Resolves bearer tokens into a [`SecurityContext`].
///
/// Deliberately fail-open: a missing or bad token leaves the context empty and
/// the request continues. Rejection is the access policy's job.
pub struct AuthenticationFilter {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserLookup>,
}

impl AuthenticationFilter {
    /// Creates a filter verifying with `tokens` and resolving subjects through `users`.
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserLookup>) -> Self {
        Self { tokens, users }
    }

    /// Runs the filter against an `Authorization` header value.
    pub async fn apply(
        &self,
        authorization: Option<&str>,
        context: &mut SecurityContext,
    ) -> FilterOutcome {
        let Some(token) = authorization.and_then(|h| h.strip_prefix(BEARER_PREFIX)) else {
            return FilterOutcome::NoCredentials;
        };

        let claims = match self.tokens.verify(token) {
            Ok(claims) => claims,
            Err(e) => return FilterOutcome::InvalidToken(e),
        };

        let principal = match self.users.find_by_identifier(&claims.sub).await {
            Ok(Some(principal)) => principal,
            Ok(None) => return FilterOutcome::UnknownSubject,
            Err(e) => {
                warn!(subject = %claims.sub, error = %e, "User lookup failed, continuing unauthenticated");
                return FilterOutcome::LookupFailed;
            }
        };

        if context.set(principal) {
            FilterOutcome::Authenticated
        } else {
            FilterOutcome::AlreadyAuthenticated
        }
    }
}

/// Marks a request the filter has already processed.
#[derive(Debug, Clone, Copy)]
struct FilterApplied;

/// Axum middleware running [`AuthenticationFilter`] once per request.
///
/// Ensures a [`SecurityContext`] is present in the request extensions for the
/// stages after it, populated or not.
pub async fn authentication_filter(
    State(filter): State<Arc<AuthenticationFilter>>,
    mut req: Request,
    next: Next,
) -> Response {
    if req.extensions().get::<FilterApplied>().is_some() {
        return next.run(req).await;
    }
    req.extensions_mut().insert(FilterApplied);

    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);

    let mut context = req
        .extensions_mut()
        .remove::<SecurityContext>()
        .unwrap_or_default();

    let outcome = filter.apply(authorization.as_deref(), &mut context).await;
    debug!(path = %req.uri().path(), outcome = ?outcome, "Authentication filter");

    req.extensions_mut().insert(context);
    next.run(req).await
}

/// Extractor for handlers that require the authenticated principal.
pub struct AuthUser(pub Principal);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .and_then(SecurityContext::get)
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Forbidden("Authentication required".to_string()))
    }
}
