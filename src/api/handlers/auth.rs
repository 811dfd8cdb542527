use crate::{
    auth::PasswordHasher,
    db::{UserLookup, UserStore},
    types::{
        AppError, AuthenticationRequest, AuthenticationResponse, Credentials, Principal,
        RegisterRequest, Result, Role,
    },
    AppState,
};
use axum::{extract::State, Json};
use tracing::info;

/// Register a new user
///
/// `POST /api/v1/auth/register`. New principals always get [`Role::User`].
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthenticationResponse>> {
    // Validate input
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(AppError::InvalidInput(
            "A valid email address is required".to_string(),
        ));
    }
    if payload.password.len() < 8 {
        return Err(AppError::InvalidInput(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    // Check if user exists
    if state
        .users
        .find_by_identifier(&payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let password_hash = state.hasher.hash(&payload.password)?;
    let principal = Principal::new(payload.email, password_hash, Role::User)
        .with_names(payload.firstname, payload.lastname);

    let token = state.token_service.issue(&principal)?;
    let identifier = principal.identifier.clone();

    state.users.save(principal).await?;
    info!(identifier = %identifier, "Registered new user");

    Ok(Json(AuthenticationResponse { token }))
}

/// Login with email and password
///
/// `POST /api/v1/auth/authenticate`. Unknown users and wrong passwords both
/// answer 401 with the same message.
pub async fn authenticate(
    State(state): State<AppState>,
    Json(payload): Json<AuthenticationRequest>,
) -> Result<Json<AuthenticationResponse>> {
    let credentials = Credentials::from(payload);

    let principal = state.auth_provider.authenticate(&credentials).await?;
    let token = state.token_service.issue(&principal)?;

    info!(identifier = %principal.identifier, "Login succeeded");

    Ok(Json(AuthenticationResponse { token }))
}
