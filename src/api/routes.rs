use crate::auth::{middleware::authentication_filter, policy::access_policy};
use crate::AppState;
use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};

/// Builds the application router with the authentication pipeline applied.
///
/// Both layers wrap the whole router, fallback included, so a path nobody
/// registered is still subject to the access policy.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(crate::api::handlers::health::health))
        .route(
            "/api/v1/auth/register",
            post(crate::api::handlers::auth::register),
        )
        .route(
            "/api/v1/auth/authenticate",
            post(crate::api::handlers::auth::authenticate),
        )
        .route(
            "/api/v1/demo-controller",
            get(crate::api::handlers::demo::say_hello),
        )
        .fallback(|| async { StatusCode::NOT_FOUND })
        // Layers run bottom-up: the filter populates the context, then the policy reads it
        .layer(middleware::from_fn_with_state(
            state.access_policy.clone(),
            access_policy,
        ))
        .layer(middleware::from_fn_with_state(
            state.auth_filter.clone(),
            authentication_filter,
        ))
        .with_state(state)
}
