use crate::auth::middleware::AuthUser;
use crate::types::{GreetingResponse, PrincipalView};
use axum::Json;

/// Protected greeting, reachable only with a valid bearer token.
pub async fn say_hello(AuthUser(principal): AuthUser) -> Json<GreetingResponse> {
    Json(GreetingResponse {
        message: "Hey! This is a secured endpoint!".to_string(),
        principal: PrincipalView::from(&principal),
    })
}
