use crate::types::HealthResponse;
use axum::Json;

/// Liveness check
///
/// `GET /health`. Always public.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
