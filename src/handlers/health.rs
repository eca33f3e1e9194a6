use crate::error::{HealthResponse, UnhealthyResponse};
use crate::models::BannerResponse;
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// GET / handler - Service banner
#[utoipa::path(
    get,
    path = routes::ROOT,
    responses(
        (status = 200, description = "Service is running", body = BannerResponse)
    ),
    tag = "health"
)]
pub async fn root_handler() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "CRUD API is running".to_string(),
        version: "1.0".to_string(),
    })
}

/// GET /health handler - Liveness check
///
/// Does not touch the store.
#[utoipa::path(
    get,
    path = routes::HEALTH,
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// GET /ready handler - Readiness check
///
/// Performs a lightweight round trip to the store.
/// Returns 200 OK if the store is reachable, 503 Service Unavailable otherwise.
#[utoipa::path(
    get,
    path = routes::READY,
    responses(
        (status = 200, description = "Store is reachable", body = HealthResponse),
        (status = 503, description = "Store is unreachable", body = UnhealthyResponse)
    ),
    tag = "health"
)]
pub async fn ready_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<HealthResponse>), (StatusCode, Json<UnhealthyResponse>)> {
    match state.repository.health_check().await {
        Ok(()) => {
            tracing::debug!("Readiness check passed");
            Ok((
                StatusCode::OK,
                Json(HealthResponse {
                    status: "ready".to_string(),
                }),
            ))
        }
        Err(e) => {
            tracing::error!("Readiness check failed: {}", e);
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(UnhealthyResponse {
                    status: "unavailable".to_string(),
                    error: format!("Cannot connect to database: {}", e),
                }),
            ))
        }
    }
}
