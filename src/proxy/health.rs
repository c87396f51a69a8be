use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "system",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_check_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::constants::VERSION,
    })
}
