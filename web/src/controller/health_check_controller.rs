use crate::controller::ApiResponse;
use axum::response::IntoResponse;
use serde_json::json;

/// GET liveness check. Does not touch the database.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API router is up and responding to requests"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    ApiResponse::new(json!({ "status": "healthy" }))
}
