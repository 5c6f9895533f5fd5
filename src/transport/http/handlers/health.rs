use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy (store readable)", body = ApiResponse),
        (status = 503, description = "Service is unhealthy (store unreadable)", body = ApiResponse)
    )
)]
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.catalog.list().await {
        Ok(_) => (StatusCode::OK, Json(ApiResponse::ok())).into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::error(format!("store check failed: {}", e))),
        )
            .into_response(),
    }
}
