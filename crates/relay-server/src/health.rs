use axum::response::IntoResponse;
use http::StatusCode;

/// Liveness probe; the relay holds no dependencies worth checking
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
