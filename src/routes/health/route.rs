use axum::{Router, http::StatusCode, routing::get};

pub fn create_route() -> Router {
    Router::new().route("/health", get(health))
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy")
    ),
    tag = "Health"
)]
pub async fn health() -> StatusCode {
    StatusCode::OK
}
