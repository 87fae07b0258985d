use axum::http::StatusCode;
use axum::response::IntoResponse;

/// GET the liveness of the hub server
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Hub server is up and responding to requests", body = String),
    )
)]
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "healthy")
}
