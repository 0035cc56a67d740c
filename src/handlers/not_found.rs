use axum::{http::StatusCode, response::IntoResponse};

/// Fallback handler for 404 Not Found
pub async fn not_found() -> impl IntoResponse {
    StatusCode::NOT_FOUND
}
