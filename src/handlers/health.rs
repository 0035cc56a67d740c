use axum::{http::StatusCode, response::IntoResponse};

/// GET /healthz - liveness probe for the proxy
pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
