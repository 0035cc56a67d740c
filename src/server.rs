use crate::{app_state::AppState, handlers};
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Route serving report files
pub const REPORT_FILE_ROUTE: &str = "/api/v1/reports/file/{report_file_id}";

/// Create the application router with all routes and middleware
///
/// This function is used by both main.rs and integration tests to ensure
/// the same server configuration is used in both production and tests.
pub fn create_app(app_state: AppState) -> Router {
    use handlers::{healthz, not_found, report_file};

    Router::new()
        .route(REPORT_FILE_ROUTE, get(report_file))
        .route("/healthz", get(healthz))
        // Fallback for 404 Not Found
        .fallback(not_found)
        // Add shared state
        .with_state(app_state)
        // Add tracing
        .layer(TraceLayer::new_for_http())
}
