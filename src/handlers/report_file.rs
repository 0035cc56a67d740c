use crate::{
    app_state::AppState,
    response::{X_ACCEL_REDIRECT, X_AUTHORIZATION, X_FILENAME, compose},
    types::{GatewayError, ObjectLocator},
};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderName, header},
    response::{IntoResponse, Response},
};
use tracing::Instrument;

/// GET /api/v1/reports/file/{report_file_id} - hand out read access to one report
///
/// Pipeline: resolve the identifier, delegate with the configured strategy,
/// compose the response. Any stage failure ends the request with an empty
/// error response.
pub async fn report_file(
    Path(report_file_id): Path<String>,
    State(app_state): State<AppState>,
) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("report_file", %request_id, report_file_id = %report_file_id);

    async move {
        tracing::info!("INCOMING: report file {}", report_file_id);

        let locator = match app_state.resolver.resolve(&report_file_id) {
            Ok(locator) => locator,
            Err(e) => {
                tracing::warn!("Failed to resolve report '{}': {}", report_file_id, e);
                return e.into_response();
            }
        };

        match delegate(&app_state, &locator).await {
            Ok(response) => {
                log_outgoing(response.headers());
                response
            }
            Err(e) => {
                tracing::error!("Report '{}' ({}) failed: {}", report_file_id, locator, e);
                e.into_response()
            }
        }
    }
    .instrument(span)
    .await
}

async fn delegate(app_state: &AppState, locator: &ObjectLocator) -> Result<Response, GatewayError> {
    let delegation = app_state.delegate.delegate(locator).await?;
    tracing::debug!("Built {} delegation for {}", delegation.kind(), locator);
    compose(delegation)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

fn log_outgoing(headers: &HeaderMap) {
    if !headers.contains_key(&X_ACCEL_REDIRECT) {
        tracing::info!(
            "OUTGOING: streaming Content-Type {} Content-Disposition {}",
            header_str(headers, &header::CONTENT_TYPE),
            header_str(headers, &header::CONTENT_DISPOSITION)
        );
        return;
    }

    tracing::info!(
        "OUTGOING: X-Accel-Redirect {} X-Authorization {} X-Filename {}",
        header_str(headers, &X_ACCEL_REDIRECT),
        header_str(headers, &X_AUTHORIZATION),
        header_str(headers, &X_FILENAME)
    );
}
