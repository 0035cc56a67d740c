use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::time::Duration;

/// Failures of a single store call
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NoSuchKey(String),
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("presign failed: {0}")]
    Presign(String),
    #[error("store backend error: {0}")]
    Backend(String),
    #[error("object stream error: {0}")]
    Stream(String),
    #[error("access denied: {0}")]
    AccessDenied(String),
}

/// Gateway errors, one variant per failure class of the retrieval pipeline
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configured location has no `<container>/<key>` shape
    #[error("malformed location '{0}'")]
    MalformedLocation(String),
    /// Identifier is not in the report catalog
    #[error("unknown report '{0}'")]
    UnknownReport(String),
    /// Store refused or failed to presign
    #[error("upstream signing failed: {0}")]
    UpstreamSigning(#[source] StoreError),
    /// Stream strategy could not stat, open or read the object
    #[error("retrieval failed: {0}")]
    RetrievalFailed(#[source] StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::UnknownReport(_) => StatusCode::NOT_FOUND,
            GatewayError::MalformedLocation(_)
            | GatewayError::UpstreamSigning(_)
            | GatewayError::RetrievalFailed(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failures never carry a body; the cause stays in the logs.
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        self.status_code().into_response()
    }
}
