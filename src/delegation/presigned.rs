use super::{Delegate, Delegation, with_timeout};
use crate::storage::ObjectStore;
use crate::types::{GatewayError, ObjectLocator, StoreError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Presigned-URL delegation
#[derive(Debug, Clone)]
pub struct UrlDelegation {
    pub full_url: String,
    pub expires_at: DateTime<Utc>,
    /// Redirect prefix + presigned path + `?` + presigned query
    pub redirect: String,
    pub file_name: String,
}

/// Delegates through the store's own presigning facility
pub struct PresignedStrategy {
    store: Arc<dyn ObjectStore>,
    redirect_prefix: String,
    ttl: Duration,
    timeout: Duration,
}

impl PresignedStrategy {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        redirect_prefix: String,
        ttl: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            redirect_prefix,
            ttl,
            timeout,
        }
    }

    /// Internal redirect target for a presigned URL
    fn redirect_target(&self, presigned: &str) -> Result<String, StoreError> {
        let url = Url::parse(presigned)
            .map_err(|e| StoreError::Presign(format!("invalid presigned URL: {}", e)))?;

        Ok(match url.query() {
            Some(query) => format!("{}{}?{}", self.redirect_prefix, url.path(), query),
            None => format!("{}{}", self.redirect_prefix, url.path()),
        })
    }
}

#[async_trait::async_trait]
impl Delegate for PresignedStrategy {
    async fn delegate(&self, locator: &ObjectLocator) -> Result<Delegation, GatewayError> {
        let presigned = with_timeout(self.timeout, self.store.presign_get(locator, self.ttl))
            .await
            .map_err(GatewayError::UpstreamSigning)?;

        let redirect = self
            .redirect_target(&presigned.url)
            .map_err(GatewayError::UpstreamSigning)?;

        tracing::debug!(
            "Presigned {} until {}",
            locator,
            presigned.expires_at.to_rfc3339()
        );

        Ok(Delegation::Url(UrlDelegation {
            full_url: presigned.url,
            expires_at: presigned.expires_at,
            redirect,
            file_name: locator.file_name().to_string(),
        }))
    }
}
