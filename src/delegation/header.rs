use super::{Delegate, Delegation};
use crate::signing::{CanonicalRequest, Signer, content_type_for};
use crate::types::{GatewayError, ObjectLocator};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use url::Url;

/// Clock skew the store tolerates on `x-amz-date`, in seconds
pub const SIGNATURE_VALIDITY_SECS: i64 = 15 * 60;

const REDIRECT_BASE_URL: &str = "http://redirect.local/";

/// Signed-header delegation for a trusted reverse proxy
#[derive(Debug, Clone)]
pub struct HeaderDelegation {
    /// `AWS4 <access key id>:<signature>`
    pub authorization: String,
    /// Exact `x-amz-date` value that was signed
    pub amz_date: String,
    pub content_type: String,
    pub expiry_hint: DateTime<FixedOffset>,
    pub redirect: String,
    pub file_name: String,
}

/// Signs the canonical request locally; never talks to the store
pub struct HeaderStrategy {
    signer: Signer,
    redirect_prefix: String,
}

impl HeaderStrategy {
    pub fn new(signer: Signer, redirect_prefix: String) -> Self {
        Self {
            signer,
            redirect_prefix,
        }
    }

    /// Delegate with an explicit signing timestamp
    pub fn delegate_at(
        &self,
        locator: &ObjectLocator,
        timestamp: DateTime<FixedOffset>,
    ) -> Result<HeaderDelegation, GatewayError> {
        let file_name = locator.file_name().to_string();
        let content_type = content_type_for(&file_name);

        let canonical = CanonicalRequest::build(locator, content_type, &timestamp);
        let token = self.signer.sign(&canonical.to_signing_string())?;

        Ok(HeaderDelegation {
            authorization: self.signer.authorization(&token),
            amz_date: canonical.timestamp,
            content_type: content_type.to_string(),
            expiry_hint: timestamp + Duration::seconds(SIGNATURE_VALIDITY_SECS),
            redirect: format!("{}{}", self.redirect_prefix, encoded_key_path(&locator.key)?),
            file_name,
        })
    }
}

/// `/<key>` with every key segment percent-encoded
///
/// The signature covers the raw key; only the redirect the proxy parses is
/// encoded. Separators between segments are kept.
fn encoded_key_path(key: &str) -> Result<String, GatewayError> {
    let mut url =
        Url::parse(REDIRECT_BASE_URL).map_err(|e| GatewayError::Internal(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| GatewayError::Internal("redirect base cannot hold a path".to_string()))?
        .clear()
        .extend(key.split('/'));
    Ok(url.path().to_string())
}

#[async_trait::async_trait]
impl Delegate for HeaderStrategy {
    async fn delegate(&self, locator: &ObjectLocator) -> Result<Delegation, GatewayError> {
        let delegation = self.delegate_at(locator, Utc::now().fixed_offset())?;
        tracing::debug!(
            "Signed header delegation for {} (valid until {})",
            locator,
            delegation.expiry_hint
        );
        Ok(Delegation::Header(delegation))
    }
}
