//! Delegation strategies
//!
//! A deployment runs exactly one strategy. All of them start from a resolved
//! [`ObjectLocator`] and produce a [`Delegation`], which the response
//! composer turns into the wire response.

mod header;
mod presigned;
mod stream;

pub use header::{HeaderDelegation, HeaderStrategy, SIGNATURE_VALIDITY_SECS};
pub use presigned::{PresignedStrategy, UrlDelegation};
pub use stream::{StreamDelegation, StreamStrategy};

use crate::config::Strategy;
use crate::signing::Signer;
use crate::storage::ObjectStore;
use crate::types::{GatewayError, ObjectLocator, StoreError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Prefix the downstream proxy maps to the store
pub const DEFAULT_REDIRECT_PREFIX: &str = "/internal/report-files";

/// Lifetime of presigned URLs
pub const DEFAULT_PRESIGN_TTL: Duration = Duration::from_secs(60);

/// Upper bound for a single store call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(30);

/// Artifact granting time-bounded read access to one object
pub enum Delegation {
    Header(HeaderDelegation),
    Url(UrlDelegation),
    Stream(StreamDelegation),
}

impl Delegation {
    pub fn kind(&self) -> &'static str {
        match self {
            Delegation::Header(_) => "header",
            Delegation::Url(_) => "url",
            Delegation::Stream(_) => "stream",
        }
    }
}

/// A delegation strategy
#[async_trait::async_trait]
pub trait Delegate: Send + Sync {
    async fn delegate(&self, locator: &ObjectLocator) -> Result<Delegation, GatewayError>;
}

/// Settings shared by the strategies
#[derive(Debug, Clone)]
pub struct DelegationSettings {
    pub redirect_prefix: String,
    pub presign_ttl: Duration,
    pub store_timeout: Duration,
}

impl Default for DelegationSettings {
    fn default() -> Self {
        Self {
            redirect_prefix: DEFAULT_REDIRECT_PREFIX.to_string(),
            presign_ttl: DEFAULT_PRESIGN_TTL,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

/// Build the configured strategy
pub fn build_strategy(
    strategy: Strategy,
    signer: Signer,
    store: Arc<dyn ObjectStore>,
    settings: DelegationSettings,
) -> Arc<dyn Delegate> {
    match strategy {
        Strategy::Header => Arc::new(HeaderStrategy::new(signer, settings.redirect_prefix)),
        Strategy::Presigned => Arc::new(PresignedStrategy::new(
            store,
            settings.redirect_prefix,
            settings.presign_ttl,
            settings.store_timeout,
        )),
        Strategy::Stream => Arc::new(StreamStrategy::new(store, settings.store_timeout)),
    }
}

/// Run a store call, giving up after `timeout`
pub(crate) async fn with_timeout<T, F>(timeout: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| StoreError::Timeout(timeout))?
}
