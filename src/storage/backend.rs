use crate::types::{ObjectLocator, ObjectMetadata, error::StoreError};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::Stream;
use std::pin::Pin;
use std::time::Duration;

/// Byte stream of an object body
pub type ObjectStream = Pin<Box<dyn Stream<Item = Result<Bytes, StoreError>> + Send>>;

/// URL produced by the store's own presigning facility
#[derive(Debug, Clone)]
pub struct PresignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Object store trait - the few calls the gateway makes against the store
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch object metadata without the body
    async fn stat(&self, locator: &ObjectLocator) -> Result<ObjectMetadata, StoreError>;

    /// Open a read stream over the object body
    async fn open(&self, locator: &ObjectLocator) -> Result<ObjectStream, StoreError>;

    /// Presign a GET for the object, valid for `ttl`
    async fn presign_get(
        &self,
        locator: &ObjectLocator,
        ttl: Duration,
    ) -> Result<PresignedUrl, StoreError>;
}
