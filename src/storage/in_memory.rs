use super::backend::{ObjectStore, ObjectStream, PresignedUrl};
use crate::signing;
use crate::types::{Credentials, ObjectLocator, ObjectMetadata, error::StoreError};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

const PRESIGN_BASE_URL: &str = "http://memory.local/";

/// In-memory object store for testing/development
///
/// Presigned URLs carry `AWSAccessKeyId`, `Expires` (unix seconds) and
/// `Signature` query parameters, and can be checked with
/// [`InMemoryStore::verify_presigned`].
#[derive(Clone)]
pub struct InMemoryStore {
    objects: Arc<RwLock<HashMap<(String, String), StoredObject>>>,
    credentials: Credentials,
}

#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    metadata: ObjectMetadata,
}

impl InMemoryStore {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            credentials,
        }
    }

    fn calculate_etag(data: &[u8]) -> String {
        use sha2::{Digest, Sha256};
        let hash = Sha256::digest(data);
        format!("\"{}\"", hex::encode(hash))
    }

    fn presign_payload(expires: i64, path: &str) -> String {
        format!("GET\n{}\n{}", expires, path)
    }

    /// Store an object, replacing any previous version
    pub async fn put_object(
        &self,
        locator: &ObjectLocator,
        data: impl Into<Bytes>,
        content_type: Option<&str>,
    ) {
        let data = data.into();
        let metadata = ObjectMetadata {
            key: locator.key.clone(),
            size: Some(data.len() as u64),
            etag: Some(Self::calculate_etag(&data)),
            content_type: content_type.map(|s| s.to_string()),
        };

        let mut objects = self.objects.write().await;
        objects.insert(
            (locator.container.clone(), locator.key.clone()),
            StoredObject { data, metadata },
        );
    }

    /// Store the same bytes at every location, content type inferred from
    /// each file name
    pub async fn seed<'a>(
        &self,
        locators: impl IntoIterator<Item = &'a ObjectLocator>,
        data: Bytes,
    ) -> usize {
        let mut seeded = 0;
        for locator in locators {
            let content_type = signing::content_type_for(locator.file_name());
            let content_type = (!content_type.is_empty()).then_some(content_type);
            self.put_object(locator, data.clone(), content_type).await;
            seeded += 1;
        }
        seeded
    }

    /// Check a presigned URL the way the store would when serving it
    ///
    /// Fails with AccessDenied when the signature does not match this store's
    /// credentials or `Expires` is not after `now`.
    pub fn verify_presigned(&self, url: &str, now: DateTime<Utc>) -> Result<(), StoreError> {
        let url = Url::parse(url).map_err(|e| StoreError::AccessDenied(e.to_string()))?;

        let mut access_key_id = None;
        let mut expires = None;
        let mut signature = None;
        for (name, value) in url.query_pairs() {
            match name.as_ref() {
                "AWSAccessKeyId" => access_key_id = Some(value.into_owned()),
                "Expires" => expires = Some(value.into_owned()),
                "Signature" => signature = Some(value.into_owned()),
                _ => {}
            }
        }

        let (Some(access_key_id), Some(expires), Some(signature)) =
            (access_key_id, expires, signature)
        else {
            return Err(StoreError::AccessDenied(
                "Query-string authentication requires AWSAccessKeyId, Expires and Signature"
                    .to_string(),
            ));
        };

        if access_key_id != self.credentials.access_key_id {
            return Err(StoreError::AccessDenied("Unknown access key".to_string()));
        }

        let expires: i64 = expires
            .parse()
            .map_err(|_| StoreError::AccessDenied("Invalid Expires".to_string()))?;

        let expected = signing::sign(
            &Self::presign_payload(expires, url.path()),
            &self.credentials.secret_access_key,
        )
        .map_err(|e| StoreError::AccessDenied(e.to_string()))?;

        if expected != signature {
            tracing::warn!("Presigned URL signature mismatch for {}", url.path());
            return Err(StoreError::AccessDenied("Signature does not match".to_string()));
        }

        if expires <= now.timestamp() {
            return Err(StoreError::AccessDenied("Request has expired".to_string()));
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl ObjectStore for InMemoryStore {
    async fn stat(&self, locator: &ObjectLocator) -> Result<ObjectMetadata, StoreError> {
        let objects = self.objects.read().await;

        objects
            .get(&(locator.container.clone(), locator.key.clone()))
            .map(|obj| obj.metadata.clone())
            .ok_or_else(|| StoreError::NoSuchKey(locator.to_string()))
    }

    async fn open(&self, locator: &ObjectLocator) -> Result<ObjectStream, StoreError> {
        let objects = self.objects.read().await;

        let obj = objects
            .get(&(locator.container.clone(), locator.key.clone()))
            .ok_or_else(|| StoreError::NoSuchKey(locator.to_string()))?;

        let data = obj.data.clone();
        Ok(Box::pin(stream::once(async { Ok::<_, StoreError>(data) })))
    }

    async fn presign_get(
        &self,
        locator: &ObjectLocator,
        ttl: Duration,
    ) -> Result<PresignedUrl, StoreError> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| StoreError::Presign(e.to_string()))?;
        let expires_at = Utc::now() + ttl;

        let mut url = Url::parse(PRESIGN_BASE_URL).map_err(|e| StoreError::Presign(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Presign("base URL cannot hold a path".to_string()))?
            .clear()
            .push(&locator.container)
            .extend(locator.key.split('/'));

        let signature = signing::sign(
            &Self::presign_payload(expires_at.timestamp(), url.path()),
            &self.credentials.secret_access_key,
        )
        .map_err(|e| StoreError::Presign(e.to_string()))?;

        url.query_pairs_mut()
            .append_pair("AWSAccessKeyId", &self.credentials.access_key_id)
            .append_pair("Expires", &expires_at.timestamp().to_string())
            .append_pair("Signature", &signature);

        Ok(PresignedUrl {
            url: url.into(),
            expires_at,
        })
    }
}
