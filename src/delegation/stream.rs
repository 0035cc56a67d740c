use super::{Delegate, Delegation, with_timeout};
use crate::signing::content_type_for;
use crate::storage::{ObjectStore, ObjectStream};
use crate::types::{GatewayError, ObjectLocator, ObjectMetadata};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Inline delegation: the gateway serves the bytes itself
pub struct StreamDelegation {
    pub content_type: String,
    pub content_disposition: String,
    pub content_length: Option<u64>,
    pub etag: Option<String>,
    pub body: ObjectStream,
}

/// Reads the object through the gateway
///
/// Metadata, the open call and the first chunk are all fetched before a
/// delegation is returned, so nothing is committed to the client until the
/// object is known to be readable.
pub struct StreamStrategy {
    store: Arc<dyn ObjectStore>,
    timeout: Duration,
}

impl StreamStrategy {
    pub fn new(store: Arc<dyn ObjectStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }
}

/// `attachment; filename=<name>`, quoted when the name needs it
fn content_disposition(file_name: &str) -> String {
    if file_name
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, ';' | ',' | '"'))
    {
        format!(
            "attachment; filename=\"{}\"",
            file_name.replace('\\', "\\\\").replace('"', "\\\"")
        )
    } else {
        format!("attachment; filename={}", file_name)
    }
}

fn resolve_content_type(metadata: &ObjectMetadata, file_name: &str) -> String {
    metadata
        .content_type
        .clone()
        .filter(|ct| !ct.is_empty())
        .or_else(|| Some(content_type_for(file_name).to_string()).filter(|ct| !ct.is_empty()))
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}

#[async_trait::async_trait]
impl Delegate for StreamStrategy {
    async fn delegate(&self, locator: &ObjectLocator) -> Result<Delegation, GatewayError> {
        let metadata = with_timeout(self.timeout, self.store.stat(locator))
            .await
            .map_err(GatewayError::RetrievalFailed)?;

        let mut body = with_timeout(self.timeout, self.store.open(locator))
            .await
            .map_err(GatewayError::RetrievalFailed)?;

        // Pull the first chunk before any response bytes exist
        let first = with_timeout(self.timeout, async { body.next().await.transpose() })
            .await
            .map_err(GatewayError::RetrievalFailed)?;

        let name = locator.to_string();
        let body: ObjectStream = Box::pin(stream::iter(first.map(Ok)).chain(body).map(
            move |chunk| {
                if let Err(e) = &chunk {
                    tracing::error!("Stream of {} aborted mid-body: {}", name, e);
                }
                chunk
            },
        ));

        let file_name = locator.file_name();
        tracing::debug!(
            "Streaming {} ({} bytes)",
            locator,
            metadata
                .size
                .map(|size| size.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );

        Ok(Delegation::Stream(StreamDelegation {
            content_type: resolve_content_type(&metadata, file_name),
            content_disposition: content_disposition(file_name),
            content_length: metadata.size,
            etag: metadata.etag,
            body,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegation::DEFAULT_STORE_TIMEOUT;
    use crate::storage::{InMemoryStore, PresignedUrl};
    use crate::types::{Credentials, StoreError};
    use bytes::Bytes;

    fn locator(key: &str) -> ObjectLocator {
        ObjectLocator {
            container: "bucket".to_string(),
            key: key.to_string(),
        }
    }

    /// Stat succeeds, the body fails on its first chunk
    struct BrokenBodyStore;

    #[async_trait::async_trait]
    impl ObjectStore for BrokenBodyStore {
        async fn stat(&self, locator: &ObjectLocator) -> Result<ObjectMetadata, StoreError> {
            Ok(ObjectMetadata {
                key: locator.key.clone(),
                size: Some(10),
                etag: None,
                content_type: None,
            })
        }

        async fn open(&self, _locator: &ObjectLocator) -> Result<ObjectStream, StoreError> {
            Ok(Box::pin(stream::once(async {
                Err::<Bytes, _>(StoreError::Stream("connection reset".to_string()))
            })))
        }

        async fn presign_get(
            &self,
            _locator: &ObjectLocator,
            _ttl: Duration,
        ) -> Result<PresignedUrl, StoreError> {
            Err(StoreError::Presign("unsupported".to_string()))
        }
    }

    async fn collect(mut body: ObjectStream) -> Vec<u8> {
        let mut data = Vec::new();
        while let Some(chunk) = body.next().await {
            data.extend_from_slice(&chunk.unwrap());
        }
        data
    }

    #[tokio::test]
    async fn test_stream_delegation() {
        let store = InMemoryStore::new(Credentials::new("AKID", "k"));
        store
            .put_object(&locator("reports/q1.xlsx"), Bytes::from_static(b"sheet"), None)
            .await;

        let strategy = StreamStrategy::new(Arc::new(store), DEFAULT_STORE_TIMEOUT);
        let Delegation::Stream(delegation) =
            strategy.delegate(&locator("reports/q1.xlsx")).await.unwrap()
        else {
            panic!("expected stream delegation");
        };

        assert_eq!(
            delegation.content_type,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(delegation.content_disposition, "attachment; filename=q1.xlsx");
        assert_eq!(delegation.content_length, Some(5));
        assert_eq!(collect(delegation.body).await, b"sheet");
    }

    #[tokio::test]
    async fn test_missing_object_fails_before_body() {
        let store = InMemoryStore::new(Credentials::new("AKID", "k"));
        let strategy = StreamStrategy::new(Arc::new(store), DEFAULT_STORE_TIMEOUT);
        assert!(matches!(
            strategy.delegate(&locator("missing.xlsx")).await,
            Err(GatewayError::RetrievalFailed(StoreError::NoSuchKey(_)))
        ));
    }

    #[tokio::test]
    async fn test_first_chunk_failure_is_retrieval_error() {
        let strategy = StreamStrategy::new(Arc::new(BrokenBodyStore), DEFAULT_STORE_TIMEOUT);
        assert!(matches!(
            strategy.delegate(&locator("q1.xlsx")).await,
            Err(GatewayError::RetrievalFailed(StoreError::Stream(_)))
        ));
    }

    #[tokio::test]
    async fn test_empty_object() {
        let store = InMemoryStore::new(Credentials::new("AKID", "k"));
        store.put_object(&locator("empty.csv"), Bytes::new(), None).await;

        let strategy = StreamStrategy::new(Arc::new(store), DEFAULT_STORE_TIMEOUT);
        let Delegation::Stream(delegation) = strategy.delegate(&locator("empty.csv")).await.unwrap()
        else {
            panic!("expected stream delegation");
        };
        assert_eq!(delegation.content_type, "application/octet-stream");
        assert!(collect(delegation.body).await.is_empty());
    }

    #[test]
    fn test_content_disposition_quoting() {
        assert_eq!(content_disposition("a.pdf"), "attachment; filename=a.pdf");
        assert_eq!(
            content_disposition("q1 report.pdf"),
            "attachment; filename=\"q1 report.pdf\""
        );
    }

    #[test]
    fn test_store_content_type_wins() {
        let metadata = ObjectMetadata {
            key: "a.xlsx".to_string(),
            size: None,
            etag: None,
            content_type: Some("text/plain".to_string()),
        };
        assert_eq!(resolve_content_type(&metadata, "a.xlsx"), "text/plain");
    }
}
