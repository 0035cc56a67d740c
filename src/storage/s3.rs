use crate::storage::backend::{ObjectStore, ObjectStream, PresignedUrl};
use crate::types::{Credentials, ObjectLocator, ObjectMetadata, error::StoreError};
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use futures::stream;
use std::time::Duration;

/// S3-compatible store reached through one shared, pooled SDK client
pub struct S3Store {
    client: S3Client,
    name: String,
}

impl S3Store {
    pub async fn new(
        name: String,
        region: String,
        endpoint: Option<String>,
        force_path_style: bool,
        credentials: &Credentials,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region))
            .credentials_provider(aws_sdk_s3::config::Credentials::new(
                credentials.access_key_id.clone(),
                credentials.secret_access_key.clone(),
                None,
                None,
                "static",
            ))
            .load()
            .await;

        let mut s3_config_builder =
            aws_sdk_s3::config::Builder::from(&config).force_path_style(force_path_style);

        // Set custom endpoint if provided
        if let Some(endpoint_url) = endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint_url);
        }

        let client = S3Client::from_conf(s3_config_builder.build());

        Ok(Self { client, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn body_stream(name: String, body: ByteStream) -> ObjectStream {
        Box::pin(stream::unfold(body, move |mut body| {
            let name = name.clone();
            async move {
                let chunk = body.next().await?;
                let chunk = chunk.map_err(|e| {
                    tracing::error!("[{}] Failed to read object chunk: {}", name, e);
                    StoreError::Stream(e.to_string())
                });
                Some((chunk, body))
            }
        }))
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3Store {
    async fn stat(&self, locator: &ObjectLocator) -> Result<ObjectMetadata, StoreError> {
        tracing::debug!("[{}] Getting metadata for object: {}", self.name, locator);

        let result = self
            .client
            .head_object()
            .bucket(&locator.container)
            .key(&locator.key)
            .send()
            .await;

        match result {
            Ok(output) => Ok(ObjectMetadata {
                key: locator.key.clone(),
                size: output.content_length().and_then(|len| u64::try_from(len).ok()),
                etag: output.e_tag().map(|s| s.to_string()),
                content_type: output.content_type().map(|s| s.to_string()),
            }),
            Err(err) => {
                if err
                    .as_service_error()
                    .is_some_and(|service_err| service_err.is_not_found())
                {
                    tracing::warn!("[{}] Object not found: {}", self.name, locator);
                    return Err(StoreError::NoSuchKey(locator.to_string()));
                }
                tracing::error!(
                    "[{}] Failed to stat {}: {}",
                    self.name,
                    locator,
                    DisplayErrorContext(&err)
                );
                Err(StoreError::Backend(DisplayErrorContext(&err).to_string()))
            }
        }
    }

    async fn open(&self, locator: &ObjectLocator) -> Result<ObjectStream, StoreError> {
        tracing::debug!("[{}] Opening object: {}", self.name, locator);

        let result = self
            .client
            .get_object()
            .bucket(&locator.container)
            .key(&locator.key)
            .send()
            .await;

        match result {
            Ok(output) => Ok(Self::body_stream(self.name.clone(), output.body)),
            Err(err) => {
                if err
                    .as_service_error()
                    .is_some_and(|service_err| service_err.is_no_such_key())
                {
                    tracing::warn!("[{}] Object not found: {}", self.name, locator);
                    return Err(StoreError::NoSuchKey(locator.to_string()));
                }
                tracing::error!(
                    "[{}] Failed to open {}: {}",
                    self.name,
                    locator,
                    DisplayErrorContext(&err)
                );
                Err(StoreError::Backend(DisplayErrorContext(&err).to_string()))
            }
        }
    }

    async fn presign_get(
        &self,
        locator: &ObjectLocator,
        ttl: Duration,
    ) -> Result<PresignedUrl, StoreError> {
        tracing::debug!("[{}] Presigning GET for {} ({:?})", self.name, locator, ttl);

        let presigning =
            PresigningConfig::expires_in(ttl).map_err(|e| StoreError::Presign(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&locator.container)
            .key(&locator.key)
            .presigned(presigning)
            .await
            .map_err(|err| {
                tracing::error!(
                    "[{}] Failed to presign {}: {}",
                    self.name,
                    locator,
                    DisplayErrorContext(&err)
                );
                StoreError::Presign(DisplayErrorContext(&err).to_string())
            })?;

        let ttl = chrono::Duration::from_std(ttl).map_err(|e| StoreError::Presign(e.to_string()))?;

        Ok(PresignedUrl {
            url: request.uri().to_string(),
            expires_at: chrono::Utc::now() + ttl,
        })
    }
}
