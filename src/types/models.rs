use std::fmt;

/// Resolved location of one object inside the store
///
/// `container` is the bucket, `key` is everything after the first `/` of the
/// configured path. Neither is ever empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocator {
    pub container: String,
    pub key: String,
}

impl ObjectLocator {
    /// Full resource path as seen by the store: `/<container>/<key>`
    pub fn resource_path(&self) -> String {
        format!("/{}/{}", self.container, self.key)
    }

    /// Last path segment of the key, used for content disposition
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

impl fmt::Display for ObjectLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.key)
    }
}

/// Store credentials owned by the gateway for its whole lifetime
///
/// Only the access key id ever leaves the process; `Debug` redacts the secret.
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Object metadata as reported by the store
#[derive(Debug, Clone)]
pub struct ObjectMetadata {
    pub key: String,
    pub size: Option<u64>,
    pub etag: Option<String>,
    pub content_type: Option<String>,
}
