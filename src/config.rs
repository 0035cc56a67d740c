use crate::delegation::{
    DEFAULT_PRESIGN_TTL, DEFAULT_REDIRECT_PREFIX, DEFAULT_STORE_TIMEOUT, DelegationSettings,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// How read access is handed out; fixed per deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Locally signed `X-Authorization` header plus internal redirect
    Header,
    /// Store-presigned URL embedded in the internal redirect
    Presigned,
    /// Gateway streams the object bytes itself
    Stream,
}

/// Which store implementation backs the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    S3,
    Memory,
}

/// Optional configuration file
///
/// Every field is optional; values present here override the CLI/env
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    /// Report identifier to `<container>/<key>` location
    #[serde(default)]
    pub reports: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presign_ttl_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_prefix: Option<String>,
}

impl Config {
    /// Load from a JSON file, or YAML when the extension is `.yaml`/`.yml`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let config: Config = if is_yaml {
            serde_yml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        Ok(config)
    }

    pub fn delegation_settings(&self) -> DelegationSettings {
        DelegationSettings {
            redirect_prefix: self
                .redirect_prefix
                .clone()
                .map(|prefix| prefix.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_REDIRECT_PREFIX.to_string()),
            presign_ttl: self
                .presign_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_PRESIGN_TTL),
            store_timeout: self
                .store_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_STORE_TIMEOUT),
        }
    }
}

/// Store endpoint URL from an address that may or may not carry a scheme
///
/// `minio:9000` becomes `http://minio:9000` (or `https://` with TLS); an
/// address that already has a scheme is used unchanged.
pub fn endpoint_url(address: &str, use_tls: bool) -> String {
    if address.contains("://") {
        return address.to_string();
    }
    let scheme = if use_tls { "https" } else { "http" };
    format!("{}://{}", scheme, address)
}
