use crate::types::{Credentials, GatewayError};
use base64::prelude::*;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Authorization scheme expected by the store behind the proxy
pub const AUTHORIZATION_SCHEME: &str = "AWS4";

/// HMAC-SHA256 helper
fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, GatewayError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| GatewayError::Internal(format!("HMAC error: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Sign a payload with a secret key
///
/// Returns the base64 (standard alphabet, padded) HMAC-SHA256 digest of the
/// UTF-8 bytes of `payload`. Deterministic: no nonce is mixed in.
pub fn sign(payload: &str, secret_key: &str) -> Result<String, GatewayError> {
    let digest = hmac_sha256(secret_key.as_bytes(), payload.as_bytes())?;
    Ok(BASE64_STANDARD.encode(digest))
}

/// Signs canonical requests with the gateway's credentials
#[derive(Clone, Debug)]
pub struct Signer {
    credentials: Credentials,
}

impl Signer {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn access_key_id(&self) -> &str {
        &self.credentials.access_key_id
    }

    /// Signature token for a rendered canonical request
    pub fn sign(&self, payload: &str) -> Result<String, GatewayError> {
        sign(payload, &self.credentials.secret_access_key)
    }

    /// `AWS4 <access key id>:<token>`
    pub fn authorization(&self, token: &str) -> String {
        format!(
            "{} {}:{}",
            AUTHORIZATION_SCHEME, self.credentials.access_key_id, token
        )
    }
}
