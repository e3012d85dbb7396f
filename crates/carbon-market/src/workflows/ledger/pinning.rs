use std::time::Duration;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const HASH_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const HASH_BODY_LENGTH: usize = 44;

/// Content-addressed storage for project documents.
#[async_trait::async_trait]
pub trait ContentPinner: Send + Sync {
    /// Pins a JSON document and returns its content hash.
    async fn pin_json(&self, document: &Value) -> Result<String, PinningError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PinningError {
    #[error("pinning request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("pinning service returned HTTP {0}")]
    HttpStatus(u16),
    #[error("pinning response did not include a content hash")]
    MissingHash,
}

/// Pins documents through an HTTP pinning endpoint.
///
/// When no endpoint is configured, or the endpoint fails, a hash derived from the
/// document itself is returned so registrations can proceed offline.
pub struct HttpPinner {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl HttpPinner {
    pub fn new(endpoint: Option<String>) -> Result<Self, PinningError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn offline() -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: None,
        }
    }

    async fn try_pin(&self, endpoint: &str, document: &Value) -> Result<String, PinningError> {
        let response = self.client.post(endpoint).json(document).send().await?;
        if !response.status().is_success() {
            return Err(PinningError::HttpStatus(response.status().as_u16()));
        }

        let body: Value = response.json().await?;
        ["hash", "IpfsHash", "cid"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .ok_or(PinningError::MissingHash)
    }
}

#[async_trait::async_trait]
impl ContentPinner for HttpPinner {
    async fn pin_json(&self, document: &Value) -> Result<String, PinningError> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            debug!("no pinning endpoint configured; deriving content hash locally");
            return Ok(fallback_content_hash(document));
        };

        match self.try_pin(endpoint, document).await {
            Ok(hash) => Ok(hash),
            Err(err) => {
                warn!(endpoint, error = %err, "pinning failed; using derived content hash");
                Ok(fallback_content_hash(document))
            }
        }
    }
}

/// Deterministic `Qm`-prefixed placeholder hash (46 characters) for a document.
pub fn fallback_content_hash(document: &Value) -> String {
    let first = Sha256::digest(document.to_string().as_bytes());
    let second = Sha256::digest(first);

    let body: String = first
        .iter()
        .chain(second.iter())
        .take(HASH_BODY_LENGTH)
        .map(|byte| HASH_ALPHABET[usize::from(*byte) % HASH_ALPHABET.len()] as char)
        .collect();
    format!("Qm{body}")
}
