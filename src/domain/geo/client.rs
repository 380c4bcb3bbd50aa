use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Open-ended metadata about an IP address (`city`, `country`, ...).
pub type EnrichmentResult = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Error)]
pub enum GeoLookupError {
    #[error("geo lookup transport failure: {0}")]
    Transport(String),

    #[error("geo lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("geo lookup returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("geo lookup returned a malformed payload: {0}")]
    Decode(String),

    #[error("no client IP to look up")]
    MissingIp,
}

/// Looks up location metadata for a client IP.
#[async_trait]
pub trait GeoInfoClient: Send + Sync {
    async fn get_info(&self, ip: &str) -> Result<EnrichmentResult, GeoLookupError>;
}
