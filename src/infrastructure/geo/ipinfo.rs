//! Reqwest-backed ipinfo.io adapter.
//!
//! Owns transport details only: URL building, request timeout, HTTP status
//! mapping and JSON decoding into an [`EnrichmentResult`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::domain::{EnrichmentResult, GeoInfoClient, GeoLookupError};

pub const DEFAULT_IPINFO_BASE_URL: &str = "https://ipinfo.io";

const MAX_ERROR_BODY_CHARS: usize = 200;

/// `GET {base_url}/{ip}?token={token}`
pub struct IpInfoClient {
    client: Client,
    base_url: Url,
    api_token: String,
    timeout: Duration,
}

impl IpInfoClient {
    /// Build a client with an explicit per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        api_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("user-geo-service/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_token: api_token.into(),
            timeout,
        })
    }

    fn lookup_url(&self, ip: &str) -> Result<Url, GeoLookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GeoLookupError::Transport(format!("base URL {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .push(ip);
        Ok(url)
    }

    fn map_transport_error(&self, error: reqwest::Error) -> GeoLookupError {
        if error.is_timeout() {
            GeoLookupError::Timeout(self.timeout)
        } else {
            GeoLookupError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl GeoInfoClient for IpInfoClient {
    async fn get_info(&self, ip: &str) -> Result<EnrichmentResult, GeoLookupError> {
        // `{base}/` alone would describe the server's own address.
        let ip = ip.trim();
        if ip.is_empty() {
            return Err(GeoLookupError::MissingIp);
        }
        let url = self.lookup_url(ip)?;
        let response = self
            .client
            .get(url)
            .query(&[("token", self.api_token.as_str())])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            let text: String = String::from_utf8_lossy(&body)
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
            return Err(GeoLookupError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_enrichment(&body)
    }
}

fn parse_enrichment(body: &[u8]) -> Result<EnrichmentResult, GeoLookupError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(GeoLookupError::Decode(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(GeoLookupError::Decode(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
