use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::app::ports::BinLookupPort;
use crate::config::BinLookupConfig;
use crate::error::Result;

/// Issuer metadata for one BIN, as returned by the lookup service. Every
/// field is optional; the service omits what it does not know.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BinRecord {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub scheme: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(rename = "type", default)]
    pub card_type: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub issuer: BinIssuer,
    #[serde(default)]
    pub country: BinCountry,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BinIssuer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BinCountry {
    #[serde(default)]
    pub alpha2: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BinResponse {
    #[serde(rename = "BIN", default)]
    bin: BinRecord,
}

/// Reqwest-backed adapter for the BIN lookup service. One POST per unique
/// card number, keyed by its first six digits; no batching, no caching.
pub struct ReqwestBinClient {
    client: Client,
    base_url: String,
    host: String,
    api_key: Option<String>,
}

impl ReqwestBinClient {
    pub fn new(config: &BinLookupConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            host: config.host.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl BinLookupPort for ReqwestBinClient {
    async fn lookup(&self, card_number: &str) -> Option<BinRecord> {
        let bin: String = card_number.chars().take(6).collect();
        let url = format!("{}/?bin={}", self.base_url, bin);
        debug!(bin = %bin, "requesting BIN data");

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-rapidapi-host", &self.host)
            .json(&json!({ "bin": bin }));
        if let Some(key) = &self.api_key {
            request = request.header("x-rapidapi-key", key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(bin = %bin, error = %e, "BIN lookup request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(bin = %bin, status = %response.status(), "BIN lookup returned non-success status");
            return None;
        }

        match response.json::<BinResponse>().await {
            Ok(body) => {
                debug!(bin = %bin, valid = body.bin.valid, "received BIN data");
                Some(body.bin)
            }
            Err(e) => {
                warn!(bin = %bin, error = %e, "BIN lookup response could not be decoded");
                None
            }
        }
    }
}
