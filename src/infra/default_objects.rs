use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::app::ports::DefaultObjectsPort;
use crate::constants::DEFAULT_OBJECT_URLS;

/// Fetches the fixed default STIX documents (bank-card extension
/// definition, default publisher identity, marking definitions) over HTTP.
/// These are inserted verbatim into every bundle. A fetch failure here is
/// fatal for the run, unlike BIN lookups.
pub struct HttpDefaultObjects {
    client: reqwest::Client,
}

impl HttpDefaultObjects {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpDefaultObjects {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DefaultObjectsPort for HttpDefaultObjects {
    async fn fetch(&self) -> Result<Vec<Value>, String> {
        let mut objects = Vec::with_capacity(DEFAULT_OBJECT_URLS.len());
        for url in DEFAULT_OBJECT_URLS {
            debug!(url = %url, "fetching default STIX object");
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| format!("fetching {}: {}", url, e))?;
            if !response.status().is_success() {
                return Err(format!("fetching {}: status {}", url, response.status()));
            }
            let object: Value = response
                .json()
                .await
                .map_err(|e| format!("decoding {}: {}", url, e))?;
            objects.push(object);
        }
        Ok(objects)
    }
}
