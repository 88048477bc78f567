use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Runtime configuration, loaded from an optional `config.toml` next to the
/// binary. Every field has a default so the file is not required.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bin_lookup: BinLookupConfig,
}

#[derive(Debug, Deserialize)]
pub struct BinLookupConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://bin-ip-checker.p.rapidapi.com".to_string()
}

fn default_host() -> String {
    "bin-ip-checker.p.rapidapi.com".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for BinLookupConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            host: default_host(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bin_lookup: BinLookupConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        if !Path::new(config_path).exists() {
            return Ok(Config::default());
        }
        let config_content = fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// API key for the BIN lookup service, from the environment (a `.env`
    /// file is loaded at startup). A missing key is not fatal: lookups will
    /// be rejected by the service and degrade to unenriched cards.
    pub fn bin_api_key() -> Option<String> {
        match std::env::var("BIN_LIST_API_KEY") {
            Ok(key) if !key.is_empty() => Some(key),
            _ => {
                warn!("BIN_LIST_API_KEY is not set; BIN lookups will fail and cards will be unenriched");
                None
            }
        }
    }
}
