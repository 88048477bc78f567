use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Input file not found: {0}")]
    InputNotFound(String),

    #[error("Invalid STIX object: {0}")]
    InvalidObject(String),
}

pub type Result<T> = std::result::Result<T, CardsError>;
