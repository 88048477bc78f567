use async_trait::async_trait;
use serde_json::Value;

use crate::infra::bin_client::BinRecord;

/// Port for the BIN lookup service. Implementations must swallow transport
/// and service failures: `None` means "no enrichment data for this card",
/// which is never fatal for the run.
#[async_trait]
pub trait BinLookupPort: Send + Sync {
    async fn lookup(&self, card_number: &str) -> Option<BinRecord>;
}

/// Port for fetching the fixed default STIX objects inserted into every
/// bundle. Fetched once per run; the result is immutable afterwards.
#[async_trait]
pub trait DefaultObjectsPort: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Value>, String>;
}
