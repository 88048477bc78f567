use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::app::ports::BinLookupPort;
use crate::infra::fs_store::FileSystemStore;
use crate::pipeline::build::{ObjectBuilder, SchemaMode};
use crate::pipeline::bundle;
use crate::pipeline::normalize;

/// Outcome of one conversion run, reported back to the CLI.
#[derive(Debug)]
pub struct RunSummary {
    pub total_cards: usize,
    pub enriched_cards: usize,
    pub issuer_identities: usize,
    pub total_objects: usize,
    pub bundle_id: String,
    pub bundle_path: PathBuf,
}

/// Use case for converting a card CSV into a persisted STIX bundle:
/// normalize rows, enrich each unique card once, build objects, store
/// them, then assemble and write the bundle.
pub struct ConvertUseCase {
    bin_lookup: Box<dyn BinLookupPort>,
}

impl ConvertUseCase {
    pub fn new(bin_lookup: Box<dyn BinLookupPort>) -> Self {
        Self { bin_lookup }
    }

    pub async fn run(
        &self,
        input_csv: &Path,
        report_csv: Option<&Path>,
        default_objects: Vec<Value>,
        store: &mut FileSystemStore,
        schema: SchemaMode,
    ) -> Result<RunSummary> {
        // Input problems abort before any per-card work.
        let records = normalize::read_card_records(input_csv)?;
        info!(cards = records.len(), "normalized input records");

        for object in default_objects {
            store.add(object)?;
        }

        let mut builder = ObjectBuilder::new(schema);
        let mut card_ids = Vec::with_capacity(records.len());
        let mut enriched_cards = 0;
        let mut issuer_ids = HashSet::new();

        for record in &records {
            debug!(card_number = %record.card_number, "processing card");
            let bin = self.bin_lookup.lookup(&record.card_number).await;
            if bin.as_ref().is_some_and(|b| b.valid) {
                enriched_cards += 1;
            }

            let built = builder.build(record, bin.as_ref());
            built.card.validate()?;

            if let Some(issuer) = &built.issuer {
                issuer.validate()?;
                issuer_ids.insert(issuer.id.clone());
                store.add_serializable(issuer)?;
            }
            if let Some(holder) = &built.holder {
                holder.validate()?;
                store.add_serializable(holder)?;
            }
            if let Some(relationship) = &built.relationship {
                store.add_serializable(relationship)?;
            }
            card_ids.push(built.card.id.clone());
            store.add_serializable(&built.card)?;
        }

        if let Some(report_csv) = report_csv {
            info!(report = %report_csv.display(), "generating report");
            let report = bundle::build_report(report_csv, &card_ids)?;
            store.add_serializable(&report)?;
        }

        let bundle = bundle::assemble(store.objects())?;
        let bundle_path = store.write_bundle(&bundle)?;
        info!(bundle = %bundle.id, path = %bundle_path.display(), "bundle written");

        Ok(RunSummary {
            total_cards: records.len(),
            enriched_cards,
            issuer_identities: issuer_ids.len(),
            total_objects: store.len(),
            bundle_id: bundle.id,
            bundle_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::BinLookupPort;
    use crate::infra::bin_client::{BinCountry, BinIssuer, BinRecord};
    use crate::infra::fs_store::OutputMode;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use tempfile::tempdir;

    /// Stub lookup with canned responses per card number; anything else
    /// behaves like a failed lookup.
    struct StubBinLookup {
        responses: HashMap<String, BinRecord>,
    }

    impl StubBinLookup {
        fn empty() -> Self {
            Self {
                responses: HashMap::new(),
            }
        }

        fn with(card_number: &str, record: BinRecord) -> Self {
            let mut responses = HashMap::new();
            responses.insert(card_number.to_string(), record);
            Self { responses }
        }
    }

    #[async_trait]
    impl BinLookupPort for StubBinLookup {
        async fn lookup(&self, card_number: &str) -> Option<BinRecord> {
            self.responses.get(card_number).cloned()
        }
    }

    fn example_bank_bin() -> BinRecord {
        BinRecord {
            valid: true,
            scheme: Some("VISA".to_string()),
            brand: Some("VISA".to_string()),
            card_type: Some("CREDIT".to_string()),
            currency: Some("USD".to_string()),
            issuer: BinIssuer {
                name: Some("Example Bank".to_string()),
                website: None,
                phone: None,
            },
            country: BinCountry {
                alpha2: Some("US".to_string()),
            },
        }
    }

    fn default_objects() -> Vec<Value> {
        vec![json!({
            "type": "identity",
            "id": "identity--d287a5a4-facc-5254-9563-9e92e3e729ac",
            "name": "creditcard2stix"
        })]
    }

    #[tokio::test]
    async fn merged_row_is_enriched_and_linked() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("cards.csv");
        std::fs::write(
            &input,
            "card_number,card_holder_name\n4111111111111111,\n4111111111111111,Jane Doe\n",
        )
        .unwrap();

        let use_case = ConvertUseCase::new(Box::new(StubBinLookup::with(
            "4111111111111111",
            example_bank_bin(),
        )));
        let mut store =
            FileSystemStore::open(&dir.path().join("out"), OutputMode::Reset).unwrap();
        let summary = use_case
            .run(&input, None, default_objects(), &mut store, SchemaMode::Refs)
            .await
            .unwrap();

        assert_eq!(summary.total_cards, 1);
        assert_eq!(summary.enriched_cards, 1);
        assert_eq!(summary.issuer_identities, 1);

        let objects = store.objects();
        let card = objects
            .values()
            .find(|o| o["type"] == "bank-card")
            .expect("one bank-card");
        assert_eq!(card["number"], "4111111111111111");
        let issuer = objects
            .values()
            .find(|o| o["type"] == "identity" && o["name"] == "Example Bank (US)")
            .expect("issuer identity");
        assert_eq!(card["issuer_ref"], issuer["id"]);
        let holder = objects
            .values()
            .find(|o| o["type"] == "identity" && o["name"] == "Jane Doe")
            .expect("holder identity");
        assert_eq!(card["holder_ref"], holder["id"]);
    }

    #[tokio::test]
    async fn failed_lookup_still_produces_card_without_issuer() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("cards.csv");
        std::fs::write(&input, "card_number\n4111111111111111\n").unwrap();

        let use_case = ConvertUseCase::new(Box::new(StubBinLookup::empty()));
        let mut store =
            FileSystemStore::open(&dir.path().join("out"), OutputMode::Reset).unwrap();
        let summary = use_case
            .run(&input, None, default_objects(), &mut store, SchemaMode::Refs)
            .await
            .unwrap();

        assert_eq!(summary.enriched_cards, 0);
        assert_eq!(summary.issuer_identities, 0);

        let card = store
            .objects()
            .values()
            .find(|o| o["type"] == "bank-card")
            .expect("bank-card still present");
        assert!(card.get("scheme").is_none());
        assert!(card.get("issuer_ref").is_none());
    }

    #[tokio::test]
    async fn cards_sharing_an_issuer_share_one_identity() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("cards.csv");
        std::fs::write(
            &input,
            "card_number\n4111111111111111\n4222222222222222\n4333333333333333\n",
        )
        .unwrap();

        let mut responses = HashMap::new();
        for number in ["4111111111111111", "4222222222222222", "4333333333333333"] {
            responses.insert(number.to_string(), example_bank_bin());
        }
        let use_case = ConvertUseCase::new(Box::new(StubBinLookup { responses }));
        let mut store =
            FileSystemStore::open(&dir.path().join("out"), OutputMode::Reset).unwrap();
        let summary = use_case
            .run(
                &input,
                None,
                default_objects(),
                &mut store,
                SchemaMode::Relationships,
            )
            .await
            .unwrap();

        assert_eq!(summary.total_cards, 3);
        assert_eq!(summary.issuer_identities, 1);

        let objects = store.objects();
        let issuers: Vec<_> = objects
            .values()
            .filter(|o| o["type"] == "identity" && o["name"] == "Example Bank (US)")
            .collect();
        assert_eq!(issuers.len(), 1);

        let relationships: Vec<_> = objects
            .values()
            .filter(|o| o["type"] == "relationship")
            .collect();
        assert_eq!(relationships.len(), 3);
        for relationship in relationships {
            assert_eq!(relationship["target_ref"], issuers[0]["id"]);
        }
    }

    #[tokio::test]
    async fn missing_report_name_fails_after_cards_are_stored() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("cards.csv");
        std::fs::write(&input, "card_number\n4111111111111111\n").unwrap();
        let report = dir.path().join("report.csv");
        std::fs::write(&report, "description\nno name column\n").unwrap();

        let use_case = ConvertUseCase::new(Box::new(StubBinLookup::empty()));
        let mut store =
            FileSystemStore::open(&dir.path().join("out"), OutputMode::Reset).unwrap();
        let result = use_case
            .run(
                &input,
                Some(&report),
                default_objects(),
                &mut store,
                SchemaMode::Refs,
            )
            .await;

        assert!(result.is_err());
        // The card objects written before the report step stand.
        assert!(store.objects().values().any(|o| o["type"] == "bank-card"));
    }
}
