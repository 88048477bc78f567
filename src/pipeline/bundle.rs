use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::constants::{CREATED_BY_REF, OBJECT_MARKING_REFS};
use crate::domain::{Bundle, Report};
use crate::error::{CardsError, Result};
use crate::ids;

/// Assembles the final bundle from the store's objects. The map is keyed
/// by id, so members are already deduplicated and in lexicographic id
/// order; the bundle id is derived from their serialized concatenation in
/// exactly that order, which makes re-runs on identical input byte-stable.
pub fn assemble(objects: &BTreeMap<String, Value>) -> Result<Bundle> {
    let members: Vec<Value> = objects.values().cloned().collect();

    let mut serialized = String::new();
    for member in &members {
        serialized.push_str(&serde_json::to_string(member)?);
    }

    Ok(Bundle {
        object_type: "bundle".to_string(),
        id: ids::bundle_id(&serialized),
        objects: members,
    })
}

#[derive(Debug, Default, Deserialize)]
struct ReportRow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    published: Option<String>,
}

/// Builds the run report from a one-row CSV. A missing `name` is fatal for
/// this step only; card processing that already completed stands. The
/// report id is derived from the digest of the report file content, and
/// `object_refs` lists every bank-card in the run, sorted for determinism.
pub fn build_report(report_csv: &Path, card_ids: &[String]) -> Result<Report> {
    if !report_csv.exists() {
        return Err(CardsError::InputNotFound(report_csv.display().to_string()));
    }
    let content = fs::read(report_csv)?;

    let mut reader = csv::Reader::from_reader(content.as_slice());
    let row: ReportRow = match reader.deserialize().next() {
        Some(row) => row?,
        None => ReportRow::default(),
    };

    let name = row
        .name
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CardsError::MissingField("name".to_string()))?;
    let published = published_timestamp(row.published.as_deref());

    let mut object_refs = card_ids.to_vec();
    object_refs.sort();

    Ok(Report {
        object_type: "report".to_string(),
        spec_version: "2.1".to_string(),
        id: ids::report_id(&content),
        created: published.clone(),
        modified: published.clone(),
        name,
        description: row.description.filter(|s| !s.is_empty()),
        published,
        report_types: vec!["observed-data".to_string()],
        object_refs,
        created_by_ref: CREATED_BY_REF.to_string(),
        object_marking_refs: OBJECT_MARKING_REFS.iter().map(|s| s.to_string()).collect(),
    })
}

/// `YYYY-MM-DD` at midnight UTC; absent or unparsable falls back to now.
fn published_timestamp(published: Option<&str>) -> String {
    let parsed = published.and_then(|raw| match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.and_hms_opt(0, 0, 0),
        Err(e) => {
            warn!(published = %raw, error = %e, "unparsable published date, using current time");
            None
        }
    });
    let timestamp = match parsed {
        Some(naive) => naive.and_utc(),
        None => Utc::now(),
    };
    timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
