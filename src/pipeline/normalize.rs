use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{CardsError, Result};

/// One raw CSV row. Only `card_number` is required; unknown columns are
/// ignored by the reader.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawCardRow {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub card_holder_name: Option<String>,
    #[serde(default)]
    pub card_valid_date: Option<String>,
    #[serde(default)]
    pub card_expiry_date: Option<String>,
    #[serde(default)]
    pub card_security_code: Option<String>,
}

impl RawCardRow {
    /// Count of present, non-empty fields. Drives the richer-row-wins
    /// merge below.
    pub fn non_empty_fields(&self) -> usize {
        let optional = [
            &self.card_holder_name,
            &self.card_valid_date,
            &self.card_expiry_date,
            &self.card_security_code,
        ];
        let base = usize::from(!self.card_number.is_empty());
        base + optional
            .iter()
            .filter(|f| f.as_deref().is_some_and(|s| !s.is_empty()))
            .count()
    }
}

/// A normalized card record: exactly one survives per distinct card number,
/// empty strings collapsed to `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CardRecord {
    pub card_number: String,
    pub holder_name: Option<String>,
    pub valid_from: Option<String>,
    pub valid_to: Option<String>,
    pub security_code: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl From<RawCardRow> for CardRecord {
    fn from(row: RawCardRow) -> Self {
        Self {
            card_number: row.card_number,
            holder_name: non_empty(row.card_holder_name),
            valid_from: non_empty(row.card_valid_date),
            valid_to: non_empty(row.card_expiry_date),
            security_code: non_empty(row.card_security_code),
        }
    }
}

/// Reads the input CSV and merges duplicate card numbers. A missing
/// `card_number` column is a fatal input error; a row with an empty card
/// number is skipped with a warning.
pub fn read_card_records(path: &Path) -> Result<Vec<CardRecord>> {
    if !path.exists() {
        return Err(CardsError::InputNotFound(path.display().to_string()));
    }
    let mut reader = csv::Reader::from_path(path)?;
    if !reader
        .headers()?
        .iter()
        .any(|header| header == "card_number")
    {
        return Err(CardsError::MissingField("card_number".to_string()));
    }

    let mut rows = Vec::new();
    for row in reader.deserialize::<RawCardRow>() {
        rows.push(row?);
    }
    Ok(merge_rows(rows))
}

/// Deduplicates rows by card number. A later duplicate replaces the kept
/// row only when it has strictly more non-empty fields; ties keep the
/// first-seen row. First-seen order is preserved for downstream iteration.
pub fn merge_rows(rows: Vec<RawCardRow>) -> Vec<CardRecord> {
    let mut kept: Vec<RawCardRow> = Vec::new();
    let mut index_by_number: HashMap<String, usize> = HashMap::new();

    for row in rows {
        if row.card_number.is_empty() {
            warn!("skipping row with empty card_number");
            continue;
        }
        match index_by_number.get(&row.card_number) {
            Some(&index) => {
                if row.non_empty_fields() > kept[index].non_empty_fields() {
                    debug!(card_number = %row.card_number, "replacing duplicate with richer row");
                    kept[index] = row;
                }
            }
            None => {
                index_by_number.insert(row.card_number.clone(), kept.len());
                kept.push(row);
            }
        }
    }

    kept.into_iter().map(CardRecord::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(number: &str, holder: Option<&str>, code: Option<&str>) -> RawCardRow {
        RawCardRow {
            card_number: number.to_string(),
            card_holder_name: holder.map(String::from),
            card_security_code: code.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn richer_duplicate_replaces_earlier_row() {
        let merged = merge_rows(vec![
            row("4111111111111111", None, None),
            row("4111111111111111", Some("Jane Doe"), None),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].holder_name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn equal_richness_keeps_first_seen() {
        let merged = merge_rows(vec![
            row("4111111111111111", Some("Jane Doe"), None),
            row("4111111111111111", Some("J. Doe"), None),
        ]);
        assert_eq!(merged[0].holder_name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn empty_duplicate_never_replaces_richer_row() {
        let merged = merge_rows(vec![
            row("4111111111111111", Some("Jane Doe"), Some("123")),
            row("4111111111111111", None, None),
        ]);
        assert_eq!(merged[0].holder_name.as_deref(), Some("Jane Doe"));
        assert_eq!(merged[0].security_code.as_deref(), Some("123"));
    }

    #[test]
    fn empty_string_fields_do_not_count() {
        let sparse = RawCardRow {
            card_number: "4111111111111111".to_string(),
            card_holder_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(sparse.non_empty_fields(), 1);

        let merged = merge_rows(vec![sparse]);
        assert_eq!(merged[0].holder_name, None);
    }

    #[test]
    fn first_seen_order_is_preserved() {
        let merged = merge_rows(vec![
            row("5555555555554444", None, None),
            row("4111111111111111", None, None),
            row("5555555555554444", Some("Sam Brown"), None),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].card_number, "5555555555554444");
        assert_eq!(merged[0].holder_name.as_deref(), Some("Sam Brown"));
        assert_eq!(merged[1].card_number, "4111111111111111");
    }

    #[test]
    fn rows_with_empty_card_number_are_skipped() {
        let merged = merge_rows(vec![row("", Some("Jane Doe"), None)]);
        assert!(merged.is_empty());
    }

    #[test]
    fn missing_card_number_column_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.csv");
        std::fs::write(&path, "card_holder_name\nJane Doe\n").unwrap();
        let err = read_card_records(&path).unwrap_err();
        assert!(matches!(err, CardsError::MissingField(field) if field == "card_number"));
    }

    #[test]
    fn missing_input_file_is_fatal() {
        let err = read_card_records(Path::new("does-not-exist.csv")).unwrap_err();
        assert!(matches!(err, CardsError::InputNotFound(_)));
    }

    #[test]
    fn reads_csv_with_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.csv");
        std::fs::write(
            &path,
            "card_number,card_holder_name,source\n4111111111111111,Jane Doe,darkweb\n",
        )
        .unwrap();
        let records = read_card_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].holder_name.as_deref(), Some("Jane Doe"));
    }
}
