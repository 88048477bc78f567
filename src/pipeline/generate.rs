use std::path::Path;

use rand::prelude::*;
use serde::Serialize;

use crate::error::{CardsError, Result};

/// Demo data generator: writes a CSV of plausible (not real) card rows in
/// the converter's input format. A fixed seed makes the output
/// reproducible.

struct CardScheme {
    name: &'static str,
    prefixes: &'static [&'static str],
    lengths: &'static [usize],
    security_code_length: usize,
}

const SCHEMES: [CardScheme; 6] = [
    CardScheme { name: "visa", prefixes: &["4"], lengths: &[16, 19], security_code_length: 3 },
    CardScheme { name: "mastercard", prefixes: &["51", "52", "53", "54", "55"], lengths: &[16], security_code_length: 3 },
    CardScheme { name: "discover", prefixes: &["6011"], lengths: &[14, 16], security_code_length: 3 },
    CardScheme { name: "unionpay", prefixes: &["62"], lengths: &[16, 17, 18, 19], security_code_length: 3 },
    CardScheme { name: "amex", prefixes: &["34", "37"], lengths: &[15], security_code_length: 4 },
    CardScheme { name: "diners", prefixes: &["36"], lengths: &[14], security_code_length: 3 },
];

const FIRST_NAMES: [&str; 10] = [
    "John", "Jane", "Alex", "Chris", "Pat", "Sam", "Taylor", "Morgan", "Jamie", "Jordan",
];
const LAST_NAMES: [&str; 10] = [
    "Smith", "Johnson", "Williams", "Jones", "Brown", "Davis", "Miller", "Wilson", "Moore",
    "Taylor",
];

#[derive(Debug, Serialize)]
struct GeneratedRow {
    card_number: String,
    card_security_code: String,
    card_valid_date: String,
    card_expiry_date: String,
    card_holder_name: String,
}

fn digits(rng: &mut StdRng, count: usize) -> String {
    (0..count).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect()
}

fn generate_row(rng: &mut StdRng, schemes: &[&CardScheme]) -> GeneratedRow {
    let scheme = schemes[rng.gen_range(0..schemes.len())];
    let prefix = scheme.prefixes[rng.gen_range(0..scheme.prefixes.len())];
    let length = scheme.lengths[rng.gen_range(0..scheme.lengths.len())];
    let card_number = format!("{}{}", prefix, digits(rng, length - prefix.len()));

    GeneratedRow {
        card_number,
        card_security_code: digits(rng, scheme.security_code_length),
        card_valid_date: format!("{:02}/23", rng.gen_range(1..=12)),
        card_expiry_date: format!("{:02}/28", rng.gen_range(1..=12)),
        card_holder_name: format!(
            "{} {}",
            FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())],
            LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())]
        ),
    }
}

/// Writes `count` demo rows to `output`. `types` filters the schemes to
/// generate; an unknown type name is a configuration error.
pub fn generate_csv(
    output: &Path,
    count: usize,
    types: Option<&[String]>,
    seed: Option<u64>,
) -> Result<()> {
    let schemes: Vec<&CardScheme> = match types {
        Some(types) => {
            let mut selected = Vec::new();
            for wanted in types {
                let scheme = SCHEMES
                    .iter()
                    .find(|s| s.name == wanted)
                    .ok_or_else(|| CardsError::Config(format!("unknown card type: {}", wanted)))?;
                selected.push(scheme);
            }
            selected
        }
        None => SCHEMES.iter().collect(),
    };

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut writer = csv::Writer::from_path(output)?;
    for _ in 0..count {
        writer.serialize(generate_row(&mut rng, &schemes))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::normalize::read_card_records;

    #[test]
    fn generated_csv_round_trips_through_the_normalizer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dummy.csv");
        generate_csv(&path, 25, None, Some(7)).unwrap();

        let records = read_card_records(&path).unwrap();
        assert!(!records.is_empty());
        for record in &records {
            assert!(record.card_number.chars().all(|c| c.is_ascii_digit()));
            assert!(record.holder_name.is_some());
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        generate_csv(&first, 10, None, Some(42)).unwrap();
        generate_csv(&second, 10, None, Some(42)).unwrap();
        assert_eq!(
            std::fs::read_to_string(&first).unwrap(),
            std::fs::read_to_string(&second).unwrap()
        );
    }

    #[test]
    fn type_filter_limits_schemes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visa.csv");
        generate_csv(&path, 10, Some(&["visa".to_string()]), Some(1)).unwrap();
        let records = read_card_records(&path).unwrap();
        for record in &records {
            assert!(record.card_number.starts_with('4'));
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        let err = generate_csv(&path, 1, Some(&["laser".to_string()]), Some(1)).unwrap_err();
        assert!(matches!(err, CardsError::Config(_)));
    }
}
