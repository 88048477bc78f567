use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::constants::{IDENTITY_NAMESPACE, OASIS_NAMESPACE};

fn oasis_namespace() -> Uuid {
    // Namespace constants are validated by tests; parse cannot fail.
    Uuid::parse_str(OASIS_NAMESPACE).unwrap_or(Uuid::nil())
}

fn identity_namespace() -> Uuid {
    Uuid::parse_str(IDENTITY_NAMESPACE).unwrap_or(Uuid::nil())
}

/// Bank-card id, derived from the raw card number in the shared OASIS
/// namespace. The same card number always maps to the same id, in any
/// implementation of this schema.
pub fn card_id(card_number: &str) -> String {
    format!(
        "bank-card--{}",
        Uuid::new_v5(&oasis_namespace(), card_number.as_bytes())
    )
}

/// Issuer identity id. Key material is `"{name} ({alpha2})"` — the exact
/// format matters for interoperability with existing datasets.
pub fn issuer_id(issuer_name: &str, country_alpha2: &str) -> String {
    identity_id(&format!("{} ({})", issuer_name, country_alpha2))
}

/// Holder identity id. Key material is `"{holder_name}+{card_number}"`:
/// scoped per card on purpose, two cards naming "Jane Doe" are two people
/// until proven otherwise.
pub fn holder_id(holder_name: &str, card_number: &str) -> String {
    identity_id(&format!("{}+{}", holder_name, card_number))
}

pub fn identity_id(key: &str) -> String {
    format!(
        "identity--{}",
        Uuid::new_v5(&identity_namespace(), key.as_bytes())
    )
}

/// Relationship id from `"{source_id}+{target_id}"`.
pub fn relationship_id(source_ref: &str, target_ref: &str) -> String {
    format!(
        "relationship--{}",
        Uuid::new_v5(
            &identity_namespace(),
            format!("{}+{}", source_ref, target_ref).as_bytes()
        )
    )
}

/// Report id from the content digest of the report input file.
pub fn report_id(report_file_content: &[u8]) -> String {
    format!(
        "report--{}",
        Uuid::new_v5(
            &identity_namespace(),
            sha256_hex(report_file_content).as_bytes()
        )
    )
}

/// Bundle id from the concatenated serialized members, which the assembler
/// must pass in id-sorted order for the digest to be reproducible.
pub fn bundle_id(serialized_members: &str) -> String {
    format!(
        "bundle--{}",
        Uuid::new_v5(
            &identity_namespace(),
            sha256_hex(serialized_members.as_bytes()).as_bytes()
        )
    )
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
