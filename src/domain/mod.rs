use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::constants::{BANK_CARD_EXTENSION_ID, CREATED_BY_REF, OBJECT_MARKING_REFS};
use crate::error::{CardsError, Result};

/// One typed struct per STIX entity kind. Optional fields are skipped when
/// unset so the serialized objects carry only the fields that are present,
/// and each kind has an explicit field-presence validator instead of a
/// dynamic schema layer.

fn marking_refs() -> Vec<String> {
    OBJECT_MARKING_REFS.iter().map(|s| s.to_string()).collect()
}

fn extensions() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(
        BANK_CARD_EXTENSION_ID.to_string(),
        json!({ "extension_type": "new-sco" }),
    );
    map
}

/// The bank-card SCO. Enrichment-sourced fields (`format`, `scheme`,
/// `brand`, `currency`) stay unset when no valid BIN data was resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BankCard {
    #[serde(rename = "type")]
    pub object_type: String,
    pub spec_version: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_code: Option<String>,
    pub created_by_ref: String,
    pub object_marking_refs: Vec<String>,
    pub extensions: Map<String, Value>,
}

impl BankCard {
    pub fn new(id: String, number: String) -> Self {
        Self {
            object_type: "bank-card".to_string(),
            spec_version: "2.1".to_string(),
            id,
            format: None,
            number,
            scheme: None,
            brand: None,
            currency: None,
            issuer_ref: None,
            holder_ref: None,
            valid_from: None,
            valid_to: None,
            security_code: None,
            created_by_ref: CREATED_BY_REF.to_string(),
            object_marking_refs: marking_refs(),
            extensions: extensions(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.number.is_empty() {
            return Err(CardsError::MissingField("number".to_string()));
        }
        if !self.id.starts_with("bank-card--") {
            return Err(CardsError::InvalidObject(format!(
                "bank-card id has wrong prefix: {}",
                self.id
            )));
        }
        Ok(())
    }
}

/// Identity SDO, used for both issuing organizations and card holders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    #[serde(rename = "type")]
    pub object_type: String,
    pub spec_version: String,
    pub id: String,
    pub created: String,
    pub modified: String,
    pub name: String,
    pub identity_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sectors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_information: Option<String>,
    pub created_by_ref: String,
    pub object_marking_refs: Vec<String>,
}

impl Identity {
    pub fn new(id: String, name: String, identity_class: &str, timestamp: &str) -> Self {
        Self {
            object_type: "identity".to_string(),
            spec_version: "2.1".to_string(),
            id,
            created: timestamp.to_string(),
            modified: timestamp.to_string(),
            name,
            identity_class: identity_class.to_string(),
            sectors: None,
            contact_information: None,
            created_by_ref: CREATED_BY_REF.to_string(),
            object_marking_refs: marking_refs(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(CardsError::MissingField("name".to_string()));
        }
        if !self.id.starts_with("identity--") {
            return Err(CardsError::InvalidObject(format!(
                "identity id has wrong prefix: {}",
                self.id
            )));
        }
        Ok(())
    }
}

/// Relationship SRO linking a bank-card to its issuing identity. Only
/// emitted in the `relationships` schema mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relationship {
    #[serde(rename = "type")]
    pub object_type: String,
    pub spec_version: String,
    pub id: String,
    pub created: String,
    pub modified: String,
    pub relationship_type: String,
    pub source_ref: String,
    pub target_ref: String,
    pub created_by_ref: String,
    pub object_marking_refs: Vec<String>,
}

impl Relationship {
    pub fn issued_by(id: String, source_ref: String, target_ref: String, timestamp: &str) -> Self {
        Self {
            object_type: "relationship".to_string(),
            spec_version: "2.1".to_string(),
            id,
            created: timestamp.to_string(),
            modified: timestamp.to_string(),
            relationship_type: "issued-by".to_string(),
            source_ref,
            target_ref,
            created_by_ref: CREATED_BY_REF.to_string(),
            object_marking_refs: marking_refs(),
        }
    }
}

/// Report SDO summarizing a run, referencing every bank-card produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    #[serde(rename = "type")]
    pub object_type: String,
    pub spec_version: String,
    pub id: String,
    pub created: String,
    pub modified: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub published: String,
    pub report_types: Vec<String>,
    pub object_refs: Vec<String>,
    pub created_by_ref: String,
    pub object_marking_refs: Vec<String>,
}

/// The top-level bundle holding every object from one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: String,
    pub objects: Vec<Value>,
}
