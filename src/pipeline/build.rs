use std::collections::HashMap;

use clap::ValueEnum;
use tracing::debug;

use crate::constants::IDENTITY_TIMESTAMP;
use crate::domain::{BankCard, Identity, Relationship};
use crate::ids;
use crate::infra::bin_client::BinRecord;
use crate::pipeline::normalize::CardRecord;

/// How a card is linked to its issuer in the output graph. The schema has
/// diverged across producers; both variants are supported and `refs` is
/// the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemaMode {
    /// Direct `issuer_ref` field on the bank-card object.
    Refs,
    /// An explicit `issued-by` relationship object instead of `issuer_ref`.
    Relationships,
}

/// Everything produced for one card. The bank-card is always present; the
/// rest depends on enrichment outcome, holder presence and schema mode.
#[derive(Debug, Clone)]
pub struct BuiltObjects {
    pub card: BankCard,
    pub issuer: Option<Identity>,
    pub holder: Option<Identity>,
    pub relationship: Option<Relationship>,
}

/// Maps normalized records plus optional BIN data into STIX objects.
/// Issuer identities are deduplicated per run in a map keyed by
/// `"{name}_{alpha2}"`; holder identities are intentionally never
/// deduplicated across cards.
pub struct ObjectBuilder {
    schema: SchemaMode,
    issuers: HashMap<String, Identity>,
}

impl ObjectBuilder {
    pub fn new(schema: SchemaMode) -> Self {
        Self {
            schema,
            issuers: HashMap::new(),
        }
    }

    pub fn build(&mut self, record: &CardRecord, bin: Option<&BinRecord>) -> BuiltObjects {
        // Invalid results are treated the same as no data.
        let bin = bin.filter(|b| b.valid);

        let issuer = bin.and_then(|b| self.resolve_issuer(b));
        let holder = record.holder_name.as_ref().map(|name| {
            Identity::new(
                ids::holder_id(name, &record.card_number),
                name.clone(),
                "individual",
                IDENTITY_TIMESTAMP,
            )
        });

        let mut card = BankCard::new(ids::card_id(&record.card_number), record.card_number.clone());
        card.valid_from = record.valid_from.clone();
        card.valid_to = record.valid_to.clone();
        card.security_code = record.security_code.clone();
        if let Some(bin) = bin {
            card.format = bin.card_type.clone();
            card.scheme = bin.scheme.clone();
            card.brand = bin.brand.clone();
            card.currency = bin.currency.clone();
        }
        card.holder_ref = holder.as_ref().map(|h| h.id.clone());

        let relationship = match (&issuer, self.schema) {
            (Some(issuer), SchemaMode::Refs) => {
                card.issuer_ref = Some(issuer.id.clone());
                None
            }
            (Some(issuer), SchemaMode::Relationships) => Some(Relationship::issued_by(
                ids::relationship_id(&card.id, &issuer.id),
                card.id.clone(),
                issuer.id.clone(),
                IDENTITY_TIMESTAMP,
            )),
            (None, _) => None,
        };

        BuiltObjects {
            card,
            issuer,
            holder,
            relationship,
        }
    }

    /// Builds the issuer identity on first sight of a given issuer+country
    /// pair; later cards reuse the cached instance.
    fn resolve_issuer(&mut self, bin: &BinRecord) -> Option<Identity> {
        let name = bin.issuer.name.as_deref().filter(|s| !s.is_empty())?;
        let alpha2 = bin.country.alpha2.as_deref().filter(|s| !s.is_empty())?;
        let key = format!("{}_{}", name, alpha2);

        if let Some(existing) = self.issuers.get(&key) {
            return Some(existing.clone());
        }

        let display_name = format!("{} ({})", name, alpha2);
        let mut identity = Identity::new(
            ids::issuer_id(name, alpha2),
            display_name,
            "organization",
            IDENTITY_TIMESTAMP,
        );
        identity.sectors = Some(vec!["financial-services".to_string()]);
        identity.contact_information = contact_information(bin);

        debug!(issuer = %key, "created issuer identity");
        self.issuers.insert(key, identity.clone());
        Some(identity)
    }
}

/// Contact block assembled only from the parts the service returned.
fn contact_information(bin: &BinRecord) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(website) = bin.issuer.website.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("* Bank URL: {}", website));
    }
    if let Some(phone) = bin.issuer.phone.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("* Bank Phone: {}", phone));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}
