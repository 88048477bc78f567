/// Namespace and reference constants shared across the codebase.
/// These values are fixed by the bank-card STIX schema and must not change,
/// or previously published datasets stop lining up with new output.

// UUIDv5 namespace for bank-card SCO identifiers. Shared with other
// producers of the bank-card schema, so card ids are interoperable.
pub const OASIS_NAMESPACE: &str = "00abedb4-aa42-466c-9c01-fed23315a9b7";

// UUIDv5 namespace for everything scoped to this producer: issuer and
// holder identities, relationships, reports and the bundle itself.
pub const IDENTITY_NAMESPACE: &str = "d287a5a4-facc-5254-9563-9e92e3e729ac";

// Default publisher identity stamped onto every produced object.
pub const CREATED_BY_REF: &str = "identity--d287a5a4-facc-5254-9563-9e92e3e729ac";

// Fixed data-classification markings applied to every produced object.
pub const OBJECT_MARKING_REFS: [&str; 2] = [
    "marking-definition--94868c89-83c2-464b-929b-a1a8aa3c8487",
    "marking-definition--d287a5a4-facc-5254-9563-9e92e3e729ac",
];

// Extension definition that declares bank-card as a new SCO type.
pub const BANK_CARD_EXTENSION_ID: &str =
    "extension-definition--7922f91a-ee77-58a5-8217-321ce6a2d6e0";

// Identities carry a fixed creation timestamp so their content is stable
// across runs regardless of when the run happened.
pub const IDENTITY_TIMESTAMP: &str = "2020-01-01T00:00:00.000Z";

/// Default STIX objects inserted verbatim into every bundle: the bank-card
/// extension definition, the default publisher identity, and the
/// marking definitions referenced above.
pub const DEFAULT_OBJECT_URLS: [&str; 3] = [
    "https://raw.githubusercontent.com/muchdogesec/stix2extensions/main/extension-definitions/scos/bank-card.json",
    "https://raw.githubusercontent.com/muchdogesec/stix4doge/main/objects/identity/creditcard2stix.json",
    "https://raw.githubusercontent.com/muchdogesec/stix4doge/main/objects/marking-definition/creditcard2stix.json",
];

pub const DEFAULT_OUTPUT_DIR: &str = "stix2_objects";
pub const BUNDLE_FILE_NAME: &str = "credit-card-bundle.json";
