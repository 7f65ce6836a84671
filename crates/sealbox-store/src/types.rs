//! Wire types for the encrypted document server.

use std::collections::BTreeMap;

use sealbox_crypto::DocumentJwe;
use serde::{Deserialize, Serialize};

/// Blinded `(name, value)` pair emitted for an indexed attribute. Identical
/// cleartext pairs blind to identical tokens, which is what lets the server
/// answer equality queries without seeing plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindedAttribute {
    pub name: String,
    pub value: String,
}

/// Server-visible record: blinded id, blinded attributes for indexed keys,
/// and the JWE carrying the whole document body. Attribute ordering is not
/// significant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedDocument {
    pub id: String,
    pub attributes: Vec<BlindedAttribute>,
    pub jwe: DocumentJwe,
}

/// Blinded equality/presence query, as POSTed to the server. Exactly one of
/// the two fields is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlindedQuery {
    /// OR across entries; each entry ANDs its blinded `name → value` pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<Vec<BTreeMap<String, String>>>,
    /// AND across blinded attribute names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has: Option<Vec<String>>,
}
