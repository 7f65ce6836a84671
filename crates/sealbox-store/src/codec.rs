//! Document ↔ encrypted-envelope conversion.
//!
//! Encode: blind the id, blind each indexed attribute, seal the whole
//! document (id included) into a JWE. Decode: decrypt the JWE and validate
//! the recovered body. The outer blinded id never reaches callers.

use std::collections::BTreeSet;

use sealbox_crypto::{FormatError, MasterKey};
use serde_json::{Map, Value};

use crate::error::{Result, StoreError};
use crate::types::{BlindedAttribute, EncryptedDocument};

/// Encrypt a cleartext document into its server-visible form. Emits one
/// blinded attribute per indexed key present on the document.
pub fn encode_document(
    doc: &Value,
    master_key: &MasterKey,
    index_set: &BTreeSet<String>,
) -> Result<EncryptedDocument> {
    let object = doc
        .as_object()
        .ok_or_else(|| StoreError::InvalidArgument("document must be a JSON object".into()))?;
    let id = document_id(doc)?;

    let blinded_id = master_key.blind(id);
    let mut attributes = Vec::new();
    for (key, value) in object {
        if !index_set.contains(key) {
            continue;
        }
        attributes.push(blind_attribute(master_key, key, value)?);
    }
    let jwe = master_key.encrypt_object(doc)?;

    Ok(EncryptedDocument {
        id: blinded_id,
        attributes,
        jwe,
    })
}

/// Decrypt a server record back into the cleartext document.
pub fn decode_document(encrypted: &EncryptedDocument, master_key: &MasterKey) -> Result<Value> {
    let doc = master_key.decrypt_object(&encrypted.jwe)?;
    if !doc.get("id").is_some_and(Value::is_string) {
        return Err(FormatError::MissingDocumentId.into());
    }
    Ok(doc)
}

/// Blind one `(key, value)` pair. The value token covers the single-entry
/// JSON object `{"key":value}`, so equal pairs collide and nothing else does.
pub(crate) fn blind_attribute(
    master_key: &MasterKey,
    key: &str,
    value: &Value,
) -> Result<BlindedAttribute> {
    let mut pair = Map::new();
    pair.insert(key.to_string(), value.clone());
    let serialized = serde_json::to_string(&Value::Object(pair))
        .map_err(|e| StoreError::Format(FormatError::Json(e.to_string())))?;
    Ok(BlindedAttribute {
        name: master_key.blind(key),
        value: master_key.blind(serialized),
    })
}

fn document_id(doc: &Value) -> Result<&str> {
    match doc.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(StoreError::InvalidArgument(
            "document \"id\" must be a non-empty string".into(),
        )),
    }
}
