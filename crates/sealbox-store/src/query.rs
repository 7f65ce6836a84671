//! Equality/presence filters and their blinded translation.
//!
//! A filter sets exactly one of `equals` or `has`. `equals` objects AND their
//! pairs and OR across objects; `has` ANDs attribute names. Translation
//! blinds every token with the master key's index subkey; the server matches
//! tokens without learning the cleartext. No client-side result filtering
//! happens — the server is trusted to honor the filter semantics.

use std::collections::BTreeMap;

use sealbox_crypto::MasterKey;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec::blind_attribute;
use crate::error::{Result, StoreError};
use crate::types::BlindedQuery;

/// One value or a list of them; mirrors the accepted filter shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }
}

/// A search filter. Exactly one of `equals` or `has` must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<OneOrMany<Map<String, Value>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has: Option<OneOrMany<String>>,
}

impl Query {
    /// Match documents carrying every `(key, value)` pair of the object.
    pub fn equals(pairs: Map<String, Value>) -> Self {
        Self {
            equals: Some(OneOrMany::One(pairs)),
            has: None,
        }
    }

    /// Match documents satisfying any of the objects (OR across objects,
    /// AND within each).
    pub fn equals_any(objects: Vec<Map<String, Value>>) -> Self {
        Self {
            equals: Some(OneOrMany::Many(objects)),
            has: None,
        }
    }

    /// Match documents that carry the attribute, whatever its value.
    pub fn has(name: impl Into<String>) -> Self {
        Self {
            equals: None,
            has: Some(OneOrMany::One(name.into())),
        }
    }

    /// Match documents carrying every one of the attributes.
    pub fn has_all(names: Vec<String>) -> Self {
        Self {
            equals: None,
            has: Some(OneOrMany::Many(names)),
        }
    }
}

/// Validate a filter and translate it into its blinded server-side form.
pub fn plan_query(query: &Query, master_key: &MasterKey) -> Result<BlindedQuery> {
    match (&query.equals, &query.has) {
        (Some(_), Some(_)) => Err(StoreError::InvalidArgument(
            "only one of \"equals\" and \"has\" may be set".into(),
        )),
        (None, None) => Err(StoreError::InvalidArgument(
            "one of \"equals\" and \"has\" must be set".into(),
        )),
        (Some(equals), None) => {
            let mut blinded = Vec::with_capacity(equals.as_slice().len());
            for object in equals.as_slice() {
                let mut pairs = BTreeMap::new();
                for (key, value) in object {
                    let attribute = blind_attribute(master_key, key, value)?;
                    pairs.insert(attribute.name, attribute.value);
                }
                blinded.push(pairs);
            }
            Ok(BlindedQuery {
                equals: Some(blinded),
                has: None,
            })
        }
        (None, Some(has)) => Ok(BlindedQuery {
            equals: None,
            has: Some(
                has.as_slice()
                    .iter()
                    .map(|name| master_key.blind(name))
                    .collect(),
            ),
        }),
    }
}
