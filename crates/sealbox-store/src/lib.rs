//! Client-side end-to-end encrypted document store.
//!
//! Documents live on a semi-trusted server as opaque JWE ciphertexts plus
//! blinded index tokens; the server answers equality and presence queries by
//! comparing tokens it cannot invert. This crate holds the client core: the
//! master-key cache, the document codec, the query planner, and the
//! [`DocumentStore`] facade over a caller-supplied [`DocumentTransport`].

pub mod codec;
pub mod error;
pub mod key_cache;
pub mod query;
pub mod store;
pub mod transport;
pub mod types;

pub use codec::{decode_document, encode_document};
pub use error::{Result, StoreError};
pub use key_cache::{KeyCache, DEFAULT_CACHE_TIMEOUT};
pub use query::{plan_query, OneOrMany, Query};
pub use store::{DocumentStore, DocumentStoreOptions, DEFAULT_BASE_URL};
pub use transport::{
    DocumentTransport, MasterKeyProvider, MasterKeyRequest, MasterKeyResponse, TransportError,
};
pub use types::{BlindedAttribute, BlindedQuery, EncryptedDocument};

// Core key types, re-exported for callers that implement providers or
// transports without depending on the crypto crate directly.
pub use sealbox_crypto::{CryptoError, DocumentJwe, FormatError, MasterKey, WrappedMasterKey};
