//! High-level client for the encrypted document server.
//!
//! Every operation that touches document content first acquires the master
//! key: a cache hit slides the TTL, a miss dispatches a request to the
//! registered provider. The server only ever receives blinded ids, blinded
//! attribute tokens, and JWE ciphertexts.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sealbox_crypto::{MasterKey, WrappedMasterKey};
use serde_json::Value;
use tracing::debug;

use crate::codec::{decode_document, encode_document};
use crate::error::{Result, StoreError};
use crate::key_cache::{KeyCache, DEFAULT_CACHE_TIMEOUT};
use crate::query::{plan_query, Query};
use crate::transport::{DocumentTransport, MasterKeyProvider, MasterKeyRequest, TransportError};
use crate::types::EncryptedDocument;

/// Default endpoint root prefix.
pub const DEFAULT_BASE_URL: &str = "/private-storage";

/// Configuration for [`DocumentStore`].
pub struct DocumentStoreOptions {
    /// Account the store operates on. Opaque; URL-escaped into endpoints.
    pub account_id: String,
    /// Endpoint prefix; [`DEFAULT_BASE_URL`] when `None`.
    pub base_url: Option<String>,
    pub transport: Arc<dyn DocumentTransport>,
    /// Master-key cache TTL; 60 s when `None`.
    pub cache_timeout: Option<Duration>,
}

/// Client-side facade over a remote encrypted document collection.
pub struct DocumentStore {
    account_id: String,
    root: String,
    transport: Arc<dyn DocumentTransport>,
    key_cache: KeyCache,
    index_set: Mutex<BTreeSet<String>>,
    provider: Mutex<Option<Arc<dyn MasterKeyProvider>>>,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("account_id", &self.account_id)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl DocumentStore {
    pub fn new(options: DocumentStoreOptions) -> Result<Self> {
        if options.account_id.is_empty() {
            return Err(StoreError::InvalidArgument(
                "account id must not be empty".into(),
            ));
        }
        let base_url = options
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let root = format!("{}/{}", base_url, urlencoding::encode(&options.account_id));
        Ok(Self {
            account_id: options.account_id,
            root,
            transport: options.transport,
            key_cache: KeyCache::new(options.cache_timeout.unwrap_or(DEFAULT_CACHE_TIMEOUT)),
            index_set: Mutex::new(BTreeSet::new()),
            provider: Mutex::new(None),
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Composed endpoint root passed to every transport call.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Register the single master-key provider. Registering while one is set
    /// is an error; [`clear_master_key_provider`](Self::clear_master_key_provider)
    /// frees the slot.
    pub fn on_master_key_request(&self, provider: Arc<dyn MasterKeyProvider>) -> Result<()> {
        let mut slot = self.provider.lock();
        if slot.is_some() {
            return Err(StoreError::InvalidArgument(
                "a master key provider is already registered".into(),
            ));
        }
        *slot = Some(provider);
        Ok(())
    }

    pub fn clear_master_key_provider(&self) {
        *self.provider.lock() = None;
    }

    /// Drop any cached master key immediately.
    pub fn lock(&self) {
        self.key_cache.clear();
    }

    /// Mark an attribute as indexable. Affects future writes only; existing
    /// server-side records are not retrofitted.
    pub fn ensure_index(&self, attribute: impl Into<String>) {
        self.index_set.lock().insert(attribute.into());
    }

    /// Generate a fresh master key, wrap it under `password`, and store it
    /// with an only-if-absent precondition. The new key is cached on success.
    pub async fn create_master_key(&self, password: &str) -> Result<WrappedMasterKey> {
        let master_key = MasterKey::generate()?;
        let wrapped = master_key.wrap_with_password(password)?;
        self.transport
            .create_master_key(&self.root, &wrapped)
            .await
            .map_err(|err| match err.status {
                Some(304) => StoreError::Duplicate("master key already exists".into()),
                _ => transport_error(err),
            })?;
        self.key_cache.update(master_key, None);
        debug!(account_id = %self.account_id, "created master key");
        Ok(wrapped)
    }

    /// Re-wrap the master key under a new password and replace the stored
    /// copy. Unlocks via the provider when no key is cached.
    pub async fn change_master_key_password(
        &self,
        new_password: &str,
    ) -> Result<WrappedMasterKey> {
        let master_key = self.acquire_master_key().await?;
        let wrapped = master_key.wrap_with_password(new_password)?;
        self.transport
            .replace_master_key(&self.root, &wrapped)
            .await
            .map_err(transport_error)?;
        debug!(account_id = %self.account_id, "changed master key password");
        Ok(wrapped)
    }

    /// Fetch the wrapped master key from the server and unwrap it with
    /// `password`.
    pub async fn get_master_key(&self, password: &str) -> Result<MasterKey> {
        let wrapped = self
            .transport
            .get_master_key(&self.root)
            .await
            .map_err(|err| match err.status {
                Some(404) => StoreError::NotFound("master key not found".into()),
                _ => transport_error(err),
            })?;
        Ok(MasterKey::unwrap_with_password(password, &wrapped)?)
    }

    /// Encrypt and insert a new document. Fails on id conflict.
    pub async fn insert(&self, doc: &Value) -> Result<EncryptedDocument> {
        let master_key = self.acquire_master_key().await?;
        let encrypted = self.encode(doc, &master_key)?;
        self.transport
            .insert_document(&self.root, &encrypted)
            .await
            .map_err(|err| match err.status {
                Some(409) => StoreError::Duplicate("document already exists".into()),
                _ => transport_error(err),
            })?;
        debug!(blinded_id = %encrypted.id, "inserted document");
        Ok(encrypted)
    }

    /// Encrypt and create-or-replace a document, returning the stored record.
    pub async fn update(&self, doc: &Value) -> Result<EncryptedDocument> {
        let master_key = self.acquire_master_key().await?;
        let encrypted = self.encode(doc, &master_key)?;
        self.transport
            .update_document(&self.root, &encrypted.id, &encrypted)
            .await
            .map_err(transport_error)?;
        debug!(blinded_id = %encrypted.id, "updated document");
        Ok(encrypted)
    }

    /// Delete by cleartext id. Returns `false` when nothing was stored.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let master_key = self.acquire_master_key().await?;
        let blinded_id = master_key.blind(id);
        match self
            .transport
            .delete_document(&self.root, &blinded_id)
            .await
        {
            Ok(()) => Ok(true),
            Err(TransportError {
                status: Some(404), ..
            }) => Ok(false),
            Err(err) => Err(transport_error(err)),
        }
    }

    /// Fetch and decrypt a document by cleartext id.
    pub async fn get(&self, id: &str) -> Result<Value> {
        let master_key = self.acquire_master_key().await?;
        let blinded_id = master_key.blind(id);
        let encrypted = self
            .transport
            .get_document(&self.root, &blinded_id)
            .await
            .map_err(|err| match err.status {
                Some(404) => StoreError::NotFound(format!("document {id:?} not found")),
                _ => transport_error(err),
            })?;
        decode_document(&encrypted, &master_key)
    }

    /// Run an equality/presence query and decrypt the result set. A single
    /// failed decrypt fails the whole call; callers never see partial results.
    pub async fn find(&self, query: &Query) -> Result<Vec<Value>> {
        let master_key = self.acquire_master_key().await?;
        let blinded = plan_query(query, &master_key)?;
        let encrypted = self
            .transport
            .find_documents(&self.root, &blinded)
            .await
            .map_err(transport_error)?;
        let mut documents = Vec::with_capacity(encrypted.len());
        for record in &encrypted {
            documents.push(decode_document(record, &master_key)?);
        }
        debug!(results = documents.len(), "query complete");
        Ok(documents)
    }

    /// Cache hit (sliding TTL) or dispatch to the registered provider.
    async fn acquire_master_key(&self) -> Result<MasterKey> {
        if let Some(master_key) = self.key_cache.get() {
            return Ok(master_key);
        }
        let provider = self
            .provider
            .lock()
            .clone()
            .ok_or_else(|| StoreError::NotFound("Master key not found.".into()))?;
        let request = MasterKeyRequest {
            account_id: self.account_id.clone(),
        };
        let response = provider.master_key_request(request).await?;
        self.key_cache
            .update(response.master_key.clone(), response.timeout);
        Ok(response.master_key)
    }

    fn encode(&self, doc: &Value, master_key: &MasterKey) -> Result<EncryptedDocument> {
        let index_set = self.index_set.lock().clone();
        encode_document(doc, master_key, &index_set)
    }
}

fn transport_error(err: TransportError) -> StoreError {
    StoreError::Transport {
        status: err.status,
        message: err.message,
    }
}
