//! The document-transport capability and the master-key request surface.
//!
//! The store core never speaks HTTP itself. Callers supply a transport that
//! honors the status semantics documented per method, and optionally a
//! provider that produces the master key when the cache is empty (typically
//! by prompting the user for a password and unwrapping).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use sealbox_crypto::{MasterKey, WrappedMasterKey};

use crate::error::StoreError;
use crate::types::{BlindedQuery, EncryptedDocument};

// ============================================================================
// DocumentTransport — user-provided network layer
// ============================================================================

/// Transport-level failure, carrying the HTTP status when one exists.
#[derive(Debug, Clone)]
pub struct TransportError {
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {})", self.message, status),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for TransportError {}

/// Remote storage operations consumed by the document store.
///
/// `root` is the composed endpoint root `{base_url}/{urlescaped account id}`.
/// Non-2xx responses surface as [`TransportError`] with the status set; the
/// store maps the notable statuses (304, 404, 409) onto its error taxonomy.
#[async_trait]
pub trait DocumentTransport: Send + Sync {
    /// `PUT {root}/master-key` with an only-if-absent precondition.
    /// An already-present key surfaces as status 304.
    async fn create_master_key(
        &self,
        root: &str,
        wrapped: &WrappedMasterKey,
    ) -> Result<(), TransportError>;

    /// `POST {root}/master-key`, replacing any stored wrapped key.
    async fn replace_master_key(
        &self,
        root: &str,
        wrapped: &WrappedMasterKey,
    ) -> Result<(), TransportError>;

    /// `GET {root}/master-key`. Absent key surfaces as status 404.
    async fn get_master_key(&self, root: &str) -> Result<WrappedMasterKey, TransportError>;

    /// `POST {root}/documents`. An id conflict surfaces as status 409.
    async fn insert_document(
        &self,
        root: &str,
        document: &EncryptedDocument,
    ) -> Result<(), TransportError>;

    /// `PUT {root}/documents/{blinded_id}`, creating or replacing.
    async fn update_document(
        &self,
        root: &str,
        blinded_id: &str,
        document: &EncryptedDocument,
    ) -> Result<(), TransportError>;

    /// `GET {root}/documents/{blinded_id}`. Missing documents surface as 404.
    async fn get_document(
        &self,
        root: &str,
        blinded_id: &str,
    ) -> Result<EncryptedDocument, TransportError>;

    /// `DELETE {root}/documents/{blinded_id}`. Missing documents surface as 404.
    async fn delete_document(&self, root: &str, blinded_id: &str) -> Result<(), TransportError>;

    /// `POST {root}/query` with a blinded filter payload.
    async fn find_documents(
        &self,
        root: &str,
        query: &BlindedQuery,
    ) -> Result<Vec<EncryptedDocument>, TransportError>;
}

// ============================================================================
// MasterKeyProvider — on-demand key acquisition
// ============================================================================

/// Dispatched when an operation needs the master key and the cache is empty.
#[derive(Debug, Clone)]
pub struct MasterKeyRequest {
    pub account_id: String,
}

/// A provider's answer: the key, plus an optional cache-timeout override.
pub struct MasterKeyResponse {
    pub master_key: MasterKey,
    pub timeout: Option<Duration>,
}

/// The single registered listener that resolves master-key requests.
#[async_trait]
pub trait MasterKeyProvider: Send + Sync {
    async fn master_key_request(
        &self,
        request: MasterKeyRequest,
    ) -> Result<MasterKeyResponse, StoreError>;
}
