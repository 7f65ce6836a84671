use sealbox_crypto::{CryptoError, FormatError};
use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Error taxonomy for storage operations. Every facade operation surfaces
/// its failure here; nothing is swallowed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Caller misuse: wrong filter shape, non-string id, empty account id.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed wire data: bad JWE, missing fields, misshaped records.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// AEAD or key-wrap authentication failure. Carries no cause detail.
    #[error(transparent)]
    Crypto(CryptoError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    /// Transport failure that maps onto no other variant.
    #[error("transport error (status {status:?}): {message}")]
    Transport { status: Option<u16>, message: String },

    /// Operation aborted at a suspension point.
    #[error("operation cancelled")]
    Cancelled,
}

impl From<CryptoError> for StoreError {
    fn from(err: CryptoError) -> Self {
        match err {
            // Structural defects embedded in crypto results stay format errors.
            CryptoError::Format(format) => StoreError::Format(format),
            other => StoreError::Crypto(other),
        }
    }
}
