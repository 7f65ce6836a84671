use thiserror::Error;

/// Structural defects in wire data: malformed base64url, bad JSON, missing or
/// misshaped envelope fields.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid base64url: {0}")]
    Base64(String),

    #[error("decrypted payload is not valid UTF-8")]
    Utf8,

    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("unsupported {field}: expected {expected:?}, got {got:?}")]
    UnsupportedAlgorithm {
        field: &'static str,
        expected: &'static str,
        got: String,
    },

    #[error("invalid {field} length: expected {expected} bytes, got {got}")]
    InvalidFieldLength {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("iteration count must be a positive integer")]
    InvalidIterationCount,

    #[error("decrypted document is missing a string \"id\"")]
    MissingDocumentId,
}

/// Cryptographic failures. Authentication failures deliberately carry no
/// detail about which check failed.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("authentication failed")]
    Authentication,

    #[error("random number generation failed: {0}")]
    Rng(String),

    #[error(transparent)]
    Format(#[from] FormatError),
}
