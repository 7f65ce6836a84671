//! Strict unpadded base64url.
//!
//! Every binary field on the wire is base64url without padding. Decoding is
//! strict: padding characters and non-alphabet bytes are rejected so that
//! malformed tokens fail before any key material is touched.

use base64ct::{Base64UrlUnpadded, Encoding};

use crate::error::FormatError;

/// Base64url encode bytes without padding.
pub fn base64url_encode(data: &[u8]) -> String {
    Base64UrlUnpadded::encode_string(data)
}

/// Base64url decode a string to bytes. Rejects padding and non-alphabet
/// characters.
pub fn base64url_decode(s: &str) -> Result<Vec<u8>, FormatError> {
    Base64UrlUnpadded::decode_vec(s).map_err(|e| FormatError::Base64(e.to_string()))
}
