//! AES-256-GCM content encryption.
//!
//! Ciphertext and the 16-byte tag travel as separate envelope fields, so the
//! functions here split and rejoin them around the `aes-gcm` API, which works
//! on `ciphertext || tag`. Associated data is always empty.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};

use crate::error::CryptoError;
use crate::types::{AES_GCM_IV_LENGTH, AES_GCM_TAG_LENGTH, AES_KEY_LENGTH};

/// Generate a random 12-byte IV.
pub fn generate_iv() -> Result<[u8; AES_GCM_IV_LENGTH], CryptoError> {
    let mut iv = [0u8; AES_GCM_IV_LENGTH];
    getrandom::getrandom(&mut iv).map_err(|e| CryptoError::Rng(e.to_string()))?;
    Ok(iv)
}

/// Encrypt with AES-256-GCM. Returns the ciphertext and the tag separately.
pub fn aes_gcm_encrypt(
    key: &[u8; AES_KEY_LENGTH],
    iv: &[u8; AES_GCM_IV_LENGTH],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; AES_GCM_TAG_LENGTH]), CryptoError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut sealed = cipher
        .encrypt(Nonce::from_slice(iv), plaintext)
        .map_err(|_| CryptoError::Authentication)?;

    let tag_offset = sealed.len() - AES_GCM_TAG_LENGTH;
    let tag_bytes = sealed.split_off(tag_offset);
    let mut tag = [0u8; AES_GCM_TAG_LENGTH];
    tag.copy_from_slice(&tag_bytes);
    Ok((sealed, tag))
}

/// Decrypt with AES-256-GCM. Any tag mismatch surfaces as a bare
/// authentication failure.
pub fn aes_gcm_decrypt(
    key: &[u8; AES_KEY_LENGTH],
    iv: &[u8; AES_GCM_IV_LENGTH],
    ciphertext: &[u8],
    tag: &[u8; AES_GCM_TAG_LENGTH],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut sealed = Vec::with_capacity(ciphertext.len() + AES_GCM_TAG_LENGTH);
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    cipher
        .decrypt(Nonce::from_slice(iv), sealed.as_slice())
        .map_err(|_| CryptoError::Authentication)
}
