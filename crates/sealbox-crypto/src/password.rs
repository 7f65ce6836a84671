//! PBKDF2-HMAC-SHA-512 password key derivation.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::types::{AES_KEY_LENGTH, PBKDF2_SALT_LENGTH};

/// Generate a random 32-byte PBKDF2 salt.
pub fn generate_salt() -> Result<[u8; PBKDF2_SALT_LENGTH], CryptoError> {
    let mut salt = [0u8; PBKDF2_SALT_LENGTH];
    getrandom::getrandom(&mut salt).map_err(|e| CryptoError::Rng(e.to_string()))?;
    Ok(salt)
}

/// Derive a 32-byte AES-KW wrapping key from a password. The result is
/// zeroized on drop.
pub fn derive_wrapping_key(
    password: &str,
    salt: &[u8],
    iterations: u32,
) -> Zeroizing<[u8; AES_KEY_LENGTH]> {
    let mut key = Zeroizing::new([0u8; AES_KEY_LENGTH]);
    pbkdf2_hmac::<Sha512>(password.as_bytes(), salt, iterations, key.as_mut_slice());
    key
}
