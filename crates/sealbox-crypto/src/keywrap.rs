//! AES-KW key wrapping (RFC 3394).
//!
//! Wraps 32-byte keys under a 32-byte KEK, producing 40 bytes. Unwrap
//! failures are authentication failures; the integrity check is built into
//! the algorithm.

use aes_kw::Kek;
use zeroize::Zeroizing;

use crate::error::{CryptoError, FormatError};
use crate::types::{AES_KEY_LENGTH, AES_KW_WRAPPED_LENGTH};

/// Wrap a 32-byte key under `kek`.
pub fn wrap_key(
    kek: &[u8; AES_KEY_LENGTH],
    key: &[u8; AES_KEY_LENGTH],
) -> Result<[u8; AES_KW_WRAPPED_LENGTH], CryptoError> {
    let kek = Kek::from(*kek);
    let mut wrapped = [0u8; AES_KW_WRAPPED_LENGTH];
    kek.wrap(key, &mut wrapped)
        .map_err(|_| CryptoError::Authentication)?;
    Ok(wrapped)
}

/// Unwrap a key wrapped with [`wrap_key`]. The result is zeroized on drop.
pub fn unwrap_key(
    kek: &[u8; AES_KEY_LENGTH],
    wrapped: &[u8],
) -> Result<Zeroizing<[u8; AES_KEY_LENGTH]>, CryptoError> {
    if wrapped.len() != AES_KW_WRAPPED_LENGTH {
        return Err(FormatError::InvalidFieldLength {
            field: "encrypted_key",
            expected: AES_KW_WRAPPED_LENGTH,
            got: wrapped.len(),
        }
        .into());
    }
    let kek = Kek::from(*kek);
    let mut key = Zeroizing::new([0u8; AES_KEY_LENGTH]);
    kek.unwrap(wrapped, key.as_mut_slice())
        .map_err(|_| CryptoError::Authentication)?;
    Ok(key)
}
