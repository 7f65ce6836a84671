//! Client-side cryptography for the sealbox encrypted document store:
//! master-key management, JWE envelope encryption, and deterministic index
//! blinding. The server sees only the outputs of this crate — opaque
//! ciphertexts and blinded tokens.

pub mod aes_gcm;
pub mod base64url;
pub mod error;
pub mod jwe;
pub mod keywrap;
pub mod mac;
pub mod master_key;
pub mod password;
pub mod types;

pub use aes_gcm::{aes_gcm_decrypt, aes_gcm_encrypt, generate_iv};
pub use base64url::{base64url_decode, base64url_encode};
pub use error::{CryptoError, FormatError};
pub use jwe::{DocumentJwe, JweHeader, Pbes2Header, WrappedMasterKey};
pub use keywrap::{unwrap_key, wrap_key};
pub use mac::hmac_sha256;
pub use master_key::MasterKey;
pub use password::{derive_wrapping_key, generate_salt};
pub use types::{
    AES_GCM_IV_LENGTH, AES_GCM_TAG_LENGTH, AES_KEY_LENGTH, AES_KW_WRAPPED_LENGTH, CEK_ALG,
    CONTENT_ENC, PASSWORD_ALG, PBKDF2_ITERATIONS, PBKDF2_SALT_LENGTH,
};
