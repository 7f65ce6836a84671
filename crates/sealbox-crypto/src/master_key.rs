//! Master key: the root HMAC secret plus the two subkeys derived from it.
//!
//! Subkeys come from HMAC-SHA-256 of a fixed label over the master secret:
//! `"kek"` yields the AES-KW key-encryption key, `"hmac"` yields the
//! index-blinding key. The two serve incompatible modes — fresh-nonce AEAD
//! versus deterministic tokenization — and are never interchanged. The label
//! set is closed; see `types.rs`.

use serde_json::Value;
use zeroize::Zeroizing;

use crate::aes_gcm::{aes_gcm_decrypt, aes_gcm_encrypt, generate_iv};
use crate::base64url::base64url_encode;
use crate::error::{CryptoError, FormatError};
use crate::jwe::{DocumentJwe, JweHeader, Pbes2Header, WrappedMasterKey};
use crate::keywrap::{unwrap_key, wrap_key};
use crate::mac::hmac_sha256;
use crate::password::{derive_wrapping_key, generate_salt};
use crate::types::{
    AES_KEY_LENGTH, CEK_ALG, CONTENT_ENC, INDEX_LABEL, KEK_LABEL, PASSWORD_ALG, PBKDF2_ITERATIONS,
};

/// Root of the key hierarchy.
///
/// Owns the extractable 32-byte master HMAC secret and the two subkeys
/// derived from it. All key material lives in zeroize-on-drop buffers; the
/// master secret leaves this type only in its password-wrapped form.
#[derive(Clone)]
pub struct MasterKey {
    secret: Zeroizing<[u8; AES_KEY_LENGTH]>,
    kek: Zeroizing<[u8; AES_KEY_LENGTH]>,
    index_key: Zeroizing<[u8; AES_KEY_LENGTH]>,
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey").finish_non_exhaustive()
    }
}

impl MasterKey {
    /// Generate a fresh random master key and derive its subkeys.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut secret = Zeroizing::new([0u8; AES_KEY_LENGTH]);
        getrandom::getrandom(secret.as_mut_slice()).map_err(|e| CryptoError::Rng(e.to_string()))?;
        Ok(Self::from_secret(secret))
    }

    fn from_secret(secret: Zeroizing<[u8; AES_KEY_LENGTH]>) -> Self {
        let kek = Zeroizing::new(hmac_sha256(secret.as_slice(), KEK_LABEL));
        let index_key = Zeroizing::new(hmac_sha256(secret.as_slice(), INDEX_LABEL));
        Self {
            secret,
            kek,
            index_key,
        }
    }

    /// Encrypt bytes into a document JWE under a fresh content key.
    pub fn encrypt(&self, data: &[u8]) -> Result<DocumentJwe, CryptoError> {
        let mut cek = Zeroizing::new([0u8; AES_KEY_LENGTH]);
        getrandom::getrandom(cek.as_mut_slice()).map_err(|e| CryptoError::Rng(e.to_string()))?;
        let wrapped_cek = wrap_key(&self.kek, &cek)?;
        let iv = generate_iv()?;
        let (ciphertext, tag) = aes_gcm_encrypt(&cek, &iv, data)?;
        Ok(DocumentJwe {
            unprotected: JweHeader {
                alg: CEK_ALG.to_string(),
                enc: CONTENT_ENC.to_string(),
            },
            encrypted_key: base64url_encode(&wrapped_cek),
            iv: base64url_encode(&iv),
            ciphertext: base64url_encode(&ciphertext),
            tag: base64url_encode(&tag),
        })
    }

    /// JSON-serialize a value and encrypt it. Key ordering follows the
    /// caller's JSON form; round-trip equality of ordering is not guaranteed.
    pub fn encrypt_object(&self, value: &Value) -> Result<DocumentJwe, CryptoError> {
        let data = serde_json::to_vec(value).map_err(|e| FormatError::Json(e.to_string()))?;
        self.encrypt(&data)
    }

    /// Decrypt a document JWE. Structural defects surface as format errors;
    /// authentication failures carry no further detail.
    pub fn decrypt(&self, jwe: &DocumentJwe) -> Result<Vec<u8>, CryptoError> {
        let parts = jwe.decode_parts()?;
        let cek = unwrap_key(&self.kek, &parts.encrypted_key)?;
        aes_gcm_decrypt(&cek, &parts.iv, &parts.ciphertext, &parts.tag)
    }

    /// Decrypt a document JWE and parse the UTF-8 payload as JSON.
    pub fn decrypt_object(&self, jwe: &DocumentJwe) -> Result<Value, CryptoError> {
        let data = self.decrypt(jwe)?;
        let text = String::from_utf8(data).map_err(|_| FormatError::Utf8)?;
        Ok(serde_json::from_str(&text).map_err(|e| FormatError::Json(e.to_string()))?)
    }

    /// Deterministically blind data for server-side equality matching.
    /// Identical input always yields the identical token under this key.
    pub fn blind(&self, data: impl AsRef<[u8]>) -> String {
        base64url_encode(&hmac_sha256(self.index_key.as_slice(), data.as_ref()))
    }

    /// Wrap the master secret under a password-derived key, with a fresh
    /// random salt.
    pub fn wrap_with_password(&self, password: &str) -> Result<WrappedMasterKey, CryptoError> {
        let salt = generate_salt()?;
        let wrapping_key = derive_wrapping_key(password, &salt, PBKDF2_ITERATIONS);
        let wrapped = wrap_key(&wrapping_key, &self.secret)?;
        Ok(WrappedMasterKey {
            header: Pbes2Header {
                alg: PASSWORD_ALG.to_string(),
                p2c: PBKDF2_ITERATIONS,
                p2s: base64url_encode(&salt),
            },
            encrypted_key: base64url_encode(&wrapped),
        })
    }

    /// Recover a master key from its password-wrapped form. A wrong password
    /// surfaces as a bare authentication failure.
    pub fn unwrap_with_password(
        password: &str,
        wrapped: &WrappedMasterKey,
    ) -> Result<Self, CryptoError> {
        let (salt, encrypted_key) = wrapped.decode_parts()?;
        let wrapping_key = derive_wrapping_key(password, &salt, wrapped.header.p2c);
        let secret = unwrap_key(&wrapping_key, &encrypted_key)?;
        Ok(Self::from_secret(secret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base64url::base64url_decode;
    use serde_json::json;

    fn corrupt(field: &mut String) {
        let mut bytes = base64url_decode(field).unwrap();
        bytes[0] ^= 0xff;
        *field = base64url_encode(&bytes);
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let key = MasterKey::generate().unwrap();
        let jwe = key.encrypt(b"Hello, World!").unwrap();
        assert_eq!(key.decrypt(&jwe).unwrap(), b"Hello, World!");
    }

    #[test]
    fn object_round_trip() {
        let key = MasterKey::generate().unwrap();
        let doc = json!({"id": "foo", "a": 1, "nested": {"b": [1, 2, 3]}});
        let jwe = key.encrypt_object(&doc).unwrap();
        assert_eq!(key.decrypt_object(&jwe).unwrap(), doc);
    }

    #[test]
    fn header_carries_wire_constants() {
        let key = MasterKey::generate().unwrap();
        let jwe = key.encrypt(b"x").unwrap();
        assert_eq!(jwe.unprotected.alg, "A256KW");
        assert_eq!(jwe.unprotected.enc, "A256GCM");
        assert_eq!(base64url_decode(&jwe.iv).unwrap().len(), 12);
        assert_eq!(base64url_decode(&jwe.tag).unwrap().len(), 16);
        assert_eq!(base64url_decode(&jwe.encrypted_key).unwrap().len(), 40);
    }

    #[test]
    fn fresh_randomness_per_encryption() {
        let key = MasterKey::generate().unwrap();
        let a = key.encrypt(b"same plaintext").unwrap();
        let b = key.encrypt(b"same plaintext").unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.encrypted_key, b.encrypted_key);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn tampering_any_field_fails_authentication() {
        let key = MasterKey::generate().unwrap();
        let jwe = key.encrypt(b"secret").unwrap();

        for target in ["ciphertext", "iv", "tag", "encrypted_key"] {
            let mut tampered = jwe.clone();
            match target {
                "ciphertext" => corrupt(&mut tampered.ciphertext),
                "iv" => corrupt(&mut tampered.iv),
                "tag" => corrupt(&mut tampered.tag),
                _ => corrupt(&mut tampered.encrypted_key),
            }
            assert!(
                matches!(key.decrypt(&tampered), Err(CryptoError::Authentication)),
                "tampered {target} must fail closed"
            );
        }
    }

    #[test]
    fn decrypt_with_other_key_fails() {
        let key1 = MasterKey::generate().unwrap();
        let key2 = MasterKey::generate().unwrap();
        let jwe = key1.encrypt(b"secret").unwrap();
        assert!(key2.decrypt(&jwe).is_err());
    }

    #[test]
    fn blind_is_deterministic() {
        let key = MasterKey::generate().unwrap();
        assert_eq!(key.blind("indexedKey"), key.blind("indexedKey"));
        assert_eq!(key.blind(b"bytes".as_slice()), key.blind("bytes"));
    }

    #[test]
    fn blind_differs_across_keys() {
        let key1 = MasterKey::generate().unwrap();
        let key2 = MasterKey::generate().unwrap();
        assert_ne!(key1.blind("indexedKey"), key2.blind("indexedKey"));
    }

    #[test]
    fn blind_differs_across_inputs() {
        let key = MasterKey::generate().unwrap();
        assert_ne!(key.blind("a"), key.blind("b"));
    }

    #[test]
    fn password_round_trip() {
        let key = MasterKey::generate().unwrap();
        let jwe = key.encrypt(b"written before wrap").unwrap();

        let wrapped = key.wrap_with_password("hunter2").unwrap();
        let recovered = MasterKey::unwrap_with_password("hunter2", &wrapped).unwrap();

        assert_eq!(recovered.decrypt(&jwe).unwrap(), b"written before wrap");
        assert_eq!(recovered.blind("attr"), key.blind("attr"));
    }

    #[test]
    fn wrapped_key_uses_pbes2_header() {
        let key = MasterKey::generate().unwrap();
        let wrapped = key.wrap_with_password("pw").unwrap();
        assert_eq!(wrapped.header.alg, "PBES2-HS512+A256KW");
        assert_eq!(wrapped.header.p2c, 4096);
        assert_eq!(base64url_decode(&wrapped.header.p2s).unwrap().len(), 32);
        assert_eq!(base64url_decode(&wrapped.encrypted_key).unwrap().len(), 40);
    }

    #[test]
    fn fresh_salt_per_wrap() {
        let key = MasterKey::generate().unwrap();
        let a = key.wrap_with_password("pw").unwrap();
        let b = key.wrap_with_password("pw").unwrap();
        assert_ne!(a.header.p2s, b.header.p2s);
        assert_ne!(a.encrypted_key, b.encrypted_key);
    }

    #[test]
    fn wrong_password_fails() {
        let key = MasterKey::generate().unwrap();
        let wrapped = key.wrap_with_password("hunter2").unwrap();
        assert!(matches!(
            MasterKey::unwrap_with_password("*******", &wrapped),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn nonstandard_iteration_count_is_accepted() {
        let key = MasterKey::generate().unwrap();
        let mut wrapped = key.wrap_with_password("pw").unwrap();

        // Rewrap manually at a different count; the reader must honor p2c.
        let salt = base64url_decode(&wrapped.header.p2s).unwrap();
        let wrapping_key = derive_wrapping_key("pw", &salt, 100);
        let rewrapped = wrap_key(&wrapping_key, &key.secret).unwrap();
        wrapped.header.p2c = 100;
        wrapped.encrypted_key = base64url_encode(&rewrapped);

        assert!(MasterKey::unwrap_with_password("pw", &wrapped).is_ok());
    }
}
