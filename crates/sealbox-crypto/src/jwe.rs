//! JWE wire types.
//!
//! Two envelopes cross the wire: [`DocumentJwe`] (A256KW + A256GCM,
//! unprotected-header JSON variant) carrying a document body, and
//! [`WrappedMasterKey`] (PBES2-HS512+A256KW) carrying the password-encrypted
//! master secret. All binary fields are unpadded base64url.

use serde::{Deserialize, Serialize};

use crate::base64url::base64url_decode;
use crate::error::FormatError;
use crate::types::{AES_GCM_IV_LENGTH, AES_GCM_TAG_LENGTH, CEK_ALG, CONTENT_ENC, PASSWORD_ALG};

/// Unprotected header of a document JWE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JweHeader {
    pub alg: String,
    pub enc: String,
}

/// Envelope for a single encrypted document body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentJwe {
    pub unprotected: JweHeader,
    /// base64url of the AES-KW-wrapped content key.
    pub encrypted_key: String,
    /// base64url of the 12-byte nonce.
    pub iv: String,
    /// base64url of the ciphertext, tag excluded.
    pub ciphertext: String,
    /// base64url of the 16-byte AEAD tag.
    pub tag: String,
}

/// Decoded binary fields of a [`DocumentJwe`].
pub(crate) struct JweParts {
    pub encrypted_key: Vec<u8>,
    pub iv: [u8; AES_GCM_IV_LENGTH],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; AES_GCM_TAG_LENGTH],
}

impl DocumentJwe {
    /// Validate the header and decode every binary field.
    pub(crate) fn decode_parts(&self) -> Result<JweParts, FormatError> {
        if self.unprotected.alg != CEK_ALG {
            return Err(FormatError::UnsupportedAlgorithm {
                field: "alg",
                expected: CEK_ALG,
                got: self.unprotected.alg.clone(),
            });
        }
        if self.unprotected.enc != CONTENT_ENC {
            return Err(FormatError::UnsupportedAlgorithm {
                field: "enc",
                expected: CONTENT_ENC,
                got: self.unprotected.enc.clone(),
            });
        }
        Ok(JweParts {
            encrypted_key: base64url_decode(&self.encrypted_key)?,
            iv: decode_exact("iv", &self.iv)?,
            ciphertext: base64url_decode(&self.ciphertext)?,
            tag: decode_exact("tag", &self.tag)?,
        })
    }
}

/// PBES2 header of a password-wrapped master key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pbes2Header {
    pub alg: String,
    /// PBKDF2 iteration count.
    pub p2c: u32,
    /// base64url-encoded PBKDF2 salt.
    pub p2s: String,
}

/// Password-encrypted master key, as stored on the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrappedMasterKey {
    pub header: Pbes2Header,
    /// base64url of the AES-KW wrap of the 32-byte master secret.
    pub encrypted_key: String,
}

impl WrappedMasterKey {
    /// Validate the header and decode the salt and wrapped key.
    pub(crate) fn decode_parts(&self) -> Result<(Vec<u8>, Vec<u8>), FormatError> {
        if self.header.alg != PASSWORD_ALG {
            return Err(FormatError::UnsupportedAlgorithm {
                field: "alg",
                expected: PASSWORD_ALG,
                got: self.header.alg.clone(),
            });
        }
        if self.header.p2c == 0 {
            return Err(FormatError::InvalidIterationCount);
        }
        let salt = base64url_decode(&self.header.p2s)?;
        let wrapped = base64url_decode(&self.encrypted_key)?;
        Ok((salt, wrapped))
    }
}

fn decode_exact<const N: usize>(field: &'static str, value: &str) -> Result<[u8; N], FormatError> {
    let bytes = base64url_decode(value)?;
    let got = bytes.len();
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| FormatError::InvalidFieldLength {
        field,
        expected: N,
        got,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base64url::base64url_encode;

    fn sample_jwe() -> DocumentJwe {
        DocumentJwe {
            unprotected: JweHeader {
                alg: CEK_ALG.to_string(),
                enc: CONTENT_ENC.to_string(),
            },
            encrypted_key: base64url_encode(&[0u8; 40]),
            iv: base64url_encode(&[1u8; 12]),
            ciphertext: base64url_encode(b"opaque"),
            tag: base64url_encode(&[2u8; 16]),
        }
    }

    #[test]
    fn serde_uses_wire_field_names() {
        let json = serde_json::to_value(sample_jwe()).unwrap();
        assert_eq!(json["unprotected"]["alg"], "A256KW");
        assert_eq!(json["unprotected"]["enc"], "A256GCM");
        assert!(json["encrypted_key"].is_string());
        assert!(json["iv"].is_string());
        assert!(json["ciphertext"].is_string());
        assert!(json["tag"].is_string());
    }

    #[test]
    fn decode_parts_round_trip() {
        let parts = sample_jwe().decode_parts().unwrap();
        assert_eq!(parts.encrypted_key.len(), 40);
        assert_eq!(parts.iv, [1u8; 12]);
        assert_eq!(parts.ciphertext, b"opaque");
        assert_eq!(parts.tag, [2u8; 16]);
    }

    #[test]
    fn rejects_wrong_alg() {
        let mut jwe = sample_jwe();
        jwe.unprotected.alg = "A128KW".to_string();
        assert!(matches!(
            jwe.decode_parts(),
            Err(FormatError::UnsupportedAlgorithm { field: "alg", .. })
        ));
    }

    #[test]
    fn rejects_wrong_enc() {
        let mut jwe = sample_jwe();
        jwe.unprotected.enc = "A128GCM".to_string();
        assert!(matches!(
            jwe.decode_parts(),
            Err(FormatError::UnsupportedAlgorithm { field: "enc", .. })
        ));
    }

    #[test]
    fn rejects_short_iv() {
        let mut jwe = sample_jwe();
        jwe.iv = base64url_encode(&[1u8; 8]);
        assert!(matches!(
            jwe.decode_parts(),
            Err(FormatError::InvalidFieldLength { field: "iv", .. })
        ));
    }

    #[test]
    fn rejects_short_tag() {
        let mut jwe = sample_jwe();
        jwe.tag = base64url_encode(&[2u8; 12]);
        assert!(matches!(
            jwe.decode_parts(),
            Err(FormatError::InvalidFieldLength { field: "tag", .. })
        ));
    }

    #[test]
    fn rejects_malformed_base64() {
        let mut jwe = sample_jwe();
        jwe.ciphertext = "not base64url!".to_string();
        assert!(matches!(jwe.decode_parts(), Err(FormatError::Base64(_))));
    }

    #[test]
    fn wrapped_key_rejects_zero_iterations() {
        let wrapped = WrappedMasterKey {
            header: Pbes2Header {
                alg: PASSWORD_ALG.to_string(),
                p2c: 0,
                p2s: base64url_encode(&[0u8; 32]),
            },
            encrypted_key: base64url_encode(&[0u8; 40]),
        };
        assert!(matches!(
            wrapped.decode_parts(),
            Err(FormatError::InvalidIterationCount)
        ));
    }

    #[test]
    fn wrapped_key_rejects_wrong_alg() {
        let wrapped = WrappedMasterKey {
            header: Pbes2Header {
                alg: "PBES2-HS256+A128KW".to_string(),
                p2c: 4096,
                p2s: base64url_encode(&[0u8; 32]),
            },
            encrypted_key: base64url_encode(&[0u8; 40]),
        };
        assert!(wrapped.decode_parts().is_err());
    }
}
