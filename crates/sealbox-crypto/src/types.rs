/// AES-256 key length in bytes. All keys in the hierarchy are this size.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-GCM nonce length in bytes.
pub const AES_GCM_IV_LENGTH: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const AES_GCM_TAG_LENGTH: usize = 16;

/// AES-KW output for a 32-byte key: 32 + 8 = 40 bytes.
pub const AES_KW_WRAPPED_LENGTH: usize = 40;

/// PBKDF2 salt length in bytes at creation time.
pub const PBKDF2_SALT_LENGTH: usize = 32;

/// PBKDF2 iteration count written into freshly wrapped master keys. Any
/// positive count is accepted on read.
pub const PBKDF2_ITERATIONS: u32 = 4096;

/// JWE `alg` for document content-key wrapping.
pub const CEK_ALG: &str = "A256KW";

/// JWE `enc` for document bodies.
pub const CONTENT_ENC: &str = "A256GCM";

/// JWE `alg` for the password-wrapped master key.
pub const PASSWORD_ALG: &str = "PBES2-HS512+A256KW";

/// Subkey derivation labels. This set is closed: adding a label changes the
/// derivation for every existing master key and is a breaking change.
pub(crate) const KEK_LABEL: &[u8] = b"kek";
pub(crate) const INDEX_LABEL: &[u8] = b"hmac";
