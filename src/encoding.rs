//! Text encodings for ciphertext and plaintext
//!
//! Ciphertext travels as standard base64 (with `+`, `/` and `=` padding),
//! plaintext strings as UTF-8.

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::{ErrorCategory, ErrorKind, Result, SaltcryptError};

/// Encode bytes as padded standard base64.
pub fn to_base64(body: &[u8]) -> String {
    STANDARD.encode(body)
}

/// Decode padded standard base64. Leading and trailing whitespace is ignored.
pub fn from_base64(text: &str) -> Result<Vec<u8>> {
    STANDARD.decode(text.trim()).map_err(|e| {
        SaltcryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Base64Decode,
            format!("base64 decoding failed: {}", e),
            e,
        )
    })
}

/// Interpret bytes as UTF-8 text.
pub fn to_utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        SaltcryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::InvalidUtf8,
            "decrypted data is not valid UTF-8",
            e,
        )
    })
}
