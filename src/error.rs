use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    Internal,

    /// The caller supplied an invalid configuration, passphrase or input.
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A fixed key size other than 128, 192 or 256 bits was requested.
    InvalidKeySize,
    /// No fixed key size was given and the passphrase is not 16, 24 or 32 bytes.
    UnsupportedPassphraseLength,
    /// The configured salt length cannot be encoded in the salt header.
    InvalidSaltLength,
    /// The password hash could not produce key material.
    KeyDerivationFailed,
    /// The AES engine rejected the key/IV/mode combination.
    CipherInitFailed,
    /// The encryption transform failed (e.g. unaligned input without padding).
    EncryptionFailed,
    /// The decryption transform failed (e.g. padding mismatch, wrong key).
    DecryptionFailed,
    /// The salt length recovered from decrypted data does not fit the data.
    MalformedCiphertext,
    /// Base64 decoding of ciphertext text failed.
    Base64Decode,
    /// Decrypted bytes or passphrase input were not valid UTF-8.
    InvalidUtf8,
    /// Passphrase could not be obtained from the configured reader.
    PassphraseUnavailable,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct SaltcryptError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag. Any code consuming errors MUST handle
    /// the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl SaltcryptError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SaltcryptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_preserves_kind_and_category() {
        let err = SaltcryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::DecryptionFailed,
            "bad padding",
        )
        .with_context("failed to decrypt");

        assert_eq!(err.kind, Some(ErrorKind::DecryptionFailed));
        assert_eq!(err.category, ErrorCategory::User);
        assert_eq!(err.message(), "failed to decrypt");
        assert_eq!(err.source_error().unwrap().to_string(), "bad padding");
    }

    #[test]
    fn test_plain_error_has_no_kind() {
        let err = SaltcryptError::new(ErrorCategory::Internal, "boom");
        assert_eq!(err.kind, None);
        assert!(err.source_error().is_none());
        assert_eq!(err.to_string(), "boom");
    }
}
