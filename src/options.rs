//! Encryption options
//!
//! An immutable, validated bundle of knobs consumed by
//! [`SaltedCipher`](crate::SaltedCipher): key size override, password hash,
//! salt lengths and padding scheme.

use std::fmt;
use std::str::FromStr;

use crate::error::{ErrorCategory, ErrorKind, Result, SaltcryptError};

/// AES key size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySize {
    Aes128,
    Aes192,
    Aes256,
}

impl KeySize {
    pub fn bits(self) -> u32 {
        match self {
            KeySize::Aes128 => 128,
            KeySize::Aes192 => 192,
            KeySize::Aes256 => 256,
        }
    }

    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }

    /// Infers the key size from a key or passphrase length in bytes.
    pub fn from_byte_len(len: usize) -> Option<Self> {
        match len {
            16 => Some(KeySize::Aes128),
            24 => Some(KeySize::Aes192),
            32 => Some(KeySize::Aes256),
            _ => None,
        }
    }
}

impl TryFrom<u32> for KeySize {
    type Error = SaltcryptError;

    fn try_from(bits: u32) -> Result<Self> {
        match bits {
            128 => Ok(KeySize::Aes128),
            192 => Ok(KeySize::Aes192),
            256 => Ok(KeySize::Aes256),
            other => Err(SaltcryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidKeySize,
                format!("fixed key size must be 128, 192 or 256 bits, got {}", other),
            )),
        }
    }
}

impl FromStr for KeySize {
    type Err = SaltcryptError;

    fn from_str(s: &str) -> Result<Self> {
        let bits: u32 = s.trim().parse().map_err(|e| {
            SaltcryptError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::InvalidKeySize,
                format!("key size is not a number: {:?}", s),
                e,
            )
        })?;
        KeySize::try_from(bits)
    }
}

impl fmt::Display for KeySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// Password hashing applied to the passphrase before it becomes the AES key.
///
/// Every variant other than `None` selects PBKDF2-HMAC over that digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PasswordHash {
    /// Use the UTF-8 passphrase bytes directly as the key.
    None,
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl PasswordHash {
    pub fn name(self) -> &'static str {
        match self {
            PasswordHash::None => "none",
            PasswordHash::Md5 => "md5",
            PasswordHash::Sha1 => "sha1",
            PasswordHash::Sha256 => "sha256",
            PasswordHash::Sha384 => "sha384",
            PasswordHash::Sha512 => "sha512",
        }
    }
}

impl FromStr for PasswordHash {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "none" => Ok(PasswordHash::None),
            "md5" => Ok(PasswordHash::Md5),
            "sha1" => Ok(PasswordHash::Sha1),
            "sha256" => Ok(PasswordHash::Sha256),
            "sha384" => Ok(PasswordHash::Sha384),
            "sha512" => Ok(PasswordHash::Sha512),
            _ => Err(format!("unknown password hash: {}", s)),
        }
    }
}

impl fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Block padding scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaddingMode {
    /// No padding; input must be a multiple of the block size.
    None,
    #[default]
    Pkcs7,
    /// Zero bytes; trailing zeros of the plaintext are lost on decryption.
    Zeros,
    AnsiX923,
    Iso10126,
}

impl PaddingMode {
    pub fn name(self) -> &'static str {
        match self {
            PaddingMode::None => "none",
            PaddingMode::Pkcs7 => "pkcs7",
            PaddingMode::Zeros => "zeros",
            PaddingMode::AnsiX923 => "ansix923",
            PaddingMode::Iso10126 => "iso10126",
        }
    }
}

impl FromStr for PaddingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(PaddingMode::None),
            "pkcs7" => Ok(PaddingMode::Pkcs7),
            "zeros" => Ok(PaddingMode::Zeros),
            "ansix923" => Ok(PaddingMode::AnsiX923),
            "iso10126" => Ok(PaddingMode::Iso10126),
            _ => Err(format!("unknown padding mode: {}", s)),
        }
    }
}

impl fmt::Display for PaddingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionOptions {
    fixed_key_size: Option<KeySize>,
    password_hash: PasswordHash,
    password_hash_iterations: u32,
    min_salt_length: u32,
    max_salt_length: u32,
    password_hash_salt: String,
    padding_mode: PaddingMode,
}

impl Default for EncryptionOptions {
    fn default() -> Self {
        Self {
            fixed_key_size: None,
            password_hash: PasswordHash::Sha1,
            password_hash_iterations: 1,
            min_salt_length: 0,
            max_salt_length: 0,
            password_hash_salt: String::new(),
            padding_mode: PaddingMode::Pkcs7,
        }
    }
}

impl EncryptionOptions {
    /// Creates a validated set of options.
    ///
    /// `fixed_key_size` is in bits and must be `None` (infer from the
    /// passphrase length) or one of 128, 192, 256. Salt lengths are accepted
    /// as-is; their ordering only decides whether salting is active.
    pub fn new(
        fixed_key_size: Option<u32>,
        password_hash: PasswordHash,
        password_hash_iterations: u32,
        min_salt_length: u32,
        max_salt_length: u32,
        password_hash_salt: impl Into<String>,
        padding_mode: PaddingMode,
    ) -> Result<Self> {
        let fixed_key_size = fixed_key_size.map(KeySize::try_from).transpose()?;
        Ok(Self {
            fixed_key_size,
            password_hash,
            password_hash_iterations,
            min_salt_length,
            max_salt_length,
            password_hash_salt: password_hash_salt.into(),
            padding_mode,
        })
    }

    pub fn builder() -> EncryptionOptionsBuilder {
        EncryptionOptionsBuilder::default()
    }

    pub fn fixed_key_size(&self) -> Option<KeySize> {
        self.fixed_key_size
    }

    pub fn password_hash(&self) -> PasswordHash {
        self.password_hash
    }

    pub fn password_hash_iterations(&self) -> u32 {
        self.password_hash_iterations
    }

    pub fn min_salt_length(&self) -> u32 {
        self.min_salt_length
    }

    pub fn max_salt_length(&self) -> u32 {
        self.max_salt_length
    }

    pub fn password_hash_salt(&self) -> &str {
        &self.password_hash_salt
    }

    pub fn padding_mode(&self) -> PaddingMode {
        self.padding_mode
    }

    /// Salting is active iff `max_salt_length > 0` and `max_salt_length >= min_salt_length`.
    pub fn use_salt(&self) -> bool {
        self.max_salt_length > 0 && self.max_salt_length >= self.min_salt_length
    }
}

/// Chained construction of [`EncryptionOptions`]; `build` validates.
#[derive(Debug, Clone)]
pub struct EncryptionOptionsBuilder {
    fixed_key_size: Option<u32>,
    inner: EncryptionOptions,
}

impl Default for EncryptionOptionsBuilder {
    fn default() -> Self {
        Self {
            fixed_key_size: None,
            inner: EncryptionOptions::default(),
        }
    }
}

impl EncryptionOptionsBuilder {
    pub fn fixed_key_size(mut self, bits: u32) -> Self {
        self.fixed_key_size = Some(bits);
        self
    }

    pub fn password_hash(mut self, hash: PasswordHash) -> Self {
        self.inner.password_hash = hash;
        self
    }

    pub fn password_hash_iterations(mut self, iterations: u32) -> Self {
        self.inner.password_hash_iterations = iterations;
        self
    }

    pub fn salt_length(mut self, min: u32, max: u32) -> Self {
        self.inner.min_salt_length = min;
        self.inner.max_salt_length = max;
        self
    }

    pub fn password_hash_salt(mut self, salt: impl Into<String>) -> Self {
        self.inner.password_hash_salt = salt.into();
        self
    }

    pub fn padding_mode(mut self, padding: PaddingMode) -> Self {
        self.inner.padding_mode = padding;
        self
    }

    pub fn build(self) -> Result<EncryptionOptions> {
        let mut options = self.inner;
        options.fixed_key_size = self.fixed_key_size.map(KeySize::try_from).transpose()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EncryptionOptions::default();
        assert_eq!(options.fixed_key_size(), None);
        assert_eq!(options.password_hash(), PasswordHash::Sha1);
        assert_eq!(options.password_hash_iterations(), 1);
        assert_eq!(options.min_salt_length(), 0);
        assert_eq!(options.max_salt_length(), 0);
        assert_eq!(options.password_hash_salt(), "");
        assert_eq!(options.padding_mode(), PaddingMode::Pkcs7);
        assert!(!options.use_salt());
    }

    #[test]
    fn test_valid_fixed_key_sizes() {
        for (bits, expected) in [
            (128, KeySize::Aes128),
            (192, KeySize::Aes192),
            (256, KeySize::Aes256),
        ] {
            let options = EncryptionOptions::builder()
                .fixed_key_size(bits)
                .build()
                .unwrap();
            assert_eq!(options.fixed_key_size(), Some(expected));
            assert_eq!(expected.bytes() * 8, bits as usize);
        }
    }

    #[test]
    fn test_invalid_fixed_key_size() {
        let err = EncryptionOptions::builder()
            .fixed_key_size(100)
            .build()
            .expect_err("expected invalid key size");
        assert_eq!(err.kind, Some(ErrorKind::InvalidKeySize));
        assert_eq!(err.category, ErrorCategory::User);

        let err = EncryptionOptions::new(
            Some(512),
            PasswordHash::None,
            1,
            0,
            0,
            "",
            PaddingMode::Pkcs7,
        )
        .expect_err("expected invalid key size");
        assert_eq!(err.kind, Some(ErrorKind::InvalidKeySize));
    }

    #[test]
    fn test_use_salt() {
        let salted = |min, max| {
            EncryptionOptions::builder()
                .salt_length(min, max)
                .build()
                .unwrap()
                .use_salt()
        };
        assert!(!salted(0, 0));
        assert!(salted(0, 8));
        assert!(salted(8, 8));
        assert!(salted(4, 16));
        // Reversed bounds are accepted but disable salting.
        assert!(!salted(16, 4));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("SHA-256".parse::<PasswordHash>(), Ok(PasswordHash::Sha256));
        assert_eq!("md5".parse::<PasswordHash>(), Ok(PasswordHash::Md5));
        assert!("whirlpool".parse::<PasswordHash>().is_err());
        assert_eq!("PKCS7".parse::<PaddingMode>(), Ok(PaddingMode::Pkcs7));
        assert_eq!("iso10126".parse::<PaddingMode>(), Ok(PaddingMode::Iso10126));
        assert!("oaep".parse::<PaddingMode>().is_err());
        assert_eq!("192".parse::<KeySize>().unwrap(), KeySize::Aes192);
        assert_eq!(
            "abc".parse::<KeySize>().unwrap_err().kind,
            Some(ErrorKind::InvalidKeySize)
        );
    }

    #[test]
    fn test_infer_from_length() {
        assert_eq!(KeySize::from_byte_len(16), Some(KeySize::Aes128));
        assert_eq!(KeySize::from_byte_len(24), Some(KeySize::Aes192));
        assert_eq!(KeySize::from_byte_len(32), Some(KeySize::Aes256));
        assert_eq!(KeySize::from_byte_len(20), None);
        assert_eq!(KeySize::from_byte_len(0), None);
    }
}
