//! Passphrase-based AES with a random, self-describing salt
//!
//! A [`SaltedCipher`] is built once from a passphrase, an optional IV and a
//! set of [`EncryptionOptions`]:
//! - the key is the passphrase itself or a password hash of it
//! - an IV selects CBC, no IV selects ECB
//! - when salting is on, every encryption prepends a fresh salt to the
//!   plaintext and decryption strips it again using the length stored in the
//!   salt's first four bytes (see [`crate::salt`])
//!
//! There is no authentication tag: a wrong key or tampered ciphertext is only
//! noticed if the padding happens not to check out.

use zeroize::Zeroizing;

use crate::encoding;
use crate::engine::{CipherMode, Engine};
use crate::error::{ErrorCategory, ErrorKind, Result, SaltcryptError};
use crate::kdf;
use crate::options::{EncryptionOptions, KeySize};
use crate::salt::{self, MAX_SALT_LEN, SALT_HEADER_LEN};

#[derive(Debug)]
pub struct SaltedCipher {
    engine: Engine,
    options: EncryptionOptions,
    salt_range: Option<(u8, u8)>,
}

impl SaltedCipher {
    /// Build a cipher from a passphrase, an optional IV and options.
    ///
    /// Without a fixed key size the passphrase must be 16, 24 or 32 bytes
    /// long and selects AES-128, -192 or -256.
    pub fn new(passphrase: &str, iv: Option<&str>, options: EncryptionOptions) -> Result<Self> {
        let iv = iv.map(|iv| iv.as_bytes().to_vec()).unwrap_or_default();

        let key_size = match options.fixed_key_size() {
            Some(size) => size,
            None => KeySize::from_byte_len(passphrase.len()).ok_or_else(|| {
                SaltcryptError::with_kind(
                    ErrorCategory::User,
                    ErrorKind::UnsupportedPassphraseLength,
                    format!(
                        "passphrase must be 16, 24 or 32 bytes long, got {} bytes",
                        passphrase.len()
                    ),
                )
            })?,
        };

        let salt_range = if options.use_salt() {
            let max = u8::try_from(options.max_salt_length()).map_err(|_| {
                SaltcryptError::with_kind(
                    ErrorCategory::User,
                    ErrorKind::InvalidSaltLength,
                    format!(
                        "maximum salt length must not exceed {} bytes, got {}",
                        MAX_SALT_LEN,
                        options.max_salt_length()
                    ),
                )
            })?;
            // use_salt() guarantees min <= max.
            Some((options.min_salt_length() as u8, max))
        } else {
            None
        };

        let key = kdf::derive_key(
            passphrase,
            options.password_hash(),
            options.password_hash_salt(),
            options.password_hash_iterations(),
            key_size,
        )?;

        let engine = Engine::new(key, iv, options.padding_mode())?;

        tracing::debug!(
            key_size = %engine.key_size(),
            mode = ?engine.mode(),
            padding = %engine.padding(),
            password_hash = %options.password_hash(),
            salted = salt_range.is_some(),
            "cipher ready"
        );

        Ok(Self {
            engine,
            options,
            salt_range,
        })
    }

    /// Build a cipher with [`EncryptionOptions::default`].
    pub fn with_defaults(passphrase: &str, iv: Option<&str>) -> Result<Self> {
        Self::new(passphrase, iv, EncryptionOptions::default())
    }

    pub fn mode(&self) -> CipherMode {
        self.engine.mode()
    }

    /// Size of the key actually in use, which follows the key bytes.
    pub fn key_size(&self) -> KeySize {
        self.engine.key_size()
    }

    pub fn options(&self) -> &EncryptionOptions {
        &self.options
    }

    pub fn use_salt(&self) -> bool {
        self.salt_range.is_some()
    }

    /// Encrypt bytes, prepending a fresh salt when salting is on.
    pub fn encrypt_bytes(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        match self.salt_range {
            Some((min, max)) => self.seal_salted(&salt::generate_salt(min, max), plaintext),
            None => self.engine.encrypt(plaintext),
        }
    }

    /// Encrypt with a caller-provided salt buffer.
    ///
    /// The salt length is packed into the first four bytes of `salt` before
    /// it is prepended, so `salt` must be 4 to 255 bytes long.
    ///
    /// This function is ONLY for producing reproducible test vectors.
    /// NEVER use this in production - always use `encrypt_bytes()`, which
    /// draws a random salt.
    pub fn encrypt_with_salt(&self, salt: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        if !(SALT_HEADER_LEN..=MAX_SALT_LEN).contains(&salt.len()) {
            return Err(SaltcryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidSaltLength,
                format!(
                    "salt must be {} to {} bytes, got {}",
                    SALT_HEADER_LEN,
                    MAX_SALT_LEN,
                    salt.len()
                ),
            ));
        }
        let mut header = salt.to_vec();
        let len = header.len() as u8;
        salt::pack_length(&mut header, len);
        self.seal_salted(&header, plaintext)
    }

    fn seal_salted(&self, salt: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut salted = Zeroizing::new(Vec::<u8>::with_capacity(salt.len() + plaintext.len()));
        salted.extend_from_slice(salt);
        salted.extend_from_slice(plaintext);
        self.engine.encrypt(&salted)
    }

    /// UTF-8 encode `plaintext` and encrypt it.
    pub fn encrypt_string(&self, plaintext: &str) -> Result<Vec<u8>> {
        self.encrypt_bytes(plaintext.as_bytes())
    }

    /// Encrypt bytes and return the ciphertext as base64.
    pub fn encrypt_to_base64(&self, plaintext: &[u8]) -> Result<String> {
        Ok(encoding::to_base64(&self.encrypt_bytes(plaintext)?))
    }

    /// Encrypt a string and return the ciphertext as base64.
    pub fn encrypt_string_to_base64(&self, plaintext: &str) -> Result<String> {
        self.encrypt_to_base64(plaintext.as_bytes())
    }

    /// Decrypt bytes and strip the salt when salting is on.
    pub fn decrypt_bytes(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let decrypted = self.engine.decrypt(ciphertext).inspect_err(|e| {
            tracing::debug!(len = ciphertext.len(), error = %e, "decryption failed");
        })?;

        if !self.use_salt() {
            return Ok(decrypted.to_vec());
        }

        if decrypted.len() < SALT_HEADER_LEN {
            return Err(malformed(format!(
                "decrypted data is {} bytes, too short to hold a salt header",
                decrypted.len()
            )));
        }

        let salt_len = usize::from(salt::unpack_length(&decrypted));
        if salt_len > decrypted.len() {
            return Err(malformed(format!(
                "salt length {} exceeds decrypted length {}",
                salt_len,
                decrypted.len()
            )));
        }

        Ok(decrypted[salt_len..].to_vec())
    }

    /// Decode base64 ciphertext and decrypt it.
    pub fn decrypt_base64(&self, ciphertext: &str) -> Result<Vec<u8>> {
        self.decrypt_bytes(&encoding::from_base64(ciphertext)?)
    }

    /// Decrypt bytes into a UTF-8 string.
    pub fn decrypt_to_string(&self, ciphertext: &[u8]) -> Result<String> {
        encoding::to_utf8(self.decrypt_bytes(ciphertext)?)
    }

    /// Decode base64 ciphertext and decrypt it into a UTF-8 string.
    pub fn decrypt_base64_to_string(&self, ciphertext: &str) -> Result<String> {
        encoding::to_utf8(self.decrypt_base64(ciphertext)?)
    }
}

fn malformed(msg: String) -> SaltcryptError {
    SaltcryptError::with_kind(ErrorCategory::User, ErrorKind::MalformedCiphertext, msg)
}
