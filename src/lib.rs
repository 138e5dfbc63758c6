//! Saltcrypt - passphrase-based AES encryption with a self-describing salt
//!
//! ```no_run
//! use saltcrypt::{EncryptionOptions, SaltedCipher};
//!
//! # fn main() -> saltcrypt::Result<()> {
//! let options = EncryptionOptions::builder().salt_length(4, 16).build()?;
//! let cipher = SaltedCipher::new("0123456789ABCDEF", Some("ABCDEFGHIJKLMNOP"), options)?;
//!
//! let text = cipher.encrypt_string_to_base64("hello")?;
//! assert_eq!(cipher.decrypt_base64_to_string(&text)?, "hello");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod encoding;
pub mod engine;
pub mod error;
pub mod file_ops;
pub mod kdf;
pub mod options;
pub mod passphrase;
pub mod salt;
pub mod salted;

pub use engine::CipherMode;
pub use error::{ErrorCategory, ErrorKind, Result, SaltcryptError};
pub use options::{EncryptionOptions, EncryptionOptionsBuilder, KeySize, PaddingMode, PasswordHash};
pub use salted::SaltedCipher;
