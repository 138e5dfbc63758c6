//! Passphrase to key derivation
//!
//! `PasswordHash::None` uses the passphrase bytes as the key; every other
//! variant runs PBKDF2-HMAC over its digest, looked up in a function table.

use hmac::Hmac;
use hmac::digest::InvalidLength;
use md5::Md5;
use pbkdf2::pbkdf2;
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, Result, SaltcryptError};
use crate::options::{KeySize, PasswordHash};

type DeriveFn = fn(&[u8], &[u8], u32, &mut [u8]) -> std::result::Result<(), InvalidLength>;

fn derive_fn(hash: PasswordHash) -> Option<DeriveFn> {
    match hash {
        PasswordHash::None => None,
        PasswordHash::Md5 => Some(pbkdf2::<Hmac<Md5>>),
        PasswordHash::Sha1 => Some(pbkdf2::<Hmac<Sha1>>),
        PasswordHash::Sha256 => Some(pbkdf2::<Hmac<Sha256>>),
        PasswordHash::Sha384 => Some(pbkdf2::<Hmac<Sha384>>),
        PasswordHash::Sha512 => Some(pbkdf2::<Hmac<Sha512>>),
    }
}

/// Derive the AES key for `passphrase`.
///
/// With `PasswordHash::None` the UTF-8 passphrase is returned unchanged,
/// whatever its length; the cipher engine decides whether it is usable.
/// Otherwise exactly `key_size.bytes()` bytes are produced.
pub fn derive_key(
    passphrase: &str,
    hash: PasswordHash,
    salt: &str,
    iterations: u32,
    key_size: KeySize,
) -> Result<Zeroizing<Vec<u8>>> {
    let Some(derive) = derive_fn(hash) else {
        return Ok(Zeroizing::new(passphrase.as_bytes().to_vec()));
    };

    if iterations == 0 {
        return Err(SaltcryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::KeyDerivationFailed,
            "password hash iterations must be at least 1",
        ));
    }

    let mut key = Zeroizing::new(vec![0u8; key_size.bytes()]);
    derive(passphrase.as_bytes(), salt.as_bytes(), iterations, &mut key).map_err(|_| {
        SaltcryptError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::KeyDerivationFailed,
            format!("PBKDF2-HMAC-{} failed", hash.name().to_uppercase()),
        )
    })?;

    Ok(key)
}
