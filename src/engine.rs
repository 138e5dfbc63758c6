//! AES block transforms
//!
//! An [`Engine`] holds the immutable key, IV, mode and padding of a cipher
//! and builds a fresh ECB or CBC transform for every call, so it can be
//! shared between threads without a lock.

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::{AnsiX923, Iso10126, NoPadding, Pkcs7, ZeroPadding};
use cbc::cipher::crypto_common::InnerInit;
use cbc::cipher::{
    BlockCipher, BlockDecrypt, BlockDecryptMut, BlockEncrypt, BlockEncryptMut, InnerIvInit,
    KeyInit,
};
use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, Result, SaltcryptError};
use crate::options::{KeySize, PaddingMode};

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Block chaining mode, selected by the presence of an IV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherMode {
    Ecb,
    Cbc,
}

pub struct Engine {
    key: Zeroizing<Vec<u8>>,
    iv: Vec<u8>,
    key_size: KeySize,
    mode: CipherMode,
    padding: PaddingMode,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("key_size", &self.key_size)
            .field("mode", &self.mode)
            .field("padding", &self.padding)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Bind a key and IV to a transform. An empty IV selects ECB, any other
    /// IV selects CBC and must be exactly one block long.
    pub fn new(key: Zeroizing<Vec<u8>>, iv: Vec<u8>, padding: PaddingMode) -> Result<Self> {
        let key_size = KeySize::from_byte_len(key.len()).ok_or_else(|| {
            SaltcryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::CipherInitFailed,
                format!(
                    "AES key must be 16, 24 or 32 bytes, got {} bytes",
                    key.len()
                ),
            )
        })?;

        let mode = if iv.is_empty() {
            CipherMode::Ecb
        } else {
            CipherMode::Cbc
        };

        if mode == CipherMode::Cbc && iv.len() != BLOCK_SIZE {
            return Err(SaltcryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::CipherInitFailed,
                format!(
                    "initialization vector must be {} bytes, got {} bytes",
                    BLOCK_SIZE,
                    iv.len()
                ),
            ));
        }

        Ok(Self {
            key,
            iv,
            key_size,
            mode,
            padding,
        })
    }

    pub fn key_size(&self) -> KeySize {
        self.key_size
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    pub fn padding(&self) -> PaddingMode {
        self.padding
    }

    /// Encrypt `plaintext` in one shot, padding the final block.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        match self.key_size {
            KeySize::Aes128 => self.encrypt_with::<Aes128>(plaintext),
            KeySize::Aes192 => self.encrypt_with::<Aes192>(plaintext),
            KeySize::Aes256 => self.encrypt_with::<Aes256>(plaintext),
        }
    }

    /// Decrypt `ciphertext` in one shot and strip the padding.
    ///
    /// The returned vector holds only the bytes the transform produced.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        match self.key_size {
            KeySize::Aes128 => self.decrypt_with::<Aes128>(ciphertext),
            KeySize::Aes192 => self.decrypt_with::<Aes192>(ciphertext),
            KeySize::Aes256 => self.decrypt_with::<Aes256>(ciphertext),
        }
    }

    fn block_cipher<C: KeyInit>(&self) -> Result<C> {
        C::new_from_slice(&self.key).map_err(|_| {
            SaltcryptError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::CipherInitFailed,
                "AES key schedule rejected the key",
            )
        })
    }

    fn encrypt_with<C>(&self, plaintext: &[u8]) -> Result<Vec<u8>>
    where
        C: BlockCipher + BlockEncrypt + KeyInit,
    {
        let cipher = self.block_cipher::<C>()?;
        match self.mode {
            CipherMode::Ecb => {
                seal(ecb::Encryptor::<C>::inner_init(cipher), self.padding, plaintext)
            }
            CipherMode::Cbc => {
                let enc = cbc::Encryptor::<C>::inner_iv_slice_init(cipher, &self.iv)
                    .map_err(iv_error)?;
                seal(enc, self.padding, plaintext)
            }
        }
    }

    fn decrypt_with<C>(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>>
    where
        C: BlockCipher + BlockDecrypt + KeyInit,
    {
        let cipher = self.block_cipher::<C>()?;
        match self.mode {
            CipherMode::Ecb => {
                open(ecb::Decryptor::<C>::inner_init(cipher), self.padding, ciphertext)
            }
            CipherMode::Cbc => {
                let dec = cbc::Decryptor::<C>::inner_iv_slice_init(cipher, &self.iv)
                    .map_err(iv_error)?;
                open(dec, self.padding, ciphertext)
            }
        }
    }
}

fn iv_error(_: cbc::cipher::InvalidLength) -> SaltcryptError {
    SaltcryptError::with_kind(
        ErrorCategory::User,
        ErrorKind::CipherInitFailed,
        "initialization vector rejected by CBC mode",
    )
}

fn seal<E: BlockEncryptMut>(enc: E, padding: PaddingMode, msg: &[u8]) -> Result<Vec<u8>> {
    let mut out = vec![0u8; msg.len() + BLOCK_SIZE];
    let written = match padding {
        PaddingMode::None => enc.encrypt_padded_b2b_mut::<NoPadding>(msg, &mut out),
        PaddingMode::Pkcs7 => enc.encrypt_padded_b2b_mut::<Pkcs7>(msg, &mut out),
        PaddingMode::Zeros => enc.encrypt_padded_b2b_mut::<ZeroPadding>(msg, &mut out),
        PaddingMode::AnsiX923 => enc.encrypt_padded_b2b_mut::<AnsiX923>(msg, &mut out),
        PaddingMode::Iso10126 => enc.encrypt_padded_b2b_mut::<Iso10126>(msg, &mut out),
    }
    .map(<[u8]>::len)
    .map_err(|_| {
        SaltcryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::EncryptionFailed,
            format!("cannot encrypt {} bytes with {} padding", msg.len(), padding),
        )
    })?;

    out.truncate(written);
    tracing::trace!(input = msg.len(), output = written, "encrypted");
    Ok(out)
}

fn open<D: BlockDecryptMut>(
    dec: D,
    padding: PaddingMode,
    msg: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let mut out = Zeroizing::new(vec![0u8; msg.len()]);
    let written = match padding {
        PaddingMode::None => dec.decrypt_padded_b2b_mut::<NoPadding>(msg, &mut out),
        PaddingMode::Pkcs7 => dec.decrypt_padded_b2b_mut::<Pkcs7>(msg, &mut out),
        PaddingMode::Zeros => dec.decrypt_padded_b2b_mut::<ZeroPadding>(msg, &mut out),
        PaddingMode::AnsiX923 => dec.decrypt_padded_b2b_mut::<AnsiX923>(msg, &mut out),
        PaddingMode::Iso10126 => dec.decrypt_padded_b2b_mut::<Iso10126>(msg, &mut out),
    }
    .map(<[u8]>::len)
    .map_err(|_| {
        SaltcryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::DecryptionFailed,
            "decryption failed: wrong key, corrupt input, or padding mismatch",
        )
    })?;

    out.truncate(written);
    tracing::trace!(input = msg.len(), output = written, "decrypted");
    Ok(out)
}
