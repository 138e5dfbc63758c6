//! File encryption/decryption operations
//!
//! Encrypted files hold the base64 text of the ciphertext. All output files
//! are replaced atomically and created with mode 0o600 on Unix systems.

use crate::encoding;
use crate::error::{ErrorCategory, ErrorKind, Result, SaltcryptError};
use crate::salted::SaltedCipher;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use zeroize::Zeroizing;

/// Encrypt a file
///
/// Reads plaintext from `input_path`, encrypts it with `cipher`, and writes
/// the base64 ciphertext to `output_path`.
pub fn encrypt_file(input_path: &Path, output_path: &Path, cipher: &SaltedCipher) -> Result<()> {
    let plaintext = Zeroizing::new(
        fs::read(input_path).map_err(|e| read_error(input_path, e))?,
    );
    let encoded = cipher
        .encrypt_to_base64(&plaintext)
        .map_err(|e| e.with_context("encryption failed"))?;
    write_file_atomic(output_path, encoded.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    tracing::info!(
        input = %input_path.display(),
        output = %output_path.display(),
        "encrypted file"
    );
    Ok(())
}

/// Decrypt a file
///
/// Reads base64 ciphertext from `input_path`, decrypts it with `cipher`, and
/// writes the plaintext to `output_path`.
pub fn decrypt_file(input_path: &Path, output_path: &Path, cipher: &SaltedCipher) -> Result<()> {
    let encoded_bytes = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let encoded = String::from_utf8(encoded_bytes).map_err(|e| {
        SaltcryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::InvalidUtf8,
            "input file is not base64 text",
            e,
        )
    })?;
    let ciphertext =
        encoding::from_base64(&encoded).map_err(|e| e.with_context("failed to decode input"))?;
    let plaintext = Zeroizing::new(
        cipher
            .decrypt_bytes(&ciphertext)
            .map_err(|e| e.with_context("failed to decrypt"))?,
    );
    write_file_atomic(output_path, &plaintext)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    tracing::info!(
        input = %input_path.display(),
        output = %output_path.display(),
        "decrypted file"
    );
    Ok(())
}

/// Replace `path` with `contents` (tempfile + fsync + rename).
///
/// Either the old file or the complete new file exists at `path`, never a
/// partial one.
fn write_file_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        SaltcryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to create tempfile in {}", dir.display()),
            e,
        )
    })?;

    temp_file.write_all(contents).map_err(|e| {
        SaltcryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to write to tempfile",
            e,
        )
    })?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file.flush().map_err(|e| {
        SaltcryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to flush tempfile",
            e,
        )
    })?;
    temp_file.as_file().sync_all().map_err(|e| {
        SaltcryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| {
                SaltcryptError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "failed to set tempfile permissions",
                    e,
                )
            })?;
    }

    temp_file.persist(path).map_err(|e| {
        SaltcryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to rename to target file {}", path.display()),
            e,
        )
    })?;
    Ok(())
}

fn read_error(path: &Path, err: io::Error) -> SaltcryptError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    SaltcryptError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}
