//! Passphrase reading functionality

use crate::error::{ErrorCategory, ErrorKind, Result, SaltcryptError};
use std::io::{self, IsTerminal, Read, Write};
use zeroize::Zeroizing;

/// Trait for reading passphrases from various sources
pub trait PassphraseReader {
    /// Read a UTF-8 passphrase.
    ///
    /// Returns the passphrase wrapped in `Zeroizing` to ensure it is securely
    /// wiped from memory when dropped.
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>>;
}

/// Returns a fixed passphrase (for testing)
pub struct ConstantPassphraseReader {
    passphrase: Zeroizing<String>,
}

impl ConstantPassphraseReader {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase.into()),
        }
    }
}

impl PassphraseReader for ConstantPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>> {
        Ok(self.passphrase.clone())
    }
}

/// Reads passphrase from any io::Read source
///
/// A single trailing `\n` (or `\r\n`) is removed, so that
/// `echo secret | saltcrypt --passphrase-stdin ...` works as expected.
pub struct ReaderPassphraseReader {
    reader: Box<dyn Read>,
}

impl ReaderPassphraseReader {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self { reader }
    }
}

impl PassphraseReader for ReaderPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>> {
        let mut data = Zeroizing::new(Vec::new());
        self.reader.read_to_end(&mut data).map_err(|e| {
            SaltcryptError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("error reading passphrase: {}", e),
                e,
            )
        })?;

        if data.last() == Some(&b'\n') {
            data.pop();
            if data.last() == Some(&b'\r') {
                data.pop();
            }
        }

        let text = std::str::from_utf8(&data).map_err(|e| {
            SaltcryptError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::InvalidUtf8,
                "passphrase is not valid UTF-8",
                e,
            )
        })?;
        Ok(Zeroizing::new(text.to_owned()))
    }
}

/// Reads passphrase from terminal with no echo
pub struct TerminalPassphraseReader;

impl TerminalPassphraseReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalPassphraseReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PassphraseReader for TerminalPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>> {
        if !io::stdin().is_terminal() {
            return Err(SaltcryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::PassphraseUnavailable,
                "cannot read passphrase from terminal - stdin is not a terminal",
            ));
        }

        io::stderr()
            .write_all(b"Passphrase (saltcrypt): ")
            .and_then(|_| io::stderr().flush())
            .map_err(|e| {
                SaltcryptError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    format!("failed to write prompt: {}", e),
                    e,
                )
            })?;

        // Read password *without echo*
        let passphrase = rpassword::read_password().map_err(|e| {
            SaltcryptError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::PassphraseUnavailable,
                format!("failure reading passphrase: {}", e),
                e,
            )
        })?;

        Ok(Zeroizing::new(passphrase))
    }
}
