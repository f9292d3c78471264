//! Where passphrases come from
//!
//! The command line reads from the terminal without echo, or from stdin
//! with `--passphrase-stdin`; tests use a constant.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, OtpcryptError, Result};

pub trait PassphraseReader {
    /// Read a passphrase as raw bytes (not necessarily UTF-8), wiped on drop.
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>>;
}

/// Hands out the same passphrase on every call.
pub struct ConstantPassphraseReader {
    passphrase: Zeroizing<Vec<u8>>,
}

impl ConstantPassphraseReader {
    pub fn new(passphrase: impl Into<Vec<u8>>) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase.into()),
        }
    }
}

impl PassphraseReader for ConstantPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(self.passphrase.clone())
    }
}

/// Takes everything `R` yields as the passphrase.
///
/// A single trailing `\n` or `\r\n` is dropped so that
/// `echo secret | otpcrypt --passphrase-stdin ...` uses `secret`.
pub struct ReaderPassphraseReader<R> {
    reader: R,
}

impl<R: Read> ReaderPassphraseReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> PassphraseReader for ReaderPassphraseReader<R> {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let mut passphrase = Zeroizing::new(Vec::new());
        self.reader
            .read_to_end(&mut passphrase)
            .map_err(|e| io_failure("failed to read passphrase", e))?;
        strip_line_ending(&mut passphrase);
        Ok(passphrase)
    }
}

fn strip_line_ending(bytes: &mut Vec<u8>) {
    if bytes.ends_with(b"\r\n") {
        bytes.truncate(bytes.len() - 2);
    } else if bytes.ends_with(b"\n") {
        bytes.truncate(bytes.len() - 1);
    }
}

/// Prompts on the controlling terminal and reads without echo.
///
/// `rpassword` only returns UTF-8, so non-UTF-8 passphrases need
/// `--passphrase-stdin`.
pub struct TerminalPassphraseReader {
    prompt: &'static str,
}

impl TerminalPassphraseReader {
    pub fn new() -> Self {
        Self::with_prompt("Passphrase (otpcrypt): ")
    }

    pub fn with_prompt(prompt: &'static str) -> Self {
        Self { prompt }
    }
}

impl Default for TerminalPassphraseReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PassphraseReader for TerminalPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        if !io::stdin().is_terminal() {
            return Err(OtpcryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::PassphraseUnavailable,
                "stdin is not a terminal; pass --passphrase-stdin to read the passphrase from it",
            ));
        }

        let passphrase = rpassword::prompt_password(self.prompt).map_err(|e| {
            OtpcryptError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::PassphraseUnavailable,
                "failed to read passphrase from terminal",
                e,
            )
        })?;
        Ok(Zeroizing::new(passphrase.into_bytes()))
    }
}

fn io_failure(msg: &'static str, err: io::Error) -> OtpcryptError {
    OtpcryptError::with_kind_and_source(ErrorCategory::Internal, ErrorKind::Io, msg, err)
}
