//! High-level operations used by the command line
//!
//! These tie a [`PassphraseReader`] and the account file to the token
//! functions in [`crate::tokencrypt`], adding context to errors.

use std::path::Path;

use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, OtpcryptError, Result};
use crate::passphrase::PassphraseReader;
use crate::store;
use crate::tokencrypt;

/// Encrypt `plain_token` with a passphrase from `passphrase_reader`.
///
/// When `confirm_reader` is given the passphrase is read a second time
/// from it and both must match, so a typo cannot lock the token away.
pub fn encrypt(
    plain_token: &str,
    passphrase_reader: &mut dyn PassphraseReader,
    confirm_reader: Option<&mut dyn PassphraseReader>,
) -> Result<String> {
    let passphrase = passphrase_reader.read_passphrase()?;
    if let Some(confirm_reader) = confirm_reader {
        let confirmation = confirm_reader.read_passphrase()?;
        if *confirmation != *passphrase {
            return Err(OtpcryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::PassphraseMismatch,
                "passphrases do not match",
            ));
        }
    }

    tokencrypt::encrypt_token(&passphrase, plain_token)
        .map_err(|e| e.with_context("encryption failed"))
}

/// Decrypt an encoded token with a passphrase from `passphrase_reader`.
pub fn decrypt(
    encoded_token: &str,
    passphrase_reader: &mut dyn PassphraseReader,
) -> Result<Zeroizing<String>> {
    let passphrase = passphrase_reader.read_passphrase()?;
    tokencrypt::decrypt_token(&passphrase, encoded_token).map_err(decrypt_context)
}

/// Look up `account_name` in the account file and decrypt its token.
pub fn lookup(
    account_name: &str,
    accounts_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
) -> Result<Zeroizing<String>> {
    let encoded = store::find_encoded_token(account_name, accounts_path)?.ok_or_else(|| {
        OtpcryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::AccountNotFound,
            format!(
                "account {} not found in {}",
                account_name,
                accounts_path.display()
            ),
        )
    })?;

    let passphrase = passphrase_reader.read_passphrase()?;
    tokencrypt::decrypt_token(&passphrase, &encoded)
        .map_err(decrypt_context)
        .map_err(|e| e.with_context(format!("failed to decrypt token for {}", account_name)))
}

// A wrong passphrase is reported as such; anything else is a damaged token.
fn decrypt_context(err: OtpcryptError) -> OtpcryptError {
    if err.is_wrong_password() {
        err
    } else {
        err.with_context("stored token is corrupt or not an otpcrypt token")
    }
}
