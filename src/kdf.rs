//! Key derivation: PBKDF2-HMAC-SHA512, 50 000 rounds, 32-byte key

use hmac::Hmac;
use pbkdf2::pbkdf2;

use crate::error::{ErrorCategory, ErrorKind, OtpcryptError, Result};
use crate::params::{KDF_ITERATIONS, KEY_LEN, KdfHash, Salt};
use crate::secmem::SecureBuf;

/// Derive the AES-256 key for `password` and `salt`.
///
/// The key is written straight into a locked buffer and is wiped when the
/// returned [`SecureBuf`] is dropped. Nothing is cached between calls.
pub fn derive(password: &[u8], salt: &Salt) -> Result<SecureBuf> {
    derive_with_rounds(password, salt, KDF_ITERATIONS)
}

pub(crate) fn derive_with_rounds(password: &[u8], salt: &Salt, rounds: u32) -> Result<SecureBuf> {
    if rounds == 0 {
        return Err(OtpcryptError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::KeyDerivation,
            "PBKDF2 round count must be positive",
        ));
    }

    let mut key = SecureBuf::zeroed(KEY_LEN)?;
    pbkdf2::<Hmac<KdfHash>>(password, salt, rounds, key.as_mut_slice()).map_err(|_| {
        OtpcryptError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::KeyDerivation,
            "PBKDF2 key derivation failed",
        )
    })?;

    Ok(key)
}
