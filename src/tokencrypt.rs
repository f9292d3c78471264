//! Token encryption/decryption using PBKDF2-SHA512 + AES-256-CTR
//!
//! An encoded token is the base64 of:
//! - salt: 16 bytes
//! - iv: 16 bytes
//! - ciphertext: exactly as long as the token
//!
//! There is no authentication tag. A wrong passphrase is detected by
//! checking that the decrypted bytes look like a token (printable ASCII).
//! That check is a heuristic: the longer the token the more reliable it
//! is, and an empty token decrypts "successfully" under any passphrase.

use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, OtpcryptError, Result};
use crate::frame;
use crate::kdf;
use crate::params::{Iv, Salt};
use crate::random;
use crate::stream;

/// Encrypt `plain_token` under `password` with a fresh random salt and IV.
///
/// Returns the base64 encoded frame. Every intermediate buffer (key,
/// ciphertext, frame) is wiped before this returns, on success or error.
pub fn encrypt_token(password: &[u8], plain_token: &str) -> Result<String> {
    let salt = random::new_salt();
    let iv = random::new_iv();

    encrypt_token_deterministic(password, plain_token, &salt, &iv)
}

/// Encrypt `plain_token` with the provided salt and IV.
///
/// This function is ONLY for testing purposes to generate deterministic output.
/// NEVER use this in production - reusing a salt/IV pair under the same
/// passphrase reuses the keystream. Use [`encrypt_token`].
pub fn encrypt_token_deterministic(
    password: &[u8],
    plain_token: &str,
    salt: &Salt,
    iv: &Iv,
) -> Result<String> {
    if !is_plausible_token(plain_token.as_bytes()) {
        return Err(OtpcryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::UnsupportedToken,
            "token must consist of printable ASCII characters",
        ));
    }

    let ciphertext = {
        let key = kdf::derive(password, salt)?;
        stream::encrypt(key.as_slice(), iv, plain_token.as_bytes())?
    };
    let frame = frame::pack(salt, iv, ciphertext.as_slice())?;
    let encoded = frame::encode(frame.as_slice());

    debug!(
        token_len = plain_token.len(),
        frame_len = frame.len(),
        "token encrypted"
    );
    Ok(encoded)
}

/// Decrypt an encoded token produced by [`encrypt_token`].
///
/// Fails with [`ErrorKind::Encoding`] or [`ErrorKind::MalformedFrame`] for
/// input that is not a token at all, and [`ErrorKind::WrongPassword`] when
/// the decrypted bytes do not look like a token. The garbage plaintext of
/// a failed attempt is wiped, never returned.
pub fn decrypt_token(password: &[u8], encoded_token: &str) -> Result<Zeroizing<String>> {
    let frame = {
        let raw = frame::decode(encoded_token)?;
        frame::unpack(raw.as_slice())?
    };

    let plaintext = {
        let key = kdf::derive(password, &frame.salt)?;
        stream::decrypt(key.as_slice(), &frame.iv, frame.ciphertext.as_slice())?
    };

    if !is_plausible_token(plaintext.as_slice()) {
        debug!(
            token_len = plaintext.len(),
            "decrypted bytes are not printable; rejecting"
        );
        return Err(OtpcryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::WrongPassword,
            "decryption failed (wrong password)",
        ));
    }

    let token = std::str::from_utf8(plaintext.as_slice()).map_err(|e| {
        OtpcryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::InternalInvariant,
            "printable ASCII was not valid UTF-8",
            e,
        )
    })?;

    debug!(token_len = token.len(), "token decrypted");
    Ok(Zeroizing::new(token.to_owned()))
}

/// Whether `bytes` could be a stored token: printable ASCII, space or tab.
pub fn is_plausible_token(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .all(|&b| b == b'\t' || (0x20..=0x7e).contains(&b))
}
