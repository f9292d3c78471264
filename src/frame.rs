//! Token framing and text encoding
//!
//! A frame is `salt(16) || iv(16) || ciphertext(N)` with no header, version
//! or length field; the ciphertext is whatever follows the first 32 bytes.
//! The stored form is the frame in standard base64 with `=` padding:
//! - Free of whitespace (including newlines)
//! - Safe to keep as one field of a space-separated line

use base64::{Engine, engine::general_purpose::STANDARD};
use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, OtpcryptError, Result};
use crate::params::{BLOCK_LEN, FRAME_HEADER_LEN, Iv, SALT_LEN, Salt};
use crate::secmem::SecureBuf;

/// A frame split into its named fields.
#[derive(Debug)]
pub struct Frame {
    pub salt: Zeroizing<Salt>,
    pub iv: Zeroizing<Iv>,
    pub ciphertext: SecureBuf,
}

/// Concatenate salt, IV and ciphertext into one frame.
pub fn pack(salt: &Salt, iv: &Iv, ciphertext: &[u8]) -> Result<SecureBuf> {
    let mut frame = SecureBuf::zeroed(FRAME_HEADER_LEN + ciphertext.len())?;
    let out = frame.as_mut_slice();
    out[..SALT_LEN].copy_from_slice(salt);
    out[SALT_LEN..FRAME_HEADER_LEN].copy_from_slice(iv);
    out[FRAME_HEADER_LEN..].copy_from_slice(ciphertext);
    Ok(frame)
}

/// Split a frame back into salt, IV and ciphertext.
pub fn unpack(frame: &[u8]) -> Result<Frame> {
    if frame.len() < FRAME_HEADER_LEN {
        return Err(OtpcryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedFrame,
            format!(
                "token too short: {} bytes, need at least {} for salt and IV",
                frame.len(),
                FRAME_HEADER_LEN
            ),
        ));
    }

    let (salt_bytes, rest) = frame.split_at(SALT_LEN);
    let (iv_bytes, ciphertext) = rest.split_at(BLOCK_LEN);

    let mut salt = Zeroizing::new([0u8; SALT_LEN]);
    salt.copy_from_slice(salt_bytes);
    let mut iv = Zeroizing::new([0u8; BLOCK_LEN]);
    iv.copy_from_slice(iv_bytes);

    Ok(Frame {
        salt,
        iv,
        ciphertext: SecureBuf::from_slice(ciphertext)?,
    })
}

/// Encode a frame as text.
pub fn encode(frame: &[u8]) -> String {
    STANDARD.encode(frame)
}

/// Decode text produced by [`encode`] back into frame bytes.
pub fn decode(text: &str) -> Result<SecureBuf> {
    let mut frame = SecureBuf::zeroed(base64::decoded_len_estimate(text.len()))?;
    let written = STANDARD
        .decode_slice(text.as_bytes(), frame.as_mut_slice())
        .map_err(|e| {
            OtpcryptError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::Encoding,
                "base64 decoding failed",
                e,
            )
        })?;
    frame.truncate(written);
    Ok(frame)
}
