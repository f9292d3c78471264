//! AES-256-CTR keystream encryption
//!
//! The IV is the initial 128-bit counter block, incremented big-endian
//! across the whole block. No padding and no tag: output length always
//! equals input length, and tampered ciphertext decrypts to garbage
//! instead of failing.

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};

use crate::error::{ErrorCategory, ErrorKind, OtpcryptError, Result};
use crate::params::Iv;
use crate::secmem::SecureBuf;

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

pub fn encrypt(key: &[u8], iv: &Iv, plaintext: &[u8]) -> Result<SecureBuf> {
    apply_keystream(key, iv, plaintext)
}

pub fn decrypt(key: &[u8], iv: &Iv, ciphertext: &[u8]) -> Result<SecureBuf> {
    apply_keystream(key, iv, ciphertext)
}

fn apply_keystream(key: &[u8], iv: &Iv, input: &[u8]) -> Result<SecureBuf> {
    let mut cipher = Aes256Ctr::new_from_slices(key, iv).map_err(|_| {
        OtpcryptError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::InternalInvariant,
            format!("AES-256-CTR rejected a {} byte key", key.len()),
        )
    })?;

    let mut out = SecureBuf::from_slice(input)?;
    cipher
        .try_apply_keystream(out.as_mut_slice())
        .map_err(|e| {
            OtpcryptError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::InternalInvariant,
                format!("keystream exhausted: {}", e),
            )
        })?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    // NIST SP 800-38A F.5.5 CTR-AES256.Encrypt, first two blocks.
    const NIST_KEY: [u8; 32] = [
        0x60, 0x3d, 0xeb, 0x10, 0x15, 0xca, 0x71, 0xbe, 0x2b, 0x73, 0xae, 0xf0, 0x85, 0x7d, 0x77,
        0x81, 0x1f, 0x35, 0x2c, 0x07, 0x3b, 0x61, 0x08, 0xd7, 0x2d, 0x98, 0x10, 0xa3, 0x09, 0x14,
        0xdf, 0xf4,
    ];
    const NIST_IV: Iv = [
        0xf0, 0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8, 0xf9, 0xfa, 0xfb, 0xfc, 0xfd, 0xfe,
        0xff,
    ];

    #[test]
    fn test_nist_vector() {
        #[rustfmt::skip]
        let plaintext = [
            0x6b, 0xc1, 0xbe, 0xe2, 0x2e, 0x40, 0x9f, 0x96, 0xe9, 0x3d, 0x7e, 0x11, 0x73, 0x93, 0x17, 0x2a,
            0xae, 0x2d, 0x8a, 0x57, 0x1e, 0x03, 0xac, 0x9c, 0x9e, 0xb7, 0x6f, 0xac, 0x45, 0xaf, 0x8e, 0x51,
        ];
        #[rustfmt::skip]
        let expected = [
            0x60, 0x1e, 0xc3, 0x13, 0x77, 0x57, 0x89, 0xa5, 0xb7, 0xa7, 0xf5, 0x04, 0xbb, 0xf3, 0xd2, 0x28,
            0xf4, 0x43, 0xe3, 0xca, 0x4d, 0x62, 0xb5, 0x9a, 0xca, 0x84, 0xe9, 0x90, 0xca, 0xca, 0xf5, 0xc5,
        ];

        let ciphertext = encrypt(&NIST_KEY, &NIST_IV, &plaintext).unwrap();
        assert_eq!(ciphertext.as_slice(), &expected[..]);

        let decrypted = decrypt(&NIST_KEY, &NIST_IV, ciphertext.as_slice()).unwrap();
        assert_eq!(decrypted.as_slice(), &plaintext[..]);
    }

    #[test]
    fn test_length_preserved() {
        for len in [0usize, 1, 5, 15, 16, 17, 100] {
            let input = vec![0x5au8; len];
            let out = encrypt(&NIST_KEY, &NIST_IV, &input).unwrap();
            assert_eq!(out.len(), len);
        }
    }

    #[test]
    fn test_bit_flip_is_malleable() {
        let ciphertext = encrypt(&NIST_KEY, &NIST_IV, b"JBSWY3DP").unwrap();
        let mut tampered = ciphertext.as_slice().to_vec();
        tampered[0] ^= 0x80;

        let decrypted = decrypt(&NIST_KEY, &NIST_IV, &tampered).unwrap();
        assert_eq!(decrypted.as_slice()[0], b'J' ^ 0x80);
        assert_eq!(&decrypted.as_slice()[1..], b"BSWY3DP");
    }

    #[test]
    fn test_short_key_rejected() {
        let err = encrypt(&[0u8; 16], &NIST_IV, b"x").expect_err("expected key length error");
        assert_eq!(err.kind, Some(ErrorKind::InternalInvariant));
    }
}
