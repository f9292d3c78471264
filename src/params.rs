//! Fixed format parameters
//!
//! Both directions read these. Changing any of them makes previously
//! encrypted tokens undecryptable, so a change here needs a new format
//! version rather than an edit.

/// Length of the PBKDF2 salt in bytes
pub const SALT_LEN: usize = 16;

/// AES block length in bytes, which is also the CTR IV length
pub const BLOCK_LEN: usize = 16;

/// Length of the derived AES-256 key in bytes
pub const KEY_LEN: usize = 32;

/// PBKDF2 iteration count
pub const KDF_ITERATIONS: u32 = 50_000;

/// Hash used as the PBKDF2 PRF (via HMAC)
pub type KdfHash = sha2::Sha512;

/// Bytes in front of the ciphertext in every frame
pub const FRAME_HEADER_LEN: usize = SALT_LEN + BLOCK_LEN;

pub type Salt = [u8; SALT_LEN];

pub type Iv = [u8; BLOCK_LEN];
