//! Salt and IV generation from the OS CSPRNG

use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::params::{BLOCK_LEN, Iv, SALT_LEN, Salt};

/// Fill `buf` with cryptographically secure random bytes.
///
/// There is no error path: if the OS entropy source fails, `OsRng` panics
/// and there is nothing sensible to recover into.
pub fn fill_random(buf: &mut [u8]) {
    OsRng.fill_bytes(buf);
}

/// Fresh PBKDF2 salt
pub fn new_salt() -> Zeroizing<Salt> {
    let mut salt = Zeroizing::new([0u8; SALT_LEN]);
    fill_random(&mut salt[..]);
    salt
}

/// Fresh CTR IV
pub fn new_iv() -> Zeroizing<Iv> {
    let mut iv = Zeroizing::new([0u8; BLOCK_LEN]);
    fill_random(&mut iv[..]);
    iv
}
