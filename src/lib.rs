//! otpcrypt - Passphrase-based encryption of OTP seeds
//!
//! Tokens are encrypted with AES-256-CTR under a key derived from the
//! passphrase with PBKDF2-HMAC-SHA512, and stored as a single base64 string.

#![deny(unsafe_code)]

pub mod error;
pub mod frame;
pub mod kdf;
pub mod ops;
pub mod params;
pub mod passphrase;
pub mod random;
pub mod secmem;
pub mod store;
pub mod stream;
pub mod tokencrypt;

pub use error::{ErrorCategory, ErrorKind, OtpcryptError, Result};
pub use tokencrypt::{decrypt_token, encrypt_token};
