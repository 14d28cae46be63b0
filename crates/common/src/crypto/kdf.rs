//! PBKDF2 key derivation.

use pbkdf2::pbkdf2_hmac;
use sha2::{Sha256, Sha512};
use zeroize::Zeroizing;

use super::error::{CryptoError, CryptoResult};

/// HMAC digest used as the PBKDF2 pseudo-random function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfDigest {
    Sha256,
    Sha512,
}

impl KdfDigest {
    /// Parse a key-derivation algorithm name such as `PBKDF2WithHmacSHA256`.
    pub fn from_name(name: &str) -> CryptoResult<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "PBKDF2WITHHMACSHA256" | "PBKDF2-SHA256" => Ok(Self::Sha256),
            "PBKDF2WITHHMACSHA512" | "PBKDF2-SHA512" => Ok(Self::Sha512),
            _ => Err(CryptoError::UnsupportedAlgorithm(format!("key derivation '{}'", name))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "PBKDF2WithHmacSHA256",
            Self::Sha512 => "PBKDF2WithHmacSHA512",
        }
    }
}

/// Derive `key_len` bytes from `password` and `salt`.
///
/// # Errors
/// `iterations` must be positive.
pub fn derive_key(
    digest: KdfDigest,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    key_len: usize,
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    if iterations == 0 {
        return Err(CryptoError::Common(crate::error::CommonError::validation(
            "iterations",
            "key derivation requires at least one iteration",
        )));
    }

    let mut key = Zeroizing::new(vec![0u8; key_len]);
    match digest {
        KdfDigest::Sha256 => pbkdf2_hmac::<Sha256>(password, salt, iterations, key.as_mut_slice()),
        KdfDigest::Sha512 => pbkdf2_hmac::<Sha512>(password, salt, iterations, key.as_mut_slice()),
    }
    Ok(key)
}
