//! Salt and IV generation strategies for password-based encryption.
//!
//! Strategies are selected by name from configuration:
//!
//! | Name | Salt | IV |
//! |------|------|----|
//! | `random` | OS randomness | OS randomness |
//! | `zero` | all-zero bytes | all-zero bytes |
//! | `none` | - | all-zero bytes |
//! | `fixed:<text>` | UTF-8 bytes of `<text>` | - |
//!
//! The generated salt and IV are always written into the ciphertext header,
//! so decryption never depends on the generator.

use rand::rngs::OsRng;
use rand::RngCore;

use super::error::{CryptoError, CryptoResult};

/// Salt generation strategy
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaltGenerator {
    #[default]
    Random,
    Zero,
    Fixed(Vec<u8>),
}

impl SaltGenerator {
    /// Parse a configured generator name.
    pub fn from_name(name: &str) -> CryptoResult<Self> {
        let trimmed = name.trim();
        if let Some(fixed) = trimmed.strip_prefix("fixed:") {
            if fixed.is_empty() {
                return Err(CryptoError::UnsupportedAlgorithm(
                    "fixed salt generator requires a non-empty salt".to_string(),
                ));
            }
            return Ok(Self::Fixed(fixed.as_bytes().to_vec()));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "zero" => Ok(Self::Zero),
            other => Err(CryptoError::UnsupportedAlgorithm(format!("salt generator '{}'", other))),
        }
    }

    /// Produce `len` salt bytes. A fixed salt is returned as configured,
    /// whatever its length.
    pub fn generate(&self, len: usize) -> Vec<u8> {
        match self {
            Self::Random => random_bytes(len),
            Self::Zero => vec![0u8; len],
            Self::Fixed(salt) => salt.clone(),
        }
    }
}

/// IV generation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IvGenerator {
    #[default]
    Random,
    /// Constant all-zero IV. Deterministic output; only for compatibility.
    None,
}

impl IvGenerator {
    pub fn from_name(name: &str) -> CryptoResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "none" | "zero" => Ok(Self::None),
            other => Err(CryptoError::UnsupportedAlgorithm(format!("IV generator '{}'", other))),
        }
    }

    pub fn generate(&self, len: usize) -> Vec<u8> {
        match self {
            Self::Random => random_bytes(len),
            Self::None => vec![0u8; len],
        }
    }
}

/// Fill a fresh buffer from the OS random source.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}
