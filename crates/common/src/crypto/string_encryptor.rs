//! Text encryption over a cipher backend.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::error::{CryptoError, CryptoResult};
use super::CipherBackend;
use crate::error::CommonError;

/// Encrypts and decrypts text values.
///
/// Implementations hold no per-value state; the same ciphertext always
/// decrypts to the same plaintext.
pub trait StringEncryptor: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> CryptoResult<String>;

    fn decrypt(&self, ciphertext: &str) -> CryptoResult<String>;
}

impl<T: StringEncryptor + ?Sized> StringEncryptor for Arc<T> {
    fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
        (**self).encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &str) -> CryptoResult<String> {
        (**self).decrypt(ciphertext)
    }
}

impl<T: StringEncryptor + ?Sized> StringEncryptor for Box<T> {
    fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
        (**self).encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &str) -> CryptoResult<String> {
        (**self).decrypt(ciphertext)
    }
}

/// Text encoding of ciphertext bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringOutputType {
    #[default]
    Base64,
    Hexadecimal,
}

impl StringOutputType {
    pub fn from_name(name: &str) -> CryptoResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "base64" => Ok(Self::Base64),
            "hexadecimal" | "hex" => Ok(Self::Hexadecimal),
            other => Err(CommonError::config(
                "string_output_type",
                format!("unknown output type '{}', expected base64 or hexadecimal", other),
            )
            .into()),
        }
    }

    pub fn encode(&self, bytes: &[u8]) -> String {
        match self {
            Self::Base64 => BASE64.encode(bytes),
            Self::Hexadecimal => hex::encode_upper(bytes),
        }
    }

    /// Decode text, ignoring embedded whitespace.
    pub fn decode(&self, text: &str) -> CryptoResult<Vec<u8>> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        match self {
            Self::Base64 => BASE64
                .decode(compact)
                .map_err(|e| CommonError::encoding("base64", e.to_string()).into()),
            Self::Hexadecimal => hex::decode(compact)
                .map_err(|e| CommonError::encoding("hex", e.to_string()).into()),
        }
    }
}

/// [`StringEncryptor`] over any [`CipherBackend`].
///
/// Plaintext is UTF-8 encoded before encryption; ciphertext bytes are
/// rendered with the configured [`StringOutputType`].
pub struct CipherStringEncryptor {
    backend: Box<dyn CipherBackend>,
    output: StringOutputType,
}

impl fmt::Debug for CipherStringEncryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherStringEncryptor")
            .field("algorithm", &self.backend.algorithm())
            .field("output", &self.output)
            .finish()
    }
}

impl CipherStringEncryptor {
    pub fn new(backend: impl CipherBackend + 'static, output: StringOutputType) -> Self {
        Self { backend: Box::new(backend), output }
    }

    pub fn base64(backend: impl CipherBackend + 'static) -> Self {
        Self::new(backend, StringOutputType::Base64)
    }

    pub fn algorithm(&self) -> &str {
        self.backend.algorithm()
    }

    pub fn output_type(&self) -> StringOutputType {
        self.output
    }
}

impl StringEncryptor for CipherStringEncryptor {
    fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
        let ciphertext = self.backend.encrypt(plaintext.as_bytes())?;
        Ok(self.output.encode(&ciphertext))
    }

    fn decrypt(&self, ciphertext: &str) -> CryptoResult<String> {
        let bytes = self.output.decode(ciphertext)?;
        let plaintext = self.backend.decrypt(&bytes)?;
        String::from_utf8(plaintext).map_err(|_| {
            CryptoError::Decryption("plaintext is not valid UTF-8 (wrong key?)".to_string())
        })
    }
}
