//! Cipher backends and string encryptors.
//!
//! ## Layers
//!
//! - [`CipherBackend`]: raw byte encrypt/decrypt. Implementations:
//!   [`PbeCipher`] (password-based AES-CBC), [`RsaCipher`] (PKCS#1 v1.5) and
//!   [`GcmCipher`] (AES-GCM).
//! - [`StringEncryptor`]: text in, text out. [`CipherStringEncryptor`]
//!   adapts any backend with base64 or hex encoding at the boundary;
//!   [`PooledStringEncryptor`] spreads calls over several instances.
//!
//! ## Usage
//!
//! ```rust
//! use propcrypt_common::crypto::{CipherStringEncryptor, PbeCipher, StringEncryptor};
//! use propcrypt_common::SecureString;
//!
//! let cipher = PbeCipher::with_defaults(SecureString::new("masterkey"))?;
//! let encryptor = CipherStringEncryptor::base64(cipher);
//!
//! let ciphertext = encryptor.encrypt("hunter2")?;
//! assert_eq!(encryptor.decrypt(&ciphertext)?, "hunter2");
//! # Ok::<(), propcrypt_common::crypto::CryptoError>(())
//! ```

pub mod asymmetric;
pub mod error;
pub mod gcm;
pub mod generators;
pub mod kdf;
pub mod pbe;
pub mod pooled;
pub mod string_encryptor;

use std::sync::Arc;

pub use asymmetric::{KeyFormat, RsaCipher};
pub use error::{CryptoError, CryptoResult};
pub use gcm::{GcmCipher, GcmKeyConfig};
pub use generators::{IvGenerator, SaltGenerator};
pub use kdf::KdfDigest;
pub use pbe::{PbeAlgorithm, PbeCipher};
pub use pooled::PooledStringEncryptor;
pub use string_encryptor::{CipherStringEncryptor, StringEncryptor, StringOutputType};

/// Raw byte encryption with loaded key material.
///
/// Implementations own their key material and must be safe to share across
/// threads.
pub trait CipherBackend: Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>>;

    fn decrypt(&self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>>;

    /// Algorithm name for logs.
    fn algorithm(&self) -> &str;
}

impl<T: CipherBackend + ?Sized> CipherBackend for Arc<T> {
    fn encrypt(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        (**self).encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        (**self).decrypt(ciphertext)
    }

    fn algorithm(&self) -> &str {
        (**self).algorithm()
    }
}

impl<T: CipherBackend + ?Sized> CipherBackend for Box<T> {
    fn encrypt(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        (**self).encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        (**self).decrypt(ciphertext)
    }

    fn algorithm(&self) -> &str {
        (**self).algorithm()
    }
}
