//! AES-GCM authenticated encryption.
//!
//! Output is `IV (12 bytes) || ciphertext || tag (16 bytes)`. The key is
//! taken from, in order: an explicit key, an inline base64 string, a resource
//! location, or PBKDF2 over a password.
//!
//! Password derivation salts with the configured generator, which defaults to
//! all zeros. A constant salt gives no protection against precomputed
//! dictionaries; configure a `fixed:` salt per deployment where possible.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm, Nonce};
use once_cell::sync::OnceCell;
use tracing::{info, instrument, warn};

use super::error::{CryptoError, CryptoResult};
use super::generators::{random_bytes, SaltGenerator};
use super::kdf::{derive_key, KdfDigest};
use super::CipherBackend;
use crate::error::CommonError;
use crate::security::{InlineEncoding, KeyMaterial, KeyMaterialProvider, SecureString};

/// The only supported transformation name.
pub const GCM_ALGORITHM: &str = "AES/GCM/NoPadding";

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// Length of the key derived from a password, and of the default zero salt.
pub const DERIVED_KEY_LEN: usize = 32;

/// Where an AES-GCM key comes from.
#[derive(Debug, Clone)]
pub struct GcmKeyConfig {
    /// Explicit key, inline base64 string, or resource location.
    pub key: KeyMaterialProvider,
    pub password: Option<SecureString>,
    pub salt_generator: SaltGenerator,
    pub iterations: u32,
    pub kdf: KdfDigest,
}

impl Default for GcmKeyConfig {
    fn default() -> Self {
        Self {
            key: KeyMaterialProvider::new("secret key"),
            password: None,
            salt_generator: SaltGenerator::Zero,
            iterations: 1000,
            kdf: KdfDigest::Sha256,
        }
    }
}

impl GcmKeyConfig {
    pub fn from_key(key: KeyMaterial) -> Self {
        let key = KeyMaterialProvider::new("secret key").with_explicit(Some(key));
        Self { key, ..Self::default() }
    }

    pub fn from_password(password: SecureString) -> Self {
        Self { password: Some(password), ..Self::default() }
    }

    fn has_password(&self) -> bool {
        self.password.as_ref().is_some_and(|p| !p.is_empty())
    }
}

enum AesGcm {
    Aes128(Box<Aes128Gcm>),
    Aes256(Box<Aes256Gcm>),
}

/// AES-GCM cipher backend.
pub struct GcmCipher {
    config: GcmKeyConfig,
    /// First load outcome. A failed load is kept and never retried.
    cipher: OnceCell<CryptoResult<AesGcm>>,
}

impl fmt::Debug for GcmCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcmCipher")
            .field("key", &self.config.key)
            .field("password", &self.config.password.as_ref().map(|_| "[REDACTED]"))
            .field("salt_generator", &self.config.salt_generator)
            .field("iterations", &self.config.iterations)
            .field("kdf", &self.config.kdf)
            .field("loaded", &matches!(self.cipher.get(), Some(Ok(_))))
            .finish()
    }
}

impl GcmCipher {
    /// Create a cipher for `algorithm` (must be [`GCM_ALGORITHM`]).
    ///
    /// # Errors
    /// - `UnsupportedAlgorithm` for any other transformation name
    /// - `KeyLoad` when no key path and no password is configured
    /// - `Config` when password derivation would use a random salt
    pub fn new(algorithm: &str, mut config: GcmKeyConfig) -> CryptoResult<Self> {
        if !algorithm.trim().eq_ignore_ascii_case(GCM_ALGORITHM) {
            return Err(CryptoError::UnsupportedAlgorithm(algorithm.to_string()));
        }
        if !config.key.is_configured() && !config.has_password() {
            return Err(CryptoError::KeyLoad(
                "AES-GCM requires a secret key string, a key location, or a password".to_string(),
            ));
        }
        if !config.key.is_configured() && config.salt_generator == SaltGenerator::Random {
            return Err(CommonError::config(
                "gcm_secret_key_salt",
                "a random salt cannot derive a stable key; use zero or fixed:<salt>",
            )
            .into());
        }

        config.key = config.key.with_inline_encoding(InlineEncoding::Base64);
        Ok(Self { config, cipher: OnceCell::new() })
    }

    fn cipher(&self) -> CryptoResult<&AesGcm> {
        self.cipher.get_or_init(|| self.load_cipher()).as_ref().map_err(Clone::clone)
    }

    #[instrument(skip_all, fields(configured_key = self.config.key.is_configured()))]
    fn load_cipher(&self) -> CryptoResult<AesGcm> {
        let key = if self.config.key.is_configured() {
            self.config.key.load()?
        } else {
            let password = self
                .config
                .password
                .as_ref()
                .ok_or_else(|| CryptoError::KeyLoad("no AES-GCM key material".to_string()))?;
            if self.config.salt_generator == SaltGenerator::Zero {
                warn!("Deriving AES-GCM key with the all-zero default salt");
            }
            let salt = self.config.salt_generator.generate(DERIVED_KEY_LEN);
            let derived = derive_key(
                self.config.kdf,
                password.expose_bytes(),
                &salt,
                self.config.iterations,
                DERIVED_KEY_LEN,
            )?;
            info!(
                kdf = self.config.kdf.name(),
                iterations = self.config.iterations,
                "AES-GCM key derived"
            );
            KeyMaterial::new(derived.to_vec())
        };

        let invalid = |e| CryptoError::InvalidKey(format!("AES-GCM key: {}", e));
        let bytes = key.as_bytes();
        match bytes.len() {
            16 => Ok(AesGcm::Aes128(Box::new(Aes128Gcm::new_from_slice(bytes).map_err(invalid)?))),
            32 => Ok(AesGcm::Aes256(Box::new(Aes256Gcm::new_from_slice(bytes).map_err(invalid)?))),
            n => Err(CryptoError::InvalidKey(format!(
                "AES-GCM key must be 16 or 32 bytes, got {}",
                n
            ))),
        }
    }
}

impl CipherBackend for GcmCipher {
    fn encrypt(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let nonce_bytes = random_bytes(NONCE_LEN);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let sealed = match self.cipher()? {
            AesGcm::Aes128(c) => c.encrypt(nonce, plaintext),
            AesGcm::Aes256(c) => c.encrypt(nonce, plaintext),
        }
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        if ciphertext.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::MalformedCiphertext(format!(
                "AES-GCM input must be at least {} bytes, got {}",
                NONCE_LEN + TAG_LEN,
                ciphertext.len()
            )));
        }

        let (nonce_bytes, sealed) = ciphertext.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);
        match self.cipher()? {
            AesGcm::Aes128(c) => c.decrypt(nonce, sealed),
            AesGcm::Aes256(c) => c.decrypt(nonce, sealed),
        }
        .map_err(|_| CryptoError::AuthenticationFailed)
    }

    fn algorithm(&self) -> &str {
        GCM_ALGORITHM
    }
}
