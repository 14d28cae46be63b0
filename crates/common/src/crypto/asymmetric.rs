//! RSA encryption with PKCS#1 v1.5 padding.
//!
//! Encryption uses the public key and decryption the private key. Each key is
//! loaded and parsed on first use, independently of the other, so a
//! decrypt-only deployment never needs the public key.
//!
//! Only single-block messages are supported: plaintext may be at most
//! `modulus_bytes - 11` long.

use std::fmt;

use once_cell::sync::OnceCell;
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use tracing::{info, instrument};

use super::error::{CryptoError, CryptoResult};
use super::CipherBackend;
use crate::security::{InlineEncoding, KeyMaterial, KeyMaterialProvider};

/// PKCS#1 v1.5 padding overhead in bytes.
const PKCS1_OVERHEAD: usize = 11;

/// Encoding of RSA key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyFormat {
    #[default]
    Der,
    Pem,
}

impl KeyFormat {
    pub fn from_name(name: &str) -> CryptoResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "der" => Ok(Self::Der),
            "pem" => Ok(Self::Pem),
            other => Err(CryptoError::UnsupportedAlgorithm(format!("key format '{}'", other))),
        }
    }

    /// DER keys are configured inline as base64; PEM keys as text.
    pub fn inline_encoding(&self) -> InlineEncoding {
        match self {
            Self::Der => InlineEncoding::Base64,
            Self::Pem => InlineEncoding::Utf8,
        }
    }
}

/// RSA cipher backend.
pub struct RsaCipher {
    public_format: KeyFormat,
    private_format: KeyFormat,
    public_source: KeyMaterialProvider,
    private_source: KeyMaterialProvider,
    // Load outcomes, failures included; a key is never loaded twice.
    public_key: OnceCell<CryptoResult<RsaPublicKey>>,
    private_key: OnceCell<CryptoResult<RsaPrivateKey>>,
}

impl fmt::Debug for RsaCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaCipher")
            .field("public_format", &self.public_format)
            .field("private_format", &self.private_format)
            .field("public_source", &self.public_source)
            .field("private_source", &self.private_source)
            .field("public_loaded", &matches!(self.public_key.get(), Some(Ok(_))))
            .field("private_loaded", &matches!(self.private_key.get(), Some(Ok(_))))
            .finish()
    }
}

impl RsaCipher {
    /// Create a cipher whose public and private keys share one format.
    pub fn new(
        format: KeyFormat,
        public_source: KeyMaterialProvider,
        private_source: KeyMaterialProvider,
    ) -> CryptoResult<Self> {
        Self::with_formats(format, public_source, format, private_source)
    }

    /// Create a cipher from public and private key sources.
    ///
    /// The inline encoding of each source is set from its format.
    ///
    /// # Errors
    /// Returns [`CryptoError::KeyLoad`] when neither key has any acquisition
    /// path configured.
    pub fn with_formats(
        public_format: KeyFormat,
        public_source: KeyMaterialProvider,
        private_format: KeyFormat,
        private_source: KeyMaterialProvider,
    ) -> CryptoResult<Self> {
        if !public_source.is_configured() && !private_source.is_configured() {
            return Err(CryptoError::KeyLoad(
                "RSA requires a public key, a private key, or both".to_string(),
            ));
        }

        Ok(Self {
            public_format,
            private_format,
            public_source: public_source.with_inline_encoding(public_format.inline_encoding()),
            private_source: private_source.with_inline_encoding(private_format.inline_encoding()),
            public_key: OnceCell::new(),
            private_key: OnceCell::new(),
        })
    }

    pub fn public_format(&self) -> KeyFormat {
        self.public_format
    }

    pub fn private_format(&self) -> KeyFormat {
        self.private_format
    }

    fn public_key(&self) -> CryptoResult<&RsaPublicKey> {
        self.public_key
            .get_or_init(|| {
                let material = self.public_source.load()?;
                parse_public_key(self.public_format, &material)
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    fn private_key(&self) -> CryptoResult<&RsaPrivateKey> {
        self.private_key
            .get_or_init(|| {
                let material = self.private_source.load()?;
                parse_private_key(self.private_format, &material)
            })
            .as_ref()
            .map_err(Clone::clone)
    }
}

impl CipherBackend for RsaCipher {
    fn encrypt(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let key = self.public_key()?;
        let max = key.size().saturating_sub(PKCS1_OVERHEAD);
        if plaintext.len() > max {
            return Err(CryptoError::MessageTooLong { len: plaintext.len(), max });
        }

        key.encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext)
            .map_err(|e| CryptoError::Encryption(e.to_string()))
    }

    fn decrypt(&self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        let key = self.private_key()?;
        if ciphertext.len() != key.size() {
            return Err(CryptoError::MalformedCiphertext(format!(
                "RSA ciphertext must be {} bytes, got {}",
                key.size(),
                ciphertext.len()
            )));
        }

        key.decrypt(Pkcs1v15Encrypt, ciphertext).map_err(|e| CryptoError::Decryption(e.to_string()))
    }

    fn algorithm(&self) -> &str {
        "RSA/ECB/PKCS1Padding"
    }
}

/// Parse a SubjectPublicKeyInfo key, falling back to a bare PKCS#1 key.
#[instrument(skip_all, fields(format = ?format))]
fn parse_public_key(format: KeyFormat, material: &KeyMaterial) -> CryptoResult<RsaPublicKey> {
    let key = match format {
        KeyFormat::Der => RsaPublicKey::from_public_key_der(material.as_bytes())
            .or_else(|_| RsaPublicKey::from_pkcs1_der(material.as_bytes()))
            .map_err(|e| CryptoError::InvalidKey(format!("public key DER: {}", e)))?,
        KeyFormat::Pem => {
            let pem = pem_text(material)?;
            RsaPublicKey::from_public_key_pem(pem)
                .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
                .map_err(|e| CryptoError::InvalidKey(format!("public key PEM: {}", e)))?
        }
    };
    info!(modulus_bits = key.size() * 8, "RSA public key parsed");
    Ok(key)
}

/// Parse a PKCS#8 private key, falling back to a bare PKCS#1 key.
#[instrument(skip_all, fields(format = ?format))]
fn parse_private_key(format: KeyFormat, material: &KeyMaterial) -> CryptoResult<RsaPrivateKey> {
    let key = match format {
        KeyFormat::Der => RsaPrivateKey::from_pkcs8_der(material.as_bytes())
            .or_else(|_| RsaPrivateKey::from_pkcs1_der(material.as_bytes()))
            .map_err(|e| CryptoError::InvalidKey(format!("private key DER: {}", e)))?,
        KeyFormat::Pem => {
            let pem = pem_text(material)?;
            RsaPrivateKey::from_pkcs8_pem(pem)
                .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
                .map_err(|e| CryptoError::InvalidKey(format!("private key PEM: {}", e)))?
        }
    };
    info!(modulus_bits = key.size() * 8, "RSA private key parsed");
    Ok(key)
}

fn pem_text(material: &KeyMaterial) -> CryptoResult<&str> {
    std::str::from_utf8(material.as_bytes())
        .map(str::trim)
        .map_err(|_| CryptoError::InvalidKey("PEM key is not valid UTF-8".to_string()))
}
