//! Key material acquisition for cipher backends
//!
//! A [`KeyMaterialProvider`] describes up to three ways of obtaining key
//! bytes and tries them in a fixed order:
//!
//! 1. an explicit, already-loaded key
//! 2. an inline string (UTF-8 text or base64, depending on the backend)
//! 3. a resource location
//!
//! Resource locations accept `file:<path>`, `env:<VAR>` and bare filesystem
//! paths. Loading is not cached here; backends keep the outcome of the first
//! load, success or failure, in their own compute-once cell.

use std::fmt;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::{debug, info, instrument, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::SecureString;
use crate::crypto::error::{CryptoError, CryptoResult};
use crate::error::CommonError;

/// Opaque key bytes, zeroed on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    bytes: Vec<u8>,
}

impl KeyMaterial {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial({} bytes)", self.bytes.len())
    }
}

impl From<Vec<u8>> for KeyMaterial {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// How an inline key string maps to bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InlineEncoding {
    /// The string's UTF-8 bytes are the key (PEM text).
    Utf8,
    /// The string is base64 of the key bytes (DER, raw AES keys).
    #[default]
    Base64,
}

/// Which acquisition path produced a key; logged on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySourceKind {
    Explicit,
    Inline,
    Location,
}

impl KeySourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Inline => "inline",
            Self::Location => "location",
        }
    }
}

/// Ordered set of key acquisition paths for one key.
#[derive(Clone, Default)]
pub struct KeyMaterialProvider {
    name: &'static str,
    explicit: Option<KeyMaterial>,
    inline: Option<SecureString>,
    location: Option<String>,
    inline_encoding: InlineEncoding,
}

impl fmt::Debug for KeyMaterialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterialProvider")
            .field("name", &self.name)
            .field("explicit", &self.explicit.is_some())
            .field("inline", &self.inline.is_some())
            .field("location", &self.location)
            .field("inline_encoding", &self.inline_encoding)
            .finish()
    }
}

impl KeyMaterialProvider {
    /// Create an empty provider. `name` identifies the key in errors and logs
    /// (for example `"private key"`).
    pub fn new(name: &'static str) -> Self {
        Self { name, ..Self::default() }
    }

    pub fn with_explicit(mut self, key: Option<KeyMaterial>) -> Self {
        self.explicit = key;
        self
    }

    pub fn with_inline(mut self, value: Option<SecureString>) -> Self {
        self.inline = value.filter(|v| !v.is_empty());
        self
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location.filter(|l| !l.trim().is_empty());
        self
    }

    pub fn with_inline_encoding(mut self, encoding: InlineEncoding) -> Self {
        self.inline_encoding = encoding;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True when at least one acquisition path is configured.
    pub fn is_configured(&self) -> bool {
        self.explicit.is_some() || self.inline.is_some() || self.location.is_some()
    }

    /// Load key bytes from the first configured path.
    ///
    /// # Errors
    /// Returns [`CryptoError::KeyLoad`] when no path is configured, the
    /// inline string is not valid for its encoding, or the resource cannot be
    /// read.
    #[instrument(skip_all, fields(key = self.name))]
    pub fn load(&self) -> CryptoResult<KeyMaterial> {
        let (kind, material) = if let Some(explicit) = &self.explicit {
            (KeySourceKind::Explicit, explicit.clone())
        } else if let Some(inline) = &self.inline {
            (KeySourceKind::Inline, self.decode_inline(inline)?)
        } else if let Some(location) = &self.location {
            (KeySourceKind::Location, load_location(location)?)
        } else {
            warn!("No key material configured");
            return Err(CryptoError::KeyLoad(format!(
                "no {} configured: provide an explicit key, an inline string or a location",
                self.name
            )));
        };

        if material.is_empty() {
            return Err(CryptoError::KeyLoad(format!(
                "{} from {} source is empty",
                self.name,
                kind.as_str()
            )));
        }

        info!(source = kind.as_str(), bytes = material.len(), "Key material loaded");
        Ok(material)
    }

    fn decode_inline(&self, inline: &SecureString) -> CryptoResult<KeyMaterial> {
        match self.inline_encoding {
            InlineEncoding::Utf8 => Ok(KeyMaterial::new(inline.expose_bytes().to_vec())),
            InlineEncoding::Base64 => {
                let compact: String =
                    inline.expose().chars().filter(|c| !c.is_whitespace()).collect();
                BASE64.decode(compact).map(KeyMaterial::new).map_err(|e| {
                    CryptoError::KeyLoad(format!("inline {} is not valid base64: {}", self.name, e))
                })
            }
        }
    }
}

/// Read the bytes behind a resource location.
fn load_location(location: &str) -> CryptoResult<KeyMaterial> {
    let location = location.trim();
    if let Some(var) = location.strip_prefix("env:") {
        debug!(variable = var, "Reading key material from environment");
        return std::env::var(var).map(|v| KeyMaterial::new(v.into_bytes())).map_err(|e| {
            CryptoError::KeyLoad(format!("environment variable {} not readable: {}", var, e))
        });
    }

    let path = match location.split_once(':') {
        Some(("file", rest)) => rest.trim_start_matches("//"),
        Some((scheme, _)) if scheme.len() > 1 && !scheme.contains(['/', '\\']) => {
            return Err(CryptoError::KeyLoad(format!(
                "unsupported resource scheme '{}' in location '{}'",
                scheme, location
            )));
        }
        _ => location,
    };

    debug!(path = path, "Reading key material from file");
    std::fs::read(Path::new(path)).map(KeyMaterial::new).map_err(|e| {
        let cause = CommonError::io(
            "read_key",
            format!("failed to read key resource '{}': {}", path, e),
        );
        CryptoError::KeyLoad(cause.to_string())
    })
}
