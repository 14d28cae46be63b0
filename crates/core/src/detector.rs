//! Recognition of encrypted values
//!
//! A value is encrypted when, after trimming, it starts with the configured
//! prefix and ends with the configured suffix (`ENC(` and `)` by default).

use propcrypt_domain::constants::{DEFAULT_PREFIX, DEFAULT_SUFFIX};
use propcrypt_domain::DetectorSettings;

/// Decides whether a raw value is wrapped and strips the wrapper.
///
/// Detection never fails.
pub trait PropertyDetector: Send + Sync {
    fn is_encrypted(&self, raw: &str) -> bool;

    /// Strip the wrapper from a value `is_encrypted` accepted.
    fn unwrap<'a>(&self, raw: &'a str) -> &'a str;

    /// Put a ciphertext into the envelope this detector recognizes.
    fn wrap(&self, payload: &str) -> String;
}

/// Prefix/suffix detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultPropertyDetector {
    prefix: String,
    suffix: String,
}

impl DefaultPropertyDetector {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), suffix: suffix.into() }
    }

    pub fn from_settings(settings: &DetectorSettings) -> Self {
        Self::new(settings.prefix.clone(), settings.suffix.clone())
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl Default for DefaultPropertyDetector {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX, DEFAULT_SUFFIX)
    }
}

impl PropertyDetector for DefaultPropertyDetector {
    fn is_encrypted(&self, raw: &str) -> bool {
        let trimmed = raw.trim();
        trimmed.len() >= self.prefix.len() + self.suffix.len()
            && trimmed.starts_with(self.prefix.as_str())
            && trimmed.ends_with(self.suffix.as_str())
    }

    fn unwrap<'a>(&self, raw: &'a str) -> &'a str {
        let trimmed = raw.trim();
        let without_prefix = trimmed.strip_prefix(self.prefix.as_str()).unwrap_or(trimmed);
        without_prefix.strip_suffix(self.suffix.as_str()).unwrap_or(without_prefix)
    }

    fn wrap(&self, payload: &str) -> String {
        format!("{}{}{}", self.prefix, payload, self.suffix)
    }
}

/// Name of the environment variable referenced by a `${NAME}` payload.
///
/// Names are ASCII letters, digits, `_` and `.`, not starting with a digit.
pub fn variable_reference(payload: &str) -> Option<&str> {
    let name = payload.trim().strip_prefix("${")?.strip_suffix('}')?;
    let mut chars = name.chars();
    let first = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.').then_some(name)
}
