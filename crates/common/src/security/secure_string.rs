//! Secret text with automatic memory zeroization
//!
//! Passwords and inline key strings pass through configuration as
//! `SecureString` so they never show up in `Debug` output, logs, or
//! re-serialized configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secret string that zeroes memory on drop
///
/// Deserializes from a plain string. Serializes as the redaction marker
/// `"***"`, so a configuration dump never round-trips a secret.
///
/// # Security Note
/// `PartialEq` is not constant-time. Use `constant_time_eq()` when comparing
/// secrets supplied by a caller.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    /// Create a new secure string
    pub fn new(s: impl Into<String>) -> Self {
        Self { inner: s.into() }
    }

    /// Expose the inner value
    ///
    /// # Security Warning
    /// The exposed value must not be stored or logged.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Expose the inner value as bytes, for key derivation.
    pub fn expose_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Compare with another secure string in constant time
    pub fn constant_time_eq(&self, other: &SecureString) -> bool {
        constant_time_eq(self.expose_bytes(), other.expose_bytes())
    }
}

impl PartialEq for SecureString {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for SecureString {}

impl FromStr for SecureString {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureString(***)")
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

impl Serialize for SecureString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}

impl<'de> Deserialize<'de> for SecureString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    //! Unit tests for security::secure_string.
    use super::*;

    /// Validates `SecureString::new` behavior for the secure string creation
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms `s.len()` equals `9`.
    /// - Confirms `s.expose()` equals `"masterkey"`.
    #[test]
    fn test_secure_string_creation() {
        let s = SecureString::new("masterkey");
        assert_eq!(s.len(), 9);
        assert_eq!(s.expose(), "masterkey");
        assert!(!s.is_empty());
    }

    /// Validates the redacted `Debug` and `Display` scenario.
    ///
    /// Assertions:
    /// - Confirms `Debug` renders `"SecureString(***)"`.
    /// - Ensures neither rendering contains the secret.
    #[test]
    fn test_secure_string_redaction() {
        let s = SecureString::new("hunter2");
        let debug_str = format!("{:?}", s);
        let display_str = format!("{}", s);
        assert_eq!(debug_str, "SecureString(***)");
        assert!(!debug_str.contains("hunter2"));
        assert!(!display_str.contains("hunter2"));
    }

    /// Validates the serde round trip of a secret through configuration.
    ///
    /// Assertions:
    /// - Confirms a JSON string deserializes to the secret.
    /// - Confirms serialization emits only the redaction marker.
    #[test]
    fn test_secure_string_serde() {
        let s: SecureString = serde_json::from_str("\"masterkey\"").unwrap();
        assert_eq!(s.expose(), "masterkey");
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"***\"");
    }

    /// Validates `SecureString::constant_time_eq` behavior.
    ///
    /// Assertions:
    /// - Ensures equal secrets compare equal.
    /// - Ensures different contents and different lengths compare unequal.
    #[test]
    fn test_constant_time_eq() {
        let s1 = SecureString::new("test");
        let s2 = SecureString::new("test");
        let s3 = SecureString::new("tesT");
        let s4 = SecureString::new("much longer string");

        assert!(s1.constant_time_eq(&s2));
        assert!(!s1.constant_time_eq(&s3));
        assert!(!s1.constant_time_eq(&s4));
    }
}
