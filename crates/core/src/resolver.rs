//! Resolution of a single raw value
//!
//! Values outside the envelope are returned unchanged. Wrapped values are
//! unwrapped and then either substituted from the environment (`${NAME}`
//! payloads) or decrypted with the configured string encryptor.

use std::fmt;
use std::sync::Arc;

use propcrypt_common::StringEncryptor;
use propcrypt_domain::DetectorSettings;

use crate::detector::{variable_reference, DefaultPropertyDetector, PropertyDetector};
use crate::errors::{ResolveError, ResolveResult};

/// Resolves raw property text to its plaintext.
pub trait PropertyResolver: Send + Sync {
    fn resolve(&self, raw: &str) -> ResolveResult<String>;
}

impl<T: PropertyResolver + ?Sized> PropertyResolver for Arc<T> {
    fn resolve(&self, raw: &str) -> ResolveResult<String> {
        (**self).resolve(raw)
    }
}

/// Lookup used for `${NAME}` payloads.
pub type VariableLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Detector + encryptor resolver.
pub struct DefaultPropertyResolver {
    detector: Arc<dyn PropertyDetector>,
    encryptor: Arc<dyn StringEncryptor>,
    variables: VariableLookup,
}

impl fmt::Debug for DefaultPropertyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultPropertyResolver").finish_non_exhaustive()
    }
}

impl DefaultPropertyResolver {
    pub fn new(detector: Arc<dyn PropertyDetector>, encryptor: Arc<dyn StringEncryptor>) -> Self {
        Self { detector, encryptor, variables: Arc::new(|name| std::env::var(name).ok()) }
    }

    /// Resolver with the default `ENC(...)` detector.
    pub fn with_encryptor(encryptor: Arc<dyn StringEncryptor>) -> Self {
        Self::new(Arc::new(DefaultPropertyDetector::default()), encryptor)
    }

    /// Replace the process environment as the source of `${NAME}` values.
    pub fn with_variable_lookup(mut self, variables: VariableLookup) -> Self {
        self.variables = variables;
        self
    }
}

impl PropertyResolver for DefaultPropertyResolver {
    fn resolve(&self, raw: &str) -> ResolveResult<String> {
        if !self.detector.is_encrypted(raw) {
            return Ok(raw.to_string());
        }

        let payload = self.detector.unwrap(raw);
        if let Some(name) = variable_reference(payload) {
            return (self.variables)(name)
                .ok_or_else(|| ResolveError::unresolved_variable(name));
        }

        Ok(self.encryptor.decrypt(payload.trim())?)
    }
}

/// Produces values at rest in the envelope its detector recognizes.
#[derive(Clone)]
pub struct ValueWrapper {
    detector: Arc<dyn PropertyDetector>,
}

impl fmt::Debug for ValueWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueWrapper").finish_non_exhaustive()
    }
}

impl ValueWrapper {
    pub fn new(detector: Arc<dyn PropertyDetector>) -> Self {
        Self { detector }
    }

    pub fn from_settings(settings: &DetectorSettings) -> Self {
        Self::new(Arc::new(DefaultPropertyDetector::from_settings(settings)))
    }

    pub fn wrap(&self, ciphertext: &str) -> String {
        self.detector.wrap(ciphertext)
    }

    /// Encrypt `plaintext` and wrap the result.
    pub fn encrypt_and_wrap(
        &self,
        encryptor: &dyn StringEncryptor,
        plaintext: &str,
    ) -> ResolveResult<String> {
        Ok(self.wrap(&encryptor.encrypt(plaintext)?))
    }
}

impl Default for ValueWrapper {
    fn default() -> Self {
        Self::from_settings(&DetectorSettings::default())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for value resolution.

    use std::collections::HashMap;

    use propcrypt_common::crypto::{CipherStringEncryptor, PbeCipher};
    use propcrypt_common::{CryptoError, CryptoResult, SecureString};

    use super::*;

    /// Reverses text; enough to observe which payload reached the encryptor.
    struct Reverse;

    impl StringEncryptor for Reverse {
        fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
            Ok(plaintext.chars().rev().collect())
        }

        fn decrypt(&self, ciphertext: &str) -> CryptoResult<String> {
            if ciphertext.is_empty() {
                return Err(CryptoError::MalformedCiphertext("empty".into()));
            }
            Ok(ciphertext.chars().rev().collect())
        }
    }

    fn resolver() -> DefaultPropertyResolver {
        let vars: HashMap<&str, &str> = [("DB_PASSWORD", "from-env")].into_iter().collect();
        DefaultPropertyResolver::with_encryptor(Arc::new(Reverse)).with_variable_lookup(
            Arc::new(move |name| vars.get(name).map(|v| v.to_string())),
        )
    }

    /// Validates that plain values pass through untouched.
    ///
    /// Assertions:
    /// - Whitespace and partial envelopes are preserved exactly
    #[test]
    fn test_plain_values_unchanged() {
        let resolver = resolver();
        for value in ["", "plain", "  padded  ", "ENC(open", "prefix ENC(x) suffix"] {
            assert_eq!(resolver.resolve(value).unwrap(), value);
        }
    }

    #[test]
    fn test_wrapped_value_is_decrypted() {
        assert_eq!(resolver().resolve(" ENC(2retnuh) ").unwrap(), "hunter2");
    }

    /// Validates `${NAME}` substitution.
    ///
    /// Assertions:
    /// - The variable value is returned without consulting the encryptor
    /// - A missing variable fails with `UnresolvedVariable`
    #[test]
    fn test_variable_substitution() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("ENC(${DB_PASSWORD})").unwrap(), "from-env");

        let err = resolver.resolve("ENC(${NOT_SET})").unwrap_err();
        assert!(matches!(
            &err,
            ResolveError::UnresolvedVariable { variable, target: None } if variable == "NOT_SET"
        ));
    }

    #[test]
    fn test_backend_failure_surfaces_as_crypto() {
        let err = resolver().resolve("ENC()").unwrap_err();
        assert!(matches!(err, ResolveError::Crypto(CryptoError::MalformedCiphertext(_))));
    }

    /// Validates the wrap helper against a real PBE encryptor.
    ///
    /// Assertions:
    /// - Output carries the envelope
    /// - Resolving the wrapped value yields the original plaintext
    #[test]
    fn test_encrypt_and_wrap_resolves_back() {
        let encryptor: Arc<dyn StringEncryptor> = Arc::new(CipherStringEncryptor::base64(
            PbeCipher::with_defaults(SecureString::new("masterkey")).unwrap(),
        ));
        let wrapped = ValueWrapper::default().encrypt_and_wrap(&*encryptor, "hunter2").unwrap();

        assert!(wrapped.starts_with("ENC(") && wrapped.ends_with(')'));
        let resolver = DefaultPropertyResolver::with_encryptor(encryptor);
        assert_eq!(resolver.resolve(&wrapped).unwrap(), "hunter2");
    }

    #[test]
    fn test_custom_wrapper() {
        let wrapper = ValueWrapper::new(Arc::new(DefaultPropertyDetector::new("{cipher}", "")));
        assert_eq!(wrapper.wrap("abc"), "{cipher}abc");
    }
}
