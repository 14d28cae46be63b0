//! Configuration model
//!
//! Every section deserializes with defaults, so a partial TOML/JSON file or a
//! handful of environment variables yield a complete configuration.
//! Secret-bearing fields are skipped on serialization and redacted in
//! `Debug` output.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropCryptConfig {
    pub encryptor: EncryptorSettings,
    pub detector: DetectorSettings,
    pub filter: FilterSettings,
    pub cache: CacheSettings,
}

/// Encryptor selection and backend parameters
///
/// Backend selection order: a password selects PBE, otherwise any RSA key
/// material selects the asymmetric backend, otherwise GCM key material or an
/// AES/GCM algorithm selects AES-GCM.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptorSettings {
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub algorithm: String,
    pub key_obtention_iterations: u32,
    pub pool_size: usize,
    pub provider_name: Option<String>,
    pub salt_generator: String,
    pub iv_generator: String,
    pub string_output_type: String,

    #[serde(skip_serializing)]
    pub private_key_string: Option<String>,
    pub private_key_location: Option<String>,
    pub private_key_format: String,
    pub public_key_string: Option<String>,
    pub public_key_location: Option<String>,
    pub public_key_format: String,

    #[serde(skip_serializing)]
    pub gcm_secret_key_string: Option<String>,
    pub gcm_secret_key_location: Option<String>,
    #[serde(skip_serializing)]
    pub gcm_secret_key_password: Option<String>,
    pub gcm_secret_key_salt: String,
    pub gcm_secret_key_algorithm: String,
    pub gcm_secret_key_iterations: u32,
}

impl EncryptorSettings {
    /// True when any RSA key source is configured.
    pub fn has_rsa_keys(&self) -> bool {
        [
            &self.private_key_string,
            &self.private_key_location,
            &self.public_key_string,
            &self.public_key_location,
        ]
        .iter()
        .any(|value| is_set(value))
    }

    /// True when any GCM key source is configured.
    pub fn has_gcm_key(&self) -> bool {
        is_set(&self.gcm_secret_key_string)
            || is_set(&self.gcm_secret_key_location)
            || is_set(&self.gcm_secret_key_password)
    }

    pub fn has_password(&self) -> bool {
        is_set(&self.password)
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl Default for EncryptorSettings {
    fn default() -> Self {
        Self {
            password: None,
            algorithm: DEFAULT_ALGORITHM.to_string(),
            key_obtention_iterations: DEFAULT_KEY_OBTENTION_ITERATIONS,
            pool_size: DEFAULT_POOL_SIZE,
            provider_name: None,
            salt_generator: DEFAULT_SALT_GENERATOR.to_string(),
            iv_generator: DEFAULT_IV_GENERATOR.to_string(),
            string_output_type: DEFAULT_STRING_OUTPUT_TYPE.to_string(),
            private_key_string: None,
            private_key_location: None,
            private_key_format: DEFAULT_KEY_FORMAT.to_string(),
            public_key_string: None,
            public_key_location: None,
            public_key_format: DEFAULT_KEY_FORMAT.to_string(),
            gcm_secret_key_string: None,
            gcm_secret_key_location: None,
            gcm_secret_key_password: None,
            gcm_secret_key_salt: DEFAULT_GCM_SECRET_KEY_SALT.to_string(),
            gcm_secret_key_algorithm: DEFAULT_GCM_SECRET_KEY_ALGORITHM.to_string(),
            gcm_secret_key_iterations: DEFAULT_GCM_SECRET_KEY_ITERATIONS,
        }
    }
}

impl fmt::Debug for EncryptorSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "***");
        f.debug_struct("EncryptorSettings")
            .field("password", &redact(&self.password))
            .field("algorithm", &self.algorithm)
            .field("key_obtention_iterations", &self.key_obtention_iterations)
            .field("pool_size", &self.pool_size)
            .field("provider_name", &self.provider_name)
            .field("salt_generator", &self.salt_generator)
            .field("iv_generator", &self.iv_generator)
            .field("string_output_type", &self.string_output_type)
            .field("private_key_string", &redact(&self.private_key_string))
            .field("private_key_location", &self.private_key_location)
            .field("private_key_format", &self.private_key_format)
            .field("public_key_string", &self.public_key_string)
            .field("public_key_location", &self.public_key_location)
            .field("public_key_format", &self.public_key_format)
            .field("gcm_secret_key_string", &redact(&self.gcm_secret_key_string))
            .field("gcm_secret_key_location", &self.gcm_secret_key_location)
            .field("gcm_secret_key_password", &redact(&self.gcm_secret_key_password))
            .field("gcm_secret_key_salt", &self.gcm_secret_key_salt)
            .field("gcm_secret_key_algorithm", &self.gcm_secret_key_algorithm)
            .field("gcm_secret_key_iterations", &self.gcm_secret_key_iterations)
            .finish()
    }
}

/// Envelope marking a value as encrypted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    pub prefix: String,
    pub suffix: String,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self { prefix: DEFAULT_PREFIX.to_string(), suffix: DEFAULT_SUFFIX.to_string() }
    }
}

/// Full-match regular expressions over source and property names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub include_sources: Vec<String>,
    pub exclude_sources: Vec<String>,
    pub include_names: Vec<String>,
    pub exclude_names: Vec<String>,
}

impl FilterSettings {
    pub fn is_empty(&self) -> bool {
        self.include_sources.is_empty()
            && self.exclude_sources.is_empty()
            && self.include_names.is_empty()
            && self.exclude_names.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}
