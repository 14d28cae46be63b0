//! String encryptor factory
//!
//! Builds the [`StringEncryptor`] described by [`EncryptorSettings`]:
//! selects the cipher backend, wires key material providers, applies the
//! output encoding and optionally pools the result.

use propcrypt_common::crypto::{
    CipherBackend, CipherStringEncryptor, GcmCipher, GcmKeyConfig, IvGenerator, KdfDigest,
    KeyFormat, PbeAlgorithm, PbeCipher, PooledStringEncryptor, RsaCipher, SaltGenerator,
    StringEncryptor, StringOutputType,
};
use propcrypt_common::security::KeyMaterialProvider;
use propcrypt_common::{CryptoResult, SecureString};
use propcrypt_domain::constants::{BUILT_IN_PROVIDER, DEFAULT_GCM_ALGORITHM};
use propcrypt_domain::{BackendKind, EncryptorSettings};
use tracing::{info, instrument};

use crate::errors::{ResolveError, ResolveResult};

/// Configuration keys any one of which enables a backend.
pub const REQUIRED_KEYS: &[&str] = &[
    "password",
    "private_key_string",
    "private_key_location",
    "public_key_string",
    "public_key_location",
    "gcm_secret_key_string",
    "gcm_secret_key_location",
    "gcm_secret_key_password",
];

/// Pick the backend: PBE if a password is set, else RSA if any key material
/// is set, else AES-GCM if a GCM key or a GCM algorithm is set.
///
/// # Errors
/// Returns [`ResolveError::MissingConfiguration`] when nothing selects a
/// backend.
pub fn select_backend(settings: &EncryptorSettings) -> ResolveResult<BackendKind> {
    if settings.has_password() {
        Ok(BackendKind::Pbe)
    } else if settings.has_rsa_keys() {
        Ok(BackendKind::Rsa)
    } else if settings.has_gcm_key() || is_gcm_algorithm(&settings.algorithm) {
        Ok(BackendKind::AesGcm)
    } else {
        Err(ResolveError::MissingConfiguration { keys: REQUIRED_KEYS.to_vec() })
    }
}

/// Build the configured string encryptor, pooled when `pool_size > 1`.
#[instrument(skip_all, fields(pool_size = settings.pool_size))]
pub fn build_string_encryptor(
    settings: &EncryptorSettings,
) -> ResolveResult<Box<dyn StringEncryptor>> {
    check_provider(settings)?;
    if settings.pool_size == 0 {
        return Err(ResolveError::invalid_config("pool_size", "must be at least 1"));
    }

    let kind = select_backend(settings)?;
    let output = StringOutputType::from_name(&settings.string_output_type)?;
    let single = || -> CryptoResult<Box<dyn StringEncryptor>> {
        let backend = build_backend(kind, settings)?;
        Ok(Box::new(CipherStringEncryptor::new(backend, output)))
    };

    let encryptor: Box<dyn StringEncryptor> = if settings.pool_size > 1 {
        Box::new(PooledStringEncryptor::new(settings.pool_size, single)?)
    } else {
        single()?
    };

    info!(backend = %kind, pool_size = settings.pool_size, "Encryptor selected");
    Ok(encryptor)
}

/// Build the raw cipher backend for `settings`.
pub fn build_cipher(settings: &EncryptorSettings) -> ResolveResult<Box<dyn CipherBackend>> {
    let kind = select_backend(settings)?;
    Ok(build_backend(kind, settings)?)
}

fn build_backend(
    kind: BackendKind,
    settings: &EncryptorSettings,
) -> CryptoResult<Box<dyn CipherBackend>> {
    match kind {
        BackendKind::Pbe => build_pbe(settings).map(|c| Box::new(c) as Box<dyn CipherBackend>),
        BackendKind::Rsa => build_rsa(settings).map(|c| Box::new(c) as Box<dyn CipherBackend>),
        BackendKind::AesGcm => build_gcm(settings).map(|c| Box::new(c) as Box<dyn CipherBackend>),
    }
}

fn build_pbe(settings: &EncryptorSettings) -> CryptoResult<PbeCipher> {
    PbeCipher::new(
        secret(&settings.password).unwrap_or_else(|| SecureString::new("")),
        PbeAlgorithm::from_name(&settings.algorithm)?,
        settings.key_obtention_iterations,
        SaltGenerator::from_name(&settings.salt_generator)?,
        IvGenerator::from_name(&settings.iv_generator)?,
    )
}

fn build_rsa(settings: &EncryptorSettings) -> CryptoResult<RsaCipher> {
    let public = KeyMaterialProvider::new("public key")
        .with_inline(secret(&settings.public_key_string))
        .with_location(settings.public_key_location.clone());
    let private = KeyMaterialProvider::new("private key")
        .with_inline(secret(&settings.private_key_string))
        .with_location(settings.private_key_location.clone());

    RsaCipher::with_formats(
        KeyFormat::from_name(&settings.public_key_format)?,
        public,
        KeyFormat::from_name(&settings.private_key_format)?,
        private,
    )
}

fn build_gcm(settings: &EncryptorSettings) -> CryptoResult<GcmCipher> {
    let config = GcmKeyConfig {
        key: KeyMaterialProvider::new("secret key")
            .with_inline(secret(&settings.gcm_secret_key_string))
            .with_location(settings.gcm_secret_key_location.clone()),
        password: secret(&settings.gcm_secret_key_password),
        salt_generator: SaltGenerator::from_name(&settings.gcm_secret_key_salt)?,
        iterations: settings.gcm_secret_key_iterations,
        kdf: KdfDigest::from_name(&settings.gcm_secret_key_algorithm)?,
    };

    let algorithm = if is_gcm_algorithm(&settings.algorithm) {
        settings.algorithm.as_str()
    } else {
        DEFAULT_GCM_ALGORITHM
    };
    GcmCipher::new(algorithm, config)
}

fn check_provider(settings: &EncryptorSettings) -> ResolveResult<()> {
    match settings.provider_name.as_deref().map(str::trim) {
        None | Some("") => Ok(()),
        Some(name) if name.eq_ignore_ascii_case(BUILT_IN_PROVIDER) => Ok(()),
        Some(name) => Err(ResolveError::invalid_config(
            "provider_name",
            format!("provider '{}' is not available; only '{}' is", name, BUILT_IN_PROVIDER),
        )),
    }
}

fn is_gcm_algorithm(algorithm: &str) -> bool {
    algorithm.to_ascii_uppercase().contains("GCM")
}

fn secret(value: &Option<String>) -> Option<SecureString> {
    value.as_deref().map(SecureString::new)
}
