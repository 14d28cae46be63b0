//! Shared test helpers for `propcrypt-core` integration tests.
//!
//! Provides a call-counting resolver and fixed-key encryptor factories so
//! tests can focus on resolution behaviour instead of key setup.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use propcrypt_common::crypto::{
    CipherStringEncryptor, GcmCipher, GcmKeyConfig, KeyFormat, PbeCipher, RsaCipher,
};
use propcrypt_common::security::{KeyMaterial, KeyMaterialProvider};
use propcrypt_common::{SecureString, StringEncryptor};
use propcrypt_core::{PropertyResolver, ResolveResult};

pub const MASTER_PASSWORD: &str = "masterkey";

/// Fixed 256-bit AES key shared by GCM tests.
pub static GCM_KEY: Lazy<Vec<u8>> = Lazy::new(|| (0u8..32).collect());

/// Wraps a resolver and counts how often it is consulted.
pub struct CountingResolver<R> {
    inner: R,
    calls: AtomicUsize,
}

impl<R: PropertyResolver> CountingResolver<R> {
    pub fn new(inner: R) -> Arc<Self> {
        Arc::new(Self { inner, calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<R: PropertyResolver> PropertyResolver for CountingResolver<R> {
    fn resolve(&self, raw: &str) -> ResolveResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve(raw)
    }
}

pub fn pbe_encryptor(password: &str) -> Arc<dyn StringEncryptor> {
    Arc::new(CipherStringEncryptor::base64(
        PbeCipher::with_defaults(SecureString::new(password)).unwrap(),
    ))
}

pub fn gcm_encryptor() -> Arc<dyn StringEncryptor> {
    let config = GcmKeyConfig::from_key(KeyMaterial::new(GCM_KEY.clone()));
    Arc::new(CipherStringEncryptor::base64(GcmCipher::new("AES/GCM/NoPadding", config).unwrap()))
}

/// RSA encryptor over DER keys held in memory.
pub fn rsa_encryptor(public_der: Vec<u8>, private_der: Vec<u8>) -> Arc<dyn StringEncryptor> {
    let cipher = RsaCipher::new(
        KeyFormat::Der,
        KeyMaterialProvider::new("public key")
            .with_explicit(Some(KeyMaterial::new(public_der))),
        KeyMaterialProvider::new("private key")
            .with_explicit(Some(KeyMaterial::new(private_der))),
    )
    .unwrap();
    Arc::new(CipherStringEncryptor::base64(cipher))
}
