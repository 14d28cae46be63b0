//! Cipher backend benchmarks
//!
//! Measures the cost of one encrypted configuration value through each
//! backend, which is what a cache miss pays:
//!
//! - **Key Derivation**: PBKDF2 at several iteration counts
//! - **PBE**: encrypt/decrypt of short values (derivation dominates)
//! - **AES-GCM**: encrypt/decrypt across payload sizes
//! - **RSA**: single-block encrypt/decrypt
//! - **Pooling**: pooled vs single string encryptor
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all crypto benchmarks
//! cargo bench -p propcrypt-common --features runtime --bench crypto_bench
//!
//! # Run specific benchmark group
//! cargo bench -p propcrypt-common --features runtime --bench crypto_bench -- key_derivation
//! cargo bench -p propcrypt-common --features runtime --bench crypto_bench -- gcm_throughput
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use propcrypt_common::crypto::kdf::{derive_key, KdfDigest};
use propcrypt_common::crypto::{
    CipherBackend, CipherStringEncryptor, GcmCipher, GcmKeyConfig, KeyFormat, PbeCipher,
    PooledStringEncryptor, RsaCipher, StringEncryptor,
};
use propcrypt_common::security::{KeyMaterial, KeyMaterialProvider, SecureString};
use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};

// ============================================================================
// Constants for benchmarking
// ============================================================================

const SMALL_DATA: usize = 16; // typical password
const MEDIUM_DATA: usize = 256; // connection string
const LARGE_DATA: usize = 4 * 1024; // embedded certificate

const TEST_PASSWORD: &str = "benchmark_master_password";

// ============================================================================
// Key Derivation Benchmarks
// ============================================================================

fn bench_key_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_derivation");
    group.sample_size(20);

    for iterations in [1000u32, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("pbkdf2_sha512", iterations),
            &iterations,
            |b, &iterations| {
                b.iter(|| {
                    let key = derive_key(
                        KdfDigest::Sha512,
                        black_box(TEST_PASSWORD.as_bytes()),
                        &[0u8; 16],
                        iterations,
                        32,
                    )
                    .expect("derivation failed");
                    black_box(key);
                });
            },
        );
    }

    group.finish();
}

// ============================================================================
// PBE Benchmarks
// ============================================================================

fn bench_pbe(c: &mut Criterion) {
    let mut group = c.benchmark_group("pbe");

    let encryptor = CipherStringEncryptor::base64(
        PbeCipher::with_defaults(SecureString::new(TEST_PASSWORD)).expect("cipher"),
    );
    let ciphertext = encryptor.encrypt("hunter2").expect("encrypt");

    group.bench_function("encrypt_short_value", |b| {
        b.iter(|| black_box(encryptor.encrypt(black_box("hunter2")).expect("encrypt")));
    });

    group.bench_function("decrypt_short_value", |b| {
        b.iter(|| black_box(encryptor.decrypt(black_box(&ciphertext)).expect("decrypt")));
    });

    group.finish();
}

// ============================================================================
// AES-GCM Throughput Benchmarks
// ============================================================================

fn bench_gcm_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("gcm_throughput");

    let key = KeyMaterial::new(propcrypt_common::crypto::generators::random_bytes(32));
    let cipher = GcmCipher::new("AES/GCM/NoPadding", GcmKeyConfig::from_key(key)).expect("cipher");

    for (name, size) in [("16B", SMALL_DATA), ("256B", MEDIUM_DATA), ("4KB", LARGE_DATA)] {
        let data = vec![0u8; size];
        let sealed = cipher.encrypt(&data).expect("encrypt");
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("encrypt", name), &data, |b, data| {
            b.iter(|| black_box(cipher.encrypt(black_box(data)).expect("encrypt")));
        });

        group.bench_with_input(BenchmarkId::new("decrypt", name), &sealed, |b, sealed| {
            b.iter(|| black_box(cipher.decrypt(black_box(sealed)).expect("decrypt")));
        });
    }

    group.finish();
}

// ============================================================================
// RSA Benchmarks
// ============================================================================

fn bench_rsa(c: &mut Criterion) {
    let mut group = c.benchmark_group("rsa");
    group.sample_size(20);

    let private = RsaPrivateKey::new(&mut OsRng, 2048).expect("key generation");
    let public = RsaPublicKey::from(&private);
    let cipher = RsaCipher::new(
        KeyFormat::Der,
        KeyMaterialProvider::new("public key").with_explicit(Some(KeyMaterial::new(
            public.to_public_key_der().expect("der").as_bytes().to_vec(),
        ))),
        KeyMaterialProvider::new("private key").with_explicit(Some(KeyMaterial::new(
            private.to_pkcs8_der().expect("der").as_bytes().to_vec(),
        ))),
    )
    .expect("cipher");
    let sealed = cipher.encrypt(b"hunter2").expect("encrypt");

    group.bench_function("encrypt_2048", |b| {
        b.iter(|| black_box(cipher.encrypt(black_box(b"hunter2")).expect("encrypt")));
    });

    group.bench_function("decrypt_2048", |b| {
        b.iter(|| black_box(cipher.decrypt(black_box(&sealed)).expect("decrypt")));
    });

    group.finish();
}

// ============================================================================
// Pooling Benchmarks
// ============================================================================

fn bench_pooling(c: &mut Criterion) {
    let mut group = c.benchmark_group("pooling");

    let key = KeyMaterial::new(propcrypt_common::crypto::generators::random_bytes(32));
    let build = || -> Box<dyn StringEncryptor> {
        let config = GcmKeyConfig::from_key(key.clone());
        Box::new(CipherStringEncryptor::base64(
            GcmCipher::new("AES/GCM/NoPadding", config).expect("cipher"),
        ))
    };

    let single = build();
    let pool = PooledStringEncryptor::new(4, || Ok(build())).expect("pool");
    let ciphertext = single.encrypt("hunter2").expect("encrypt");

    group.bench_function("single_decrypt", |b| {
        b.iter(|| black_box(single.decrypt(black_box(&ciphertext)).expect("decrypt")));
    });

    group.bench_function("pooled_decrypt", |b| {
        b.iter(|| black_box(pool.decrypt(black_box(&ciphertext)).expect("decrypt")));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_key_derivation,
    bench_pbe,
    bench_gcm_throughput,
    bench_rsa,
    bench_pooling
);
criterion_main!(benches);
