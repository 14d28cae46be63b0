//! Property resolution benchmarks
//!
//! Compares the cost of reading an encrypted property through the caching
//! decorator (hit path) against the non-caching decorator, which decrypts on
//! every lookup:
//!
//! - **Cached**: hit path for encrypted and plain values
//! - **Uncached**: PBE and AES-GCM decryption per lookup
//! - **Environment**: precedence lookup across several sources
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench -p propcrypt-core --bench resolve_bench
//! cargo bench -p propcrypt-core --bench resolve_bench -- cached
//! ```

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use propcrypt_common::crypto::{CipherStringEncryptor, GcmCipher, GcmKeyConfig, PbeCipher};
use propcrypt_common::security::KeyMaterial;
use propcrypt_common::{SecureString, StringEncryptor};
use propcrypt_core::{
    CachingPropertySource, DefaultPropertyFilter, DefaultPropertyResolver, EncryptableEnvironment,
    EncryptablePropertySource, MapPropertySource, PropertySource, ValueWrapper,
};
use propcrypt_domain::PropCryptConfig;

// ============================================================================
// Fixtures
// ============================================================================

const PASSWORD: &str = "benchmark_master_password";

fn pbe() -> Arc<dyn StringEncryptor> {
    Arc::new(CipherStringEncryptor::base64(
        PbeCipher::with_defaults(SecureString::new(PASSWORD)).expect("cipher"),
    ))
}

fn gcm() -> Arc<dyn StringEncryptor> {
    let config = GcmKeyConfig::from_key(KeyMaterial::new(vec![7u8; 32]));
    Arc::new(CipherStringEncryptor::base64(
        GcmCipher::new("AES/GCM/NoPadding", config).expect("cipher"),
    ))
}

fn map_with(encryptor: &dyn StringEncryptor) -> Arc<MapPropertySource> {
    let wrapped = ValueWrapper::default().encrypt_and_wrap(encryptor, "hunter2").expect("wrap");
    Arc::new(
        MapPropertySource::new("application")
            .with_property("db.password", wrapped)
            .with_property("db.user", "app"),
    )
}

// ============================================================================
// Cached Lookups
// ============================================================================

fn bench_cached(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached");

    let encryptor = pbe();
    let source = CachingPropertySource::new(
        map_with(&*encryptor),
        Arc::new(DefaultPropertyResolver::with_encryptor(encryptor)),
        Arc::new(DefaultPropertyFilter::include_all()),
    );
    source.get_property("db.password").expect("warm cache");

    group.bench_function("encrypted_hit", |b| {
        b.iter(|| black_box(source.get_property(black_box("db.password")).expect("resolve")));
    });

    group.bench_function("plain_hit", |b| {
        b.iter(|| black_box(source.get_property(black_box("db.user")).expect("resolve")));
    });

    group.finish();
}

// ============================================================================
// Uncached Lookups
// ============================================================================

fn bench_uncached(c: &mut Criterion) {
    let mut group = c.benchmark_group("uncached");

    for (name, encryptor) in [("pbe", pbe()), ("gcm", gcm())] {
        let source = EncryptablePropertySource::new(
            map_with(&*encryptor),
            Arc::new(DefaultPropertyResolver::with_encryptor(encryptor)),
            Arc::new(DefaultPropertyFilter::include_all()),
        );

        group.bench_function(name, |b| {
            b.iter(|| black_box(source.get_property(black_box("db.password")).expect("resolve")));
        });
    }

    group.finish();
}

// ============================================================================
// Environment Lookups
// ============================================================================

fn bench_environment(c: &mut Criterion) {
    let mut group = c.benchmark_group("environment");

    let mut config = PropCryptConfig::default();
    config.encryptor.password = Some(PASSWORD.to_string());
    let mut builder = EncryptableEnvironment::builder().config(config);
    for i in 0..4 {
        builder = builder.source(MapPropertySource::from_pairs(
            format!("layer-{i}"),
            [(format!("layer{i}.key"), "value")],
        ));
    }
    let env = builder
        .source(MapPropertySource::from_pairs("base", [("db.user", "app")]))
        .build()
        .expect("environment");

    group.bench_function("lowest_precedence_hit", |b| {
        b.iter(|| black_box(env.get_property(black_box("db.user")).expect("resolve")));
    });

    group.finish();
}

criterion_group!(benches, bench_cached, bench_uncached, bench_environment);
criterion_main!(benches);
