//! End-to-end resolution against the process environment.
//!
//! Configuration comes from `PROPCRYPT_*` variables and encrypted values
//! live in ordinary environment variables, read through
//! `EnvironmentPropertySource`.

use std::sync::Mutex;

use once_cell::sync::Lazy;
use propcrypt_core::{EncryptableEnvironment, MapPropertySource, ResolveError};
use propcrypt_domain::PropertyValue;
use propcrypt_infra::{config, init_tracing, EnvironmentPropertySource, LogFormat};

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const CONFIG_VARS: &[&str] = &[
    "PROPCRYPT_PASSWORD",
    "PROPCRYPT_KEY_OBTENTION_ITERATIONS",
    "PROPCRYPT_EXCLUDE_SOURCES",
    "PROPCRYPT_CACHE_ENABLED",
];

fn clear_config_vars() {
    for var in CONFIG_VARS {
        std::env::remove_var(var);
    }
}

fn environment_from_env() -> EncryptableEnvironment {
    let config = config::load().expect("config from environment");
    EncryptableEnvironment::builder()
        .config(config)
        .source(MapPropertySource::new("application").with_property("server.port", 8080i64))
        .source(EnvironmentPropertySource::new())
        .build()
        .expect("environment")
}

/// Validates decryption of environment variables with env-provided config.
///
/// Assertions:
/// - A value encrypted by the environment round-trips through a variable
/// - Relaxed names find the variable
/// - Updating the variable is picked up without a refresh
/// - `ENC(${VAR})` indirection reads another variable
#[test]
fn test_env_configured_environment_decrypts_variables() {
    let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
    let _ = init_tracing("propcrypt=debug", LogFormat::Pretty);
    clear_config_vars();
    std::env::set_var("PROPCRYPT_PASSWORD", "masterkey");
    std::env::set_var("PROPCRYPT_KEY_OBTENTION_ITERATIONS", "1000");

    let env = environment_from_env();
    let first = env.encrypt("s3cr3t").unwrap();
    assert!(first.starts_with("ENC(") && first.ends_with(')'));
    std::env::set_var("PROPCRYPT_IT_DB_PASSWORD", &first);

    assert_eq!(env.get_string("propcrypt_it.db.password").unwrap().as_deref(), Some("s3cr3t"));
    assert_eq!(env.get_property("server.port").unwrap(), Some(PropertyValue::Integer(8080)));

    let second = env.encrypt("rotated").unwrap();
    std::env::set_var("PROPCRYPT_IT_DB_PASSWORD", &second);
    assert_eq!(env.get_string("PROPCRYPT_IT_DB_PASSWORD").unwrap().as_deref(), Some("rotated"));

    std::env::set_var("PROPCRYPT_IT_INDIRECT", "ENC(${PROPCRYPT_IT_TARGET})");
    std::env::set_var("PROPCRYPT_IT_TARGET", "plain-target");
    assert_eq!(
        env.get_string("PROPCRYPT_IT_INDIRECT").unwrap().as_deref(),
        Some("plain-target")
    );

    for var in ["PROPCRYPT_IT_DB_PASSWORD", "PROPCRYPT_IT_INDIRECT", "PROPCRYPT_IT_TARGET"] {
        std::env::remove_var(var);
    }
    clear_config_vars();
}

/// Validates failure reporting and source exclusion.
///
/// Assertions:
/// - A malformed ciphertext reports the property and source
/// - Excluding the environment source returns the raw value
#[test]
fn test_env_decryption_failure_and_exclusion() {
    let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
    clear_config_vars();
    std::env::set_var("PROPCRYPT_PASSWORD", "masterkey");
    std::env::set_var("PROPCRYPT_CACHE_ENABLED", "false");
    std::env::set_var("PROPCRYPT_IT_BROKEN", "ENC(bm90IGEgY2lwaGVydGV4dA==)");

    let env = environment_from_env();
    match env.get_property("PROPCRYPT_IT_BROKEN") {
        Err(ResolveError::Decryption { target, .. }) => {
            assert_eq!(target.name, "PROPCRYPT_IT_BROKEN");
            assert_eq!(target.source, "systemEnvironment");
        }
        other => panic!("expected decryption failure, got {other:?}"),
    }
    assert!(env.cache_stats().is_empty());

    std::env::set_var("PROPCRYPT_EXCLUDE_SOURCES", "system.*");
    let env = environment_from_env();
    assert_eq!(
        env.get_string("PROPCRYPT_IT_BROKEN").unwrap().as_deref(),
        Some("ENC(bm90IGEgY2lwaGVydGV4dA==)")
    );

    std::env::remove_var("PROPCRYPT_IT_BROKEN");
    clear_config_vars();
}
