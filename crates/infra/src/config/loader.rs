//! Configuration loader
//!
//! Loads propcrypt configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If no encryptor key material is set there, falls back to a file
//! 3. Searches multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! Every field of the configuration has a `PROPCRYPT_` variable named after
//! it in upper case, for example:
//! - `PROPCRYPT_PASSWORD`: PBE password (selects the PBE backend)
//! - `PROPCRYPT_ALGORITHM`: PBE algorithm or AES/GCM transformation
//! - `PROPCRYPT_KEY_OBTENTION_ITERATIONS`, `PROPCRYPT_POOL_SIZE`
//! - `PROPCRYPT_PRIVATE_KEY_LOCATION`, `PROPCRYPT_PUBLIC_KEY_FORMAT`, ...
//! - `PROPCRYPT_GCM_SECRET_KEY_STRING`, `PROPCRYPT_GCM_SECRET_KEY_PASSWORD`,
//!   ...
//! - `PROPCRYPT_PREFIX`, `PROPCRYPT_SUFFIX`: detection envelope
//! - `PROPCRYPT_INCLUDE_NAMES`, `PROPCRYPT_EXCLUDE_SOURCES`, ...:
//!   comma-separated filter patterns
//! - `PROPCRYPT_CACHE_ENABLED`: whether resolved values are cached
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./propcrypt.toml` or `./propcrypt.json` (current working directory)
//! 2. `./config/propcrypt.toml` or `./config/propcrypt.json`
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use propcrypt_domain::constants::ENV_PREFIX;
use propcrypt_domain::{PropCryptConfig, PropCryptError, Result};

const FILE_NAMES: [&str; 4] =
    ["propcrypt.toml", "propcrypt.json", "config/propcrypt.toml", "config/propcrypt.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If they configure no
/// encryptor key material, falls back to loading from a config file.
///
/// # Errors
/// Returns `PropCryptError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
pub fn load() -> Result<PropCryptConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Environment incomplete, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from `PROPCRYPT_*` environment variables
///
/// Unset variables keep their defaults. At least one variable that selects
/// a cipher backend (password, RSA key or GCM key) must be present.
///
/// # Errors
/// Returns `PropCryptError::Config` when no backend is configured or a
/// numeric variable does not parse.
pub fn load_from_env() -> Result<PropCryptConfig> {
    let mut config = PropCryptConfig::default();

    let enc = &mut config.encryptor;
    set_opt(&mut enc.password, "PASSWORD");
    set_string(&mut enc.algorithm, "ALGORITHM");
    set_parsed(&mut enc.key_obtention_iterations, "KEY_OBTENTION_ITERATIONS")?;
    set_parsed(&mut enc.pool_size, "POOL_SIZE")?;
    set_opt(&mut enc.provider_name, "PROVIDER_NAME");
    set_string(&mut enc.salt_generator, "SALT_GENERATOR");
    set_string(&mut enc.iv_generator, "IV_GENERATOR");
    set_string(&mut enc.string_output_type, "STRING_OUTPUT_TYPE");
    set_opt(&mut enc.private_key_string, "PRIVATE_KEY_STRING");
    set_opt(&mut enc.private_key_location, "PRIVATE_KEY_LOCATION");
    set_string(&mut enc.private_key_format, "PRIVATE_KEY_FORMAT");
    set_opt(&mut enc.public_key_string, "PUBLIC_KEY_STRING");
    set_opt(&mut enc.public_key_location, "PUBLIC_KEY_LOCATION");
    set_string(&mut enc.public_key_format, "PUBLIC_KEY_FORMAT");
    set_opt(&mut enc.gcm_secret_key_string, "GCM_SECRET_KEY_STRING");
    set_opt(&mut enc.gcm_secret_key_location, "GCM_SECRET_KEY_LOCATION");
    set_opt(&mut enc.gcm_secret_key_password, "GCM_SECRET_KEY_PASSWORD");
    set_string(&mut enc.gcm_secret_key_salt, "GCM_SECRET_KEY_SALT");
    set_string(&mut enc.gcm_secret_key_algorithm, "GCM_SECRET_KEY_ALGORITHM");
    set_parsed(&mut enc.gcm_secret_key_iterations, "GCM_SECRET_KEY_ITERATIONS")?;

    if !(enc.has_password() || enc.has_rsa_keys() || enc.has_gcm_key()) {
        return Err(PropCryptError::Config(format!(
            "No encryptor key material in environment: set {ENV_PREFIX}PASSWORD, an RSA key \
             or a GCM secret key"
        )));
    }

    set_string(&mut config.detector.prefix, "PREFIX");
    set_string(&mut config.detector.suffix, "SUFFIX");

    let filter = &mut config.filter;
    set_list(&mut filter.include_sources, "INCLUDE_SOURCES");
    set_list(&mut filter.exclude_sources, "EXCLUDE_SOURCES");
    set_list(&mut filter.include_names, "INCLUDE_NAMES");
    set_list(&mut filter.exclude_names, "EXCLUDE_NAMES");

    config.cache.enabled = env_bool(&env_key("CACHE_ENABLED"), config.cache.enabled);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations. Format is detected
/// by file extension.
///
/// # Errors
/// Returns `PropCryptError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<PropCryptConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PropCryptError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            PropCryptError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PropCryptError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, by file extension.
fn parse_config(contents: &str, path: &Path) -> Result<PropCryptConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PropCryptError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PropCryptError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(PropCryptError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Search the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    let exe_dir = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf));
    roots.extend(exe_dir);

    roots
        .iter()
        .flat_map(|root| FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_key(suffix: &str) -> String {
    format!("{ENV_PREFIX}{suffix}")
}

/// Non-empty value of `PROPCRYPT_<suffix>`.
fn env_value(suffix: &str) -> Option<String> {
    std::env::var(env_key(suffix)).ok().filter(|v| !v.trim().is_empty())
}

fn set_opt(field: &mut Option<String>, suffix: &str) {
    if let Some(value) = env_value(suffix) {
        *field = Some(value);
    }
}

fn set_string(field: &mut String, suffix: &str) {
    if let Some(value) = env_value(suffix) {
        *field = value;
    }
}

fn set_parsed<T>(field: &mut T, suffix: &str) -> Result<()>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(value) = env_value(suffix) {
        *field = value.trim().parse().map_err(|e| {
            PropCryptError::Config(format!("Invalid {}: {}", env_key(suffix), e))
        })?;
    }
    Ok(())
}

/// Comma-separated list; empty items are dropped.
fn set_list(field: &mut Vec<String>, suffix: &str) {
    if let Some(value) = env_value(suffix) {
        *field = value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
