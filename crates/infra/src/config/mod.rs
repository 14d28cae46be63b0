//! Configuration loading
//!
//! Builds a [`propcrypt_domain::PropCryptConfig`] from `PROPCRYPT_*`
//! environment variables or from a TOML/JSON file.

pub mod loader;

// Re-export commonly used items
pub use loader::{find_config_file, load, load_from_env, load_from_file};
