//! # propcrypt infra
//!
//! Adapters with side effects: configuration loading from the process
//! environment and files, the environment-variable property source, and
//! tracing subscriber setup.

pub mod config;
pub mod observability;
pub mod sources;

pub use config::{find_config_file, load, load_from_env, load_from_file};
pub use observability::{init_tracing, LogFormat};
pub use sources::EnvironmentPropertySource;
