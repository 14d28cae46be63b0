//! Property source adapters over process state.

pub mod env;

pub use env::EnvironmentPropertySource;
