//! # propcrypt domain
//!
//! Configuration model and value types for encrypted configuration
//! resolution.
//!
//! This crate contains:
//! - Configuration structures with their defaults
//! - Property value and backend kind types
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other propcrypt crates
//! - Only external dependencies allowed
//! - Pure data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
