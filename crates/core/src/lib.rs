//! # propcrypt core
//!
//! Resolution of encrypted configuration values.
//!
//! This crate contains:
//! - Detection of wrapped values and the inclusion filter
//! - The value resolver and the `ENC(...)` wrapper helper
//! - Property source ports with resolving and caching decorators
//! - The encryptor factory and the encryptable environment
//!
//! ## Architecture Principles
//! - Only depends on `propcrypt-common` and `propcrypt-domain`
//! - No process environment or file adapters (see `propcrypt-infra`)
//! - Collaborators are traits so tests and embedders can substitute them

pub mod caching;
pub mod detector;
pub mod encryptor;
pub mod environment;
pub mod errors;
pub mod filter;
pub mod resolver;
pub mod source;

pub use caching::{CachedValue, CachingPropertySource};
pub use detector::{DefaultPropertyDetector, PropertyDetector};
pub use encryptor::{build_cipher, build_string_encryptor, select_backend};
pub use environment::{EncryptableEnvironment, EncryptableEnvironmentBuilder};
pub use errors::{PropertyTarget, ResolveError, ResolveResult};
pub use filter::{DefaultPropertyFilter, PropertyFilter};
pub use resolver::{DefaultPropertyResolver, PropertyResolver, ValueWrapper};
pub use source::{EncryptablePropertySource, MapPropertySource, PropertySource};
