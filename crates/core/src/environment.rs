//! Encryptable environment
//!
//! An ordered set of property sources, each wrapped in a resolving
//! decorator. Earlier sources take precedence for name-based lookups.
//!
//! ```
//! use propcrypt_core::{EncryptableEnvironment, MapPropertySource};
//! use propcrypt_domain::PropCryptConfig;
//!
//! let mut config = PropCryptConfig::default();
//! config.encryptor.password = Some("masterkey".to_string());
//!
//! let env = EncryptableEnvironment::builder()
//!     .config(config)
//!     .source(MapPropertySource::new("application").with_property("db.user", "app"))
//!     .build()?;
//!
//! let wrapped = env.encrypt("hunter2")?;
//! assert!(wrapped.starts_with("ENC("));
//! assert_eq!(env.get_property("db.user")?.unwrap().to_string(), "app");
//! # Ok::<(), propcrypt_core::ResolveError>(())
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use propcrypt_common::cache::CacheStats;
use propcrypt_common::StringEncryptor;
use propcrypt_domain::{PropCryptConfig, PropCryptError, PropertyValue};
use tracing::{debug, info};

use crate::caching::CachingPropertySource;
use crate::detector::{DefaultPropertyDetector, PropertyDetector};
use crate::encryptor::{build_string_encryptor, REQUIRED_KEYS};
use crate::errors::{ResolveError, ResolveResult};
use crate::filter::{DefaultPropertyFilter, PropertyFilter};
use crate::resolver::{DefaultPropertyResolver, PropertyResolver, ValueWrapper};
use crate::source::{EncryptablePropertySource, PropertySource};

pub struct EncryptableEnvironment {
    sources: Vec<Arc<dyn PropertySource>>,
    encryptor: Option<Arc<dyn StringEncryptor>>,
    /// Wraps with the same detector resolution uses.
    wrapper: ValueWrapper,
}

impl fmt::Debug for EncryptableEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptableEnvironment")
            .field("sources", &self.source_names())
            .finish_non_exhaustive()
    }
}

impl EncryptableEnvironment {
    pub fn builder() -> EncryptableEnvironmentBuilder {
        EncryptableEnvironmentBuilder::default()
    }

    /// Resolve `name` from the source called `source`.
    ///
    /// # Errors
    /// `Domain(NotFound)` for an unknown source; decryption failures carry
    /// the property identity.
    pub fn resolve(&self, source: &str, name: &str) -> ResolveResult<Option<PropertyValue>> {
        let found = self.sources.iter().find(|s| s.name() == source).ok_or_else(|| {
            ResolveError::Domain(PropCryptError::NotFound(format!("property source '{}'", source)))
        })?;
        found.get_property(name)
    }

    /// First source defining `name` wins.
    pub fn get_property(&self, name: &str) -> ResolveResult<Option<PropertyValue>> {
        for source in &self.sources {
            if let Some(value) = source.get_property(name)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Resolved text of `name`, if it is defined as text.
    pub fn get_string(&self, name: &str) -> ResolveResult<Option<String>> {
        Ok(self.get_property(name)?.map(|value| value.to_string()))
    }

    /// Property names across all sources in precedence order, without
    /// duplicates.
    pub fn property_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.sources
            .iter()
            .flat_map(|source| source.property_names())
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }

    /// Every property resolved through `get_property`.
    pub fn resolved_properties(&self) -> ResolveResult<Vec<(String, PropertyValue)>> {
        let mut resolved = Vec::new();
        for name in self.property_names() {
            if let Some(value) = self.get_property(&name)? {
                resolved.push((name, value));
            }
        }
        Ok(resolved)
    }

    /// Drop cached resolutions in every source.
    pub fn refresh(&self) {
        for source in &self.sources {
            source.refresh();
        }
        info!(sources = self.sources.len(), "Environment refreshed");
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Cache statistics per caching source.
    pub fn cache_stats(&self) -> Vec<(String, CacheStats)> {
        self.sources
            .iter()
            .filter_map(|s| s.cache_stats().map(|stats| (s.name().to_string(), stats)))
            .collect()
    }

    /// Encrypt `plaintext` into a value ready to store, `ENC(...)` unless a
    /// custom detector defines another envelope.
    pub fn encrypt(&self, plaintext: &str) -> ResolveResult<String> {
        let encryptor = self
            .encryptor
            .as_ref()
            .ok_or_else(|| ResolveError::MissingConfiguration { keys: REQUIRED_KEYS.to_vec() })?;
        self.wrapper.encrypt_and_wrap(encryptor.as_ref(), plaintext)
    }
}

/// Builder for [`EncryptableEnvironment`].
///
/// Components not supplied are derived from the configuration. When a
/// resolver is supplied without an encryptor, no encryptor is built and
/// [`EncryptableEnvironment::encrypt`] is unavailable.
#[derive(Default)]
pub struct EncryptableEnvironmentBuilder {
    config: PropCryptConfig,
    sources: Vec<Arc<dyn PropertySource>>,
    detector: Option<Arc<dyn PropertyDetector>>,
    filter: Option<Arc<dyn PropertyFilter>>,
    resolver: Option<Arc<dyn PropertyResolver>>,
    encryptor: Option<Arc<dyn StringEncryptor>>,
}

impl EncryptableEnvironmentBuilder {
    pub fn config(mut self, config: PropCryptConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a source with lower precedence than those already added.
    pub fn source(self, source: impl PropertySource + 'static) -> Self {
        self.shared_source(Arc::new(source))
    }

    pub fn shared_source(mut self, source: Arc<dyn PropertySource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn detector(mut self, detector: Arc<dyn PropertyDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn filter(mut self, filter: Arc<dyn PropertyFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn PropertyResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn encryptor(mut self, encryptor: Arc<dyn StringEncryptor>) -> Self {
        self.encryptor = Some(encryptor);
        self
    }

    /// # Errors
    /// Fails when the filter patterns do not compile or the encryptor cannot
    /// be built from the configuration.
    pub fn build(self) -> ResolveResult<EncryptableEnvironment> {
        let config = self.config;

        let filter: Arc<dyn PropertyFilter> = match self.filter {
            Some(filter) => filter,
            None => Arc::new(DefaultPropertyFilter::new(&config.filter)?),
        };

        let encryptor = match (self.encryptor, &self.resolver) {
            (Some(encryptor), _) => Some(encryptor),
            (None, Some(_)) => None,
            (None, None) => {
                let built: Arc<dyn StringEncryptor> =
                    Arc::from(build_string_encryptor(&config.encryptor)?);
                Some(built)
            }
        };

        let detector: Arc<dyn PropertyDetector> = match self.detector {
            Some(detector) => detector,
            None => Arc::new(DefaultPropertyDetector::from_settings(&config.detector)),
        };

        let resolver: Arc<dyn PropertyResolver> = match (self.resolver, &encryptor) {
            (Some(resolver), _) => resolver,
            (None, Some(encryptor)) => Arc::new(DefaultPropertyResolver::new(
                Arc::clone(&detector),
                Arc::clone(encryptor),
            )),
            (None, None) => {
                return Err(ResolveError::MissingConfiguration { keys: REQUIRED_KEYS.to_vec() })
            }
        };

        let sources = self
            .sources
            .into_iter()
            .map(|source| -> Arc<dyn PropertySource> {
                if config.cache.enabled {
                    Arc::new(CachingPropertySource::new(source, resolver.clone(), filter.clone()))
                } else {
                    Arc::new(EncryptablePropertySource::new(
                        source,
                        resolver.clone(),
                        filter.clone(),
                    ))
                }
            })
            .collect::<Vec<_>>();

        debug!(
            sources = sources.len(),
            caching = config.cache.enabled,
            "Encryptable environment built"
        );

        Ok(EncryptableEnvironment {
            sources,
            encryptor,
            wrapper: ValueWrapper::new(detector),
        })
    }
}
