//! Property sources
//!
//! A [`PropertySource`] is a named key/value lookup. Plain sources
//! ([`MapPropertySource`], the environment source in `propcrypt-infra`) hand
//! out raw values; decorators ([`EncryptablePropertySource`] and
//! [`crate::caching::CachingPropertySource`]) wrap another source and hand out
//! resolved values under the same name.

use std::sync::Arc;

use propcrypt_common::cache::CacheStats;
use propcrypt_domain::PropertyValue;

use crate::errors::ResolveResult;

pub mod encryptable;
pub mod map;

pub use encryptable::EncryptablePropertySource;
pub use map::MapPropertySource;

pub trait PropertySource: Send + Sync {
    fn name(&self) -> &str;

    /// Look up a property. `Ok(None)` when the source does not define it.
    fn get_property(&self, name: &str) -> ResolveResult<Option<PropertyValue>>;

    /// Names defined by this source.
    fn property_names(&self) -> Vec<String>;

    fn contains(&self, name: &str) -> bool {
        self.property_names().iter().any(|n| n == name)
    }

    /// Drop any memoized state. Decorators forward to their delegate.
    fn refresh(&self) {}

    /// Cache counters for caching decorators.
    fn cache_stats(&self) -> Option<CacheStats> {
        None
    }
}

impl<T: PropertySource + ?Sized> PropertySource for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get_property(&self, name: &str) -> ResolveResult<Option<PropertyValue>> {
        (**self).get_property(name)
    }

    fn property_names(&self) -> Vec<String> {
        (**self).property_names()
    }

    fn contains(&self, name: &str) -> bool {
        (**self).contains(name)
    }

    fn refresh(&self) {
        (**self).refresh()
    }

    fn cache_stats(&self) -> Option<CacheStats> {
        (**self).cache_stats()
    }
}
