//! Caching resolving decorator
//!
//! Resolved values are memoized per property name together with the raw
//! value they were computed from. A cached entry only answers a lookup while
//! the delegate still returns that same raw value; a changed raw value is
//! resolved again and supersedes the entry. [`PropertySource::refresh`]
//! drops every entry.
//!
//! Concurrent misses for one name may resolve in parallel. Stores use
//! insert-if-absent, or replace-if-unchanged against the entry observed
//! before resolving, so a slower thread never overwrites a newer entry.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use propcrypt_common::cache::{CacheStats, MetricsCollector};
use propcrypt_domain::PropertyValue;
use tracing::{debug, info, warn};

use crate::errors::ResolveResult;
use crate::filter::PropertyFilter;
use crate::resolver::PropertyResolver;
use crate::source::PropertySource;

/// A resolved value and the raw value it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedValue {
    pub original: String,
    pub resolved: String,
}

pub struct CachingPropertySource {
    delegate: Arc<dyn PropertySource>,
    resolver: Arc<dyn PropertyResolver>,
    filter: Arc<dyn PropertyFilter>,
    cache: DashMap<String, CachedValue>,
    metrics: MetricsCollector,
}

impl CachingPropertySource {
    pub fn new(
        delegate: Arc<dyn PropertySource>,
        resolver: Arc<dyn PropertyResolver>,
        filter: Arc<dyn PropertyFilter>,
    ) -> Self {
        Self { delegate, resolver, filter, cache: DashMap::new(), metrics: MetricsCollector::new() }
    }

    pub fn delegate(&self) -> &Arc<dyn PropertySource> {
        &self.delegate
    }

    /// Current counters and number of cached entries.
    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot(self.cache.len())
    }

    pub fn cached(&self, name: &str) -> Option<CachedValue> {
        self.cache.get(name).map(|entry| entry.value().clone())
    }

    fn store(&self, name: &str, prior: Option<CachedValue>, value: CachedValue) {
        match self.cache.entry(name.to_string()) {
            Entry::Vacant(vacant) => {
                if prior.is_none() {
                    vacant.insert(value);
                    self.metrics.record_insert();
                }
            }
            Entry::Occupied(mut occupied) => {
                if prior.as_ref() == Some(occupied.get()) {
                    occupied.insert(value);
                    self.metrics.record_supersede();
                    let source = self.delegate.name();
                    debug!(property = name, source, "Cache entry superseded");
                }
            }
        }
    }
}

impl PropertySource for CachingPropertySource {
    fn name(&self) -> &str {
        self.delegate.name()
    }

    fn get_property(&self, name: &str) -> ResolveResult<Option<PropertyValue>> {
        let raw = match self.delegate.get_property(name)? {
            Some(PropertyValue::Text(raw)) => raw,
            other => return Ok(other),
        };

        let prior = self.cached(name);
        if let Some(cached) = prior.as_ref().filter(|cached| cached.original == raw) {
            self.metrics.record_hit();
            return Ok(Some(PropertyValue::Text(cached.resolved.clone())));
        }
        self.metrics.record_miss();

        let source = self.delegate.name();
        if !self.filter.should_include(source, name) {
            return Ok(Some(PropertyValue::Text(raw)));
        }

        let resolved = self.resolver.resolve(&raw).map_err(|err| {
            warn!(property = name, source, error_kind = err.kind(), "Property resolution failed");
            err.for_property(source, name)
        })?;

        self.store(name, prior, CachedValue { original: raw, resolved: resolved.clone() });
        Ok(Some(PropertyValue::Text(resolved)))
    }

    fn property_names(&self) -> Vec<String> {
        self.delegate.property_names()
    }

    fn contains(&self, name: &str) -> bool {
        self.delegate.contains(name)
    }

    fn refresh(&self) {
        let entries = self.cache.len();
        self.cache.clear();
        self.metrics.record_refresh();
        info!(source = self.delegate.name(), entries, "Resolved value cache cleared");
        self.delegate.refresh();
    }

    fn cache_stats(&self) -> Option<CacheStats> {
        Some(self.stats())
    }
}
