//! Non-caching resolving decorator

use std::sync::Arc;

use propcrypt_domain::PropertyValue;
use tracing::warn;

use super::PropertySource;
use crate::errors::ResolveResult;
use crate::filter::PropertyFilter;
use crate::resolver::PropertyResolver;

/// Resolves every lookup of its delegate, every time.
pub struct EncryptablePropertySource {
    delegate: Arc<dyn PropertySource>,
    resolver: Arc<dyn PropertyResolver>,
    filter: Arc<dyn PropertyFilter>,
}

impl EncryptablePropertySource {
    pub fn new(
        delegate: Arc<dyn PropertySource>,
        resolver: Arc<dyn PropertyResolver>,
        filter: Arc<dyn PropertyFilter>,
    ) -> Self {
        Self { delegate, resolver, filter }
    }

    pub fn delegate(&self) -> &Arc<dyn PropertySource> {
        &self.delegate
    }
}

impl PropertySource for EncryptablePropertySource {
    fn name(&self) -> &str {
        self.delegate.name()
    }

    fn get_property(&self, name: &str) -> ResolveResult<Option<PropertyValue>> {
        let raw = match self.delegate.get_property(name)? {
            Some(PropertyValue::Text(raw)) => raw,
            other => return Ok(other),
        };

        let source = self.delegate.name();
        if !self.filter.should_include(source, name) {
            return Ok(Some(PropertyValue::Text(raw)));
        }

        self.resolver
            .resolve(&raw)
            .map(|resolved| Some(PropertyValue::Text(resolved)))
            .map_err(|err| {
                warn!(
                    property = name,
                    source,
                    error_kind = err.kind(),
                    "Property resolution failed"
                );
                err.for_property(source, name)
            })
    }

    fn property_names(&self) -> Vec<String> {
        self.delegate.property_names()
    }

    fn contains(&self, name: &str) -> bool {
        self.delegate.contains(name)
    }

    fn refresh(&self) {
        self.delegate.refresh()
    }
}
