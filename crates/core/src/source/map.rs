//! In-memory property source

use std::collections::BTreeMap;

use parking_lot::RwLock;
use propcrypt_domain::PropertyValue;

use super::PropertySource;
use crate::errors::ResolveResult;

/// Mutable in-memory source.
///
/// Values can be replaced while decorators hold the source, which is how
/// reloads are modelled: a caching decorator notices the new raw value on
/// its next lookup.
#[derive(Debug, Default)]
pub struct MapPropertySource {
    name: String,
    values: RwLock<BTreeMap<String, PropertyValue>>,
}

impl MapPropertySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), values: RwLock::new(BTreeMap::new()) }
    }

    pub fn from_pairs<I, K, V>(name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        let values = pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { name: name.into(), values: RwLock::new(values) }
    }

    pub fn with_property(self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Insert or replace a value, returning the previous one.
    pub fn set(
        &self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.values.write().insert(name.into(), value.into())
    }

    pub fn remove(&self, name: &str) -> Option<PropertyValue> {
        self.values.write().remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_property(&self, name: &str) -> ResolveResult<Option<PropertyValue>> {
        Ok(self.values.read().get(name).cloned())
    }

    fn property_names(&self) -> Vec<String> {
        self.values.read().keys().cloned().collect()
    }

    fn contains(&self, name: &str) -> bool {
        self.values.read().contains_key(name)
    }
}
