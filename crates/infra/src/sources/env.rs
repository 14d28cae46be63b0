//! Process environment property source
//!
//! Reads variables from the live process environment on every lookup, so a
//! caching decorator sees a changed variable as a changed raw value.
//!
//! Lookups try the exact name first and then the relaxed form, where
//! `db.password` or `db-password` also matches `DB_PASSWORD`.

use propcrypt_core::{PropertySource, ResolveResult};
use propcrypt_domain::PropertyValue;

pub const SYSTEM_ENVIRONMENT: &str = "systemEnvironment";

#[derive(Debug, Clone)]
pub struct EnvironmentPropertySource {
    name: String,
}

impl EnvironmentPropertySource {
    pub fn new() -> Self {
        Self::named(SYSTEM_ENVIRONMENT)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for EnvironmentPropertySource {
    fn default() -> Self {
        Self::new()
    }
}

/// `db.password` -> `DB_PASSWORD`
fn relaxed_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '.' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

fn read_var(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) => Some(value),
        Err(std::env::VarError::NotPresent) => None,
        Err(std::env::VarError::NotUnicode(_)) => {
            tracing::debug!(variable = key, "Skipping non-unicode environment variable");
            None
        }
    }
}

impl PropertySource for EnvironmentPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_property(&self, name: &str) -> ResolveResult<Option<PropertyValue>> {
        if name.is_empty() || name.contains('=') || name.contains('\0') {
            return Ok(None);
        }
        let value = read_var(name).or_else(|| {
            let relaxed = relaxed_name(name);
            (relaxed != name).then(|| read_var(&relaxed)).flatten()
        });
        Ok(value.map(PropertyValue::Text))
    }

    fn property_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::env::vars_os()
            .filter_map(|(key, _)| key.into_string().ok())
            .collect();
        names.sort();
        names
    }

    fn contains(&self, name: &str) -> bool {
        matches!(self.get_property(name), Ok(Some(_)))
    }
}
