//! Inclusion policy for property resolution
//!
//! Patterns are regular expressions matched against the whole source or
//! property name. Exclusions win over inclusions. With no include patterns
//! everything not excluded participates; otherwise a source or name must
//! match at least one include pattern.

use propcrypt_domain::FilterSettings;
use regex::Regex;

use crate::errors::{ResolveError, ResolveResult};

/// Decides whether resolution is attempted for a property. Never fails.
pub trait PropertyFilter: Send + Sync {
    fn should_include(&self, source: &str, name: &str) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct DefaultPropertyFilter {
    include_sources: Vec<Regex>,
    exclude_sources: Vec<Regex>,
    include_names: Vec<Regex>,
    exclude_names: Vec<Regex>,
}

impl DefaultPropertyFilter {
    /// Compile every pattern in `settings`.
    ///
    /// # Errors
    /// Returns [`ResolveError::InvalidConfig`] naming the list that holds an
    /// invalid pattern.
    pub fn new(settings: &FilterSettings) -> ResolveResult<Self> {
        Ok(Self {
            include_sources: compile("filter.include_sources", &settings.include_sources)?,
            exclude_sources: compile("filter.exclude_sources", &settings.exclude_sources)?,
            include_names: compile("filter.include_names", &settings.include_names)?,
            exclude_names: compile("filter.exclude_names", &settings.exclude_names)?,
        })
    }

    /// A filter without rules: every property is included.
    pub fn include_all() -> Self {
        Self::default()
    }

    fn has_rules(&self) -> bool {
        !(self.include_sources.is_empty()
            && self.exclude_sources.is_empty()
            && self.include_names.is_empty()
            && self.exclude_names.is_empty())
    }
}

impl PropertyFilter for DefaultPropertyFilter {
    fn should_include(&self, source: &str, name: &str) -> bool {
        if !self.has_rules() {
            return true;
        }
        if any_match(&self.exclude_sources, source) || any_match(&self.exclude_names, name) {
            return false;
        }
        (self.include_sources.is_empty() && self.include_names.is_empty())
            || any_match(&self.include_sources, source)
            || any_match(&self.include_names, name)
    }
}

fn compile(field: &str, patterns: &[String]) -> ResolveResult<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(&format!("^(?:{})$", pattern))
                .map_err(|e| ResolveError::invalid_config(field, format!("'{}': {}", pattern, e)))
        })
        .collect()
}

fn any_match(patterns: &[Regex], value: &str) -> bool {
    patterns.iter().any(|p| p.is_match(value))
}
