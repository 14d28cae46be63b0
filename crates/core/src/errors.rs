//! Resolution error types
//!
//! `ResolveError` is what callers of a property source or the environment
//! see. Backend failures raised while resolving a named property are
//! attributed to that property through [`ResolveError::for_property`].

use std::fmt;
use std::time::Duration;

use propcrypt_common::{CryptoError, ErrorClassification, ErrorSeverity};
use propcrypt_domain::PropCryptError;
use thiserror::Error;

/// Identity of the property whose resolution failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTarget {
    pub source: String,
    pub name: String,
}

impl PropertyTarget {
    pub fn new(source: impl Into<String>, name: impl Into<String>) -> Self {
        Self { source: source.into(), name: name.into() }
    }
}

impl fmt::Display for PropertyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' (source '{}')", self.name, self.source)
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    /// No cipher backend could be selected from the configuration.
    #[error("No encryptor configured: set one of {}", keys.join(", "))]
    MissingConfiguration { keys: Vec<&'static str> },

    #[error("Invalid configuration for '{field}': {message}")]
    InvalidConfig { field: String, message: String },

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("Decryption failed for property {target}: check password/algorithm configuration")]
    Decryption {
        target: PropertyTarget,
        #[source]
        cause: CryptoError,
    },

    /// `ENC(${VAR})` referenced a variable that is not set.
    #[error("Environment variable '{variable}' is not set{}", referenced_by(.target))]
    UnresolvedVariable { variable: String, target: Option<PropertyTarget> },

    #[error(transparent)]
    Domain(#[from] PropCryptError),
}

pub type ResolveResult<T> = Result<T, ResolveError>;

fn referenced_by(target: &Option<PropertyTarget>) -> String {
    target.as_ref().map(|t| format!(" (referenced by property {t})")).unwrap_or_default()
}

impl ResolveError {
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig { field: field.into(), message: message.into() }
    }

    pub fn unresolved_variable(variable: impl Into<String>) -> Self {
        Self::UnresolvedVariable { variable: variable.into(), target: None }
    }

    /// Attach the property identity to a resolution failure.
    ///
    /// `Crypto` becomes `Decryption`; an unattributed `UnresolvedVariable`
    /// gains its target. Configuration errors are not property specific and
    /// pass through.
    pub fn for_property(self, source: &str, name: &str) -> Self {
        match self {
            Self::Crypto(cause) => {
                Self::Decryption { target: PropertyTarget::new(source, name), cause }
            }
            Self::UnresolvedVariable { variable, target: None } => Self::UnresolvedVariable {
                variable,
                target: Some(PropertyTarget::new(source, name)),
            },
            other => other,
        }
    }

    /// Short machine-readable name used as a structured log field.
    ///
    /// Backend failures report the crypto kind, so a wrong password
    /// (`decryption`) reads differently from a missing key (`key_load`).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingConfiguration { .. } => "missing_configuration",
            Self::InvalidConfig { .. } => "invalid_config",
            Self::Crypto(err) | Self::Decryption { cause: err, .. } => err.kind(),
            Self::UnresolvedVariable { .. } => "unresolved_variable",
            Self::Domain(_) => "domain",
        }
    }

    /// The property a resolution failure belongs to.
    pub fn target(&self) -> Option<&PropertyTarget> {
        match self {
            Self::Decryption { target, .. } => Some(target),
            Self::UnresolvedVariable { target, .. } => target.as_ref(),
            _ => None,
        }
    }
}

impl ErrorClassification for ResolveError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Crypto(err) | Self::Decryption { cause: err, .. } => err.is_retryable(),
            _ => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingConfiguration { .. } | Self::InvalidConfig { .. } => {
                ErrorSeverity::Critical
            }
            Self::Crypto(err) | Self::Decryption { cause: err, .. } => err.severity(),
            Self::UnresolvedVariable { .. } => ErrorSeverity::Error,
            Self::Domain(PropCryptError::NotFound(_)) => ErrorSeverity::Info,
            Self::Domain(_) => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        match self {
            Self::MissingConfiguration { .. } | Self::InvalidConfig { .. } => true,
            Self::Crypto(err) | Self::Decryption { cause: err, .. } => err.is_critical(),
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}
