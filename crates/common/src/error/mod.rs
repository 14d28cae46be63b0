//! Shared error vocabulary
//!
//! - [`CommonError`]: failures that several modules hit in the same shape
//!   (bad settings, undecodable text, unreadable key files, rejected inputs).
//!   Module errors such as `CryptoError` wrap it with `#[from]` rather than
//!   repeating these variants.
//! - [`ErrorClassification`]: retryability and severity, implemented by every
//!   error enum in the workspace so callers can decide how loudly to fail.
//! - [`ErrorSeverity`]: ordered levels used as a structured log field.
//!
//! Key material and ciphertext problems are deterministic. Nothing in this
//! module is retryable.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

pub type CommonResult<T> = Result<T, CommonError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommonError {
    /// A setting has a value the crate cannot use.
    #[error("invalid setting '{field}': {message}")]
    Config { field: String, message: String },

    /// Text in base64, hex or UTF-8 could not be decoded.
    #[error("{format} decoding failed: {message}")]
    Encoding { format: String, message: String },

    /// Reading a key resource failed.
    #[error("I/O failure during {operation}: {message}")]
    Io { operation: String, message: String },

    #[error("invalid {field}{}: {message}", offending(.value))]
    Validation { field: String, message: String, value: Option<String> },
}

fn offending(value: &Option<String>) -> String {
    value.as_ref().map(|v| format!(" '{v}'")).unwrap_or_default()
}

impl CommonError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config { field: field.into(), message: message.into() }
    }

    pub fn encoding(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encoding { format: format.into(), message: message.into() }
    }

    pub fn io(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io { operation: operation.into(), message: message.into() }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into(), value: None }
    }

    /// Validation failure that echoes the rejected value. Never pass secrets.
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation { field: field.into(), message: message.into(), value: Some(value.into()) }
    }

    /// Short machine-readable name used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Encoding { .. } => "encoding",
            Self::Io { .. } => "io",
            Self::Validation { .. } => "validation",
        }
    }
}

impl ErrorClassification for CommonError {
    fn is_retryable(&self) -> bool {
        false
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Validation { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl From<std::io::Error> for CommonError {
    fn from(err: std::io::Error) -> Self {
        Self::io("read", err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for CommonError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::encoding("UTF-8", err.to_string())
    }
}

/// Uniform classification across the workspace's error enums.
///
/// Wrapping enums delegate to the wrapped error:
///
/// ```rust,ignore
/// fn severity(&self) -> ErrorSeverity {
///     match self {
///         Self::Sealed => ErrorSeverity::Critical,
///         Self::Common(e) => e.severity(),
///     }
/// }
/// ```
pub trait ErrorClassification {
    /// Whether the same call may succeed if attempted again.
    fn is_retryable(&self) -> bool;

    fn severity(&self) -> ErrorSeverity;

    /// Tampered ciphertext, unusable key material, broken invariants.
    fn is_critical(&self) -> bool;

    fn retry_after(&self) -> Option<Duration>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for error.
    use super::*;

    /// Validates rendered messages.
    ///
    /// Assertions:
    /// - Confirms the field name appears in configuration errors.
    /// - Confirms the rejected value is quoted only when supplied.
    #[test]
    fn test_display() {
        let err = CommonError::config("encryptor.algorithm", "unknown algorithm");
        assert_eq!(err.to_string(), "invalid setting 'encryptor.algorithm': unknown algorithm");

        assert_eq!(
            CommonError::encoding("base64", "invalid padding").to_string(),
            "base64 decoding failed: invalid padding"
        );
        assert_eq!(
            CommonError::validation("pool_size", "must be at least 1").to_string(),
            "invalid pool_size: must be at least 1"
        );
        assert_eq!(
            CommonError::invalid_value("salt_generator", "pepper", "unknown").to_string(),
            "invalid salt_generator 'pepper': unknown"
        );
    }

    /// Validates the severity matrix.
    ///
    /// Assertions:
    /// - Confirms no common error is critical.
    /// - Ensures no common error is retryable.
    #[test]
    fn test_severity_matrix() {
        assert_eq!(CommonError::encoding("hex", "odd").severity(), ErrorSeverity::Error);
        assert!(!CommonError::encoding("hex", "odd").is_critical());
        assert_eq!(CommonError::validation("x", "y").severity(), ErrorSeverity::Warning);
        assert!(!CommonError::io("read_key", "disk").is_retryable());
        assert!(!CommonError::config("a", "b").is_critical());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.key");
        let err: CommonError = io.into();
        assert_eq!(err.kind(), "io");
        assert!(err.to_string().contains("missing.key"));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Info < ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
    }
}
