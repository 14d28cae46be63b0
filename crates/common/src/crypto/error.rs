//! Crypto error types
//!
//! Failures raised while loading key material or running a cipher backend.
//! Integrates with the common error system through `ErrorClassification`.

use thiserror::Error;

use crate::error::{CommonError, ErrorClassification, ErrorSeverity};

/// Crypto error type
#[derive(Debug, Clone, Error)]
pub enum CryptoError {
    /// None of the configured acquisition paths produced key material, or the
    /// configured resource could not be read.
    #[error("Key material could not be loaded: {0}")]
    KeyLoad(String),

    /// Ciphertext frame is truncated or its header is inconsistent.
    #[error("Malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    /// Authenticated decryption rejected the tag.
    #[error("Authentication tag mismatch: ciphertext was tampered with or the key is wrong")]
    AuthenticationFailed,

    /// Key material was loaded but is unusable for the backend.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// RSA plaintext exceeds what a single block can hold.
    #[error("Message too long for RSA key: {len} bytes exceeds maximum of {max}")]
    MessageTooLong { len: usize, max: usize },

    #[error(transparent)]
    Common(#[from] CommonError),
}

/// Crypto result type
pub type CryptoResult<T> = Result<T, CryptoError>;

impl ErrorClassification for CryptoError {
    /// Crypto failures are deterministic: the same key and input fail the same
    /// way on every attempt, so nothing here is retryable.
    fn is_retryable(&self) -> bool {
        match self {
            Self::Common(common_err) => common_err.is_retryable(),
            _ => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::KeyLoad(_) => ErrorSeverity::Critical,
            Self::MalformedCiphertext(_) => ErrorSeverity::Error,
            Self::AuthenticationFailed => ErrorSeverity::Critical,
            Self::InvalidKey(_) => ErrorSeverity::Critical,
            Self::UnsupportedAlgorithm(_) => ErrorSeverity::Error,
            Self::Encryption(_) => ErrorSeverity::Error,
            Self::Decryption(_) => ErrorSeverity::Error,
            Self::MessageTooLong { .. } => ErrorSeverity::Error,
            Self::Common(common_err) => common_err.severity(),
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::KeyLoad(_) | Self::AuthenticationFailed | Self::InvalidKey(_))
            || matches!(self, Self::Common(err) if err.is_critical())
    }

    fn retry_after(&self) -> Option<std::time::Duration> {
        match self {
            Self::Common(common_err) => common_err.retry_after(),
            _ => None,
        }
    }
}

impl CryptoError {
    /// Short machine-readable name used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::KeyLoad(_) => "key_load",
            Self::MalformedCiphertext(_) => "malformed_ciphertext",
            Self::AuthenticationFailed => "authentication_failed",
            Self::InvalidKey(_) => "invalid_key",
            Self::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            Self::Encryption(_) => "encryption",
            Self::Decryption(_) => "decryption",
            Self::MessageTooLong { .. } => "message_too_long",
            Self::Common(err) => err.kind(),
        }
    }
}

impl From<std::io::Error> for CryptoError {
    fn from(err: std::io::Error) -> Self {
        Self::KeyLoad(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for crypto::error.
    use super::*;

    /// Validates `CryptoError` behavior for the error display scenario.
    ///
    /// Assertions:
    /// - Confirms `MessageTooLong` renders both lengths.
    /// - Confirms `KeyLoad` renders its cause.
    #[test]
    fn test_error_display() {
        let err = CryptoError::MessageTooLong { len: 300, max: 245 };
        assert_eq!(
            err.to_string(),
            "Message too long for RSA key: 300 bytes exceeds maximum of 245"
        );

        let err = CryptoError::KeyLoad("no key configured".to_string());
        assert_eq!(err.to_string(), "Key material could not be loaded: no key configured");
    }

    /// Validates the classification of key-loading and tamper errors.
    ///
    /// Assertions:
    /// - Ensures key loading failures are critical and never retryable.
    /// - Ensures malformed input is not critical.
    #[test]
    fn test_classification() {
        let key_load = CryptoError::KeyLoad("missing".to_string());
        assert!(key_load.is_critical());
        assert!(!key_load.is_retryable());
        assert_eq!(key_load.severity(), ErrorSeverity::Critical);

        assert!(CryptoError::AuthenticationFailed.is_critical());

        let malformed = CryptoError::MalformedCiphertext("short".to_string());
        assert!(!malformed.is_critical());
        assert_eq!(malformed.severity(), ErrorSeverity::Error);
    }

    /// Validates the `From<CommonError>` conversion scenario.
    ///
    /// Assertions:
    /// - Confirms the common error's kind is preserved.
    #[test]
    fn test_common_conversion() {
        let err: CryptoError = CommonError::encoding("base64", "bad").into();
        assert_eq!(err.kind(), "encoding");
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }
}
