//! Error types for configuration handling

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration-level error for propcrypt
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum PropCryptError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, PropCryptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serializes_tagged() {
        let err = PropCryptError::Config("bad pool size".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"type":"Config","message":"bad pool size"}"#);
        assert_eq!(err.to_string(), "Configuration error: bad pool size");
    }
}
