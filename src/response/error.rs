//! Response configuration and serialization errors.

use thiserror::Error;

/// A static response declaration that cannot be accepted at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Status code outside 100..=599.
    #[error("invalid status code {code} (expected 100-599)")]
    InvalidStatusCode { code: u16 },

    /// Content type that is not a valid MIME type or not registered.
    #[error("unregistered content type '{content_type}'")]
    UnregisteredContentType { content_type: String },

    /// Header declaration with an empty name.
    #[error("header names must not be empty")]
    EmptyHeaderName,

    /// Allow-list naming the same header twice.
    #[error("header '{name}' is listed more than once")]
    DuplicateAllowedHeader { name: String },
}

/// A value that cannot be represented in the resolved content type.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// Rendered body exceeds the configured ceiling.
    #[error("body of {size} bytes exceeds the {limit} byte limit")]
    BodyTooLarge { size: usize, limit: usize },

    /// JSON encoding failed.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Dynamic status code that cannot be written on the wire.
    #[error("status code {0} cannot be sent")]
    InvalidStatusCode(u16),
}

/// Result type for response configuration.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigurationError::InvalidStatusCode { code: 700 };
        assert_eq!(err.to_string(), "invalid status code 700 (expected 100-599)");

        let err = SerializeError::BodyTooLarge { size: 12, limit: 10 };
        assert!(err.to_string().contains("12 bytes"));
    }
}
