//! Error types for completion provider operations.

use std::fmt;

/// Universal error type that abstracts provider-specific errors into common variants.
///
/// This unified error type eliminates the need for caller-level error mapping
/// and provides consistent error handling across all completion providers.
/// All provider implementations should map their native errors to these variants,
/// preserving context while maintaining a provider-agnostic interface.
#[derive(Debug)]
pub enum Error {
    /// API key authentication failures. Indicates credentials are invalid,
    /// expired, or lack access to the requested model tier.
    Authentication(String),

    /// Network connectivity issues, DNS failures, or connection timeouts.
    /// These errors are typically transient and may benefit from retry logic.
    Network(String),

    /// Invalid parameters, missing required fields, or malformed configuration.
    /// These errors indicate a programming error and should be fixed at development time.
    Configuration(String),

    /// Provider-specific business logic errors (e.g., model not found, content refused).
    /// These are provider-level failures that may require user intervention.
    Provider(String),

    /// Operation exceeded the configured or provider-enforced timeout period.
    /// Reasoning models routinely need longer deadlines than chat models.
    Timeout(String),

    /// Provider rate limit exceeded. Clients must wait before retrying.
    /// Respect the retry_after_seconds to avoid further rate limiting or API suspension.
    RateLimited { retry_after_seconds: u64 },

    /// Failed to serialize a request body to JSON.
    Serialization(String),

    /// Failed to deserialize a provider response to the expected shape.
    Deserialization(String),

    /// Catch-all for errors that don't fit other categories.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Provider(msg) => write!(f, "Provider error: {}", msg),
            Error::Timeout(msg) => write!(f, "Timeout: {}", msg),
            Error::RateLimited {
                retry_after_seconds,
            } => {
                write!(f, "Rate limited: retry after {}s", retry_after_seconds)
            }
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::Deserialization(msg) => write!(f, "Deserialization error: {}", msg),
            Error::Other(err) => write!(f, "Other error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
