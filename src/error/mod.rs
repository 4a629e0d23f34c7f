//! Error types for modelrelay.

use thiserror::Error;

/// Primary error type for all modelrelay operations.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("All providers failed for model '{model}' ({attempted} attempted, {skipped} skipped)")]
    AllProvidersFailed {
        model: String,
        attempted: usize,
        skipped: usize,
    },

    #[error("Provider error: {provider}: {message}")]
    Provider { provider: String, message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlDecode(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Resolution cancelled")]
    Cancelled,
}

impl RelayError {
    /// Create an API error from a status code and body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a provider-level error.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error ends a resolution rather than a single candidate attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ModelNotFound(_) | Self::AllProvidersFailed { .. } | Self::Cancelled
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_kinds() {
        assert!(RelayError::ModelNotFound("x".into()).is_terminal());
        assert!(RelayError::Cancelled.is_terminal());
        assert!(!RelayError::provider("p1", "boom").is_terminal());
        assert!(!RelayError::Timeout(10).is_terminal());
    }

    #[test]
    fn exhaustion_message_names_model() {
        let err = RelayError::AllProvidersFailed {
            model: "gpt-4".into(),
            attempted: 3,
            skipped: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("gpt-4"));
        assert!(msg.contains("3 attempted"));
    }
}
