//! Error types for the VR pose bridge

use thiserror::Error;

/// Errors raised anywhere between the VR runtime and the message bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// VR runtime could not be initialised or queried
    #[error("Tracking error: {0}")]
    Tracking(String),

    /// Connecting, sending or closing the outbound transport failed
    #[error("Transport error ({endpoint}): {message}")]
    Transport { endpoint: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration file could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Build a transport error for the given endpoint
    pub fn transport(endpoint: impl Into<String>, message: impl ToString) -> Self {
        BridgeError::Transport {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for BridgeError {
    fn from(e: serde_yaml::Error) -> Self {
        BridgeError::Config(e.to_string())
    }
}

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        let err = BridgeError::transport("ws://localhost:9090", "connection refused");
        assert_eq!(
            err.to_string(),
            "Transport error (ws://localhost:9090): connection refused"
        );
    }

    #[test]
    fn test_yaml_error_becomes_config_error() {
        let parsed: Result<Vec<u32>, _> = serde_yaml::from_str("{ not: [a list");
        let err: BridgeError = parsed.unwrap_err().into();
        assert!(matches!(err, BridgeError::Config(_)));
    }
}
