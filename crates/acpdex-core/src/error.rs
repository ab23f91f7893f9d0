//! Error types for acpdex-core

use thiserror::Error;

/// Errors that can occur while mirroring the ACP registry
#[derive(Error, Debug)]
pub enum RegistryError {
    /// HTTP transport error (connect, timeout, body)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Upstream answered with a non-2xx status
    #[error("upstream returned status {status} for page {page}")]
    UpstreamStatus { status: u16, page: u32 },

    /// Circuit breaker refused the call
    #[error("circuit breaker open - using cached data")]
    CircuitOpen,

    /// Persisted snapshot failed integrity verification
    #[error("snapshot digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        RegistryError::Http(err.to_string())
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_open_display() {
        let err = RegistryError::CircuitOpen;
        assert!(err.to_string().contains("circuit breaker open"));
    }

    #[test]
    fn test_upstream_status_display() {
        let err = RegistryError::UpstreamStatus {
            status: 503,
            page: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("page 4"));
    }

    #[test]
    fn test_digest_mismatch_display() {
        let err = RegistryError::DigestMismatch {
            expected: "abc123".to_string(),
            actual: "def456".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("abc123"));
        assert!(msg.contains("def456"));
    }
}
