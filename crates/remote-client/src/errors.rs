use thiserror::Error;

/// Why a remote entity could not be fetched
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("service returned status {0}")]
    Status(u16),

    #[error("failed to decode response body: {0}")]
    Decode(String),

    #[error("request timed out")]
    Timeout,

    #[error("circuit breaker is open")]
    CircuitOpen,
}

impl FetchError {
    /// Whether another attempt could plausibly succeed. 4xx responses and
    /// malformed bodies are answers, not outages.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport(_) | FetchError::Timeout => true,
            FetchError::Status(code) => *code >= 500,
            FetchError::Decode(_) | FetchError::CircuitOpen => false,
        }
    }

    /// Short label for metrics
    pub fn label(&self) -> String {
        match self {
            FetchError::Transport(_) => "transport".to_string(),
            FetchError::Status(code) => format!("status_{}", code),
            FetchError::Decode(_) => "decode".to_string(),
            FetchError::Timeout => "timeout".to_string(),
            FetchError::CircuitOpen => "circuit_open".to_string(),
        }
    }
}
