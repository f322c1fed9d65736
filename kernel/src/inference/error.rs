//! Error types for token sources.

/// Errors that can occur while requesting or reading a token stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    /// Error reported by the completion API
    #[error("Provider Error: {0}")]
    ProviderError(String),
    /// Rate limit exceeded
    #[error("Rate Limit Exceeded")]
    RateLimit,
    /// Context length exceeded the model's limit
    #[error("Context Length Exceeded")]
    ContextLengthExceeded,
    /// Network error during request or while reading the stream
    #[error("Network Error: {0}")]
    NetworkError(String),
    /// Configuration error
    #[error("Configuration Error: {0}")]
    ConfigError(String),
    /// The stream carried an event that could not be interpreted
    #[error("Malformed Stream: {0}")]
    MalformedStream(String),
}

impl InferenceError {
    /// Returns `true` if this error is transient and retry may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimit | Self::NetworkError(_) => true,
            Self::ProviderError(msg) => {
                // Retry on transient HTTP errors
                msg.contains("HTTP 50") || msg.contains("HTTP 52")
            }
            Self::ContextLengthExceeded | Self::ConfigError(_) | Self::MalformedStream(_) => false,
        }
    }

    /// Returns `true` if this error is permanent and should not be retried.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        !self.is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(InferenceError::RateLimit.is_retryable());
        assert!(InferenceError::NetworkError("reset".into()).is_retryable());
        assert!(InferenceError::ProviderError("HTTP 503 Service Unavailable: busy".into()).is_retryable());
    }

    #[test]
    fn permanent_errors_are_not_retryable() {
        assert!(InferenceError::ProviderError("HTTP 401 Unauthorized".into()).is_permanent());
        assert!(InferenceError::ContextLengthExceeded.is_permanent());
        assert!(InferenceError::MalformedStream("x".into()).is_permanent());
        assert!(InferenceError::ConfigError("x".into()).is_permanent());
    }
}
