//! Error types for the analysis service client

/// Failure of one request to the analysis service
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection, TLS or body transfer failure
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("server error: HTTP {status} - {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Response body did not match the expected shape
    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    /// Caller-supplied deadline elapsed
    #[error("timed out after {0}ms")]
    Timeout(u64),

    /// Base URL or joined path is not a valid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response decoded but lacked a required field
    #[error("response is missing `{0}`")]
    MissingField(&'static str),
}

impl ClientError {
    /// Check if a manual retry could succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Decode(_) | Self::InvalidUrl(_) | Self::MissingField(_) => false,
        }
    }

    /// HTTP status, if the service answered
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result alias for client calls
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        let err = ClientError::Status {
            status: 503,
            body: "busy".into(),
        };
        assert!(err.is_retryable());
        assert_eq!(err.status(), Some(503));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let err = ClientError::Status {
            status: 404,
            body: "Story not found".into(),
        };
        assert!(!err.is_retryable());
        assert!(!ClientError::MissingField("id").is_retryable());
        assert!(ClientError::Timeout(100).is_retryable());
    }
}
