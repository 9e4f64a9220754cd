use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The session or credentials were rejected. Needs operator action, not a retry.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Unexpected data shape: {0}")]
    UnexpectedShape(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FetchError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, FetchError::AuthenticationFailed(_))
    }

    /// Only network errors are worth retrying inside a single fetch.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Network(e.to_string())
    }
}
