use connect_client::ConnectError;
use resilience::RetryError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Carries the full `timed out waiting for ... to finish: <cause>` message
    #[error("{0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("connector {0} not found")]
    NotFound(String),

    #[error("connector {0} is still present")]
    StillPresent(String),

    #[error("connector {0} has not applied the submitted configuration yet")]
    NotConverged(String),
}

impl ProviderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ProviderError::Validation(_))
    }
}

impl From<RetryError<ConnectError>> for ProviderError {
    fn from(err: RetryError<ConnectError>) -> Self {
        match err {
            RetryError::Fatal(e) => ProviderError::Connect(e),
            timed_out @ RetryError::TimedOut { .. } => ProviderError::Timeout(timed_out.to_string()),
        }
    }
}

impl From<RetryError<ProviderError>> for ProviderError {
    fn from(err: RetryError<ProviderError>) -> Self {
        match err {
            RetryError::Fatal(e) => e,
            timed_out @ RetryError::TimedOut { .. } => ProviderError::Timeout(timed_out.to_string()),
        }
    }
}

impl From<config::ConfigError> for ProviderError {
    fn from(err: config::ConfigError) -> Self {
        ProviderError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Validation(format!("invalid resource JSON: {}", err))
    }
}
