use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConnectError>;

/// Kafka Connect client error types
#[derive(Error, Debug)]
pub enum ConnectError {
    /// Non-2xx response carrying a Kafka Connect error body
    #[error("error code: {code}, message: {message}")]
    Api { code: u16, message: String },

    /// The request never produced a response
    #[error("Kafka Connect request failed: {0}")]
    Transport(String),

    /// Non-2xx response whose body is not a Kafka Connect error document
    #[error("unexpected status {status} from Kafka Connect: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Failed to parse Kafka Connect response: {0}")]
    Decode(String),

    #[error("Invalid Kafka Connect client configuration: {0}")]
    Config(String),
}

impl ConnectError {
    /// HTTP status behind this error, if a response was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { code, .. } => Some(*code),
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

impl From<reqwest::Error> for ConnectError {
    fn from(err: reqwest::Error) -> Self {
        ConnectError::Transport(err.to_string())
    }
}
