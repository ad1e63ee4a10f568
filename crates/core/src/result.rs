// crates/core/src/result.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntentorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authorization error: {0}")]
    Auth(String),

    #[error("Quota exceeded: {0}")]
    Quota(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntentorError {
    /// Failures raised before or during the completion call, as opposed to
    /// failures interpreting the reply.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::Auth(_)
                | Self::Quota(_)
                | Self::Network(_)
                | Self::Upstream { .. }
                | Self::Provider(_)
        )
    }

    /// Builds the error for a non-2xx response from a completion service.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Auth(message),
            429 => Self::Quota(message),
            _ => Self::Upstream { status, message },
        }
    }
}

pub type IntentorResult<T> = Result<T, IntentorError>;
