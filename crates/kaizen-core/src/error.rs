use thiserror::Error;

/// Top-level error type for the notification core.
#[derive(Debug, Error)]
pub enum KaizenError {
    /// Missing or mismatched shared secret.
    #[error("Unauthorized")]
    Unauthorized,

    /// Malformed input to a sender.
    #[error("{0}")]
    Validation(String),

    /// Data store query or update failed.
    #[error("store error: {0}")]
    Store(String),

    /// Email provider call failed.
    #[error("mailer error: {0}")]
    Mailer(String),

    /// An outbound call did not finish in time.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KaizenError {
    /// Whether the caller sent something wrong (as opposed to an upstream failure).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Validation(_))
    }
}
