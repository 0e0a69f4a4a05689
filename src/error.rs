//! Error types for the M2X client.

use thiserror::Error;

/// Result type alias for M2X client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the M2X client.
#[derive(Error, Debug)]
pub enum Error {
    // ===== Request construction =====
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    // ===== Transport =====
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    // ===== Response handling =====
    #[error("Format error: {0}")]
    Format(String),

    #[error("API error: {status} {status_text} - {message}")]
    Api {
        status: u16,
        status_text: String,
        message: String,
    },

    // ===== I/O Errors =====
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an API error from HTTP response details.
    pub fn api(status: u16, status_text: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            status_text: status_text.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a format error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    /// True for errors raised while building a request, before any network activity.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Url(_))
    }

    /// True for network, DNS and TLS failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// HTTP status carried by an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
