//! Move provider error types

use thiserror::Error;

/// Every variant means the same thing to the game: no move is available.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Configuration error: {0}")]
    Config(&'static str),

    #[error("Request error: {0}")]
    Http(String),

    #[error("Move service returned HTTP {0}")]
    Status(u16),

    #[error("Move service timed out")]
    Timeout,

    #[error("Malformed move reply: {0}")]
    Malformed(String),

    #[error("Engine error: {0}")]
    Engine(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if let Some(status) = e.status() {
            ProviderError::Status(status.as_u16())
        } else {
            ProviderError::Http(e.to_string())
        }
    }
}
