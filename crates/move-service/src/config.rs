//! Provider configuration from environment variables

use std::env;
use std::time::Duration;

use tracing::info;

use crate::error::ProviderError;

pub const DEFAULT_SERVICE_URL: &str = "https://chess-api.com/v1";
pub const DEFAULT_DEPTH: u32 = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_STOCKFISH_PATH: &str = "/usr/local/bin/stockfish";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    /// POST the position to a remote move service.
    Http,
    /// Ask a local UCI engine process.
    Uci,
}

#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub kind: ProviderKind,

    /// Move service endpoint
    pub service_url: String,

    /// Search depth sent with every request
    pub depth: u32,

    /// Per-request timeout
    pub timeout: Duration,

    /// Path to the UCI engine binary
    pub stockfish_path: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Http,
            service_url: DEFAULT_SERVICE_URL.to_string(),
            depth: DEFAULT_DEPTH,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            stockfish_path: DEFAULT_STOCKFISH_PATH.to_string(),
        }
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ProviderError> {
        let kind = match env::var("MOVE_PROVIDER") {
            Ok(v) => parse_kind(&v)?,
            Err(_) => ProviderKind::Http,
        };

        let service_url =
            env::var("MOVE_SERVICE_URL").unwrap_or_else(|_| DEFAULT_SERVICE_URL.to_string());

        let depth = env::var("MOVE_SERVICE_DEPTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_DEPTH);

        let timeout_secs = env::var("MOVE_SERVICE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let stockfish_path =
            env::var("STOCKFISH_PATH").unwrap_or_else(|_| DEFAULT_STOCKFISH_PATH.to_string());

        if depth == 0 {
            return Err(ProviderError::Config("MOVE_SERVICE_DEPTH must be at least 1"));
        }

        let config = Self {
            kind,
            service_url,
            depth,
            timeout: Duration::from_secs(timeout_secs),
            stockfish_path,
        };
        info!(kind = ?config.kind, url = %config.service_url, depth, timeout_secs, "Move provider configured");
        Ok(config)
    }
}

fn parse_kind(value: &str) -> Result<ProviderKind, ProviderError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "http" | "" => Ok(ProviderKind::Http),
        "uci" | "stockfish" => Ok(ProviderKind::Uci),
        _ => Err(ProviderError::Config("MOVE_PROVIDER must be 'http' or 'uci'")),
    }
}
