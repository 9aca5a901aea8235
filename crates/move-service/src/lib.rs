//! Opponent move providers.
//!
//! A provider turns a FEN into a proposed move. The game treats every
//! failure the same way (no move available) and never retries on its own.

pub mod config;
pub mod error;
pub mod http;
pub mod reply;
pub mod uci;

use std::future::Future;

pub use config::{ProviderConfig, ProviderKind};
pub use error::ProviderError;
pub use http::HttpMoveProvider;
pub use reply::{parse_body, parse_reply, parse_uci_move, RemoteMove};
pub use uci::UciEngineProvider;

/// Source of opponent moves.
pub trait MoveProvider: Send + Sync {
    fn request_move(&self, fen: &str) -> impl Future<Output = Result<RemoteMove, ProviderError>> + Send;
}

impl MoveProvider for HttpMoveProvider {
    async fn request_move(&self, fen: &str) -> Result<RemoteMove, ProviderError> {
        HttpMoveProvider::request_move(self, fen).await
    }
}

impl MoveProvider for UciEngineProvider {
    async fn request_move(&self, fen: &str) -> Result<RemoteMove, ProviderError> {
        UciEngineProvider::request_move(self, fen).await
    }
}

/// Provider chosen at runtime from configuration.
pub enum Provider {
    Http(HttpMoveProvider),
    Uci(UciEngineProvider),
}

impl Provider {
    pub async fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        match config.kind {
            ProviderKind::Http => Ok(Provider::Http(HttpMoveProvider::new(config)?)),
            ProviderKind::Uci => Ok(Provider::Uci(
                UciEngineProvider::spawn(&config.stockfish_path, config.depth).await?,
            )),
        }
    }

    /// Stop a local engine cleanly; nothing to do for HTTP.
    pub async fn shutdown(&mut self) {
        if let Provider::Uci(engine) = self {
            engine.quit().await;
        }
    }
}

impl MoveProvider for Provider {
    async fn request_move(&self, fen: &str) -> Result<RemoteMove, ProviderError> {
        match self {
            Provider::Http(p) => p.request_move(fen).await,
            Provider::Uci(p) => p.request_move(fen).await,
        }
    }
}
