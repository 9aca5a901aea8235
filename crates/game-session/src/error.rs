//! Game session errors

use chess_core::{CoreError, TerminalReason};
use move_service::ProviderError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// No opponent move available; the game stays in the opponent's turn.
    #[error("Remote opponent unavailable: {0}")]
    RemoteUnavailable(#[from] ProviderError),

    #[error("Game is over: {0}")]
    GameOver(TerminalReason),

    #[error("Game has not been started")]
    NotStarted,

    #[error("Board is out of sync with the rules engine; reset required")]
    Desynced,
}

impl GameError {
    /// The current game can go on after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GameError::RemoteUnavailable(_) | GameError::Core(CoreError::IllegalMove { .. })
        )
    }
}
