//! Game events for observers (charts, move lists, status bars).

use chess_core::{MoveRecord, PieceColor, TerminalReason};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PiecesPlaced { count: usize },
    MoveApplied { record: MoveRecord },
    /// Emitted for every move; `weight` is 0 when nothing was captured.
    WeightEarned { color: PieceColor, weight: u32, total: u32 },
    Check { color: PieceColor },
    GameOver { reason: TerminalReason, winner: Option<PieceColor> },
    OpponentUnavailable { reason: String },
}

pub trait GameObserver: Send {
    fn on_event(&mut self, event: &GameEvent);
}

impl<F> GameObserver for F
where
    F: FnMut(&GameEvent) + Send,
{
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}
