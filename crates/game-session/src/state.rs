//! Turn phases

use chess_core::{PieceColor, TerminalReason};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "phase", content = "value", rename_all = "snake_case")]
pub enum TurnPhase {
    /// Before `start` or after `reset`.
    #[default]
    NotStarted,
    AwaitingSelection(PieceColor),
    PieceSelected(PieceColor),
    /// A remote reply is pending (or failed and awaits a retry); input is ignored.
    AwaitingOpponentReply(PieceColor),
    Terminal(TerminalReason),
    /// The registry and the oracle disagree; every call fails until `reset`.
    Desynced,
}

impl TurnPhase {
    /// Human input (select, destination) is acted on.
    pub fn accepts_input(&self) -> bool {
        matches!(self, TurnPhase::AwaitingSelection(_) | TurnPhase::PieceSelected(_))
    }

    pub fn is_awaiting_opponent(&self) -> bool {
        matches!(self, TurnPhase::AwaitingOpponentReply(_))
    }

    pub fn terminal_reason(&self) -> Option<TerminalReason> {
        match self {
            TurnPhase::Terminal(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Colour whose move the phase is about.
    pub fn active_color(&self) -> Option<PieceColor> {
        match self {
            TurnPhase::AwaitingSelection(c)
            | TurnPhase::PieceSelected(c)
            | TurnPhase::AwaitingOpponentReply(c) => Some(*c),
            TurnPhase::NotStarted | TurnPhase::Terminal(_) | TurnPhase::Desynced => None,
        }
    }
}
