//! 3D chessboard game core: board state and legality (`chess_core`),
//! opponent move providers (`move_service`) and the turn state machine
//! (`game_session`).

pub use chess_core;
pub use game_session;
pub use move_service;

pub use chess_core::{CellName, Handle, PieceColor, PieceKind, Placement};
pub use game_session::{
    ClickOutcome, Game, GameError, GameEvent, GameObserver, MoveOutcome, RenderCommand, RenderSink,
    SelectOutcome, TurnPhase,
};
pub use move_service::{MoveProvider, Provider, ProviderConfig, ProviderError, RemoteMove};
