//! Turn/game state machine tying the chess core to a move provider and a
//! rendering layer.

pub mod error;
pub mod events;
pub mod render;
pub mod session;
pub mod state;

pub use error::GameError;
pub use events::{GameEvent, GameObserver};
pub use render::{RecordingSink, RenderCommand, RenderSink, TracingSink};
pub use session::{ClickOutcome, Game, IgnoreReason, MatchState, MoveOutcome, SelectOutcome, HUMAN_COLOR};
pub use state::TurnPhase;
