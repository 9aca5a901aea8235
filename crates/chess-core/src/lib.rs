//! Game-state and move-legality core for the 3D chessboard.
//!
//! Everything here is synchronous and free of I/O: the registry and cell
//! index hold board state, the encoder turns it into FEN, and the oracle
//! checks and applies moves.

pub mod board;
pub mod error;
pub mod fen;
pub mod history;
pub mod oracle;
pub mod placement;
pub mod registry;
pub mod types;
pub mod weights;

pub use board::{Cell, CellIndex};
pub use error::CoreError;
pub use history::{MoveHistory, MoveRecord};
pub use oracle::{GameStatus, MoveOracle, MoveResult, TerminalReason};
pub use placement::{standard_cells, standard_placements, Placement};
pub use registry::{Piece, PieceId, PieceRegistry};
pub use types::{castling_rook_cells, CellName, Handle, PieceColor, PieceKind};
pub use weights::EarnedWeights;
