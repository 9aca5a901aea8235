//! Move legality oracle backed by shakmaty.
//!
//! The oracle is seeded once per game from the position encoder and then
//! advanced move by move through [`MoveOracle::apply_move`]. It owns the
//! authoritative notion of side to move, castling rights, en passant and the
//! draw clocks; the piece registry mirrors its board.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::{CastlingMode, Chess, EnPassantMode, File, Move, Position, Role, Square};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::types::{CellName, PieceColor, PieceKind};

/// Half-moves without capture or pawn move that end the game.
const FIFTY_MOVE_HALFMOVES: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
}

impl TerminalReason {
    pub fn is_draw(self) -> bool {
        !matches!(self, TerminalReason::Checkmate)
    }
}

impl fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TerminalReason::Checkmate => "checkmate",
            TerminalReason::Stalemate => "stalemate",
            TerminalReason::InsufficientMaterial => "draw by insufficient material",
            TerminalReason::FiftyMoveRule => "draw by fifty-move rule",
            TerminalReason::ThreefoldRepetition => "draw by threefold repetition",
        })
    }
}

/// Outcome check after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameStatus {
    pub reason: Option<TerminalReason>,
    pub side_to_move: PieceColor,
    pub in_check: bool,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        self.reason.is_some()
    }

    /// The mated side is the one to move.
    pub fn winner(&self) -> Option<PieceColor> {
        match self.reason {
            Some(TerminalReason::Checkmate) => Some(self.side_to_move.opposite()),
            _ => None,
        }
    }
}

/// Metadata about a move the oracle accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    pub from: CellName,
    pub to: CellName,
    pub is_castling: bool,
    pub is_capture: bool,
    /// Where the captured piece stood; differs from `to` for en passant.
    pub captured_cell: Option<CellName>,
    pub captured_kind: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    /// SAN with `+`/`#` suffix.
    pub san: String,
}

pub struct MoveOracle {
    position: Chess,
    /// Position keys (board, side, castling, en passant) seen since the last load.
    seen: Vec<String>,
    plies: usize,
}

impl Default for MoveOracle {
    fn default() -> Self {
        let position = Chess::default();
        let seen = vec![repetition_key(&position)];
        Self { position, seen, plies: 0 }
    }
}

impl fmt::Debug for MoveOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveOracle")
            .field("fen", &self.fen())
            .field("plies", &self.plies)
            .finish()
    }
}

fn position_fen(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}

/// Strips move counters from FEN, keeping only position + side + castling + ep.
fn repetition_key(position: &Chess) -> String {
    position_fen(position)
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Destination as the user sees it: castling is reported on the king's target
/// square, not the rook square shakmaty stores.
fn destination(mv: &Move) -> Square {
    match mv {
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() { File::G } else { File::C };
            Square::from_coords(file, king.rank())
        }
        other => other.to(),
    }
}

impl MoveOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the oracle state with `fen`. Any parse or validity failure is
    /// a desync: the registry no longer describes a playable position.
    pub fn load_position(&mut self, fen: &str) -> Result<(), CoreError> {
        let parsed: Fen = fen
            .parse()
            .map_err(|e| CoreError::OracleDesync(format!("unparseable FEN '{fen}': {e}")))?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| CoreError::OracleDesync(format!("invalid position '{fen}': {e}")))?;

        self.seen = vec![repetition_key(&position)];
        self.position = position;
        self.plies = 0;
        debug!(fen, "Oracle position loaded");
        Ok(())
    }

    pub fn fen(&self) -> String {
        position_fen(&self.position)
    }

    /// Piece placement field only.
    pub fn board_fen(&self) -> String {
        self.fen().split(' ').next().unwrap_or_default().to_string()
    }

    pub fn side_to_move(&self) -> PieceColor {
        self.position.turn().into()
    }

    /// Moves applied since the last `load_position`.
    pub fn plies(&self) -> usize {
        self.plies
    }

    pub fn piece_at(&self, cell: CellName) -> Option<(PieceColor, PieceKind)> {
        self.position
            .board()
            .piece_at(Square::from(cell))
            .map(|p| (p.color.into(), p.role.into()))
    }

    /// Legal target cells for the piece on `from`; empty when there is no
    /// piece of the side to move there, or it has no legal move.
    pub fn legal_destinations(&self, from: CellName) -> BTreeSet<CellName> {
        let from_sq = Square::from(from);
        self.position
            .legal_moves()
            .iter()
            .filter(|m| m.from() == Some(from_sq))
            .map(|m| CellName::from(destination(m)))
            .collect()
    }

    /// Apply `from -> to`, promoting to a queen when a pawn reaches the last rank.
    pub fn apply_move(&mut self, from: CellName, to: CellName) -> Result<MoveResult, CoreError> {
        self.apply_move_with_promotion(from, to, None)
    }

    /// Apply `from -> to`; `promotion` picks the piece for a promoting pawn
    /// (queen when None) and is ignored for every other move.
    pub fn apply_move_with_promotion(
        &mut self,
        from: CellName,
        to: CellName,
        promotion: Option<PieceKind>,
    ) -> Result<MoveResult, CoreError> {
        let from_sq = Square::from(from);
        let to_sq = Square::from(to);
        let wanted = Role::from(promotion.unwrap_or(PieceKind::Queen));

        let legals = self.position.legal_moves();
        let mv = legals
            .iter()
            .filter(|m| m.from() == Some(from_sq) && destination(m) == to_sq)
            .find(|m| m.promotion().map_or(true, |role| role == wanted))
            .cloned()
            .ok_or_else(|| {
                warn!(from = %from, to = %to, "Oracle rejected move");
                CoreError::IllegalMove { from, to }
            })?;

        let captured_cell = match &mv {
            Move::EnPassant { from, to } => Some(Square::from_coords(to.file(), from.rank())),
            m if m.is_capture() => Some(m.to()),
            _ => None,
        }
        .map(CellName::from);

        let mut san = San::from_move(&self.position, mv.clone()).to_string();
        self.position.play_unchecked(mv.clone());
        if self.position.is_checkmate() {
            san.push('#');
        } else if self.position.is_check() {
            san.push('+');
        }

        self.plies += 1;
        self.seen.push(repetition_key(&self.position));

        let result = MoveResult {
            from,
            to,
            is_castling: mv.is_castle(),
            is_capture: mv.is_capture(),
            captured_cell,
            captured_kind: mv.capture().map(PieceKind::from),
            promotion: mv.promotion().map(PieceKind::from),
            san,
        };
        debug!(san = %result.san, castling = result.is_castling, capture = result.is_capture, "Oracle applied move");
        Ok(result)
    }

    pub fn status(&self) -> GameStatus {
        let pos = &self.position;
        let reason = if pos.is_checkmate() {
            Some(TerminalReason::Checkmate)
        } else if pos.is_stalemate() {
            Some(TerminalReason::Stalemate)
        } else if pos.is_insufficient_material() {
            Some(TerminalReason::InsufficientMaterial)
        } else if pos.halfmoves() >= FIFTY_MOVE_HALFMOVES {
            Some(TerminalReason::FiftyMoveRule)
        } else if self.repetitions() >= 3 {
            Some(TerminalReason::ThreefoldRepetition)
        } else {
            None
        };

        GameStatus {
            reason,
            side_to_move: self.side_to_move(),
            in_check: pos.is_check(),
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.status().is_over()
    }

    /// How often the current position has occurred since the last load.
    fn repetitions(&self) -> usize {
        match self.seen.last() {
            Some(current) => self.seen.iter().filter(|k| *k == current).count(),
            None => 0,
        }
    }
}
