//! Piece registry: the only owner of piece records.
//!
//! Records are never removed during a game; a capture only flags the piece.
//! Lookups scan white first, then black, each in insertion order.

use tracing::debug;

use crate::error::CoreError;
use crate::placement::Placement;
use crate::types::{CellName, Handle, PieceColor, PieceKind};

/// Stable reference to a piece record inside one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceId {
    pub color: PieceColor,
    index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    id: PieceId,
    kind: PieceKind,
    cell: CellName,
    captured: bool,
    selected: bool,
    /// Only Some for kings and rooks.
    has_moved: Option<bool>,
    handle: Handle,
}

impl Piece {
    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn color(&self) -> PieceColor {
        self.id.color
    }

    /// Last occupied cell; meaningless once captured.
    pub fn cell(&self) -> CellName {
        self.cell
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn has_moved(&self) -> Option<bool> {
        self.has_moved
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }
}

#[derive(Debug, Default)]
pub struct PieceRegistry {
    white: Vec<Piece>,
    black: Vec<Piece>,
    initialized: bool,
}

impl PieceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Create all piece records. Fails if already initialised, if two
    /// placements share a cell or handle, or if a colour lacks exactly one king.
    pub fn initialize<I>(&mut self, placements: I) -> Result<(), CoreError>
    where
        I: IntoIterator<Item = Placement>,
    {
        if self.initialized {
            return Err(CoreError::InvalidOperation(
                "piece registry is already initialized".into(),
            ));
        }

        let placements: Vec<Placement> = placements.into_iter().collect();

        for (i, p) in placements.iter().enumerate() {
            if let Some(other) = placements[..i].iter().find(|o| o.cell == p.cell) {
                return Err(CoreError::InvalidOperation(format!(
                    "{} {} and {} {} both placed on {}",
                    other.color, other.kind, p.color, p.kind, p.cell
                )));
            }
            if placements[..i].iter().any(|o| o.handle == p.handle) {
                return Err(CoreError::InvalidOperation(format!(
                    "handle {} used by more than one piece",
                    p.handle
                )));
            }
        }

        for color in PieceColor::ALL {
            let kings = placements
                .iter()
                .filter(|p| p.color == color && p.kind == PieceKind::King)
                .count();
            if kings != 1 {
                return Err(CoreError::InvalidOperation(format!(
                    "{color} must have exactly one king, got {kings}"
                )));
            }
        }

        for p in placements {
            let side = self.side_mut(p.color);
            let id = PieceId { color: p.color, index: side.len() };
            side.push(Piece {
                id,
                kind: p.kind,
                cell: p.cell,
                captured: false,
                selected: false,
                has_moved: p.kind.tracks_moved().then_some(false),
                handle: p.handle,
            });
        }

        self.initialized = true;
        debug!(white = self.white.len(), black = self.black.len(), "Piece registry initialized");
        Ok(())
    }

    /// Drop every record; the next `initialize` starts a new game.
    pub fn reset(&mut self) {
        self.white.clear();
        self.black.clear();
        self.initialized = false;
    }

    fn side(&self, color: PieceColor) -> &Vec<Piece> {
        match color {
            PieceColor::White => &self.white,
            PieceColor::Black => &self.black,
        }
    }

    fn side_mut(&mut self, color: PieceColor) -> &mut Vec<Piece> {
        match color {
            PieceColor::White => &mut self.white,
            PieceColor::Black => &mut self.black,
        }
    }

    /// All records, white first, captured ones included.
    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.white.iter().chain(self.black.iter())
    }

    pub fn pieces(&self, color: PieceColor) -> &[Piece] {
        self.side(color)
    }

    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.side(id.color).get(id.index)
    }

    /// Non-captured pieces only.
    pub fn active(&self) -> impl Iterator<Item = &Piece> {
        self.iter().filter(|p| !p.captured)
    }

    pub fn captured(&self, color: PieceColor) -> impl Iterator<Item = &Piece> {
        self.side(color).iter().filter(|p| p.captured)
    }

    /// Captured pieces are still found by handle; callers decide what to do.
    pub fn find_by_handle(&self, handle: Handle) -> Option<&Piece> {
        self.iter().find(|p| p.handle == handle)
    }

    pub fn find_by_cell(&self, cell: CellName) -> Option<&Piece> {
        self.active().find(|p| p.cell == cell)
    }

    pub fn find_selected(&self) -> Option<&Piece> {
        self.iter().find(|p| p.selected)
    }

    fn live_mut(&mut self, id: PieceId, action: &str) -> Result<&mut Piece, CoreError> {
        let piece = self
            .side_mut(id.color)
            .get_mut(id.index)
            .ok_or_else(|| CoreError::InvalidOperation(format!("unknown piece {id:?}")))?;
        if piece.captured {
            return Err(CoreError::InvalidOperation(format!(
                "cannot {action} captured {} {}",
                piece.id.color, piece.kind
            )));
        }
        Ok(piece)
    }

    /// Flag a piece as captured. The record stays for the rest of the game.
    pub fn capture(&mut self, id: PieceId) -> Result<(), CoreError> {
        let piece = self.live_mut(id, "capture")?;
        piece.captured = true;
        piece.selected = false;
        debug!(color = %piece.id.color, kind = %piece.kind, cell = %piece.cell, "Piece captured");
        Ok(())
    }

    /// Move a live piece to an empty cell. Kings and rooks are marked as moved.
    pub fn relocate(&mut self, id: PieceId, cell: CellName) -> Result<(), CoreError> {
        if let Some(occupant) = self.find_by_cell(cell) {
            if occupant.id != id {
                return Err(CoreError::InvalidOperation(format!(
                    "{cell} is occupied by {} {}",
                    occupant.id.color, occupant.kind
                )));
            }
        }
        let piece = self.live_mut(id, "relocate")?;
        piece.cell = cell;
        if piece.has_moved.is_some() {
            piece.has_moved = Some(true);
        }
        Ok(())
    }

    /// Swap a pawn for the promoted kind. Promoted rooks count as moved.
    pub fn promote(&mut self, id: PieceId, kind: PieceKind) -> Result<(), CoreError> {
        let piece = self.live_mut(id, "promote")?;
        if piece.kind != PieceKind::Pawn || matches!(kind, PieceKind::King | PieceKind::Pawn) {
            return Err(CoreError::InvalidOperation(format!(
                "cannot promote {} to {kind}",
                piece.kind
            )));
        }
        piece.kind = kind;
        piece.has_moved = kind.tracks_moved().then_some(true);
        Ok(())
    }

    pub fn set_selected(&mut self, id: PieceId, selected: bool) -> Result<(), CoreError> {
        let piece = self.live_mut(id, "select")?;
        piece.selected = selected;
        Ok(())
    }

    /// Returns the handles whose selection flag was actually cleared.
    pub fn clear_all_selections(&mut self) -> Vec<Handle> {
        let mut cleared = Vec::new();
        for piece in self.white.iter_mut().chain(self.black.iter_mut()) {
            if piece.selected {
                piece.selected = false;
                cleared.push(piece.handle);
            }
        }
        cleared
    }
}
