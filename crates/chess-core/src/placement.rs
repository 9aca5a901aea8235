//! Starting placements and the scene-object naming scheme.
//!
//! The rendering layer discovers pieces by object name (`WhitePawn3`,
//! `BlackRook2`, ...). Each name maps to a fixed starting cell.

use crate::types::{CellName, Handle, PieceColor, PieceKind};

/// A piece record to create, together with its visual handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub color: PieceColor,
    pub kind: PieceKind,
    pub cell: CellName,
    pub handle: Handle,
}

/// First handle number used by [`standard_cells`].
pub const CELL_HANDLE_BASE: u64 = 1000;

/// Starting files (a = 0) per piece kind, in object-index order.
fn initial_files(kind: PieceKind) -> &'static [u8] {
    match kind {
        PieceKind::King => &[4],
        PieceKind::Queen => &[3],
        PieceKind::Rook => &[0, 7],
        PieceKind::Bishop => &[2, 5],
        PieceKind::Knight => &[1, 6],
        PieceKind::Pawn => &[0, 1, 2, 3, 4, 5, 6, 7],
    }
}

/// Starting cell of the `index`-th (1-based) piece of a kind and colour.
pub fn initial_cell(color: PieceColor, kind: PieceKind, index: usize) -> Option<CellName> {
    let file = *initial_files(kind).get(index.checked_sub(1)?)?;
    let rank = match (kind, color) {
        (PieceKind::Pawn, PieceColor::White) => 1,
        (PieceKind::Pawn, PieceColor::Black) => 6,
        (_, PieceColor::White) => 0,
        (_, PieceColor::Black) => 7,
    };
    CellName::from_coords(file, rank)
}

/// Scene object name, e.g. `piece_name(White, Knight, 2) == "WhiteKnight2"`.
pub fn piece_name(color: PieceColor, kind: PieceKind, index: usize) -> String {
    let color = match color {
        PieceColor::White => "White",
        PieceColor::Black => "Black",
    };
    format!("{color}{}{index}", kind.title())
}

impl Placement {
    pub fn new(color: PieceColor, kind: PieceKind, cell: CellName, handle: Handle) -> Self {
        Self { color, kind, cell, handle }
    }

    /// Build the starting placement for a scene object name.
    /// Returns None for objects that are not pieces (grid, lights, ...).
    pub fn from_object_name(name: &str, handle: Handle) -> Option<Self> {
        let (color, rest) = if let Some(rest) = name.strip_prefix("White") {
            (PieceColor::White, rest)
        } else if let Some(rest) = name.strip_prefix("Black") {
            (PieceColor::Black, rest)
        } else {
            return None;
        };

        let kind = PieceKind::ALL
            .into_iter()
            .find(|k| rest.starts_with(k.title()))?;
        let index: usize = rest[kind.title().len()..].parse().ok()?;
        let cell = initial_cell(color, kind, index)?;

        Some(Self { color, kind, cell, handle })
    }
}

/// The 32 standard starting placements, white first.
/// Handles are numbered 0..32 in that order.
pub fn standard_placements() -> Vec<Placement> {
    let mut placements = Vec::with_capacity(32);
    for color in PieceColor::ALL {
        for kind in PieceKind::ALL {
            for index in 1..=initial_files(kind).len() {
                if let Some(cell) = initial_cell(color, kind, index) {
                    let handle = Handle(placements.len() as u64);
                    placements.push(Placement { color, kind, cell, handle });
                }
            }
        }
    }
    placements
}

/// All 64 cells with handles `CELL_HANDLE_BASE + index` (a1 = 0 ... h8 = 63).
pub fn standard_cells() -> Vec<(CellName, Handle)> {
    CellName::all()
        .map(|cell| (cell, Handle(CELL_HANDLE_BASE + cell.index() as u64)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_placements_composition() {
        let placements = standard_placements();
        assert_eq!(placements.len(), 32);
        for color in PieceColor::ALL {
            let count = |kind| {
                placements
                    .iter()
                    .filter(|p| p.color == color && p.kind == kind)
                    .count()
            };
            assert_eq!(count(PieceKind::King), 1);
            assert_eq!(count(PieceKind::Queen), 1);
            assert_eq!(count(PieceKind::Rook), 2);
            assert_eq!(count(PieceKind::Pawn), 8);
        }
        assert_eq!(placements[0].cell.to_string(), "e1");
        assert_eq!(placements[0].handle, Handle(0));
    }

    #[test]
    fn test_object_name_round_trip() {
        let p = Placement::from_object_name("BlackKnight2", Handle(7)).unwrap();
        assert_eq!(p.color, PieceColor::Black);
        assert_eq!(p.kind, PieceKind::Knight);
        assert_eq!(p.cell.to_string(), "g8");
        assert_eq!(piece_name(PieceColor::Black, PieceKind::Knight, 2), "BlackKnight2");

        let pawn = Placement::from_object_name("WhitePawn5", Handle(1)).unwrap();
        assert_eq!(pawn.cell.to_string(), "e2");
    }

    #[test]
    fn test_object_name_rejects_non_pieces() {
        assert!(Placement::from_object_name("Grid", Handle(0)).is_none());
        assert!(Placement::from_object_name("WhiteKing2", Handle(0)).is_none());
        assert!(Placement::from_object_name("WhitePawn0", Handle(0)).is_none());
        assert!(Placement::from_object_name("RedQueen1", Handle(0)).is_none());
    }

    #[test]
    fn test_standard_cells_handles() {
        let cells = standard_cells();
        assert_eq!(cells.len(), 64);
        let (a1, h) = cells[0];
        assert_eq!(a1.to_string(), "a1");
        assert_eq!(h, Handle(CELL_HANDLE_BASE));
    }
}
