//! Position encoder: FEN derived from the piece registry alone.

use crate::registry::PieceRegistry;
use crate::types::{CellName, PieceColor, PieceKind};

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Encode the registry as a FEN string.
///
/// Castling rights come from the `has_moved` flags; en passant is always `-`
/// and the clocks are `0 1`, which every consumer accepts.
pub fn encode(registry: &PieceRegistry, side_to_move: PieceColor) -> String {
    format!(
        "{} {} {} - 0 1",
        board_field(registry),
        side_to_move.fen_char(),
        castling_field(registry)
    )
}

/// Piece placement field: rank 8 to 1, file a to h.
pub fn board_field(registry: &PieceRegistry) -> String {
    let mut board = [[None::<char>; 8]; 8];
    for piece in registry.active() {
        let cell = piece.cell();
        board[cell.rank() as usize][cell.file() as usize] = Some(piece.kind().symbol(piece.color()));
    }

    board
        .iter()
        .rev()
        .map(|row| {
            let mut out = String::new();
            let mut empty = 0;
            for square in row {
                match square {
                    Some(symbol) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(*symbol);
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            out
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// `KQkq` subset, or `-` when nobody can castle.
pub fn castling_field(registry: &PieceRegistry) -> String {
    let mut rights = String::new();
    for color in PieceColor::ALL {
        let rank = color.home_rank() - 1;
        let unmoved = |kind: PieceKind, file: u8| {
            CellName::from_coords(file, rank)
                .and_then(|cell| registry.find_by_cell(cell))
                .is_some_and(|p| p.color() == color && p.kind() == kind && p.has_moved() == Some(false))
        };
        if !unmoved(PieceKind::King, 4) {
            continue;
        }
        if unmoved(PieceKind::Rook, 7) {
            rights.push(PieceKind::King.symbol(color));
        }
        if unmoved(PieceKind::Rook, 0) {
            rights.push(PieceKind::Queen.symbol(color));
        }
    }
    if rights.is_empty() {
        rights.push('-');
    }
    rights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::MoveOracle;
    use crate::placement::{standard_placements, Placement};
    use crate::types::Handle;
    use std::collections::BTreeSet;

    fn cell(s: &str) -> CellName {
        s.parse().unwrap()
    }

    fn standard() -> PieceRegistry {
        let mut registry = PieceRegistry::new();
        registry.initialize(standard_placements()).unwrap();
        registry
    }

    #[test]
    fn test_encode_start_position() {
        assert_eq!(encode(&standard(), PieceColor::White), STANDARD_START_FEN);
    }

    #[test]
    fn test_encode_after_pawn_push() {
        let mut registry = standard();
        let pawn = registry.find_by_cell(cell("e2")).unwrap().id();
        registry.relocate(pawn, cell("e4")).unwrap();

        let fen = encode(&registry, PieceColor::Black);
        let ranks: Vec<&str> = fen.split(' ').next().unwrap().split('/').collect();
        assert_eq!(ranks[4], "4P3");
        assert_eq!(ranks[6], "PPPP1PPP");
        assert!(fen.contains(" b KQkq "));
    }

    #[test]
    fn test_captured_pieces_are_skipped() {
        let mut registry = standard();
        let queen = registry.find_by_cell(cell("d8")).unwrap().id();
        registry.capture(queen).unwrap();
        assert!(board_field(&registry).starts_with("rnb1kbnr/"));
    }

    #[test]
    fn test_castling_rights_follow_has_moved() {
        let mut registry = standard();
        let rook = registry.find_by_cell(cell("h1")).unwrap().id();
        registry.relocate(rook, cell("h3")).unwrap();
        registry.relocate(rook, cell("h1")).unwrap();
        assert_eq!(castling_field(&registry), "Qkq");

        let king = registry.find_by_cell(cell("e8")).unwrap().id();
        registry.relocate(king, cell("e6")).unwrap();
        assert_eq!(castling_field(&registry), "Q");
    }

    #[test]
    fn test_no_castling_rights_is_dash() {
        let mut registry = PieceRegistry::new();
        registry
            .initialize(vec![
                Placement::new(PieceColor::White, PieceKind::King, cell("e1"), Handle(0)),
                Placement::new(PieceColor::Black, PieceKind::King, cell("a8"), Handle(1)),
            ])
            .unwrap();
        assert_eq!(encode(&registry, PieceColor::White), "k7/8/8/8/8/8/8/4K3 w - - 0 1");
    }

    fn loaded(registry: &PieceRegistry, side: PieceColor) -> MoveOracle {
        let mut oracle = MoveOracle::new();
        oracle.load_position(&encode(registry, side)).unwrap();
        oracle
    }

    fn cells(names: &[&str]) -> BTreeSet<CellName> {
        names.iter().map(|n| cell(n)).collect()
    }

    #[test]
    fn test_moved_rook_drops_its_castling_side() {
        let mut registry = PieceRegistry::new();
        registry
            .initialize(vec![
                Placement::new(PieceColor::White, PieceKind::King, cell("e1"), Handle(0)),
                Placement::new(PieceColor::White, PieceKind::Rook, cell("a1"), Handle(1)),
                Placement::new(PieceColor::White, PieceKind::Rook, cell("h1"), Handle(2)),
                Placement::new(PieceColor::Black, PieceKind::King, cell("e8"), Handle(3)),
            ])
            .unwrap();
        let rook = registry.find_by_cell(cell("h1")).unwrap().id();
        registry.relocate(rook, cell("h2")).unwrap();
        registry.relocate(rook, cell("h1")).unwrap();

        assert_eq!(encode(&registry, PieceColor::White), "4k3/8/8/8/8/8/8/R3K2R w Q - 0 1");
        let oracle = loaded(&registry, PieceColor::White);
        assert_eq!(
            oracle.legal_destinations(cell("e1")),
            cells(&["c1", "d1", "d2", "e2", "f1", "f2"])
        );
    }

    #[test]
    fn test_position_after_capture_loads() {
        let mut registry = PieceRegistry::new();
        registry
            .initialize(vec![
                Placement::new(PieceColor::White, PieceKind::King, cell("e1"), Handle(0)),
                Placement::new(PieceColor::White, PieceKind::Rook, cell("a1"), Handle(1)),
                Placement::new(PieceColor::Black, PieceKind::King, cell("e8"), Handle(2)),
                Placement::new(PieceColor::Black, PieceKind::Rook, cell("a8"), Handle(3)),
            ])
            .unwrap();
        let victim = registry.find_by_cell(cell("a8")).unwrap().id();
        let rook = registry.find_by_cell(cell("a1")).unwrap().id();
        registry.capture(victim).unwrap();
        registry.relocate(rook, cell("a8")).unwrap();

        assert_eq!(encode(&registry, PieceColor::Black), "R3k3/8/8/8/8/8/8/4K3 b - - 0 1");
        let oracle = loaded(&registry, PieceColor::Black);
        assert!(oracle.status().in_check);
        assert_eq!(oracle.legal_destinations(cell("e8")), cells(&["d7", "e7", "f7"]));
        assert!(oracle.legal_destinations(cell("a8")).is_empty());
    }

    #[test]
    fn test_encode_is_deterministic() {
        let registry = standard();
        assert_eq!(encode(&registry, PieceColor::White), encode(&registry, PieceColor::White));
    }
}
