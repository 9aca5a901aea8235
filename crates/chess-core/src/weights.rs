//! Earned material per colour, one entry per applied move.

use serde::Serialize;

use crate::types::{PieceColor, PieceKind};

/// Two series, one per colour; a move that captures nothing appends 0, so the
/// series lengths track the number of moves each side made.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EarnedWeights {
    white: Vec<u32>,
    black: Vec<u32>,
}

impl EarnedWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one move by `mover`; returns the weight appended.
    pub fn record(&mut self, mover: PieceColor, captured: Option<PieceKind>) -> u32 {
        let weight = captured.map_or(0, PieceKind::weight);
        self.series_mut(mover).push(weight);
        weight
    }

    pub fn series(&self, color: PieceColor) -> &[u32] {
        match color {
            PieceColor::White => &self.white,
            PieceColor::Black => &self.black,
        }
    }

    fn series_mut(&mut self, color: PieceColor) -> &mut Vec<u32> {
        match color {
            PieceColor::White => &mut self.white,
            PieceColor::Black => &mut self.black,
        }
    }

    pub fn total(&self, color: PieceColor) -> u32 {
        self.series(color).iter().sum()
    }

    /// White total minus black total.
    pub fn advantage(&self) -> i64 {
        i64::from(self.total(PieceColor::White)) - i64::from(self.total(PieceColor::Black))
    }

    pub fn clear(&mut self) {
        self.white.clear();
        self.black.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends_zero_without_capture() {
        let mut weights = EarnedWeights::new();
        assert_eq!(weights.record(PieceColor::White, None), 0);
        assert_eq!(weights.record(PieceColor::Black, Some(PieceKind::Knight)), 3);
        assert_eq!(weights.record(PieceColor::White, Some(PieceKind::Queen)), 9);

        assert_eq!(weights.series(PieceColor::White), &[0, 9]);
        assert_eq!(weights.series(PieceColor::Black), &[3]);
        assert_eq!(weights.total(PieceColor::White), 9);
        assert_eq!(weights.advantage(), 6);
    }

    #[test]
    fn test_king_is_worth_nothing() {
        let mut weights = EarnedWeights::new();
        assert_eq!(weights.record(PieceColor::Black, Some(PieceKind::King)), 0);
        assert_eq!(weights.advantage(), 0);
    }

    #[test]
    fn test_clear() {
        let mut weights = EarnedWeights::new();
        weights.record(PieceColor::White, Some(PieceKind::Rook));
        weights.clear();
        assert!(weights.series(PieceColor::White).is_empty());
        assert_eq!(weights, EarnedWeights::default());
    }
}
