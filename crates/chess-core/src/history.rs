//! Per-ply move log with SAN and movetext formatting.

use serde::Serialize;

use crate::oracle::MoveResult;
use crate::types::{CellName, PieceColor, PieceKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    /// 1-based ply number.
    pub ply: usize,
    pub color: PieceColor,
    pub from: CellName,
    pub to: CellName,
    pub san: String,
    pub captured: Option<PieceKind>,
    pub is_castling: bool,
    pub promotion: Option<PieceKind>,
}

impl MoveRecord {
    /// Long algebraic form, e.g. `e7e8q`.
    pub fn uci(&self) -> String {
        let mut out = format!("{}{}", self.from, self.to);
        if let Some(kind) = self.promotion {
            out.push(kind.symbol(PieceColor::Black));
        }
        out
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MoveHistory {
    records: Vec<MoveRecord>,
}

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, color: PieceColor, result: &MoveResult) -> &MoveRecord {
        let record = MoveRecord {
            ply: self.records.len() + 1,
            color,
            from: result.from,
            to: result.to,
            san: result.san.clone(),
            captured: result.captured_kind,
            is_castling: result.is_castling,
            promotion: result.promotion,
        };
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&MoveRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// SAN moves numbered PGN style: `1. e4 e5 2. Nf3`.
    ///
    /// A log starting with black (after a custom setup) opens with `1...`.
    pub fn movetext(&self) -> String {
        let offset = match self.records.first() {
            Some(first) if first.color == PieceColor::Black => 1,
            _ => 0,
        };
        let mut formatted = String::new();
        for (i, record) in self.records.iter().enumerate() {
            let move_num = (i + offset) / 2 + 1;
            if !formatted.is_empty() {
                formatted.push(' ');
            }
            match record.color {
                PieceColor::White => formatted.push_str(&format!("{move_num}. ")),
                PieceColor::Black if i == 0 => formatted.push_str(&format!("{move_num}... ")),
                PieceColor::Black => {}
            }
            formatted.push_str(&record.san);
        }
        formatted
    }
}
