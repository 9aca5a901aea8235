//! Board vocabulary shared by every component: colours, piece kinds, cell names
//! and the opaque handles the rendering layer hands us.

use serde::{Deserialize, Serialize};
use shakmaty::{File, Rank, Role, Square};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceColor {
    White,
    Black,
}

impl PieceColor {
    /// Scan order used by every registry lookup.
    pub const ALL: [PieceColor; 2] = [PieceColor::White, PieceColor::Black];

    pub fn opposite(self) -> Self {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PieceColor::White => "white",
            PieceColor::Black => "black",
        }
    }

    /// FEN side-to-move letter.
    pub fn fen_char(self) -> char {
        match self {
            PieceColor::White => 'w',
            PieceColor::Black => 'b',
        }
    }

    /// Rank (1-8) the colour's king and rooks start on.
    pub fn home_rank(self) -> u8 {
        match self {
            PieceColor::White => 1,
            PieceColor::Black => 8,
        }
    }
}

impl fmt::Display for PieceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

// Material values used by the earned-weights chart
pub const PAWN_WEIGHT: u32 = 1;
pub const KNIGHT_WEIGHT: u32 = 3;
pub const BISHOP_WEIGHT: u32 = 3;
pub const ROOK_WEIGHT: u32 = 5;
pub const QUEEN_WEIGHT: u32 = 9;

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::King,
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Pawn,
    ];

    /// Standard material value; the king is worth nothing on the chart.
    pub fn weight(self) -> u32 {
        match self {
            PieceKind::Pawn => PAWN_WEIGHT,
            PieceKind::Knight => KNIGHT_WEIGHT,
            PieceKind::Bishop => BISHOP_WEIGHT,
            PieceKind::Rook => ROOK_WEIGHT,
            PieceKind::Queen => QUEEN_WEIGHT,
            PieceKind::King => 0,
        }
    }

    /// Kings and rooks remember whether they have moved (castling rights).
    pub fn tracks_moved(self) -> bool {
        matches!(self, PieceKind::King | PieceKind::Rook)
    }

    /// FEN symbol: uppercase for White, lowercase for Black.
    pub fn symbol(self, color: PieceColor) -> char {
        let upper = match self {
            PieceKind::King => 'K',
            PieceKind::Queen => 'Q',
            PieceKind::Rook => 'R',
            PieceKind::Bishop => 'B',
            PieceKind::Knight => 'N',
            PieceKind::Pawn => 'P',
        };
        match color {
            PieceColor::White => upper,
            PieceColor::Black => upper.to_ascii_lowercase(),
        }
    }

    /// Capitalised name as used in scene object names ("Knight").
    pub fn title(self) -> &'static str {
        match self {
            PieceKind::King => "King",
            PieceKind::Queen => "Queen",
            PieceKind::Rook => "Rook",
            PieceKind::Bishop => "Bishop",
            PieceKind::Knight => "Knight",
            PieceKind::Pawn => "Pawn",
        }
    }

    /// Parse a promotion letter (`q`, `r`, `b`, `n`), either case.
    pub fn from_promotion_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'q' => Some(PieceKind::Queen),
            'r' => Some(PieceKind::Rook),
            'b' => Some(PieceKind::Bishop),
            'n' => Some(PieceKind::Knight),
            _ => None,
        }
    }
}

impl From<Role> for PieceKind {
    fn from(role: Role) -> Self {
        match role {
            Role::King => PieceKind::King,
            Role::Queen => PieceKind::Queen,
            Role::Rook => PieceKind::Rook,
            Role::Bishop => PieceKind::Bishop,
            Role::Knight => PieceKind::Knight,
            Role::Pawn => PieceKind::Pawn,
        }
    }
}

impl From<PieceKind> for Role {
    fn from(kind: PieceKind) -> Self {
        match kind {
            PieceKind::King => Role::King,
            PieceKind::Queen => Role::Queen,
            PieceKind::Rook => Role::Rook,
            PieceKind::Bishop => Role::Bishop,
            PieceKind::Knight => Role::Knight,
            PieceKind::Pawn => Role::Pawn,
        }
    }
}

impl From<shakmaty::Color> for PieceColor {
    fn from(color: shakmaty::Color) -> Self {
        match color {
            shakmaty::Color::White => PieceColor::White,
            shakmaty::Color::Black => PieceColor::Black,
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title().to_ascii_lowercase())
    }
}

/// One of the 64 board squares, `a1` through `h8`.
///
/// Stored as zero-based file/rank indices; the textual form is the only one
/// that crosses the crate boundary (oracle, remote service, rendering layer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellName {
    file: u8,
    rank: u8,
}

impl CellName {
    /// `file` and `rank` are zero-based (a = 0, rank 1 = 0).
    pub fn from_coords(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self { file, rank })
    }

    /// Zero-based file index (a = 0).
    pub fn file(self) -> u8 {
        self.file
    }

    /// Zero-based rank index (rank 1 = 0).
    pub fn rank(self) -> u8 {
        self.rank
    }

    pub fn file_char(self) -> char {
        (b'a' + self.file) as char
    }

    /// Human rank number, 1-8.
    pub fn rank_number(self) -> u8 {
        self.rank + 1
    }

    /// Every cell, file-major: a1, a2, ..., a8, b1, ...
    pub fn all() -> impl Iterator<Item = CellName> {
        (0..8u8).flat_map(|file| (0..8u8).map(move |rank| CellName { file, rank }))
    }

    /// Index in a1 = 0, b1 = 1, ..., h8 = 63 order.
    pub fn index(self) -> usize {
        self.rank as usize * 8 + self.file as usize
    }
}

impl fmt::Display for CellName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_number())
    }
}

impl FromStr for CellName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(CoreError::InvalidCell(s.to_string()));
        }
        let file = bytes[0].to_ascii_lowercase().wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        Self::from_coords(file, rank).ok_or_else(|| CoreError::InvalidCell(s.to_string()))
    }
}

// shakmaty Square: file + rank * 8, same layout as `CellName::index`
impl From<Square> for CellName {
    fn from(square: Square) -> Self {
        CellName {
            file: square.file() as u8,
            rank: square.rank() as u8,
        }
    }
}

impl From<CellName> for Square {
    fn from(cell: CellName) -> Self {
        Square::from_coords(File::new(u32::from(cell.file)), Rank::new(u32::from(cell.rank)))
    }
}

impl Serialize for CellName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Opaque reference to an object owned by the rendering layer.
///
/// The core only compares handles and passes them back in render commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle(pub u64);

impl From<u64> for Handle {
    fn from(value: u64) -> Self {
        Handle(value)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Rook source and destination for a castling king move, if `from -> to` is one.
///
/// Only the geometry is checked here (king on its e-file home square moving two
/// files along the back rank); legality is the oracle's call.
pub fn castling_rook_cells(from: CellName, to: CellName) -> Option<(CellName, CellName)> {
    if from.file() != 4 || from.rank() != to.rank() || !(from.rank() == 0 || from.rank() == 7) {
        return None;
    }
    let rank = from.rank();
    match to.file() {
        6 => Some((CellName::from_coords(7, rank)?, CellName::from_coords(5, rank)?)),
        2 => Some((CellName::from_coords(0, rank)?, CellName::from_coords(3, rank)?)),
        _ => None,
    }
}
