//! Core error types

use thiserror::Error;

use crate::types::CellName;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Mutating a captured piece, double initialisation, broken occupancy.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Illegal move: {from}{to}")]
    IllegalMove { from: CellName, to: CellName },

    /// The rules engine refused the position; the game must be re-initialised.
    #[error("Oracle desync: {0}")]
    OracleDesync(String),

    #[error("Invalid cell name: {0:?}")]
    InvalidCell(String),
}
