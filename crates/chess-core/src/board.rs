//! Cell index: the 64 named squares, their render handles and the
//! allowed-destination flags that gate the next destination choice.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::error::CoreError;
use crate::types::{CellName, Handle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub name: CellName,
    pub handle: Handle,
    /// Highlighted and accepted as the next destination.
    pub allowed: bool,
}

#[derive(Debug, Default)]
pub struct CellIndex {
    cells: BTreeMap<CellName, Cell>,
}

impl CellIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_populated(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Populate all 64 cells once.
    ///
    /// A repeat call with the same names is a no-op (handles are kept); a call
    /// with any other name set fails.
    pub fn initialize_cells<I>(&mut self, cells: I) -> Result<(), CoreError>
    where
        I: IntoIterator<Item = (CellName, Handle)>,
    {
        let incoming: BTreeMap<CellName, Handle> = cells.into_iter().collect();

        if self.is_populated() {
            if incoming.keys().eq(self.cells.keys()) {
                return Ok(());
            }
            return Err(CoreError::InvalidOperation(
                "cells already initialized with a different name set".into(),
            ));
        }

        if incoming.len() != 64 {
            return Err(CoreError::InvalidOperation(format!(
                "expected 64 cells, got {}",
                incoming.len()
            )));
        }

        self.cells = incoming
            .into_iter()
            .map(|(name, handle)| (name, Cell { name, handle, allowed: false }))
            .collect();
        debug!("Cell index populated");
        Ok(())
    }

    /// Forget every cell; only used when the whole game is re-initialised.
    pub fn reset(&mut self) {
        self.cells.clear();
    }

    pub fn get(&self, name: CellName) -> Option<&Cell> {
        self.cells.get(&name)
    }

    pub fn handle_of(&self, name: CellName) -> Option<Handle> {
        self.cells.get(&name).map(|c| c.handle)
    }

    pub fn cell_by_handle(&self, handle: Handle) -> Option<CellName> {
        self.cells.values().find(|c| c.handle == handle).map(|c| c.name)
    }

    /// Replace the allowed set with exactly `names` (last write wins).
    pub fn mark_allowed(&mut self, names: &BTreeSet<CellName>) {
        self.clear_allowed();
        for name in names {
            match self.cells.get_mut(name) {
                Some(cell) => cell.allowed = true,
                None => warn!(cell = %name, "Cannot mark unknown cell as allowed"),
            }
        }
    }

    pub fn clear_allowed(&mut self) {
        for cell in self.cells.values_mut() {
            cell.allowed = false;
        }
    }

    pub fn is_allowed(&self, name: CellName) -> bool {
        self.cells.get(&name).is_some_and(|c| c.allowed)
    }

    pub fn allowed(&self) -> BTreeSet<CellName> {
        self.cells.values().filter(|c| c.allowed).map(|c| c.name).collect()
    }

    /// Handles of the allowed cells, for the highlight instruction.
    pub fn allowed_handles(&self) -> Vec<Handle> {
        self.cells.values().filter(|c| c.allowed).map(|c| c.handle).collect()
    }
}
