//! Instructions for the rendering layer.
//!
//! The core never touches scene objects; it describes what should change and
//! hands the description to a [`RenderSink`].

use std::sync::{Arc, Mutex};

use chess_core::{Handle, PieceKind};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderCommand {
    /// Move piece object `piece` onto cell object `target`.
    Relocate { piece: Handle, target: Handle },
    /// Take a captured piece off the board.
    Remove { piece: Handle },
    /// Highlight exactly these cells; an empty list clears all highlights.
    SetHighlighted { cells: Vec<Handle> },
    SetSelected { piece: Handle, selected: bool },
    /// Swap the pawn's model for `kind`.
    Promote { piece: Handle, kind: PieceKind },
}

pub trait RenderSink: Send {
    fn apply(&mut self, command: RenderCommand);
}

impl RenderSink for Vec<RenderCommand> {
    fn apply(&mut self, command: RenderCommand) {
        self.push(command);
    }
}

/// Shared recorder: keep one clone, give the other to the game.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    commands: Arc<Mutex<Vec<RenderCommand>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<RenderCommand> {
        match self.commands.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl RenderSink for RecordingSink {
    fn apply(&mut self, command: RenderCommand) {
        match self.commands.lock() {
            Ok(mut guard) => guard.push(command),
            Err(poisoned) => poisoned.into_inner().push(command),
        }
    }
}

/// Logs every command; used when there is no scene to drive.
#[derive(Debug, Default)]
pub struct TracingSink;

impl RenderSink for TracingSink {
    fn apply(&mut self, command: RenderCommand) {
        match &command {
            RenderCommand::Relocate { piece, target } => info!(%piece, %target, "render: relocate"),
            RenderCommand::Remove { piece } => info!(%piece, "render: remove"),
            RenderCommand::SetHighlighted { cells } => info!(count = cells.len(), "render: highlight"),
            RenderCommand::SetSelected { piece, selected } => info!(%piece, selected, "render: select"),
            RenderCommand::Promote { piece, kind } => info!(%piece, %kind, "render: promote"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_shares_buffer() {
        let recorder = RecordingSink::new();
        let mut sink = recorder.clone();
        sink.apply(RenderCommand::Remove { piece: Handle(3) });
        sink.apply(RenderCommand::SetHighlighted { cells: vec![] });

        let taken = recorder.take();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0], RenderCommand::Remove { piece: Handle(3) });
        assert!(recorder.take().is_empty());
    }
}
