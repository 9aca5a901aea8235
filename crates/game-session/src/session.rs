//! The match: a human side against a move provider.
//!
//! All game state sits behind one async mutex. A move (human or remote) is
//! applied inside a single lock acquisition; the lock is released only while
//! the provider is thinking, with the phase set to `AwaitingOpponentReply`
//! so that input arriving meanwhile is ignored.

use std::collections::BTreeSet;

use chess_core::fen;
use chess_core::{
    castling_rook_cells, standard_cells, standard_placements, CellIndex, CellName, CoreError,
    EarnedWeights, GameStatus, Handle, MoveHistory, MoveOracle, MoveRecord, MoveResult, Piece,
    PieceColor, PieceId, PieceKind, PieceRegistry, Placement,
};
use move_service::{MoveProvider, ProviderError, RemoteMove};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::GameError;
use crate::events::{GameEvent, GameObserver};
use crate::render::{RenderCommand, RenderSink};
use crate::state::TurnPhase;

/// The side driven by select/destination events. The provider plays the other.
pub const HUMAN_COLOR: PieceColor = PieceColor::White;

/// Why an input event was dropped without effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// An opponent reply is pending.
    Busy,
    UnknownPiece,
    CapturedPiece,
    WrongColor,
    UnknownCell,
    NothingSelected,
    /// The cell is not among the highlighted destinations.
    NotAllowed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected {
        cell: CellName,
        destinations: BTreeSet<CellName>,
    },
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// `opponent` is None when the human move ended the game, when no usable
    /// reply came back (the phase stays `AwaitingOpponentReply`) or when the
    /// game was reset while the reply was pending.
    Played {
        human: MoveRecord,
        opponent: Option<MoveRecord>,
        status: GameStatus,
    },
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Select(SelectOutcome),
    Move(MoveOutcome),
    Ignored(IgnoreReason),
}

struct OpponentRequest {
    fen: String,
    generation: u64,
}

enum Begin {
    Ignored(IgnoreReason),
    Finished { human: MoveRecord, status: GameStatus },
    AwaitReply { human: MoveRecord, request: OpponentRequest },
}

/// Everything one match owns.
pub struct MatchState {
    registry: PieceRegistry,
    cells: CellIndex,
    oracle: MoveOracle,
    weights: EarnedWeights,
    history: MoveHistory,
    phase: TurnPhase,
    request_in_flight: bool,
    /// Bumped on reset so a late reply cannot touch the next game.
    generation: u64,
    sink: Box<dyn RenderSink>,
    observers: Vec<Box<dyn GameObserver>>,
}

impl MatchState {
    fn new(sink: Box<dyn RenderSink>) -> Self {
        Self {
            registry: PieceRegistry::new(),
            cells: CellIndex::new(),
            oracle: MoveOracle::new(),
            weights: EarnedWeights::new(),
            history: MoveHistory::new(),
            phase: TurnPhase::NotStarted,
            request_in_flight: false,
            generation: 0,
            sink,
            observers: Vec::new(),
        }
    }

    pub fn registry(&self) -> &PieceRegistry {
        &self.registry
    }

    pub fn cells(&self) -> &CellIndex {
        &self.cells
    }

    pub fn oracle(&self) -> &MoveOracle {
        &self.oracle
    }

    pub fn weights(&self) -> &EarnedWeights {
        &self.weights
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn is_request_in_flight(&self) -> bool {
        self.request_in_flight
    }

    pub fn status(&self) -> GameStatus {
        self.oracle.status()
    }

    pub fn fen(&self) -> String {
        self.oracle.fen()
    }

    pub fn active_color(&self) -> PieceColor {
        self.oracle.side_to_move()
    }

    pub fn selected(&self) -> Option<&Piece> {
        self.registry.find_selected()
    }

    fn render(&mut self, command: RenderCommand) {
        self.sink.apply(command);
    }

    fn emit(&mut self, event: GameEvent) {
        for observer in self.observers.iter_mut() {
            observer.on_event(&event);
        }
    }

    fn guard(&self) -> Result<(), GameError> {
        match self.phase {
            TurnPhase::NotStarted => Err(GameError::NotStarted),
            TurnPhase::Terminal(reason) => Err(GameError::GameOver(reason)),
            TurnPhase::Desynced => Err(GameError::Desynced),
            _ => Ok(()),
        }
    }

    fn cell_handle(&self, cell: CellName) -> Result<Handle, CoreError> {
        self.cells
            .handle_of(cell)
            .ok_or_else(|| CoreError::InvalidOperation(format!("cell {cell} has no handle")))
    }

    /// The live piece the oracle expects on `cell`.
    fn live_piece(&self, cell: CellName) -> Result<(PieceId, Handle), CoreError> {
        self.registry
            .find_by_cell(cell)
            .map(|p| (p.id(), p.handle()))
            .ok_or_else(|| CoreError::OracleDesync(format!("no piece on {cell}")))
    }

    fn clear_selection(&mut self) {
        for piece in self.registry.clear_all_selections() {
            self.render(RenderCommand::SetSelected { piece, selected: false });
        }
        if !self.cells.allowed().is_empty() {
            self.cells.clear_allowed();
            self.render(RenderCommand::SetHighlighted { cells: Vec::new() });
        }
    }

    fn start(&mut self, cells: Vec<(CellName, Handle)>, placements: Vec<Placement>) -> Result<(), GameError> {
        if self.registry.is_initialized() {
            return Err(CoreError::InvalidOperation("game already started; reset first".into()).into());
        }

        self.cells.initialize_cells(cells)?;
        self.registry.initialize(placements.iter().copied())?;

        let fen = fen::encode(&self.registry, HUMAN_COLOR);
        if let Err(e) = self.oracle.load_position(&fen) {
            self.registry.reset();
            return Err(e.into());
        }

        self.weights.clear();
        self.history.clear();
        self.request_in_flight = false;

        for p in &placements {
            let target = self.cell_handle(p.cell)?;
            self.render(RenderCommand::Relocate { piece: p.handle, target });
        }
        self.emit(GameEvent::PiecesPlaced { count: placements.len() });

        let status = self.settle();
        if let Some(reason) = status.reason {
            self.emit(GameEvent::GameOver { reason, winner: status.winner() });
        }
        info!(fen = %fen, pieces = placements.len(), phase = ?self.phase, "Game started");
        Ok(())
    }

    fn reset(&mut self) {
        self.clear_selection();
        self.registry.reset();
        self.oracle = MoveOracle::new();
        self.weights.clear();
        self.history.clear();
        self.phase = TurnPhase::NotStarted;
        self.request_in_flight = false;
        self.generation += 1;
        info!(generation = self.generation, "Game reset");
    }

    /// Phase implied by the oracle after a move or a load.
    fn settle(&mut self) -> GameStatus {
        let status = self.oracle.status();
        self.phase = match status.reason {
            Some(reason) => TurnPhase::Terminal(reason),
            None if status.side_to_move == HUMAN_COLOR => TurnPhase::AwaitingSelection(HUMAN_COLOR),
            None => TurnPhase::AwaitingOpponentReply(status.side_to_move),
        };
        status
    }

    fn select(&mut self, handle: Handle) -> Result<SelectOutcome, GameError> {
        self.guard()?;
        let color = match self.phase {
            TurnPhase::AwaitingSelection(c) | TurnPhase::PieceSelected(c) => c,
            _ => return Ok(SelectOutcome::Ignored(IgnoreReason::Busy)),
        };

        let (id, cell) = match self.registry.find_by_handle(handle) {
            None => return Ok(SelectOutcome::Ignored(IgnoreReason::UnknownPiece)),
            Some(p) if p.is_captured() => return Ok(SelectOutcome::Ignored(IgnoreReason::CapturedPiece)),
            Some(p) if p.color() != color => return Ok(SelectOutcome::Ignored(IgnoreReason::WrongColor)),
            Some(p) => (p.id(), p.cell()),
        };

        self.clear_selection();
        let destinations = self.oracle.legal_destinations(cell);
        self.registry.set_selected(id, true)?;
        self.render(RenderCommand::SetSelected { piece: handle, selected: true });
        self.cells.mark_allowed(&destinations);
        let highlighted = self.cells.allowed_handles();
        self.render(RenderCommand::SetHighlighted { cells: highlighted });
        self.phase = TurnPhase::PieceSelected(color);

        debug!(cell = %cell, destinations = destinations.len(), "Piece selected");
        Ok(SelectOutcome::Selected { cell, destinations })
    }

    fn begin_move(&mut self, to: CellName) -> Result<Begin, GameError> {
        self.guard()?;
        let color = match self.phase {
            TurnPhase::PieceSelected(c) => c,
            TurnPhase::AwaitingSelection(_) => return Ok(Begin::Ignored(IgnoreReason::NothingSelected)),
            _ => return Ok(Begin::Ignored(IgnoreReason::Busy)),
        };
        if !self.cells.is_allowed(to) {
            return Ok(Begin::Ignored(IgnoreReason::NotAllowed));
        }
        let Some(from) = self.registry.find_selected().map(|p| p.cell()) else {
            return Ok(Begin::Ignored(IgnoreReason::NothingSelected));
        };

        let human = self.apply(color, from, to, None)?;
        let status = self.settle();
        if self.phase.is_awaiting_opponent() {
            self.request_in_flight = true;
            let request = OpponentRequest {
                fen: self.oracle.fen(),
                generation: self.generation,
            };
            Ok(Begin::AwaitReply { human, request })
        } else {
            Ok(Begin::Finished { human, status })
        }
    }

    /// Apply one validated move: the oracle first, then the registry mirror,
    /// then weights, history and status events. A rejected move changes
    /// nothing. Any failure once the oracle has moved poisons the match.
    fn apply(
        &mut self,
        mover: PieceColor,
        from: CellName,
        to: CellName,
        promotion: Option<PieceKind>,
    ) -> Result<MoveRecord, GameError> {
        let result = self.oracle.apply_move_with_promotion(from, to, promotion)?;
        if let Err(e) = self.mirror(&result) {
            return Err(self.poison(e));
        }

        let weight = self.weights.record(mover, result.captured_kind);
        let total = self.weights.total(mover);
        self.emit(GameEvent::WeightEarned { color: mover, weight, total });

        let record = self.history.push(mover, &result).clone();
        info!(color = %mover, san = %record.san, from = %from, to = %to, weight, "Move applied");
        self.emit(GameEvent::MoveApplied { record: record.clone() });

        let status = self.oracle.status();
        if let Some(reason) = status.reason {
            info!(%reason, winner = ?status.winner(), "Game over");
            self.emit(GameEvent::GameOver { reason, winner: status.winner() });
        } else if status.in_check {
            self.emit(GameEvent::Check { color: status.side_to_move });
        }
        Ok(record)
    }

    /// Replay an oracle move on the registry and check both boards agree.
    fn mirror(&mut self, result: &MoveResult) -> Result<(), CoreError> {
        let (from, to) = (result.from, result.to);
        let (piece, piece_handle) = self.live_piece(from)?;

        if let Some(cell) = result.captured_cell {
            let (victim, victim_handle) = self.live_piece(cell)?;
            self.registry.capture(victim)?;
            self.render(RenderCommand::Remove { piece: victim_handle });
        }

        let target = self.cell_handle(to)?;
        self.registry.relocate(piece, to)?;
        self.render(RenderCommand::Relocate { piece: piece_handle, target });

        if result.is_castling {
            let (rook_from, rook_to) = castling_rook_cells(from, to)
                .ok_or_else(|| CoreError::OracleDesync(format!("{from}{to} is not a castling move")))?;
            let (rook, rook_handle) = self.live_piece(rook_from)?;
            let target = self.cell_handle(rook_to)?;
            self.registry.relocate(rook, rook_to)?;
            self.render(RenderCommand::Relocate { piece: rook_handle, target });
        }

        if let Some(kind) = result.promotion {
            self.registry.promote(piece, kind)?;
            self.render(RenderCommand::Promote { piece: piece_handle, kind });
        }

        self.clear_selection();

        let registry_board = fen::board_field(&self.registry);
        let oracle_board = self.oracle.board_fen();
        if registry_board != oracle_board {
            return Err(CoreError::OracleDesync(format!(
                "registry {registry_board} differs from oracle {oracle_board}"
            )));
        }
        Ok(())
    }

    /// The registry no longer matches the oracle. Only `reset` gets out.
    fn poison(&mut self, error: CoreError) -> GameError {
        warn!(error = %error, "Board out of sync, reset required");
        self.clear_selection();
        self.phase = TurnPhase::Desynced;
        self.request_in_flight = false;
        let error = match error {
            e @ CoreError::OracleDesync(_) => e,
            other => CoreError::OracleDesync(other.to_string()),
        };
        error.into()
    }

    fn finish_reply(
        &mut self,
        reply: Result<RemoteMove, ProviderError>,
        generation: u64,
    ) -> Result<(Option<MoveRecord>, GameStatus), GameError> {
        if generation != self.generation {
            debug!(generation, current = self.generation, "Discarding reply for an abandoned game");
            return Ok((None, self.oracle.status()));
        }
        self.request_in_flight = false;

        let mover = match self.phase {
            TurnPhase::AwaitingOpponentReply(c) => c,
            _ => {
                return Err(CoreError::InvalidOperation("opponent reply without a pending request".into()).into())
            }
        };

        let remote = match reply {
            Ok(mv) => mv,
            Err(e) => {
                warn!(error = %e, "Opponent move unavailable");
                self.emit(GameEvent::OpponentUnavailable { reason: e.to_string() });
                return Err(e.into());
            }
        };

        match self.apply(mover, remote.from, remote.to, remote.promotion) {
            Ok(record) => {
                let status = self.settle();
                Ok((Some(record), status))
            }
            Err(GameError::Core(CoreError::IllegalMove { from, to })) => {
                warn!(from = %from, to = %to, "Opponent proposed an illegal move");
                self.emit(GameEvent::OpponentUnavailable {
                    reason: format!("illegal move {from}{to}"),
                });
                Err(CoreError::IllegalMove { from, to }.into())
            }
            Err(e) => Err(e),
        }
    }
}

/// One match. Share it behind an `Arc` to feed events from several tasks.
pub struct Game<P> {
    state: Mutex<MatchState>,
    provider: P,
}

impl<P: MoveProvider> Game<P> {
    pub fn new(provider: P, sink: impl RenderSink + 'static) -> Self {
        Self {
            state: Mutex::new(MatchState::new(Box::new(sink))),
            provider,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn into_provider(self) -> P {
        self.provider
    }

    pub async fn subscribe(&self, observer: impl GameObserver + 'static) {
        self.state.lock().await.observers.push(Box::new(observer));
    }

    /// Create the cells and pieces, seed the oracle and hand White the move.
    pub async fn start<C, I>(&self, cells: C, placements: I) -> Result<(), GameError>
    where
        C: IntoIterator<Item = (CellName, Handle)>,
        I: IntoIterator<Item = Placement>,
    {
        let cells: Vec<_> = cells.into_iter().collect();
        let placements: Vec<_> = placements.into_iter().collect();
        self.state.lock().await.start(cells, placements)
    }

    /// `start` with the standard 32 pieces and 64 cells.
    pub async fn start_standard(&self) -> Result<(), GameError> {
        self.start(standard_cells(), standard_placements()).await
    }

    /// Drop all pieces and history. A reply still in flight is discarded.
    pub async fn reset(&self) {
        self.state.lock().await.reset();
    }

    pub async fn on_select(&self, handle: Handle) -> Result<SelectOutcome, GameError> {
        self.state.lock().await.select(handle)
    }

    pub async fn destination_event(&self, cell_handle: Handle) -> Result<MoveOutcome, GameError> {
        let begin = {
            let mut state = self.state.lock().await;
            match state.cells.cell_by_handle(cell_handle) {
                Some(cell) => state.begin_move(cell)?,
                None => {
                    state.guard()?;
                    Begin::Ignored(IgnoreReason::UnknownCell)
                }
            }
        };
        self.complete(begin).await
    }

    /// Move the selected piece to `cell`, then wait for the opponent's reply.
    ///
    /// If the provider fails or proposes an illegal move, the human move is
    /// still returned with `opponent: None`, an `OpponentUnavailable` event is
    /// emitted and the game waits for [`Game::retry_opponent`].
    pub async fn choose_destination(&self, cell: CellName) -> Result<MoveOutcome, GameError> {
        let begin = self.state.lock().await.begin_move(cell)?;
        self.complete(begin).await
    }

    /// Click on any piece: own pieces are selected, an opponent piece means
    /// "move the selected piece there".
    pub async fn piece_clicked(&self, handle: Handle) -> Result<ClickOutcome, GameError> {
        let target = {
            let state = self.state.lock().await;
            state.guard()?;
            if !state.phase.accepts_input() {
                return Ok(ClickOutcome::Ignored(IgnoreReason::Busy));
            }
            match state.registry.find_by_handle(handle) {
                None => return Ok(ClickOutcome::Ignored(IgnoreReason::UnknownPiece)),
                Some(p) if p.is_captured() => return Ok(ClickOutcome::Ignored(IgnoreReason::CapturedPiece)),
                Some(p) if Some(p.color()) == state.phase.active_color() => None,
                Some(p) => Some(p.cell()),
            }
        };

        match target {
            None => self.on_select(handle).await.map(ClickOutcome::Select),
            Some(cell) => self.choose_destination(cell).await.map(ClickOutcome::Move),
        }
    }

    /// Ask the provider again after a failed reply. Returns None when a
    /// request is already running.
    pub async fn retry_opponent(&self) -> Result<Option<MoveRecord>, GameError> {
        let request = {
            let mut state = self.state.lock().await;
            state.guard()?;
            if !state.phase.is_awaiting_opponent() {
                return Err(CoreError::InvalidOperation("no opponent move is pending".into()).into());
            }
            if state.request_in_flight {
                debug!("Retry ignored, request already in flight");
                return Ok(None);
            }
            state.request_in_flight = true;
            OpponentRequest {
                fen: state.oracle.fen(),
                generation: state.generation,
            }
        };

        let (record, _) = self.run_opponent(request).await?;
        Ok(record)
    }

    /// Read-only access to the match state.
    pub async fn inspect<R>(&self, f: impl FnOnce(&MatchState) -> R) -> R {
        let state = self.state.lock().await;
        f(&state)
    }

    async fn complete(&self, begin: Begin) -> Result<MoveOutcome, GameError> {
        match begin {
            Begin::Ignored(reason) => Ok(MoveOutcome::Ignored(reason)),
            Begin::Finished { human, status } => Ok(MoveOutcome::Played {
                human,
                opponent: None,
                status,
            }),
            Begin::AwaitReply { human, request } => match self.run_opponent(request).await {
                Ok((opponent, status)) => Ok(MoveOutcome::Played { human, opponent, status }),
                Err(e) if e.is_recoverable() => {
                    let status = self.state.lock().await.status();
                    Ok(MoveOutcome::Played { human, opponent: None, status })
                }
                Err(e) => Err(e),
            },
        }
    }

    async fn run_opponent(&self, request: OpponentRequest) -> Result<(Option<MoveRecord>, GameStatus), GameError> {
        debug!(fen = %request.fen, "Requesting opponent move");
        let reply = self.provider.request_move(&request.fen).await;
        self.state.lock().await.finish_reply(reply, request.generation)
    }
}
