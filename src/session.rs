//! Game session: owns the state and runs every player action through the engine.

use crate::GameMode;
use crate::catalog::{CatalogError, PieceCatalog};
use crate::clear::{ClearResult, LineRef, detect_and_score_lines};
use crate::grid::{CLASSIC_FILL_RATIO, Grid};
use crate::history::{HistoryManager, HistorySnapshot};
use crate::oracle::has_any_move;
use crate::pieces::{PieceFactory, PieceInstance, RACK_SIZE, Rack};
use crate::placement::{Placement, find_all_valid_placements, is_valid_placement};
use crate::score::{Rewards, ScoreCombo, TokenKind, Tokens, rewards_for};
use crate::shape::Shape;
use crate::storage::{KeyValueStore, load_high_score, save_high_score};
use crate::unlock::{ProgressInfo, UnlockEvent, UnlockProgression, group_by_tier};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Why a player action was refused. State is untouched whenever one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("the game is over")]
    GameOver,
    #[error("no rack slot {0}")]
    SlotOutOfRange(usize),
    #[error("rack slot {0} is empty")]
    EmptySlot(usize),
    #[error("piece does not fit at ({row}, {col})")]
    InvalidPlacement { row: i32, col: i32 },
    #[error("cell ({row}, {col}) is off the grid")]
    OutOfBounds { row: usize, col: usize },
    #[error("no {0} tokens left")]
    NoTokens(TokenKind),
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to clear there")]
    NothingToClear,
    #[error("line clears still in progress")]
    ClearsPending,
}

/// Everything a placement produced, for the presentation to react to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementOutcome {
    pub points: u32,
    pub clear: Option<ClearResult>,
    pub unlocks: Vec<UnlockEvent>,
    pub granted: Rewards,
}

/// Aggregate root for one running game.
#[derive(Debug, Clone)]
pub struct GameState {
    pub grid: Grid,
    pub score: ScoreCombo,
    pub rack: Rack,
    pub tokens: Tokens,
    pub is_game_over: bool,
    /// Presentation only; actions are not gated on it.
    pub is_paused: bool,
    pub history: HistoryManager,
    pub mode: GameMode,
    /// Lines decided by the last clear but not yet zeroed.
    pub pending_clears: VecDeque<LineRef>,
    /// Colour of the piece that triggered the pending clears.
    pub clear_color: Option<u8>,
}

impl GameState {
    fn new(mode: GameMode, high_score: u32) -> Self {
        Self {
            grid: Grid::default(),
            score: ScoreCombo::with_high_score(high_score),
            rack: Rack::default(),
            tokens: Tokens::default(),
            is_game_over: false,
            is_paused: false,
            history: HistoryManager::default(),
            mode,
            pending_clears: VecDeque::new(),
            clear_color: None,
        }
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            grid: self.grid.clone(),
            score: self.score.score,
            rack: self.rack.clone(),
            combo: self.score.combo,
            tokens: self.tokens,
        }
    }

    fn restore(&mut self, snap: HistorySnapshot) {
        self.grid = snap.grid;
        self.score.score = snap.score;
        self.rack = snap.rack;
        self.score.combo = snap.combo;
        self.tokens = snap.tokens;
    }

    #[inline]
    pub fn clears_pending(&self) -> bool {
        !self.pending_clears.is_empty()
    }

    /// Cells covered by pending lines, each once.
    pub fn pending_cells(&self) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for line in &self.pending_clears {
            match *line {
                LineRef::Row(r) => cells.extend((0..self.grid.cols()).map(|c| (r, c))),
                LineRef::Column(c) => cells.extend((0..self.grid.rows()).map(|r| (r, c))),
            }
        }
        cells.sort_unstable();
        cells.dedup();
        cells
    }
}

/// A game plus the catalog, dealer, unlocks and persistence it draws on.
pub struct Session {
    pub state: GameState,
    catalog: PieceCatalog,
    factory: PieceFactory,
    unlocks: UnlockProgression,
    store: Box<dyn KeyValueStore>,
}

impl Session {
    /// Load persisted progress and deal the first game.
    pub fn new(
        mode: GameMode,
        seed: u64,
        store: Box<dyn KeyValueStore>,
    ) -> Result<Self, CatalogError> {
        let catalog = PieceCatalog::standard()?;
        let high_score = load_high_score(store.as_ref()).unwrap_or_else(|e| {
            warn!(error = %e, "could not load high score");
            0
        });
        let unlocks = UnlockProgression::load(store.as_ref()).unwrap_or_else(|e| {
            warn!(error = %e, "could not load unlocks");
            UnlockProgression::default()
        });
        let mut session = Self {
            state: GameState::new(mode, high_score),
            catalog,
            factory: PieceFactory::new(seed),
            unlocks,
            store,
        };
        info!(?mode, seed, high_score, unlocked = session.unlocks.len(), "session opened");
        session.new_game(mode);
        Ok(session)
    }

    pub fn progress(&self) -> ProgressInfo {
        self.unlocks.progress(&self.catalog, self.state.score.score)
    }

    /// Reset everything except the high score, then seed and deal.
    #[instrument(skip(self))]
    pub fn new_game(&mut self, mode: GameMode) {
        let high_score = self.state.score.high_score;
        self.state = GameState::new(mode, high_score);
        if mode == GameMode::Classic {
            self.state
                .grid
                .fill_random(CLASSIC_FILL_RATIO, self.factory.rng_mut());
        }
        self.factory
            .fill_rack(&mut self.state.rack, &self.catalog, &self.unlocks);
        info!(
            prefilled = self.state.grid.occupied_count(),
            "new game"
        );
        self.evaluate_game_over();
    }

    fn guard_playable(&self) -> Result<(), ActionError> {
        if self.state.is_game_over {
            return Err(ActionError::GameOver);
        }
        if self.state.clears_pending() {
            return Err(ActionError::ClearsPending);
        }
        Ok(())
    }

    fn piece_in(&self, slot: usize) -> Result<&PieceInstance, ActionError> {
        if slot >= RACK_SIZE {
            return Err(ActionError::SlotOutOfRange(slot));
        }
        self.state.rack.get(slot).ok_or(ActionError::EmptySlot(slot))
    }

    /// Origins where the slot's piece fits right now.
    pub fn valid_placements(&self, slot: usize) -> Result<Vec<Placement>, ActionError> {
        let piece = self.piece_in(slot)?;
        Ok(find_all_valid_placements(&piece.current_shape, &self.state.grid))
    }

    pub fn can_place(&self, slot: usize, row: i32, col: i32) -> bool {
        self.piece_in(slot)
            .is_ok_and(|p| is_valid_placement(&p.current_shape, row, col, &self.state.grid))
    }

    /// Commit the slot's piece at (row, col). Clears are decided and scored here
    /// but only queued; see [`Self::apply_next_clear`].
    #[instrument(skip(self))]
    pub fn place_piece(
        &mut self,
        slot: usize,
        row: i32,
        col: i32,
    ) -> Result<PlacementOutcome, ActionError> {
        self.guard_playable()?;
        let shape = &self.piece_in(slot)?.current_shape;
        if !is_valid_placement(shape, row, col, &self.state.grid) {
            return Err(ActionError::InvalidPlacement { row, col });
        }

        let snap = self.state.snapshot();
        self.state.history.push(snap);
        let Some(piece) = self.state.rack.take(slot) else {
            return Err(ActionError::EmptySlot(slot));
        };
        self.state
            .grid
            .place_shape(&piece.current_shape, row, col, piece.color);

        let before = self.state.score.score;
        self.state.score.add_piece(piece.size());
        if let Some(next) = self.factory.deal(&self.catalog, &self.unlocks) {
            self.state.rack.put(slot, next);
        }

        let clear = detect_and_score_lines(
            &self.state.grid,
            &mut self.state.score.combo,
            Some(piece.color),
        );
        if let Some(c) = &clear {
            self.state.score.add_clear(c);
            self.state.pending_clears.extend(c.lines());
            self.state.clear_color = c.trigger_color;
            info!(
                rows = ?c.cleared_rows,
                cols = ?c.cleared_cols,
                combo = c.combo_count,
                points = c.points_earned,
                "lines cleared"
            );
        }
        let after = self.state.score.score;

        let granted = rewards_for(before, after, clear.is_some(), self.state.score.combo);
        granted.apply(&mut self.state.tokens);
        if !granted.is_empty() {
            info!(granted = ?granted.0, "tokens granted");
        }

        let unlocks = self.check_unlocks();
        self.update_high_score();
        debug!(piece = piece.def_id, instance = piece.instance_id, points = after - before, score = after, "placed");

        if !self.state.clears_pending() {
            self.evaluate_game_over();
        }
        Ok(PlacementOutcome {
            points: after - before,
            clear,
            unlocks,
            granted,
        })
    }

    fn check_unlocks(&mut self) -> Vec<UnlockEvent> {
        if self.state.mode != GameMode::Collection {
            return Vec::new();
        }
        let fresh = self
            .unlocks
            .check_for_unlocks(self.state.score.score, &self.catalog);
        let events = group_by_tier(&fresh);
        if events.is_empty() {
            return events;
        }
        for e in &events {
            info!(tier = %e.tier, count = e.pieces.len(), "tier unlocked");
        }
        if let Err(e) = self.unlocks.save(self.store.as_mut()) {
            warn!(error = %e, "could not save unlocks");
        }
        events
    }

    fn update_high_score(&mut self) {
        if self.state.score.bump_high_score() {
            if let Err(e) = save_high_score(self.store.as_mut(), self.state.score.high_score) {
                warn!(error = %e, "could not save high score");
            }
        }
    }

    /// Zero the next pending line. Game over is evaluated once the queue drains.
    pub fn apply_next_clear(&mut self) -> Option<LineRef> {
        let line = self.state.pending_clears.pop_front()?;
        line.apply(&mut self.state.grid);
        if !self.state.clears_pending() {
            self.state.clear_color = None;
            self.evaluate_game_over();
        }
        Some(line)
    }

    /// Apply every pending clear.
    pub fn finish_clears(&mut self) {
        while self.apply_next_clear().is_some() {}
    }

    /// Re-check the loss condition against the current grid and rack.
    /// Rotations count only while a rotate token is available.
    pub fn evaluate_game_over(&mut self) -> bool {
        let allow_rotations = self.state.tokens.has(TokenKind::Rotate);
        let over = !has_any_move(&self.state.rack, &self.state.grid, allow_rotations);
        if over && !self.state.is_game_over {
            info!(score = self.state.score.score, "game over");
        }
        self.state.is_game_over = over;
        over
    }

    fn transform_piece(
        &mut self,
        slot: usize,
        kind: TokenKind,
        f: impl FnOnce(&PieceInstance) -> Shape,
    ) -> Result<(), ActionError> {
        // A snapshot taken now would hold the completed lines, and undoing to it
        // would leave them on the board to be scored again.
        self.guard_playable()?;
        let shape = f(self.piece_in(slot)?);
        if !self.state.tokens.has(kind) {
            return Err(ActionError::NoTokens(kind));
        }
        let snap = self.state.snapshot();
        self.state.history.push(snap);
        self.state.tokens.consume(kind);
        let id = self.factory.fresh_id();
        if let Some(piece) = self.state.rack.get_mut(slot) {
            piece.current_shape = shape;
            piece.instance_id = id;
        }
        debug!(slot, token = %kind, "piece transformed");
        self.evaluate_game_over();
        Ok(())
    }

    /// Turn the slot's piece 90° clockwise for one rotate token.
    #[instrument(skip(self))]
    pub fn rotate_piece(&mut self, slot: usize) -> Result<(), ActionError> {
        self.transform_piece(slot, TokenKind::Rotate, |p| p.current_shape.rotate_clockwise())
    }

    /// Mirror the slot's piece for one flip token.
    #[instrument(skip(self))]
    pub fn flip_piece(&mut self, slot: usize) -> Result<(), ActionError> {
        self.transform_piece(slot, TokenKind::Flip, |p| p.current_shape.flip_horizontal())
    }

    /// Step back one snapshot and pay one undo token from the restored purse.
    /// Allowed after game over. If the restored purse is empty, the undone move
    /// is the one that earned the token being spent, so nothing is charged.
    #[instrument(skip(self))]
    pub fn undo(&mut self) -> Result<(), ActionError> {
        if !self.state.tokens.has(TokenKind::Undo) {
            return Err(ActionError::NoTokens(TokenKind::Undo));
        }
        let snap = self.state.history.pop().ok_or(ActionError::NothingToUndo)?;
        self.state.restore(snap);
        if !self.state.tokens.consume(TokenKind::Undo) {
            debug!("undo token came from the undone move");
        }
        self.state.pending_clears.clear();
        self.state.clear_color = None;
        self.state.is_game_over = false;
        info!(score = self.state.score.score, history = self.state.history.len(), "undo");
        self.evaluate_game_over();
        Ok(())
    }

    /// Manual clear-line power-up: queue the cell's row and column, each only if
    /// it holds any block. No points, combo untouched.
    #[instrument(skip(self))]
    pub fn clear_line_at(&mut self, row: usize, col: usize) -> Result<Vec<LineRef>, ActionError> {
        self.guard_playable()?;
        let grid = &self.state.grid;
        if row >= grid.rows() || col >= grid.cols() {
            return Err(ActionError::OutOfBounds { row, col });
        }
        if !self.state.tokens.has(TokenKind::ClearLine) {
            return Err(ActionError::NoTokens(TokenKind::ClearLine));
        }
        let mut lines = Vec::new();
        if grid.row_has_blocks(row) {
            lines.push(LineRef::Row(row));
        }
        if grid.column_has_blocks(col) {
            lines.push(LineRef::Column(col));
        }
        if lines.is_empty() {
            return Err(ActionError::NothingToClear);
        }
        let snap = self.state.snapshot();
        self.state.history.push(snap);
        self.state.tokens.consume(TokenKind::ClearLine);
        self.state.pending_clears.extend(lines.iter().copied());
        self.state.clear_color = None;
        info!(?lines, "manual clear");
        Ok(lines)
    }

    /// Wipe the whole grid.
    #[instrument(skip(self))]
    pub fn full_clear(&mut self) -> Result<(), ActionError> {
        self.guard_playable()?;
        let snap = self.state.snapshot();
        self.state.history.push(snap);
        self.state.grid.clear_all();
        info!("grid wiped");
        self.evaluate_game_over();
        Ok(())
    }

    /// Rotate one column by a cell with wrap-around; `direction >= 0` moves up.
    #[instrument(skip(self))]
    pub fn shift_column(&mut self, col: usize, direction: i32) -> Result<(), ActionError> {
        self.guard_playable()?;
        if col >= self.state.grid.cols() {
            return Err(ActionError::OutOfBounds { row: 0, col });
        }
        let snap = self.state.snapshot();
        self.state.history.push(snap);
        self.state.grid.shift_column(col, direction);
        self.evaluate_game_over();
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.state.is_paused = !self.state.is_paused;
        self.state.is_paused
    }

    /// Forget all unlocks and persist the empty set.
    pub fn reset_unlocks(&mut self) {
        if let Err(e) = self.unlocks.reset(self.store.as_mut()) {
            warn!(error = %e, "could not reset unlocks");
        }
    }
}
