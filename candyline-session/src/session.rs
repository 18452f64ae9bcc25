//! Resolution orchestrator
//!
//! A [`Session`] owns the board, the score and the presenter. Each gesture is
//! handled to completion before the next one: board mutations happen
//! synchronously, then the session waits for the presenter's effects
//! (bounded by the configured watchdog) before taking the next step.
//!
//! Turn flow for a swap:
//! 1. Exchange the two cells and play the swap effect
//! 2. Scan the lines the swap touched; no run means swap back and stop
//! 3. Clear matched cells, score them, collapse and refill their columns
//! 4. Rescan the whole board and repeat step 3 until nothing matches
//!
//! Step 4 has no natural bound, so the number of extra rounds is capped by
//! `GameConfig::max_cascades`.

use std::collections::BTreeSet;

use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use thiserror::Error;

use candyline_core::gravity::{collapse, regenerate};
use candyline_core::layout::{drag_direction, drag_exceeds};
use candyline_core::matcher::{scan_board, scan_swap, sorted, MatchSet};
use candyline_core::swap::{neighbor, try_swap, validate_swap};
use candyline_core::{
    find_matching_swap, Board, BoardError, Catalog, CellState, ConfigError, Coord, Direction,
    GameConfig, Layout, Lines, Point, Scoreboard, SwapError, SwapPair, TokenId,
};

use crate::gesture::Gesture;
use crate::presenter::{join_all, Completion, Presenter};

/// Scale of the anchored cell
pub const HIGHLIGHT_SCALE: f32 = 1.2;
/// Resting scale of every token
pub const NORMAL_SCALE: f32 = 1.0;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("board setup failed: {0}")]
    Board(#[from] BoardError),
    #[error("token id {token} at {at} is not in the catalog")]
    UnknownToken { token: TokenId, at: Coord },
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// What a gesture did
#[derive(Clone, Debug, PartialEq)]
pub enum TurnOutcome {
    /// Nothing happened (no anchor, short drag, off-board or canceled cell)
    Ignored,
    /// First selection made
    Anchored(Coord),
    /// Second click could not swap; the clicked cell is the new anchor
    Reanchored { from: Coord, to: Coord },
    /// Swap refused; the board is untouched and the anchor cleared
    Invalid(SwapError),
    /// Swap made no run and was undone
    Reverted(SwapPair),
    /// Swap cleared runs. `cascades` counts the extra rounds found by
    /// full-board rescans after refilling.
    Resolved {
        swap: SwapPair,
        cleared: usize,
        cascades: u32,
        score_delta: u64,
    },
}

impl TurnOutcome {
    /// Whether the board was actually swapped (kept or reverted)
    pub fn is_move(&self) -> bool {
        matches!(self, TurnOutcome::Reverted(_) | TurnOutcome::Resolved { .. })
    }
}

/// Serializable view of a session for hosts
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub rows: usize,
    pub cols: usize,
    pub tokens: Vec<Vec<TokenId>>,
    pub score: u64,
    pub anchor: Option<Coord>,
    pub moves: u64,
}

/// One game: board, score, RNG and the presenter that shows it
pub struct Session<P: Presenter> {
    config: GameConfig,
    layout: Layout,
    board: Board<P::Handle>,
    presenter: P,
    score: Scoreboard,
    rng: ChaCha8Rng,
    anchor: Option<Coord>,
    moves: u64,
}

impl<P: Presenter> Session<P> {
    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Validate `config`, fill a fresh board and place every token
    pub fn init(config: GameConfig, presenter: P) -> Result<Self> {
        config.validate()?;
        let mut rng = config.rng();
        let board = Board::generate(config.rows, config.cols, &config.catalog, &mut rng)?;
        Ok(Self::assemble(config, presenter, board, rng))
    }

    /// Start from a prepared board. Board dimensions override the config.
    pub fn with_board(config: GameConfig, presenter: P, board: Board) -> Result<Self> {
        let config = GameConfig {
            rows: board.rows(),
            cols: board.cols(),
            ..config
        };
        config.validate()?;
        if let Some((at, cell)) = board
            .iter()
            .find(|(_, cell)| cell.token as usize >= config.catalog.len())
        {
            return Err(SessionError::UnknownToken {
                token: cell.token,
                at,
            });
        }
        let rng = config.rng();
        Ok(Self::assemble(config, presenter, board, rng))
    }

    fn assemble(config: GameConfig, mut presenter: P, board: Board, rng: ChaCha8Rng) -> Self {
        let layout = config.layout();
        let board = board.map_handles(|coord, cell| {
            let handle = presenter.instantiate(cell.token);
            presenter.place(&handle, layout.cell_center(coord));
            handle
        });

        tracing::info!(
            "Session started: {}x{} board, {} token kinds, cell size {}",
            config.rows,
            config.cols,
            config.catalog.len(),
            layout.cell_size()
        );

        Self {
            score: Scoreboard::new(config.token_score),
            config,
            layout,
            board,
            presenter,
            rng,
            anchor: None,
            moves: 0,
        }
    }

    /// Destroy every visual actor and hand the presenter back
    pub fn dispose(self) -> P {
        let Self {
            board,
            mut presenter,
            score,
            moves,
            ..
        } = self;
        board.map_handles(|_, cell| presenter.destroy(cell.handle));
        tracing::info!("Session disposed after {} moves, score {}", moves, score.total());
        presenter
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.config.catalog
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn board(&self) -> &Board<P::Handle> {
        &self.board
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn score(&self) -> u64 {
        self.score.total()
    }

    pub fn anchor(&self) -> Option<Coord> {
        self.anchor
    }

    /// Swaps performed so far, including reverted ones
    pub fn moves(&self) -> u64 {
        self.moves
    }

    /// Board as glyph rows
    pub fn render(&self) -> String {
        self.board.render(&self.config.catalog)
    }

    /// A swap that would clear something, if any exists
    pub fn hint(&self) -> Option<SwapPair> {
        find_matching_swap(&self.board)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            rows: self.board.rows(),
            cols: self.board.cols(),
            tokens: self.board.token_rows(),
            score: self.score.total(),
            anchor: self.anchor,
            moves: self.moves,
        }
    }

    // ========================================================================
    // ENTRY POINTS
    // ========================================================================

    /// Handle one pointer gesture to completion
    pub async fn handle_gesture(&mut self, gesture: Gesture) -> TurnOutcome {
        let outcome = match gesture {
            Gesture::Tap(coord) => self.tap(coord).await,
            Gesture::TapAt(point) | Gesture::DragStart(point) => match self.layout.cell_at(point) {
                Some(coord) => self.tap(coord).await,
                None => TurnOutcome::Ignored,
            },
            Gesture::DragMove { start, current } => self.drag(start, current).await,
        };
        tracing::debug!("{:?} -> {:?}", gesture, outcome);
        outcome
    }

    /// Swap two cells directly, bypassing selection
    pub async fn resolve_swap(&mut self, a: Coord, b: Coord) -> TurnOutcome {
        match validate_swap(&self.board, a, b) {
            Ok(pair) => self.resolve(pair).await,
            Err(err) => self.reject(err).await,
        }
    }

    /// Swap `cell` with its neighbour in `direction`
    pub async fn resolve_direction(&mut self, cell: Coord, direction: Direction) -> TurnOutcome {
        match neighbor(&self.board, cell, direction) {
            Ok(target) => self.resolve_swap(cell, target).await,
            Err(err) => self.reject(err).await,
        }
    }

    // ========================================================================
    // GESTURES
    // ========================================================================

    async fn tap(&mut self, coord: Coord) -> TurnOutcome {
        match self.board.get(coord) {
            Some(cell) if !cell.is_canceled() => {}
            _ => return TurnOutcome::Ignored,
        }

        let Some(anchor) = self.anchor else {
            self.set_anchor(coord).await;
            return TurnOutcome::Anchored(coord);
        };

        match validate_swap(&self.board, anchor, coord) {
            Ok(pair) => self.resolve(pair).await,
            Err(err) => {
                tracing::debug!("Second click rejected ({}), re-anchoring", err);
                self.clear_anchor().await;
                self.set_anchor(coord).await;
                TurnOutcome::Reanchored {
                    from: anchor,
                    to: coord,
                }
            }
        }
    }

    async fn drag(&mut self, start: Point, current: Point) -> TurnOutcome {
        let Some(anchor) = self.anchor else {
            return TurnOutcome::Ignored;
        };
        if !drag_exceeds(start, current, self.config.min_drag_distance) {
            return TurnOutcome::Ignored;
        }
        self.resolve_direction(anchor, drag_direction(start, current)).await
    }

    async fn set_anchor(&mut self, coord: Coord) {
        self.anchor = Some(coord);
        let effect = self
            .presenter
            .play_scale(&self.board[coord].handle, HIGHLIGHT_SCALE);
        self.settle(vec![effect], "highlight").await;
    }

    async fn clear_anchor(&mut self) {
        if let Some(anchor) = self.anchor.take() {
            let effect = self
                .presenter
                .play_scale(&self.board[anchor].handle, NORMAL_SCALE);
            self.settle(vec![effect], "highlight").await;
        }
    }

    async fn reject(&mut self, err: SwapError) -> TurnOutcome {
        tracing::debug!("Swap rejected: {}", err);
        self.clear_anchor().await;
        TurnOutcome::Invalid(err)
    }

    // ========================================================================
    // RESOLUTION
    // ========================================================================

    async fn resolve(&mut self, pair: SwapPair) -> TurnOutcome {
        // The swap effect resets the scale of both swapped cells
        match self.anchor {
            Some(anchor) if anchor == pair.from || anchor == pair.to => self.anchor = None,
            _ => self.clear_anchor().await,
        }

        if let Err(err) = self.swap_cells(pair).await {
            return TurnOutcome::Invalid(err);
        }
        self.moves += 1;

        let mut matches = scan_swap(&self.board, pair.from, pair.to);
        if matches.is_empty() {
            tracing::debug!("No run after {} <-> {}, swapping back", pair.from, pair.to);
            if let Err(err) = self.swap_cells(pair).await {
                tracing::warn!("Could not undo swap {} <-> {}: {}", pair.from, pair.to, err);
            }
            return TurnOutcome::Reverted(pair);
        }

        let mut cleared = 0;
        let mut score_delta = 0;
        let mut cascades = 0;
        loop {
            let (removed, delta) = self.clear_round(&matches).await;
            cleared += removed;
            score_delta += delta;

            matches = scan_board(&self.board);
            if matches.is_empty() {
                break;
            }
            if cascades >= self.config.max_cascades {
                tracing::warn!(
                    "Cascade limit {} reached with {} cells still matched",
                    self.config.max_cascades,
                    matches.len()
                );
                break;
            }
            cascades += 1;
            tracing::debug!("Cascade {}: {} cells matched", cascades, matches.len());
        }

        TurnOutcome::Resolved {
            swap: pair,
            cleared,
            cascades,
            score_delta,
        }
    }

    /// Exchange two cells and animate both handles into their new places
    async fn swap_cells(&mut self, pair: SwapPair) -> std::result::Result<(), SwapError> {
        try_swap(&mut self.board, pair.from, pair.to)?;

        let from_pos = self.layout.cell_center(pair.from);
        let to_pos = self.layout.cell_center(pair.to);
        let arriving = &self.board[pair.from].handle;
        let leaving = &self.board[pair.to].handle;

        let effects = vec![
            self.presenter.play_move(arriving, to_pos, from_pos),
            self.presenter.play_scale(arriving, NORMAL_SCALE),
            self.presenter.play_move(leaving, from_pos, to_pos),
            self.presenter.play_scale(leaving, NORMAL_SCALE),
        ];
        self.settle(effects, "swap").await;
        Ok(())
    }

    /// Clear, score, collapse and refill. Returns (cells removed, points).
    async fn clear_round(&mut self, matches: &MatchSet) -> (usize, u64) {
        let cells = sorted(matches);

        let mut effects = Vec::with_capacity(cells.len());
        for &at in &cells {
            let cell = &mut self.board[at];
            cell.state = CellState::Canceled;
            effects.push(self.presenter.play_clear(&cell.handle, cell.token));
        }
        self.settle(effects, "clear").await;

        let points = match self.score.add(cells.len()) {
            Some(change) => {
                self.presenter.score_changed(change);
                change.delta
            }
            None => 0,
        };

        let columns: BTreeSet<usize> = cells.iter().map(|c| c.col).collect();
        let mut vacated = Vec::new();
        let mut effects = Vec::new();
        for col in columns {
            let fallen = collapse(&mut self.board, Lines::Only(col));
            for slide in &fallen.slides {
                effects.push(self.presenter.play_move(
                    &self.board[slide.to].handle,
                    self.layout.cell_center(slide.from),
                    self.layout.cell_center(slide.to),
                ));
            }
            vacated.extend(fallen.vacated);
        }

        let layout = self.layout;
        let presenter = &mut self.presenter;
        regenerate(
            &mut self.board,
            &vacated,
            &self.config.catalog,
            &mut self.rng,
            |at, token, handle| {
                let fresh = presenter.instantiate(token);
                presenter.place(&fresh, layout.cell_center(at));
                presenter.set_scale(&fresh, 0.0);
                effects.push(presenter.play_scale(&fresh, NORMAL_SCALE));
                let spent = std::mem::replace(handle, fresh);
                presenter.destroy(spent);
            },
        );
        self.settle(effects, "refill").await;

        (cells.len(), points)
    }

    /// Wait for a batch of effects under the watchdog
    async fn settle(&self, effects: Vec<Completion>, stage: &str) {
        let report = join_all(effects, self.config.effect_timeout()).await;
        if !report.is_clean() {
            tracing::warn!(
                "{} effects: {} timed out, {} dropped; treating them as complete",
                stage,
                report.timed_out,
                report.dropped
            );
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
