use std::collections::VecDeque;

use log::{debug, info, trace};

use crate::error::EngineError;
use crate::factory::{PieceProvider, RandomPieceProvider};
use crate::grid::Grid;
use crate::tetromino::{Tetromino, TetrominoKind, MAX_SHAPE_SIZE};

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_WIDTH: usize = 10;
pub const DEFAULT_HEIGHT: usize = 20;
pub const MIN_SIDE: usize = MAX_SHAPE_SIZE;
/// Undrained events beyond this are dropped, oldest first.
pub const MAX_PENDING_EVENTS: usize = 1024;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameStatus {
    Running,
    GameOver,
}

/// Abstract actions delivered by the input mapper and the gravity timer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    Tick,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    SessionStarted,
    PieceSpawned(TetrominoKind),
    PieceMoved,
    PieceRotated,
    PieceLocked,
    RowsCleared(u32),
    GameOver,
}

/// What a gravity step did.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickOutcome {
    /// The active piece moved down one row.
    Fell,
    /// The piece locked, `rows_cleared` rows were removed and the next piece
    /// was spawned (or the game ended).
    Locked { rows_cleared: u32 },
    /// Nothing happens after game over.
    Idle,
}

/// Read-only view handed to the renderer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Snapshot<'a> {
    pub grid: &'a Grid,
    pub active: Option<&'a Tetromino>,
    pub status: GameStatus,
}

impl Snapshot<'_> {
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }
}

// ============================================================================
// Game
// ============================================================================

/// The falling-block state machine. Owns the grid and the active piece; all
/// mutation goes through intents, each run to completion.
pub struct Game {
    grid: Grid,
    active: Option<Tetromino>,
    status: GameStatus,
    piece_provider: Box<dyn PieceProvider>,
    events: VecDeque<GameEvent>,
}

/// Every occupied cell of `piece` is on the board and on an empty cell.
fn fits(grid: &Grid, piece: &Tetromino) -> bool {
    piece
        .blocks()
        .all(|cell| grid.in_bounds(cell.x, cell.y) && !grid.is_occupied(cell.x, cell.y))
}

impl Game {
    /// A standard 10x20 session with pieces drawn from OS entropy.
    pub fn new() -> Result<Self, EngineError> {
        Self::with_provider(
            DEFAULT_WIDTH,
            DEFAULT_HEIGHT,
            Box::new(RandomPieceProvider::from_entropy()),
        )
    }

    pub fn with_provider(
        width: usize,
        height: usize,
        provider: Box<dyn PieceProvider>,
    ) -> Result<Self, EngineError> {
        if width < MIN_SIDE || height < MIN_SIDE {
            return Err(EngineError::GridTooSmall {
                width,
                height,
                min: MIN_SIDE,
            });
        }
        let mut game = Self {
            grid: Grid::new(width, height),
            active: None,
            status: GameStatus::Running,
            piece_provider: provider,
            events: VecDeque::new(),
        };
        game.start_session()?;
        Ok(game)
    }

    /// Starts from an existing board with `active` already placed. No spawn
    /// check is made on `active`; the caller sets up a consistent state.
    pub fn with_grid(grid: Grid, active: Tetromino, provider: Box<dyn PieceProvider>) -> Self {
        Self {
            grid,
            active: Some(active),
            status: GameStatus::Running,
            piece_provider: provider,
            events: VecDeque::new(),
        }
    }

    /// Starts from an existing board and spawns the first piece on it, which
    /// may end the game immediately.
    pub fn with_board(grid: Grid, provider: Box<dyn PieceProvider>) -> Result<Self, EngineError> {
        let mut game = Self {
            grid,
            active: None,
            status: GameStatus::Running,
            piece_provider: provider,
            events: VecDeque::new(),
        };
        game.spawn_next()?;
        Ok(game)
    }

    /// Empties the board and spawns a fresh piece, returning to `Running`.
    pub fn new_session(&mut self) -> Result<(), EngineError> {
        self.grid = Grid::new(self.grid.width(), self.grid.height());
        self.events.clear();
        self.start_session()
    }

    fn start_session(&mut self) -> Result<(), EngineError> {
        self.active = None;
        self.status = GameStatus::Running;
        info!(
            "new session on {}x{} grid",
            self.grid.width(),
            self.grid.height()
        );
        self.emit(GameEvent::SessionStarted);
        self.spawn_next()?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn active(&self) -> Option<&Tetromino> {
        self.active.as_ref()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            grid: &self.grid,
            active: self.active.as_ref(),
            status: self.status,
        }
    }

    /// Takes and clears all pending events.
    ///
    /// Every successful move (gravity included) queues an event, so drivers
    /// should drain once per frame. Past `MAX_PENDING_EVENTS` the oldest are
    /// discarded.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    fn emit(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.pop_front();
            trace!("event queue full, dropped oldest");
        }
        self.events.push_back(event);
    }

    // ------------------------------------------------------------------------
    // Rules
    // ------------------------------------------------------------------------

    pub fn can_place(&self, piece: &Tetromino) -> bool {
        fits(&self.grid, piece)
    }

    /// Centers the next piece at the top row. If it does not fit the game is
    /// over and no piece is active.
    pub fn spawn_next(&mut self) -> Result<GameStatus, EngineError> {
        let mut piece = self
            .piece_provider
            .next_piece()
            .ok_or(EngineError::NoPieceAvailable)?;

        let size = piece.shape().size() as i32;
        piece.position.x = self.grid.width() as i32 / 2 - size / 2;
        piece.position.y = 0;

        if fits(&self.grid, &piece) {
            debug!("spawned {:?} at {:?}", piece.kind(), piece.position);
            self.emit(GameEvent::PieceSpawned(piece.kind()));
            self.active = Some(piece);
        } else {
            info!("game over: {:?} cannot spawn", piece.kind());
            self.active = None;
            self.status = GameStatus::GameOver;
            self.emit(GameEvent::GameOver);
        }
        Ok(self.status)
    }

    /// Shifts the active piece, rolling back if the new spot is blocked.
    pub fn apply_move(&mut self, dx: i32, dy: i32) -> bool {
        if self.status != GameStatus::Running {
            return false;
        }
        let grid = &self.grid;
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        active.translate(dx, dy);
        if fits(grid, active) {
            self.emit(GameEvent::PieceMoved);
            true
        } else {
            active.translate(-dx, -dy);
            trace!("move ({dx}, {dy}) rejected");
            false
        }
    }

    /// Applies a quarter turn in place when the rotated shape fits; no kicks.
    pub fn apply_rotate(&mut self) -> bool {
        if self.status != GameStatus::Running {
            return false;
        }
        let grid = &self.grid;
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        if active.can_rotate_at(grid) {
            active.rotate();
            self.emit(GameEvent::PieceRotated);
            true
        } else {
            trace!("rotation of {:?} rejected", active.kind());
            false
        }
    }

    /// One gravity step: fall a row, or lock, clear and spawn the next piece.
    pub fn tick(&mut self) -> Result<TickOutcome, EngineError> {
        if self.status != GameStatus::Running || self.active.is_none() {
            return Ok(TickOutcome::Idle);
        }
        if self.apply_move(0, 1) {
            return Ok(TickOutcome::Fell);
        }

        self.lock_active();
        let rows_cleared = self.clear_completed_rows();
        self.spawn_next()?;
        Ok(TickOutcome::Locked { rows_cleared })
    }

    pub fn apply(&mut self, intent: Intent) -> Result<bool, EngineError> {
        let changed = match intent {
            Intent::MoveLeft => self.apply_move(-1, 0),
            Intent::MoveRight => self.apply_move(1, 0),
            Intent::SoftDrop => self.apply_move(0, 1),
            Intent::Rotate => self.apply_rotate(),
            Intent::Tick => self.tick()? != TickOutcome::Idle,
        };
        Ok(changed)
    }

    /// Writes the active piece into the grid and discards it.
    fn lock_active(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };
        let code = piece.kind().code();
        for cell in piece.blocks() {
            // Out-of-bounds cells are unreachable through the move rules.
            self.grid.set(cell.x, cell.y, code);
        }
        debug!("locked {:?} at {:?}", piece.kind(), piece.position);
        self.emit(GameEvent::PieceLocked);
    }

    /// Removes every full row, bottom to top, dropping the rows above it.
    /// Returns the number of rows removed.
    pub fn clear_completed_rows(&mut self) -> u32 {
        let mut cleared = 0;
        let mut row = self.grid.height();

        while row > 0 {
            if self.grid.is_row_full(row - 1) {
                self.grid.clear_row(row - 1);
                self.grid.sink_rows_above(row - 1);
                cleared += 1;
                // Don't step up: the row above now sits at this index
            } else {
                row -= 1;
            }
        }

        if cleared > 0 {
            debug!("cleared {cleared} row(s)");
            self.emit(GameEvent::RowsCleared(cleared));
        }
        cleared
    }

    // ------------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------------

    /// The grid codes with the active piece overlaid.
    pub fn render_grid(&self) -> Vec<Vec<u8>> {
        let mut visual = self.grid.rows().to_vec();
        if let Some(piece) = &self.active {
            let code = piece.kind().code();
            for cell in piece.blocks() {
                if self.grid.in_bounds(cell.x, cell.y) {
                    visual[cell.y as usize][cell.x as usize] = code;
                }
            }
        }
        visual
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::factory::SequencePieceProvider;

    pub fn empty_grid() -> Grid {
        Grid::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    pub fn fill_row(grid: &mut Grid, y: usize) {
        for x in 0..grid.width() {
            grid.set(x as i32, y as i32, TetrominoKind::T.code());
        }
    }

    pub fn fill_row_with_gap(grid: &mut Grid, y: usize, gap_x: usize) {
        for x in 0..grid.width() {
            if x != gap_x {
                grid.set(x as i32, y as i32, TetrominoKind::T.code());
            }
        }
    }

    pub fn sequence(kinds: &[TetrominoKind]) -> Box<dyn PieceProvider> {
        Box::new(SequencePieceProvider::new(kinds.to_vec()))
    }

    /// A default-sized session whose pieces are all `kind`.
    pub fn game_of(kind: TetrominoKind) -> Game {
        match Game::with_provider(DEFAULT_WIDTH, DEFAULT_HEIGHT, sequence(&[kind])) {
            Ok(game) => game,
            Err(err) => panic!("empty default grid rejected a spawn: {err}"),
        }
    }
}
