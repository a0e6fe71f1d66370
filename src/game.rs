use std::collections::VecDeque;
use std::time::Duration;

use log::{debug, info};

use crate::config::{ConfigError, EngineConfig};
use crate::grid::{Cell, Grid};
use crate::piece::{PieceProvider, RandomPieceProvider, Shape};

// ============================================================================
// Scoring
// ============================================================================

pub const LINES_PER_LEVEL: u32 = 10;

pub const SCORE_SINGLE: u32 = 100;
pub const SCORE_DOUBLE: u32 = 300;
pub const SCORE_TRIPLE: u32 = 500;
pub const SCORE_TETRIS: u32 = 800;

/// A single piece spans at most four rows.
pub const MAX_LINES_PER_LOCK: u32 = 4;

/// Points for clearing `lines` rows in one lock. Counts above four cannot
/// come from a single piece and score as four.
pub fn line_clear_score(lines: u32) -> u32 {
    match lines.min(MAX_LINES_PER_LOCK) {
        0 => 0,
        1 => SCORE_SINGLE,
        2 => SCORE_DOUBLE,
        3 => SCORE_TRIPLE,
        _ => SCORE_TETRIS,
    }
}

pub fn level_for_lines(lines: u32) -> u32 {
    1 + lines / LINES_PER_LEVEL
}

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ActivePiece {
    pub shape: Shape,
    pub rotation: usize,
    pub row: i16,
    pub col: i16,
}

impl ActivePiece {
    pub fn new(shape: Shape, row: i16, col: i16) -> Self {
        Self {
            shape,
            rotation: 0,
            row,
            col,
        }
    }

    /// Absolute `(row, col)` of each of the four cells. Rows may be negative.
    pub fn cells(&self) -> [(i16, i16); 4] {
        let offsets = *self.shape.offsets(self.rotation);
        offsets.map(|(dr, dc)| (self.row + dr, self.col + dc))
    }

    /// `None` when the shifted pivot leaves the `i16` coordinate range.
    fn moved(&self, d_row: i16, d_col: i16) -> Option<Self> {
        Some(Self {
            row: self.row.checked_add(d_row)?,
            col: self.col.checked_add(d_col)?,
            ..*self
        })
    }

    fn rotated(&self) -> Self {
        Self {
            rotation: (self.rotation + 1) % self.shape.state_count(),
            ..*self
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
}

/// Spawning, locking and line clearing finish inside a single call, so only
/// the resting phases are observable.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// No active piece; the next one spawns on [`Game::start`].
    Idle,
    Falling,
    GameOver,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpawnResult {
    Spawned,
    Blocked,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameOverCause {
    SpawnBlocked,
    LockedAboveGrid,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PieceSpawned(Shape),
    PieceMoved,
    PieceRotated,
    PieceLocked,
    LinesCleared(u32),
    LevelUp(u32),
    GameOver(GameOverCause),
    GameReset,
}

/// What a single `tick` or `command` changed.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Outcome {
    pub moved: bool,
    pub rotated: bool,
    pub locked: bool,
    pub lines_cleared: u32,
    pub score_delta: u32,
    /// Game over was triggered by this call.
    pub game_over: bool,
}

/// Read model for renderers.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Snapshot {
    pub cells: Vec<Vec<Cell>>,
    pub active: Option<ActivePiece>,
    pub next: Vec<Shape>,
    pub score: u32,
    pub lines_cleared: u32,
    pub level: u32,
    pub game_over: bool,
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    config: EngineConfig,
    grid: Grid,
    active: Option<ActivePiece>,
    preview_queue: VecDeque<Shape>,
    score: u32,
    lines_cleared: u32,
    level: u32,
    phase: Phase,
    piece_provider: Box<dyn PieceProvider>,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let provider = RandomPieceProvider::new(config.seed);
        Self::with_provider(config, Box::new(provider))
    }

    pub fn with_provider(
        config: EngineConfig,
        provider: Box<dyn PieceProvider>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::new(config.width, config.height);
        let preview_queue = VecDeque::with_capacity(config.preview_count);

        Ok(Self {
            config,
            grid,
            active: None,
            preview_queue,
            score: 0,
            lines_cleared: 0,
            level: 1,
            phase: Phase::Idle,
            piece_provider: provider,
            events: Vec::new(),
        })
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct grid access for setting up positions. Callers must not cover
    /// the active piece's cells.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn active_piece(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn preview(&self) -> impl Iterator<Item = Shape> + '_ {
        self.preview_queue.iter().copied()
    }

    pub fn next_piece(&self) -> Option<Shape> {
        self.preview_queue.front().copied()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// How long the host should wait between ticks at the current level.
    pub fn gravity_interval(&self) -> Duration {
        self.config.gravity_interval(self.level)
    }

    // ------------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------------

    fn fill_preview(&mut self) {
        while self.preview_queue.len() < self.config.preview_count {
            self.preview_queue.push_back(self.piece_provider.next_piece());
        }
    }

    /// Spawns the next queued piece. Returns `None` unless the engine is idle.
    pub fn start(&mut self) -> Option<SpawnResult> {
        if self.phase != Phase::Idle {
            return None;
        }
        Some(self.spawn_next())
    }

    fn spawn_next(&mut self) -> SpawnResult {
        self.fill_preview();
        let shape = match self.preview_queue.pop_front() {
            Some(shape) => shape,
            None => self.piece_provider.next_piece(),
        };
        self.fill_preview();
        self.spawn(shape)
    }

    /// Spawns `shape` at row 0 of the configured spawn column.
    pub fn spawn(&mut self, shape: Shape) -> SpawnResult {
        self.spawn_at(shape, 0, self.config.spawn_column())
    }

    /// Installs `shape` (rotation 0) with its pivot at `(row, col)`, or ends the
    /// game if that placement is blocked.
    pub fn spawn_at(&mut self, shape: Shape, row: i16, col: i16) -> SpawnResult {
        if self.phase == Phase::GameOver {
            return SpawnResult::Blocked;
        }
        if !self.can_place(shape, 0, row, col) {
            self.active = None;
            self.trigger_game_over(GameOverCause::SpawnBlocked);
            return SpawnResult::Blocked;
        }

        debug!("spawned {shape:?} at ({row}, {col})");
        self.active = Some(ActivePiece::new(shape, row, col));
        self.phase = Phase::Falling;
        self.events.push(GameEvent::PieceSpawned(shape));
        SpawnResult::Spawned
    }

    // ------------------------------------------------------------------------
    // Movement
    // ------------------------------------------------------------------------

    /// Legality of a placement: every cell inside the columns, above the floor
    /// and, when on the grid, on an empty cell. Rows above the grid are free.
    pub fn can_place(&self, shape: Shape, rotation: usize, row: i16, col: i16) -> bool {
        shape.offsets(rotation).iter().all(|&(dr, dc)| {
            let (Some(r), Some(c)) = (row.checked_add(dr), col.checked_add(dc)) else {
                return false;
            };
            self.grid.is_inside_columns(c)
                && !self.grid.is_below_bottom(r)
                && !self.grid.is_occupied(r, c)
        })
    }

    fn fits(&self, piece: &ActivePiece) -> bool {
        self.can_place(piece.shape, piece.rotation, piece.row, piece.col)
    }

    /// Shifts the active piece. Pieces never move up, so `d_row < 0` is
    /// rejected.
    pub fn move_piece(&mut self, d_row: i16, d_col: i16) -> bool {
        if self.phase != Phase::Falling || d_row < 0 {
            return false;
        }
        let Some(piece) = self.active else {
            return false;
        };
        let Some(moved) = piece.moved(d_row, d_col) else {
            return false;
        };
        if !self.fits(&moved) {
            return false;
        }
        self.active = Some(moved);
        self.events.push(GameEvent::PieceMoved);
        true
    }

    /// Advances to the next rotation state in place. Blocked rotations are
    /// rejected outright; there are no wall kicks.
    pub fn rotate(&mut self) -> bool {
        if self.phase != Phase::Falling {
            return false;
        }
        let Some(piece) = self.active else {
            return false;
        };
        let rotated = piece.rotated();
        if !self.fits(&rotated) {
            return false;
        }
        self.active = Some(rotated);
        self.events.push(GameEvent::PieceRotated);
        true
    }

    // ------------------------------------------------------------------------
    // Locking and line clearing
    // ------------------------------------------------------------------------

    /// Gravity step: move down one row, or lock and spawn the next piece.
    pub fn tick(&mut self) -> Outcome {
        if self.phase != Phase::Falling {
            return Outcome::default();
        }
        if self.move_piece(1, 0) {
            return Outcome {
                moved: true,
                ..Outcome::default()
            };
        }
        self.lock_and_spawn()
    }

    pub fn command(&mut self, command: Command) -> Outcome {
        match command {
            Command::MoveLeft => Outcome {
                moved: self.move_piece(0, -1),
                ..Outcome::default()
            },
            Command::MoveRight => Outcome {
                moved: self.move_piece(0, 1),
                ..Outcome::default()
            },
            Command::SoftDrop => Outcome {
                moved: self.move_piece(1, 0),
                ..Outcome::default()
            },
            Command::Rotate => Outcome {
                rotated: self.rotate(),
                ..Outcome::default()
            },
            Command::HardDrop => self.hard_drop(),
        }
    }

    fn hard_drop(&mut self) -> Outcome {
        if self.phase != Phase::Falling {
            return Outcome::default();
        }
        let mark = self.events.len();
        let mut moved = false;
        while self.move_piece(1, 0) {
            moved = true;
        }
        // The drop reads as a single lock, not a run of moves.
        self.events.truncate(mark);

        let mut outcome = self.lock_and_spawn();
        outcome.moved = moved;
        outcome
    }

    fn lock_and_spawn(&mut self) -> Outcome {
        let mut outcome = self.lock();
        if outcome.locked && !outcome.game_over && self.spawn_next() == SpawnResult::Blocked {
            outcome.game_over = true;
        }
        outcome
    }

    /// Writes the active piece into the grid and clears full rows. A cell still
    /// above the grid at this point ends the game.
    pub fn lock(&mut self) -> Outcome {
        if self.phase != Phase::Falling {
            return Outcome::default();
        }
        let Some(piece) = self.active.take() else {
            return Outcome::default();
        };

        let mut overflow = false;
        for (row, col) in piece.cells() {
            if row < 0 {
                overflow = true;
                continue;
            }
            self.grid.set_cell(row as usize, col as usize, piece.shape);
        }
        debug!(
            "locked {:?} at ({}, {}) rotation {}",
            piece.shape, piece.row, piece.col, piece.rotation
        );
        self.events.push(GameEvent::PieceLocked);
        self.phase = Phase::Idle;

        let score_before = self.score;
        let lines = self.clear_lines();
        let mut outcome = Outcome {
            locked: true,
            lines_cleared: lines,
            score_delta: self.score - score_before,
            ..Outcome::default()
        };

        if overflow {
            self.trigger_game_over(GameOverCause::LockedAboveGrid);
            outcome.game_over = true;
        }
        outcome
    }

    /// Removes every full row, scoring the count as one clear event.
    pub fn clear_lines(&mut self) -> u32 {
        let mut removed = 0;
        // Scan bottom-up. `cursor - 1` is the row under examination; the cursor
        // only moves up past a row that is not full, because a collapse refills
        // the current row from the one above.
        let mut cursor = self.grid.height();
        while cursor > 0 {
            let row = cursor - 1;
            if self.grid.is_row_full(row) {
                self.grid.collapse_row(row);
                removed += 1;
            } else {
                cursor -= 1;
            }
        }

        if removed > 0 {
            self.award_lines(removed);
        }
        removed
    }

    /// Credits `lines` rows cleared by one lock.
    pub fn award_lines(&mut self, lines: u32) {
        if lines == 0 {
            return;
        }
        self.score = self.score.saturating_add(line_clear_score(lines));
        self.lines_cleared = self.lines_cleared.saturating_add(lines);
        self.events.push(GameEvent::LinesCleared(lines));

        let new_level = level_for_lines(self.lines_cleared);
        if new_level > self.level {
            info!("level up: {} -> {new_level}", self.level);
            self.level = new_level;
            self.events.push(GameEvent::LevelUp(new_level));
        }
    }

    fn trigger_game_over(&mut self, cause: GameOverCause) {
        info!(
            "game over ({cause:?}): score {}, lines {}, level {}",
            self.score, self.lines_cleared, self.level
        );
        self.phase = Phase::GameOver;
        self.events.push(GameEvent::GameOver(cause));
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Back to an empty, idle engine. Call [`Game::start`] to play again.
    pub fn reset(&mut self) {
        self.grid.clear();
        self.active = None;
        self.preview_queue.clear();
        self.score = 0;
        self.lines_cleared = 0;
        self.level = 1;
        self.phase = Phase::Idle;
        self.events.clear();
        self.events.push(GameEvent::GameReset);
        info!("game reset");
    }

    pub fn restart(&mut self) -> SpawnResult {
        self.reset();
        self.spawn_next()
    }

    // ------------------------------------------------------------------------
    // Read model
    // ------------------------------------------------------------------------

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cells: self.grid.to_rows(),
            active: self.active,
            next: self.preview_queue.iter().copied().collect(),
            score: self.score,
            lines_cleared: self.lines_cleared,
            level: self.level,
            game_over: self.is_game_over(),
        }
    }

    /// Returns the visual grid state with the active piece overlaid.
    pub fn render_grid(&self) -> Vec<Vec<Cell>> {
        let mut visual_grid = self.grid.to_rows();

        if let Some(piece) = &self.active {
            for (row, col) in piece.cells() {
                if row >= 0 && !self.grid.is_below_bottom(row) && self.grid.is_inside_columns(col)
                {
                    visual_grid[row as usize][col as usize] = Cell::Filled(piece.shape);
                }
            }
        }

        visual_grid
    }

    /// Takes and clears all pending events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
