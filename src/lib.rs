//! Tetris engine: grid, piece catalog and the placement / line-clearing rules.
//!
//! The library has no timers and no I/O. A host drives it by calling
//! [`Game::tick`] on its gravity schedule and [`Game::command`] on input, then
//! renders [`Game::snapshot`] or [`Game::render_grid`].

pub mod config;
pub mod game;
pub mod grid;
pub mod piece;

pub use config::{ConfigError, EngineConfig};
pub use game::{
    line_clear_score, level_for_lines, ActivePiece, Command, Game, GameEvent, GameOverCause,
    Outcome, Phase, Snapshot, SpawnResult,
};
pub use grid::{Cell, Grid};
pub use piece::{
    Offset, PieceProvider, RandomPieceProvider, SequencePieceProvider, Shape,
};
