//! Candyline Core - Match-three board engine
//!
//! This crate provides the pure game logic for Candyline:
//! - Token catalog and board model (row-major grid, row 0 at the top)
//! - Swap validation and application
//! - Run detection along rows and columns
//! - Column collapse and random refill
//! - Scoring, world-space layout and configuration
//! - Hint search for swaps that produce a match

pub mod tokens;
pub mod board;
pub mod swap;
pub mod matcher;
pub mod gravity;
pub mod scoring;
pub mod layout;
pub mod config;
pub mod finder;

// Re-exports for convenient access
pub use tokens::{Catalog, TokenId, DEFAULT_TOKENS};
pub use board::{Board, BoardError, Cell, CellState, Coord, Direction, Lines};
pub use swap::{try_swap, try_swap_by_direction, validate_swap, SwapError, SwapPair};
pub use matcher::{scan_board, scan_runs, scan_swap, Axis, MatchSet, MIN_RUN};
pub use gravity::{collapse, regenerate, Collapse, Slide, Spawn};
pub use scoring::{ScoreDelta, Scoreboard, CANDY_SCORE};
pub use layout::{drag_direction, drag_exceeds, Layout, Point};
pub use config::{ConfigError, GameConfig};
pub use finder::{count_matching_swaps, find_matching_swap};
