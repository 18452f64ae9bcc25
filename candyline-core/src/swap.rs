//! Swap validation and application

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, Coord, Direction};

/// Why a swap was refused. The board is untouched in every case.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SwapError {
    #[error("cannot swap {0} with itself")]
    SameCell(Coord),
    #[error("{a} and {b} are not orthogonal neighbours")]
    NotAdjacent { a: Coord, b: Coord },
    #[error("{0} is outside the board")]
    OutOfBounds(Coord),
    #[error("no neighbour {direction:?} of {from}")]
    OffBoard { from: Coord, direction: Direction },
}

/// The two cells exchanged by a successful swap
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwapPair {
    pub from: Coord,
    pub to: Coord,
}

/// Check that `a` and `b` may be swapped without touching the board
pub fn validate_swap<H>(board: &Board<H>, a: Coord, b: Coord) -> Result<SwapPair, SwapError> {
    for c in [a, b] {
        if !board.in_bounds(c) {
            return Err(SwapError::OutOfBounds(c));
        }
    }
    if a == b {
        return Err(SwapError::SameCell(a));
    }
    if !a.is_adjacent(b) {
        return Err(SwapError::NotAdjacent { a, b });
    }
    Ok(SwapPair { from: a, to: b })
}

/// Exchange the cells at `a` and `b` (token, state and handle).
///
/// Applying the same swap twice restores the board.
pub fn try_swap<H>(board: &mut Board<H>, a: Coord, b: Coord) -> Result<SwapPair, SwapError> {
    let pair = validate_swap(board, a, b)?;
    board
        .exchange(pair.from, pair.to)
        .map_err(|_| SwapError::OutOfBounds(pair.to))?;
    Ok(pair)
}

/// Neighbour of `cell` in `direction`, if it exists on the board
pub fn neighbor<H>(board: &Board<H>, cell: Coord, direction: Direction) -> Result<Coord, SwapError> {
    if !board.in_bounds(cell) {
        return Err(SwapError::OutOfBounds(cell));
    }
    cell.step(direction, board.rows(), board.cols())
        .ok_or(SwapError::OffBoard {
            from: cell,
            direction,
        })
}

/// Swap `cell` with its neighbour in `direction`
pub fn try_swap_by_direction<H>(
    board: &mut Board<H>,
    cell: Coord,
    direction: Direction,
) -> Result<SwapPair, SwapError> {
    let target = neighbor(board, cell, direction)?;
    try_swap(board, cell, target)
}

// ============================================================================
// TESTS
// ============================================================================
