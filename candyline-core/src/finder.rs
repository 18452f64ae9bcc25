//! Hint search: find a swap that would produce a match

use crate::board::{Board, Coord, Direction};
use crate::matcher::scan_swap;
use crate::swap::{try_swap, SwapError, SwapPair};

/// First swap (row-major, trying right then down) that yields at least one
/// run. Works on a scratch copy; `board` is not modified.
pub fn find_matching_swap<H>(board: &Board<H>) -> Option<SwapPair> {
    let mut scratch = board.to_plain();
    let coords: Vec<_> = scratch.coords().collect();

    for from in coords {
        for direction in [Direction::Right, Direction::Down] {
            let Some(to) = from.step(direction, scratch.rows(), scratch.cols()) else {
                continue;
            };
            match trial_swap(&mut scratch, from, to) {
                Ok(Some(pair)) => return Some(pair),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!("Hint search aborted at {} <-> {}: {}", from, to, err);
                    return None;
                }
            }
        }
    }
    None
}

/// Number of distinct swaps that produce a match
pub fn count_matching_swaps<H>(board: &Board<H>) -> usize {
    let mut scratch = board.to_plain();
    let coords: Vec<_> = scratch.coords().collect();
    let mut count = 0;

    for from in coords {
        for direction in [Direction::Right, Direction::Down] {
            let Some(to) = from.step(direction, scratch.rows(), scratch.cols()) else {
                continue;
            };
            match trial_swap(&mut scratch, from, to) {
                Ok(Some(_)) => count += 1,
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!("Swap count aborted at {} <-> {}: {}", from, to, err);
                    return count;
                }
            }
        }
    }
    count
}

/// Swap, scan, and swap back. `Ok(None)` when the swap is illegal or makes no
/// run; `Err` only when the undo fails and `scratch` is left swapped.
fn trial_swap(scratch: &mut Board, from: Coord, to: Coord) -> Result<Option<SwapPair>, SwapError> {
    if scratch.token(from) == scratch.token(to) {
        return Ok(None);
    }
    let Ok(pair) = try_swap(scratch, from, to) else {
        return Ok(None);
    };
    let hit = !scan_swap(scratch, from, to).is_empty();
    try_swap(scratch, from, to)?;
    Ok(hit.then_some(pair))
}

// ============================================================================
// TESTS
// ============================================================================
