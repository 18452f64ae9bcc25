//! Run detection along rows and columns

use rustc_hash::FxHashSet;

use crate::board::{Board, Coord, Lines};

/// Shortest run that clears
pub const MIN_RUN: usize = 3;

/// Deduplicated set of matched coordinates
pub type MatchSet = FxHashSet<Coord>;

/// Scan direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Walk along rows
    Horizontal,
    /// Walk along columns
    Vertical,
}

/// Members of every run of [`MIN_RUN`] or more same-kind tokens on the
/// selected rows (horizontal) or columns (vertical).
///
/// A cell in two crossing runs appears once per run; collect into a
/// [`MatchSet`] to deduplicate.
pub fn scan_runs<H>(board: &Board<H>, axis: Axis, lines: Lines) -> Vec<Coord> {
    let (line_count, line_len) = match axis {
        Axis::Horizontal => (board.rows(), board.cols()),
        Axis::Vertical => (board.cols(), board.rows()),
    };
    let at = |line: usize, i: usize| match axis {
        Axis::Horizontal => Coord::new(line, i),
        Axis::Vertical => Coord::new(i, line),
    };

    let mut found = Vec::new();
    for line in lines.indices(line_count) {
        let mut run_start = 0;
        for i in 1..=line_len {
            let run_continues =
                i < line_len && board.token(at(line, i)) == board.token(at(line, run_start));
            if run_continues {
                continue;
            }
            if i - run_start >= MIN_RUN {
                found.extend((run_start..i).map(|j| at(line, j)));
            }
            run_start = i;
        }
    }
    found
}

/// Full-board scan in both directions
pub fn scan_board<H>(board: &Board<H>) -> MatchSet {
    let mut matches = MatchSet::default();
    matches.extend(scan_runs(board, Axis::Horizontal, Lines::All));
    matches.extend(scan_runs(board, Axis::Vertical, Lines::All));
    matches
}

/// Scan only the lines a swap between `a` and `b` can have changed.
///
/// A horizontal swap touches one row and two columns; a vertical swap one
/// column and two rows.
pub fn scan_swap<H>(board: &Board<H>, a: Coord, b: Coord) -> MatchSet {
    let mut matches = MatchSet::default();
    if a.row == b.row {
        matches.extend(scan_runs(board, Axis::Horizontal, Lines::Only(a.row)));
        matches.extend(scan_runs(board, Axis::Vertical, Lines::Only(a.col)));
        if b.col != a.col {
            matches.extend(scan_runs(board, Axis::Vertical, Lines::Only(b.col)));
        }
    } else {
        matches.extend(scan_runs(board, Axis::Vertical, Lines::Only(a.col)));
        matches.extend(scan_runs(board, Axis::Horizontal, Lines::Only(a.row)));
        matches.extend(scan_runs(board, Axis::Horizontal, Lines::Only(b.row)));
    }
    matches
}

/// Matched coordinates in row-major order
pub fn sorted(matches: &MatchSet) -> Vec<Coord> {
    let mut coords: Vec<Coord> = matches.iter().copied().collect();
    coords.sort_unstable();
    coords
}

// ============================================================================
// TESTS
// ============================================================================
