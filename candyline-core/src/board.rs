//! Board model: grid of token cells addressed by (row, col)
//!
//! Row 0 is the top of the board; gravity pulls toward the last row.

use std::fmt;
use std::ops::{Index, IndexMut};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tokens::{Catalog, TokenId};

// ============================================================================
// COORDINATES
// ============================================================================

/// Zero-based grid position
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Exactly one step apart along a single axis (4-neighbourhood)
    pub fn is_adjacent(&self, other: Coord) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }

    /// Neighbour in `direction`, or `None` when it would leave a
    /// `rows` x `cols` board
    pub fn step(&self, direction: Direction, rows: usize, cols: usize) -> Option<Coord> {
        let (dr, dc) = direction.delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < rows && col < cols).then_some(Coord::new(row, col))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Swap direction on the grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Row-decreasing
    Up,
    /// Row-increasing
    Down,
    /// Column-decreasing
    Left,
    /// Column-increasing
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// (row delta, col delta)
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Which lines (rows or columns) an operation touches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lines {
    All,
    Only(usize),
}

impl Lines {
    /// Concrete indices out of `count` lines; an out-of-range `Only` yields nothing
    pub fn indices(self, count: usize) -> std::ops::Range<usize> {
        match self {
            Lines::All => 0..count,
            Lines::Only(i) if i < count => i..i + 1,
            Lines::Only(_) => 0..0,
        }
    }
}

// ============================================================================
// CELLS
// ============================================================================

/// Lifecycle marker of a cell within one resolution cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Normal,
    /// Matched and awaiting collapse
    Canceled,
}

/// One grid position.
///
/// `handle` is the host's opaque reference to the visual actor; the board
/// stores and moves it but never looks inside.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell<H = ()> {
    pub state: CellState,
    pub token: TokenId,
    pub handle: H,
}

impl<H> Cell<H> {
    pub fn new(token: TokenId, handle: H) -> Self {
        Self {
            state: CellState::Normal,
            token,
            handle,
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.state == CellState::Canceled
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("board dimensions must be non-zero, got {rows}x{cols}")]
    EmptyBoard { rows: usize, cols: usize },
    #[error("coordinate {0} is outside the board")]
    OutOfBounds(Coord),
    #[error("no token kind satisfies the adjacency rule at {0}")]
    CatalogExhausted(Coord),
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("unknown token glyph {glyph:?} at {at}")]
    UnknownGlyph { glyph: char, at: Coord },
}

pub type Result<T> = std::result::Result<T, BoardError>;

// ============================================================================
// BOARD
// ============================================================================

/// Fixed-size grid of cells, stored row-major
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board<H = ()> {
    rows: usize,
    cols: usize,
    cells: Vec<Cell<H>>,
}

impl Board<()> {
    /// Random fill honouring the adjacency rule.
    ///
    /// Cells are filled in row-major order; each picks uniformly among kinds
    /// that differ from the cell above and the cell to the left. Fails only
    /// when the catalog cannot satisfy both neighbours at once; with two kinds
    /// the fill degenerates to a checkerboard, so in practice only a
    /// single-kind catalog on a multi-cell board fails.
    pub fn generate<R: Rng>(rows: usize, cols: usize, catalog: &Catalog, rng: &mut R) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(BoardError::EmptyBoard { rows, cols });
        }

        let mut cells: Vec<Cell> = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let mut excluded = Vec::with_capacity(2);
                if row > 0 {
                    excluded.push(cells[(row - 1) * cols + col].token);
                }
                if col > 0 {
                    excluded.push(cells[row * cols + col - 1].token);
                }
                let token = catalog
                    .random_excluding(rng, &excluded)
                    .ok_or(BoardError::CatalogExhausted(Coord::new(row, col)))?;
                cells.push(Cell::new(token, ()));
            }
        }

        Ok(Self { rows, cols, cells })
    }

    /// Build a board from glyph rows, e.g. `["ABCA", "BCAB"]`
    pub fn from_rows<S: AsRef<str>>(rows: &[S], catalog: &Catalog) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(BoardError::EmptyBoard {
                rows: height,
                cols: width,
            });
        }

        let mut cells = Vec::with_capacity(height * width);
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(BoardError::RaggedRow {
                    row,
                    found,
                    expected: width,
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                let token = catalog.id_of_glyph(glyph).ok_or(BoardError::UnknownGlyph {
                    glyph,
                    at: Coord::new(row, col),
                })?;
                cells.push(Cell::new(token, ()));
            }
        }

        Ok(Self {
            rows: height,
            cols: width,
            cells,
        })
    }
}

impl<H> Board<H> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    /// Fail with [`BoardError::OutOfBounds`] unless `coord` is on the board
    pub fn validate(&self, coord: Coord) -> Result<Coord> {
        if self.in_bounds(coord) {
            Ok(coord)
        } else {
            Err(BoardError::OutOfBounds(coord))
        }
    }

    fn offset(&self, coord: Coord) -> usize {
        coord.row * self.cols + coord.col
    }

    pub fn get(&self, coord: Coord) -> Option<&Cell<H>> {
        self.in_bounds(coord).then(|| &self.cells[self.offset(coord)])
    }

    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Cell<H>> {
        if self.in_bounds(coord) {
            let offset = self.offset(coord);
            Some(&mut self.cells[offset])
        } else {
            None
        }
    }

    /// Replace the cell at `coord`, returning the previous one
    pub fn set(&mut self, coord: Coord, cell: Cell<H>) -> Result<Cell<H>> {
        let coord = self.validate(coord)?;
        let offset = self.offset(coord);
        Ok(std::mem::replace(&mut self.cells[offset], cell))
    }

    /// Token kind at `coord`; panics when out of bounds
    pub fn token(&self, coord: Coord) -> TokenId {
        self[coord].token
    }

    /// Exchange two whole cells (state, token, handle). No adjacency check.
    pub fn exchange(&mut self, a: Coord, b: Coord) -> Result<()> {
        let a = self.offset(self.validate(a)?);
        let b = self.offset(self.validate(b)?);
        self.cells.swap(a, b);
        Ok(())
    }

    /// Reorder one column so that new row `i` holds the cell previously at
    /// row `order[i]`. `order` must be a permutation of `0..rows`.
    pub(crate) fn permute_column(&mut self, col: usize, order: &[usize]) {
        debug_assert_eq!(order.len(), self.rows);
        let mut placed = vec![false; self.rows];
        for start in 0..self.rows {
            if placed[start] {
                continue;
            }
            let mut current = start;
            loop {
                placed[current] = true;
                let next = order[current];
                if next == start {
                    break;
                }
                let a = self.offset(Coord::new(current, col));
                let b = self.offset(Coord::new(next, col));
                self.cells.swap(a, b);
                current = next;
            }
        }
    }

    /// All coordinates in row-major order
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let cols = self.cols;
        (0..self.rows * self.cols).map(move |i| Coord::new(i / cols, i % cols))
    }

    /// Cells with their coordinates in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Cell<H>)> {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (Coord::new(i / cols, i % cols), cell))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Coord, &mut Cell<H>)> {
        let cols = self.cols;
        self.cells
            .iter_mut()
            .enumerate()
            .map(move |(i, cell)| (Coord::new(i / cols, i % cols), cell))
    }

    pub fn canceled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_canceled()).count()
    }

    /// Pairs of orthogonal neighbours sharing a token kind
    pub fn adjacent_duplicates(&self) -> Vec<(Coord, Coord)> {
        let mut pairs = Vec::new();
        for coord in self.coords() {
            for direction in [Direction::Right, Direction::Down] {
                if let Some(next) = coord.step(direction, self.rows, self.cols) {
                    if self.token(coord) == self.token(next) {
                        pairs.push((coord, next));
                    }
                }
            }
        }
        pairs
    }

    /// Rebuild the board with new handles, keeping tokens and states
    pub fn map_handles<G, F>(self, mut f: F) -> Board<G>
    where
        F: FnMut(Coord, Cell<H>) -> G,
    {
        let cols = self.cols;
        let cells = self
            .cells
            .into_iter()
            .enumerate()
            .map(|(i, cell)| {
                let state = cell.state;
                let token = cell.token;
                let handle = f(Coord::new(i / cols, i % cols), cell);
                Cell {
                    state,
                    token,
                    handle,
                }
            })
            .collect();
        Board {
            rows: self.rows,
            cols: self.cols,
            cells,
        }
    }

    /// Handle-free copy of tokens and states, for scratch work
    pub fn to_plain(&self) -> Board<()> {
        Board {
            rows: self.rows,
            cols: self.cols,
            cells: self
                .cells
                .iter()
                .map(|c| Cell {
                    state: c.state,
                    token: c.token,
                    handle: (),
                })
                .collect(),
        }
    }

    /// Token kinds, row by row
    pub fn token_rows(&self) -> Vec<Vec<TokenId>> {
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().map(|c| c.token).collect())
            .collect()
    }

    /// One line per row using catalog glyphs; canceled cells print as `.`
    pub fn render(&self, catalog: &Catalog) -> String {
        let mut out = String::with_capacity(self.rows * (self.cols + 1));
        for row in self.cells.chunks(self.cols) {
            for cell in row {
                out.push(if cell.is_canceled() {
                    '.'
                } else {
                    catalog.glyph(cell.token)
                });
            }
            out.push('\n');
        }
        out
    }
}

impl<H> Index<Coord> for Board<H> {
    type Output = Cell<H>;

    fn index(&self, coord: Coord) -> &Self::Output {
        assert!(self.in_bounds(coord), "coordinate {} is outside the board", coord);
        &self.cells[self.offset(coord)]
    }
}

impl<H> IndexMut<Coord> for Board<H> {
    fn index_mut(&mut self, coord: Coord) -> &mut Self::Output {
        assert!(self.in_bounds(coord), "coordinate {} is outside the board", coord);
        let offset = self.offset(coord);
        &mut self.cells[offset]
    }
}

// ============================================================================
// TESTS
// ============================================================================
