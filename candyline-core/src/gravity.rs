//! Column collapse and refill

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, CellState, Coord, Lines};
use crate::tokens::{Catalog, TokenId};

/// A surviving cell that fell to a new row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub from: Coord,
    pub to: Coord,
}

/// Result of collapsing one or more columns
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Collapse {
    /// Cells now at the top of their column that need a fresh token
    pub vacated: Vec<Coord>,
    /// Survivors whose row changed; stationary cells are not listed
    pub slides: Vec<Slide>,
}

impl Collapse {
    pub fn is_empty(&self) -> bool {
        self.vacated.is_empty() && self.slides.is_empty()
    }
}

/// A freshly spawned token
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    pub at: Coord,
    pub token: TokenId,
}

/// Compact survivors toward the bottom of each selected column.
///
/// Walking each column bottom-up, canceled cells are written from the top
/// down (in encounter order) and survivors from the bottom up, so survivors
/// keep their relative order. Canceled cells keep their `Canceled` state and
/// are reported in `vacated`.
pub fn collapse<H>(board: &mut Board<H>, columns: Lines) -> Collapse {
    let rows = board.rows();
    let mut result = Collapse::default();

    for col in columns.indices(board.cols()) {
        let mut order = vec![0; rows];
        let mut top = 0;
        let mut bottom = rows;

        for row in (0..rows).rev() {
            if board[Coord::new(row, col)].is_canceled() {
                order[top] = row;
                result.vacated.push(Coord::new(top, col));
                top += 1;
            } else {
                bottom -= 1;
                order[bottom] = row;
                if bottom != row {
                    result.slides.push(Slide {
                        from: Coord::new(row, col),
                        to: Coord::new(bottom, col),
                    });
                }
            }
        }

        board.permute_column(col, &order);
    }

    result
}

/// Give every vacated cell a new random token and mark it `Normal`.
///
/// Repeats are allowed here: a new token may complete a run with its
/// neighbours, which the next board scan picks up. `respawn` gets the
/// coordinate, the new token and the cell's old handle, which it replaces.
pub fn regenerate<H, R, F>(
    board: &mut Board<H>,
    vacated: &[Coord],
    catalog: &Catalog,
    rng: &mut R,
    mut respawn: F,
) -> Vec<Spawn>
where
    R: Rng,
    F: FnMut(Coord, TokenId, &mut H),
{
    let mut spawns = Vec::with_capacity(vacated.len());
    for &at in vacated {
        let Some(cell) = board.get_mut(at) else {
            tracing::warn!("skipping regeneration outside the board at {}", at);
            continue;
        };
        let token = catalog.random(rng);
        cell.token = token;
        cell.state = CellState::Normal;
        respawn(at, token, &mut cell.handle);
        spawns.push(Spawn { at, token });
    }
    spawns
}

// ============================================================================
// TESTS
// ============================================================================
