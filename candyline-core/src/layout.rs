//! Board geometry in host world units
//!
//! The origin is the board centre with y pointing up, so row 0 sits at the
//! largest y.

use serde::{Deserialize, Serialize};

use crate::board::{Coord, Direction};

/// A position in world units
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Cell size and placement for a `rows` x `cols` board of a given width
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    rows: usize,
    cols: usize,
    cell_size: f32,
}

impl Layout {
    /// Square cells sized so that `cols` of them span `board_width`
    pub fn new(rows: usize, cols: usize, board_width: f32) -> Self {
        let cell_size = if cols == 0 { 0.0 } else { board_width / cols as f32 };
        Self {
            rows,
            cols,
            cell_size,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn width(&self) -> f32 {
        self.cell_size * self.cols as f32
    }

    pub fn height(&self) -> f32 {
        self.cell_size * self.rows as f32
    }

    /// Centre of the cell at `coord`
    pub fn cell_center(&self, coord: Coord) -> Point {
        let half = self.cell_size / 2.0;
        Point {
            x: -self.width() / 2.0 + half + coord.col as f32 * self.cell_size,
            y: self.height() / 2.0 - half - coord.row as f32 * self.cell_size,
        }
    }

    /// Cell containing `point`, if any
    pub fn cell_at(&self, point: Point) -> Option<Coord> {
        if self.cell_size <= 0.0 {
            return None;
        }
        let fx = (point.x + self.width() / 2.0) / self.cell_size;
        let fy = (self.height() / 2.0 - point.y) / self.cell_size;
        if fx < 0.0 || fy < 0.0 {
            return None;
        }
        let (col, row) = (fx as usize, fy as usize);
        (row < self.rows && col < self.cols).then_some(Coord::new(row, col))
    }
}

/// Dominant axis of a drag, in y-up world space.
///
/// Ties resolve to the vertical axis.
pub fn drag_direction(start: Point, current: Point) -> Direction {
    let dx = (current.x - start.x).abs();
    let dy = (current.y - start.y).abs();
    if dx > dy {
        if current.x > start.x {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if current.y > start.y {
        Direction::Up
    } else {
        Direction::Down
    }
}

/// Whether a drag has travelled far enough to count as a swap gesture
pub fn drag_exceeds(start: Point, current: Point, min_distance: f32) -> bool {
    start.distance_to(current) > min_distance
}
