//! Inbound pointer gestures

use candyline_core::{Coord, Point};
use serde::{Deserialize, Serialize};

/// A pointer event forwarded by the host
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Gesture {
    /// Click on a known cell
    Tap(Coord),
    /// Click at a world position, hit-tested against the layout
    TapAt(Point),
    /// Touch down; selects like a tap at `Point`
    DragStart(Point),
    /// Pointer moved while held down
    DragMove { start: Point, current: Point },
}
