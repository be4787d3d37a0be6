use serde::Serialize;

use crate::direction::Direction;

/// A cell on the grid. `y` grows downwards, like terminal rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step towards `direction`.
    pub fn moved(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Grid dimensions. The outermost ring of cells is the wall; the snake and
/// the food only ever live in the interior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    width: i32,
    height: i32,
}

impl Bounds {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    pub fn is_border(&self, pos: Position) -> bool {
        self.contains(pos)
            && (pos.x == 0 || pos.x == self.width - 1 || pos.y == 0 || pos.y == self.height - 1)
    }

    pub fn is_interior(&self, pos: Position) -> bool {
        pos.x > 0 && pos.x < self.width - 1 && pos.y > 0 && pos.y < self.height - 1
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }
}
