// the snake moves head first: the new head is pushed on the front, and the
// tail is popped afterwards unless food was eaten on this step
use std::collections::VecDeque;

use crate::direction::Direction;
use crate::geometry::{Bounds, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Advanced { head: Position, ate: bool },
    Collided,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnakeBody {
    segments: VecDeque<Position>, // the head is the first element
}

impl SnakeBody {
    pub fn new(head: Position) -> Self {
        let mut segments = VecDeque::new();
        segments.push_back(head);
        Self { segments }
    }

    /// Builds a body from head-first segments. Used to set up positions
    /// that are awkward to reach by playing.
    pub fn from_segments(segments: impl IntoIterator<Item = Position>) -> Option<Self> {
        let segments: VecDeque<Position> = segments.into_iter().collect();
        if segments.is_empty() {
            return None;
        }
        Some(Self { segments })
    }

    pub fn head(&self) -> Position {
        // never empty: constructors refuse an empty body and step() only grows or keeps length
        self.segments[0]
    }

    pub fn tail(&self) -> Position {
        self.segments[self.segments.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.segments.contains(&pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.segments.iter()
    }

    /// Advances the snake one cell towards `direction`.
    ///
    /// The collision check runs against the body as it is *before* the move,
    /// tail included: the tail has not vacated its cell yet when the head
    /// arrives, so chasing your own tail at distance one is fatal. On
    /// `Collided` the body is left untouched.
    pub fn step(
        &mut self,
        direction: Direction,
        food: Option<Position>,
        bounds: &Bounds,
    ) -> MoveOutcome {
        let new_head = self.head().moved(direction);

        if !bounds.is_interior(new_head) || self.contains(new_head) {
            return MoveOutcome::Collided;
        }

        self.segments.push_front(new_head);

        let ate = food == Some(new_head);
        if !ate {
            self.segments.pop_back();
        }

        MoveOutcome::Advanced { head: new_head, ate }
    }
}
