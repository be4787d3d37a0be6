//! Terminal snake.
//!
//! The crate is split into the simulation core (grid, snake, food, direction
//! rules), the input side (keyboard or scripted moves, decoded through one
//! symbol table) and the controller that runs them on a fixed tick.

pub mod config;
pub mod direction;
pub mod error;
pub mod food;
pub mod game;
pub mod geometry;
pub mod input;
pub mod render;
pub mod scheduler;
pub mod snake;
pub mod symbol;
pub mod terminal;

pub use config::GameConfig;
pub use direction::Direction;
pub use error::GameError;
pub use game::{DebugSnapshot, GameController, GameState, SessionEnd, SessionSummary};
pub use geometry::{Bounds, Position};
pub use symbol::Symbol;
