use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::scheduler::SpeedConfig;

// smallest grid that still has an interior cell
const MIN_SIDE: i32 = 3;

/// Everything needed to start a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Grid width, walls included
    pub width: i32,
    /// Grid height, walls included
    pub height: i32,
    /// Print a state snapshot on every tick
    pub debug: bool,
    /// Move script. When present the session is scripted instead of
    /// interactive.
    pub moves: Option<String>,
    /// Start interactive sessions straight in play
    pub skip_menu: bool,
    /// Seed for food placement; random when absent
    pub seed: Option<u64>,
    /// Pause between ticks of a scripted session in debug mode
    pub scripted_delay_ms: u64,
    pub speed: SpeedConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 40,
            height: 20,
            debug: false,
            moves: None,
            skip_menu: false,
            seed: None,
            scripted_delay_ms: 100,
            speed: SpeedConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Scripted session on the given grid.
    pub fn scripted(width: i32, height: i32, moves: &str) -> Self {
        Self {
            moves: Some(moves.to_string()),
            ..Self::new(width, height)
        }
    }

    pub fn is_scripted(&self) -> bool {
        self.moves.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        if self.width < MIN_SIDE || self.height < MIN_SIDE {
            return Err(GameError::InvalidConfig(format!(
                "grid {}x{} has no playable interior (minimum is {}x{})",
                self.width, self.height, MIN_SIDE, MIN_SIDE
            )));
        }
        if self.speed.manual_min_ms > self.speed.manual_max_ms {
            return Err(GameError::InvalidConfig(format!(
                "manual speed range [{}, {}] is empty",
                self.speed.manual_min_ms, self.speed.manual_max_ms
            )));
        }
        Ok(())
    }
}
