use std::fmt;
use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::GameConfig;
use crate::direction::{self, Direction};
use crate::error::{GameError, Result};
use crate::food::FoodPlacer;
use crate::geometry::{Bounds, Position};
use crate::input::{InputSource, InteractiveInput, ScriptedInput};
use crate::render;
use crate::scheduler::{FrameInterval, FrameScheduler, Pacing};
use crate::snake::{MoveOutcome, SnakeBody};
use crate::symbol::Symbol;
use crate::terminal::TerminalGuard;

pub const FOOD_REWARD: u32 = 10;

// menu and game-over screens only wait for a key, there is no tick to keep
const IDLE_WAIT: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Menu,
    Playing,
    GameOver,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameState::Menu => f.write_str("menu"),
            GameState::Playing => f.write_str("playing"),
            GameState::GameOver => f.write_str("game_over"),
        }
    }
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEnd {
    Quit,
    Interrupted,
    /// A scripted session ran out of moves.
    ScriptExhausted,
    /// A scripted session crashed; scripted sessions do not restart.
    GameOver,
    /// The keyboard went away (end of file on stdin).
    InputClosed,
}

/// Flat view of the session, for debugging and for scripted runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugSnapshot {
    pub state: GameState,
    pub snake_head: Position,
    pub snake_length: usize,
    pub direction: Direction,
    pub food_position: Option<Position>,
    pub score: u32,
    pub last_key: Option<String>,
    pub frame_interval_ms: u64,
    pub scripted: bool,
    pub skip_menu: bool,
    pub debug: bool,
    pub move_index: usize,
    pub total_moves: usize,
    pub moves_remaining: usize,
    pub ticks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub end: SessionEnd,
    pub snapshot: DebugSnapshot,
}

/// Owns one game session: the state machine, the tick loop and the
/// terminal while the loop runs.
pub struct GameController<R: Rng = StdRng> {
    config: GameConfig,
    bounds: Bounds,
    state: GameState,
    snake: SnakeBody,
    direction: Direction,
    food: Option<Position>,
    score: u32,
    interval: FrameInterval,
    food_placer: FoodPlacer<R>,
    input: Box<dyn InputSource>,
    scheduler: FrameScheduler,
    screen: Option<Stdout>,
    // state whose static screen (menu, game over) is currently displayed
    shown: Option<GameState>,
    last_symbol: Option<Symbol>,
    ticks: u64,
    shutdown: Arc<AtomicBool>,
}

impl GameController<StdRng> {
    /// Builds a session from `config`, picking the input source from it:
    /// a move script when one is given, stdin otherwise.
    pub fn new(config: GameConfig, shutdown: Arc<AtomicBool>) -> Result<Self> {
        let input: Box<dyn InputSource> = match &config.moves {
            Some(moves) => Box::new(ScriptedInput::new(moves)),
            None => Box::new(InteractiveInput::stdin()),
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_parts(config, input, rng, shutdown)
    }
}

impl<R: Rng> GameController<R> {
    pub fn with_parts(
        config: GameConfig,
        input: Box<dyn InputSource>,
        rng: R,
        shutdown: Arc<AtomicBool>,
    ) -> Result<Self> {
        config.validate()?;

        let bounds = Bounds::new(config.width, config.height);
        let scripted = config.is_scripted();
        let pacing = if scripted && config.debug {
            Pacing::Fixed(Duration::from_millis(config.scripted_delay_ms))
        } else {
            Pacing::Compensated
        };
        let state = if scripted || config.skip_menu {
            GameState::Playing
        } else {
            GameState::Menu
        };
        // draw only when a player is at the keyboard or debug output was asked for
        let screen = (input.terminal_fd().is_some() || config.debug).then(io::stdout);

        let mut controller = Self {
            bounds,
            state,
            snake: SnakeBody::new(bounds.center()),
            direction: Direction::Right,
            food: None,
            score: 0,
            interval: FrameInterval::new(config.speed),
            food_placer: FoodPlacer::new(rng),
            input,
            scheduler: FrameScheduler::new(pacing),
            screen,
            shown: None,
            last_symbol: None,
            ticks: 0,
            shutdown,
            config,
        };
        controller.reset();
        Ok(controller)
    }

    /// Back to the opening position: one cell in the middle heading right,
    /// no score, base speed, fresh food.
    pub fn reset(&mut self) {
        self.snake = SnakeBody::new(self.bounds.center());
        self.direction = Direction::Right;
        self.score = 0;
        self.interval.reset();
        self.food = Some(self.food_placer.place(&self.snake, &self.bounds));
        debug!("session reset, food at {:?}", self.food);
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn snake(&self) -> &SnakeBody {
        &self.snake
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn food(&self) -> Option<Position> {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn frame_interval(&self) -> &FrameInterval {
        &self.interval
    }

    pub fn is_scripted(&self) -> bool {
        self.config.is_scripted()
    }

    /// Test hook: puts the food somewhere specific. Ignored when the cell is
    /// not free interior.
    pub fn set_food(&mut self, pos: Position) {
        if self.bounds.is_interior(pos) && !self.snake.contains(pos) {
            self.food = Some(pos);
        }
    }

    pub fn snapshot(&self) -> DebugSnapshot {
        let progress = self.input.progress();
        DebugSnapshot {
            state: self.state,
            snake_head: self.snake.head(),
            snake_length: self.snake.len(),
            direction: self.direction,
            food_position: self.food,
            score: self.score,
            last_key: self.last_symbol.map(|s| s.to_string()),
            frame_interval_ms: self.interval.millis(),
            scripted: self.is_scripted(),
            skip_menu: self.config.skip_menu,
            debug: self.config.debug,
            move_index: progress.map_or(0, |p| p.index),
            total_moves: progress.map_or(0, |p| p.total),
            moves_remaining: progress.map_or(0, |p| p.remaining()),
            ticks: self.ticks,
        }
    }

    /// Runs the session to its end.
    ///
    /// The terminal is switched to raw input before the first tick and put
    /// back when the guard goes out of scope, before the summary (or error)
    /// reaches the caller.
    pub fn run(&mut self) -> Result<SessionSummary> {
        let guard = self
            .input
            .terminal_fd()
            .and_then(|fd| match TerminalGuard::acquire(fd) {
                Ok(guard) => Some(guard),
                Err(err) => {
                    warn!("raw terminal input unavailable, falling back to line input: {}", err);
                    None
                }
            });

        info!(
            "session started: {}x{}, scripted={}, state={}, pacing={:?}",
            self.bounds.width(),
            self.bounds.height(),
            self.is_scripted(),
            self.state,
            self.scheduler.pacing()
        );
        let result = self.run_loop();
        drop(guard);

        let end = result?;
        info!("session ended: {:?}, score {}", end, self.score);
        Ok(SessionSummary {
            end,
            snapshot: self.snapshot(),
        })
    }

    fn run_loop(&mut self) -> Result<SessionEnd> {
        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                return Ok(SessionEnd::Interrupted);
            }
            let end = match self.state {
                GameState::Menu => self.menu_tick()?,
                GameState::Playing => self.play_tick()?,
                GameState::GameOver => self.game_over_tick()?,
            };
            if let Some(end) = end {
                return Ok(end);
            }
        }
    }

    fn menu_tick(&mut self) -> Result<Option<SessionEnd>> {
        if self.shown != Some(GameState::Menu) {
            if let Some(out) = self.screen.as_mut() {
                render::draw_menu(out).map_err(GameError::Render)?;
            }
            self.shown = Some(GameState::Menu);
        }
        if self.input.is_exhausted() {
            return Ok(Some(SessionEnd::InputClosed));
        }
        match self.next_symbol(IDLE_WAIT) {
            Some(Symbol::Quit) => Ok(Some(SessionEnd::Quit)),
            Some(_) => {
                self.transition(GameState::Playing);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// One simulation tick: input first, then the move, then the pause.
    fn play_tick(&mut self) -> Result<Option<SessionEnd>> {
        if self.input.is_exhausted() {
            return Ok(Some(self.exhausted_end()));
        }

        self.scheduler.start_tick();
        self.draw_board()?;
        if self.config.debug {
            self.print_snapshot();
        }

        let interval = self.interval.duration();
        let symbol = self.next_symbol(interval);
        // Ctrl+C while waiting for a key: no move on the way out
        if self.shutdown.load(Ordering::SeqCst) {
            return Ok(Some(SessionEnd::Interrupted));
        }
        match symbol {
            Some(Symbol::Quit) => return Ok(Some(SessionEnd::Quit)),
            Some(Symbol::Move(requested)) => {
                self.direction = direction::propose(self.direction, requested);
            }
            Some(Symbol::SpeedUp) => self.interval.speed_up(),
            Some(Symbol::SlowDown) => self.interval.slow_down(),
            _ => {}
        }

        self.advance();
        self.ticks += 1;

        if self.state == GameState::Playing {
            self.scheduler.finish_tick(self.interval.duration());
        }
        Ok(None)
    }

    /// Applies the movement rule once and books the consequences.
    pub fn advance(&mut self) -> MoveOutcome {
        let outcome = self.snake.step(self.direction, self.food, &self.bounds);
        match outcome {
            MoveOutcome::Collided => {
                info!(
                    "snake crashed at {:?} heading {}",
                    self.snake.head(),
                    self.direction
                );
                self.transition(GameState::GameOver);
            }
            MoveOutcome::Advanced { ate: true, .. } => {
                self.score += FOOD_REWARD;
                self.interval.on_food();
                self.food = Some(self.food_placer.place(&self.snake, &self.bounds));
                debug!(
                    "food eaten, score {}, interval {}ms",
                    self.score,
                    self.interval.millis()
                );
            }
            MoveOutcome::Advanced { ate: false, .. } => {}
        }
        outcome
    }

    fn game_over_tick(&mut self) -> Result<Option<SessionEnd>> {
        let scripted = self.is_scripted();
        if self.shown != Some(GameState::GameOver) {
            if let Some(out) = self.screen.as_mut() {
                render::draw_board(out, &self.bounds, &self.snake, self.food, self.score)
                    .map_err(GameError::Render)?;
                render::draw_game_over(out, self.score, !scripted)
                    .map_err(GameError::Render)?;
            }
            self.shown = Some(GameState::GameOver);
        }
        if scripted {
            return Ok(Some(SessionEnd::GameOver));
        }
        if self.input.is_exhausted() {
            return Ok(Some(SessionEnd::InputClosed));
        }

        match self.next_symbol(IDLE_WAIT) {
            Some(Symbol::Quit) => Ok(Some(SessionEnd::Quit)),
            Some(Symbol::Restart) => {
                info!("restarting after a score of {}", self.score);
                self.reset();
                self.transition(GameState::Playing);
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn exhausted_end(&self) -> SessionEnd {
        if self.is_scripted() {
            SessionEnd::ScriptExhausted
        } else {
            SessionEnd::InputClosed
        }
    }

    fn next_symbol(&mut self, timeout: Duration) -> Option<Symbol> {
        let symbol = self.input.next(timeout);
        if symbol.is_some() {
            self.last_symbol = symbol;
        }
        symbol
    }

    fn transition(&mut self, next: GameState) {
        debug!("state {} -> {}", self.state, next);
        self.state = next;
    }

    fn draw_board(&mut self) -> Result<()> {
        if let Some(out) = self.screen.as_mut() {
            render::draw_board(out, &self.bounds, &self.snake, self.food, self.score)
                .map_err(GameError::Render)?;
        }
        self.shown = Some(GameState::Playing);
        Ok(())
    }

    fn print_snapshot(&self) {
        match serde_json::to_string_pretty(&self.snapshot()) {
            Ok(json) => println!("\nDEBUG STATE: {}", json),
            Err(err) => warn!("could not serialize debug state: {}", err),
        }
    }
}
