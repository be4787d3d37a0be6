use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use serde::{Deserialize, Serialize};

/// Tick timing knobs, all in milliseconds.
///
/// Eating lowers the interval by `food_step_ms` down to `food_floor_ms`.
/// The `+`/`-` keys move it by `manual_step_ms` inside
/// `[manual_min_ms, manual_max_ms]`. The two floors are independent: the
/// food rule is allowed to go faster than the player can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    pub base_ms: u64,
    pub food_step_ms: u64,
    pub food_floor_ms: u64,
    pub manual_step_ms: u64,
    pub manual_min_ms: u64,
    pub manual_max_ms: u64,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            base_ms: 150,
            food_step_ms: 5,
            food_floor_ms: 50,
            manual_step_ms: 20,
            manual_min_ms: 80,
            manual_max_ms: 400,
        }
    }
}

/// Target duration of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInterval {
    millis: u64,
    speed: SpeedConfig,
}

impl FrameInterval {
    pub fn new(speed: SpeedConfig) -> Self {
        Self {
            millis: speed.base_ms,
            speed,
        }
    }

    pub fn reset(&mut self) {
        self.millis = self.speed.base_ms;
    }

    pub fn millis(&self) -> u64 {
        self.millis
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.millis)
    }

    pub fn on_food(&mut self) {
        if self.millis > self.speed.food_floor_ms {
            self.millis = self
                .millis
                .saturating_sub(self.speed.food_step_ms)
                .max(self.speed.food_floor_ms);
        }
    }

    /// Shorter ticks. Never makes things slower, even when the food rule
    /// already pushed the interval under the manual floor.
    pub fn speed_up(&mut self) {
        if self.millis > self.speed.manual_min_ms {
            self.millis = num::clamp(
                self.millis.saturating_sub(self.speed.manual_step_ms),
                self.speed.manual_min_ms,
                self.speed.manual_max_ms,
            );
        }
    }

    pub fn slow_down(&mut self) {
        if self.millis < self.speed.manual_max_ms {
            self.millis = num::clamp(
                self.millis + self.speed.manual_step_ms,
                self.speed.manual_min_ms.min(self.millis),
                self.speed.manual_max_ms,
            );
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Sleep out whatever is left of the frame interval.
    Compensated,
    /// Same pause after every tick, whatever the interval says.
    Fixed(Duration),
}

/// Time left in the tick budget once `elapsed` has been spent.
pub fn compensation(elapsed: Duration, interval: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

/// Cooperative tick clock. There is no timer thread: the loop marks the start
/// of a tick, does its work (including the bounded input wait) and then asks
/// the scheduler to sleep off the rest.
pub struct FrameScheduler {
    pacing: Pacing,
    tick_started: Instant,
}

impl FrameScheduler {
    pub fn new(pacing: Pacing) -> Self {
        Self {
            pacing,
            tick_started: Instant::now(),
        }
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn start_tick(&mut self) {
        self.tick_started = Instant::now();
    }

    pub fn remaining(&self, interval: Duration) -> Duration {
        match self.pacing {
            Pacing::Compensated => compensation(self.tick_started.elapsed(), interval),
            Pacing::Fixed(delay) => delay,
        }
    }

    pub fn finish_tick(&self, interval: Duration) {
        let pause = self.remaining(interval);
        if !pause.is_zero() {
            thread::sleep(pause);
        }
        debug!(
            "tick finished after {:?} (slept {:?})",
            self.tick_started.elapsed(),
            pause
        );
    }
}
