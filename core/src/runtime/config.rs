//! Host loop timing

use std::time::Duration;

use rollcade_shared::DEFAULT_FPS;

/// Timing knobs for [`MatchRunner`](super::MatchRunner)
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Longest wall-clock gap credited to one frame call; a stalled host
    /// catches up at most this much
    pub max_delta: Duration,
    /// A tick slower than this is logged
    pub cpu_budget: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_FPS,
            max_delta: Duration::from_millis(100),
            // a quarter of a 60 Hz frame
            cpu_budget: Duration::from_micros(4000),
        }
    }
}

impl RuntimeConfig {
    /// Wall-clock length of one tick. A zero rate is treated as 1 Hz.
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate.max(1)))
    }
}
