//! Time-sync smoothing
//!
//! When a peer reports that we run ahead, the correction is spread as a
//! small extra wait over many frames instead of one long sleep.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LoopTimer {
    frame: Duration,
    frames_to_spread: u32,
    time_wait: Duration,
    wait_count: u32,
}

impl LoopTimer {
    pub fn new(fps: u32, frames_to_spread: u32) -> Self {
        Self {
            frame: Duration::from_secs(1) / fps.max(1),
            frames_to_spread: frames_to_spread.max(1),
            time_wait: Duration::ZERO,
            wait_count: 0,
        }
    }

    /// Schedule half of a `frames_ahead` frame lead to be waited off
    pub fn on_time_sync(&mut self, frames_ahead: u32) {
        let wait_total = self.frame * frames_ahead;
        let advantage = wait_total / 2;
        self.time_wait = advantage / self.frames_to_spread;
        self.wait_count = self.frames_to_spread;
        tracing::debug!(
            frames_ahead,
            per_frame_us = self.time_wait.as_micros() as u64,
            frames = self.wait_count,
            "Spreading time sync wait"
        );
    }

    /// Extra delay for this loop iteration
    pub fn wait_this_loop(&mut self) -> Duration {
        if self.wait_count > 0 {
            self.wait_count -= 1;
            self.time_wait
        } else {
            Duration::ZERO
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.wait_count > 0
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame
    }
}
