//! Game loop execution with fixed timestep

use std::time::{Duration, Instant};

use crate::rollback::{FrameStatus, SessionError, SessionType};
use crate::sim::Simulation;

use super::{FrameReport, InputSource, MatchRunner};

impl<S: Simulation, I: InputSource> MatchRunner<S, I> {
    /// Clamped time since the previous frame; one tick on the first call
    fn delta(&mut self, now: Instant) -> Duration {
        let delta = match self.last_update {
            Some(last) => now
                .saturating_duration_since(last)
                .min(self.config.max_delta),
            None => self.tick_duration,
        };
        self.last_update = Some(now);
        delta
    }

    /// Feed local input and advance the session by one tick
    pub(super) fn tick(&mut self) -> Result<FrameStatus, SessionError> {
        let inputs = self.input.frame_inputs(self.session.config().num_players);
        let handles = self.session.local_players().to_vec();
        for handle in handles {
            let bits = inputs.get(handle).copied().unwrap_or_default();
            self.session.add_local_input(handle, bits)?;
        }
        self.session.advance(&mut self.world, &mut self.sim)
    }

    /// Execute a single frame
    ///
    /// Runs every tick the accumulated time allows. While a P2P session is
    /// still synchronizing it only polls, and the accumulator is dropped so
    /// the session does not burst-simulate once it starts.
    pub(super) fn execute_frame(&mut self, now: Instant) -> Result<FrameReport, SessionError> {
        let mut report = FrameReport::default();
        let delta = self.delta(now);

        if let Some(reason) = self.session.end_reason() {
            report.ended = Some(reason);
            return Ok(report);
        }

        if !self.session.is_running() {
            self.session.poll_remote_clients();
            self.accumulator = Duration::ZERO;
            return Ok(report);
        }

        self.accumulator += delta;
        let tick_duration = self.tick_duration;
        let is_p2p = self.session.session_type() == SessionType::P2P;

        while self.accumulator >= tick_duration {
            let tick_start = Instant::now();

            match self.tick()? {
                FrameStatus::Advanced {
                    frames,
                    rolled_back,
                } => {
                    report.ticks += 1;
                    report.frames += frames;
                    report.rolled_back += rolled_back;
                }
                FrameStatus::Stalled => {
                    report.stalled = true;
                    self.accumulator = self.accumulator.min(tick_duration);
                    break;
                }
                FrameStatus::Ended(reason) => {
                    report.ticks += 1;
                    report.ended = Some(reason);
                    self.accumulator = Duration::ZERO;
                    break;
                }
            }

            self.accumulator -= tick_duration;
            // time sync: run slower while ahead of the peer
            let wait = self.session.wait_this_loop();
            self.accumulator = self.accumulator.saturating_sub(wait);

            let tick_time = tick_start.elapsed();
            if tick_time > self.config.cpu_budget {
                tracing::warn!(
                    "Tick took {:?}, exceeds budget of {:?}",
                    tick_time,
                    self.config.cpu_budget
                );
            }

            // one input per frame call, so P2P advances at most once
            if is_p2p {
                self.accumulator = self.accumulator.min(tick_duration);
                break;
            }
        }

        report.alpha = self.accumulator.as_secs_f32() / tick_duration.as_secs_f32();
        Ok(report)
    }
}
