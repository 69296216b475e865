//! Fixed-timestep match runtime
//!
//! [`MatchRunner`] owns a match: the [`World`], its [`Simulation`], the
//! [`RollbackSession`] and an [`InputSource`] for the local pads. Call
//! [`frame`](MatchRunner::frame) once per host loop iteration; it runs as
//! many simulation ticks as real time allows and reports session events
//! through [`take_events`](MatchRunner::take_events).

use std::time::{Duration, Instant};

use crate::rollback::{FrameStatus, MatchEndReason, RollbackSession, SessionError, SessionEvent};
use crate::sim::Simulation;
use crate::state::World;

mod config;
mod game_loop;
mod input_source;


pub use config::RuntimeConfig;
pub use input_source::InputSource;

/// What one [`MatchRunner::frame`] call did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// `advance` calls that ran the simulation
    pub ticks: u32,
    /// Simulation steps, resimulations included
    pub frames: usize,
    pub rolled_back: usize,
    /// The session waited for remote input
    pub stalled: bool,
    pub ended: Option<MatchEndReason>,
    /// Interpolation factor between the last two ticks
    pub alpha: f32,
}

/// Runs one match at a fixed tick rate
pub struct MatchRunner<S, I> {
    config: RuntimeConfig,
    world: World,
    sim: S,
    session: RollbackSession,
    input: I,
    accumulator: Duration,
    last_update: Option<Instant>,
    tick_duration: Duration,
    events: Vec<SessionEvent>,
}

impl<S: Simulation, I: InputSource> MatchRunner<S, I> {
    pub fn new(world: World, sim: S, session: RollbackSession, input: I) -> Self {
        Self::with_config(RuntimeConfig::default(), world, sim, session, input)
    }

    pub fn with_config(
        config: RuntimeConfig,
        world: World,
        sim: S,
        session: RollbackSession,
        input: I,
    ) -> Self {
        let tick_duration = config.tick_duration();
        Self {
            config,
            world,
            sim,
            session,
            input,
            accumulator: Duration::ZERO,
            last_update: None,
            tick_duration,
            events: Vec::new(),
        }
    }

    /// Set the tick rate
    pub fn set_tick_rate(&mut self, tick_rate: u32) {
        self.config.tick_rate = tick_rate;
        self.tick_duration = self.config.tick_duration();
    }

    pub fn tick_rate(&self) -> u32 {
        self.config.tick_rate
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Run a single frame at the current time
    pub fn frame(&mut self) -> Result<FrameReport, SessionError> {
        self.frame_at(Instant::now())
    }

    /// Run a single frame as if the host loop woke at `now`
    ///
    /// Session events raised during the frame are queued for
    /// [`take_events`](Self::take_events).
    pub fn frame_at(&mut self, now: Instant) -> Result<FrameReport, SessionError> {
        let result = self.execute_frame(now);
        self.collect_events();
        result
    }

    /// Advance exactly one tick, ignoring real time
    ///
    /// For headless harnesses that drive the match as fast as possible.
    pub fn step(&mut self) -> Result<FrameStatus, SessionError> {
        if let Some(reason) = self.session.end_reason() {
            return Ok(FrameStatus::Ended(reason));
        }
        self.session.poll_remote_clients();
        let result = if self.session.is_running() {
            self.tick()
        } else {
            Ok(FrameStatus::Stalled)
        };
        self.collect_events();
        result
    }

    /// End the match from the host side
    pub fn quit(&mut self) {
        self.session.close(MatchEndReason::Quit);
        self.collect_events();
    }

    fn collect_events(&mut self) {
        let events = self.session.handle_events();
        self.events.extend(events);
    }

    /// Drain queued session events
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_finished(&self) -> bool {
        self.session.is_closed()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn sim(&self) -> &S {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut S {
        &mut self.sim
    }

    pub fn session(&self) -> &RollbackSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut RollbackSession {
        &mut self.session
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    /// Tear the runner apart, handing back the world and simulation
    pub fn into_parts(self) -> (World, S, RollbackSession) {
        (self.world, self.sim, self.session)
    }
}
