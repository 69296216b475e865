//! The simulation step the core snapshots around
//!
//! Character, physics and stage logic live behind [`Simulation`]. The core
//! only guarantees that `simulate` sees a fully restored [`World`] and the
//! frame's resolved inputs, and that everything it mutates inside the world
//! is rolled back with it.

mod sandbox;

pub use sandbox::{Sandbox, SandboxConfig};

use rollcade_shared::InputBits;

use crate::state::World;

/// Result of one simulated frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    /// The match has ended; the session tears down in an orderly way
    MatchOver,
}

/// One frame of game logic.
///
/// Implementations must be deterministic: all state they depend on lives
/// in `world` (including its RNG), never in `self`.
pub trait Simulation {
    /// Called by [`World::advance`] before inputs are resolved, with the
    /// per-input-index bits exactly as supplied. Must not affect the result.
    fn observe_inputs(&mut self, _world: &World, _raw: &[InputBits]) {}

    fn simulate(&mut self, world: &mut World, inputs: &[InputBits]) -> StepOutcome;
}

impl<S: Simulation + ?Sized> Simulation for &mut S {
    fn observe_inputs(&mut self, world: &World, raw: &[InputBits]) {
        (**self).observe_inputs(world, raw)
    }

    fn simulate(&mut self, world: &mut World, inputs: &[InputBits]) -> StepOutcome {
        (**self).simulate(world, inputs)
    }
}
