//! Match state and its snapshots
//!
//! [`World`] is the live, mutable state of a match. [`GameState`] is a deep
//! copy of it that rollback saves, restores and checksums. Nothing in the
//! world points at anything else; references are ids or slot-local indices,
//! so a snapshot is a plain value.

mod game_state;
mod model;
mod pool;
mod rng;
mod world;

#[cfg(test)]
mod tests;

pub use game_state::{GameState, LoadReport, StateError};
pub use model::{
    AnimationState, BytecodeStack, BytecodeValue, Camera, CharState, EnvColor, EnvShake,
    ExplodState, GlobalSpecialFlag, NUM_FVAR, NUM_IVAR, PalFx, PauseState, ProjectileState,
    StageCamera, StageShadow, StageState, SuperPauseState, ValueType,
};
pub use pool::Pool;
pub use rng::SimRng;
pub use world::{FrameInputs, RoundState, SlotState, World};
