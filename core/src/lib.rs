//! Rollcade Core - deterministic fighting-game simulation with rollback
//!
//! This crate provides the frame-stepped simulation core of a 2D fighting
//! game and the rollback netplay built around it.
//!
//! # Architecture
//!
//! - [`command`] - Motion/button command recognizer (`"~D, DF, F, a"`)
//! - [`state`] - The [`World`] a frame runs against and its [`GameState`]
//!   snapshots
//! - [`sim`] - The [`Simulation`] step and a deterministic sandbox fighter
//! - [`rollback`] - GGRS integration: [`RollbackSession`] for local,
//!   sync-test and P2P play
//! - [`replay`] - Input stream recording, playback and verification
//! - [`runtime`] - Fixed-timestep [`MatchRunner`]
//! - [`input`] - Device polling and CPU pads
//! - [`config`] - `config.toml` loading

pub mod command;
pub mod config;
pub mod input;
pub mod replay;
pub mod rollback;
pub mod runtime;
pub mod sim;
pub mod state;
#[cfg(test)]
mod test_utils;

pub use command::{Command, CommandList, StepContext};
pub use config::{ConfigError, EngineConfig};
pub use replay::{ReplayError, ReplayPlayer, ReplayReader, ReplayRecorder, ReplayWriter};
pub use rollback::{
    ConnectionState, FrameStatus, LocalSocket, MatchEndReason, RollbackSession, SessionConfig,
    SessionError, SessionEvent, SessionType,
};
pub use runtime::{FrameReport, InputSource, MatchRunner, RuntimeConfig};
pub use sim::{Sandbox, Simulation, StepOutcome};
pub use state::{GameState, World};

// Re-export the wire types and GGRS types for convenience
pub use ggrs::{GgrsError, PlayerType, SessionState};
pub use rollcade_shared::{InputBits, NetInput};
