//! Shared wire types for the rollcade fighting-game core.
//!
//! Everything in this crate is part of a stable byte contract: the
//! netplay input payload and the replay stream both encode `InputBits`
//! exactly as defined here.

pub mod constants;
pub mod input;

pub use constants::*;
pub use input::{InputBits, NetInput, WIRE_INPUT_SIZE};
