//! Fighting-game command recognition
//!
//! Raw input bits flow into a per-character [`CommandBuffer`], a set of
//! signed run-length counters. Each [`Command`] is a parsed move notation
//! (`"D, DF, F, a"`) that walks the buffer once per frame and, on
//! completion, stays active for its buffer time.
//!
//! # Module Structure
//!
//! - `key`: the 46 queryable key identifiers
//! - `buffer`: run-length input history and its `state` queries
//! - `element`: one parsed notation token
//! - `parser`: notation to `Command`
//! - `matcher`: the per-frame state machine
//! - `list`: named commands sharing a buffer, with button remapping
//!
//! All of it is plain data and is copied into rollback snapshots.

mod buffer;
mod element;
mod key;
mod list;
mod matcher;
mod parser;

#[cfg(test)]
mod tests;

pub use buffer::{CommandBuffer, RunCounter};
pub use element::{CommandElement, KeySet};
pub use key::{Button, COMMAND_KEY_COUNT, CommandKey};
pub use list::{CommandKeyRemap, CommandList, DEFAULT_BUFFER_TIME, DEFAULT_COMMAND_TIME};
pub use matcher::{Command, StepContext};
