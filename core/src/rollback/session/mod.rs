//! GGRS session management
//!
//! Provides the RollbackSession wrapper for local, sync-test and P2P sessions.

mod builder;
mod session;
mod types;

#[cfg(test)]
mod tests;

pub use session::RollbackSession;
pub use types::{FrameStatus, NetState, SessionType};
