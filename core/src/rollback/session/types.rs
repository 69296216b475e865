//! Core types for rollback sessions

use ggrs::{P2PSession, SyncTestSession};
use rollcade_shared::InputBits;

use super::super::config::RollcadeConfig;
use super::super::events::MatchEndReason;

/// Session type for GGRS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionType {
    /// Local session (no rollback, single machine)
    Local,
    /// Sync test session (local with rollback for testing determinism)
    SyncTest,
    /// P2P session with rollback netcode
    P2P,
}

/// Match-level netplay status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetState {
    /// Not yet synchronized with peers
    #[default]
    Stopped,
    Playing,
    Ended,
    /// A desync or transport failure was seen
    Error,
}

/// Result of one [`advance`](super::RollbackSession::advance) call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// `frames` simulation steps ran, `rolled_back` of them resimulations
    Advanced { frames: usize, rolled_back: usize },
    /// Remote input is not available yet; try again next tick
    Stalled,
    /// The match ended during this call and the session is now closed
    Ended(MatchEndReason),
}

/// Inner session types for different modes
///
/// SyncTest and P2P variants are boxed to keep the enum small.
pub(super) enum SessionInner {
    /// Local session - no GGRS, just direct execution
    Local {
        current_frame: i32,
        /// Inputs set via add_local_input
        stored_inputs: Vec<InputBits>,
    },
    SyncTest {
        session: Box<SyncTestSession<RollcadeConfig>>,
        current_frame: i32,
    },
    P2P(Box<P2PSession<RollcadeConfig>>),
}
