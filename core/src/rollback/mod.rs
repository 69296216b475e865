//! GGRS rollback integration
//!
//! Drives the simulation through ggrs for local, sync-test and P2P play.
//!
//! # Architecture
//!
//! ggrs decides which frames to save, load and (re)simulate. This module
//! answers those requests against an explicit [`World`](crate::state::World):
//!
//! - `RollcadeConfig`: ggrs configuration (`NetInput` over the wire,
//!   `SnapshotTicket` in ggrs's own state cells)
//! - `SnapshotStore`: frame-indexed [`GameState`](crate::state::GameState)
//!   snapshots recycled through a pool
//! - `RollbackSession`: session manager, request servicing and event
//!   translation
//! - `LocalSocket`: UDP transport for P2P sessions
//!
//! # Frame Flow
//!
//! 1. Local pads are read into `InputBits` and handed to
//!    `session.add_local_input()`
//! 2. `session.advance()` asks ggrs for the next batch of requests
//! 3. Saves snapshot the world, loads restore it in place, advances run
//!    [`World::advance`](crate::state::World::advance) with the frame's
//!    inputs
//! 4. `session.handle_events()` reports connection progress, time sync,
//!    desyncs and the end of the match

mod config;
mod connection;
mod events;
mod local_socket;
mod loop_timer;
mod player;
mod session;
mod snapshots;

pub use config::{
    DEFAULT_CHECK_DISTANCE, DEFAULT_FRAMES_TO_SPREAD_WAIT, DEFAULT_INPUT_DELAY,
    DEFAULT_ONLINE_INPUT_DELAY, MAX_INPUT_DELAY, MAX_ROLLBACK_FRAMES, RollcadeConfig,
    STATE_POOL_SIZE, SessionConfig,
};
pub use connection::{ConnectionState, sync_progress};
pub use events::{
    ConnectionQuality, DisconnectNotice, MatchEndReason, PlayerNetworkStats, SessionError,
    SessionEvent,
};
pub use local_socket::{DEFAULT_NETPLAY_PORT, LocalSocket, LocalSocketError, SocketStats};
pub use loop_timer::LoopTimer;
pub use player::{MAX_PLAYERS, PlayerSessionConfig};
pub use session::{FrameStatus, NetState, RollbackSession, SessionType};
pub use snapshots::{SavedFrame, SnapshotStore, SnapshotTicket};
