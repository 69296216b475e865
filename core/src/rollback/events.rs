//! What a session reports back to its owner
//!
//! [`SessionEvent`]s translated from ggrs, per-peer [`PlayerNetworkStats`],
//! and [`SessionError`].

use ggrs::GgrsError;

use crate::state::StateError;

/// Why a match stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEndReason {
    /// The simulation reported the end of the match
    MatchOver,
    PeerDisconnected,
    /// The caller closed the session
    Quit,
}

/// Session happenings, drained by `handle_events`.
///
/// Every peer event names the player handle behind the peer's address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// First message received from a peer
    ConnectedToPeer { player_handle: usize },
    SynchronizingWithPeer {
        player_handle: usize,
        count: u32,
        total: u32,
    },
    SynchronizedWithPeer { player_handle: usize },
    /// All peers synchronized; frames can advance
    Running,
    /// Terminal: the match is forced to end
    DisconnectedFromPeer { notice: DisconnectNotice },
    /// The local side runs `frames_ahead` frames ahead of a peer
    TimeSync { frames_ahead: u32 },
    ConnectionInterrupted {
        player_handle: usize,
        disconnect_timeout_ms: u64,
    },
    ConnectionResumed { player_handle: usize },
    /// Game state has diverged between peers
    Desync {
        frame: i32,
        local_checksum: u64,
        remote_checksum: u64,
    },
    /// We crossed the frame-advantage threshold
    FrameAdvantageWarning { frames_ahead: i32 },
    MatchEnded { reason: MatchEndReason },
}

/// User-visible notice raised when a peer drops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectNotice {
    pub player_handle: usize,
    pub message: String,
}

impl DisconnectNotice {
    pub fn new(player_handle: usize) -> Self {
        Self {
            player_handle,
            message: format!("Player {} disconnected.", player_handle + 1),
        }
    }
}

/// Coarse link rating shown next to a peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionQuality {
    /// ping under 50 ms and under 2 frames of drift
    #[default]
    Excellent,
    Good,
    Fair,
    Poor,
    Disconnected,
}

/// Link figures for one remote handle
#[derive(Debug, Clone, Default)]
pub struct PlayerNetworkStats {
    pub ping_ms: u32,
    /// Our lead over this peer, in frames
    pub local_frames_ahead: i32,
    /// The peer's lead over us, in frames
    pub remote_frames_ahead: i32,
    /// Resimulated frames since the session started
    pub rollback_frames: u32,
    pub quality: ConnectionQuality,
    pub connected: bool,
}

impl PlayerNetworkStats {
    /// Re-rate `quality` from ping and drift
    pub fn assess_quality(&mut self) {
        let ahead = self.local_frames_ahead.abs();
        self.quality = if !self.connected {
            ConnectionQuality::Disconnected
        } else if self.ping_ms < 50 && ahead < 2 {
            ConnectionQuality::Excellent
        } else if self.ping_ms < 100 && ahead < 4 {
            ConnectionQuality::Good
        } else if self.ping_ms < 150 && ahead < 6 {
            ConnectionQuality::Fair
        } else {
            ConnectionQuality::Poor
        };
    }
}

/// Why a session call failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Snapshot could not be taken
    SaveState(String),
    /// ggrs asked to load a frame the store does not hold
    MissingSnapshot { frame: i32 },
    Ggrs(String),
    Desync {
        frame: i32,
        local_checksum: u64,
        remote_checksum: u64,
    },
    Disconnected { player_handle: usize },
    /// The session has ended
    Closed,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SaveState(e) => write!(f, "Snapshot failed: {}", e),
            Self::MissingSnapshot { frame } => write!(f, "No snapshot for frame {}", frame),
            Self::Ggrs(e) => write!(f, "ggrs: {}", e),
            Self::Desync {
                frame,
                local_checksum,
                remote_checksum,
            } => write!(
                f,
                "Frame {} diverged: ours {:#x}, theirs {:#x}",
                frame, local_checksum, remote_checksum
            ),
            Self::Disconnected { player_handle } => {
                write!(f, "Player {} disconnected", player_handle + 1)
            }
            Self::Closed => write!(f, "Session is closed"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<GgrsError> for SessionError {
    fn from(e: GgrsError) -> Self {
        Self::Ggrs(e.to_string())
    }
}

impl From<StateError> for SessionError {
    fn from(e: StateError) -> Self {
        Self::SaveState(e.to_string())
    }
}
