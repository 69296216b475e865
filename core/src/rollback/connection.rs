//! Connection lifecycle
//!
//! `Connecting → Synchronizing → Synchronized → Running ⇄ Interrupted`,
//! with `Disconnected` reachable from anywhere and terminal.

use super::events::{MatchEndReason, SessionEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Synchronizing {
        /// 0-100
        progress: u8,
    },
    Synchronized,
    Running,
    Interrupted {
        disconnect_timeout_ms: u64,
    },
    Disconnected,
}

/// Integer sync percentage, `100 * count / total`
pub fn sync_progress(count: u32, total: u32) -> u8 {
    if total == 0 {
        return 100;
    }
    (100 * u64::from(count) / u64::from(total)).min(100) as u8
}

impl ConnectionState {
    /// State after `event`
    pub fn apply(self, event: &SessionEvent) -> Self {
        use ConnectionState::*;

        if self == Disconnected {
            return self;
        }
        let pre_running = matches!(self, Connecting | Synchronizing { .. } | Synchronized);
        match *event {
            SessionEvent::ConnectedToPeer { .. } if self == Connecting => {
                Synchronizing { progress: 0 }
            }
            SessionEvent::SynchronizingWithPeer { count, total, .. } if pre_running => {
                Synchronizing {
                    progress: sync_progress(count, total),
                }
            }
            SessionEvent::SynchronizedWithPeer { .. } if pre_running => Synchronized,
            SessionEvent::Running => Running,
            SessionEvent::ConnectionInterrupted {
                disconnect_timeout_ms,
                ..
            } if !pre_running => Interrupted {
                disconnect_timeout_ms,
            },
            SessionEvent::ConnectionResumed { .. } if matches!(self, Interrupted { .. }) => {
                Running
            }
            SessionEvent::DisconnectedFromPeer { .. }
            | SessionEvent::MatchEnded {
                reason: MatchEndReason::PeerDisconnected,
            } => Disconnected,
            _ => self,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::Synchronizing { .. } | Self::Synchronized
        )
    }

    /// Human-readable status line
    pub fn status_message(&self) -> String {
        match self {
            Self::Connecting => "Connecting...".to_string(),
            Self::Synchronizing { progress } => format!("Synchronizing... {}%", progress),
            Self::Synchronized => "Synchronized".to_string(),
            Self::Running => "Connected".to_string(),
            Self::Interrupted {
                disconnect_timeout_ms,
            } => format!(
                "Connection interrupted, disconnecting in {}ms",
                disconnect_timeout_ms
            ),
            Self::Disconnected => "Disconnected".to_string(),
        }
    }
}
