//! Rollback session settings
//!
//! Window sizes, input delay defaults and the ggrs [`Config`] binding.

use ggrs::Config;
use rollcade_shared::{DEFAULT_FPS, NetInput};

use super::snapshots::SnapshotTicket;

/// Prediction window: frames ggrs may run ahead of confirmed input
pub const MAX_ROLLBACK_FRAMES: usize = 8;

/// Upper bound on local input delay
pub const MAX_INPUT_DELAY: usize = 10;

/// Same-machine play needs no delay
pub const DEFAULT_INPUT_DELAY: usize = 0;

/// Input delay for P2P unless configured
pub const DEFAULT_ONLINE_INPUT_DELAY: usize = 2;

/// Default sync-test check distance, before clamping to the prediction window
pub const DEFAULT_CHECK_DISTANCE: usize = 8;

/// Frames a time-sync correction is spread over
pub const DEFAULT_FRAMES_TO_SPREAD_WAIT: u32 = 200;

/// Snapshots kept warm: the window plus the frame being saved and one spare
pub const STATE_POOL_SIZE: usize = MAX_ROLLBACK_FRAMES + 2;

/// GGRS configuration for rollcade.
///
/// The ggrs cell only carries a [`SnapshotTicket`]; the snapshot itself
/// lives in the session's store.
pub struct RollcadeConfig;

impl Config for RollcadeConfig {
    type Input = NetInput;
    type State = SnapshotTicket;
    type Address = String; // "ip:port"
}

/// Settings for creating a rollback session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub num_players: usize,
    /// Frames between pressing and the press taking effect
    pub input_delay: usize,
    pub max_prediction_frames: usize,
    /// Silence, in ms, after which a peer is dropped
    pub disconnect_timeout: u64,
    /// Silence, in ms, after which the interruption is reported
    pub disconnect_notify_start: u64,
    /// Tick rate ggrs assumes for time sync
    pub fps: usize,
    /// Sync-test rollback distance
    pub check_distance: usize,
    pub frames_to_spread_wait: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            num_players: 2,
            input_delay: DEFAULT_INPUT_DELAY,
            max_prediction_frames: MAX_ROLLBACK_FRAMES,
            disconnect_timeout: 3000,
            disconnect_notify_start: 1000,
            fps: DEFAULT_FPS as usize,
            check_distance: DEFAULT_CHECK_DISTANCE,
            frames_to_spread_wait: DEFAULT_FRAMES_TO_SPREAD_WAIT,
        }
    }
}

impl SessionConfig {
    /// Same-machine play: every handle local, no delay
    pub fn local(num_players: usize) -> Self {
        Self {
            num_players,
            input_delay: 0,
            ..Default::default()
        }
    }

    pub fn online(num_players: usize) -> Self {
        Self {
            num_players,
            input_delay: DEFAULT_ONLINE_INPUT_DELAY,
            ..Default::default()
        }
    }

    /// Single-process determinism check; every handle is local
    pub fn sync_test(num_players: usize) -> Self {
        Self {
            num_players,
            input_delay: 0,
            ..Default::default()
        }
    }

    pub fn with_check_distance(mut self, distance: usize) -> Self {
        self.check_distance = distance;
        self
    }

    /// Check distance ggrs accepts: below the prediction window, at least 1
    pub fn effective_check_distance(&self) -> usize {
        self.check_distance
            .min(self.max_prediction_frames.saturating_sub(1))
            .max(1)
    }

    pub fn effective_input_delay(&self) -> usize {
        self.input_delay.min(MAX_INPUT_DELAY)
    }
}
