//! Frame-keyed snapshot store
//!
//! ggrs cells only hold a [`SnapshotTicket`]. The snapshots themselves are
//! pooled `GameState` values owned here, keyed by frame.

use ggrs::Frame;
use hashbrown::HashMap;

use crate::state::{GameState, LoadReport, Pool, StateError, World};

/// What ggrs stores in its state cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotTicket {
    pub frame: Frame,
    pub checksum: u64,
}

pub struct SnapshotStore {
    snapshots: HashMap<Frame, GameState>,
    /// Checksum of each frame's latest save
    history: HashMap<Frame, u64>,
    /// Checksum a frame had before a re-save changed it
    replaced: HashMap<Frame, u64>,
    pool: Pool<GameState>,
    /// Frames kept behind the newest save
    retain: Frame,
}

/// Result of one save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedFrame {
    pub checksum: u64,
    /// Checksum from an earlier save of the same frame, when it differs
    pub previous: Option<u64>,
}

impl SnapshotStore {
    pub fn new(max_prediction: usize) -> Self {
        let retain = max_prediction as Frame + 1;
        Self {
            snapshots: HashMap::new(),
            history: HashMap::new(),
            replaced: HashMap::new(),
            pool: Pool::new(max_prediction + 2),
            retain,
        }
    }

    /// Deep-copy `world` as `frame`, reusing an existing entry for that
    /// frame, and evict frames that can no longer be loaded.
    pub fn save(&mut self, frame: Frame, world: &World) -> Result<SavedFrame, StateError> {
        self.evict_before(frame - self.retain);

        let mut state = match self.snapshots.remove(&frame) {
            Some(state) => state,
            None => self.pool.acquire(),
        };
        state.save_state(world);
        let checksum = match state.checksum() {
            Ok(sum) => sum,
            Err(e) => {
                self.pool.release(state);
                return Err(e);
            }
        };
        self.snapshots.insert(frame, state);

        let previous = match self.history.insert(frame, checksum) {
            Some(old) if old != checksum => Some(old),
            _ => None,
        };
        if let Some(old) = previous {
            self.replaced.entry(frame).or_insert(old);
        }
        Ok(SavedFrame { checksum, previous })
    }

    /// Restore `frame` into `world`.
    ///
    /// The snapshot stays stored; ggrs may load the same frame again.
    /// Returns `None` when the frame is not held or its checksum does not
    /// match `expected`.
    pub fn load(&self, frame: Frame, expected: Option<u64>, world: &mut World) -> Option<LoadReport> {
        let state = self.snapshots.get(&frame)?;
        if let Some(expected) = expected
            && self.history.get(&frame) != Some(&expected)
        {
            tracing::warn!(frame, "Snapshot does not match ggrs ticket");
            return None;
        }
        Some(state.load_state(world))
    }

    pub fn get(&self, frame: Frame) -> Option<&GameState> {
        self.snapshots.get(&frame)
    }

    pub fn checksum_of(&self, frame: Frame) -> Option<u64> {
        self.history.get(&frame).copied()
    }

    /// The first checksum `frame` was saved with, if a later save changed it
    pub fn replaced_checksum(&self, frame: Frame) -> Option<u64> {
        self.replaced.get(&frame).copied()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Idle snapshots in the pool
    pub fn pooled(&self) -> usize {
        self.pool.available()
    }

    fn evict_before(&mut self, oldest: Frame) {
        let stale: Vec<Frame> = self
            .snapshots
            .keys()
            .copied()
            .filter(|&f| f < oldest)
            .collect();
        for frame in stale {
            if let Some(state) = self.snapshots.remove(&frame) {
                self.pool.release(state);
            }
        }
        self.history.retain(|&f, _| f >= oldest);
        self.replaced.retain(|&f, _| f >= oldest);
    }

    /// Release every snapshot and empty the pool. Returns how many
    /// snapshots were dropped.
    pub fn close(&mut self) -> usize {
        let held = self.snapshots.len();
        for (_, state) in self.snapshots.drain() {
            self.pool.release(state);
        }
        self.history.clear();
        self.replaced.clear();
        self.pool.drain();
        held
    }
}
