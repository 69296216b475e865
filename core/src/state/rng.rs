//! Deterministic random number generator carried in simulation state

use serde::{Deserialize, Serialize};

/// Default seed used when a match does not supply one
pub const DEFAULT_SEED: u64 = 0x853c_49e6_748f_ea9b;

/// PCG-XSH-RR generator whose whole state is a single `u64`.
///
/// The state is part of every snapshot, so identical seeds and identical
/// inputs produce identical rolls on every peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimRng {
    state: u64,
}

impl Default for SimRng {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Raw generator state, for snapshots and logging
    pub fn state(&self) -> u64 {
        self.state
    }

    pub fn set_state(&mut self, state: u64) {
        self.state = state;
    }

    pub fn next_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let xor_shifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xor_shifted.rotate_right(rot)
    }

    /// Uniform integer in `min..=max`. Returns `min` when the range is empty.
    pub fn rand_range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (i64::from(max) - i64::from(min) + 1) as u64;
        let bucket = (u64::from(u32::MAX) + 1) / span;
        let roll = u64::from(self.next_u32()) / bucket;
        // the top bucket can be partial; fold it onto the last value
        (i64::from(min) + roll.min(span - 1) as i64) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SimRng::new(42);
        let mut b = SimRng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_rand_range_stays_in_bounds() {
        let mut rng = SimRng::new(7);
        let mut seen = [false; 8];
        for _ in 0..1000 {
            let v = rng.rand_range(0, 7);
            assert!((0..=7).contains(&v));
            seen[v as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_rand_range_degenerate() {
        let mut rng = SimRng::new(1);
        assert_eq!(rng.rand_range(5, 5), 5);
        assert_eq!(rng.rand_range(9, 3), 9);
    }

    #[test]
    fn test_rand_range_full_width_does_not_overflow() {
        let mut rng = SimRng::new(3);
        for _ in 0..100 {
            rng.rand_range(i32::MIN, i32::MAX);
        }
    }
}
