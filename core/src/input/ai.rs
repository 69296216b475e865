//! Random-timer pad for CPU-controlled slots

use rollcade_shared::InputBits;
use serde::{Deserialize, Serialize};

use crate::state::SimRng;

/// Chance denominator and maximum hold for the direction timer
const DIRECTION_TIMING: (i32, i32) = (15, 60);
/// Same for the six attack buttons
const BUTTON_TIMING: (i32, i32) = (30, 30);
/// Start is pressed rarely
const START_TIMING: (i32, i32) = (3600, 30);

/// Button and direction timers driven by the simulation RNG.
///
/// A non-zero timer means the switch is held. `dir` is 0 for up and counts
/// clockwise in eighths. The whole struct is snapshotted with its slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AiInput {
    pub dir: i32,
    pub dir_timer: i32,
    /// `a b c x y z s`
    pub button_timers: [i32; 7],
}

impl AiInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance every timer by one frame. During an intro the pad is idle.
    pub fn update(&mut self, rng: &mut SimRng, intro_running: bool) {
        if intro_running {
            self.dir_timer = 0;
            self.button_timers = [0; 7];
            return;
        }
        if tick(&mut self.dir_timer, rng, DIRECTION_TIMING) {
            self.dir = rng.rand_range(0, 7);
        }
        let (attacks, start) = self.button_timers.split_at_mut(6);
        for timer in attacks {
            tick(timer, rng, BUTTON_TIMING);
        }
        tick(&mut start[0], rng, START_TIMING);
    }

    pub fn to_bits(&self) -> InputBits {
        let moving = self.dir_timer != 0;
        let dir_in = |set: [i32; 3]| moving && set.contains(&self.dir);
        let held = |i: usize| self.button_timers[i] != 0;
        InputBits::from_switches(
            dir_in([7, 0, 1]),
            dir_in([3, 4, 5]),
            dir_in([5, 6, 7]),
            dir_in([1, 2, 3]),
            held(0),
            held(1),
            held(2),
            held(3),
            held(4),
            held(5),
            held(6),
        )
    }
}

/// A bank of [`AiInput`] pads with their own RNG, for driving human slots
/// from outside the simulation (harnesses, recordings, soak tests).
#[derive(Debug, Clone)]
pub struct AiPads {
    pads: Vec<AiInput>,
    rng: SimRng,
}

impl AiPads {
    pub fn new(players: usize, seed: u64) -> Self {
        Self {
            pads: vec![AiInput::new(); players],
            rng: SimRng::new(seed),
        }
    }

    pub fn players(&self) -> usize {
        self.pads.len()
    }

    /// Roll every pad one frame and return the held bits per player
    pub fn next_frame(&mut self) -> Vec<InputBits> {
        let rng = &mut self.rng;
        self.pads
            .iter_mut()
            .map(|pad| {
                pad.update(rng, false);
                pad.to_bits()
            })
            .collect()
    }
}

/// Count a timer down. On expiry, re-press with chance `1 / odds` for up to
/// `hold_max` frames. Returns true when re-pressed.
fn tick(timer: &mut i32, rng: &mut SimRng, (odds, hold_max): (i32, i32)) -> bool {
    *timer -= 1;
    if *timer <= 0 {
        if rng.rand_range(1, odds) == 1 {
            *timer = rng.rand_range(1, hold_max);
            return true;
        }
        *timer = 0;
    }
    false
}
