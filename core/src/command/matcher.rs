//! Buffered command state machine

use serde::{Deserialize, Serialize};

use super::buffer::CommandBuffer;
use super::element::{CommandElement, KeySet};
use super::key::CommandKey;
use crate::state::SimRng;

/// Frames within which a sequence step's keys must have been pressed
const STEP_WINDOW: i32 = 7;

/// Per-frame inputs to [`Command::step`] that are not part of the buffer.
pub struct StepContext<'a> {
    /// The slot is CPU-controlled; charge timing is rolled instead of read
    pub ai: bool,
    /// Hit-pause freezes the post-completion countdown
    pub hitpause: bool,
    /// Added to `buffer_time` when a command completes
    pub extra_buffer_time: i32,
    pub rng: &'a mut SimRng,
}

/// A parsed move and its match progress.
///
/// Everything here is simulation state: the cursor, charge index, hold flags
/// and countdowns are copied into every snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    pub hold: Vec<KeySet>,
    pub held: Vec<bool>,
    pub elements: Vec<CommandElement>,
    /// Index of the next element to match; `elements.len()` means complete
    pub cursor: usize,
    /// Element whose charge requirement was last met, or -1
    pub charge_index: i32,
    /// Frames allowed between the first and last element
    pub time: i32,
    pub elapsed: i32,
    pub buffer_time: i32,
    /// Frames left during which the command reads as active
    pub buffer_remaining: i32,
}

impl Default for Command {
    fn default() -> Self {
        Self {
            hold: Vec::new(),
            held: Vec::new(),
            elements: Vec::new(),
            cursor: 0,
            charge_index: -1,
            time: 1,
            elapsed: 0,
            buffer_time: 1,
            buffer_remaining: 0,
        }
    }
}

impl Command {
    /// Reset match progress. The post-completion countdown is cleared too.
    pub fn clear(&mut self) {
        self.cursor = 0;
        self.charge_index = -1;
        self.elapsed = 0;
        self.buffer_remaining = 0;
        self.held.fill(false);
    }

    pub fn is_active(&self) -> bool {
        self.buffer_remaining > 0
    }

    /// Advance one frame against `buf`.
    pub fn step(&mut self, buf: &CommandBuffer, ctx: &mut StepContext<'_>) {
        if !ctx.hitpause && self.buffer_remaining > 0 {
            self.buffer_remaining -= 1;
        }
        if self.elements.is_empty() {
            return;
        }
        let floor = self.buffer_remaining;

        // one physical key may satisfy only one hold requirement per frame
        let mut hold_mask = u64::MAX;
        if !self.test(buf, ctx, &mut hold_mask) {
            let charged_at_start = self.charge_index == 0 && self.cursor == 0;
            self.clear();
            if charged_at_start {
                self.charge_index = 0;
            }
        } else {
            if self.cursor == 1 && self.elements[0].slash {
                self.elapsed = 0;
            } else {
                self.elapsed += 1;
            }
            let complete = self.cursor == self.elements.len();
            if complete || (!ctx.ai && self.elapsed > self.time) {
                self.clear();
                if complete {
                    self.buffer_remaining = self.buffer_time + ctx.extra_buffer_time;
                }
            }
        }
        self.buffer_remaining = self.buffer_remaining.max(floor);
    }

    /// Try to make progress at the cursor. Returns false when the attempt
    /// failed and progress should be dropped.
    fn test(&mut self, buf: &CommandBuffer, ctx: &mut StepContext<'_>, hold_mask: &mut u64) -> bool {
        let mut any_held = false;
        let mut not_held = 0;

        if !self.hold.is_empty() && !ctx.ai {
            let mut all_hold = true;
            let multi = self.hold.len() > 1;
            for (i, set) in self.hold.iter().enumerate() {
                let mut satisfied = false;
                for &k in set {
                    let ks = buf.state(k);
                    let bit = 1u64 << k.index();
                    if ks == 1 && (self.cursor > 0 || multi) && !self.held[i] && *hold_mask & bit != 0 {
                        self.held[i] = true;
                        *hold_mask &= !bit;
                    }
                    if ks > 0 {
                        satisfied = true;
                        break;
                    }
                }
                all_hold &= satisfied;
                if self.held[i] {
                    any_held = true;
                } else {
                    not_held += 1;
                }
            }
            if self.cursor + 1 == self.elements.len() && (!all_hold || not_held > 1) {
                return any_held || self.cursor > 0;
            }
        }

        let cursor = self.cursor;
        if !ctx.ai && self.elements[cursor].slash {
            if cursor > 0 {
                let prev = &self.elements[cursor - 1].keys;
                if not_held == 1 {
                    if prev.len() != 1 {
                        return false;
                    }
                    // the button that finished the previous step is still down
                    if prev[0].is_pressed_button() {
                        let ks = buf.state(prev[0]);
                        if 0 < ks && ks <= buf.last_direction_time() {
                            return true;
                        }
                    }
                } else if prev.len() > 1
                    && prev.iter().any(|&k| k.is_pressed_button() && buf.state(k) > 0)
                {
                    return false;
                }
            }
            self.cursor += 1;
            return true;
        }

        if self.charge_index != cursor as i32 {
            let elem = &self.elements[cursor];
            if elem.charge_time > 1 {
                for &k in &elem.keys {
                    let ks = buf.state(k);
                    if ks > 0 {
                        return ctx.ai;
                    }
                    let short = if ctx.ai {
                        ctx.rng.rand_range(0, elem.charge_time) != 0
                    } else {
                        -ks < elem.charge_time
                    };
                    if short {
                        return any_held || cursor > 0;
                    }
                }
                self.charge_index = cursor as i32;
            } else if cursor > 0 && self.repeats_direction(cursor) {
                // a repeated direction must pass through neutral
                if buf.directions_released() {
                    self.charge_index = cursor as i32;
                } else {
                    return self.fail(buf, ctx, hold_mask, any_held);
                }
            }
        }

        let elem = &self.elements[cursor];
        let mut fresh = false;
        let mut in_window = true;
        for &k in &elem.keys {
            let n = buf.state2(k);
            if elem.slash {
                fresh |= n > 0;
            } else if (1..=STEP_WINDOW).contains(&n) {
                fresh |= n == 1;
            } else {
                in_window = false;
                break;
            }
        }
        if !in_window || !fresh {
            return self.fail(buf, ctx, hold_mask, any_held);
        }

        self.cursor += 1;
        if self.cursor < self.elements.len()
            && self.elements[self.cursor - 1].chains_into(&self.elements[self.cursor])
        {
            return self.test(buf, ctx, hold_mask);
        }
        true
    }

    /// Element `cursor` repeats the single plain direction of the one before.
    fn repeats_direction(&self, cursor: usize) -> bool {
        let (prev, cur) = (&self.elements[cursor - 1].keys, &self.elements[cursor].keys);
        prev.len() == 1
            && cur.len() == 1
            && prev[0] < CommandKey::Bs
            && cur[0] < CommandKey::nB
            && (prev[0] as u8).wrapping_sub(cur[0] as u8) & 7 == 0
    }

    /// Keep progress when the previous direction is still the latest input
    /// change, otherwise restart from the first element.
    fn fail(
        &mut self,
        buf: &CommandBuffer,
        ctx: &mut StepContext<'_>,
        hold_mask: &mut u64,
        any_held: bool,
    ) -> bool {
        let cursor = self.cursor;
        if cursor == 0 {
            return any_held;
        }
        let elem = &self.elements[cursor];
        if ctx.ai || !(elem.greater || elem.direction) {
            return true;
        }
        let t = if elem.greater {
            buf.last_change_time()
        } else {
            buf.last_direction_time()
        };
        if self.elements[cursor - 1]
            .keys
            .iter()
            .any(|&k| buf.state2(k).abs() == t)
        {
            return true;
        }
        self.clear();
        self.test(buf, ctx, hold_mask)
    }
}
