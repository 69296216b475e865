//! Per-player run-length input history

use rollcade_shared::InputBits;
use serde::{Deserialize, Serialize};

use super::key::{Button, CommandKey};

/// One axis of input history.
///
/// `len` is signed: positive while the axis is held, negative while it is
/// released, and its magnitude counts frames since the last transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunCounter {
    pub len: i32,
    pub sign: i8,
}

impl Default for RunCounter {
    fn default() -> Self {
        Self { len: 0, sign: -1 }
    }
}

impl RunCounter {
    /// Advance by one frame with the axis `on` or off
    pub fn feed(&mut self, on: bool) {
        if on != (self.sign > 0) {
            self.len = 0;
            self.sign = -self.sign;
        }
        self.len += i32::from(self.sign);
    }

    pub fn held(&self) -> bool {
        self.sign > 0
    }
}

/// Rolling directional and button history for one player.
///
/// Directions are stored relative to facing: `back`/`fwd` rather than
/// left/right. The whole buffer is simulation state and is copied verbatim
/// into snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandBuffer {
    pub back: RunCounter,
    pub down: RunCounter,
    pub fwd: RunCounter,
    pub up: RunCounter,
    pub buttons: [RunCounter; 7],
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame of facing-relative switches.
    ///
    /// Opposing directions cancel: holding back and forward together reads
    /// as neither, and likewise for up and down.
    #[allow(clippy::too_many_arguments)]
    pub fn input(
        &mut self,
        back: bool,
        down: bool,
        fwd: bool,
        up: bool,
        a: bool,
        b: bool,
        c: bool,
        x: bool,
        y: bool,
        z: bool,
        s: bool,
    ) {
        self.back.feed(back && !fwd);
        self.down.feed(down && !up);
        self.fwd.feed(fwd && !back);
        self.up.feed(up && !down);
        for (counter, on) in self.buttons.iter_mut().zip([a, b, c, x, y, z, s]) {
            counter.feed(on);
        }
    }

    /// Feed one frame of raw input bits. A negative `facing` means the
    /// player faces left, so the left switch becomes forward.
    pub fn input_bits(&mut self, bits: InputBits, facing: i32) {
        let (back, fwd) = if facing < 0 {
            (InputBits::RIGHT, InputBits::LEFT)
        } else {
            (InputBits::LEFT, InputBits::RIGHT)
        };
        self.input(
            bits.contains(back),
            bits.contains(InputBits::DOWN),
            bits.contains(fwd),
            bits.contains(InputBits::UP),
            bits.contains(InputBits::A),
            bits.contains(InputBits::B),
            bits.contains(InputBits::C),
            bits.contains(InputBits::X),
            bits.contains(InputBits::Y),
            bits.contains(InputBits::Z),
            bits.contains(InputBits::START),
        );
    }

    pub fn button(&self, button: Button) -> RunCounter {
        self.buttons[button.index()]
    }

    /// Signed state of a key: positive frames held, negative frames released.
    pub fn state(&self, key: CommandKey) -> i32 {
        use CommandKey::*;
        let (bb, db, fb, ub) = (self.back.len, self.down.len, self.fwd.len, self.up.len);
        match key {
            B => (-db.max(ub)).min(bb),
            D => (-bb.max(fb)).min(db),
            F => (-db.max(ub)).min(fb),
            U => (-bb.max(fb)).min(ub),
            DB => db.min(bb),
            UB => ub.min(bb),
            DF => db.min(fb),
            UF => ub.min(fb),
            nB | nD | nF | nU | nDB | nUB | nDF | nUF => -self.state(key.toggled()),
            Bs => bb,
            Ds => db,
            Fs => fb,
            Us => ub,
            DBs => (-ub.max(fb)).min(db.max(bb)),
            UBs => (-db.max(fb)).min(ub.max(bb)),
            DFs => (-ub.max(bb)).min(db.max(fb)),
            UFs => (-db.max(bb)).min(ub.max(fb)),
            nBs | nDs | nFs | nUs | nDBs | nUBs | nDFs | nUFs => -self.state(key.toggled()),
            a => self.buttons[0].len,
            b => self.buttons[1].len,
            c => self.buttons[2].len,
            x => self.buttons[3].len,
            y => self.buttons[4].len,
            z => self.buttons[5].len,
            s => self.buttons[6].len,
            na | nb | nc | nx | ny | nz | ns => -self.state(key.toggled()),
        }
    }

    /// Refined state for strict and released-strict keys.
    ///
    /// A strict direction that is currently released reports its own
    /// release time; a held one reports the shortest of the axes that could
    /// have produced it. Released strict keys fold the three neighbouring
    /// interpretations. Every other key falls back to [`state`](Self::state).
    pub fn state2(&self, key: CommandKey) -> i32 {
        use CommandKey::*;
        let (bb, db, fb, ub) = (self.back.len, self.down.len, self.fwd.len, self.up.len);
        let fold = |p: i32, q: i32, r: i32| -> i32 {
            if p > 0 {
                -q.max(r)
            } else if q > 0 {
                -p.max(r)
            } else if r > 0 {
                -p.max(q)
            } else {
                -p.max(q).max(r)
            }
        };
        match key {
            Bs if bb < 0 => bb,
            Bs => bb.abs().min(db.abs()).min(ub.abs()),
            Ds if db < 0 => db,
            Ds => db.abs().min(bb.abs()).min(fb.abs()),
            Fs if fb < 0 => fb,
            Fs => fb.abs().min(db.abs()).min(ub.abs()),
            Us if ub < 0 => ub,
            Us => ub.abs().min(bb.abs()).min(fb.abs()),
            DBs | UBs | DFs | UFs => {
                let st = self.state(key);
                if st < 0 {
                    return st;
                }
                let (v, h) = match key {
                    DBs => (db, bb),
                    UBs => (ub, bb),
                    DFs => (db, fb),
                    _ => (ub, fb),
                };
                v.abs().min(h.abs())
            }
            nBs => fold(self.state(B), self.state(UB), self.state(DB)),
            nDs => fold(self.state(D), self.state(DB), self.state(DF)),
            nFs => fold(self.state(F), self.state(DF), self.state(UF)),
            nUs => fold(self.state(U), self.state(UB), self.state(UF)),
            nDBs => fold(self.state(DB), self.state(D), self.state(B)),
            nUBs => fold(self.state(UB), self.state(U), self.state(B)),
            nDFs => fold(self.state(DF), self.state(D), self.state(F)),
            nUFs => fold(self.state(UF), self.state(U), self.state(F)),
            _ => self.state(key),
        }
    }

    /// Frames since the most recent change on any direction axis
    pub fn last_direction_time(&self) -> i32 {
        self.back
            .len
            .abs()
            .min(self.down.len.abs())
            .min(self.fwd.len.abs())
            .min(self.up.len.abs())
    }

    /// Frames since the most recent change on any axis, buttons included
    pub fn last_change_time(&self) -> i32 {
        self.buttons
            .iter()
            .fold(self.last_direction_time(), |t, b| t.min(b.len.abs()))
    }

    /// True when all four direction axes are released
    pub fn directions_released(&self) -> bool {
        !self.back.held() && !self.down.held() && !self.fwd.held() && !self.up.held()
    }
}
