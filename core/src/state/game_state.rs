//! Snapshot of a `World`
//!
//! `save_state` and `load_state` are mirrored field-by-field routines:
//! every line in one has its counterpart in the other, in the same order.
//! A new field goes into both, into `first_difference`, and into the
//! populated world used by the symmetry test.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{
    BytecodeStack, BytecodeValue, Camera, EnvColor, EnvShake, GlobalSpecialFlag, PalFx,
    PauseState, StageState, SuperPauseState,
};
use super::rng::SimRng;
use super::world::{RoundState, SlotState, World};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] bincode::Error),
}

/// What a load had to repair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub chars_persisted: bool,
    pub projectiles_persisted: bool,
}

/// Deep copy of every snapshotted `World` field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameState {
    pub rng: SimRng,
    pub time: i32,
    pub game_time: i32,
    pub round_state: RoundState,
    pub slots: Vec<SlotState>,
    pub cam: Camera,
    pub all_pal_fx: PalFx,
    pub bg_pal_fx: PalFx,
    pub pause: PauseState,
    pub super_pause: SuperPauseState,
    pub env_shake: EnvShake,
    pub special_flag: GlobalSpecialFlag,
    pub env_color: EnvColor,
    pub bc_stack: BytecodeStack,
    pub bc_var_stack: BytecodeStack,
    pub bc_var: Vec<BytecodeValue>,
    pub stage: StageState,

    /// Reused encoding buffer for `checksum`
    #[serde(skip)]
    scratch: Vec<u8>,
}

impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.first_difference(other).is_none()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture `world`, reusing this snapshot's allocations.
    pub fn save_state(&mut self, world: &World) {
        self.rng = world.rng;
        self.time = world.time;
        self.game_time = world.game_time;
        self.round_state = world.round_state;
        self.save_slots(world);
        self.cam.clone_from(&world.cam);
        self.all_pal_fx.clone_from(&world.all_pal_fx);
        self.bg_pal_fx.clone_from(&world.bg_pal_fx);
        self.pause.clone_from(&world.pause);
        self.super_pause.clone_from(&world.super_pause);
        self.env_shake.clone_from(&world.env_shake);
        self.special_flag = world.special_flag;
        self.env_color.clone_from(&world.env_color);
        self.bc_stack.clone_from(&world.bc_stack);
        self.bc_var_stack.clone_from(&world.bc_var_stack);
        self.bc_var.clone_from(&world.bc_var);
        self.stage.clone_from(&world.stage);
    }

    /// Overwrite `world` with this snapshot.
    pub fn load_state(&self, world: &mut World) -> LoadReport {
        world.rng = self.rng;
        world.time = self.time;
        world.game_time = self.game_time;
        world.round_state = self.round_state;
        let report = self.load_slots(world);
        world.cam.clone_from(&self.cam);
        world.all_pal_fx.clone_from(&self.all_pal_fx);
        world.bg_pal_fx.clone_from(&self.bg_pal_fx);
        world.pause.clone_from(&self.pause);
        world.super_pause.clone_from(&self.super_pause);
        world.env_shake.clone_from(&self.env_shake);
        world.special_flag = self.special_flag;
        world.env_color.clone_from(&self.env_color);
        world.bc_stack.clone_from(&self.bc_stack);
        world.bc_var_stack.clone_from(&self.bc_var_stack);
        world.bc_var.clone_from(&self.bc_var);
        world.stage.clone_from(&self.stage);
        report
    }

    fn save_slots(&mut self, world: &World) {
        self.slots.truncate(world.slots.len());
        self.slots.resize_with(world.slots.len(), SlotState::default);
        for (snap, live) in self.slots.iter_mut().zip(&world.slots) {
            snap.chars.clone_from(&live.chars);
            snap.projectiles.clone_from(&live.projectiles);
            snap.explods.clone_from(&live.explods);
            snap.expl_drawlist.clone_from(&live.expl_drawlist);
            snap.top_expl_drawlist.clone_from(&live.top_expl_drawlist);
            snap.under_expl_drawlist.clone_from(&live.under_expl_drawlist);
            snap.ai_input = live.ai_input;
            snap.input_remap = live.input_remap;
            snap.autoguard = live.autoguard;
            snap.ai_level = live.ai_level;
        }
    }

    fn load_slots(&self, world: &mut World) -> LoadReport {
        let report = LoadReport {
            chars_persisted: self.chars_persist(world),
            projectiles_persisted: self.projectiles_persist(world),
        };
        if !report.chars_persisted {
            tracing::info!(frame = self.time, "Characters did not persist");
        }
        if !report.projectiles_persisted {
            tracing::info!(frame = self.time, "Projectiles did not persist");
        }

        world.slots.truncate(self.slots.len());
        world.slots.resize_with(self.slots.len(), SlotState::default);
        for (i, (live, snap)) in world.slots.iter_mut().zip(&self.slots).enumerate() {
            if live.chars.len() != snap.chars.len() {
                tracing::debug!(
                    slot = i,
                    live = live.chars.len(),
                    snapshot = snap.chars.len(),
                    "Resizing characters"
                );
            }
            restore_entries(&mut live.chars, &snap.chars);
            if live.projectiles.len() != snap.projectiles.len() {
                tracing::debug!(
                    slot = i,
                    live = live.projectiles.len(),
                    snapshot = snap.projectiles.len(),
                    "Resizing projectiles"
                );
            }
            restore_entries(&mut live.projectiles, &snap.projectiles);
            restore_entries(&mut live.explods, &snap.explods);
            live.expl_drawlist.clone_from(&snap.expl_drawlist);
            live.top_expl_drawlist.clone_from(&snap.top_expl_drawlist);
            live.under_expl_drawlist.clone_from(&snap.under_expl_drawlist);
            live.ai_input = snap.ai_input;
            live.input_remap = snap.input_remap;
            live.autoguard = snap.autoguard;
            live.ai_level = snap.ai_level;
        }
        report
    }

    /// Every slot holds the same characters, by id, as the snapshot.
    pub fn chars_persist(&self, world: &World) -> bool {
        world.slots.len() == self.slots.len()
            && world.slots.iter().zip(&self.slots).all(|(live, snap)| {
                live.chars.len() == snap.chars.len()
                    && live.chars.iter().zip(&snap.chars).all(|(l, s)| l.id == s.id)
            })
    }

    /// Every slot holds the same projectiles, by id, as the snapshot.
    pub fn projectiles_persist(&self, world: &World) -> bool {
        world.slots.len() == self.slots.len()
            && world.slots.iter().zip(&self.slots).all(|(live, snap)| {
                live.projectiles.len() == snap.projectiles.len()
                    && live
                        .projectiles
                        .iter()
                        .zip(&snap.projectiles)
                        .all(|(l, s)| l.id == s.id)
            })
    }

    /// xxh3 of the bincode encoding
    pub fn checksum(&mut self) -> Result<u64, StateError> {
        let mut buf = std::mem::take(&mut self.scratch);
        buf.clear();
        let result = bincode::serialize_into(&mut buf, &*self);
        let hash = xxhash_rust::xxh3::xxh3_64(&buf);
        self.scratch = buf;
        result?;
        Ok(hash)
    }

    /// Name of the first field that differs from `other`, if any.
    pub fn first_difference(&self, other: &GameState) -> Option<String> {
        macro_rules! check {
            ($a:expr, $b:expr, $($field:ident),+ $(,)?) => {
                $(
                    if $a.$field != $b.$field {
                        return Some(stringify!($field).to_string());
                    }
                )+
            };
        }

        check!(self, other, rng, time, game_time, round_state);
        if self.slots.len() != other.slots.len() {
            return Some("slots".to_string());
        }
        for (i, (a, b)) in self.slots.iter().zip(&other.slots).enumerate() {
            if let Some(field) = slot_difference(a, b) {
                return Some(format!("slots[{i}].{field}"));
            }
        }
        check!(
            self,
            other,
            cam,
            all_pal_fx,
            bg_pal_fx,
            pause,
            super_pause,
            env_shake,
            special_flag,
            env_color,
            bc_stack,
            bc_var_stack,
            bc_var,
            stage,
        );
        None
    }
}

fn slot_difference(a: &SlotState, b: &SlotState) -> Option<String> {
    if a.chars.len() != b.chars.len() {
        return Some("chars".to_string());
    }
    if let Some(j) = a.chars.iter().zip(&b.chars).position(|(x, y)| x != y) {
        let (x, y) = (&a.chars[j], &b.chars[j]);
        let field = if x.commands != y.commands {
            "commands"
        } else if x.anim != y.anim {
            "anim"
        } else {
            "state"
        };
        return Some(format!("chars[{j}].{field}"));
    }
    macro_rules! check {
        ($($field:ident),+ $(,)?) => {
            $(
                if a.$field != b.$field {
                    return Some(stringify!($field).to_string());
                }
            )+
        };
    }
    check!(
        projectiles,
        explods,
        expl_drawlist,
        top_expl_drawlist,
        under_expl_drawlist,
        ai_input,
        input_remap,
        autoguard,
        ai_level,
    );
    None
}

/// Make `live` an element-wise copy of `snap`, growing or shrinking it.
/// Grown entries are clones of the snapshot entries.
fn restore_entries<T: Clone>(live: &mut Vec<T>, snap: &[T]) {
    live.truncate(snap.len());
    for (l, s) in live.iter_mut().zip(snap) {
        l.clone_from(s);
    }
    let kept = live.len();
    live.extend_from_slice(&snap[kept..]);
}
