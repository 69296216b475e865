//! Small deterministic reference simulation
//!
//! Enough game to exercise every snapshotted field: walking, jumping,
//! projectiles from a motion command, helpers from a hold command, hits,
//! explods, pauses and a KO or time-out ending.

use rollcade_shared::InputBits;

use super::{Simulation, StepOutcome};
use crate::command::CommandList;
use crate::state::{
    AnimationState, BytecodeValue, CharState, ExplodState, ProjectileState, RoundState,
    SlotState, World,
};

const GROUND_Y: f32 = 0.0;
const GRAVITY: f32 = 0.45;
const HIT_RANGE: f32 = 24.0;
const HIT_DAMAGE: i32 = 50;
const HIT_PAUSE: i32 = 8;
const EXPLOD_TIME: i32 = 20;

#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// End the match after this many frames; `None` runs until a KO
    pub match_frames: Option<i32>,
    pub intro_frames: i32,
    pub walk_speed: f32,
    pub jump_speed: f32,
    pub projectile_speed: f32,
    /// Frames a projectile lives unless it hits
    pub projectile_lifetime: i32,
    pub max_projectiles: usize,
    pub max_helpers: usize,
    pub helper_lifetime: i32,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            match_frames: None,
            intro_frames: 0,
            walk_speed: 2.5,
            jump_speed: 8.0,
            projectile_speed: 5.0,
            projectile_lifetime: 90,
            max_projectiles: 2,
            max_helpers: 2,
            helper_lifetime: 120,
        }
    }
}

/// Reference [`Simulation`].
#[derive(Debug, Clone, Default)]
pub struct Sandbox {
    config: SandboxConfig,
}

impl Sandbox {
    pub fn new(config: SandboxConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Commands every sandbox character recognizes
    pub fn commands(default_time: i32, default_buffer_time: i32) -> CommandList {
        let mut list = CommandList::new(default_time, default_buffer_time);
        list.add("fireball", "D, DF, F, a");
        list.add("summon", "/s, x");
        list.add("dash", "F, F");
        list.add("jab", "a");
        list
    }

    /// A world of `slots` sandbox characters
    pub fn world(seed: u64, slots: usize) -> World {
        World::new(
            seed,
            slots,
            &Self::commands(
                crate::command::DEFAULT_COMMAND_TIME,
                crate::command::DEFAULT_BUFFER_TIME,
            ),
        )
    }

    fn move_chars(&self, slot: &mut SlotState, bits: InputBits, rng_roll: i32) {
        let mut expired = Vec::new();
        for (i, ch) in slot.chars.iter_mut().enumerate() {
            ch.old_pos = ch.pos;
            ch.prev_state_no = ch.state_no;
            if ch.hit_pause_time > 0 {
                ch.hit_pause_time -= 1;
                continue;
            }
            if !ch.is_helper() {
                let dir = i32::from(bits.contains(InputBits::RIGHT))
                    - i32::from(bits.contains(InputBits::LEFT));
                ch.vel[0] = dir as f32 * self.config.walk_speed;
                if ch.commands.is_active("dash") {
                    ch.vel[0] = ch.facing * self.config.walk_speed * 3.0;
                }
                if bits.contains(InputBits::UP) && ch.pos[1] >= GROUND_Y {
                    ch.vel[1] = -self.config.jump_speed;
                    ch.state_no = 40;
                }
            } else if ch.state_time >= self.config.helper_lifetime {
                expired.push(i);
            }
            ch.pos[0] += ch.vel[0];
            ch.pos[1] += ch.vel[1];
            if ch.pos[1] < GROUND_Y {
                ch.vel[1] += GRAVITY;
            } else {
                ch.pos[1] = GROUND_Y;
                ch.vel[1] = 0.0;
                if ch.state_no == 40 {
                    ch.state_no = 0;
                }
            }
            ch.state_time += 1;
            ch.anim.tick(4);
            if let Some(v) = ch.ivar.first_mut() {
                *v = rng_roll;
            }
            if ch.commands.is_active("jab") {
                ch.state_no = 200;
                ch.state_time = 0;
            } else if ch.state_no == 200 && ch.state_time > 10 {
                ch.state_no = 0;
            }
        }
        for &i in expired.iter().rev() {
            slot.chars.remove(i);
        }
    }

    fn spawn(&self, slot: &mut SlotState, slot_idx: usize, frame: i32) {
        let Some(root) = slot.chars.first() else {
            return;
        };
        let id_base = (frame << 8) | ((slot_idx as i32) << 2);

        if root.commands.is_active("fireball") && slot.projectiles.len() < self.config.max_projectiles
        {
            slot.projectiles.push(ProjectileState {
                id: id_base | 1,
                anim: 1000,
                pos: [root.pos[0], root.pos[1] - 40.0],
                velocity: [root.facing * self.config.projectile_speed, 0.0],
                facing: root.facing,
                remove_time: self.config.projectile_lifetime,
                hits: 1,
                priority: 1,
                ..Default::default()
            });
        }

        let helpers = slot.chars.iter().filter(|c| c.is_helper()).count();
        if root.commands.is_active("summon") && helpers < self.config.max_helpers {
            let mut commands = root.commands.clone();
            commands.clear();
            let helper = CharState {
                id: id_base | 2,
                helper_id: helpers as i32 + 1,
                parent_index: 0,
                player_no: root.player_no,
                team_side: root.team_side,
                life: 1,
                life_max: 1,
                pos: root.pos,
                vel: [root.facing, 0.0, 0.0],
                facing: root.facing,
                anim: AnimationState::new(3000, 30),
                ivar: vec![0; 4],
                commands,
                ..Default::default()
            };
            slot.chars.push(helper);
        }
    }

    fn tick_projectiles(slot: &mut SlotState) {
        for p in slot.projectiles.iter_mut() {
            if p.hit_pause > 0 {
                p.hit_pause -= 1;
                continue;
            }
            p.pos[0] += p.velocity[0];
            p.pos[1] += p.velocity[1];
            p.velocity[0] += p.accel[0];
            p.velocity[1] += p.accel[1];
            p.time += 1;
            if p.remove_time > 0 {
                p.remove_time -= 1;
                if p.remove_time == 0 {
                    p.remove = true;
                }
            }
        }
        slot.projectiles.retain(|p| !p.remove);
    }

    fn tick_explods(slot: &mut SlotState) {
        for e in slot.explods.iter_mut() {
            e.time += 1;
            e.pos[0] += e.velocity[0];
            e.pos[1] += e.velocity[1];
            e.anim.tick(2);
        }
        slot.explods
            .retain(|e| e.remove_time < 0 || e.time < e.remove_time);
        slot.expl_drawlist = (0..slot.explods.len()).collect();
        slot.top_expl_drawlist = slot
            .explods
            .iter()
            .enumerate()
            .filter(|(_, e)| e.on_top)
            .map(|(i, _)| i)
            .collect();
        slot.under_expl_drawlist.clear();
    }

    /// Projectiles hitting an opposing root character
    fn resolve_hits(world: &mut World, frame: i32) {
        let roots: Vec<Option<(i32, f32, f32)>> = world
            .slots
            .iter()
            .map(|s| s.root().map(|c| (c.team_side, c.pos[0], c.pos[1] - 40.0)))
            .collect();

        let mut hits: Vec<(usize, usize, [f32; 2])> = Vec::new();
        for (owner, slot) in world.slots.iter_mut().enumerate() {
            let Some(Some((side, _, _))) = roots.get(owner).copied() else {
                continue;
            };
            for p in slot.projectiles.iter_mut() {
                let target = roots.iter().enumerate().find_map(|(t, r)| {
                    let (tside, x, y) = (*r)?;
                    (tside != side
                        && (x - p.pos[0]).abs() < HIT_RANGE
                        && (y - p.pos[1]).abs() < HIT_RANGE)
                        .then_some(t)
                });
                if let Some(t) = target {
                    p.hits -= 1;
                    if p.hits <= 0 {
                        p.remove = true;
                    }
                    hits.push((owner, t, p.pos));
                }
            }
            slot.projectiles.retain(|p| !p.remove);
        }

        for (i, (owner, target, pos)) in hits.into_iter().enumerate() {
            if let Some(ch) = world.slots[target].root_mut() {
                ch.life = (ch.life - HIT_DAMAGE).max(0);
                ch.hit_pause_time = HIT_PAUSE;
                ch.power = (ch.power + HIT_DAMAGE).min(ch.power_max);
            }
            let explods = &mut world.slots[owner].explods;
            explods.push(ExplodState {
                id: (frame << 8) | (i as i32 & 0xff),
                anim: AnimationState::new(5000, EXPLOD_TIME),
                player_id: owner as i32,
                bind_id: -1,
                bind_time: 0,
                remove_time: EXPLOD_TIME,
                pos,
                scale: [1.0, 1.0],
                facing: 1.0,
                on_top: true,
                ..Default::default()
            });
            world.env_shake.time = 6;
            world.env_shake.freq = 60.0;
            world.env_shake.ampl = 4.0;
            world.env_shake.mul = 0.9;
            world.pause.pause_time = 2;
            world.pause.end_cmd_buf_time = 1;
            world.pause.player = owner;
        }
    }

    fn tick_world(world: &mut World) {
        if world.pause.pause_time > 0 {
            world.pause.pause_time -= 1;
        }
        if world.super_pause.super_time > 0 {
            world.super_pause.super_time -= 1;
        }
        world.env_shake.tick();
        if world.env_color.time > 0 {
            world.env_color.time -= 1;
        }
        if world.all_pal_fx.time > 0 {
            world.all_pal_fx.time -= 1;
        }

        let xs: Vec<f32> = world
            .slots
            .iter()
            .filter_map(|s| s.root().map(|c| c.pos[0]))
            .collect();
        if !xs.is_empty() {
            world.cam.pos[0] = xs.iter().sum::<f32>() / xs.len() as f32;
        }

        // the expression stacks hold the last evaluated values
        world.bc_stack.clear();
        world.bc_stack.push(BytecodeValue::int(world.game_time));
        world.bc_stack.push(BytecodeValue::bool(world.pause.pause_time > 0));
        world.bc_var.truncate(1);
        world.bc_var.resize(1, BytecodeValue::default());
        world.bc_var[0] = BytecodeValue::float(world.cam.pos[0]);
    }
}

impl Simulation for Sandbox {
    fn simulate(&mut self, world: &mut World, inputs: &[InputBits]) -> StepOutcome {
        let frame = world.game_time;

        world.round_state = if frame < self.config.intro_frames {
            RoundState::Intro
        } else if world.round_state == RoundState::Over {
            RoundState::Over
        } else {
            RoundState::Fight
        };

        let roll = world.rng.rand_range(0, 999);
        for (i, slot) in world.slots.iter_mut().enumerate() {
            let bits = inputs.get(i).copied().unwrap_or_default();
            if world.round_state == RoundState::Fight {
                self.move_chars(slot, bits, roll);
                self.spawn(slot, i, frame);
            }
            Self::tick_projectiles(slot);
            Self::tick_explods(slot);
        }
        Self::resolve_hits(world, frame);
        Self::tick_world(world);

        let ko = world
            .slots
            .iter()
            .any(|s| s.root().is_some_and(|c| c.life <= 0));
        let time_up = self
            .config
            .match_frames
            .is_some_and(|limit| frame + 1 >= limit);
        if ko || time_up {
            world.round_state = RoundState::Over;
            return StepOutcome::MatchOver;
        }
        StepOutcome::Continue
    }
}
