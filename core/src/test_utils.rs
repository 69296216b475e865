//! Shared helpers for unit tests

use rollcade_shared::InputBits;

use crate::rollback::{RollbackSession, SessionConfig};
use crate::sim::{Sandbox, Simulation};
use crate::state::{
    AnimationState, BytecodeValue, ExplodState, GlobalSpecialFlag, ProjectileState, RoundState,
    World,
};

/// Quarter-circle forward then `a`, as pressed facing right
pub const FIREBALL: [InputBits; 4] = [
    InputBits::DOWN,
    InputBits::DOWN.union(InputBits::RIGHT),
    InputBits::RIGHT,
    InputBits::A,
];

/// Deterministic pseudo-random input script for `players` slots
pub fn script(frames: usize, players: usize) -> Vec<Vec<InputBits>> {
    let mut x: u32 = 0x9e37_79b9;
    (0..frames)
        .map(|_| {
            (0..players)
                .map(|_| {
                    x ^= x << 13;
                    x ^= x >> 17;
                    x ^= x << 5;
                    InputBits::from_raw((x & 0x7ff) as i32)
                })
                .collect()
        })
        .collect()
}

/// Advance `world` over every frame of `frames`
pub fn run<S: Simulation>(world: &mut World, sim: &mut S, frames: &[Vec<InputBits>]) {
    for inputs in frames {
        world.advance(inputs, sim);
    }
}

/// A two-slot sandbox world with every snapshotted field away from its
/// default, including helpers, projectiles and explods.
pub fn populated_world() -> World {
    let mut world = Sandbox::world(42, 2);
    let mut sim = Sandbox::default();
    run(&mut world, &mut sim, &script(30, 2));

    world.round_state = RoundState::Fight;
    world.cam.bound_left = -320.0;
    world.cam.bound_right = 320.0;
    world.all_pal_fx.time = 12;
    world.all_pal_fx.add = [10, 20, 30];
    world.bg_pal_fx.mul = [256, 128, 64];
    world.pause.pause = 1;
    world.pause.pause_time = 5;
    world.pause.end_cmd_buf_time = 2;
    world.super_pause.super_ = 1;
    world.super_pause.super_time = 30;
    world.super_pause.anim = Some(AnimationState::new(100, 30));
    world.super_pause.p2_def_mul = 1.5;
    world.env_shake.time = 4;
    world.env_shake.ampl = 3.0;
    world.special_flag = GlobalSpecialFlag::NO_BAR_DISPLAY | GlobalSpecialFlag::TIMER_FREEZE;
    world.env_color.rgb = [255, 0, 0];
    world.env_color.time = 8;
    world.bc_stack.push(BytecodeValue::int(7));
    world.bc_var_stack.push(BytecodeValue::float(0.5));
    world.bc_var = vec![BytecodeValue::bool(true); 3];
    world.stage.left_bound = -400.0;
    world.stage.right_bound = 400.0;
    world.stage.shadow.intensity = 128;
    world.stage.camera.tension = 50;

    let slot = &mut world.slots[0];
    let mut helper = slot.chars[0].clone();
    helper.id = 900;
    helper.helper_id = 1;
    helper.parent_index = 0;
    slot.chars.push(helper);
    slot.projectiles.push(ProjectileState {
        id: 901,
        anim: 1000,
        pos: [10.0, -40.0],
        velocity: [5.0, 0.0],
        remove_time: 60,
        hits: 1,
        ..Default::default()
    });
    slot.explods.push(ExplodState {
        id: 902,
        anim: AnimationState::new(5000, 20),
        remove_time: 20,
        on_top: true,
        ..Default::default()
    });
    slot.expl_drawlist = vec![0];
    slot.top_expl_drawlist = vec![0];
    slot.autoguard = true;
    world.slots[1].ai_level = 3.0;
    world.slots[1].input_remap = 1;
    world
}

/// A sync-test session over a fresh sandbox world
pub fn sandbox_sync_test(
    players: usize,
    check_distance: usize,
) -> (RollbackSession, World, Sandbox) {
    let config = SessionConfig::sync_test(players).with_check_distance(check_distance);
    let session = RollbackSession::new_sync_test(config).expect("sync test session should start");
    (session, Sandbox::world(3, players), Sandbox::default())
}
