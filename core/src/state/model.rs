//! Plain-data pieces of the simulation state
//!
//! Every type here is owned by value inside [`World`](super::World) and
//! copied by value into snapshots. Cross references (parent, bind target,
//! draw order) are slot-local indices or ids, never pointers.

use rollcade_shared::InputBits;
use serde::{Deserialize, Serialize};

use crate::command::CommandList;

/// Number of integer variables per character
pub const NUM_IVAR: usize = 60;
/// Number of float variables per character
pub const NUM_FVAR: usize = 40;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    pub anim_no: i32,
    /// Frame index within the action
    pub current: i32,
    pub draw_index: i32,
    /// Ticks spent in the current frame
    pub time: i32,
    pub sum_time: i32,
    pub total_time: i32,
    pub loop_time: i32,
    pub loop_start: i32,
    pub new_frame: bool,
    pub loop_end: bool,
    pub scale: [f32; 2],
    pub angle: f32,
    pub src_alpha: i16,
    pub dst_alpha: i16,
}

impl AnimationState {
    pub fn new(anim_no: i32, total_time: i32) -> Self {
        Self {
            anim_no,
            total_time,
            scale: [1.0, 1.0],
            src_alpha: 255,
            ..Default::default()
        }
    }

    /// Advance one tick over frames of `frame_len` ticks each, looping
    /// after `total_time`.
    pub fn tick(&mut self, frame_len: i32) {
        let frame_len = frame_len.max(1);
        self.time += 1;
        self.sum_time += 1;
        self.new_frame = false;
        if self.time >= frame_len {
            self.time = 0;
            self.current += 1;
            self.new_frame = true;
        }
        self.loop_end = self.total_time > 0 && self.sum_time >= self.total_time;
        if self.loop_end {
            self.sum_time = self.loop_time;
            self.current = self.loop_start;
        }
    }
}

/// One fighter or helper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharState {
    pub id: i32,
    /// Helper id, 0 for a root character
    pub helper_id: i32,
    /// Index of the parent within the same slot, -1 for a root character
    pub parent_index: i32,
    pub player_no: usize,
    pub team_side: i32,

    pub life: i32,
    pub life_max: i32,
    pub red_life: i32,
    pub power: i32,
    pub power_max: i32,
    pub guard_points: i32,
    pub guard_points_max: i32,
    pub dizzy_points: i32,
    pub dizzy_points_max: i32,

    pub pos: [f32; 3],
    pub old_pos: [f32; 3],
    pub vel: [f32; 3],
    pub facing: f32,

    pub anim: AnimationState,
    pub state_no: i32,
    pub prev_state_no: i32,
    pub state_time: i32,
    pub ctrl: bool,
    pub juggle: i32,
    pub hit_pause_time: i32,

    pub ivar: Vec<i32>,
    pub fvar: Vec<f32>,
    pub targets: Vec<i32>,

    pub commands: CommandList,
    pub input_flag: InputBits,
}

impl CharState {
    /// A root character for `player_no` with full meters.
    pub fn root(id: i32, player_no: usize, commands: CommandList) -> Self {
        let side = (player_no % 2) as i32;
        Self {
            id,
            parent_index: -1,
            player_no,
            team_side: side + 1,
            life: 1000,
            life_max: 1000,
            red_life: 1000,
            power_max: 3000,
            guard_points: 1000,
            guard_points_max: 1000,
            dizzy_points: 1000,
            dizzy_points_max: 1000,
            pos: [if side == 0 { -70.0 } else { 70.0 }, 0.0, 0.0],
            facing: if side == 0 { 1.0 } else { -1.0 },
            anim: AnimationState::new(0, 60),
            ctrl: true,
            ivar: vec![0; NUM_IVAR],
            fvar: vec![0.0; NUM_FVAR],
            commands,
            ..Default::default()
        }
    }

    /// Facing as the sign expected by the command buffer
    pub fn facing_sign(&self) -> i32 {
        if self.facing < 0.0 { -1 } else { 1 }
    }

    pub fn is_helper(&self) -> bool {
        self.parent_index >= 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectileState {
    pub id: i32,
    pub anim: i32,
    pub hit_anim: i32,
    pub rem_anim: i32,
    pub cancel_anim: i32,
    pub pos: [f32; 2],
    pub velocity: [f32; 2],
    pub accel: [f32; 2],
    pub facing: f32,
    pub remove: bool,
    /// Frames left before removal, -1 for none
    pub remove_time: i32,
    pub hits: i32,
    pub priority: i32,
    pub sprite_priority: i32,
    pub hit_pause: i32,
    pub time: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplodState {
    pub id: i32,
    pub anim: AnimationState,
    pub player_id: i32,
    pub bind_id: i32,
    pub bind_time: i32,
    pub time: i32,
    pub remove_time: i32,
    pub remove_on_get_hit: bool,
    pub pos: [f32; 2],
    pub velocity: [f32; 2],
    pub accel: [f32; 2],
    pub scale: [f32; 2],
    pub facing: f32,
    pub sprite_priority: i32,
    pub on_top: bool,
    pub under: bool,
    pub ignore_hit_pause: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub pos: [f32; 2],
    pub scale: f32,
    pub zoom: f32,
    pub bound_left: f32,
    pub bound_right: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PalFx {
    pub time: i32,
    pub add: [i32; 3],
    pub mul: [i32; 3],
    pub color: f32,
    pub invert_all: bool,
    pub sin_add: [i32; 4],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PauseState {
    pub pause: i32,
    pub pause_time: i32,
    pub pause_bg: bool,
    /// Command buffer time granted when the pause ends
    pub end_cmd_buf_time: i32,
    pub player: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuperPauseState {
    pub super_: i32,
    pub super_time: i32,
    pub pause_bg: bool,
    pub end_cmd_buf_time: i32,
    pub player: usize,
    pub darken: bool,
    pub anim: Option<AnimationState>,
    pub pal_fx: PalFx,
    pub pos: [f32; 2],
    pub facing: f32,
    pub p2_def_mul: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvShake {
    pub time: i32,
    pub freq: f32,
    pub ampl: f32,
    pub phase: f32,
    pub mul: f32,
}

impl EnvShake {
    pub fn tick(&mut self) {
        if self.time > 0 {
            self.time -= 1;
            self.phase += self.freq;
            self.ampl *= self.mul;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvColor {
    pub rgb: [i32; 3],
    pub time: i32,
    pub under: bool,
}

bitflags::bitflags! {
    /// Match-wide switches set by character controllers
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct GlobalSpecialFlag: u32 {
        const INTRO = 1 << 0;
        const ROUND_NOT_OVER = 1 << 1;
        const NO_BAR_DISPLAY = 1 << 2;
        const NO_BG = 1 << 3;
        const NO_FG = 1 << 4;
        const NO_KO_SND = 1 << 5;
        const NO_KO_SLOW = 1 << 6;
        const NO_MUSIC = 1 << 7;
        const GLOBAL_NO_SHADOW = 1 << 8;
        const TIMER_FREEZE = 1 << 9;
        const NO_BAR_DISPLAY_ALL = 1 << 10;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    #[default]
    None,
    Int,
    Float,
    Bool,
}

/// One slot of the expression evaluator's stacks
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BytecodeValue {
    pub vtype: ValueType,
    pub value: f64,
}

impl BytecodeValue {
    pub fn int(v: i32) -> Self {
        Self {
            vtype: ValueType::Int,
            value: f64::from(v),
        }
    }

    pub fn float(v: f32) -> Self {
        Self {
            vtype: ValueType::Float,
            value: f64::from(v),
        }
    }

    pub fn bool(v: bool) -> Self {
        Self {
            vtype: ValueType::Bool,
            value: if v { 1.0 } else { 0.0 },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BytecodeStack(pub Vec<BytecodeValue>);

impl BytecodeStack {
    pub fn push(&mut self, v: BytecodeValue) {
        self.0.push(v);
    }

    pub fn pop(&mut self) -> Option<BytecodeValue> {
        self.0.pop()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageShadow {
    pub intensity: i32,
    pub color: u32,
    pub y_scale: f32,
    pub fade_range: [i32; 2],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageCamera {
    pub start_x: i32,
    pub bound_left: i32,
    pub bound_right: i32,
    pub bound_high: i32,
    pub bound_low: i32,
    pub vertical_follow: f32,
    pub tension: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageState {
    /// Start positions for the two sides
    pub player_start: [[f32; 2]; 2],
    pub shadow: StageShadow,
    pub left_bound: f32,
    pub right_bound: f32,
    pub screen_left: i32,
    pub screen_right: i32,
    pub camera: StageCamera,
    pub z_offset_link: i32,
    pub scale: [f32; 2],
    pub reflection: i32,
}
