//! Live simulation context

use rollcade_shared::{InputBits, MAX_PLAYER_SLOTS};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::model::{
    BytecodeStack, BytecodeValue, Camera, CharState, EnvColor, EnvShake, ExplodState,
    GlobalSpecialFlag, PalFx, PauseState, ProjectileState, StageState, SuperPauseState,
};
use super::rng::SimRng;
use crate::command::{CommandList, StepContext};
use crate::input::AiInput;
use crate::sim::{Simulation, StepOutcome};

/// Inputs for every slot of one frame, after remapping and AI substitution
pub type FrameInputs = SmallVec<[InputBits; MAX_PLAYER_SLOTS]>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundState {
    #[default]
    Start,
    Intro,
    Fight,
    Ko,
    Over,
}

/// Everything one player slot owns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotState {
    /// Index 0 is the root character; helpers follow
    pub chars: Vec<CharState>,
    pub projectiles: Vec<ProjectileState>,
    pub explods: Vec<ExplodState>,
    /// Draw order as indices into `explods`
    pub expl_drawlist: Vec<usize>,
    pub top_expl_drawlist: Vec<usize>,
    pub under_expl_drawlist: Vec<usize>,
    pub ai_input: AiInput,
    /// Index of the input this slot reads
    pub input_remap: usize,
    pub autoguard: bool,
    /// CPU difficulty; zero for a human slot
    pub ai_level: f32,
}

impl SlotState {
    /// A slot with one root character
    pub fn with_root(slot: usize, commands: CommandList) -> Self {
        Self {
            chars: vec![CharState::root(slot as i32 + 1, slot, commands)],
            input_remap: slot,
            ..Default::default()
        }
    }

    pub fn is_cpu(&self) -> bool {
        self.ai_level > 0.0
    }

    pub fn root(&self) -> Option<&CharState> {
        self.chars.first()
    }

    pub fn root_mut(&mut self) -> Option<&mut CharState> {
        self.chars.first_mut()
    }
}

/// The whole mutable match state, passed explicitly to every operation.
///
/// Everything except `match_over` is snapshotted by
/// [`GameState`](super::GameState).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct World {
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

    #[serde(skip)]
    pub match_over: bool,
}

impl World {
    /// A world of `slots` slots, each with one root character reading
    /// `commands`.
    pub fn new(seed: u64, slots: usize, commands: &CommandList) -> Self {
        Self {
            rng: SimRng::new(seed),
            slots: (0..slots)
                .map(|i| SlotState::with_root(i, commands.clone()))
                .collect(),
            cam: Camera {
                scale: 1.0,
                zoom: 1.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Command buffer time granted this frame by an ending pause
    fn extra_buffer_time(&self) -> i32 {
        if self.super_pause.super_time > 0 {
            self.super_pause.end_cmd_buf_time
        } else if self.pause.pause_time > 0 {
            self.pause.end_cmd_buf_time
        } else {
            0
        }
    }

    /// Per-slot inputs for this frame. CPU slots roll their AI pad.
    pub fn resolve_inputs(&mut self, inputs: &[InputBits]) -> FrameInputs {
        let intro = self.round_state == RoundState::Intro;
        let rng = &mut self.rng;
        self.slots
            .iter_mut()
            .map(|slot| {
                if slot.is_cpu() {
                    slot.ai_input.update(rng, intro);
                    slot.ai_input.to_bits()
                } else {
                    inputs.get(slot.input_remap).copied().unwrap_or_default()
                }
            })
            .collect()
    }

    /// Run one frame: resolve inputs, feed and step every character's
    /// commands, then the simulation.
    pub fn advance<S: Simulation + ?Sized>(
        &mut self,
        inputs: &[InputBits],
        sim: &mut S,
    ) -> StepOutcome {
        sim.observe_inputs(self, inputs);
        let resolved = self.resolve_inputs(inputs);
        let extra_buffer_time = self.extra_buffer_time();

        for (slot, &bits) in self.slots.iter_mut().zip(resolved.iter()) {
            let ai = slot.is_cpu();
            // helpers read the pad the way their root faces
            let facing = slot.root().map_or(1, CharState::facing_sign);
            for ch in slot.chars.iter_mut() {
                ch.input_flag = bits;
                ch.commands.input(bits, facing);
                let mut ctx = StepContext {
                    ai,
                    hitpause: ch.hit_pause_time > 0,
                    extra_buffer_time,
                    rng: &mut self.rng,
                };
                ch.commands.step(&mut ctx);
            }
        }

        let outcome = sim.simulate(self, &resolved);
        self.time += 1;
        self.game_time += 1;
        if outcome == StepOutcome::MatchOver {
            self.match_over = true;
        }
        outcome
    }

    pub fn char_count(&self) -> usize {
        self.slots.iter().map(|s| s.chars.len()).sum()
    }

    pub fn projectile_count(&self) -> usize {
        self.slots.iter().map(|s| s.projectiles.len()).sum()
    }
}
