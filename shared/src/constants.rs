//! Centralized constants for slot layout and timing.

/// Maximum simultaneous fighters per team.
pub const MAX_SIMUL: usize = 4;

/// Extra slots for attached characters (stage-owned helpers, tag partners).
pub const MAX_ATTACHED_CHAR: usize = 2;

/// Total player slots tracked by the simulation.
///
/// Each slot owns its own character, projectile and explod arrays.
pub const MAX_PLAYER_SLOTS: usize = MAX_SIMUL * 2 + MAX_ATTACHED_CHAR;

/// Default simulation rate in frames per second.
pub const DEFAULT_FPS: u32 = 60;

/// Axis magnitude beyond which an analog axis reads as a digital direction.
pub const AXIS_THRESHOLD: f32 = 0.1;

/// Number of joystick devices that can be addressed by a `KeyConfig`.
pub const MAX_JOYSTICKS: usize = 16;
