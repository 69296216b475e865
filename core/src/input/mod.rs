//! Input sources
//!
//! Devices are read through the [`DeviceSource`] trait and folded into
//! [`InputBits`](rollcade_shared::InputBits) per configured slot. CPU slots
//! use [`AiInput`] instead.

mod ai;
mod device;
#[cfg(feature = "gamepad")]
mod gamepad;

pub use ai::{AiInput, AiPads};
pub use device::{
    DeviceSource, InputPoller, KeyConfig, KeyboardState, poll_bits, poll_button,
    poll_button_with_threshold,
};
#[cfg(feature = "gamepad")]
pub use gamepad::GilrsSource;
