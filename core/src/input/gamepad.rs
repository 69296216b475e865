//! Gamepad devices through gilrs

use gilrs::{Axis, Button, GamepadId, Gilrs};

use super::device::{DeviceSource, KeyboardState};

/// Raw button index to gilrs button
const BUTTONS: [Button; 16] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadRight,
    Button::DPadDown,
    Button::DPadLeft,
    Button::LeftTrigger2,
    Button::RightTrigger2,
];

/// Raw axis index to gilrs axis. Y axes are reported down-positive.
const AXES: [Axis; 6] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::RightStickX,
    Axis::RightStickY,
    Axis::LeftZ,
    Axis::RightZ,
];

/// Keyboard plus every connected gamepad, indexed in connection order.
pub struct GilrsSource {
    /// None if initialization failed
    gilrs: Option<Gilrs>,
    pads: Vec<GamepadId>,
    keyboard: KeyboardState,
}

impl GilrsSource {
    pub fn new() -> Self {
        let gilrs = match Gilrs::new() {
            Ok(g) => Some(g),
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize gamepad support: {}. Gamepads will not be available.",
                    e
                );
                None
            }
        };
        let pads = gilrs
            .as_ref()
            .map(|g| g.gamepads().map(|(id, _)| id).collect())
            .unwrap_or_default();
        Self {
            gilrs,
            pads,
            keyboard: KeyboardState::new(),
        }
    }

    pub fn keyboard_mut(&mut self) -> &mut KeyboardState {
        &mut self.keyboard
    }

    /// Drain gilrs events, tracking connects and disconnects
    pub fn update(&mut self) {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return;
        };
        while let Some(event) = gilrs.next_event() {
            match event.event {
                gilrs::EventType::Connected => {
                    if !self.pads.contains(&event.id) {
                        tracing::info!("Gamepad {} connected as joystick {}", event.id, self.pads.len());
                        self.pads.push(event.id);
                    }
                }
                gilrs::EventType::Disconnected => {
                    if let Some(pos) = self.pads.iter().position(|&id| id == event.id) {
                        tracing::info!("Gamepad {} (joystick {}) disconnected", event.id, pos);
                        self.pads.remove(pos);
                    }
                }
                _ => {}
            }
        }
    }

    fn pad(&self, joy: usize) -> Option<gilrs::Gamepad<'_>> {
        let gilrs = self.gilrs.as_ref()?;
        let id = *self.pads.get(joy)?;
        gilrs.connected_gamepad(id)
    }
}

impl Default for GilrsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceSource for GilrsSource {
    fn key_pressed(&self, code: i32) -> bool {
        self.keyboard.is_pressed(code)
    }

    fn joystick_count(&self) -> usize {
        self.pads.len()
    }

    fn button(&self, joy: usize, index: usize) -> Option<bool> {
        let button = *BUTTONS.get(index)?;
        Some(self.pad(joy)?.is_pressed(button))
    }

    fn axis(&self, joy: usize, index: usize) -> Option<f32> {
        let axis = *AXES.get(index)?;
        let value = self.pad(joy)?.value(axis);
        // gilrs reports stick Y up-positive
        Some(match axis {
            Axis::LeftStickY | Axis::RightStickY => -value,
            _ => value,
        })
    }
}
