//! Device polling into `InputBits`

use hashbrown::HashMap;
use rollcade_shared::{AXIS_THRESHOLD, InputBits, MAX_JOYSTICKS};
use serde::{Deserialize, Serialize};

/// Raw device access used by [`poll_button`].
///
/// Out-of-range indices report `None`; a missing device never errors.
pub trait DeviceSource {
    fn key_pressed(&self, code: i32) -> bool;

    fn joystick_count(&self) -> usize;

    fn button(&self, joy: usize, index: usize) -> Option<bool>;

    fn axis(&self, joy: usize, index: usize) -> Option<f32>;
}

/// Device codes for one input slot.
///
/// With `joy < 0` every code is a keyboard key code (GLFW numbering).
/// Otherwise `joy` selects a joystick and each code is a button index, or
/// `-(n) - 1` for axis `n / 2`: even `n` reads the negative half of the axis,
/// odd `n` the positive half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyConfig {
    pub joy: i32,
    pub up: i32,
    pub down: i32,
    pub left: i32,
    pub right: i32,
    pub a: i32,
    pub b: i32,
    pub c: i32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub start: i32,
}

impl Default for KeyConfig {
    /// Arrow keys, `Z X C` / `A S D`, Enter
    fn default() -> Self {
        Self {
            joy: -1,
            up: 265,
            down: 264,
            left: 263,
            right: 262,
            a: 90,
            b: 88,
            c: 67,
            x: 65,
            y: 83,
            z: 68,
            start: 257,
        }
    }
}

impl KeyConfig {
    /// First joystick: d-pad on the left stick, face buttons 0-5, start 7
    pub fn joystick(joy: i32) -> Self {
        Self {
            joy,
            up: -3,
            down: -4,
            left: -1,
            right: -2,
            a: 0,
            b: 1,
            c: 4,
            x: 2,
            y: 3,
            z: 5,
            start: 7,
        }
    }
}

/// Read one configured switch.
pub fn poll_button<S: DeviceSource + ?Sized>(src: &S, joy: i32, code: i32) -> bool {
    poll_button_with_threshold(src, joy, code, AXIS_THRESHOLD)
}

pub fn poll_button_with_threshold<S: DeviceSource + ?Sized>(
    src: &S,
    joy: i32,
    code: i32,
    threshold: f32,
) -> bool {
    if joy < 0 {
        return src.key_pressed(code);
    }
    let joy = joy as usize;
    if joy >= MAX_JOYSTICKS || joy >= src.joystick_count() {
        return false;
    }
    if code < 0 {
        let n = (-(i64::from(code)) - 1) as usize;
        return match src.axis(joy, n / 2) {
            Some(v) if n % 2 == 0 => v < -threshold,
            Some(v) => v > threshold,
            None => false,
        };
    }
    src.button(joy, code as usize).unwrap_or(false)
}

/// Build the eleven switches of `cfg` into input bits.
pub fn poll_bits<S: DeviceSource + ?Sized>(src: &S, cfg: &KeyConfig, threshold: f32) -> InputBits {
    let read = |code: i32| poll_button_with_threshold(src, cfg.joy, code, threshold);
    InputBits::from_switches(
        read(cfg.up),
        read(cfg.down),
        read(cfg.left),
        read(cfg.right),
        read(cfg.a),
        read(cfg.b),
        read(cfg.c),
        read(cfg.x),
        read(cfg.y),
        read(cfg.z),
        read(cfg.start),
    )
}

/// Keyboard state fed from window events.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    keys: HashMap<i32, bool>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, code: i32, pressed: bool) {
        self.keys.insert(code, pressed);
    }

    pub fn is_pressed(&self, code: i32) -> bool {
        self.keys.get(&code).copied().unwrap_or(false)
    }

    pub fn release_all(&mut self) {
        self.keys.clear();
    }
}

impl DeviceSource for KeyboardState {
    fn key_pressed(&self, code: i32) -> bool {
        self.is_pressed(code)
    }

    fn joystick_count(&self) -> usize {
        0
    }

    fn button(&self, _joy: usize, _index: usize) -> Option<bool> {
        None
    }

    fn axis(&self, _joy: usize, _index: usize) -> Option<f32> {
        None
    }
}

/// Polls configured input slots from a device source
pub struct InputPoller<S> {
    source: S,
    configs: Vec<KeyConfig>,
    axis_threshold: f32,
}

impl<S: DeviceSource> InputPoller<S> {
    pub fn new(source: S, configs: Vec<KeyConfig>) -> Self {
        Self {
            source,
            configs,
            axis_threshold: AXIS_THRESHOLD,
        }
    }

    pub fn with_axis_threshold(mut self, threshold: f32) -> Self {
        self.axis_threshold = threshold;
        self
    }

    /// Input bits for configured slot `index`; empty when unconfigured
    pub fn poll(&self, index: usize) -> InputBits {
        match self.configs.get(index) {
            Some(cfg) => poll_bits(&self.source, cfg, self.axis_threshold),
            None => InputBits::empty(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn configs(&self) -> &[KeyConfig] {
        &self.configs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One joystick with 4 buttons and 2 axes, plus a keyboard
    #[derive(Default)]
    struct FakeDevices {
        keyboard: KeyboardState,
        buttons: [bool; 4],
        axes: [f32; 2],
    }

    impl DeviceSource for FakeDevices {
        fn key_pressed(&self, code: i32) -> bool {
            self.keyboard.is_pressed(code)
        }

        fn joystick_count(&self) -> usize {
            1
        }

        fn button(&self, joy: usize, index: usize) -> Option<bool> {
            (joy == 0).then(|| self.buttons.get(index).copied()).flatten()
        }

        fn axis(&self, joy: usize, index: usize) -> Option<f32> {
            (joy == 0).then(|| self.axes.get(index).copied()).flatten()
        }
    }

    #[test]
    fn test_keyboard_codes() {
        let mut dev = FakeDevices::default();
        dev.keyboard.set(90, true);
        assert!(poll_button(&dev, -1, 90));
        assert!(!poll_button(&dev, -1, 88));
        dev.keyboard.set(90, false);
        assert!(!poll_button(&dev, -1, 90));
    }

    #[test]
    fn test_axis_encoding() {
        let mut dev = FakeDevices::default();
        dev.axes = [-0.5, 0.05];
        // -1 => axis 0 negative, -2 => axis 0 positive
        assert!(poll_button(&dev, 0, -1));
        assert!(!poll_button(&dev, 0, -2));
        // axis 1 is inside the dead zone both ways
        assert!(!poll_button(&dev, 0, -3));
        assert!(!poll_button(&dev, 0, -4));
        dev.axes[1] = 0.2;
        assert!(poll_button(&dev, 0, -4));
    }

    #[test]
    fn test_out_of_range_is_false() {
        let mut dev = FakeDevices::default();
        dev.buttons = [true; 4];
        assert!(poll_button(&dev, 0, 3));
        assert!(!poll_button(&dev, 0, 4));
        assert!(!poll_button(&dev, 0, -5));
        assert!(!poll_button(&dev, 1, 0));
        assert!(!poll_button(&dev, MAX_JOYSTICKS as i32, 0));
        assert!(!poll_button(&dev, 0, i32::MIN));
    }

    #[test]
    fn test_poller_builds_bits() {
        let mut dev = FakeDevices::default();
        dev.axes = [0.9, -0.9];
        dev.buttons[0] = true;
        let poller = InputPoller::new(dev, vec![KeyConfig::joystick(0)]);
        assert_eq!(
            poller.poll(0),
            InputBits::RIGHT | InputBits::UP | InputBits::A
        );
        assert_eq!(poller.poll(5), InputBits::empty());
    }

    #[test]
    fn test_default_keyboard_config() {
        let mut kb = KeyboardState::new();
        let cfg = KeyConfig::default();
        kb.set(cfg.left, true);
        kb.set(cfg.start, true);
        assert_eq!(
            poll_bits(&kb, &cfg, AXIS_THRESHOLD),
            InputBits::LEFT | InputBits::START
        );
        kb.release_all();
        assert_eq!(poll_bits(&kb, &cfg, AXIS_THRESHOLD), InputBits::empty());
    }
}
