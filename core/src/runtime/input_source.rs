//! Per-tick input sources

use rollcade_shared::InputBits;

use crate::input::{AiPads, DeviceSource, InputPoller};
use crate::replay::ReplayPlayer;

/// Supplies one frame of inputs, indexed by player handle
pub trait InputSource {
    fn frame_inputs(&mut self, players: usize) -> Vec<InputBits>;
}

impl<S: DeviceSource> InputSource for InputPoller<S> {
    fn frame_inputs(&mut self, players: usize) -> Vec<InputBits> {
        (0..players).map(|i| self.poll(i)).collect()
    }
}

impl InputSource for AiPads {
    fn frame_inputs(&mut self, players: usize) -> Vec<InputBits> {
        let mut frame = self.next_frame();
        frame.resize(players, InputBits::empty());
        frame
    }
}

/// Plays recorded frames, then no input once the replay runs out
impl InputSource for ReplayPlayer {
    fn frame_inputs(&mut self, players: usize) -> Vec<InputBits> {
        let mut frame = self.next_inputs().map(<[_]>::to_vec).unwrap_or_default();
        frame.resize(players, InputBits::empty());
        frame
    }
}

/// Idle pads
impl InputSource for () {
    fn frame_inputs(&mut self, players: usize) -> Vec<InputBits> {
        vec![InputBits::empty(); players]
    }
}
