//! Replay recording and playback

use std::io::{Read, Write};

use rollcade_shared::InputBits;

use super::stream::{ReplayError, ReplayReader, ReplayWriter};
use crate::sim::{Simulation, StepOutcome};
use crate::state::World;

/// Records the inputs every simulated frame was run with.
///
/// Wraps the match's [`Simulation`] and keeps the per-input-index bits handed
/// to [`World::advance`], before slot remapping, so playback through the same
/// path reproduces the match. Frames are keyed by `world.time`, so a
/// rollback that resimulates frame N replaces the recording from N onward
/// with the corrected inputs. The recording lives outside the world and is
/// never rolled back itself.
pub struct ReplayRecorder<S> {
    sim: S,
    frames: Vec<Vec<InputBits>>,
    /// `world.time` of the first recorded frame
    start: Option<i32>,
    recording: bool,
}

impl<S> ReplayRecorder<S> {
    pub fn new(sim: S) -> Self {
        Self {
            sim,
            frames: Vec::new(),
            start: None,
            recording: false,
        }
    }

    /// Start a fresh recording at the next simulated frame
    pub fn start(&mut self) {
        self.frames.clear();
        self.start = None;
        self.recording = true;
    }

    /// Stop and take the recorded frames
    pub fn stop(&mut self) -> Vec<Vec<InputBits>> {
        self.recording = false;
        self.start = None;
        std::mem::take(&mut self.frames)
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Vec<InputBits>] {
        &self.frames
    }

    /// Write the frames recorded so far as a replay stream
    pub fn write_to<W: Write>(&self, writer: W, slots: usize) -> Result<W, ReplayError> {
        let mut writer = ReplayWriter::new(writer, slots)?;
        for frame in &self.frames {
            writer.write_frame(frame)?;
        }
        writer.finish()
    }

    pub fn inner(&self) -> &S {
        &self.sim
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.sim
    }

    pub fn into_inner(self) -> S {
        self.sim
    }

    fn record(&mut self, time: i32, inputs: &[InputBits]) {
        let start = *self.start.get_or_insert(time);
        let Ok(index) = usize::try_from(time - start) else {
            return;
        };
        if index > self.frames.len() {
            tracing::warn!(frame = time, "Replay recording skipped frames");
            return;
        }
        self.frames.truncate(index);
        self.frames.push(inputs.to_vec());
    }
}

impl<S: Simulation> Simulation for ReplayRecorder<S> {
    fn observe_inputs(&mut self, world: &World, raw: &[InputBits]) {
        if self.recording {
            self.record(world.time, raw);
        }
        self.sim.observe_inputs(world, raw);
    }

    fn simulate(&mut self, world: &mut World, inputs: &[InputBits]) -> StepOutcome {
        self.sim.simulate(world, inputs)
    }
}

/// Steps through recorded frames
#[derive(Debug, Clone, Default)]
pub struct ReplayPlayer {
    frames: Vec<Vec<InputBits>>,
    current_frame: usize,
    slots: usize,
}

impl ReplayPlayer {
    pub fn new(frames: Vec<Vec<InputBits>>) -> Self {
        let slots = frames.iter().map(Vec::len).max().unwrap_or_default();
        Self {
            frames,
            current_frame: 0,
            slots,
        }
    }

    /// Load a whole replay stream
    pub fn from_reader<R: Read>(reader: R, slots: usize) -> Result<Self, ReplayError> {
        let frames = ReplayReader::new(reader, slots)?.read_all()?;
        Ok(Self {
            frames,
            current_frame: 0,
            slots,
        })
    }

    /// Inputs for the current frame, advancing past it. `None` once every
    /// recorded frame has been played.
    pub fn next_inputs(&mut self) -> Option<&[InputBits]> {
        let frame = self.frames.get(self.current_frame)?;
        self.current_frame += 1;
        Some(frame.as_slice())
    }

    /// Inputs for the current frame without advancing
    pub fn current_inputs(&self) -> Option<&[InputBits]> {
        self.frames.get(self.current_frame).map(Vec::as_slice)
    }

    pub fn is_complete(&self) -> bool {
        self.current_frame >= self.frames.len()
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Playback progress (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        if self.frames.is_empty() {
            return 0.0;
        }
        self.current_frame as f32 / self.frames.len() as f32
    }

    pub fn rewind(&mut self) {
        self.current_frame = 0;
    }

    pub fn frames(&self) -> &[Vec<InputBits>] {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollback::{FrameStatus, MatchEndReason};
    use crate::sim::{Sandbox, SandboxConfig};
    use crate::test_utils::{run, sandbox_sync_test, script};

    #[test]
    fn test_recorder_captures_inputs_in_order() {
        let mut world = Sandbox::world(9, 2);
        let mut recorder = ReplayRecorder::new(Sandbox::default());
        let inputs = script(20, 2);

        run(&mut world, &mut recorder, &inputs[..5]);
        assert_eq!(recorder.frame_count(), 0);

        recorder.start();
        run(&mut world, &mut recorder, &inputs[5..]);
        assert!(recorder.is_recording());
        assert_eq!(recorder.frames(), &inputs[5..]);

        let frames = recorder.stop();
        assert_eq!(frames.len(), 15);
        assert!(!recorder.is_recording());
        assert_eq!(recorder.frame_count(), 0);
    }

    #[test]
    fn test_resimulated_frames_replace_the_recording() {
        let (mut session, mut world, sim) = sandbox_sync_test(2, 4);
        let mut recorder = ReplayRecorder::new(sim);
        recorder.start();

        let inputs = script(40, 2);
        for frame in &inputs {
            for (handle, &bits) in frame.iter().enumerate() {
                session.add_local_input(handle, bits).unwrap();
            }
            session.advance(&mut world, &mut recorder).unwrap();
        }
        assert!(session.total_rollback_frames() > 0);
        assert_eq!(recorder.frames(), &inputs[..]);
    }

    #[test]
    fn test_player_replays_recorded_match() {
        let inputs = script(30, 2);
        let mut recorder = ReplayRecorder::new(Sandbox::default());
        let mut recorded = Sandbox::world(4, 2);
        recorder.start();
        run(&mut recorded, &mut recorder, &inputs);

        let bytes = recorder.write_to(Vec::new(), 2).unwrap();
        let mut player = ReplayPlayer::from_reader(&bytes[..], 2).unwrap();
        assert_eq!(player.frame_count(), 30);

        let mut replayed = Sandbox::world(4, 2);
        let mut sim = Sandbox::default();
        while let Some(frame) = player.next_inputs() {
            let frame = frame.to_vec();
            replayed.advance(&frame, &mut sim);
        }
        assert!(player.is_complete());
        assert_eq!(player.progress(), 1.0);
        assert_eq!(replayed, recorded);
    }

    #[test]
    fn test_replay_survives_swapped_input_remap() {
        let remapped = || {
            let mut world = Sandbox::world(5, 2);
            world.slots[0].input_remap = 1;
            world.slots[1].input_remap = 0;
            world
        };
        let inputs = script(60, 2);
        let mut recorder = ReplayRecorder::new(Sandbox::default());
        let mut recorded = remapped();
        recorder.start();
        run(&mut recorded, &mut recorder, &inputs);
        assert_eq!(recorder.frames(), &inputs[..]);

        let bytes = recorder.write_to(Vec::new(), 2).unwrap();
        let mut player = ReplayPlayer::from_reader(&bytes[..], 2).unwrap();
        let mut replayed = remapped();
        let mut sim = Sandbox::default();
        while let Some(frame) = player.next_inputs() {
            let frame = frame.to_vec();
            replayed.advance(&frame, &mut sim);
        }
        assert_eq!(replayed, recorded);
    }

    #[test]
    fn test_player_rewind() {
        let mut player = ReplayPlayer::new(vec![vec![InputBits::A], vec![InputBits::B]]);
        assert_eq!(player.slots(), 1);
        assert_eq!(player.next_inputs(), Some(&[InputBits::A][..]));
        assert_eq!(player.current_inputs(), Some(&[InputBits::B][..]));
        player.rewind();
        assert_eq!(player.current_frame(), 0);
        assert_eq!(player.progress(), 0.0);
    }

    #[test]
    fn test_recording_ends_with_match() {
        let mut session = crate::rollback::RollbackSession::new_local(1);
        let mut world = Sandbox::world(1, 1);
        let mut recorder = ReplayRecorder::new(Sandbox::new(SandboxConfig {
            match_frames: Some(3),
            ..Default::default()
        }));
        recorder.start();
        let mut status = Ok(FrameStatus::Stalled);
        while !session.is_closed() {
            status = session.advance(&mut world, &mut recorder);
        }
        assert_eq!(status, Ok(FrameStatus::Ended(MatchEndReason::MatchOver)));
        assert_eq!(recorder.frame_count(), 3);
    }
}
