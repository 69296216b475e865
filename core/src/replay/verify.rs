//! Replay verification through a sync-test session

use rollcade_shared::InputBits;

use crate::rollback::{FrameStatus, RollbackSession, SessionConfig, SessionError};
use crate::sim::{Sandbox, Simulation};
use crate::state::{GameState, World};

/// First checksum mismatch a verification run hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayDesync {
    pub frame: i32,
    pub local_checksum: u64,
    pub remote_checksum: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Frames simulated forward (resimulations not counted)
    pub frames: usize,
    pub rollback_frames: u64,
    pub final_checksum: u64,
    /// World checksum after each forward frame
    pub checksums: Vec<u64>,
    pub desync: Option<ReplayDesync>,
    /// The simulation ended the match before the replay ran out
    pub match_ended: bool,
}

impl VerifyReport {
    pub fn passed(&self) -> bool {
        self.desync.is_none()
    }
}

/// Run `frames` through a sandbox sync test seeded with `seed`.
///
/// Every frame is rolled back `check_distance` frames and resimulated. A
/// mismatch lands in [`VerifyReport::desync`]; only session setup or
/// snapshot failures are errors.
pub fn verify_replay(
    frames: &[Vec<InputBits>],
    slots: usize,
    seed: u64,
    check_distance: usize,
    frames_to_run: Option<usize>,
) -> Result<VerifyReport, SessionError> {
    let mut world = Sandbox::world(seed, slots);
    verify_with(
        &mut world,
        &mut Sandbox::default(),
        frames,
        check_distance,
        frames_to_run,
    )
}

/// [`verify_replay`] over an arbitrary world and simulation
pub fn verify_with<S: Simulation + ?Sized>(
    world: &mut World,
    sim: &mut S,
    frames: &[Vec<InputBits>],
    check_distance: usize,
    frames_to_run: Option<usize>,
) -> Result<VerifyReport, SessionError> {
    let slots = world.slots.len();
    let config = SessionConfig::sync_test(slots).with_check_distance(check_distance);
    let mut session = RollbackSession::new_sync_test(config)?;
    let limit = frames_to_run.map_or(frames.len(), |n| n.min(frames.len()));

    let mut report = VerifyReport::default();
    let mut scratch = GameState::new();

    for inputs in &frames[..limit] {
        for handle in 0..slots {
            let bits = inputs.get(handle).copied().unwrap_or_default();
            session.add_local_input(handle, bits)?;
        }
        match session.advance(world, sim) {
            Ok(FrameStatus::Advanced { .. }) => {}
            Ok(FrameStatus::Stalled) => continue,
            Ok(FrameStatus::Ended(_)) => report.match_ended = true,
            Err(SessionError::Desync {
                frame,
                local_checksum,
                remote_checksum,
            }) => {
                report.desync = Some(ReplayDesync {
                    frame,
                    local_checksum,
                    remote_checksum,
                });
                break;
            }
            Err(e) => return Err(e),
        }

        scratch.save_state(world);
        let checksum = scratch.checksum()?;
        report.checksums.push(checksum);
        report.frames += 1;
        report.final_checksum = checksum;
        if report.match_ended {
            break;
        }
    }

    report.rollback_frames = session.total_rollback_frames();
    if let Some(desync) = &report.desync {
        tracing::error!(frame = desync.frame, "Replay failed verification");
    } else {
        tracing::info!(
            frames = report.frames,
            rollbacks = report.rollback_frames,
            checksum = %format!("{:#x}", report.final_checksum),
            "Replay verified"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::StepOutcome;
    use crate::test_utils::{run, script};

    #[test]
    fn test_verified_checksums_match_plain_run() {
        let inputs = script(60, 2);
        let report = verify_replay(&inputs, 2, 11, 4, None).unwrap();
        assert!(report.passed());
        assert_eq!(report.frames, 60);
        assert_eq!(report.checksums.len(), 60);
        assert!(report.rollback_frames > 0);

        // the same inputs without rollback land on the same state
        let mut world = Sandbox::world(11, 2);
        run(&mut world, &mut Sandbox::default(), &inputs);
        let mut state = GameState::new();
        state.save_state(&world);
        assert_eq!(state.checksum().unwrap(), report.final_checksum);
    }

    #[test]
    fn test_repeated_runs_agree() {
        let inputs = script(45, 2);
        let a = verify_replay(&inputs, 2, 5, 2, None).unwrap();
        let b = verify_replay(&inputs, 2, 5, 7, None).unwrap();
        assert_eq!(a.checksums, b.checksums);
    }

    #[test]
    fn test_frames_to_run_limits_the_run() {
        let inputs = script(30, 2);
        let report = verify_replay(&inputs, 2, 1, 2, Some(10)).unwrap();
        assert_eq!(report.frames, 10);
        let report = verify_replay(&inputs, 2, 1, 2, Some(500)).unwrap();
        assert_eq!(report.frames, 30);
    }

    #[test]
    fn test_nondeterminism_is_reported_not_raised() {
        struct Drifting(f32);
        impl Simulation for Drifting {
            fn simulate(&mut self, world: &mut World, _inputs: &[InputBits]) -> StepOutcome {
                self.0 += 1.0;
                world.stage.left_bound = self.0;
                StepOutcome::Continue
            }
        }

        let mut world = Sandbox::world(1, 1);
        let report =
            verify_with(&mut world, &mut Drifting(0.0), &script(30, 1), 2, None).unwrap();
        assert!(!report.passed());
        assert!(report.frames < 30);
    }
}
