//! Replay recording, playback and verification
//!
//! A replay is the raw per-slot [`InputBits`](rollcade_shared::InputBits)
//! stream of a match (see [`stream`] for the byte layout). Replaying it
//! into a world built from the same seed reproduces the match exactly;
//! [`verify_replay`] does so under a sync-test session to prove it.
//!
//! ```ignore
//! let mut recorder = ReplayRecorder::new(Sandbox::default());
//! recorder.start();
//! // ... session.advance(&mut world, &mut recorder) every tick ...
//! recorder.write_to(File::create("match.rcr")?, slots)?;
//!
//! let frames = ReplayReader::new(File::open("match.rcr")?, slots)?.read_all()?;
//! let report = verify_replay(&frames, slots, seed, 8, None)?;
//! ```

mod recorder;
pub mod stream;
mod verify;

pub use recorder::{ReplayPlayer, ReplayRecorder};
pub use stream::{ReplayError, ReplayReader, ReplayWriter};
pub use verify::{ReplayDesync, VerifyReport, verify_replay, verify_with};
