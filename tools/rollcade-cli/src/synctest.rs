//! Sync-test harness

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use rollcade_core::input::AiPads;
use rollcade_core::{FrameStatus, MatchRunner, RollbackSession, Sandbox, SessionError, World};
use rollcade_shared::MAX_PLAYER_SLOTS;

/// Arguments for the synctest command
#[derive(Args)]
pub struct SynctestArgs {
    /// Frames to simulate
    #[arg(long, default_value = "600")]
    pub frames: usize,

    /// Number of players
    #[arg(long, default_value = "2")]
    pub players: usize,

    /// Seed for the world RNG and the CPU pads
    #[arg(long, default_value = "1")]
    pub seed: u64,

    /// Frames rolled back every tick (defaults to the config file)
    #[arg(long)]
    pub check_distance: Option<usize>,
}

/// Run the sync test. Exit code 1 on desync.
pub fn execute(args: SynctestArgs) -> Result<ExitCode> {
    anyhow::ensure!(
        (1..=MAX_PLAYER_SLOTS).contains(&args.players),
        "--players must be between 1 and {}",
        MAX_PLAYER_SLOTS
    );
    let config = crate::load_config()?;

    let mut session_config = config.netplay.sync_test_session(args.players);
    if let Some(distance) = args.check_distance {
        session_config = session_config.with_check_distance(distance);
    }
    let check_distance = session_config.effective_check_distance();
    let session =
        RollbackSession::new_sync_test(session_config).context("Failed to start sync test")?;

    let commands = Sandbox::commands(
        config.commands.default_time,
        config.commands.default_buffer_time,
    );
    let world = World::new(args.seed, args.players, &commands);
    let mut runner = MatchRunner::with_config(
        config.runtime.into(),
        world,
        Sandbox::default(),
        session,
        AiPads::new(args.players, args.seed),
    );

    tracing::info!(
        frames = args.frames,
        players = args.players,
        check_distance,
        "Starting sync test"
    );

    for _ in 0..args.frames {
        match runner.step() {
            Ok(FrameStatus::Advanced { .. }) | Ok(FrameStatus::Stalled) => {}
            Ok(FrameStatus::Ended(reason)) => {
                tracing::info!(?reason, "Match ended");
                break;
            }
            Err(SessionError::Desync {
                frame,
                local_checksum,
                remote_checksum,
            }) => {
                eprintln!(
                    "DESYNC at frame {}: {:#018x} != {:#018x}",
                    frame, local_checksum, remote_checksum
                );
                return Ok(ExitCode::from(1));
            }
            Err(e) => return Err(e).context("Sync test failed"),
        }
    }

    let checksum = crate::world_checksum(runner.world())?;
    println!(
        "OK: {} frames, {} rollback frames, checksum {:#018x}",
        runner.world().time,
        runner.session().total_rollback_frames(),
        checksum
    );
    Ok(ExitCode::SUCCESS)
}
