//! Two-process P2P sandbox match
//!
//! Run one process per player, each naming the other as `--peer`:
//!
//! ```bash
//! rollcade netplay --bind 127.0.0.1:7000 --peer 127.0.0.1:7001 --local-handle 0
//! rollcade netplay --bind 127.0.0.1:7001 --peer 127.0.0.1:7000 --local-handle 1
//! ```

use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use rollcade_core::input::AiPads;
use rollcade_core::{
    LocalSocket, MatchEndReason, MatchRunner, PlayerType, RollbackSession, Sandbox, SessionError,
    SessionEvent,
};

/// Arguments for the netplay command
#[derive(Args)]
pub struct NetplayArgs {
    /// Local address to bind, e.g. 0.0.0.0:7000
    #[arg(long)]
    pub bind: String,

    /// The other player's address
    #[arg(long)]
    pub peer: String,

    /// This process's player handle (0 or 1)
    #[arg(long, default_value = "0")]
    pub local_handle: usize,

    /// Stop after this many frames
    #[arg(long, default_value = "1800")]
    pub frames: i32,

    /// World seed; both peers must agree
    #[arg(long, default_value = "1")]
    pub seed: u64,

    /// Seconds to wait for the peer before giving up
    #[arg(long, default_value = "30")]
    pub timeout: u64,
}

pub fn execute(args: NetplayArgs) -> Result<ExitCode> {
    anyhow::ensure!(args.local_handle < 2, "--local-handle must be 0 or 1");
    let config = crate::load_config()?;

    let socket = LocalSocket::bind(&args.bind)
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    let remote = 1 - args.local_handle;
    let mut players = vec![
        (args.local_handle, PlayerType::Local),
        (remote, PlayerType::Remote(args.peer.clone())),
    ];
    players.sort_by_key(|(handle, _)| *handle);

    let session = RollbackSession::new_p2p(config.netplay.online_session(2), socket, players)
        .context("Failed to start P2P session")?;
    let mut runner = MatchRunner::with_config(
        config.runtime.into(),
        Sandbox::world(args.seed, 2),
        Sandbox::default(),
        session,
        // each side drives its own pad differently
        AiPads::new(2, args.seed.wrapping_add(args.local_handle as u64 + 1)),
    );

    println!("Waiting for {} ...", args.peer);
    let deadline = Instant::now() + Duration::from_secs(args.timeout);
    let mut status = String::new();

    loop {
        let report = match runner.frame() {
            Ok(report) => report,
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
            Err(e) => return Err(e).context("Netplay session failed"),
        };

        for event in runner.take_events() {
            match event {
                SessionEvent::DisconnectedFromPeer { notice } => println!("{}", notice.message),
                SessionEvent::Desync { frame, .. } => {
                    eprintln!("Peer reported a desync at frame {}", frame);
                }
                other => tracing::debug!(?other, "Session event"),
            }
        }

        let connection = runner.session().connection_state().status_message();
        if connection != status {
            println!("{}", connection);
            status = connection;
        }

        if let Some(reason) = report.ended {
            println!("Match ended: {:?}", reason);
            break;
        }
        if runner.world().time >= args.frames {
            runner.quit();
            break;
        }
        if !runner.session().is_running() && Instant::now() > deadline {
            anyhow::bail!("Timed out waiting for {}", args.peer);
        }

        std::thread::sleep(Duration::from_millis(1));
    }

    let checksum = crate::world_checksum(runner.world())?;
    println!(
        "Frame {}: checksum {:#018x}, {} rollback frames",
        runner.world().time,
        checksum,
        runner.session().total_rollback_frames()
    );
    if runner.session().end_reason() == Some(MatchEndReason::PeerDisconnected) {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}
