//! Rollcade CLI - developer tools for the rollcade core
//!
//! # Commands
//!
//! - `rollcade synctest` - Determinism harness over random CPU pads
//! - `rollcade replay record|verify|dump` - Input replay files
//! - `rollcade command` - Inspect how a move notation parses
//! - `rollcade netplay` - Two-process P2P sandbox match over UDP
//!
//! Settings come from the platform `config.toml` (see
//! `rollcade_core::config`). Set `RUST_LOG` to change log verbosity.

mod command;
mod netplay;
mod replay;
mod synctest;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rollcade_core::{EngineConfig, GameState, World};

/// Rollcade CLI - sync tests, replays and netplay for the rollcade core
#[derive(Parser)]
#[command(name = "rollcade")]
#[command(about = "Developer tools for the rollcade fighting-game core")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a sync-test session and report any desync
    Synctest(synctest::SynctestArgs),

    /// Record, verify or dump input replays
    #[command(subcommand)]
    Replay(replay::ReplayAction),

    /// Print how a command notation parses
    Command(command::CommandArgs),

    /// Play a P2P sandbox match against another process
    Netplay(netplay::NetplayArgs),
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Synctest(args) => synctest::execute(args),
        Commands::Replay(action) => replay::execute(action),
        Commands::Command(args) => {
            command::execute(args);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Netplay(args) => netplay::execute(args),
    }
}

/// Load `config.toml`, falling back to defaults when there is none
pub(crate) fn load_config() -> Result<EngineConfig> {
    rollcade_core::config::load().context("Failed to load config.toml")
}

/// Checksum of the world as a rollback snapshot would hash it
pub(crate) fn world_checksum(world: &World) -> Result<u64> {
    let mut state = GameState::new();
    state.save_state(world);
    state.checksum().context("Failed to checksum world state")
}
