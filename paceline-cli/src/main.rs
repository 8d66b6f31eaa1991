//! Paceline — fitness-activity sync and poster CLI.
//!
//! # Usage
//!
//! ```text
//! paceline sync [--secret <blob>] [--is-cn] [--only-run] [--format gpx|tcx|fit]
//! paceline render --output <path> [--type github|grid|circular|monthoflife]
//!                 [--from-db] [--year 2024|2020-2024] [--title <t>]
//!                 [--language en|zh] [--athlete <name>]
//! paceline status [--json]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{render::RenderArgs, status::StatusArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "paceline",
    version,
    about = "Sync fitness activities from Garmin Connect and render SVG posters",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download new activities into the per-format folders and the
    /// aggregate collection.
    Sync(SyncArgs),

    /// Render an SVG poster from the local collection.
    Render(RenderArgs),

    /// Show local folder, ledger, and collection state.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Render(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}
