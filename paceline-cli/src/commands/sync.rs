//! `paceline sync` — download new activities and update the collection.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use paceline_connect::Session;
use paceline_core::{config, Config, FileFormat, Region};
use paceline_sync::pipeline;

/// Thin wrapper so clap can parse [`FileFormat`] from CLI args.
#[derive(Debug, Clone, Default)]
pub struct FormatArg(pub FileFormat);

impl FromStr for FormatArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gpx" => Ok(Self(FileFormat::Gpx)),
            "tcx" => Ok(Self(FileFormat::Tcx)),
            "fit" => Ok(Self(FileFormat::Fit)),
            other => Err(format!("unknown format '{other}'; expected: gpx, tcx, fit")),
        }
    }
}

impl fmt::Display for FormatArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Arguments for `paceline sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Vendor token dump; falls back to $GARMIN_SECRET, then secret.txt.
    #[arg(long)]
    pub secret: Option<String>,

    /// Use the China endpoint family.
    #[arg(long)]
    pub is_cn: bool,

    /// Only download running activities.
    #[arg(long)]
    pub only_run: bool,

    /// File format to download.
    #[arg(long, default_value = "gpx")]
    pub format: FormatArg,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let cfg = Config::load().context("failed to load configuration")?;
        let secret = config::resolve_secret(
            self.secret.as_deref(),
            std::env::var(config::SECRET_ENV).ok(),
            &cfg.secret_file_path(),
        )?;
        let region = if self.is_cn {
            Region::China
        } else {
            Region::Global
        };
        let format = self.format.0;

        let session =
            Session::restore(&secret, region).context("failed to restore vendor session")?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;
        let outcome = runtime
            .block_on(pipeline::run(&session, &cfg, format, self.only_run))
            .context("sync failed")?;

        for id in &outcome.new_ids {
            println!("  {}  {id}.{}", "↓".green(), format.extension());
        }
        for id in &outcome.skipped_missing {
            println!("  {}  {id} (no longer on remote)", "!".yellow());
        }
        println!(
            "{} synced {} new activities ({} total in collection)",
            "✓".green(),
            outcome.new_ids.len(),
            outcome.total_records
        );

        if let Some(failure) = outcome.failure {
            bail!(
                "aborted at activity {} after retries: {}; {} earlier downloads were kept",
                failure.id,
                failure.message,
                outcome.new_ids.len()
            );
        }
        Ok(())
    }
}
