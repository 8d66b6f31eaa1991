//! `paceline status` — local folder, ledger, and collection visibility.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use paceline_core::{collection, Config, FileFormat};
use paceline_sync::{ledger, scan};

/// Arguments for `paceline status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct FormatStatus {
    format: String,
    folder: String,
    files: usize,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    formats: Vec<FormatStatus>,
    ledger_entries: usize,
    collection_records: usize,
    synced_at: Option<String>,
}

#[derive(Tabled)]
struct FormatRow {
    #[tabled(rename = "format")]
    format: String,
    #[tabled(rename = "folder")]
    folder: String,
    #[tabled(rename = "files")]
    files: usize,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let cfg = Config::load().context("failed to load configuration")?;
        let report = build_report(&cfg)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        let rows: Vec<FormatRow> = report
            .formats
            .iter()
            .map(|f| FormatRow {
                format: f.format.clone(),
                folder: f.folder.clone(),
                files: f.files,
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");

        println!(
            "{} {} ledger entries, {} collection records, last synced: {}",
            "·".cyan(),
            report.ledger_entries,
            report.collection_records,
            report.synced_at.as_deref().unwrap_or("never"),
        );
        Ok(())
    }
}

fn build_report(cfg: &Config) -> Result<StatusReport> {
    let mut formats = Vec::new();
    for format in FileFormat::all() {
        let folder = cfg.format_folder(*format);
        let files = scan::known_ids_in(&folder, *format)
            .with_context(|| format!("failed to scan {}", folder.display()))?
            .len();
        formats.push(FormatStatus {
            format: format.to_string(),
            folder: folder.display().to_string(),
            files,
        });
    }

    let ledger_entries = ledger::load_at(&cfg.ledger_path())
        .context("failed to load ledger")?
        .len();
    let aggregate =
        collection::load_at(&cfg.collection_path()).context("failed to load collection")?;

    Ok(StatusReport {
        formats,
        ledger_entries,
        collection_records: aggregate.activities.len(),
        synced_at: (!aggregate.activities.is_empty()).then(|| aggregate.synced_at.to_rfc3339()),
    })
}
