//! Canonical sync pass used by the CLI.
//!
//! One run: derive the known-id set from disk, fetch what is missing,
//! ingest the target folder into the aggregate collection, report. The
//! run assumes exclusive ownership of its folder/format pair; callers
//! serialize runs per folder.

use paceline_core::{ActivityId, Config, FileFormat};

use crate::engine::{self, FetchFailure};
use crate::error::SyncError;
use crate::source::ActivitySource;
use crate::{ingest, scan};

/// Combined result of one fetch + ingest pass.
#[derive(Debug)]
pub struct SyncOutcome {
    /// Newly fetched ids, newest first.
    pub new_ids: Vec<ActivityId>,
    /// Ids skipped because the remote detail vanished.
    pub skipped_missing: Vec<ActivityId>,
    /// Filenames newly ingested into the collection.
    pub ingested_files: Vec<String>,
    /// Collection size after ingest.
    pub total_records: usize,
    /// Present when the fetch loop aborted early; everything above still
    /// reflects the progress made before the abort.
    pub failure: Option<FetchFailure>,
}

impl SyncOutcome {
    pub fn is_partial(&self) -> bool {
        self.failure.is_some()
    }
}

/// Run a full sync pass for `format`.
pub async fn run<S: ActivitySource>(
    source: &S,
    config: &Config,
    format: FileFormat,
    only_run: bool,
) -> Result<SyncOutcome, SyncError> {
    let known = scan::known_ids_for_format(config, format)?;
    let folder = config.format_folder(format);

    let report = engine::download_new(source, &known, format, only_run, &folder).await?;
    let ingested = ingest::ingest_folder(config, &folder, format, &report.summaries)?;

    Ok(SyncOutcome {
        new_ids: report.new_ids,
        skipped_missing: report.skipped_missing,
        ingested_files: ingested.ingested,
        total_records: ingested.total_records,
        failure: report.failure,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::ledger;
    use crate::testing::{summary, MockSource};

    use super::*;

    // Small helper so tests read at the property level.
    fn collection_len(config: &Config) -> usize {
        paceline_core::collection::load_at(&config.collection_path())
            .unwrap()
            .activities
            .len()
    }

    #[tokio::test(start_paused = true)]
    async fn full_pass_downloads_ingests_and_ledgers() {
        let root = TempDir::new().unwrap();
        let config = Config::default_at(root.path());
        let source = MockSource::new(vec![summary("2", "running"), summary("1", "cycling")]);

        let outcome = run(&source, &config, FileFormat::Gpx, false).await.unwrap();

        assert_eq!(
            outcome.new_ids,
            vec![ActivityId::from("2"), ActivityId::from("1")]
        );
        assert_eq!(outcome.total_records, 2);
        assert!(config.format_folder(FileFormat::Gpx).join("2.gpx").exists());
        assert_eq!(
            ledger::load_at(&config.ledger_path()).unwrap(),
            ["1.gpx", "2.gpx"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn second_run_is_idempotent() {
        let root = TempDir::new().unwrap();
        let config = Config::default_at(root.path());
        let source = MockSource::new(vec![summary("1", "running"), summary("2", "running")]);

        let first = run(&source, &config, FileFormat::Gpx, false).await.unwrap();
        assert_eq!(first.new_ids.len(), 2);

        let second = run(&source, &config, FileFormat::Gpx, false).await.unwrap();
        assert!(second.new_ids.is_empty());
        assert!(second.ingested_files.is_empty());
        assert_eq!(second.total_records, 2);
        assert_eq!(collection_len(&config), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn fit_run_treats_gpx_only_id_as_known() {
        let root = TempDir::new().unwrap();
        let config = Config::default_at(root.path());
        let gpx_folder = config.format_folder(FileFormat::Gpx);
        std::fs::create_dir_all(&gpx_folder).unwrap();
        std::fs::write(gpx_folder.join("100.gpx"), "existing").unwrap();

        let source = MockSource::new(vec![summary("200", "running"), summary("100", "running")]);
        let outcome = run(&source, &config, FileFormat::Fit, false).await.unwrap();

        assert_eq!(outcome.new_ids, vec![ActivityId::from("200")]);
        let fetched = source.fetch_calls();
        assert!(!fetched.contains(&ActivityId::from("100")), "gpx-only id must not be refetched");
        assert!(config.format_folder(FileFormat::Fit).join("200.fit").exists());
        assert!(!config.format_folder(FileFormat::Fit).join("100.fit").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn partial_failure_still_ingests_completed_fetches() {
        let root = TempDir::new().unwrap();
        let config = Config::default_at(root.path());
        let source = MockSource::new(vec![
            summary("3", "running"),
            summary("2", "running"),
            summary("1", "running"),
        ])
        .transient("2", u32::MAX);

        let outcome = run(&source, &config, FileFormat::Gpx, false).await.unwrap();

        assert!(outcome.is_partial());
        assert_eq!(outcome.new_ids, vec![ActivityId::from("3")]);
        assert_eq!(outcome.ingested_files, ["3.gpx"]);
        assert_eq!(
            ledger::load_at(&config.ledger_path()).unwrap(),
            ["3.gpx"],
            "partial progress must be durably recorded"
        );
    }
}
