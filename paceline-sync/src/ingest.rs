//! Downstream ingestion — merge downloaded files into the aggregate
//! collection and record them in the ledger.
//!
//! Ingest is driven by "folder scan minus ledger", so deleting the
//! collection and the ledger and re-running rebuilds everything from the
//! per-activity files. The collection and its SQLite mirror are saved
//! before the ledger is appended: re-ingesting a name after a crash is a
//! harmless replace, a ledgered-but-unsaved record would not be.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};

use paceline_core::{
    collection, db, ActivityId, ActivityRecord, ActivitySummary, Config, FileFormat, Sport,
};

use crate::error::{io_err, SyncError};
use crate::{ledger, scan};

/// Outcome of one ingestion pass.
#[derive(Debug)]
pub struct IngestReport {
    /// Filenames newly appended to the ledger, in ledger order.
    pub ingested: Vec<String>,
    /// Total records in the collection after the merge.
    pub total_records: usize,
}

/// Ingest every file in `folder` not yet present in the ledger.
///
/// `summaries` provides remote metadata for files fetched this run; files
/// present on disk without metadata (earlier runs, manual drops) get a
/// stub record keyed on the filename and stamped with the file mtime.
pub fn ingest_folder(
    config: &Config,
    folder: &Path,
    format: FileFormat,
    summaries: &HashMap<ActivityId, ActivitySummary>,
) -> Result<IngestReport, SyncError> {
    let ledger_path = config.ledger_path();
    let ledgered: HashSet<String> = ledger::load_at(&ledger_path)?.into_iter().collect();

    let now = Utc::now();
    let mut new_names = Vec::new();
    let mut new_records = Vec::new();
    for id in scan::known_ids_in(folder, format)? {
        let file_name = format!("{id}.{}", format.extension());
        if ledgered.contains(&file_name) {
            continue;
        }
        let record = match summaries.get(&id) {
            Some(summary) => ActivityRecord::from_summary(summary, format, now),
            None => stub_record(&id, folder, format, now)?,
        };
        new_names.push(file_name);
        new_records.push(record);
    }

    if new_names.is_empty() {
        let existing = collection::load_at(&config.collection_path())?;
        return Ok(IngestReport {
            ingested: Vec::new(),
            total_records: existing.activities.len(),
        });
    }

    let mut aggregate = collection::load_at(&config.collection_path())?;
    aggregate.merge(new_records);
    aggregate.synced_at = now;
    collection::save_at(&config.collection_path(), &aggregate)?;
    db::write_all_at(&config.db_path(), aggregate.activities.values())?;

    ledger::append_at(&ledger_path, &new_names)?;
    tracing::info!(
        ingested = new_names.len(),
        total = aggregate.activities.len(),
        "collection updated"
    );

    Ok(IngestReport {
        ingested: new_names,
        total_records: aggregate.activities.len(),
    })
}

/// Record for a file with no remote metadata this run.
fn stub_record(
    id: &ActivityId,
    folder: &Path,
    format: FileFormat,
    now: DateTime<Utc>,
) -> Result<ActivityRecord, SyncError> {
    let file_name = format!("{id}.{}", format.extension());
    let path = folder.join(&file_name);
    let modified = std::fs::metadata(&path)
        .and_then(|m| m.modified())
        .map_err(|e| io_err(&path, e))?;
    Ok(ActivityRecord {
        id: id.clone(),
        title: format!("Activity {id}"),
        sport: Sport::from("unknown"),
        start_time: DateTime::<Utc>::from(modified),
        distance_m: 0.0,
        duration_s: 0.0,
        format,
        file_name,
        polyline: None,
        imported_at: now,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::testing::summary;

    use super::*;

    fn setup(root: &Path, format: FileFormat, ids: &[&str]) -> (Config, std::path::PathBuf) {
        let config = Config::default_at(root);
        let folder = config.format_folder(format);
        std::fs::create_dir_all(&folder).unwrap();
        for id in ids {
            std::fs::write(folder.join(format!("{id}.{}", format.extension())), "data").unwrap();
        }
        (config, folder)
    }

    #[test]
    fn ingests_unledgered_files_and_appends_ledger() {
        let root = TempDir::new().unwrap();
        let (config, folder) = setup(root.path(), FileFormat::Gpx, &["1", "2"]);
        let summaries: HashMap<_, _> = [
            (ActivityId::from("1"), summary("1", "running")),
            (ActivityId::from("2"), summary("2", "cycling")),
        ]
        .into_iter()
        .collect();

        let report = ingest_folder(&config, &folder, FileFormat::Gpx, &summaries).unwrap();
        assert_eq!(report.ingested, ["1.gpx", "2.gpx"]);
        assert_eq!(report.total_records, 2);

        let ledgered = ledger::load_at(&config.ledger_path()).unwrap();
        assert_eq!(ledgered, ["1.gpx", "2.gpx"]);

        let aggregate = collection::load_at(&config.collection_path()).unwrap();
        assert_eq!(aggregate.activities["1"].title, "Activity 1");

        let db_records = db::read_range_at(&config.db_path(), None).unwrap();
        assert_eq!(db_records.len(), 2);
    }

    #[test]
    fn ledgered_files_are_not_reingested() {
        let root = TempDir::new().unwrap();
        let (config, folder) = setup(root.path(), FileFormat::Gpx, &["1"]);
        let summaries = HashMap::new();

        let first = ingest_folder(&config, &folder, FileFormat::Gpx, &summaries).unwrap();
        assert_eq!(first.ingested.len(), 1);

        let second = ingest_folder(&config, &folder, FileFormat::Gpx, &summaries).unwrap();
        assert!(second.ingested.is_empty());
        assert_eq!(second.total_records, 1);

        // The ledger must not have grown a duplicate line.
        let ledgered = ledger::load_at(&config.ledger_path()).unwrap();
        assert_eq!(ledgered, ["1.gpx"]);
    }

    #[test]
    fn file_without_metadata_gets_stub_record() {
        let root = TempDir::new().unwrap();
        let (config, folder) = setup(root.path(), FileFormat::Tcx, &["77"]);

        let report = ingest_folder(&config, &folder, FileFormat::Tcx, &HashMap::new()).unwrap();
        assert_eq!(report.ingested, ["77.tcx"]);

        let aggregate = collection::load_at(&config.collection_path()).unwrap();
        let record = &aggregate.activities["77"];
        assert_eq!(record.title, "Activity 77");
        assert_eq!(record.sport, Sport::from("unknown"));
        assert_eq!(record.format, FileFormat::Tcx);
    }

    #[test]
    fn deleting_collection_and_ledger_rebuilds_from_files() {
        let root = TempDir::new().unwrap();
        let (config, folder) = setup(root.path(), FileFormat::Gpx, &["5", "6"]);

        ingest_folder(&config, &folder, FileFormat::Gpx, &HashMap::new()).unwrap();
        std::fs::remove_file(config.collection_path()).unwrap();
        std::fs::remove_file(config.ledger_path()).unwrap();

        let report = ingest_folder(&config, &folder, FileFormat::Gpx, &HashMap::new()).unwrap();
        assert_eq!(report.ingested.len(), 2);
        assert_eq!(report.total_records, 2);
    }
}
