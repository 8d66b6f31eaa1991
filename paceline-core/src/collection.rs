//! Aggregate activity collection — flat-file JSON store.
//!
//! Persists an [`ActivityCollection`] document at
//! `<data_root>/activities.json`. Writes use an atomic `.tmp` + rename.
//! Records are keyed by activity id; merging an id already present
//! replaces its record (full re-derivation is the only mutation path).

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{io_err, CoreError};
use crate::types::ActivityRecord;

/// On-disk aggregate collection payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityCollection {
    pub synced_at: DateTime<Utc>,
    /// Records keyed by activity id — BTreeMap for stable serialization.
    pub activities: BTreeMap<String, ActivityRecord>,
}

impl ActivityCollection {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            synced_at: now,
            activities: BTreeMap::new(),
        }
    }

    /// Merge records into the collection, replacing any existing entry for
    /// the same id. Returns the number of records merged.
    pub fn merge(&mut self, records: impl IntoIterator<Item = ActivityRecord>) -> usize {
        let mut merged = 0;
        for record in records {
            self.activities.insert(record.id.0.clone(), record);
            merged += 1;
        }
        merged
    }

    /// Records ordered by start time, oldest first.
    pub fn records_by_start_time(&self) -> Vec<&ActivityRecord> {
        let mut records: Vec<_> = self.activities.values().collect();
        records.sort_by_key(|r| r.start_time);
        records
    }
}

/// Load the collection at `path`.
///
/// Returns an empty collection if the file does not yet exist (first run).
pub fn load_at(path: &Path) -> Result<ActivityCollection, CoreError> {
    if !path.exists() {
        return Ok(ActivityCollection::empty(Utc::now()));
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save the collection at `path` atomically.
///
/// Writes to `<path>.tmp` then renames to `<path>`.
pub fn save_at(path: &Path, collection: &ActivityCollection) -> Result<(), CoreError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let json = serde_json::to_string_pretty(collection)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::TempDir;

    use crate::types::{ActivityId, FileFormat, Sport};

    use super::*;

    fn record(id: &str, start: DateTime<Utc>) -> ActivityRecord {
        ActivityRecord {
            id: ActivityId::from(id),
            title: format!("Activity {id}"),
            sport: Sport::from("running"),
            start_time: start,
            distance_m: 1000.0,
            duration_s: 300.0,
            format: FileFormat::Gpx,
            file_name: format!("{id}.gpx"),
            polyline: None,
            imported_at: start,
        }
    }

    #[test]
    fn empty_collection_when_file_missing() {
        let tmp = TempDir::new().unwrap();
        let loaded = load_at(&tmp.path().join("activities.json")).unwrap();
        assert!(loaded.activities.is_empty());
    }

    #[test]
    fn roundtrip_save_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("activities.json");
        let now = Utc::now();
        let mut collection = ActivityCollection::empty(now);
        collection.merge([record("1", now), record("2", now)]);

        save_at(&path, &collection).unwrap();
        let loaded = load_at(&path).unwrap();
        assert_eq!(loaded.activities, collection.activities);
    }

    #[test]
    fn tmp_file_cleaned_up_after_save() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("activities.json");
        save_at(&path, &ActivityCollection::empty(Utc::now())).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn merge_replaces_existing_id() {
        let now = Utc::now();
        let mut collection = ActivityCollection::empty(now);
        collection.merge([record("1", now)]);
        let mut updated = record("1", now);
        updated.title = "Renamed".to_owned();
        let merged = collection.merge([updated.clone()]);
        assert_eq!(merged, 1);
        assert_eq!(collection.activities.len(), 1);
        assert_eq!(collection.activities["1"].title, "Renamed");
    }

    #[test]
    fn records_sorted_by_start_time() {
        let mut collection = ActivityCollection::empty(Utc::now());
        let older = Utc.with_ymd_and_hms(2023, 5, 1, 6, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap();
        collection.merge([record("b", newer), record("a", older)]);
        let ordered = collection.records_by_start_time();
        assert_eq!(ordered[0].id, ActivityId::from("a"));
        assert_eq!(ordered[1].id, ActivityId::from("b"));
    }
}
