//! Dataset loading — records from the flat file or the structured store.

use chrono::Datelike;

use paceline_core::{collection, db, ActivityRecord, Config};

use crate::error::RenderError;
use crate::options::{DataSource, PosterOptions};

/// Load the records a poster request selects, ordered by start time.
///
/// The structured store filters in SQL; the flat file filters in memory.
/// An empty result is a [`RenderError::EmptyDataset`] — posters over
/// nothing are a caller mistake worth surfacing, not a blank artifact.
pub fn load_records(
    config: &Config,
    options: &PosterOptions,
) -> Result<Vec<ActivityRecord>, RenderError> {
    let records = match options.source {
        DataSource::Db => db::read_range_at(&config.db_path(), options.years)?,
        DataSource::FlatFile => {
            let aggregate = collection::load_at(&config.collection_path())?;
            aggregate
                .records_by_start_time()
                .into_iter()
                .filter(|r| match options.years {
                    Some((from, to)) => (from..=to).contains(&r.start_time.year()),
                    None => true,
                })
                .cloned()
                .collect()
        }
    };
    if records.is_empty() {
        return Err(RenderError::EmptyDataset);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use paceline_core::{ActivityCollection, ActivityId, FileFormat, Sport};

    use super::*;

    fn record(id: &str, year: i32) -> ActivityRecord {
        let start = Utc.with_ymd_and_hms(year, 4, 2, 8, 0, 0).unwrap();
        ActivityRecord {
            id: ActivityId::from(id),
            title: format!("Run {id}"),
            sport: Sport::from("running"),
            start_time: start,
            distance_m: 5_000.0,
            duration_s: 1_500.0,
            format: FileFormat::Gpx,
            file_name: format!("{id}.gpx"),
            polyline: None,
            imported_at: start,
        }
    }

    fn options(source: DataSource, years: Option<(i32, i32)>) -> PosterOptions {
        PosterOptions {
            output: "out.svg".into(),
            source,
            years,
            title: None,
            locale: Default::default(),
            athlete: None,
        }
    }

    fn seeded_config(root: &std::path::Path) -> Config {
        let config = Config::default_at(root);
        let mut aggregate = ActivityCollection::empty(Utc::now());
        aggregate.merge([record("1", 2023), record("2", 2024)]);
        collection::save_at(&config.collection_path(), &aggregate).unwrap();
        db::write_all_at(&config.db_path(), aggregate.activities.values()).unwrap();
        config
    }

    #[test]
    fn flat_file_and_db_agree() {
        let tmp = TempDir::new().unwrap();
        let config = seeded_config(tmp.path());
        let flat = load_records(&config, &options(DataSource::FlatFile, None)).unwrap();
        let stored = load_records(&config, &options(DataSource::Db, None)).unwrap();
        assert_eq!(flat, stored);
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn year_filter_applies_to_both_sources() {
        let tmp = TempDir::new().unwrap();
        let config = seeded_config(tmp.path());
        for source in [DataSource::FlatFile, DataSource::Db] {
            let records = load_records(&config, &options(source, Some((2024, 2024)))).unwrap();
            assert_eq!(records.len(), 1, "{source:?}");
            assert_eq!(records[0].id, ActivityId::from("2"));
        }
    }

    #[test]
    fn empty_selection_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let config = seeded_config(tmp.path());
        let err = load_records(&config, &options(DataSource::FlatFile, Some((1999, 1999))))
            .unwrap_err();
        assert!(matches!(err, RenderError::EmptyDataset));
    }
}
