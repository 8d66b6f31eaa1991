//! SQLite mirror of the aggregate collection.
//!
//! One `activities` table, rewritten wholesale from the flat-file
//! collection after each ingest. Timestamps are stored as RFC 3339 UTC
//! strings, which compare lexicographically, so range queries work
//! directly on the text column.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::error::CoreError;
use crate::types::{ActivityId, ActivityRecord, FileFormat, Sport};

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS activities (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    sport       TEXT NOT NULL,
    start_time  TEXT NOT NULL,
    distance_m  REAL NOT NULL,
    duration_s  REAL NOT NULL,
    format      TEXT NOT NULL,
    file_name   TEXT NOT NULL,
    polyline    TEXT,
    imported_at TEXT NOT NULL
)";

/// Rewrite the `activities` table from `records`.
pub fn write_all_at<'a>(
    path: &Path,
    records: impl IntoIterator<Item = &'a ActivityRecord>,
) -> Result<(), CoreError> {
    let mut conn = Connection::open(path)?;
    conn.execute(SCHEMA, [])?;
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM activities", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO activities \
             (id, title, sport, start_time, distance_m, duration_s, format, file_name, polyline, imported_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for r in records {
            stmt.execute(params![
                r.id.0,
                r.title,
                r.sport.0,
                r.start_time.to_rfc3339(),
                r.distance_m,
                r.duration_s,
                r.format.extension(),
                r.file_name,
                r.polyline,
                r.imported_at.to_rfc3339(),
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// Read records, optionally restricted to an inclusive year range,
/// ordered by start time ascending.
pub fn read_range_at(
    path: &Path,
    years: Option<(i32, i32)>,
) -> Result<Vec<ActivityRecord>, CoreError> {
    // Reads never create the store.
    if !path.exists() {
        return Ok(Vec::new());
    }
    let conn = Connection::open(path)?;
    conn.execute(SCHEMA, [])?;

    let (clause, bounds) = match years {
        Some((from, to)) => (
            " WHERE start_time >= ?1 AND start_time < ?2",
            Some((format!("{from}-01-01"), format!("{}-01-01", to + 1))),
        ),
        None => ("", None),
    };
    let sql = format!(
        "SELECT id, title, sport, start_time, distance_m, duration_s, \
         format, file_name, polyline, imported_at \
         FROM activities{clause} ORDER BY start_time ASC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<ActivityRecord> {
        Ok(ActivityRecord {
            id: ActivityId(row.get(0)?),
            title: row.get(1)?,
            sport: Sport(row.get(2)?),
            start_time: parse_rfc3339(row.get::<_, String>(3)?, 3)?,
            distance_m: row.get(4)?,
            duration_s: row.get(5)?,
            format: parse_format(row.get::<_, String>(6)?, 6)?,
            file_name: row.get(7)?,
            polyline: row.get(8)?,
            imported_at: parse_rfc3339(row.get::<_, String>(9)?, 9)?,
        })
    };

    let rows = match bounds {
        Some((lo, hi)) => stmt.query_map(params![lo, hi], map_row)?,
        None => stmt.query_map([], map_row)?,
    };
    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

fn parse_rfc3339(raw: String, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

fn parse_format(raw: String, column: usize) -> rusqlite::Result<FileFormat> {
    match raw.as_str() {
        "gpx" => Ok(FileFormat::Gpx),
        "tcx" => Ok(FileFormat::Tcx),
        "fit" => Ok(FileFormat::Fit),
        other => Err(rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Text,
            format!("unknown format '{other}'").into(),
        )),
    }
}
