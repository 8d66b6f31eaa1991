//! Synced-file ledger — append-only log of ingested filenames.
//!
//! One filename per line, in the order recorded. Lines are never rewritten
//! or reordered; a mid-append interruption leaves every previously
//! committed line intact. The ledger is log-structured, not set-structured:
//! callers must not append a filename already present.

use std::fs::OpenOptions;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use crate::error::{io_err, SyncError};

/// Every previously recorded filename, in recorded order.
///
/// A missing ledger file is a first run: returns an empty list.
pub fn load_at(path: &Path) -> Result<Vec<String>, SyncError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(io_err(path, err)),
    };
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

/// Append `names` to the ledger, one per line, preserving order.
///
/// The file handle is scoped to this call and flushed + synced before
/// returning, so a committed append survives the process.
pub fn append_at(path: &Path, names: &[String]) -> Result<(), SyncError> {
    if names.is_empty() {
        return Ok(());
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_err(path, e))?;
    let mut writer = BufWriter::new(file);
    for name in names {
        writeln!(writer, "{name}").map_err(|e| io_err(path, e))?;
    }
    writer.flush().map_err(|e| io_err(path, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| io_err(path, e))?;
    Ok(())
}
