//! Poster request options.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Where the activity records come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSource {
    /// `activities.json` flat file.
    #[default]
    FlatFile,
    /// `data.db` structured store.
    Db,
}

/// Poster label language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Zh,
}

/// One poster request.
#[derive(Debug, Clone)]
pub struct PosterOptions {
    pub output: PathBuf,
    pub source: DataSource,
    /// Inclusive year range filter; `None` renders everything.
    pub years: Option<(i32, i32)>,
    pub title: Option<String>,
    pub locale: Locale,
    pub athlete: Option<String>,
}

/// Parse a year filter: `2024` or `2020-2024` (inclusive).
pub fn parse_year_range(raw: &str) -> Result<(i32, i32), RenderError> {
    let invalid = || RenderError::InvalidOption(format!("year filter '{raw}'"));
    let parse = |s: &str| s.trim().parse::<i32>().map_err(|_| invalid());
    match raw.split_once('-') {
        None => {
            let year = parse(raw)?;
            Ok((year, year))
        }
        Some((from, to)) => {
            let (from, to) = (parse(from)?, parse(to)?);
            if from > to {
                return Err(invalid());
            }
            Ok((from, to))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_year() {
        assert_eq!(parse_year_range("2024").unwrap(), (2024, 2024));
    }

    #[test]
    fn inclusive_range() {
        assert_eq!(parse_year_range("2020-2024").unwrap(), (2020, 2024));
    }

    #[test]
    fn rejects_malformed_filters() {
        for raw in ["", "abc", "2024-", "-2024", "2024-2020"] {
            assert!(
                matches!(parse_year_range(raw), Err(RenderError::InvalidOption(_))),
                "'{raw}' should be rejected"
            );
        }
    }
}
