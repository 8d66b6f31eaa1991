//! `paceline render` — generate an SVG poster from the local collection.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use paceline_core::Config;
use paceline_render::{
    parse_year_range, DataSource, Locale, PosterKind, PosterOptions, Renderer,
};

/// Thin wrapper so clap can parse [`PosterKind`] from CLI args.
#[derive(Debug, Clone)]
pub struct KindArg(pub PosterKind);

impl FromStr for KindArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(Self(PosterKind::Github)),
            "grid" => Ok(Self(PosterKind::Grid)),
            "circular" => Ok(Self(PosterKind::Circular)),
            "monthoflife" | "month-of-life" => Ok(Self(PosterKind::MonthOfLife)),
            other => Err(format!(
                "unknown poster type '{other}'; expected: github, grid, circular, monthoflife"
            )),
        }
    }
}

impl fmt::Display for KindArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            PosterKind::Github => "github",
            PosterKind::Grid => "grid",
            PosterKind::Circular => "circular",
            PosterKind::MonthOfLife => "monthoflife",
        };
        f.write_str(name)
    }
}

/// Thin wrapper so clap can parse [`Locale`] from CLI args.
#[derive(Debug, Clone, Default)]
pub struct LocaleArg(pub Locale);

impl FromStr for LocaleArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Self(Locale::En)),
            "zh" => Ok(Self(Locale::Zh)),
            other => Err(format!("unknown language '{other}'; expected: en, zh")),
        }
    }
}

impl fmt::Display for LocaleArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Locale::En => f.write_str("en"),
            Locale::Zh => f.write_str("zh"),
        }
    }
}

/// Arguments for `paceline render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Visualization kind.
    #[arg(long = "type", default_value = "github")]
    pub kind: KindArg,

    /// Output SVG file path.
    #[arg(long)]
    pub output: PathBuf,

    /// Load records from the structured store instead of the flat file.
    #[arg(long)]
    pub from_db: bool,

    /// Filter by year, e.g. "2024" or "2020-2024".
    #[arg(long)]
    pub year: Option<String>,

    /// Custom title for the visualization.
    #[arg(long)]
    pub title: Option<String>,

    /// Label language.
    #[arg(long, default_value = "en")]
    pub language: LocaleArg,

    /// Athlete name to display (defaults to the configured athlete).
    #[arg(long)]
    pub athlete: Option<String>,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let cfg = Config::load().context("failed to load configuration")?;
        let years = self.year.as_deref().map(parse_year_range).transpose()?;
        let options = PosterOptions {
            output: self.output,
            source: if self.from_db {
                DataSource::Db
            } else {
                DataSource::FlatFile
            },
            years,
            title: self.title,
            locale: self.language.0,
            athlete: self.athlete.or_else(|| cfg.athlete.clone()),
        };

        let renderer = Renderer::new().context("failed to load poster templates")?;
        let written = renderer
            .generate(&cfg, self.kind.0, &options)
            .context("poster generation failed")?;
        println!("{} poster written: {}", "✓".green(), written.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_arg_accepts_both_month_spellings() {
        assert!(matches!(
            KindArg::from_str("monthoflife").unwrap().0,
            PosterKind::MonthOfLife
        ));
        assert!(matches!(
            KindArg::from_str("month-of-life").unwrap().0,
            PosterKind::MonthOfLife
        ));
        assert!(KindArg::from_str("mercator").is_err());
    }
}
