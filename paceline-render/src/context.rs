//! Poster contexts — statistics, geometry, and labels computed in Rust.
//!
//! Templates only iterate and emit markup; every coordinate, color, and
//! label is precomputed here so the templates stay logic-free.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use paceline_core::ActivityRecord;

use crate::options::{Locale, PosterOptions};

const MARGIN: f64 = 20.0;
const HEADER_H: f64 = 60.0;

// Five-step green ramp, darkest = rest day.
const RAMP: [&str; 5] = ["#21262d", "#0e4429", "#006d32", "#26a641", "#39d353"];

// ---------------------------------------------------------------------------
// Labels and header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Labels {
    pub months: [&'static str; 12],
    pub runs: &'static str,
    pub km: &'static str,
}

impl Labels {
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::En => Self {
                months: [
                    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov",
                    "Dec",
                ],
                runs: "runs",
                km: "km",
            },
            Locale::Zh => Self {
                months: [
                    "一月", "二月", "三月", "四月", "五月", "六月", "七月", "八月", "九月",
                    "十月", "十一月", "十二月",
                ],
                runs: "次",
                km: "公里",
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub title: String,
    pub subtitle: String,
}

fn header(
    records: &[ActivityRecord],
    options: &PosterOptions,
    default_title: &str,
) -> Header {
    let labels = Labels::for_locale(options.locale);
    let km = round1(records.iter().map(|r| r.distance_m).sum::<f64>() / 1000.0);
    let mut subtitle = String::new();
    if let Some(athlete) = &options.athlete {
        subtitle.push_str(athlete);
        subtitle.push_str(" · ");
    }
    subtitle.push_str(&format!(
        "{} {} · {} {}",
        records.len(),
        labels.runs,
        km,
        labels.km
    ));
    Header {
        title: options
            .title
            .clone()
            .unwrap_or_else(|| default_title.to_owned()),
        subtitle,
    }
}

// ---------------------------------------------------------------------------
// Shared aggregation
// ---------------------------------------------------------------------------

fn daily_km(records: &[ActivityRecord]) -> BTreeMap<NaiveDate, f64> {
    let mut daily = BTreeMap::new();
    for record in records {
        *daily.entry(record.start_time.date_naive()).or_insert(0.0) +=
            record.distance_m / 1000.0;
    }
    daily
}

fn years_of(daily: &BTreeMap<NaiveDate, f64>) -> Vec<i32> {
    let mut years: Vec<i32> = daily.keys().map(|d| d.year()).collect();
    years.dedup();
    years
}

fn fill_for_daily(km: f64) -> &'static str {
    match km {
        km if km <= 0.0 => RAMP[0],
        km if km < 5.0 => RAMP[1],
        km if km < 10.0 => RAMP[2],
        km if km < 20.0 => RAMP[3],
        _ => RAMP[4],
    }
}

fn fill_for_monthly(km: f64) -> &'static str {
    match km {
        km if km <= 0.0 => RAMP[0],
        km if km < 20.0 => RAMP[1],
        km if km < 50.0 => RAMP[2],
        km if km < 100.0 => RAMP[3],
        _ => RAMP[4],
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Contribution grid (github)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Cell {
    pub x: f64,
    pub y: f64,
    pub fill: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearRow {
    pub label: String,
    pub y: f64,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GithubCtx {
    pub width: f64,
    pub height: f64,
    pub cell: f64,
    pub header: Header,
    pub years: Vec<YearRow>,
}

pub fn github_context(records: &[ActivityRecord], options: &PosterOptions) -> GithubCtx {
    const STEP: f64 = 14.0;
    const ROW_H: f64 = 7.0 * STEP + 34.0;

    let daily = daily_km(records);
    let mut rows = Vec::new();
    for (i, year) in years_of(&daily).into_iter().enumerate() {
        let top = HEADER_H + i as f64 * ROW_H + 20.0;
        let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).expect("valid jan 1");
        let offset = jan1.weekday().num_days_from_sunday();
        let mut cells = Vec::new();
        let mut date = jan1;
        while date.year() == year {
            let idx = date.ordinal0() + offset;
            cells.push(Cell {
                x: MARGIN + f64::from(idx / 7) * STEP,
                y: top + f64::from(idx % 7) * STEP,
                fill: fill_for_daily(daily.get(&date).copied().unwrap_or(0.0)),
            });
            date = match date.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
        rows.push(YearRow {
            label: year.to_string(),
            y: top - 6.0,
            cells,
        });
    }

    GithubCtx {
        width: MARGIN * 2.0 + 53.0 * STEP,
        height: HEADER_H + rows.len() as f64 * ROW_H + 20.0,
        cell: 11.0,
        header: header(records, options, "Running"),
        years: rows,
    }
}

// ---------------------------------------------------------------------------
// Calendar grid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MonthBlock {
    pub label: &'static str,
    pub x: f64,
    pub y: f64,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearSection {
    pub label: String,
    pub y: f64,
    pub months: Vec<MonthBlock>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridCtx {
    pub width: f64,
    pub height: f64,
    pub cell: f64,
    pub header: Header,
    pub sections: Vec<YearSection>,
}

pub fn grid_context(records: &[ActivityRecord], options: &PosterOptions) -> GridCtx {
    const STEP: f64 = 11.0;
    const BLOCK_W: f64 = 7.0 * STEP + 24.0;
    const BLOCK_H: f64 = 6.0 * STEP + 34.0;
    const SECTION_H: f64 = 3.0 * BLOCK_H + 30.0;

    let labels = Labels::for_locale(options.locale);
    let daily = daily_km(records);
    let mut sections = Vec::new();
    for (i, year) in years_of(&daily).into_iter().enumerate() {
        let top = HEADER_H + i as f64 * SECTION_H + 24.0;
        let mut months = Vec::new();
        for month in 1..=12u32 {
            let x = MARGIN + f64::from((month - 1) % 4) * BLOCK_W;
            let y = top + f64::from((month - 1) / 4) * BLOCK_H;
            let mut cells = Vec::new();
            let mut date = NaiveDate::from_ymd_opt(year, month, 1).expect("valid month start");
            while date.month() == month {
                let idx = date.day0();
                cells.push(Cell {
                    x: x + f64::from(idx % 7) * STEP,
                    y: y + 14.0 + f64::from(idx / 7) * STEP,
                    fill: fill_for_daily(daily.get(&date).copied().unwrap_or(0.0)),
                });
                date = match date.succ_opt() {
                    Some(next) => next,
                    None => break,
                };
            }
            months.push(MonthBlock {
                label: labels.months[(month - 1) as usize],
                x,
                y,
                cells,
            });
        }
        sections.push(YearSection {
            label: year.to_string(),
            y: top - 8.0,
            months,
        });
    }

    GridCtx {
        width: MARGIN * 2.0 + 4.0 * BLOCK_W,
        height: HEADER_H + sections.len() as f64 * SECTION_H + 20.0,
        cell: 9.0,
        header: header(records, options, "Calendar"),
        sections,
    }
}

// ---------------------------------------------------------------------------
// Circular
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearRing {
    pub label: String,
    pub cx: f64,
    pub cy: f64,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CircularCtx {
    pub width: f64,
    pub height: f64,
    pub header: Header,
    pub rings: Vec<YearRing>,
}

pub fn circular_context(records: &[ActivityRecord], options: &PosterOptions) -> CircularCtx {
    const RING_R: f64 = 60.0;
    const MAX_LEN: f64 = 48.0;
    const RING_BOX: f64 = 2.0 * (RING_R + MAX_LEN) + 30.0;

    let daily = daily_km(records);
    let width = MARGIN * 2.0 + RING_BOX;
    let mut rings = Vec::new();
    for (i, year) in years_of(&daily).into_iter().enumerate() {
        let cx = width / 2.0;
        let cy = HEADER_H + (i as f64 + 0.5) * RING_BOX;
        let days_in_year = if NaiveDate::from_ymd_opt(year, 12, 31)
            .map(|d| d.ordinal() == 366)
            .unwrap_or(false)
        {
            366.0
        } else {
            365.0
        };
        let mut segments = Vec::new();
        for (date, km) in daily.range(
            NaiveDate::from_ymd_opt(year, 1, 1).expect("jan 1")
                ..=NaiveDate::from_ymd_opt(year, 12, 31).expect("dec 31"),
        ) {
            let theta = std::f64::consts::TAU * f64::from(date.ordinal0()) / days_in_year
                - std::f64::consts::FRAC_PI_2;
            let len = (km * 3.0).clamp(2.0, MAX_LEN);
            segments.push(Segment {
                x1: round1(cx + RING_R * theta.cos()),
                y1: round1(cy + RING_R * theta.sin()),
                x2: round1(cx + (RING_R + len) * theta.cos()),
                y2: round1(cy + (RING_R + len) * theta.sin()),
                stroke: fill_for_daily(*km),
            });
        }
        rings.push(YearRing {
            label: year.to_string(),
            cx,
            cy,
            segments,
        });
    }

    CircularCtx {
        width,
        height: HEADER_H + rings.len() as f64 * RING_BOX + 20.0,
        header: header(records, options, "Year Wheel"),
        rings,
    }
}

// ---------------------------------------------------------------------------
// Month calendar (month-of-life)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MonthRow {
    pub label: String,
    pub y: f64,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthLifeCtx {
    pub width: f64,
    pub height: f64,
    pub cell: f64,
    pub header: Header,
    pub month_labels: [&'static str; 12],
    pub rows: Vec<MonthRow>,
}

pub fn month_life_context(records: &[ActivityRecord], options: &PosterOptions) -> MonthLifeCtx {
    const STEP: f64 = 34.0;

    let mut monthly: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for record in records {
        let date = record.start_time.date_naive();
        *monthly.entry((date.year(), date.month())).or_insert(0.0) +=
            record.distance_m / 1000.0;
    }

    let mut years: Vec<i32> = monthly.keys().map(|(year, _)| *year).collect();
    years.dedup();

    let mut rows = Vec::new();
    for (i, year) in years.iter().enumerate() {
        let y = HEADER_H + 24.0 + i as f64 * STEP;
        let cells = (1..=12u32)
            .map(|month| Cell {
                x: MARGIN + 50.0 + f64::from(month - 1) * STEP,
                y,
                fill: fill_for_monthly(monthly.get(&(*year, month)).copied().unwrap_or(0.0)),
            })
            .collect();
        rows.push(MonthRow {
            label: year.to_string(),
            y,
            cells,
        });
    }

    MonthLifeCtx {
        width: MARGIN * 2.0 + 50.0 + 12.0 * STEP,
        height: HEADER_H + 24.0 + rows.len() as f64 * STEP + 30.0,
        cell: 30.0,
        header: header(records, options, "Months of Running"),
        month_labels: Labels::for_locale(options.locale).months,
        rows,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
