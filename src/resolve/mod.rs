// src/resolve/mod.rs
//! Column role inference and axis planning.
//!
//! Everything here is a pure function of the loaded table and the static
//! configuration: classify the candidate columns, settle on display names,
//! compute padded axis ranges and assign palette colors. No I/O.

use calamine::Data;
use chrono::NaiveDateTime;
use plotters::style::RGBColor;
use tracing::debug;

use crate::config::ChartConfig;
use crate::error::FileError;
use crate::load::SheetTable;

/// Fractional margin added above and below a data range so rendered points
/// are not clipped at the chart edge.
pub const RANGE_PAD_FRACTION: f64 = 0.05;

/// Absolute margin used instead when the range is degenerate (all values
/// equal), where a fractional pad would collapse to zero.
pub const FLAT_PAD: f64 = 0.1;

/// A numeric candidate column, straight out of the sheet: declared header
/// plus its (timestamp, value) points. Rows with an empty cell in this
/// column contribute no point.
#[derive(Debug, Clone)]
pub struct RawSeries {
    pub name: String,
    pub points: Vec<(NaiveDateTime, f64)>,
}

/// One fully planned series, ready to draw.
#[derive(Debug, Clone)]
pub struct SeriesSpec {
    pub name: String,
    pub color: RGBColor,
    /// Y-axis bounds, `range.0 < range.1`.
    pub range: (f64, f64),
    pub points: Vec<(NaiveDateTime, f64)>,
}

enum Cell {
    Missing,
    Number(f64),
    Text,
}

fn classify(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Missing,
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::String(s) => match parse_number(s) {
            Some(v) => Cell::Number(v),
            None if s.trim().is_empty() => Cell::Missing,
            None => Cell::Text,
        },
        // bools, error cells, ISO datetime strings: not measurements
        _ => Cell::Text,
    }
}

/// Numeric parse for string cells. Comma decimals are common in exports
/// from German-locale tools.
fn parse_number(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    t.parse()
        .ok()
        .or_else(|| t.replace(',', ".").parse().ok())
}

/// Walk columns 2.. and keep the ones that qualify as numeric series:
/// every non-empty cell numeric, at least one value present. Disqualified
/// columns are logged and dropped, never fatal.
pub fn numeric_candidates(table: &SheetTable, stamps: &[NaiveDateTime]) -> Vec<RawSeries> {
    let mut out = Vec::new();
    'columns: for col in 2..table.width() {
        let mut points = Vec::new();
        for (row, stamp) in table.rows.iter().zip(stamps) {
            match classify(&row[col]) {
                Cell::Number(v) => points.push((*stamp, v)),
                Cell::Missing => {}
                Cell::Text => {
                    debug!(column = col, header = %table.headers[col], "non-numeric column skipped");
                    continue 'columns;
                }
            }
        }
        if points.is_empty() {
            debug!(column = col, header = %table.headers[col], "column has no values, skipped");
            continue;
        }
        out.push(RawSeries {
            name: table.headers[col].clone(),
            points,
        });
    }
    out
}

/// A header that carries no real name: empty, or the `Unnamed: N` pattern
/// spreadsheet tooling generates for blank header cells.
pub fn is_placeholder(name: &str) -> bool {
    let t = name.trim();
    t.is_empty() || t.starts_with("Unnamed:")
}

/// Settle the display name of every candidate column, in order.
///
/// A declared name is kept when the override table recognizes it and it is
/// not a placeholder. Otherwise the positional fallback from the standard
/// name list applies; past the end of that list the declared name is kept
/// as-is. Collisions between resolved names are not corrected; the legend
/// will show duplicates.
pub fn resolve_names(raw: &[String], cfg: &ChartConfig) -> Vec<String> {
    raw.iter()
        .enumerate()
        .map(|(i, name)| {
            if cfg.overrides.contains_key(name.as_str()) && !is_placeholder(name) {
                name.clone()
            } else if let Some(fallback) = cfg.standard_names.get(i) {
                fallback.clone()
            } else {
                name.clone()
            }
        })
        .collect()
}

/// Y-axis bounds for one series: data min/max, with declared override
/// components taking precedence, padded by 5% of the span (or a flat 0.1
/// when the span is zero).
///
/// `values` must be non-empty; extraction guarantees that.
pub fn axis_range(name: &str, values: &[f64], cfg: &ChartConfig) -> (f64, f64) {
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if let Some(over) = cfg.overrides.get(name) {
        if let Some(min) = over.min {
            lo = min;
        }
        if let Some(max) = over.max {
            hi = max;
        }
    }

    let pad = if hi != lo {
        (hi - lo) * RANGE_PAD_FRACTION
    } else {
        FLAT_PAD
    };
    (lo - pad, hi + pad)
}

/// Colors cycle when there are more series than palette entries.
pub fn series_color(i: usize, palette: &[RGBColor]) -> RGBColor {
    palette[i % palette.len()]
}

/// The full plan for one sheet: extract candidates, resolve names, compute
/// ranges, assign colors.
pub fn plan_series(
    table: &SheetTable,
    stamps: &[NaiveDateTime],
    cfg: &ChartConfig,
) -> Result<Vec<SeriesSpec>, FileError> {
    let candidates = numeric_candidates(table, stamps);
    if candidates.is_empty() {
        return Err(FileError::NoNumericData);
    }

    let raw_names: Vec<String> = candidates.iter().map(|c| c.name.clone()).collect();
    let names = resolve_names(&raw_names, cfg);

    Ok(candidates
        .into_iter()
        .zip(names)
        .enumerate()
        .map(|(i, (raw, name))| {
            let values: Vec<f64> = raw.points.iter().map(|(_, v)| *v).collect();
            let range = axis_range(&name, &values, cfg);
            SeriesSpec {
                name,
                color: series_color(i, &cfg.palette),
                range,
                points: raw.points,
            }
        })
        .collect())
}
