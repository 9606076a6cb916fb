// src/process/mod.rs
use std::path::{Path, PathBuf};

use crate::config::ChartConfig;
use crate::error::FileError;
use crate::load::{self, timestamp};
use crate::render;
use crate::resolve;

/// Convert one workbook into one PNG chart in `out_dir` and return the
/// output path. Every failure mode maps to a `FileError`; the caller logs
/// it and moves on to the next file.
#[tracing::instrument(level = "info", skip(out_dir, cfg), fields(path = %path.display()))]
pub fn spreadsheet_to_chart(
    path: &Path,
    out_dir: &Path,
    cfg: &ChartConfig,
) -> Result<PathBuf, FileError> {
    let table = load::load_sheet(path)?;
    let stamps = timestamp::build_timestamps(&table)?;
    let series = resolve::plan_series(&table, &stamps, cfg)?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("chart");
    let title = cfg.title.clone().unwrap_or_else(|| stem.to_string());
    let out_path = out_dir.join(format!("{stem}.png"));

    render::render_chart(&out_path, &title, &series, cfg)?;
    Ok(out_path)
}
