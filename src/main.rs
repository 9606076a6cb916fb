use anyhow::{bail, Result};
use glob::glob;
use sondeplot::{config::ChartConfig, process};
use std::{env, fs, path::PathBuf};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// File extensions picked up from the input directory.
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls", "ods"];

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();

    // ─── 2) configure dirs ───────────────────────────────────────────
    let mut args = env::args().skip(1);
    let in_dir = args.next().map(PathBuf::from).unwrap_or_else(|| "data".into());
    let out_dir = args.next().map(PathBuf::from).unwrap_or_else(|| "charts".into());

    if !in_dir.is_dir() {
        bail!("input directory {:?} does not exist", in_dir);
    }
    fs::create_dir_all(&out_dir)?;

    let cfg = ChartConfig::default();

    // ─── 3) discover input workbooks ─────────────────────────────────
    let mut inputs: Vec<PathBuf> = Vec::new();
    for ext in SPREADSHEET_EXTENSIONS {
        let pattern = format!("{}/*.{}", in_dir.display(), ext);
        for entry in glob(&pattern)? {
            match entry {
                Ok(path) => inputs.push(path),
                Err(e) => error!("unreadable directory entry: {}", e),
            }
        }
    }
    inputs.sort();

    if inputs.is_empty() {
        info!("no spreadsheet files in {}; exit", in_dir.display());
        return Ok(());
    }
    info!("{} files to chart", inputs.len());

    // ─── 4) process each file to completion ──────────────────────────
    let mut charted = 0usize;
    let mut skipped = 0usize;
    for path in &inputs {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        match process::spreadsheet_to_chart(path, &out_dir, &cfg) {
            Ok(out) => {
                charted += 1;
                info!("{} → {}", name, out.display());
            }
            Err(e) => {
                skipped += 1;
                error!("{} skipped: {}", name, e);
            }
        }
    }

    info!(charted, skipped, "batch complete");
    Ok(())
}
