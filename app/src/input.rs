use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use chart_core::{Candle, LoadOptions, load_csv, load_parquet};
use clap::ValueEnum;
use tracing::info;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum InputFormat {
    Csv,
    Parquet,
}

pub fn detect_format(path: &Path) -> Option<InputFormat> {
    let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some(InputFormat::Csv),
        "parquet" | "parq" => Some(InputFormat::Parquet),
        _ => None,
    }
}

/// Loads candles from `path`, inferring the format from the extension when
/// `format` is not given.
pub fn load_candles(path: &Path, format: Option<InputFormat>) -> Result<Vec<Candle>> {
    let format = format
        .or_else(|| detect_format(path))
        .ok_or_else(|| anyhow!("could not determine file format of {} (use --format)", path.display()))?;

    let candles = match format {
        InputFormat::Csv => load_csv(path, LoadOptions::default()),
        InputFormat::Parquet => load_parquet(path, LoadOptions::default()),
    }
    .with_context(|| format!("failed to load {}", path.display()))?;

    if candles.is_empty() {
        bail!("no candles loaded from {}", path.display());
    }
    info!(path = %path.display(), ?format, bars = candles.len(), "loaded candles");
    Ok(candles)
}
