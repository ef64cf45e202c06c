use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("column '{0}' not found")]
    MissingColumn(String),
    #[error("column lengths are inconsistent")]
    LengthMismatch,
    #[error("low > high at row {row} (low={low}, high={high})")]
    InvertedRange { row: usize, low: f64, high: f64 },
    #[error("unsupported timestamp at row {row}: {value}")]
    UnsupportedTimestamp { row: usize, value: String },
    #[error("invalid numeric value in column '{column}' at row {row}: {value}")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Violations of the candle sequence invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("time does not increase at row {row} ({prev} -> {time})")]
    NonIncreasingTime { row: usize, prev: i64, time: i64 },
    #[error("low > high at row {row} (low={low}, high={high})")]
    InvertedRange { row: usize, low: f64, high: f64 },
    #[error("negative volume at row {row}: {volume}")]
    NegativeVolume { row: usize, volume: f64 },
}

/// Rejected chart session commands.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("chart type '{0}' is not supported")]
    UnsupportedChartType(&'static str),
    #[error("parameters do not match indicator '{0}'")]
    MismatchedParameters(&'static str),
}
