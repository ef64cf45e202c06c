use crate::{Candle, LoadError};
use polars::datatypes::TimeUnit;
use polars::prelude::PlPathRef;
use polars::prelude::*;
use std::path::Path;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

#[derive(Debug, Clone)]
pub struct ColumnMapping {
    pub time: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            time: "time".into(),
            open: "open".into(),
            high: "high".into(),
            low: "low".into(),
            close: "close".into(),
            volume: "volume".into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub columns: ColumnMapping,
}

/// Column names tried when the configured time column is absent.
const TIME_ALIASES: [&str; 3] = ["time", "timestamp", "date"];

pub fn load_csv(path: impl AsRef<Path>, options: LoadOptions) -> Result<Vec<Candle>, LoadError> {
    let pl_path = PlPathRef::from_local_path(path.as_ref()).into_owned();
    let lf = LazyCsvReader::new(pl_path).with_has_header(true);
    let df = lf.finish()?.collect()?;
    parse_frame(df, &options.columns)
}

pub fn load_parquet(
    path: impl AsRef<Path>,
    options: LoadOptions,
) -> Result<Vec<Candle>, LoadError> {
    let pl_path = PlPathRef::from_local_path(path.as_ref()).into_owned();
    let lf = LazyFrame::scan_parquet(pl_path, ScanArgsParquet::default())?;
    let df = lf.collect()?;
    parse_frame(df, &options.columns)
}

fn parse_frame(df: DataFrame, columns: &ColumnMapping) -> Result<Vec<Candle>, LoadError> {
    let ts = df
        .column(&columns.time)
        .ok()
        .or_else(|| TIME_ALIASES.iter().find_map(|name| df.column(name).ok()))
        .ok_or_else(|| LoadError::MissingColumn(columns.time.clone()))?;
    let open = df
        .column(&columns.open)
        .map_err(|_| LoadError::MissingColumn(columns.open.clone()))?;
    let high = df
        .column(&columns.high)
        .map_err(|_| LoadError::MissingColumn(columns.high.clone()))?;
    let low = df
        .column(&columns.low)
        .map_err(|_| LoadError::MissingColumn(columns.low.clone()))?;
    let close = df
        .column(&columns.close)
        .map_err(|_| LoadError::MissingColumn(columns.close.clone()))?;
    // volume is optional: indicators substitute their own default when absent
    let volume = df.column(&columns.volume).ok();

    let len = ts.len();
    if open.len() != len
        || high.len() != len
        || low.len() != len
        || close.len() != len
        || volume.is_some_and(|v| v.len() != len)
    {
        return Err(LoadError::LengthMismatch);
    }

    let mut candles = Vec::with_capacity(len);
    for idx in 0..len {
        let time = to_unix_seconds(ts.get(idx)?, idx)?;
        let open = to_f64(open.get(idx)?, &columns.open, idx)?;
        let high = to_f64(high.get(idx)?, &columns.high, idx)?;
        let low = to_f64(low.get(idx)?, &columns.low, idx)?;
        let close = to_f64(close.get(idx)?, &columns.close, idx)?;
        let volume = match volume {
            Some(col) => match col.get(idx)? {
                AnyValue::Null => None,
                value => Some(to_f64(value, &columns.volume, idx)?),
            },
            None => None,
        };

        if low > high {
            return Err(LoadError::InvertedRange { row: idx, low, high });
        }

        candles.push(Candle {
            time,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    Ok(candles)
}

fn to_unix_seconds(value: AnyValue, row: usize) -> Result<i64, LoadError> {
    match value {
        AnyValue::Datetime(ts, unit, _) => Ok(from_timestamp(ts, unit)),
        AnyValue::Date(days) => Ok(days as i64 * 86_400),
        AnyValue::Int64(secs) => Ok(secs),
        AnyValue::Int32(secs) => Ok(secs as i64),
        AnyValue::UInt64(secs) => i64::try_from(secs).map_err(|_| {
            LoadError::UnsupportedTimestamp {
                row,
                value: secs.to_string(),
            }
        }),
        AnyValue::String(s) => OffsetDateTime::parse(s, &Rfc3339)
            .map(|dt| dt.unix_timestamp())
            .or_else(|err| {
                s.trim().parse::<i64>().map_err(|_| LoadError::UnsupportedTimestamp {
                    row,
                    value: format!("{s} ({err})"),
                })
            }),
        AnyValue::StringOwned(s) => to_unix_seconds(AnyValue::String(&s), row),
        other => Err(LoadError::UnsupportedTimestamp {
            row,
            value: format!("{other:?}"),
        }),
    }
}

fn from_timestamp(value: i64, unit: TimeUnit) -> i64 {
    let per_second = match unit {
        TimeUnit::Nanoseconds => 1_000_000_000,
        TimeUnit::Microseconds => 1_000_000,
        TimeUnit::Milliseconds => 1_000,
    };
    value.div_euclid(per_second)
}

fn to_f64(value: AnyValue, column: &str, row: usize) -> Result<f64, LoadError> {
    match value {
        AnyValue::Float64(v) => Ok(v),
        AnyValue::Float32(v) => Ok(v as f64),
        AnyValue::Int64(v) => Ok(v as f64),
        AnyValue::Int32(v) => Ok(v as f64),
        AnyValue::UInt64(v) => Ok(v as f64),
        AnyValue::UInt32(v) => Ok(v as f64),
        AnyValue::String(s) => s.parse::<f64>().map_err(|_| LoadError::InvalidNumber {
            column: column.to_string(),
            row,
            value: s.to_string(),
        }),
        AnyValue::StringOwned(s) => to_f64(AnyValue::String(&s), column, row),
        other => Err(LoadError::InvalidNumber {
            column: column.to_string(),
            row,
            value: format!("{other:?}"),
        }),
    }
}
