use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Duration;

use crate::DataError;

/// One OHLCV bar. `time` is unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume: Some(volume),
        }
    }

    /// A bar with every price at `price` and zero volume.
    pub fn flat(time: i64, price: f64) -> Self {
        Self::new(time, price, price, price, price, 0.0)
    }

    /// (H + L + C) / 3
    pub fn typical(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// (H + L) / 2
    pub fn median(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    pub fn volume_or(&self, fallback: f64) -> f64 {
        self.volume.unwrap_or(fallback)
    }
}

/// Checks the sequence invariants: strictly increasing time, `low <= high`,
/// non-negative volume.
pub fn validate(candles: &[Candle]) -> Result<(), DataError> {
    for (row, c) in candles.iter().enumerate() {
        if c.low > c.high {
            return Err(DataError::InvertedRange {
                row,
                low: c.low,
                high: c.high,
            });
        }
        if let Some(volume) = c.volume {
            if volume < 0.0 {
                return Err(DataError::NegativeVolume { row, volume });
            }
        }
        if row > 0 && c.time <= candles[row - 1].time {
            return Err(DataError::NonIncreasingTime {
                row,
                prev: candles[row - 1].time,
                time: c.time,
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    Second(u32),
    Minute(u32),
    Hour(u32),
    Day(u32),
}

impl Interval {
    /// Timeframes offered by the market-data backend.
    pub const SUPPORTED: [Interval; 5] = [
        Interval::Minute(1),
        Interval::Minute(5),
        Interval::Minute(15),
        Interval::Hour(1),
        Interval::Day(1),
    ];

    pub fn as_duration(&self) -> Duration {
        match *self {
            Interval::Second(n) => Duration::seconds(n.into()),
            Interval::Minute(n) => Duration::minutes(n.into()),
            Interval::Hour(n) => Duration::hours(n.into()),
            Interval::Day(n) => Duration::days(n.into()),
        }
    }

    pub fn as_secs(&self) -> i64 {
        self.as_duration().whole_seconds()
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::Minute(1)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Interval::Second(n) => write!(f, "{n}s"),
            Interval::Minute(n) => write!(f, "{n}m"),
            Interval::Hour(n) => write!(f, "{n}h"),
            Interval::Day(n) => write!(f, "{n}d"),
        }
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim().to_ascii_lowercase();
        let Some(unit) = trimmed.chars().last() else {
            return Err("interval cannot be empty".into());
        };
        let number = &trimmed[..trimmed.len() - unit.len_utf8()];

        let amount: u32 = number
            .parse()
            .map_err(|_| format!("invalid interval amount: {number}"))?;
        if amount == 0 {
            return Err("interval amount must be positive".into());
        }

        match unit {
            's' => Ok(Interval::Second(amount)),
            'm' => Ok(Interval::Minute(amount)),
            'h' => Ok(Interval::Hour(amount)),
            'd' => Ok(Interval::Day(amount)),
            other => Err(format!("unsupported interval unit: {other} (use s/m/h/d)")),
        }
    }
}

impl Serialize for Interval {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A `{time, value}` pair handed to the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub time: i64,
    pub value: f64,
}

/// An OHLC bar handed to the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OhlcPoint {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl From<&Candle> for OhlcPoint {
    fn from(c: &Candle) -> Self {
        Self {
            time: c.time,
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_parse_and_display() {
        for raw in ["1m", "5m", "15m", "1h", "1d"] {
            let interval: Interval = raw.parse().unwrap();
            assert_eq!(interval.to_string(), raw);
        }
        assert_eq!("15m".parse::<Interval>().unwrap().as_secs(), 900);
        assert!("0m".parse::<Interval>().is_err());
        assert!("3w".parse::<Interval>().is_err());
        assert!("".parse::<Interval>().is_err());
    }

    #[test]
    fn interval_rejects_non_ascii_units() {
        for raw in ["1µ", "5分", "µ", "１m"] {
            assert!(raw.parse::<Interval>().is_err(), "{raw}");
        }
        assert_eq!(" 1H ".parse::<Interval>(), Ok(Interval::Hour(1)));
    }

    #[test]
    fn validate_rejects_duplicate_time() {
        let candles = [Candle::flat(60, 1.0), Candle::flat(60, 1.0)];
        match validate(&candles) {
            Err(DataError::NonIncreasingTime { row, .. }) => assert_eq!(row, 1),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let candles = [Candle::new(0, 1.0, 1.0, 2.0, 1.0, 0.0)];
        assert!(matches!(
            validate(&candles),
            Err(DataError::InvertedRange { row: 0, .. })
        ));
    }

    #[test]
    fn candle_volume_is_optional_on_the_wire() {
        let c: Candle =
            serde_json::from_str(r#"{"time":60,"open":1,"high":2,"low":0.5,"close":1.5}"#)
                .unwrap();
        assert_eq!(c.volume, None);
        assert_eq!(c.volume_or(1.0), 1.0);
        assert_eq!(c.median(), 1.25);
    }
}
