//! Versioned candle storage plus memoized indicator and chart-type outputs.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::indicators::{Computation, ComputedSeries};
use crate::transform::{ChartType, PriceTransform, SeriesShape};
use crate::{Candle, OhlcPoint, SeriesPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug)]
struct Entry {
    version: u64,
    series: Arc<ComputedSeries>,
}

/// Computed indicator series keyed by computation (which carries its
/// parameters) and validated against the data version they were built from.
#[derive(Debug, Default)]
pub struct SeriesCache {
    entries: HashMap<Computation, Entry>,
    stats: CacheStats,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &mut self,
        computation: Computation,
        version: u64,
        candles: &[Candle],
    ) -> Arc<ComputedSeries> {
        if let Some(entry) = self.entries.get(&computation) {
            if entry.version == version {
                self.stats.hits += 1;
                debug!(?computation, version, "series cache hit");
                return Arc::clone(&entry.series);
            }
        }

        self.stats.misses += 1;
        debug!(?computation, version, bars = candles.len(), "computing series");
        let series = Arc::new(computation.compute(candles));
        self.entries.insert(
            computation,
            Entry {
                version,
                series: Arc::clone(&series),
            },
        );
        self.stats.entries = self.entries.len();
        series
    }

    /// Drops entries whose computation is no longer wanted.
    pub fn retain(&mut self, mut keep: impl FnMut(&Computation) -> bool) {
        self.entries.retain(|computation, _| keep(computation));
        self.stats.entries = self.entries.len();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.entries = 0;
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

/// Result of merging one streamed bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Same time as the last bar: the in-progress bar was replaced.
    Replaced,
    Appended,
    /// Older than the last bar or malformed.
    Ignored,
}

/// Price series in the shape the active chart type expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", content = "points", rename_all = "snake_case")]
pub enum PriceView {
    Ohlc(Vec<OhlcPoint>),
    Value(Vec<SeriesPoint>),
}

impl PriceView {
    pub fn len(&self) -> usize {
        match self {
            PriceView::Ohlc(points) => points.len(),
            PriceView::Value(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
struct Display {
    version: u64,
    transform: PriceTransform,
    candles: Arc<Vec<Candle>>,
}

/// The raw candle sequence of one chart plus its display transform.
///
/// Every change to the sequence bumps `version`, which is what downstream
/// caches compare against.
#[derive(Debug, Default)]
pub struct ChartData {
    candles: Vec<Candle>,
    version: u64,
    chart_type: ChartType,
    display: Option<Display>,
}

impl ChartData {
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            ..Self::default()
        }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn chart_type(&self) -> ChartType {
        self.chart_type
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn set_chart_type(&mut self, chart_type: ChartType) {
        self.chart_type = chart_type;
    }

    /// Replaces the whole sequence. Callers validate first.
    pub fn set_candles(&mut self, candles: Vec<Candle>) {
        self.candles = candles;
        self.version += 1;
    }

    pub fn clear(&mut self) {
        self.set_candles(Vec::new());
    }

    pub fn apply_update(&mut self, candle: Candle) -> UpdateOutcome {
        if candle.low > candle.high || candle.volume.is_some_and(|v| v < 0.0) {
            warn!(time = candle.time, "ignoring malformed candle update");
            return UpdateOutcome::Ignored;
        }
        let outcome = match self.candles.last_mut() {
            Some(last) if last.time == candle.time => {
                *last = candle;
                UpdateOutcome::Replaced
            }
            Some(last) if candle.time < last.time => {
                warn!(
                    time = candle.time,
                    last = last.time,
                    "ignoring candle update older than the last bar"
                );
                return UpdateOutcome::Ignored;
            }
            _ => {
                self.candles.push(candle);
                UpdateOutcome::Appended
            }
        };
        self.version += 1;
        outcome
    }

    /// Candles after the chart type's transform, rebuilt only when the data
    /// version or the transform changed.
    pub fn display_candles(&mut self) -> Arc<Vec<Candle>> {
        let transform = self.chart_type.transform();
        if let Some(display) = &self.display {
            if display.version == self.version && display.transform == transform {
                return Arc::clone(&display.candles);
            }
        }
        debug!(?transform, version = self.version, "rebuilding display candles");
        let candles = Arc::new(transform.apply(&self.candles));
        self.display = Some(Display {
            version: self.version,
            transform,
            candles: Arc::clone(&candles),
        });
        candles
    }

    pub fn price_view(&mut self) -> PriceView {
        let shape = self.chart_type.shape();
        let candles = self.display_candles();
        match shape {
            SeriesShape::Ohlc => PriceView::Ohlc(candles.iter().map(OhlcPoint::from).collect()),
            SeriesShape::Value => PriceView::Value(
                candles
                    .iter()
                    .map(|c| SeriesPoint {
                        time: c.time,
                        value: c.close,
                    })
                    .collect(),
            ),
        }
    }

    /// Volume histogram; bars without volume report 0.
    pub fn volume_view(&self) -> Vec<SeriesPoint> {
        self.candles
            .iter()
            .map(|c| SeriesPoint {
                time: c.time,
                value: c.volume_or(0.0),
            })
            .collect()
    }
}
