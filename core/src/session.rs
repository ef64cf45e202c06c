//! One chart page: candles for a symbol/timeframe, active indicators,
//! drawings, and the bookkeeping that keeps late network responses out.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;
use tracing::{info, warn};

use crate::cache::{ChartData, PriceView, SeriesCache, UpdateOutcome};
use crate::drawing::{Drawing, DrawingOverlay};
use crate::indicators::{Computation, IndicatorKey, Pane, PlotStyle, to_points};
use crate::transform::{ChartType, SeriesKind};
use crate::{Candle, ChartError, Interval, SeriesPoint, validate};

/// Bars generated when the backend has no history for a symbol.
pub const SEED_BARS: i64 = 60;
pub const SEED_PRICE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum LoadStatus {
    Loading,
    Live,
    Error(String),
}

/// Identifies one issued fetch. Only the most recently issued token is
/// accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Messages from the streaming feed.
#[derive(Debug, Clone, PartialEq)]
pub enum CandleUpdate {
    /// Full history; replaces the current candles.
    Bootstrap(Vec<Candle>),
    /// One bar, replacing the last bar at the same time or appended.
    Bar(Candle),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotView {
    pub line: &'static str,
    pub style: PlotStyle,
    pub color: &'static str,
    pub width: u8,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorView {
    pub key: IndicatorKey,
    pub label: &'static str,
    pub pane: Pane,
    pub plots: Vec<PlotView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSnapshot {
    pub symbol: String,
    pub interval: Interval,
    pub chart_type: ChartType,
    pub series_kind: SeriesKind,
    pub status: LoadStatus,
    pub last_price: Option<f64>,
    pub price: PriceView,
    pub volume: Vec<SeriesPoint>,
    pub indicators: Vec<IndicatorView>,
    pub drawings: Vec<Drawing>,
}

#[derive(Debug)]
pub struct ChartSession {
    symbol: String,
    interval: Interval,
    data: ChartData,
    cache: SeriesCache,
    active: BTreeMap<IndicatorKey, Computation>,
    overlay: DrawingOverlay,
    status: LoadStatus,
    issued: u64,
    mount: u64,
}

pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

impl ChartSession {
    pub fn new(symbol: &str, interval: Interval, chart_type: ChartType) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            interval,
            data: ChartData::new(chart_type),
            cache: SeriesCache::new(),
            active: BTreeMap::new(),
            overlay: DrawingOverlay::new(),
            status: LoadStatus::Loading,
            issued: 0,
            mount: 0,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn chart_type(&self) -> ChartType {
        self.data.chart_type()
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Bumped whenever the rendered chart must be torn down and rebuilt.
    pub fn mount(&self) -> u64 {
        self.mount
    }

    pub fn candles(&self) -> &[Candle] {
        self.data.candles()
    }

    pub fn last_price(&self) -> Option<f64> {
        self.data.last().map(|c| c.close)
    }

    pub fn overlay(&self) -> &DrawingOverlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut DrawingOverlay {
        &mut self.overlay
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    /// Issues a token for a new fetch; any older outstanding token goes stale.
    pub fn begin_request(&mut self) -> RequestToken {
        self.issued += 1;
        self.status = LoadStatus::Loading;
        RequestToken(self.issued)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.issued
    }

    /// Applies a fetch result. Returns whether it was accepted.
    ///
    /// Stale tokens are dropped. Failures and invalid payloads keep the
    /// candles already shown. An empty success seeds flat bars ending one
    /// timeframe before `now` (unix seconds).
    pub fn apply_fetch<E: Display>(
        &mut self,
        token: RequestToken,
        result: Result<Vec<Candle>, E>,
        now: i64,
    ) -> bool {
        if !self.is_current(token) {
            warn!(
                symbol = %self.symbol,
                token = token.0,
                latest = self.issued,
                "dropping stale fetch response"
            );
            return false;
        }
        let candles = match result {
            Ok(candles) if candles.is_empty() => {
                info!(symbol = %self.symbol, "no history, seeding flat candles");
                seed_candles(now, self.interval)
            }
            Ok(candles) => candles,
            Err(err) => {
                warn!(symbol = %self.symbol, error = %err, "fetch failed");
                self.status = LoadStatus::Error(err.to_string());
                return true;
            }
        };
        if let Err(err) = validate(&candles) {
            warn!(symbol = %self.symbol, error = %err, "rejecting malformed candles");
            self.status = LoadStatus::Error(err.to_string());
            return true;
        }
        info!(
            symbol = %self.symbol,
            interval = %self.interval,
            bars = candles.len(),
            "candles loaded"
        );
        self.data.set_candles(candles);
        self.status = LoadStatus::Live;
        true
    }

    pub fn apply_stream(&mut self, update: CandleUpdate) -> Option<UpdateOutcome> {
        match update {
            CandleUpdate::Bootstrap(candles) => {
                if let Err(err) = validate(&candles) {
                    warn!(symbol = %self.symbol, error = %err, "ignoring malformed bootstrap");
                    return None;
                }
                info!(symbol = %self.symbol, bars = candles.len(), "stream bootstrap");
                self.data.set_candles(candles);
                self.status = LoadStatus::Live;
                None
            }
            CandleUpdate::Bar(candle) => {
                let outcome = self.data.apply_update(candle);
                if outcome != UpdateOutcome::Ignored {
                    self.status = LoadStatus::Live;
                }
                Some(outcome)
            }
        }
    }

    /// Switches symbol. Clears the candles and invalidates in-flight fetches.
    pub fn set_symbol(&mut self, symbol: &str) -> bool {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() || symbol == self.symbol {
            return false;
        }
        self.symbol = symbol;
        self.reset_data();
        true
    }

    pub fn set_interval(&mut self, interval: Interval) -> bool {
        if interval == self.interval {
            return false;
        }
        self.interval = interval;
        self.reset_data();
        true
    }

    pub fn set_chart_type(&mut self, chart_type: ChartType) -> Result<bool, ChartError> {
        if !chart_type.is_supported() {
            return Err(ChartError::UnsupportedChartType(chart_type.key()));
        }
        if chart_type == self.data.chart_type() {
            return Ok(false);
        }
        self.data.set_chart_type(chart_type);
        self.remount();
        Ok(true)
    }

    fn reset_data(&mut self) {
        self.data.clear();
        self.cache.clear();
        self.issued += 1;
        self.status = LoadStatus::Loading;
        self.remount();
    }

    fn remount(&mut self) {
        self.mount += 1;
        info!(
            symbol = %self.symbol,
            interval = %self.interval,
            chart_type = self.data.chart_type().key(),
            mount = self.mount,
            "chart remount"
        );
    }

    /// Turns an indicator on with default parameters, or off. Returns
    /// whether it is now active.
    pub fn toggle_indicator(&mut self, key: IndicatorKey) -> bool {
        if self.active.remove(&key).is_some() {
            self.prune_cache();
            false
        } else {
            self.active.insert(key, key.computation());
            true
        }
    }

    pub fn is_active(&self, key: IndicatorKey) -> bool {
        self.active.contains_key(&key)
    }

    pub fn active_indicators(&self) -> impl Iterator<Item = IndicatorKey> + '_ {
        self.active.keys().copied()
    }

    /// Replaces the parameters of an indicator, activating it if needed.
    pub fn set_indicator_params(
        &mut self,
        key: IndicatorKey,
        computation: Computation,
    ) -> Result<(), ChartError> {
        if !key.computation().same_kind(&computation) {
            return Err(ChartError::MismatchedParameters(key.key()));
        }
        self.active.insert(key, computation);
        self.prune_cache();
        Ok(())
    }

    fn prune_cache(&mut self) {
        let wanted: Vec<Computation> = self.active.values().copied().collect();
        self.cache.retain(|c| wanted.contains(c));
    }

    /// Named series of every active indicator, computed on the raw candles.
    pub fn indicator_views(&mut self) -> Vec<IndicatorView> {
        let version = self.data.version();
        let candles = self.data.candles();
        let mut views = Vec::with_capacity(self.active.len());
        for (&key, &computation) in &self.active {
            let computed = self.cache.get_or_compute(computation, version, candles);
            let plots = key
                .plots()
                .iter()
                .filter_map(|plot| {
                    let series = computed.get(plot.line)?;
                    Some(PlotView {
                        line: plot.line,
                        style: plot.style,
                        color: plot.color,
                        width: plot.width,
                        points: to_points(candles, series, plot.scale),
                    })
                })
                .collect();
            views.push(IndicatorView {
                key,
                label: key.label(),
                pane: key.pane(),
                plots,
            });
        }
        views
    }

    pub fn price_view(&mut self) -> PriceView {
        self.data.price_view()
    }

    pub fn volume_view(&self) -> Vec<SeriesPoint> {
        self.data.volume_view()
    }

    pub fn snapshot(&mut self) -> ChartSnapshot {
        ChartSnapshot {
            symbol: self.symbol.clone(),
            interval: self.interval,
            chart_type: self.data.chart_type(),
            series_kind: self.data.chart_type().series_kind(),
            status: self.status.clone(),
            last_price: self.last_price(),
            price: self.price_view(),
            volume: self.volume_view(),
            indicators: self.indicator_views(),
            drawings: self.overlay.drawings().to_vec(),
        }
    }
}

/// Flat bars at [`SEED_PRICE`], one `interval` apart, the last one
/// `interval` before `now`.
pub fn seed_candles(now: i64, interval: Interval) -> Vec<Candle> {
    let step = interval.as_secs();
    (1..=SEED_BARS)
        .rev()
        .map(|i| Candle::flat(now - i * step, SEED_PRICE))
        .collect()
}
