//! Pure indicator transforms over candle sequences.
//!
//! Every function returns series aligned 1:1 with its input. A slot is `None`
//! until enough history exists; divisions by zero fall back to fixed values so
//! outputs stay finite.

pub mod catalog;
mod ma;
mod oscillators;
mod trend;
mod volatility;
mod volume;

pub use catalog::{Computation, ComputedSeries, IndicatorKey, Pane, Plot, PlotStyle};
pub use ma::{avg_price, ema, ema_dense, sma, sma_sparse};
pub use oscillators::{
    AroonOutput, AwesomeOutput, StochRsiOutput, aroon, awesome, bop, cci, rsi, stoch_rsi,
};
pub use trend::{AdxOutput, adx};
pub use volatility::{
    BollingerOutput, HighLowOutput, SupertrendOutput, atr, bollinger, high_low, supertrend,
    true_range,
};
pub use volume::ad_line;

use crate::{Candle, SeriesPoint};

/// One value per candle; `None` while the indicator is warming up.
pub type Series = Vec<Option<f64>>;

pub(crate) fn undefined(len: usize) -> Series {
    vec![None; len]
}

pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Pairs a series with candle times, dropping undefined slots.
pub fn to_points(candles: &[Candle], series: &[Option<f64>], scale: f64) -> Vec<SeriesPoint> {
    candles
        .iter()
        .zip(series)
        .filter_map(|(c, v)| {
            v.map(|value| SeriesPoint {
                time: c.time,
                value: value * scale,
            })
        })
        .collect()
}
