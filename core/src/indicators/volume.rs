use crate::Candle;

use super::Series;

/// Volume assumed for bars that carry none.
pub const DEFAULT_VOLUME: f64 = 1.0;

/// Accumulation/distribution line: running sum of money-flow multiplier times
/// volume. Bars with no range contribute nothing.
pub fn ad_line(candles: &[Candle]) -> Series {
    let mut cum = 0.0;
    candles
        .iter()
        .map(|c| {
            let mfm = if c.high == c.low {
                0.0
            } else {
                ((c.close - c.low) - (c.high - c.close)) / (c.high - c.low)
            };
            cum += mfm * c.volume_or(DEFAULT_VOLUME);
            Some(cum)
        })
        .collect()
}
