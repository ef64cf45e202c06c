use crate::Candle;

use super::ma::sma;
use super::{Series, undefined};

/// True range per bar. The first bar has no previous close, so only its
/// high-low range counts.
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, cur)| {
            let high_low = cur.high - cur.low;
            let (high_close, low_close) = match i.checked_sub(1).map(|p| &candles[p]) {
                Some(prev) => ((cur.high - prev.close).abs(), (cur.low - prev.close).abs()),
                None => (0.0, 0.0),
            };
            high_low.max(high_close).max(low_close)
        })
        .collect()
}

/// Average true range smoothed with `alpha = 1 / period`, defined from the
/// first bar.
pub fn atr(candles: &[Candle], period: usize) -> Series {
    let mut out = undefined(candles.len());
    if period == 0 || candles.len() < period {
        return out;
    }
    let alpha = 1.0 / period as f64;
    let mut prev: Option<f64> = None;
    for (i, tr) in true_range(candles).into_iter().enumerate() {
        let next = match prev {
            None => tr,
            Some(p) => p + alpha * (tr - p),
        };
        prev = Some(next);
        out[i] = Some(next);
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupertrendOutput {
    /// The active band: lower band while trending up, upper band while down.
    pub trend: Series,
    /// Final lower band.
    pub up: Series,
    /// Final upper band.
    pub down: Series,
}

pub fn supertrend(candles: &[Candle], period: usize, multiplier: f64) -> SupertrendOutput {
    let len = candles.len();
    let atr = atr(candles, period);
    let mut final_upper = undefined(len);
    let mut final_lower = undefined(len);
    let mut trend = undefined(len);

    let mut up_trend = true;
    for i in 0..len {
        let Some(range) = atr[i] else { continue };
        let c = &candles[i];
        let basic_upper = c.median() + multiplier * range;
        let basic_lower = c.median() - multiplier * range;

        let prev = i
            .checked_sub(1)
            .and_then(|p| Some((candles[p].close, final_upper[p]?, final_lower[p]?)));

        let (upper, lower) = match prev {
            None => (basic_upper, basic_lower),
            Some((prev_close, prev_upper, prev_lower)) => {
                // bands only tighten toward price unless the previous close broke through
                let upper = if basic_upper < prev_upper || prev_close > prev_upper {
                    basic_upper
                } else {
                    prev_upper
                };
                let lower = if basic_lower > prev_lower || prev_close < prev_lower {
                    basic_lower
                } else {
                    prev_lower
                };
                (upper, lower)
            }
        };
        final_upper[i] = Some(upper);
        final_lower[i] = Some(lower);

        if prev.is_none() {
            up_trend = true;
        } else {
            let test = if up_trend { lower } else { upper };
            if c.close > test {
                up_trend = true;
            } else if c.close < test {
                up_trend = false;
            }
        }
        trend[i] = Some(if up_trend { lower } else { upper });
    }

    SupertrendOutput {
        trend,
        up: final_lower,
        down: final_upper,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerOutput {
    pub ma: Series,
    pub upper: Series,
    pub lower: Series,
    pub pct_b: Series,
    pub width: Series,
}

/// Bollinger bands with a population standard deviation over the window.
///
/// `%B` is 0.5 when the bands collapse onto the mean; `width` divides by 1
/// when the mean is 0.
pub fn bollinger(closes: &[f64], period: usize, mult: f64) -> BollingerOutput {
    let len = closes.len();
    let ma = sma(closes, period);
    let mut upper = undefined(len);
    let mut lower = undefined(len);
    let mut pct_b = undefined(len);
    let mut width = undefined(len);

    for i in 0..len {
        let Some(mean) = ma[i] else { continue };
        let window = &closes[i + 1 - period..=i];
        let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
        let sd = variance.sqrt();
        let (u, l) = (mean + mult * sd, mean - mult * sd);
        upper[i] = Some(u);
        lower[i] = Some(l);
        pct_b[i] = Some(if u > l { (closes[i] - l) / (u - l) } else { 0.5 });
        width[i] = Some((u - l) / if mean == 0.0 { 1.0 } else { mean });
    }

    BollingerOutput {
        ma,
        upper,
        lower,
        pct_b,
        width,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighLowOutput {
    pub high: Series,
    pub low: Series,
}

/// Rolling highest high / lowest low over `bars`, with the window clipped at
/// the start of the series.
pub fn high_low(candles: &[Candle], bars: usize) -> HighLowOutput {
    let len = candles.len();
    let mut high = undefined(len);
    let mut low = undefined(len);
    if bars == 0 {
        return HighLowOutput { high, low };
    }
    for i in 0..len {
        let start = (i + 1).saturating_sub(bars);
        let window = &candles[start..=i];
        high[i] = window.iter().map(|c| c.high).reduce(f64::max);
        low[i] = window.iter().map(|c| c.low).reduce(f64::min);
    }
    HighLowOutput { high, low }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::tests::{assert_close, assert_series, candles_from, flat_candles};

    #[test]
    fn true_range_uses_previous_close() {
        let candles = candles_from(&[(10.0, 11.0, 9.0, 10.0), (13.0, 14.0, 12.5, 13.5)]);
        assert_eq!(true_range(&candles), vec![2.0, 4.0]);
    }

    #[test]
    fn atr_is_defined_from_first_bar() {
        let candles = candles_from(&[
            (10.0, 11.0, 9.0, 10.0),
            (13.0, 14.0, 12.5, 13.5),
            (13.0, 14.0, 13.0, 13.5),
        ]);
        // alpha = 0.5: 2, 2 + 0.5 * (4 - 2) = 3, 3 + 0.5 * (1 - 3) = 2
        assert_series(&atr(&candles, 2), &[Some(2.0), Some(3.0), Some(2.0)]);
        assert_eq!(atr(&candles, 5), vec![None, None, None]);
    }

    #[test]
    fn supertrend_flat_series_tracks_price() {
        let out = supertrend(&flat_candles(20, 100.0), 10, 3.0);
        for i in 0..20 {
            assert_close(out.trend[i].unwrap(), 100.0);
            assert_close(out.up[i].unwrap(), 100.0);
            assert_close(out.down[i].unwrap(), 100.0);
        }
    }

    #[test]
    fn supertrend_bands_match_hand_computed_values() {
        let candles = candles_from(&[
            (10.0, 11.0, 9.0, 10.0),
            (10.0, 12.0, 10.0, 11.0),
            (11.0, 11.5, 9.0, 9.5),
            (9.5, 10.0, 7.0, 7.5),
            (7.5, 9.0, 7.0, 8.5),
        ]);
        // ATR 2, 2, 2.25, 2.625, 2.3125
        let out = supertrend(&candles, 2, 1.0);
        assert_series(
            &out.up,
            &[Some(8.0), Some(9.0), Some(9.0), Some(9.0), Some(5.6875)],
        );
        assert_series(
            &out.down,
            &[Some(12.0), Some(12.0), Some(12.0), Some(11.125), Some(10.3125)],
        );
        assert_series(
            &out.trend,
            &[Some(8.0), Some(9.0), Some(9.0), Some(11.125), Some(10.3125)],
        );
    }

    #[test]
    fn supertrend_flips_down_on_collapse() {
        let mut rows: Vec<(f64, f64, f64, f64)> = (0..12)
            .map(|i| {
                let p = 100.0 + i as f64;
                (p, p + 1.0, p - 1.0, p + 0.5)
            })
            .collect();
        rows.push((110.0, 110.0, 80.0, 80.0));
        let candles = candles_from(&rows);
        let out = supertrend(&candles, 3, 1.0);

        let last = candles.len() - 1;
        // while rising the active band is the lower one
        assert_eq!(out.trend[last - 1], out.up[last - 1]);
        // the collapse closes under the lower band and switches to the upper one
        assert_eq!(out.trend[last], out.down[last]);
    }

    #[test]
    fn supertrend_lower_band_never_loosens_in_uptrend() {
        let rows: Vec<(f64, f64, f64, f64)> = (0..30)
            .map(|i| {
                let p = 100.0 + i as f64 * 0.5 + if i % 3 == 0 { 2.0 } else { 0.0 };
                (p, p + 1.5, p - 1.5, p + 0.2)
            })
            .collect();
        let candles = candles_from(&rows);
        let out = supertrend(&candles, 5, 2.0);
        for i in 1..candles.len() {
            let (prev, cur) = (out.up[i - 1].unwrap(), out.up[i].unwrap());
            if candles[i - 1].close >= prev {
                assert!(cur >= prev, "lower band moved down at {i}");
            }
        }
    }

    #[test]
    fn bollinger_band_ordering() {
        let closes: Vec<f64> = (0..60).map(|i| 50.0 + (i as f64 * 0.9).cos() * 5.0).collect();
        let out = bollinger(&closes, 20, 2.0);
        assert!(out.ma[18].is_none());
        for i in 19..closes.len() {
            let (l, m, u) = (out.lower[i].unwrap(), out.ma[i].unwrap(), out.upper[i].unwrap());
            assert!(l <= m && m <= u);
            let pct = out.pct_b[i].unwrap();
            assert_close(pct, (closes[i] - l) / (u - l));
        }
    }

    #[test]
    fn bollinger_constant_prices_stay_finite() {
        let out = bollinger(&[10.0; 25], 20, 2.0);
        for i in 19..25 {
            assert_eq!(out.pct_b[i], Some(0.5));
            assert_eq!(out.width[i], Some(0.0));
        }
        let zero = bollinger(&[0.0; 5], 3, 2.0);
        assert_eq!(zero.width[4], Some(0.0));
    }

    #[test]
    fn high_low_window_is_clipped_at_start() {
        let candles = candles_from(&[
            (1.0, 5.0, 1.0, 2.0),
            (2.0, 3.0, 0.5, 2.0),
            (2.0, 4.0, 2.0, 3.0),
            (3.0, 3.5, 2.5, 3.0),
        ]);
        let out = high_low(&candles, 2);
        assert_eq!(out.high, vec![Some(5.0), Some(5.0), Some(4.0), Some(4.0)]);
        assert_eq!(out.low, vec![Some(1.0), Some(0.5), Some(0.5), Some(2.0)]);
    }
}
