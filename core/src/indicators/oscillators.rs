use crate::Candle;

use super::ma::{sma, sma_sparse};
use super::{Series, undefined};

/// Wilder RSI. The first value sits at index `period` and uses the simple
/// average of the first `period` changes; a zero average loss is treated as
/// RS = 100.
pub fn rsi(closes: &[f64], period: usize) -> Series {
    let mut out = undefined(closes.len());
    if period == 0 || closes.len() <= period {
        return out;
    }
    let p = period as f64;
    let mut gain = 0.0;
    let mut loss = 0.0;
    for i in 1..closes.len() {
        let change = closes[i] - closes[i - 1];
        if i <= period {
            gain += change.max(0.0);
            loss += (-change).max(0.0);
            if i == period {
                gain /= p;
                loss /= p;
                out[i] = Some(rsi_value(gain, loss));
            }
        } else {
            gain = (gain * (p - 1.0) + change.max(0.0)) / p;
            loss = (loss * (p - 1.0) + (-change).max(0.0)) / p;
            out[i] = Some(rsi_value(gain, loss));
        }
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    let rs = if avg_loss == 0.0 { 100.0 } else { avg_gain / avg_loss };
    100.0 - 100.0 / (1.0 + rs)
}

#[derive(Debug, Clone, PartialEq)]
pub struct StochRsiOutput {
    pub k: Series,
    pub d: Series,
}

/// %K is the position of RSI inside its trailing `stoch_period` range (50 when
/// the range is empty); %D is the SMA of %K.
pub fn stoch_rsi(
    closes: &[f64],
    rsi_period: usize,
    stoch_period: usize,
    d_period: usize,
) -> StochRsiOutput {
    let rsi = rsi(closes, rsi_period);
    let mut k = undefined(closes.len());
    if stoch_period > 0 {
        for i in 0..closes.len() {
            let Some(current) = rsi[i] else { continue };
            let start = (i + 1).saturating_sub(stoch_period);
            let window: Vec<f64> = rsi[start..=i].iter().flatten().copied().collect();
            if window.len() < stoch_period {
                continue;
            }
            let min = window.iter().copied().fold(f64::INFINITY, f64::min);
            let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            k[i] = Some(if max == min {
                50.0
            } else {
                (current - min) / (max - min) * 100.0
            });
        }
    }
    let d = sma_sparse(&k, d_period);
    StochRsiOutput { k, d }
}

/// Commodity Channel Index over typical price. A window whose mean deviation
/// is zero reports 0.
pub fn cci(candles: &[Candle], period: usize) -> Series {
    let typical: Vec<f64> = candles.iter().map(Candle::typical).collect();
    let ma = sma(&typical, period);
    let mut out = undefined(candles.len());
    for i in 0..candles.len() {
        let Some(mean) = ma[i] else { continue };
        let window = &typical[i + 1 - period..=i];
        // a constant window has no deviation, whatever residue the running sum left
        let constant = window.iter().all(|v| *v == window[0]);
        let mean_dev = window.iter().map(|v| (v - mean).abs()).sum::<f64>() / period as f64;
        out[i] = Some(if constant || mean_dev == 0.0 {
            0.0
        } else {
            (typical[i] - mean) / (0.015 * mean_dev)
        });
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct AroonOutput {
    pub up: Series,
    pub down: Series,
    pub oscillator: Series,
}

/// Aroon over a `period`-bar window. Ties resolve to the most recent bar.
pub fn aroon(candles: &[Candle], period: usize) -> AroonOutput {
    let len = candles.len();
    let mut up = undefined(len);
    let mut down = undefined(len);
    let mut oscillator = undefined(len);
    if period == 0 {
        return AroonOutput {
            up,
            down,
            oscillator,
        };
    }
    let p = period as f64;
    for i in (period - 1)..len {
        let start = i + 1 - period;
        let (mut max_high, mut max_idx) = (f64::NEG_INFINITY, start);
        let (mut min_low, mut min_idx) = (f64::INFINITY, start);
        for (j, c) in candles.iter().enumerate().take(i + 1).skip(start) {
            if c.high >= max_high {
                max_high = c.high;
                max_idx = j;
            }
            if c.low <= min_low {
                min_low = c.low;
                min_idx = j;
            }
        }
        let u = (p - (i - max_idx) as f64) / p * 100.0;
        let d = (p - (i - min_idx) as f64) / p * 100.0;
        up[i] = Some(u);
        down[i] = Some(d);
        oscillator[i] = Some(u - d);
    }
    AroonOutput {
        up,
        down,
        oscillator,
    }
}

/// Balance of power; 0 on bars with no range.
pub fn bop(candles: &[Candle]) -> Series {
    candles
        .iter()
        .map(|c| {
            Some(if c.high != c.low {
                (c.close - c.open) / (c.high - c.low)
            } else {
                0.0
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct AwesomeOutput {
    pub ao: Series,
    pub ac: Series,
}

pub const AO_FAST: usize = 5;
pub const AO_SLOW: usize = 34;
pub const AC_SIGNAL: usize = 5;

/// Awesome oscillator on median price and the accelerator built from it.
pub fn awesome(candles: &[Candle]) -> AwesomeOutput {
    let median: Vec<f64> = candles.iter().map(Candle::median).collect();
    let fast = sma(&median, AO_FAST);
    let slow = sma(&median, AO_SLOW);
    let ao: Series = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal = sma_sparse(&ao, AC_SIGNAL);
    let ac = ao
        .iter()
        .zip(&signal)
        .map(|(a, s)| Some((*a)? - (*s)?))
        .collect();
    AwesomeOutput { ao, ac }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::tests::{assert_close, candles_from, flat_candles};

    #[test]
    fn rsi_first_value_at_period() {
        let closes = [1.0, 2.0, 1.0, 2.0, 3.0];
        let out = rsi(&closes, 2);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        // changes +1, -1: avg gain 0.5, avg loss 0.5 -> 50
        assert_close(out[2].unwrap(), 50.0);
        // gain (0.5 + 1) / 2 = 0.75, loss 0.25 -> RS 3 -> 75
        assert_close(out[3].unwrap(), 75.0);
    }

    #[test]
    fn rsi_without_losses_uses_rs_100() {
        let closes: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let out = rsi(&closes, 14);
        assert_close(out[14].unwrap(), 100.0 - 100.0 / 101.0);
        assert_eq!(rsi(&closes[..14], 14), vec![None; 14]);
    }

    #[test]
    fn stoch_rsi_flat_range_is_50() {
        let closes: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let out = stoch_rsi(&closes, 14, 14, 3);
        // RSI is constant once defined, so %K collapses to 50
        assert!(out.k[26].is_none());
        assert_eq!(out.k[27], Some(50.0));
        assert!(out.d[28].is_none());
        assert_close(out.d[29].unwrap(), 50.0);
    }

    #[test]
    fn stoch_rsi_bounds() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.37).sin() * 8.0).collect();
        let out = stoch_rsi(&closes, 14, 14, 3);
        for v in out.k.iter().chain(&out.d).flatten() {
            assert!((-1e-9..=100.0 + 1e-9).contains(v));
        }
    }

    #[test]
    fn cci_constant_prices_are_zero() {
        let out = cci(&flat_candles(30, 100.1), 20);
        assert!(out[18].is_none());
        for v in &out[19..] {
            assert_eq!(*v, Some(0.0));
        }
    }

    #[test]
    fn cci_resolves_tiny_moves_on_large_prices() {
        let base = 1_048_576.0;
        let step = 1.0 / 1024.0;
        let mut candles = flat_candles(3, base);
        candles[2] = Candle::flat(candles[2].time, base + step);
        // deviations d/3, d/3, 2d/3 around a mean of base + d/3
        let last = cci(&candles, 3)[2].unwrap();
        assert!((last - 100.0).abs() < 1e-3, "got {last}");
    }

    #[test]
    fn cci_hand_computed() {
        let candles = candles_from(&[
            (1.0, 1.0, 1.0, 1.0),
            (2.0, 2.0, 2.0, 2.0),
            (3.0, 3.0, 3.0, 3.0),
        ]);
        let out = cci(&candles, 3);
        // mean 2, mean deviation 2/3 -> (3 - 2) / (0.015 * 2/3) = 100
        assert_close(out[2].unwrap(), 100.0);
    }

    #[test]
    fn aroon_ties_prefer_latest_bar() {
        let candles = candles_from(&[
            (1.0, 5.0, 1.0, 1.0),
            (1.0, 5.0, 1.0, 1.0),
            (1.0, 4.0, 2.0, 1.0),
        ]);
        let out = aroon(&candles, 3);
        assert!(out.up[1].is_none());
        // highest high last seen at index 1, lowest low at index 1
        assert_close(out.up[2].unwrap(), (3.0 - 1.0) / 3.0 * 100.0);
        assert_close(out.down[2].unwrap(), (3.0 - 1.0) / 3.0 * 100.0);
        assert_close(out.oscillator[2].unwrap(), 0.0);
    }

    #[test]
    fn bop_handles_zero_range() {
        let candles = candles_from(&[(1.0, 3.0, 1.0, 2.0), (5.0, 5.0, 5.0, 5.0)]);
        assert_eq!(bop(&candles), vec![Some(0.5), Some(0.0)]);
    }

    #[test]
    fn awesome_warmup() {
        let candles = flat_candles(45, 10.0);
        let out = awesome(&candles);
        assert!(out.ao[32].is_none());
        assert_eq!(out.ao[33], Some(0.0));
        assert!(out.ac[36].is_none());
        assert_eq!(out.ac[37], Some(0.0));
    }
}
