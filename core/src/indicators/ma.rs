use crate::Candle;

use super::{Series, undefined};

/// Simple moving average over a fully defined input, defined from `period - 1`.
pub fn sma(values: &[f64], period: usize) -> Series {
    let mut out = undefined(values.len());
    if period == 0 || values.len() < period {
        return out;
    }
    let mut sum = 0.0;
    for (i, v) in values.iter().enumerate() {
        sum += v;
        if i >= period {
            sum -= values[i - period];
        }
        if i + 1 >= period {
            out[i] = Some(sum / period as f64);
        }
    }
    out
}

/// Simple moving average over a sparse input. A value is produced only when
/// every sample in the trailing window is defined.
pub fn sma_sparse(values: &[Option<f64>], period: usize) -> Series {
    let mut out = undefined(values.len());
    if period == 0 || values.len() < period {
        return out;
    }
    let mut sum = 0.0;
    let mut defined = 0usize;
    for (i, v) in values.iter().enumerate() {
        if let Some(v) = v {
            sum += v;
            defined += 1;
        }
        if i >= period {
            if let Some(old) = values[i - period] {
                sum -= old;
                defined -= 1;
            }
        }
        if i + 1 >= period && defined == period {
            out[i] = Some(sum / period as f64);
        }
    }
    out
}

/// Exponential moving average with `k = 2 / (period + 1)`, seeded by the first
/// defined input. Undefined inputs are skipped and stay undefined.
///
/// Fewer than `period` defined inputs yields an all-undefined series.
pub fn ema(values: &[Option<f64>], period: usize) -> Series {
    let mut out = undefined(values.len());
    if period == 0 || values.iter().flatten().count() < period {
        return out;
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut prev: Option<f64> = None;
    for (i, v) in values.iter().enumerate() {
        let Some(v) = *v else { continue };
        let next = match prev {
            None => v,
            Some(p) => (v - p) * k + p,
        };
        prev = Some(next);
        out[i] = Some(next);
    }
    out
}

/// [`ema`] over a fully defined input.
pub fn ema_dense(values: &[f64], period: usize) -> Series {
    let sparse: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    ema(&sparse, period)
}

/// EMA of typical price (H + L + C) / 3.
pub fn avg_price(candles: &[Candle], period: usize) -> Series {
    let typical: Vec<f64> = candles.iter().map(Candle::typical).collect();
    ema_dense(&typical, period)
}
