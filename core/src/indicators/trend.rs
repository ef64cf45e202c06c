use crate::Candle;

use super::ma::ema;
use super::{Series, undefined};

#[derive(Debug, Clone, PartialEq)]
pub struct AdxOutput {
    pub plus_di: Series,
    pub minus_di: Series,
    pub adx: Series,
}

/// Average directional index with +DI / -DI.
///
/// DM and TR are smoothed with a running Wilder sum seeded by the plain sum of
/// bars `1..=period`. ADX is the EMA of the defined DX values, written back to
/// the bars they came from.
pub fn adx(candles: &[Candle], period: usize) -> AdxOutput {
    let len = candles.len();
    let mut plus_dm = vec![0.0; len];
    let mut minus_dm = vec![0.0; len];
    let mut tr = vec![0.0; len];

    for i in 1..len {
        let (cur, prev) = (&candles[i], &candles[i - 1]);
        let up_move = cur.high - prev.high;
        let down_move = prev.low - cur.low;
        if up_move > down_move && up_move > 0.0 {
            plus_dm[i] = up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dm[i] = down_move;
        }
        let high_low = cur.high - cur.low;
        let high_close = (cur.high - prev.close).abs();
        let low_close = (cur.low - prev.close).abs();
        tr[i] = high_low.max(high_close).max(low_close);
    }

    let tr_s = wilder_sum(&tr, period);
    let plus_s = wilder_sum(&plus_dm, period);
    let minus_s = wilder_sum(&minus_dm, period);

    let mut plus_di = undefined(len);
    let mut minus_di = undefined(len);
    let mut dx = undefined(len);
    for i in 0..len {
        let (Some(range), Some(plus), Some(minus)) = (tr_s[i], plus_s[i], minus_s[i]) else {
            continue;
        };
        if range == 0.0 {
            continue;
        }
        let p = 100.0 * plus / range;
        let m = 100.0 * minus / range;
        plus_di[i] = Some(p);
        minus_di[i] = Some(m);
        dx[i] = Some(if p + m == 0.0 {
            0.0
        } else {
            100.0 * (p - m).abs() / (p + m)
        });
    }

    // ema skips the holes, so each ADX value continues from the last defined DX
    let adx = ema(&dx, period);

    AdxOutput {
        plus_di,
        minus_di,
        adx,
    }
}

fn wilder_sum(values: &[f64], period: usize) -> Series {
    let mut out = undefined(values.len());
    if period == 0 || values.len() <= period {
        return out;
    }
    let p = period as f64;
    let mut prev: f64 = values[1..=period].iter().sum();
    out[period] = Some(prev);
    for i in (period + 1)..values.len() {
        prev = prev - prev / p + values[i];
        out[i] = Some(prev);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::tests::{assert_close, assert_series, candles_from, flat_candles};

    fn rising(n: usize) -> Vec<Candle> {
        let rows: Vec<(f64, f64, f64, f64)> = (0..n)
            .map(|i| {
                let p = 10.0 + i as f64;
                (p, p + 1.0, p - 0.5, p + 0.5)
            })
            .collect();
        candles_from(&rows)
    }

    #[test]
    fn wilder_sum_seeds_with_plain_sum() {
        let out = wilder_sum(&[0.0, 1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(out[..2], [None, None]);
        assert_eq!(out[2], Some(3.0));
        assert_close(out[3].unwrap(), 3.0 - 1.5 + 3.0);
    }

    #[test]
    fn steady_uptrend_has_full_adx() {
        let out = adx(&rising(12), 3);
        assert!(out.plus_di[2].is_none());
        assert!(out.adx[2].is_none());
        for i in 3..12 {
            assert!(out.plus_di[i].unwrap() > 0.0);
            assert_eq!(out.minus_di[i], Some(0.0));
            assert_close(out.adx[i].unwrap(), 100.0);
        }
    }

    #[test]
    fn mixed_moves_match_hand_computed_values() {
        let candles = candles_from(&[
            (10.0, 11.0, 9.0, 10.0),
            (10.0, 12.0, 10.0, 11.0),
            (11.0, 11.5, 9.0, 10.0),
            (10.0, 13.0, 10.0, 12.0),
            (12.0, 12.5, 8.0, 9.0),
        ]);
        let out = adx(&candles, 2);
        // smoothed TR 4.5, 5.25, 7.125; +DM 1, 2, 1; -DM 1, 0.5, 2.25
        assert_series(
            &out.plus_di,
            &[None, None, Some(100.0 / 4.5), Some(200.0 / 5.25), Some(100.0 / 7.125)],
        );
        assert_series(
            &out.minus_di,
            &[None, None, Some(100.0 / 4.5), Some(50.0 / 5.25), Some(225.0 / 7.125)],
        );
        // DX 0, 60, 100 * 1.25 / 3.25 smoothed with k = 2/3
        let dx_last = 125.0 / 3.25;
        assert_series(
            &out.adx,
            &[None, None, Some(0.0), Some(40.0), Some(40.0 + (dx_last - 40.0) * 2.0 / 3.0)],
        );
    }

    #[test]
    fn zero_range_bar_leaves_a_hole_in_adx() {
        let candles = candles_from(&[
            (10.0, 11.0, 9.0, 10.0),
            (10.0, 12.0, 10.0, 11.0),
            (11.0, 11.0, 11.0, 11.0),
            (11.0, 12.0, 10.0, 10.0),
        ]);
        let out = adx(&candles, 1);
        assert_series(&out.plus_di, &[None, Some(50.0), None, Some(0.0)]);
        assert_series(&out.adx, &[None, Some(100.0), None, Some(0.0)]);
    }

    #[test]
    fn flat_series_degrades_to_undefined() {
        let out = adx(&flat_candles(30, 5.0), 14);
        assert!(out.plus_di.iter().all(Option::is_none));
        assert!(out.adx.iter().all(Option::is_none));
        assert_eq!(out.adx.len(), 30);
    }

    #[test]
    fn short_series_is_undefined() {
        let out = adx(&rising(10), 14);
        assert!(out.adx.iter().all(Option::is_none));
        assert_eq!(out.plus_di.len(), 10);
    }
}
