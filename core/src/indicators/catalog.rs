//! The toggleable indicator set offered by the chart page.

use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::Candle;

use super::{
    Series, ad_line, adx, aroon, avg_price, awesome, bollinger, bop, cci, closes, high_low,
    stoch_rsi, supertrend,
};

/// Where an indicator is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pane {
    /// Overlaid on the price series.
    Main,
    /// The oscillator pane under the price chart.
    Oscillator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotStyle {
    Line,
    Histogram,
}

/// One rendered sub-series of an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Plot {
    /// Name of the computed line this plot reads.
    pub line: &'static str,
    pub style: PlotStyle,
    pub color: &'static str,
    pub width: u8,
    /// Multiplier applied to every value before display.
    pub scale: f64,
}

const fn line(line: &'static str, color: &'static str, width: u8) -> Plot {
    Plot {
        line,
        style: PlotStyle::Line,
        color,
        width,
        scale: 1.0,
    }
}

const fn histogram(line: &'static str, color: &'static str) -> Plot {
    Plot {
        line,
        style: PlotStyle::Histogram,
        color,
        width: 1,
        scale: 1.0,
    }
}

/// A numerical computation and its parameters. Several indicator keys can
/// share one computation (the Bollinger family, AO/AC), so this is what the
/// series cache is keyed on.
#[derive(Debug, Clone, Copy)]
pub enum Computation {
    HighLow { bars: usize },
    AvgPrice { period: usize },
    Bollinger { period: usize, mult: f64 },
    Adx { period: usize },
    Aroon { period: usize },
    AdLine,
    Bop,
    Cci { period: usize },
    StochRsi {
        rsi_period: usize,
        stoch_period: usize,
        d_period: usize,
    },
    Awesome,
    Supertrend { period: usize, multiplier: f64 },
}

impl Computation {
    fn fingerprint(&self) -> (u8, [u64; 3]) {
        match *self {
            Computation::HighLow { bars } => (0, [bars as u64, 0, 0]),
            Computation::AvgPrice { period } => (1, [period as u64, 0, 0]),
            Computation::Bollinger { period, mult } => (2, [period as u64, mult.to_bits(), 0]),
            Computation::Adx { period } => (3, [period as u64, 0, 0]),
            Computation::Aroon { period } => (4, [period as u64, 0, 0]),
            Computation::AdLine => (5, [0; 3]),
            Computation::Bop => (6, [0; 3]),
            Computation::Cci { period } => (7, [period as u64, 0, 0]),
            Computation::StochRsi {
                rsi_period,
                stoch_period,
                d_period,
            } => (8, [rsi_period as u64, stoch_period as u64, d_period as u64]),
            Computation::Awesome => (9, [0; 3]),
            Computation::Supertrend { period, multiplier } => {
                (10, [period as u64, multiplier.to_bits(), 0])
            }
        }
    }

    pub fn same_kind(&self, other: &Computation) -> bool {
        self.fingerprint().0 == other.fingerprint().0
    }

    pub fn compute(&self, candles: &[Candle]) -> ComputedSeries {
        let lines = match *self {
            Computation::HighLow { bars } => {
                let out = high_low(candles, bars);
                vec![("high", out.high), ("low", out.low)]
            }
            Computation::AvgPrice { period } => vec![("avg", avg_price(candles, period))],
            Computation::Bollinger { period, mult } => {
                let out = bollinger(&closes(candles), period, mult);
                vec![
                    ("ma", out.ma),
                    ("upper", out.upper),
                    ("lower", out.lower),
                    ("pct_b", out.pct_b),
                    ("width", out.width),
                ]
            }
            Computation::Adx { period } => {
                let out = adx(candles, period);
                vec![
                    ("plus_di", out.plus_di),
                    ("minus_di", out.minus_di),
                    ("adx", out.adx),
                ]
            }
            Computation::Aroon { period } => {
                let out = aroon(candles, period);
                vec![
                    ("up", out.up),
                    ("down", out.down),
                    ("oscillator", out.oscillator),
                ]
            }
            Computation::AdLine => vec![("ad", ad_line(candles))],
            Computation::Bop => vec![("bop", bop(candles))],
            Computation::Cci { period } => vec![("cci", cci(candles, period))],
            Computation::StochRsi {
                rsi_period,
                stoch_period,
                d_period,
            } => {
                let out = stoch_rsi(&closes(candles), rsi_period, stoch_period, d_period);
                vec![("k", out.k), ("d", out.d)]
            }
            Computation::Awesome => {
                let out = awesome(candles);
                vec![("ao", out.ao), ("ac", out.ac)]
            }
            Computation::Supertrend { period, multiplier } => {
                let out = supertrend(candles, period, multiplier);
                vec![("trend", out.trend), ("up", out.up), ("down", out.down)]
            }
        };
        ComputedSeries { lines }
    }
}

impl PartialEq for Computation {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint() == other.fingerprint()
    }
}

impl Eq for Computation {}

impl Hash for Computation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fingerprint().hash(state);
    }
}

/// Named output lines of one computation, all aligned to the input candles.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedSeries {
    lines: Vec<(&'static str, Series)>,
}

impl ComputedSeries {
    pub fn get(&self, name: &str) -> Option<&Series> {
        self.lines
            .iter()
            .find(|(line, _)| *line == name)
            .map(|(_, series)| series)
    }

    pub fn lines(&self) -> impl Iterator<Item = (&'static str, &Series)> {
        self.lines.iter().map(|(name, series)| (*name, series))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum IndicatorKey {
    #[serde(rename = "hi52")]
    HighLow52w,
    #[serde(rename = "avgprice")]
    AvgPrice,
    #[serde(rename = "bbands")]
    BollingerBands,
    #[serde(rename = "bb_pctb")]
    BollingerPctB,
    #[serde(rename = "bb_width")]
    BollingerWidth,
    #[serde(rename = "adx")]
    Adx,
    #[serde(rename = "aroon")]
    Aroon,
    #[serde(rename = "adline")]
    AdLine,
    #[serde(rename = "bop")]
    Bop,
    #[serde(rename = "cci")]
    Cci,
    #[serde(rename = "rsi_stoch")]
    StochRsi,
    #[serde(rename = "ao")]
    Awesome,
    #[serde(rename = "ac")]
    Accelerator,
    #[serde(rename = "supertrend")]
    Supertrend,
}

impl IndicatorKey {
    pub const ALL: [IndicatorKey; 14] = [
        IndicatorKey::HighLow52w,
        IndicatorKey::AvgPrice,
        IndicatorKey::BollingerBands,
        IndicatorKey::BollingerPctB,
        IndicatorKey::BollingerWidth,
        IndicatorKey::Adx,
        IndicatorKey::Aroon,
        IndicatorKey::AdLine,
        IndicatorKey::Bop,
        IndicatorKey::Cci,
        IndicatorKey::StochRsi,
        IndicatorKey::Awesome,
        IndicatorKey::Accelerator,
        IndicatorKey::Supertrend,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            IndicatorKey::HighLow52w => "hi52",
            IndicatorKey::AvgPrice => "avgprice",
            IndicatorKey::BollingerBands => "bbands",
            IndicatorKey::BollingerPctB => "bb_pctb",
            IndicatorKey::BollingerWidth => "bb_width",
            IndicatorKey::Adx => "adx",
            IndicatorKey::Aroon => "aroon",
            IndicatorKey::AdLine => "adline",
            IndicatorKey::Bop => "bop",
            IndicatorKey::Cci => "cci",
            IndicatorKey::StochRsi => "rsi_stoch",
            IndicatorKey::Awesome => "ao",
            IndicatorKey::Accelerator => "ac",
            IndicatorKey::Supertrend => "supertrend",
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|k| k.key().eq_ignore_ascii_case(raw))
    }

    pub fn label(&self) -> &'static str {
        match self {
            IndicatorKey::HighLow52w => "52 Week High/Low",
            IndicatorKey::AvgPrice => "Average Price",
            IndicatorKey::BollingerBands => "Bollinger Bands",
            IndicatorKey::BollingerPctB => "Bollinger %B",
            IndicatorKey::BollingerWidth => "Bollinger Width",
            IndicatorKey::Adx => "ADX (+DI/-DI)",
            IndicatorKey::Aroon => "Aroon (Up/Down/OSC)",
            IndicatorKey::AdLine => "Accumulation/Distribution",
            IndicatorKey::Bop => "Balance of Power",
            IndicatorKey::Cci => "CCI",
            IndicatorKey::StochRsi => "Stoch RSI",
            IndicatorKey::Awesome => "Awesome Oscillator",
            IndicatorKey::Accelerator => "Accelerator Oscillator",
            IndicatorKey::Supertrend => "Supertrend",
        }
    }

    pub fn pane(&self) -> Pane {
        match self {
            IndicatorKey::HighLow52w
            | IndicatorKey::AvgPrice
            | IndicatorKey::BollingerBands
            | IndicatorKey::Supertrend => Pane::Main,
            _ => Pane::Oscillator,
        }
    }

    /// Default parameters.
    pub fn computation(&self) -> Computation {
        match self {
            IndicatorKey::HighLow52w => Computation::HighLow { bars: 252 },
            IndicatorKey::AvgPrice => Computation::AvgPrice { period: 14 },
            IndicatorKey::BollingerBands
            | IndicatorKey::BollingerPctB
            | IndicatorKey::BollingerWidth => Computation::Bollinger {
                period: 20,
                mult: 2.0,
            },
            IndicatorKey::Adx => Computation::Adx { period: 14 },
            IndicatorKey::Aroon => Computation::Aroon { period: 25 },
            IndicatorKey::AdLine => Computation::AdLine,
            IndicatorKey::Bop => Computation::Bop,
            IndicatorKey::Cci => Computation::Cci { period: 20 },
            IndicatorKey::StochRsi => Computation::StochRsi {
                rsi_period: 14,
                stoch_period: 14,
                d_period: 3,
            },
            IndicatorKey::Awesome | IndicatorKey::Accelerator => Computation::Awesome,
            IndicatorKey::Supertrend => Computation::Supertrend {
                period: 10,
                multiplier: 3.0,
            },
        }
    }

    pub fn plots(&self) -> &'static [Plot] {
        const HI52: [Plot; 2] = [line("high", "#f59e0b", 1), line("low", "#10b981", 1)];
        const AVG: [Plot; 1] = [line("avg", "#3b82f6", 2)];
        const BBANDS: [Plot; 3] = [
            line("upper", "#0ea5e9", 1),
            line("ma", "#6366f1", 1),
            line("lower", "#0ea5e9", 1),
        ];
        const PCTB: [Plot; 1] = [Plot {
            scale: 100.0,
            ..line("pct_b", "#10b981", 2)
        }];
        const WIDTH: [Plot; 1] = [line("width", "#f59e0b", 2)];
        const ADX: [Plot; 3] = [
            line("plus_di", "#22c55e", 1),
            line("minus_di", "#ef4444", 1),
            line("adx", "#3b82f6", 2),
        ];
        const AROON: [Plot; 3] = [
            line("up", "#22c55e", 1),
            line("down", "#ef4444", 1),
            line("oscillator", "#6366f1", 2),
        ];
        const ADLINE: [Plot; 1] = [line("ad", "#0ea5e9", 2)];
        const BOP: [Plot; 1] = [histogram("bop", "#64748b")];
        const CCI: [Plot; 1] = [line("cci", "#f59e0b", 2)];
        const STOCH: [Plot; 2] = [line("k", "#22c55e", 2), line("d", "#3b82f6", 1)];
        const AO: [Plot; 1] = [histogram("ao", "#06b6d4")];
        const AC: [Plot; 1] = [histogram("ac", "#a78bfa")];
        const SUPERTREND: [Plot; 1] = [line("trend", "#22c55e", 2)];

        match self {
            IndicatorKey::HighLow52w => &HI52,
            IndicatorKey::AvgPrice => &AVG,
            IndicatorKey::BollingerBands => &BBANDS,
            IndicatorKey::BollingerPctB => &PCTB,
            IndicatorKey::BollingerWidth => &WIDTH,
            IndicatorKey::Adx => &ADX,
            IndicatorKey::Aroon => &AROON,
            IndicatorKey::AdLine => &ADLINE,
            IndicatorKey::Bop => &BOP,
            IndicatorKey::Cci => &CCI,
            IndicatorKey::StochRsi => &STOCH,
            IndicatorKey::Awesome => &AO,
            IndicatorKey::Accelerator => &AC,
            IndicatorKey::Supertrend => &SUPERTREND,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_round_trip() {
        for key in IndicatorKey::ALL {
            assert_eq!(IndicatorKey::from_key(key.key()), Some(key));
        }
        assert_eq!(IndicatorKey::from_key(" BBANDS "), Some(IndicatorKey::BollingerBands));
        assert_eq!(IndicatorKey::from_key("macd"), None);
    }

    #[test]
    fn plots_reference_computed_lines() {
        let candles: Vec<Candle> = (0..5).map(|i| Candle::flat(60 * i, 1.0)).collect();
        for key in IndicatorKey::ALL {
            let computed = key.computation().compute(&candles);
            for plot in key.plots() {
                assert!(
                    computed.get(plot.line).is_some(),
                    "{} plots missing line {}",
                    key.key(),
                    plot.line
                );
            }
        }
    }

    #[test]
    fn bollinger_family_shares_one_computation() {
        let distinct: HashSet<Computation> = IndicatorKey::ALL
            .iter()
            .map(IndicatorKey::computation)
            .collect();
        // bbands/bb_pctb/bb_width and ao/ac collapse
        assert_eq!(distinct.len(), 11);
    }

    #[test]
    fn parameters_distinguish_computations() {
        let a = Computation::Bollinger { period: 20, mult: 2.0 };
        let b = Computation::Bollinger { period: 20, mult: 2.5 };
        assert_ne!(a, b);
        assert!(a.same_kind(&b));
        assert!(!a.same_kind(&Computation::Bop));
    }
}
