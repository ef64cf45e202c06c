//! Chart types and the candle reshaping each one needs before display.

use serde::Serialize;

use crate::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Bars,
    #[default]
    Candles,
    HollowCandles,
    VolumeCandles,
    HlcBars,
    Line,
    LineWithMarkers,
    StepLine,
    Area,
    Baseline,
    Columns,
    HighLow,
    HeikinAshi,
    Renko,
    LineBreak,
    Kagi,
    PointAndFigure,
}

/// Menu sections, in display order.
pub const CHART_GROUPS: [(&str, &[ChartType]); 4] = [
    (
        "Bars / Candles",
        &[
            ChartType::Bars,
            ChartType::Candles,
            ChartType::HollowCandles,
            ChartType::VolumeCandles,
            ChartType::HlcBars,
        ],
    ),
    (
        "Lines",
        &[ChartType::Line, ChartType::LineWithMarkers, ChartType::StepLine],
    ),
    (
        "Areas / Columns / HL",
        &[
            ChartType::Area,
            ChartType::Baseline,
            ChartType::Columns,
            ChartType::HighLow,
        ],
    ),
    (
        "Price-transforms",
        &[
            ChartType::HeikinAshi,
            ChartType::Renko,
            ChartType::LineBreak,
            ChartType::Kagi,
            ChartType::PointAndFigure,
        ],
    ),
];

/// Reshaping applied to raw candles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTransform {
    None,
    HeikinAshi,
    HlcMidpoint,
}

/// What the renderer receives per bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesShape {
    Ohlc,
    /// Close only.
    Value,
}

/// Series constructor the renderer should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Candlestick,
    Bar,
    Line,
    Area,
    Baseline,
    Histogram,
}

impl ChartType {
    pub const ALL: [ChartType; 17] = [
        ChartType::Bars,
        ChartType::Candles,
        ChartType::HollowCandles,
        ChartType::VolumeCandles,
        ChartType::HlcBars,
        ChartType::Line,
        ChartType::LineWithMarkers,
        ChartType::StepLine,
        ChartType::Area,
        ChartType::Baseline,
        ChartType::Columns,
        ChartType::HighLow,
        ChartType::HeikinAshi,
        ChartType::Renko,
        ChartType::LineBreak,
        ChartType::Kagi,
        ChartType::PointAndFigure,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ChartType::Bars => "bars",
            ChartType::Candles => "candles",
            ChartType::HollowCandles => "hollow",
            ChartType::VolumeCandles => "vcandles",
            ChartType::HlcBars => "hlc",
            ChartType::Line => "line",
            ChartType::LineWithMarkers => "linemk",
            ChartType::StepLine => "step",
            ChartType::Area => "area",
            ChartType::Baseline => "baseline",
            ChartType::Columns => "columns",
            ChartType::HighLow => "highlow",
            ChartType::HeikinAshi => "heikin",
            ChartType::Renko => "renko",
            ChartType::LineBreak => "linebreak",
            ChartType::Kagi => "kagi",
            ChartType::PointAndFigure => "pnf",
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|t| t.key().eq_ignore_ascii_case(raw))
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartType::Bars => "Bars",
            ChartType::Candles => "Candles",
            ChartType::HollowCandles => "Hollow candles",
            ChartType::VolumeCandles => "Volume candles",
            ChartType::HlcBars => "HLC bars",
            ChartType::Line => "Line",
            ChartType::LineWithMarkers => "Line with markers",
            ChartType::StepLine => "Step line",
            ChartType::Area => "Area",
            ChartType::Baseline => "Baseline",
            ChartType::Columns => "Columns",
            ChartType::HighLow => "High-low",
            ChartType::HeikinAshi => "Heikin Ashi",
            ChartType::Renko => "Renko",
            ChartType::LineBreak => "Line break",
            ChartType::Kagi => "Kagi",
            ChartType::PointAndFigure => "Point & figure",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(
            self,
            ChartType::VolumeCandles
                | ChartType::Renko
                | ChartType::LineBreak
                | ChartType::Kagi
                | ChartType::PointAndFigure
        )
    }

    pub fn transform(&self) -> PriceTransform {
        match self {
            ChartType::HeikinAshi => PriceTransform::HeikinAshi,
            ChartType::HlcBars | ChartType::HighLow => PriceTransform::HlcMidpoint,
            _ => PriceTransform::None,
        }
    }

    pub fn series_kind(&self) -> SeriesKind {
        match self {
            ChartType::Bars | ChartType::HlcBars | ChartType::HighLow => SeriesKind::Bar,
            ChartType::Line | ChartType::LineWithMarkers | ChartType::StepLine => {
                SeriesKind::Line
            }
            ChartType::Area => SeriesKind::Area,
            ChartType::Baseline => SeriesKind::Baseline,
            ChartType::Columns => SeriesKind::Histogram,
            _ => SeriesKind::Candlestick,
        }
    }

    pub fn shape(&self) -> SeriesShape {
        match self.series_kind() {
            SeriesKind::Candlestick | SeriesKind::Bar => SeriesShape::Ohlc,
            _ => SeriesShape::Value,
        }
    }
}

impl PriceTransform {
    pub fn apply(&self, candles: &[Candle]) -> Vec<Candle> {
        match self {
            PriceTransform::None => candles.to_vec(),
            PriceTransform::HeikinAshi => heikin_ashi(candles),
            PriceTransform::HlcMidpoint => hlc_bars(candles),
        }
    }
}

pub fn heikin_ashi(candles: &[Candle]) -> Vec<Candle> {
    let mut out: Vec<Candle> = Vec::with_capacity(candles.len());
    for c in candles {
        let close = (c.open + c.high + c.low + c.close) / 4.0;
        let open = match out.last() {
            Some(prev) => (prev.open + prev.close) / 2.0,
            None => (c.open + c.close) / 2.0,
        };
        out.push(Candle {
            time: c.time,
            open,
            high: c.high.max(open).max(close),
            low: c.low.min(open).min(close),
            close,
            volume: c.volume,
        });
    }
    out
}

/// Open and close collapse onto the bar midpoint; high/low stay.
pub fn hlc_bars(candles: &[Candle]) -> Vec<Candle> {
    candles
        .iter()
        .map(|c| {
            let mid = c.median();
            Candle {
                open: mid,
                close: mid,
                ..*c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heikin_ashi_of_flat_series_is_flat() {
        let candles: Vec<Candle> = (0..10).map(|i| Candle::flat(60 * i, 100.0)).collect();
        for c in heikin_ashi(&candles) {
            assert_eq!((c.open, c.high, c.low, c.close), (100.0, 100.0, 100.0, 100.0));
        }
    }

    #[test]
    fn heikin_ashi_hand_computed() {
        let candles = [
            Candle::new(60, 10.0, 14.0, 8.0, 12.0, 5.0),
            Candle::new(120, 12.0, 13.0, 11.0, 11.0, 6.0),
        ];
        let ha = heikin_ashi(&candles);
        assert_eq!(ha[0].close, 11.0);
        assert_eq!(ha[0].open, 11.0);
        assert_eq!(ha[0].high, 14.0);
        assert_eq!(ha[0].low, 8.0);
        // open' = (11 + 11) / 2, close' = 47 / 4
        assert_eq!(ha[1].open, 11.0);
        assert_eq!(ha[1].close, 11.75);
        assert_eq!(ha[1].high, 13.0);
        assert_eq!(ha[1].low, 11.0);
        assert_eq!(ha[1].volume, Some(6.0));
    }

    #[test]
    fn hlc_bars_use_midpoint() {
        let bars = hlc_bars(&[Candle::new(60, 1.0, 4.0, 2.0, 3.5, 0.0)]);
        assert_eq!((bars[0].open, bars[0].close), (3.0, 3.0));
        assert_eq!((bars[0].high, bars[0].low), (4.0, 2.0));
    }

    #[test]
    fn menu_covers_every_type_once() {
        let listed: Vec<ChartType> = CHART_GROUPS
            .iter()
            .flat_map(|(_, types)| types.iter().copied())
            .collect();
        assert_eq!(listed.len(), ChartType::ALL.len());
        for t in ChartType::ALL {
            assert!(listed.contains(&t));
            assert_eq!(ChartType::from_key(t.key()), Some(t));
        }
    }

    #[test]
    fn supported_types_and_shapes() {
        let supported = ChartType::ALL.iter().filter(|t| t.is_supported()).count();
        assert_eq!(supported, 12);
        assert_eq!(ChartType::HeikinAshi.transform(), PriceTransform::HeikinAshi);
        assert_eq!(ChartType::HeikinAshi.shape(), SeriesShape::Ohlc);
        assert_eq!(ChartType::Area.shape(), SeriesShape::Value);
        assert_eq!(ChartType::Columns.series_kind(), SeriesKind::Histogram);
        assert_eq!(ChartType::HighLow.transform(), PriceTransform::HlcMidpoint);
    }
}
