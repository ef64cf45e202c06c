//! Pixel <-> (time, price) mapping for the plotting area.
//!
//! Two coordinate spaces are involved:
//!
//! - **Pixel** ([`PixelPos`]): position from the top-left of the plotting
//!   area. X grows right, Y grows down.
//! - **Chart** ([`ChartPoint`]): a bar time and a price.
//!
//! The scales may be unable to resolve a coordinate (outside the loaded
//! bars, degenerate price range). A [`ChartPoint`] therefore also keeps the
//! pixel it was last seen at, and [`CoordinateMapper::point_to_pixel`] falls
//! back to it per axis.

use serde::Serialize;

use crate::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PixelPos {
    pub x: f64,
    pub y: f64,
}

impl PixelPos {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of the plotting area in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn clamp(&self, pos: PixelPos) -> PixelPos {
        PixelPos {
            x: pos.x.clamp(0.0, self.width.max(0.0)),
            y: pos.y.clamp(0.0, self.height.max(0.0)),
        }
    }
}

/// An anchor in chart space with the last pixel it resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub time: Option<i64>,
    pub price: Option<f64>,
    pub px: PixelPos,
}

pub trait TimeScale {
    fn time_to_x(&self, time: i64) -> Option<f64>;
    fn x_to_time(&self, x: f64) -> Option<i64>;
}

pub trait PriceScale {
    fn price_to_y(&self, price: f64) -> Option<f64>;
    fn y_to_price(&self, y: f64) -> Option<f64>;
}

/// Evenly spaced bars; bar `i` is centered at `first_x + i * bar_spacing`.
/// Only times of loaded bars resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct BarTimeScale {
    times: Vec<i64>,
    first_x: f64,
    bar_spacing: f64,
}

impl BarTimeScale {
    pub fn new(times: Vec<i64>, bar_spacing: f64) -> Self {
        Self {
            times,
            first_x: bar_spacing / 2.0,
            bar_spacing,
        }
    }

    pub fn from_candles(candles: &[Candle], bar_spacing: f64) -> Self {
        Self::new(candles.iter().map(|c| c.time).collect(), bar_spacing)
    }

    pub fn bar_spacing(&self) -> f64 {
        self.bar_spacing
    }

    /// Spreads all bars across `width`.
    pub fn fit(&mut self, width: f64) {
        if self.times.is_empty() || width <= 0.0 {
            return;
        }
        self.bar_spacing = width / self.times.len() as f64;
        self.first_x = self.bar_spacing / 2.0;
    }

    pub fn pan(&mut self, dx: f64) {
        self.first_x += dx;
    }

    /// Scales bar spacing by `factor`, keeping the bar under `anchor_x` fixed.
    pub fn zoom(&mut self, factor: f64, anchor_x: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        self.first_x = anchor_x - (anchor_x - self.first_x) * factor;
        self.bar_spacing *= factor;
    }
}

impl TimeScale for BarTimeScale {
    fn time_to_x(&self, time: i64) -> Option<f64> {
        let idx = self.times.binary_search(&time).ok()?;
        Some(self.first_x + idx as f64 * self.bar_spacing)
    }

    fn x_to_time(&self, x: f64) -> Option<i64> {
        if self.bar_spacing <= 0.0 || !x.is_finite() {
            return None;
        }
        let idx = ((x - self.first_x) / self.bar_spacing).round();
        if idx < 0.0 {
            return None;
        }
        self.times.get(idx as usize).copied()
    }
}

/// Linear price axis: `top` maps to y = 0, `bottom` to y = `height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearPriceScale {
    top: f64,
    bottom: f64,
    height: f64,
}

/// Fraction of the price range added above and below when autoscaling.
pub const AUTOSCALE_MARGIN: f64 = 0.1;

impl LinearPriceScale {
    pub fn new(top: f64, bottom: f64, height: f64) -> Self {
        Self {
            top,
            bottom,
            height,
        }
    }

    /// Spans the lowest low / highest high of `candles` plus a margin.
    pub fn autoscale(candles: &[Candle], height: f64) -> Option<Self> {
        let (min, max) = bounds(candles)?;
        let span = if max > min {
            max - min
        } else {
            min.abs().max(1.0) * 0.01
        };
        let pad = span * AUTOSCALE_MARGIN;
        let (top, bottom) = if max > min {
            (max + pad, min - pad)
        } else {
            (max + span, min - span)
        };
        Some(Self::new(top, bottom, height))
    }

    pub fn range(&self) -> (f64, f64) {
        (self.bottom, self.top)
    }

    fn is_degenerate(&self) -> bool {
        !(self.height > 0.0 && self.top > self.bottom)
    }
}

impl PriceScale for LinearPriceScale {
    fn price_to_y(&self, price: f64) -> Option<f64> {
        if self.is_degenerate() || !price.is_finite() {
            return None;
        }
        Some((self.top - price) / (self.top - self.bottom) * self.height)
    }

    fn y_to_price(&self, y: f64) -> Option<f64> {
        if self.is_degenerate() || !y.is_finite() {
            return None;
        }
        Some(self.top - y / self.height * (self.top - self.bottom))
    }
}

/// Lowest low and highest high.
pub fn bounds(candles: &[Candle]) -> Option<(f64, f64)> {
    if candles.is_empty() {
        return None;
    }
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    for c in candles {
        min = min.min(c.low);
        max = max.max(c.high);
    }
    Some((min, max))
}

pub struct CoordinateMapper<'a> {
    time: &'a dyn TimeScale,
    price: &'a dyn PriceScale,
    viewport: Viewport,
}

impl<'a> CoordinateMapper<'a> {
    pub fn new(time: &'a dyn TimeScale, price: &'a dyn PriceScale, viewport: Viewport) -> Self {
        Self {
            time,
            price,
            viewport,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Clamps `pos` into the viewport and resolves it. Axes the scales
    /// cannot resolve stay `None`; the clamped pixel is always kept.
    pub fn pixel_to_point(&self, pos: PixelPos) -> ChartPoint {
        let px = self.viewport.clamp(pos);
        ChartPoint {
            time: self.time.x_to_time(px.x),
            price: self.price.y_to_price(px.y),
            px,
        }
    }

    /// Pixel of `point` under the current scales, or its remembered pixel
    /// when either axis fails to resolve.
    pub fn point_to_pixel(&self, point: &ChartPoint) -> PixelPos {
        let x = point.time.and_then(|t| self.time.time_to_x(t));
        let y = point.price.and_then(|p| self.price.price_to_y(p));
        match (x, y) {
            (Some(x), Some(y)) => PixelPos { x, y },
            _ => point.px,
        }
    }
}
