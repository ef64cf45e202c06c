//! Pixel geometry for drawings, handed to an external renderer.

use serde::Serialize;

use crate::coords::{ChartPoint, CoordinateMapper, PixelPos, Viewport};

use super::state::DrawingOverlay;
use super::types::{Drawing, DrawingTool};

/// Slopes flatter than this in x are treated as vertical.
const VERTICAL_EPS: f64 = 1e-6;
pub const MARKER_RADIUS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stroke {
    Solid,
    Dashed,
}

/// Values reported by the info line between its two anchors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub price_change: Option<f64>,
    pub percent_change: Option<f64>,
    pub elapsed_secs: Option<i64>,
}

impl Measurement {
    fn between(a: &ChartPoint, b: &ChartPoint) -> Self {
        let price_change = a.price.zip(b.price).map(|(p0, p1)| p1 - p0);
        let percent_change = a
            .price
            .zip(price_change)
            .filter(|(p0, _)| *p0 != 0.0)
            .map(|(p0, dp)| dp / p0 * 100.0);
        Self {
            price_change,
            percent_change,
            elapsed_secs: a.time.zip(b.time).map(|(t0, t1)| t1 - t0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Line {
        from: PixelPos,
        to: PixelPos,
        stroke: Stroke,
    },
    Marker {
        at: PixelPos,
        radius: f64,
    },
    Label {
        at: PixelPos,
        measurement: Measurement,
    },
}

/// Shapes for every drawing of the overlay, in creation order. Only the
/// drawing being edited gets an anchor marker.
pub fn overlay_shapes(overlay: &DrawingOverlay, mapper: &CoordinateMapper<'_>) -> Vec<Shape> {
    let editing = overlay
        .tool()
        .and(overlay.current())
        .map(Drawing::id);
    overlay
        .drawings()
        .iter()
        .flat_map(|d| drawing_shapes(d, mapper, editing == Some(d.id())))
        .collect()
}

/// `editing` marks the drawing that still receives points; a lone anchor of
/// it is shown as a marker.
pub fn drawing_shapes(
    drawing: &Drawing,
    mapper: &CoordinateMapper<'_>,
    editing: bool,
) -> Vec<Shape> {
    let vp = mapper.viewport();
    let anchors: Vec<&ChartPoint> = drawing.render_points().collect();
    let p: Vec<PixelPos> = anchors.iter().map(|pt| mapper.point_to_pixel(pt)).collect();
    let mut shapes = Vec::new();
    let Some(&p0) = p.first() else {
        return shapes;
    };
    let p1 = p.get(1).copied();

    match (drawing.tool(), p1) {
        (DrawingTool::Trend, Some(p1)) => shapes.push(line(p0, p1, Stroke::Solid)),
        (DrawingTool::Info, Some(p1)) => {
            shapes.push(line(p0, p1, Stroke::Solid));
            shapes.push(Shape::Label {
                at: p1,
                measurement: Measurement::between(anchors[0], anchors[1]),
            });
        }
        (DrawingTool::Ray, Some(p1)) => shapes.extend(through(p0, p1, vp, Stroke::Solid)),
        (DrawingTool::Extended, Some(p1)) => shapes.extend(through(p0, p1, vp, Stroke::Dashed)),
        (DrawingTool::HorizontalLine, _) => {
            shapes.push(line(
                PixelPos::new(0.0, p0.y),
                PixelPos::new(vp.width, p0.y),
                Stroke::Solid,
            ));
        }
        (DrawingTool::HorizontalRay, p1) => {
            // rightwards unless a second point says otherwise
            let edge = match p1 {
                Some(p1) if p1.x < p0.x => 0.0,
                _ => vp.width,
            };
            shapes.push(line(p0, PixelPos::new(edge, p0.y), Stroke::Solid));
        }
        (DrawingTool::VerticalLine, _) => {
            shapes.push(line(
                PixelPos::new(p0.x, 0.0),
                PixelPos::new(p0.x, vp.height),
                Stroke::Solid,
            ));
        }
        (DrawingTool::Cross, _) => {
            shapes.push(line(
                PixelPos::new(0.0, p0.y),
                PixelPos::new(vp.width, p0.y),
                Stroke::Dashed,
            ));
            shapes.push(line(
                PixelPos::new(p0.x, 0.0),
                PixelPos::new(p0.x, vp.height),
                Stroke::Dashed,
            ));
        }
        _ => {}
    }

    if !drawing.is_done() && p.len() == 1 && editing {
        shapes.push(Shape::Marker {
            at: p0,
            radius: MARKER_RADIUS,
        });
    }
    shapes
}

fn line(from: PixelPos, to: PixelPos, stroke: Stroke) -> Shape {
    Shape::Line { from, to, stroke }
}

/// The line through `a` and `b` across the whole viewport.
fn through(a: PixelPos, b: PixelPos, vp: Viewport, stroke: Stroke) -> Option<Shape> {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    if dx.abs() < VERTICAL_EPS {
        return Some(vertical(a.x, vp, stroke));
    }
    let m = dy / dx;
    let from = PixelPos::new(0.0, a.y - m * a.x);
    let to = PixelPos::new(vp.width, a.y + m * (vp.width - a.x));
    clip(from, to, vp).map(|(from, to)| line(from, to, stroke))
}

fn vertical(x: f64, vp: Viewport, stroke: Stroke) -> Shape {
    line(PixelPos::new(x, 0.0), PixelPos::new(x, vp.height), stroke)
}

/// Liang-Barsky clip of a segment to the viewport rectangle.
fn clip(from: PixelPos, to: PixelPos, vp: Viewport) -> Option<(PixelPos, PixelPos)> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-dx, from.x),
        (dx, vp.width - from.x),
        (-dy, from.y),
        (dy, vp.height - from.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    let at = |t: f64| PixelPos::new(from.x + t * dx, from.y + t * dy);
    Some((at(t0), at(t1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{BarTimeScale, LinearPriceScale};

    struct Fixture {
        time: BarTimeScale,
        price: LinearPriceScale,
    }

    impl Fixture {
        // bars every 10px from x = 5, prices 0..100 over 100px
        fn new() -> Self {
            Self {
                time: BarTimeScale::new((1..=10).map(|i| i * 60).collect(), 10.0),
                price: LinearPriceScale::new(100.0, 0.0, 100.0),
            }
        }

        fn mapper(&self) -> CoordinateMapper<'_> {
            CoordinateMapper::new(&self.time, &self.price, Viewport::new(100.0, 100.0))
        }
    }

    fn drawn(tool: DrawingTool, pixels: &[(f64, f64)], mapper: &CoordinateMapper<'_>) -> Drawing {
        let mut overlay = DrawingOverlay::new();
        overlay.set_tool(Some(tool));
        for &(x, y) in pixels {
            overlay.pointer_down(mapper.pixel_to_point(PixelPos::new(x, y)));
        }
        overlay.drawings()[0].clone()
    }

    fn only_line(shapes: &[Shape]) -> (PixelPos, PixelPos, Stroke) {
        match shapes {
            [Shape::Line { from, to, stroke }] => (*from, *to, *stroke),
            other => panic!("expected one line, got {other:?}"),
        }
    }

    #[test]
    fn trend_is_a_segment() {
        let f = Fixture::new();
        let m = f.mapper();
        let d = drawn(DrawingTool::Trend, &[(15.0, 20.0), (45.0, 60.0)], &m);
        let (from, to, stroke) = only_line(&drawing_shapes(&d, &m, true));
        assert_eq!((from, to), (PixelPos::new(15.0, 20.0), PixelPos::new(45.0, 60.0)));
        assert_eq!(stroke, Stroke::Solid);
    }

    fn assert_px(actual: PixelPos, x: f64, y: f64) {
        assert!(
            (actual.x - x).abs() < 1e-9 && (actual.y - y).abs() < 1e-9,
            "expected ({x}, {y}), got {actual:?}"
        );
    }

    #[test]
    fn ray_spans_the_viewport_through_both_anchors() {
        let f = Fixture::new();
        let m = f.mapper();
        let flat = drawn(DrawingTool::Ray, &[(45.0, 50.0), (55.0, 50.0)], &m);
        let (from, to, stroke) = only_line(&drawing_shapes(&flat, &m, true));
        assert_px(from, 0.0, 50.0);
        assert_px(to, 100.0, 50.0);
        assert_eq!(stroke, Stroke::Solid);

        let rising = drawn(DrawingTool::Ray, &[(15.0, 10.0), (25.0, 20.0)], &m);
        let (from, to, _) = only_line(&drawing_shapes(&rising, &m, true));
        assert_px(from, 5.0, 0.0);
        assert_px(to, 100.0, 95.0);

        let up = drawn(DrawingTool::Ray, &[(25.0, 50.0), (25.0, 30.0)], &m);
        let (from, to, _) = only_line(&drawing_shapes(&up, &m, true));
        assert_px(from, 25.0, 0.0);
        assert_px(to, 25.0, 100.0);
    }

    #[test]
    fn steep_ray_is_clipped_top_and_bottom() {
        let f = Fixture::new();
        let m = f.mapper();
        let d = drawn(DrawingTool::Ray, &[(15.0, 10.0), (25.0, 40.0)], &m);
        let (from, to, _) = only_line(&drawing_shapes(&d, &m, true));
        assert_px(from, 35.0 / 3.0, 0.0);
        assert_px(to, 45.0, 100.0);
    }

    #[test]
    fn extended_spans_both_directions_dashed() {
        let f = Fixture::new();
        let m = f.mapper();
        let d = drawn(DrawingTool::Extended, &[(25.0, 30.0), (35.0, 30.0)], &m);
        let (from, to, stroke) = only_line(&drawing_shapes(&d, &m, true));
        assert_eq!((from, to), (PixelPos::new(0.0, 30.0), PixelPos::new(100.0, 30.0)));
        assert_eq!(stroke, Stroke::Dashed);
    }

    #[test]
    fn single_anchor_tools() {
        let f = Fixture::new();
        let m = f.mapper();

        let h = drawn(DrawingTool::HorizontalLine, &[(35.0, 40.0)], &m);
        let (from, to, _) = only_line(&drawing_shapes(&h, &m, true));
        assert_eq!((from, to), (PixelPos::new(0.0, 40.0), PixelPos::new(100.0, 40.0)));

        let v = drawn(DrawingTool::VerticalLine, &[(35.0, 40.0)], &m);
        let (from, to, _) = only_line(&drawing_shapes(&v, &m, true));
        assert_eq!((from, to), (PixelPos::new(35.0, 0.0), PixelPos::new(35.0, 100.0)));

        let hray = drawn(DrawingTool::HorizontalRay, &[(35.0, 40.0)], &m);
        let (from, to, _) = only_line(&drawing_shapes(&hray, &m, true));
        assert_eq!((from, to), (PixelPos::new(35.0, 40.0), PixelPos::new(100.0, 40.0)));

        let cross = drawn(DrawingTool::Cross, &[(35.0, 40.0)], &m);
        let shapes = drawing_shapes(&cross, &m, true);
        assert_eq!(shapes.len(), 2);
        assert!(shapes.iter().all(|s| matches!(s, Shape::Line { stroke: Stroke::Dashed, .. })));
    }

    #[test]
    fn info_line_reports_measurement() {
        let f = Fixture::new();
        let m = f.mapper();
        let d = drawn(DrawingTool::Info, &[(15.0, 50.0), (45.0, 40.0)], &m);
        let shapes = drawing_shapes(&d, &m, true);
        assert_eq!(shapes.len(), 2);
        match &shapes[1] {
            Shape::Label { measurement, .. } => {
                assert!((measurement.price_change.unwrap() - 10.0).abs() < 1e-9);
                assert!((measurement.percent_change.unwrap() - 20.0).abs() < 1e-9);
                assert_eq!(measurement.elapsed_secs, Some(180));
            }
            other => panic!("expected a label, got {other:?}"),
        }
    }

    #[test]
    fn unfinished_anchor_gets_marker_while_edited() {
        let f = Fixture::new();
        let m = f.mapper();
        let d = drawn(DrawingTool::Trend, &[(15.0, 50.0)], &m);
        assert!(matches!(
            drawing_shapes(&d, &m, true).as_slice(),
            [Shape::Marker { .. }]
        ));
        assert!(drawing_shapes(&d, &m, false).is_empty());
    }

    #[test]
    fn abandoned_anchor_loses_its_marker() {
        let f = Fixture::new();
        let m = f.mapper();
        let mut overlay = DrawingOverlay::new();
        overlay.set_tool(Some(DrawingTool::Trend));
        overlay.pointer_down(m.pixel_to_point(PixelPos::new(15.0, 50.0)));
        assert!(matches!(
            overlay_shapes(&overlay, &m).as_slice(),
            [Shape::Marker { .. }]
        ));

        overlay.set_tool(Some(DrawingTool::HorizontalLine));
        assert!(overlay_shapes(&overlay, &m).is_empty());
        overlay.pointer_down(m.pixel_to_point(PixelPos::new(35.0, 40.0)));
        assert!(matches!(
            overlay_shapes(&overlay, &m).as_slice(),
            [Shape::Line { .. }]
        ));
    }

    #[test]
    fn anchors_follow_pan() {
        let mut f = Fixture::new();
        let before = {
            let m = f.mapper();
            drawn(DrawingTool::VerticalLine, &[(35.0, 40.0)], &m)
        };
        f.time.pan(20.0);
        let (from, _, _) = only_line(&drawing_shapes(&before, &f.mapper(), true));
        assert_eq!(from.x, 55.0);
    }
}
