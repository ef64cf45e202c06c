//! Hand-drawn chart annotations.

mod geometry;
mod state;
mod types;

pub use geometry::{MARKER_RADIUS, Measurement, Shape, Stroke, drawing_shapes, overlay_shapes};
pub use state::DrawingOverlay;
pub use types::{Drawing, DrawingId, DrawingState, DrawingTool};
