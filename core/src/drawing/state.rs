//! Pointer-driven drawing state.

use tracing::debug;

use crate::coords::{ChartPoint, CoordinateMapper};

use super::types::{Drawing, DrawingId, DrawingTool};

/// All drawings of one chart plus the in-progress one.
///
/// The drawing being edited is tracked by id in `current`, never by its
/// position in `drawings`.
#[derive(Debug, Default)]
pub struct DrawingOverlay {
    tool: Option<DrawingTool>,
    /// Creation order.
    drawings: Vec<Drawing>,
    current: Option<DrawingId>,
    dragging: bool,
    next_id: u64,
}

impl DrawingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> Option<DrawingTool> {
        self.tool
    }

    /// Switches tools. An unfinished drawing is left as it is and no longer
    /// receives points.
    pub fn set_tool(&mut self, tool: Option<DrawingTool>) {
        if let Some(current) = self.current_mut() {
            current.preview = None;
        }
        self.current = None;
        self.dragging = false;
        self.tool = tool;
    }

    pub fn drawings(&self) -> &[Drawing] {
        &self.drawings
    }

    pub fn len(&self) -> usize {
        self.drawings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawings.is_empty()
    }

    pub fn get(&self, id: DrawingId) -> Option<&Drawing> {
        self.drawings.iter().find(|d| d.id == id)
    }

    pub fn current(&self) -> Option<&Drawing> {
        self.get(self.current?)
    }

    fn current_mut(&mut self) -> Option<&mut Drawing> {
        let id = self.current?;
        self.drawings.iter_mut().find(|d| d.id == id)
    }

    /// Starts a drawing or commits the next anchor of the current one.
    /// Returns the drawing touched, `None` without an active tool.
    pub fn pointer_down(&mut self, point: ChartPoint) -> Option<DrawingId> {
        let tool = self.tool?;
        self.dragging = true;

        if let Some(current) = self.current_mut().filter(|d| d.tool == tool && !d.done) {
            current.points.push(point);
            current.preview = None;
            let id = current.id;
            if current.points.len() >= tool.anchors_required() {
                current.done = true;
                self.current = None;
                debug!(?id, ?tool, "drawing done");
            }
            return Some(id);
        }

        let id = DrawingId(self.next_id);
        self.next_id += 1;
        let mut drawing = Drawing::new(id, tool);
        drawing.points.push(point);
        if tool.anchors_required() == 1 {
            drawing.done = true;
            self.current = None;
            debug!(?id, ?tool, "drawing done");
        } else {
            self.current = Some(id);
        }
        self.drawings.push(drawing);
        Some(id)
    }

    /// Replaces the preview point of the current drawing.
    pub fn pointer_move(&mut self, point: ChartPoint) -> bool {
        let Some(tool) = self.tool else { return false };
        let dragging = self.dragging;
        match self.current_mut() {
            Some(d) if d.tool == tool && !d.done && (d.points.len() == 1 || dragging) => {
                d.preview = Some(point);
                true
            }
            _ => false,
        }
    }

    /// Commits the preview when it completes the current drawing.
    pub fn pointer_up(&mut self) -> bool {
        self.dragging = false;
        let Some(tool) = self.tool else { return false };
        let Some(d) = self.current_mut() else { return false };
        if d.tool != tool || d.done {
            return false;
        }
        let pending = d.points.len() + usize::from(d.preview.is_some());
        if pending < tool.anchors_required() {
            return false;
        }
        if let Some(preview) = d.preview.take() {
            d.points.push(preview);
        }
        d.done = true;
        debug!(id = ?d.id, ?tool, "drawing done on release");
        self.current = None;
        true
    }

    /// Removes the most recently created drawing, finished or not.
    pub fn undo(&mut self) -> Option<Drawing> {
        let removed = self.drawings.pop()?;
        if self.current == Some(removed.id) {
            self.current = None;
            self.dragging = false;
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.drawings.clear();
        self.current = None;
        self.dragging = false;
    }

    /// Records the pixel each anchor currently resolves to, so anchors the
    /// scales later fail to resolve stay where they were last drawn.
    pub fn refresh_pixels(&mut self, mapper: &CoordinateMapper<'_>) {
        for drawing in &mut self.drawings {
            for point in drawing.points.iter_mut().chain(drawing.preview.iter_mut()) {
                point.px = mapper.point_to_pixel(point);
            }
        }
    }
}
