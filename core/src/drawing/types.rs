//! Drawing records anchored in chart coordinates.

use serde::Serialize;

use crate::coords::ChartPoint;

/// Identifier of a drawing within one overlay; assigned in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DrawingId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingTool {
    Trend,
    Ray,
    Info,
    Extended,
    #[serde(rename = "hline")]
    HorizontalLine,
    #[serde(rename = "hray")]
    HorizontalRay,
    #[serde(rename = "vline")]
    VerticalLine,
    Cross,
}

impl DrawingTool {
    pub const ALL: [DrawingTool; 8] = [
        DrawingTool::Trend,
        DrawingTool::Ray,
        DrawingTool::Info,
        DrawingTool::Extended,
        DrawingTool::HorizontalLine,
        DrawingTool::HorizontalRay,
        DrawingTool::VerticalLine,
        DrawingTool::Cross,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            DrawingTool::Trend => "trend",
            DrawingTool::Ray => "ray",
            DrawingTool::Info => "info",
            DrawingTool::Extended => "extended",
            DrawingTool::HorizontalLine => "hline",
            DrawingTool::HorizontalRay => "hray",
            DrawingTool::VerticalLine => "vline",
            DrawingTool::Cross => "cross",
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|t| t.key().eq_ignore_ascii_case(raw))
    }

    pub fn label(&self) -> &'static str {
        match self {
            DrawingTool::Trend => "Trend Line",
            DrawingTool::Ray => "Ray",
            DrawingTool::Info => "Info Line",
            DrawingTool::Extended => "Extended Line",
            DrawingTool::HorizontalLine => "Horizontal Line",
            DrawingTool::HorizontalRay => "Horizontal Ray",
            DrawingTool::VerticalLine => "Vertical Line",
            DrawingTool::Cross => "Cross Line",
        }
    }

    pub fn hotkey(&self) -> Option<&'static str> {
        match self {
            DrawingTool::Trend => Some("Alt+T"),
            DrawingTool::HorizontalLine => Some("Alt+H"),
            DrawingTool::HorizontalRay => Some("Alt+J"),
            DrawingTool::VerticalLine => Some("Alt+V"),
            DrawingTool::Cross => Some("Alt+C"),
            _ => None,
        }
    }

    /// Resolves a hotkey such as `"alt+h"`.
    pub fn from_hotkey(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.hotkey().is_some_and(|k| k.eq_ignore_ascii_case(raw)))
    }

    /// Points a drawing of this tool holds once done.
    pub fn anchors_required(&self) -> usize {
        match self {
            DrawingTool::HorizontalLine
            | DrawingTool::HorizontalRay
            | DrawingTool::VerticalLine
            | DrawingTool::Cross => 1,
            DrawingTool::Trend | DrawingTool::Ray | DrawingTool::Info | DrawingTool::Extended => 2,
        }
    }
}

/// A drawing is created with its first anchor, so it is never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingState {
    /// One committed point, no preview yet.
    Anchoring,
    /// Committed points plus an uncommitted preview point.
    Previewing,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drawing {
    pub(crate) id: DrawingId,
    pub(crate) tool: DrawingTool,
    pub(crate) points: Vec<ChartPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) preview: Option<ChartPoint>,
    pub(crate) done: bool,
}

impl Drawing {
    pub(crate) fn new(id: DrawingId, tool: DrawingTool) -> Self {
        Self {
            id,
            tool,
            points: Vec::with_capacity(tool.anchors_required()),
            preview: None,
            done: false,
        }
    }

    pub fn id(&self) -> DrawingId {
        self.id
    }

    pub fn tool(&self) -> DrawingTool {
        self.tool
    }

    /// Committed anchors.
    pub fn points(&self) -> &[ChartPoint] {
        &self.points
    }

    pub fn preview(&self) -> Option<&ChartPoint> {
        self.preview.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn state(&self) -> DrawingState {
        if self.done {
            DrawingState::Done
        } else if self.preview.is_some() {
            DrawingState::Previewing
        } else {
            DrawingState::Anchoring
        }
    }

    /// Committed anchors followed by the preview point, if any.
    pub fn render_points(&self) -> impl Iterator<Item = &ChartPoint> {
        self.points.iter().chain(self.preview.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_catalog() {
        for tool in DrawingTool::ALL {
            assert_eq!(DrawingTool::from_key(tool.key()), Some(tool));
        }
        assert_eq!(DrawingTool::from_hotkey("alt+j"), Some(DrawingTool::HorizontalRay));
        assert_eq!(DrawingTool::Ray.hotkey(), None);
        let single: Vec<&str> = DrawingTool::ALL
            .iter()
            .filter(|t| t.anchors_required() == 1)
            .map(DrawingTool::key)
            .collect();
        assert_eq!(single, ["hline", "hray", "vline", "cross"]);
    }
}
