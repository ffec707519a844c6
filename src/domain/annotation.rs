//! Annotation step types for drawing on screenshots
//!
//! All coordinates are canvas-local logical coordinates. Each completed or
//! in-progress annotation is one `DrawStep`; replay order is paint order.

use crate::config::{FontSpec, ShapeColor};

/// Stroke style captured when a step is created
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PenStyle {
    pub color: ShapeColor,
    /// Stroke width in logical pixels
    pub width: u32,
}

impl PenStyle {
    pub fn new(color: ShapeColor, width: u32) -> Self {
        Self { color, width }
    }
}

/// One committed or pending annotation primitive
///
/// Styles are snapshots: changing the pen afterwards never restyles an
/// existing step.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawStep {
    /// Axis-aligned rectangle outline between two corner points
    Rect {
        start_x: f32,
        start_y: f32,
        end_x: f32,
        end_y: f32,
        style: PenStyle,
    },
    /// Ellipse outline inscribed in the bounding box of two corner points
    Ellipse {
        start_x: f32,
        start_y: f32,
        end_x: f32,
        end_y: f32,
        style: PenStyle,
    },
    /// Straight line between two points
    Line {
        start_x: f32,
        start_y: f32,
        end_x: f32,
        end_y: f32,
        style: PenStyle,
    },
    /// Filled arrow from start to end; head geometry is derived at render
    /// time from the endpoints and the stroke width
    Arrow {
        start_x: f32,
        start_y: f32,
        end_x: f32,
        end_y: f32,
        style: PenStyle,
    },
    /// Freehand pen path
    Freehand {
        points: Vec<(f32, f32)>,
        style: PenStyle,
    },
    /// Text anchored at its top-left corner
    Text {
        x: f32,
        y: f32,
        text: String,
        font: FontSpec,
        color: ShapeColor,
    },
}

impl DrawStep {
    /// Whether this is a text step (the only kind whose pending preview
    /// survives redraws until confirmed or cancelled)
    pub fn is_text(&self) -> bool {
        matches!(self, DrawStep::Text { .. })
    }
}
