//! Shared geometry calculations for annotations
//!
//! Constants and math shared between the frame composer and the export
//! renderer.

/// Arrow geometry
pub mod arrow {
    /// Arrowhead side length as a multiple of the shaft half-width
    pub const HEAD_SCALE: f32 = 8.0;
    /// Head base half-width as a multiple of the shaft half-width
    pub const BASE_SCALE: f32 = HEAD_SCALE / 2.0;

    /// Build the filled arrow polygon for a shaft from start to end.
    ///
    /// `side` is the shaft half-width (the stroke width). The polygon walks
    /// the two shaft corners at the start, the shaft corner and outer barb
    /// on one side of the head base, the tip, then the barb and shaft
    /// corner on the other side. Returns None for a zero-length shaft.
    pub fn polygon(
        start_x: f32,
        start_y: f32,
        end_x: f32,
        end_y: f32,
        side: f32,
    ) -> Option<[(f32, f32); 7]> {
        let dx = start_x - end_x;
        let dy = start_y - end_y;
        let length = (dx * dx + dy * dy).sqrt();
        if length == 0.0 {
            return None;
        }

        // Unit vector pointing from the tip back toward the start; the
        // perpendicular (sin, -cos) spans the shaft width
        let cos_a = dx / length;
        let sin_a = dy / length;

        // Where the head begins on the shaft axis
        let base_x = end_x + HEAD_SCALE * side * cos_a;
        let base_y = end_y + HEAD_SCALE * side * sin_a;

        Some([
            (start_x + side * sin_a, start_y - side * cos_a),
            (start_x - side * sin_a, start_y + side * cos_a),
            (base_x - side * sin_a, base_y + side * cos_a),
            (
                base_x - BASE_SCALE * side * sin_a,
                base_y + BASE_SCALE * side * cos_a,
            ),
            (end_x, end_y),
            (
                base_x + BASE_SCALE * side * sin_a,
                base_y - BASE_SCALE * side * cos_a,
            ),
            (base_x + side * sin_a, base_y - side * cos_a),
        ])
    }
}

/// Shape (rectangle/ellipse) geometry
pub mod shape {
    /// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f32 = 0.552_284_8;
}

/// Normalize min/max coordinates from arbitrary start/end points
#[inline]
pub fn normalize_rect(x1: f32, y1: f32, x2: f32, y2: f32) -> (f32, f32, f32, f32) {
    let (min_x, max_x) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
    let (min_y, max_y) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
    (min_x, min_y, max_x, max_y)
}

/// Calculate ellipse center and radii from bounding box
#[inline]
pub fn ellipse_from_bounds(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> (f32, f32, f32, f32) {
    let cx = (min_x + max_x) * 0.5;
    let cy = (min_y + max_y) * 0.5;
    let rx = ((max_x - min_x) * 0.5).max(1.0);
    let ry = ((max_y - min_y) * 0.5).max(1.0);
    (cx, cy, rx, ry)
}
