//! Step rendering onto RGBA images using tiny-skia
//!
//! The renderer converts the target image into a pixmap once, replays draw
//! steps onto it, and writes the pixels back on `finish`. Coordinates are
//! canvas-local logical units, mapped through an origin offset and a device
//! scale so the same replay serves both the on-screen frame and the export
//! crop.

use std::collections::HashMap;

use ab_glyph::FontArc;
use image::RgbaImage;
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, Transform,
};

use super::geometry::{self, arrow, shape};
use super::text;
use crate::annotations::StepRenderer;
use crate::config::FontSpec;
use crate::domain::{DrawStep, PenStyle};

/// Convert an RgbaImage to a Pixmap, apply a drawing function, copy back
pub(crate) fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(size) = tiny_skia::IntSize::from_wh(w, h) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    img.copy_from_slice(pixmap.data());
}

/// Build an ellipse path using cubic bezier curves
fn build_ellipse_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<Path> {
    let kx = rx * shape::BEZIER_K;
    let ky = ry * shape::BEZIER_K;

    let mut pb = PathBuilder::new();
    pb.move_to(cx, cy - ry);
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);
    pb.close();
    pb.finish()
}

/// Renderer replaying draw steps onto a pixel buffer
pub struct ImageStepRenderer {
    pixmap: Pixmap,
    origin: (f32, f32),
    scale: f32,
    fonts: HashMap<String, Option<FontArc>>,
}

impl ImageStepRenderer {
    /// Start a replay over a copy of the image's pixels.
    ///
    /// `origin` is the logical coordinate mapped to the image's top-left,
    /// `scale` the pixels-per-logical-unit factor.
    pub fn new(img: &RgbaImage, origin: (f32, f32), scale: f32) -> Option<Self> {
        let size = tiny_skia::IntSize::from_wh(img.width(), img.height())?;
        let pixmap = Pixmap::from_vec(img.as_raw().clone(), size)?;
        Some(Self {
            pixmap,
            origin,
            scale,
            fonts: HashMap::new(),
        })
    }

    /// Seed the font cache so replay does not hit the disk for the
    /// session's current font
    pub fn preload_font(&mut self, family: &str, font: Option<FontArc>) {
        self.fonts.insert(family.to_string(), font);
    }

    /// Write the rendered pixels back into the image
    pub fn finish(self, img: &mut RgbaImage) {
        img.copy_from_slice(self.pixmap.data());
    }

    fn tx(&self, x: f32) -> f32 {
        (x - self.origin.0) * self.scale
    }

    fn ty(&self, y: f32) -> f32 {
        (y - self.origin.1) * self.scale
    }

    fn stroke_path(&mut self, path: &Path, style: &PenStyle) {
        let [r, g, b, a] = style.color.to_rgba_u8();
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: (style.width as f32 * self.scale).max(1.0),
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(path, &paint, &stroke, Transform::identity(), None);
    }

    fn fill_path(&mut self, path: &Path, style: &PenStyle) {
        let [r, g, b, a] = style.color.to_rgba_u8();
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;
        self.pixmap
            .fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    fn font_for(&mut self, spec: &FontSpec) -> Option<FontArc> {
        self.fonts
            .entry(spec.family.clone())
            .or_insert_with(|| text::load_font(spec))
            .clone()
    }

    fn draw_rect(&mut self, start_x: f32, start_y: f32, end_x: f32, end_y: f32, style: &PenStyle) {
        let (min_x, min_y, max_x, max_y) = geometry::normalize_rect(
            self.tx(start_x),
            self.ty(start_y),
            self.tx(end_x),
            self.ty(end_y),
        );
        let mut pb = PathBuilder::new();
        pb.move_to(min_x, min_y);
        pb.line_to(max_x, min_y);
        pb.line_to(max_x, max_y);
        pb.line_to(min_x, max_y);
        pb.close();
        if let Some(path) = pb.finish() {
            self.stroke_path(&path, style);
        }
    }

    fn draw_ellipse(
        &mut self,
        start_x: f32,
        start_y: f32,
        end_x: f32,
        end_y: f32,
        style: &PenStyle,
    ) {
        let (min_x, min_y, max_x, max_y) = geometry::normalize_rect(
            self.tx(start_x),
            self.ty(start_y),
            self.tx(end_x),
            self.ty(end_y),
        );
        let (cx, cy, rx, ry) = geometry::ellipse_from_bounds(min_x, min_y, max_x, max_y);
        if let Some(path) = build_ellipse_path(cx, cy, rx, ry) {
            self.stroke_path(&path, style);
        }
    }

    fn draw_line(&mut self, start_x: f32, start_y: f32, end_x: f32, end_y: f32, style: &PenStyle) {
        let mut pb = PathBuilder::new();
        pb.move_to(self.tx(start_x), self.ty(start_y));
        pb.line_to(self.tx(end_x), self.ty(end_y));
        if let Some(path) = pb.finish() {
            self.stroke_path(&path, style);
        }
    }

    fn draw_arrow(&mut self, start_x: f32, start_y: f32, end_x: f32, end_y: f32, style: &PenStyle) {
        // Degenerate shafts draw nothing
        let Some(points) = arrow::polygon(
            self.tx(start_x),
            self.ty(start_y),
            self.tx(end_x),
            self.ty(end_y),
            style.width as f32 * self.scale,
        ) else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(points[0].0, points[0].1);
        for &(x, y) in &points[1..] {
            pb.line_to(x, y);
        }
        pb.close();
        if let Some(path) = pb.finish() {
            self.fill_path(&path, style);
        }
    }

    fn draw_freehand(&mut self, points: &[(f32, f32)], style: &PenStyle) {
        let Some(&(first_x, first_y)) = points.first() else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(self.tx(first_x), self.ty(first_y));
        for &(x, y) in &points[1..] {
            pb.line_to(self.tx(x), self.ty(y));
        }
        if let Some(path) = pb.finish() {
            self.stroke_path(&path, style);
        }
    }

    fn draw_text(&mut self, x: f32, y: f32, content: &str, font_spec: &FontSpec, color: [u8; 4]) {
        let Some(font) = self.font_for(font_spec) else {
            return;
        };
        let (px, py) = (self.tx(x), self.ty(y));
        let size = font_spec.size * self.scale;
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        text::draw_text_raw(
            self.pixmap.data_mut(),
            width,
            height,
            &font,
            content,
            px,
            py,
            size,
            color,
        );
    }
}

impl StepRenderer for ImageStepRenderer {
    fn draw_step(&mut self, step: &DrawStep) {
        match step {
            DrawStep::Rect {
                start_x,
                start_y,
                end_x,
                end_y,
                style,
            } => self.draw_rect(*start_x, *start_y, *end_x, *end_y, style),
            DrawStep::Ellipse {
                start_x,
                start_y,
                end_x,
                end_y,
                style,
            } => self.draw_ellipse(*start_x, *start_y, *end_x, *end_y, style),
            DrawStep::Line {
                start_x,
                start_y,
                end_x,
                end_y,
                style,
            } => self.draw_line(*start_x, *start_y, *end_x, *end_y, style),
            DrawStep::Arrow {
                start_x,
                start_y,
                end_x,
                end_y,
                style,
            } => self.draw_arrow(*start_x, *start_y, *end_x, *end_y, style),
            DrawStep::Freehand { points, style } => self.draw_freehand(points, style),
            DrawStep::Text {
                x,
                y,
                text,
                font,
                color,
            } => self.draw_text(*x, *y, text, font, color.to_rgba_u8()),
        }
    }
}
