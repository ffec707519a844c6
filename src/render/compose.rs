//! Full-frame composition for the screenshot session
//!
//! Every state change recomposes the whole frame bottom-to-top: background
//! canvas, dimming mask, replayed annotations, selection outline and
//! handles, magnifier, size badge. Panel and text-overlay placement is
//! computed here but rendered by the external widgets, so the frame carries
//! their anchor positions instead of pixels.

use image::RgbaImage;
use tiny_skia::{LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::image::{ImageStepRenderer, with_pixmap};
use super::text;
use crate::domain::{CursorShape, Rect, Tool, cursor_shape};
use crate::session::state::Session;

/// Alpha of the dimming mask over unselected regions
pub const MASK_ALPHA: u8 = 155;
/// Accent color for the selection outline, handles and magnifier guides
pub const ACCENT: [u8; 4] = [0, 255, 255, 255];
/// Selection outline stroke width in logical pixels
const OUTLINE_WIDTH: f32 = 2.0;
/// Radius of the eight selection handles in logical pixels
const HANDLE_RADIUS: f32 = 3.0;

/// External tool panel footprint in logical pixels
pub const TOOLBAR_SIZE: (i32, i32) = (360, 36);
/// External style panel footprint in logical pixels
pub const STYLEBAR_SIZE: (i32, i32) = (360, 36);
/// External text input overlay footprint in logical pixels
pub const TEXT_INPUT_SIZE: (i32, i32) = (220, 80);
/// Gap between the selection and auxiliary chrome
const SPACING: i32 = 5;

/// Magnifier source region side length in logical pixels
const WATCH: i32 = 16;
/// Magnifier upscale factor
const MAG_ZOOM: i32 = 10;
const MAG_SIZE: i32 = WATCH * MAG_ZOOM;
/// Offset of the magnifier from the cursor
const MAG_OFFSET: i32 = 24;
/// Height of the readout box under the magnifier
const INFO_HEIGHT: i32 = 40;

/// Size badge footprint
const BADGE_SIZE: (i32, i32) = (200, 30);

/// Anchors for the external tool and style panels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelPlacement {
    /// Top-left of the tool panel
    pub toolbar: (i32, i32),
    /// Top-left of the style panel, directly under the tool panel
    pub style_bar: (i32, i32),
    /// Whether the style panel should show font controls instead of pen
    /// controls
    pub show_font_controls: bool,
}

/// One composed frame plus everything the windowing layer needs alongside it
pub struct Frame {
    pub image: RgbaImage,
    pub cursor: CursorShape,
    /// None while still selecting (panels are hidden in `Select` mode)
    pub panels: Option<PanelPlacement>,
    /// Top-left for the text input overlay while a text anchor is pending
    pub text_input: Option<(i32, i32)>,
}

/// Recompose the full frame from the current session state
pub fn compose(session: &Session) -> Frame {
    let canvas = &session.canvas;
    let scale = canvas.scale;
    let (w, h) = (canvas.logical_width(), canvas.logical_height());
    let selection = session.selection.normalized();

    let mut image = canvas.image.clone();

    apply_mask(&mut image, selection, session.selection.is_null(), scale);

    if let Some(mut renderer) = ImageStepRenderer::new(&image, (0.0, 0.0), scale) {
        renderer.preload_font(&session.font.family, session.loaded_font.clone());
        session.log.replay(&mut renderer);
        renderer.finish(&mut image);
    }

    if !session.selection.is_null() {
        draw_selection_chrome(&mut image, selection, scale);
    }

    if session.tool == Tool::Select && session.config.magnifier_enabled {
        draw_magnifier(&mut image, session, w, h);
    }

    if session.tool == Tool::MoveSelected && session.mouse_pressed {
        draw_size_badge(&mut image, session, selection, w);
    }

    let panels = if session.tool == Tool::Select {
        None
    } else {
        let (toolbar, style_bar) = panel_placement(selection, w, h);
        Some(PanelPlacement {
            toolbar,
            style_bar,
            show_font_controls: session.tool == Tool::DrawText,
        })
    };

    let text_input = session
        .text_anchor
        .map(|anchor| text_overlay_pos(anchor, session.text_size, w, h));

    Frame {
        image,
        cursor: cursor_shape(session.tool, session.zone),
        panels,
        text_input,
    }
}

/// Darken everything outside the selection with up to four strips, or the
/// whole canvas when nothing is selected yet
pub(crate) fn apply_mask(image: &mut RgbaImage, selection: Rect, no_selection: bool, scale: f32) {
    let (pw, ph) = (image.width() as f32, image.height() as f32);
    with_pixmap(image, |pixmap| {
        if no_selection {
            fill_mask_rect(pixmap, 0.0, 0.0, pw, ph);
            return;
        }
        let left = selection.left as f32 * scale;
        let top = selection.top as f32 * scale;
        let right = selection.right as f32 * scale;
        let bottom = selection.bottom as f32 * scale;

        // Top, left, right, bottom strips; degenerate strips are skipped
        fill_mask_rect(pixmap, 0.0, 0.0, pw, top);
        fill_mask_rect(pixmap, 0.0, top, left, bottom);
        fill_mask_rect(pixmap, right, top, pw, bottom);
        fill_mask_rect(pixmap, 0.0, bottom, pw, ph);
    });
}

fn fill_mask_rect(pixmap: &mut Pixmap, left: f32, top: f32, right: f32, bottom: f32) {
    let Some(rect) = tiny_skia::Rect::from_ltrb(
        left.max(0.0),
        top.max(0.0),
        right.min(pixmap.width() as f32),
        bottom.min(pixmap.height() as f32),
    ) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color_rgba8(0, 0, 0, MASK_ALPHA);
    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
}

/// Selection outline plus the eight drag handles at corners and edge
/// midpoints
pub(crate) fn draw_selection_chrome(image: &mut RgbaImage, selection: Rect, scale: f32) {
    let left = selection.left as f32 * scale;
    let top = selection.top as f32 * scale;
    let right = selection.right as f32 * scale;
    let bottom = selection.bottom as f32 * scale;
    let center_x = (left + right) / 2.0;
    let center_y = (top + bottom) / 2.0;

    with_pixmap(image, |pixmap| {
        let mut paint = Paint::default();
        paint.set_color_rgba8(ACCENT[0], ACCENT[1], ACCENT[2], ACCENT[3]);
        paint.anti_alias = true;

        let mut pb = PathBuilder::new();
        pb.move_to(left, top);
        pb.line_to(right, top);
        pb.line_to(right, bottom);
        pb.line_to(left, bottom);
        pb.close();
        if let Some(path) = pb.finish() {
            let stroke = Stroke {
                width: OUTLINE_WIDTH * scale,
                ..Default::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }

        let handles = [
            (left, top),
            (center_x, top),
            (right, top),
            (left, center_y),
            (right, center_y),
            (left, bottom),
            (center_x, bottom),
            (right, bottom),
        ];
        let mut pb = PathBuilder::new();
        for (hx, hy) in handles {
            pb.push_circle(hx, hy, HANDLE_RADIUS * scale);
        }
        if let Some(path) = pb.finish() {
            pixmap.fill_path(
                &path,
                &paint,
                tiny_skia::FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    });
}

/// Tool/style panel anchors: below-right of the selection, clamped to stay
/// on-screen, flipped above the selection when the bottom would overflow
pub(crate) fn panel_placement(selection: Rect, _w: i32, h: i32) -> ((i32, i32), (i32, i32)) {
    let mut x = selection.right - TOOLBAR_SIZE.0 + SPACING;
    if x < SPACING {
        x = SPACING;
    }
    let mut y = selection.bottom - SPACING;
    if y + TOOLBAR_SIZE.1 + STYLEBAR_SIZE.1 >= h {
        if selection.top - TOOLBAR_SIZE.1 - STYLEBAR_SIZE.1 < SPACING {
            // Not enough room above either; tuck inside the selection
            y = selection.top + SPACING;
        } else {
            y = selection.top - TOOLBAR_SIZE.1 - STYLEBAR_SIZE.1 - SPACING;
        }
    }
    ((x, y), (x, y + TOOLBAR_SIZE.1 + SPACING))
}

/// Text overlay anchor: below the text anchor (offset by the live text
/// bounds), flipped above when it would overflow the canvas
pub(crate) fn text_overlay_pos(
    anchor: (i32, i32),
    text_size: Option<(f32, f32)>,
    w: i32,
    h: i32,
) -> (i32, i32) {
    let x = if anchor.0 + TEXT_INPUT_SIZE.0 >= w {
        anchor.0 - TEXT_INPUT_SIZE.0
    } else {
        anchor.0
    };
    let y = match text_size {
        Some((_, text_h)) => {
            let text_h = text_h.ceil() as i32;
            if anchor.1 + TEXT_INPUT_SIZE.1 + text_h >= h {
                anchor.1 - TEXT_INPUT_SIZE.1 - text_h
            } else {
                anchor.1 + text_h
            }
        }
        None => {
            if anchor.1 + TEXT_INPUT_SIZE.1 >= h {
                anchor.1 - TEXT_INPUT_SIZE.1
            } else {
                anchor.1
            }
        }
    };
    (x, y)
}

/// Region of the canvas sampled by the magnifier, clamped into bounds
pub(crate) fn magnifier_watch_area(cursor: (i32, i32), w: i32, h: i32) -> Rect {
    let (cx, cy) = cursor;
    let half = WATCH / 2;
    let mut area = Rect::new(cx - half, cy - half, cx + half, cy + half);
    if area.left < 0 {
        area.left = 0;
        area.right = WATCH;
    }
    if cx + half >= w {
        area.right = w - 1;
        area.left = area.right - WATCH;
    }
    if cy - half < 0 {
        area.top = 0;
        area.bottom = WATCH;
    }
    if cy + half >= h {
        area.bottom = h - 1;
        area.top = area.bottom - WATCH;
    }
    area
}

/// Top-left of the magnifier, offset from the cursor and flipped to the
/// opposite side near the canvas edges
pub(crate) fn magnifier_pos(cursor: (i32, i32), w: i32, h: i32) -> (i32, i32) {
    let (cx, cy) = cursor;
    let mut mx = cx + MAG_OFFSET;
    let mut my = cy + MAG_OFFSET;
    if mx + MAG_SIZE >= w {
        mx = cx - MAG_SIZE - MAG_OFFSET / 2;
    }
    if my + MAG_SIZE + INFO_HEIGHT >= h {
        my = cy - MAG_SIZE - MAG_OFFSET / 2 - INFO_HEIGHT;
    }
    (mx, my)
}

fn draw_magnifier(image: &mut RgbaImage, session: &Session, w: i32, h: i32) {
    let canvas = &session.canvas;
    let scale = canvas.scale;
    let cursor = (session.cursor_x, session.cursor_y);
    let watch = magnifier_watch_area(cursor, w, h);
    let (mx, my) = magnifier_pos(cursor, w, h);

    // Sample the clean background at device scale and upscale 10x
    let src_x = (watch.left as f32 * scale).max(0.0) as u32;
    let src_y = (watch.top as f32 * scale).max(0.0) as u32;
    let src_side = (WATCH as f32 * scale) as u32;
    let sample = image::imageops::crop_imm(&canvas.image, src_x, src_y, src_side, src_side);
    let mag_side = (MAG_SIZE as f32 * scale) as u32;
    let zoomed = image::imageops::resize(
        &sample.to_image(),
        mag_side,
        mag_side,
        image::imageops::FilterType::Nearest,
    );
    image::imageops::overlay(
        image,
        &zoomed,
        (mx as f32 * scale) as i64,
        (my as f32 * scale) as i64,
    );

    let left = mx as f32 * scale;
    let top = my as f32 * scale;
    let side = MAG_SIZE as f32 * scale;
    let info_h = INFO_HEIGHT as f32 * scale;

    with_pixmap(image, |pixmap| {
        // White frame
        stroke_rect(pixmap, left, top, left + side, top + side, 2.0 * scale, [
            255, 255, 255, 255,
        ]);
        // Crosshair guides through the center
        stroke_line(
            pixmap,
            (left + side / 2.0, top),
            (left + side / 2.0, top + side),
            2.0 * scale,
            ACCENT,
        );
        stroke_line(
            pixmap,
            (left, top + side / 2.0),
            (left + side, top + side / 2.0),
            2.0 * scale,
            ACCENT,
        );
        // Readout box below
        let mut paint = Paint::default();
        paint.set_color_rgba8(0, 0, 0, 255);
        if let Some(rect) =
            tiny_skia::Rect::from_ltrb(left, top + side, left + side, top + side + info_h)
        {
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
    });

    let Some(font) = session.loaded_font.as_ref() else {
        return;
    };
    let text_size = 13.0 * scale;
    if let Some([r, g, b, _]) = canvas.pixel_at_logical(cursor.0, cursor.1) {
        text::draw_text(
            image,
            font,
            &format!(" Rgb: ({r}, {g}, {b})"),
            left + 2.0 * scale,
            top + side + 3.0 * scale,
            text_size,
            [255, 255, 255, 255],
        );
    }
    if session.mouse_pressed {
        let rect = session.selection.normalized();
        let (sel_w, sel_h) = (
            (rect.width() as f32 * scale) as i32,
            (rect.height() as f32 * scale) as i32,
        );
        text::draw_text(
            image,
            font,
            &format!(" Size: {sel_w} x {sel_h}"),
            left + 2.0 * scale,
            top + side + info_h / 2.0 + 3.0 * scale,
            text_size,
            [255, 255, 255, 255],
        );
    }
}

/// Badge position near the selection's top-left, kept on-screen
pub(crate) fn size_badge_pos(selection: Rect, w: i32) -> (i32, i32) {
    let mut x = selection.left;
    let mut y = selection.top - SPACING - BADGE_SIZE.1;
    if y < 0 {
        x = selection.left + SPACING;
        y = selection.top + SPACING;
    }
    if x + BADGE_SIZE.0 >= w {
        x = selection.left - SPACING - BADGE_SIZE.0;
        y = selection.top - SPACING;
    }
    x = x.max(SPACING);
    y = y.max(SPACING);
    (x, y)
}

fn draw_size_badge(image: &mut RgbaImage, session: &Session, selection: Rect, w: i32) {
    let scale = session.canvas.scale;
    let (bx, by) = size_badge_pos(selection, w);
    let left = bx as f32 * scale;
    let top = by as f32 * scale;
    let right = left + BADGE_SIZE.0 as f32 * scale;
    let bottom = top + BADGE_SIZE.1 as f32 * scale;

    with_pixmap(image, |pixmap| {
        let mut paint = Paint::default();
        paint.set_color_rgba8(0, 0, 0, 255);
        if let Some(rect) = tiny_skia::Rect::from_ltrb(left, top, right, bottom) {
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
        stroke_rect(pixmap, left, top, right, bottom, 2.0 * scale, [
            255, 255, 255, 255,
        ]);
    });

    if let Some(font) = session.loaded_font.as_ref() {
        let (sel_w, sel_h) = (
            (selection.width() as f32 * scale) as i32,
            (selection.height() as f32 * scale) as i32,
        );
        text::draw_text(
            image,
            font,
            &format!("  {sel_w} x {sel_h}"),
            left,
            top + 6.0 * scale,
            14.0 * scale,
            [255, 255, 255, 255],
        );
    }
}

fn stroke_rect(
    pixmap: &mut Pixmap,
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
    width: f32,
    color: [u8; 4],
) {
    let mut pb = PathBuilder::new();
    pb.move_to(left, top);
    pb.line_to(right, top);
    pb.line_to(right, bottom);
    pb.line_to(left, bottom);
    pb.close();
    let Some(path) = pb.finish() else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
    paint.anti_alias = true;
    let stroke = Stroke {
        width,
        ..Default::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

fn stroke_line(
    pixmap: &mut Pixmap,
    from: (f32, f32),
    to: (f32, f32),
    width: f32,
    color: [u8; 4],
) {
    let mut pb = PathBuilder::new();
    pb.move_to(from.0, from.1);
    pb.line_to(to.0, to.1);
    let Some(path) = pb.finish() else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
    paint.anti_alias = true;
    let stroke = Stroke {
        width,
        line_cap: LineCap::Square,
        ..Default::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_darkens_outside_only() {
        let mut img = RgbaImage::from_pixel(100, 100, image::Rgba([200, 200, 200, 255]));
        apply_mask(&mut img, Rect::new(20, 20, 80, 80), false, 1.0);

        // Outside the selection the mask dims the pixel
        assert!(img.get_pixel(10, 10)[0] < 150);
        assert!(img.get_pixel(50, 10)[0] < 150);
        assert!(img.get_pixel(10, 90)[0] < 150);
        // Inside stays untouched
        assert_eq!(img.get_pixel(50, 50)[0], 200);
    }

    #[test]
    fn test_mask_covers_everything_without_selection() {
        let mut img = RgbaImage::from_pixel(50, 50, image::Rgba([200, 200, 200, 255]));
        apply_mask(&mut img, Rect::default(), true, 1.0);
        assert!(img.get_pixel(25, 25)[0] < 150);
    }

    #[test]
    fn test_panel_below_right_of_selection() {
        let selection = Rect::new(100, 100, 600, 400);
        let ((tx, ty), (sx, sy)) = panel_placement(selection, 1920, 1080);
        assert_eq!(tx, 600 - TOOLBAR_SIZE.0 + 5);
        assert_eq!(ty, 400 - 5);
        assert_eq!(sx, tx);
        assert_eq!(sy, ty + TOOLBAR_SIZE.1 + 5);
    }

    #[test]
    fn test_panel_flips_above_near_bottom() {
        let selection = Rect::new(100, 500, 600, 1070);
        let ((_, ty), _) = panel_placement(selection, 1920, 1080);
        assert_eq!(ty, 500 - TOOLBAR_SIZE.1 - STYLEBAR_SIZE.1 - 5);
    }

    #[test]
    fn test_panel_tucks_inside_when_no_room_either_side() {
        let selection = Rect::new(100, 10, 600, 1070);
        let ((_, ty), _) = panel_placement(selection, 1920, 1080);
        assert_eq!(ty, 10 + 5);
    }

    #[test]
    fn test_panel_clamps_left_edge() {
        let selection = Rect::new(0, 100, 50, 200);
        let ((tx, _), _) = panel_placement(selection, 1920, 1080);
        assert_eq!(tx, 5);
    }

    #[test]
    fn test_text_overlay_flips_near_edges() {
        // Fits below the anchor, offset by the live text height
        assert_eq!(
            text_overlay_pos((100, 100), Some((50.0, 20.0)), 1920, 1080),
            (100, 120)
        );
        // Flips above when overflowing the bottom
        assert_eq!(
            text_overlay_pos((100, 1050), None, 1920, 1080),
            (100, 1050 - TEXT_INPUT_SIZE.1)
        );
        // Flips left when overflowing the right edge
        let (x, _) = text_overlay_pos((1910, 100), None, 1920, 1080);
        assert_eq!(x, 1910 - TEXT_INPUT_SIZE.0);
    }

    #[test]
    fn test_magnifier_watch_area_clamps_to_canvas() {
        let area = magnifier_watch_area((0, 0), 1920, 1080);
        assert_eq!((area.left, area.top), (0, 0));
        assert_eq!(area.width(), WATCH);

        let area = magnifier_watch_area((1919, 1079), 1920, 1080);
        assert_eq!(area.right, 1919);
        assert_eq!(area.bottom, 1079);
        assert_eq!(area.width(), WATCH);
        assert_eq!(area.height(), WATCH);
    }

    #[test]
    fn test_magnifier_flips_near_edges() {
        // Plenty of room: below-right of the cursor
        assert_eq!(magnifier_pos((100, 100), 1920, 1080), (124, 124));
        // Near the right edge it flips to the left
        let (mx, _) = magnifier_pos((1900, 100), 1920, 1080);
        assert!(mx < 1900 - MAG_SIZE);
        // Near the bottom it flips above
        let (_, my) = magnifier_pos((100, 1060), 1920, 1080);
        assert!(my < 1060 - MAG_SIZE);
    }

    #[test]
    fn test_size_badge_above_selection() {
        let pos = size_badge_pos(Rect::new(100, 100, 300, 250), 1920);
        assert_eq!(pos, (100, 100 - 5 - BADGE_SIZE.1));
    }

    #[test]
    fn test_size_badge_moves_inside_at_top_edge() {
        let pos = size_badge_pos(Rect::new(100, 10, 300, 250), 1920);
        assert_eq!(pos, (105, 15));
    }
}
