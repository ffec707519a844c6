//! Glyph rendering for the text tool
//!
//! Fonts are resolved from the system font directories by file name. When
//! no font can be found the text tool degrades: steps still commit and
//! replay, measurement falls back to an approximation, and nothing is
//! rasterized.

use std::fs;
use std::path::PathBuf;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};

use crate::config::FontSpec;

/// Directories scanned for font files, in order
fn font_dirs() -> Vec<PathBuf> {
    let mut dirs_list = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
    ];
    if let Some(data) = dirs::data_dir() {
        dirs_list.push(data.join("fonts"));
    }
    if let Some(home) = dirs::home_dir() {
        dirs_list.push(home.join(".fonts"));
    }
    dirs_list
}

fn find_font_file(dir: &PathBuf, family_lower: &str, fallback: &mut Option<PathBuf>) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if let Some(found) = find_font_file(&path, family_lower, fallback) {
                return Some(found);
            }
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let lower = name.to_ascii_lowercase();
        if !(lower.ends_with(".ttf") || lower.ends_with(".otf")) {
            continue;
        }
        if fallback.is_none() {
            *fallback = Some(path.clone());
        }
        if lower.starts_with(family_lower) {
            return Some(path);
        }
    }
    None
}

/// Load the closest installed font for the requested family.
///
/// Matches font file names against the family, falling back to the first
/// usable font file found anywhere.
pub fn load_font(spec: &FontSpec) -> Option<FontArc> {
    let family_lower = spec.family.to_ascii_lowercase().replace(' ', "");
    let mut fallback = None;
    let mut chosen = None;
    for dir in font_dirs() {
        if let Some(path) = find_font_file(&dir, &family_lower, &mut fallback) {
            chosen = Some(path);
            break;
        }
    }
    let path = match chosen.or(fallback) {
        Some(path) => path,
        None => {
            log::warn!("No usable font found for family {:?}", spec.family);
            return None;
        }
    };
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("Failed to read font {path:?}: {err:?}");
            return None;
        }
    };
    match FontArc::try_from_vec(bytes) {
        Ok(font) => {
            log::debug!("Loaded font {path:?} for family {:?}", spec.family);
            Some(font)
        }
        Err(err) => {
            log::warn!("Failed to parse font {path:?}: {err:?}");
            None
        }
    }
}

/// Measure the bounding size of a block of text.
///
/// Without a font, approximates with the size-derived advance the way the
/// live preview border does.
pub fn measure(font: Option<&FontArc>, text: &str, size: f32) -> (f32, f32) {
    let Some(font) = font else {
        let lines: Vec<&str> = text.split('\n').collect();
        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        return (
            widest as f32 * size * 0.6,
            lines.len().max(1) as f32 * size * 1.2,
        );
    };

    let scaled = font.as_scaled(PxScale::from(size));
    let line_height = scaled.height() + scaled.line_gap();
    let mut max_width = 0.0_f32;
    let mut line_count = 0usize;
    for line in text.split('\n') {
        line_count += 1;
        let mut width = 0.0_f32;
        let mut prev = None;
        for ch in line.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev_id) = prev {
                width += scaled.kern(prev_id, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        max_width = max_width.max(width);
    }
    (max_width, line_count.max(1) as f32 * line_height)
}

/// Draw text onto a raw RGBA buffer with top-left anchor (x, y)
pub fn draw_text_raw(
    data: &mut [u8],
    width: u32,
    height: u32,
    font: &FontArc,
    text: &str,
    x: f32,
    y: f32,
    size: f32,
    color: [u8; 4],
) {
    let scale = PxScale::from(size);
    let scaled = font.as_scaled(scale);
    let line_height = scaled.height() + scaled.line_gap();

    for (line_index, line) in text.split('\n').enumerate() {
        let baseline = y + scaled.ascent() + line_index as f32 * line_height;
        let mut pen_x = x;
        let mut prev = None;

        for ch in line.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev_id) = prev {
                pen_x += scaled.kern(prev_id, id);
            }
            let glyph = id.with_scale_and_position(scale, point(pen_x, baseline));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let px = bounds.min.x as i32 + gx as i32;
                    let py = bounds.min.y as i32 + gy as i32;
                    if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                        return;
                    }
                    blend_pixel(data, width, px as u32, py as u32, color, coverage);
                });
            }
            pen_x += scaled.h_advance(id);
            prev = Some(id);
        }
    }
}

/// Draw text onto an RgbaImage with top-left anchor (x, y)
pub fn draw_text(
    img: &mut image::RgbaImage,
    font: &FontArc,
    text: &str,
    x: f32,
    y: f32,
    size: f32,
    color: [u8; 4],
) {
    let (width, height) = (img.width(), img.height());
    draw_text_raw(&mut img[..], width, height, font, text, x, y, size, color);
}

fn blend_pixel(data: &mut [u8], width: u32, x: u32, y: u32, color: [u8; 4], coverage: f32) {
    let alpha = (coverage * color[3] as f32 / 255.0).clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let index = ((y * width + x) * 4) as usize;
    let inv = 1.0 - alpha;
    for channel in 0..3 {
        let src = color[channel] as f32;
        let dst = data[index + channel] as f32;
        data[index + channel] = (src * alpha + dst * inv).round() as u8;
    }
    data[index + 3] = 255;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_without_font_approximates() {
        let (w, h) = measure(None, "hello", 10.0);
        assert!((w - 5.0 * 10.0 * 0.6).abs() < 1e-3);
        assert!((h - 12.0).abs() < 1e-3);

        let (_, h2) = measure(None, "a\nb\nc", 10.0);
        assert!((h2 - 36.0).abs() < 1e-3);
    }

    #[test]
    fn test_blend_pixel_full_coverage_replaces() {
        let mut data = vec![0u8; 4];
        blend_pixel(&mut data, 1, 0, 0, [200, 100, 50, 255], 1.0);
        assert_eq!(&data[..3], &[200, 100, 50]);
        assert_eq!(data[3], 255);
    }

    #[test]
    fn test_blend_pixel_zero_coverage_keeps() {
        let mut data = vec![10u8, 20, 30, 255];
        blend_pixel(&mut data, 1, 0, 0, [200, 100, 50, 255], 0.0);
        assert_eq!(&data[..], &[10, 20, 30, 255]);
    }
}
