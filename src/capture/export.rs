//! Selection export: clamp, crop, encode, deliver
//!
//! The export region is the selection clamped to the visible window and
//! intersected with the full window rectangle using inclusive edge
//! semantics, so a full-screen selection exports exactly width x height
//! pixels. Annotations are replayed onto a copy of the canvas before
//! cropping.

use std::io;
use std::path::PathBuf;

use image::RgbaImage;

use super::image::CanvasImage;
use crate::annotations::DrawLog;
use crate::config::SaveLocation;
use crate::domain::Rect;
use crate::render::image::ImageStepRenderer;

/// Encodings offered by the save dialog
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageKind {
    #[default]
    Png,
    Jpeg,
}

impl ImageKind {
    /// Deduce the encoding from a file extension, defaulting to PNG
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => ImageKind::Jpeg,
            _ => ImageKind::Png,
        }
    }
}

/// Destination chosen for a file save
#[derive(Clone, Debug)]
pub struct SaveTarget {
    pub path: PathBuf,
    pub kind: ImageKind,
}

impl SaveTarget {
    pub fn new(path: PathBuf) -> Self {
        let kind = path
            .extension()
            .and_then(|e| e.to_str())
            .map(ImageKind::from_extension)
            .unwrap_or_default();
        Self { path, kind }
    }
}

/// Compute the export rectangle: selection clamped to the window, then
/// intersected with the full window rectangle (inclusive edges).
///
/// Returns None when the clamped selection has no overlap with the window.
pub fn export_rect(selection: Rect, logical_w: i32, logical_h: i32) -> Option<Rect> {
    let full_window = Rect::new(0, 0, logical_w - 1, logical_h - 1);
    let mut selected = selection.normalized();
    if selected.left < 0 {
        selected.left = 0;
    }
    if selected.right >= logical_w {
        selected.right = logical_w - 1;
    }
    if selected.top < 0 {
        selected.top = 0;
    }
    if selected.bottom >= logical_h {
        selected.bottom = logical_h - 1;
    }
    full_window.intersect_inclusive(selected)
}

/// Extract the selected region of the canvas with all annotations applied.
///
/// Returns None when the selection does not overlap the window at all.
pub fn export_selection(canvas: &CanvasImage, log: &DrawLog, selection: Rect) -> Option<RgbaImage> {
    let source = export_rect(selection, canvas.logical_width(), canvas.logical_height())?;

    let mut flattened = canvas.image.clone();
    if let Some(mut renderer) = ImageStepRenderer::new(&flattened, (0.0, 0.0), canvas.scale) {
        log.replay(&mut renderer);
        renderer.finish(&mut flattened);
    }

    let scale = canvas.scale;
    let x = (source.left as f32 * scale) as u32;
    let y = (source.top as f32 * scale) as u32;
    let w = ((source.width() + 1) as f32 * scale) as u32;
    let h = ((source.height() + 1) as f32 * scale) as u32;
    log::debug!("Exporting {w}x{h} region at ({x}, {y})");
    Some(image::imageops::crop_imm(&flattened, x, y, w, h).to_image())
}

/// Encode an image as PNG into any writer
pub fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

/// Write the image to the chosen destination with the chosen encoding
pub fn save_to_file(img: &RgbaImage, target: &SaveTarget) -> anyhow::Result<()> {
    match target.kind {
        ImageKind::Png => {
            let mut file = std::fs::File::create(&target.path)?;
            write_png(&mut file, img)?;
        }
        ImageKind::Jpeg => {
            // JPEG has no alpha channel
            let rgb = image::DynamicImage::ImageRgba8(img.clone()).to_rgb8();
            rgb.save_with_format(&target.path, image::ImageFormat::Jpeg)?;
        }
    }
    log::debug!("Saved screenshot to {:?}", target.path);
    Ok(())
}

/// Default timestamped destination in the configured folder
pub fn default_save_path(location: SaveLocation) -> Option<PathBuf> {
    let mut path = match location {
        SaveLocation::Pictures => {
            dirs::picture_dir().or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
        }
        SaveLocation::Documents => {
            dirs::document_dir().or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
        }
    }?;
    let name = chrono::Local::now()
        .format("Screenshot_%Y-%m-%d_%H-%M-%S.png")
        .to_string();
    path.push(name);
    Some(path)
}
