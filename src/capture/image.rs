//! Canvas stitching from per-display captures
//!
//! Each attached display contributes one raw bitmap at a virtual-desktop
//! offset. The stitched canvas covers the bounding box of all displays;
//! its origin is the box's top-left, which can be negative in screen
//! coordinates.

use image::RgbaImage;

use crate::domain::Rect;

/// One captured display: offset in virtual-desktop coordinates plus its
/// raw pixels
#[derive(Clone, Debug)]
pub struct Display {
    pub x: i32,
    pub y: i32,
    pub image: RgbaImage,
}

/// The full stitched screen bitmap, immutable after capture
#[derive(Clone, Debug)]
pub struct CanvasImage {
    pub image: RgbaImage,
    /// Virtual-desktop coordinate of the canvas top-left corner
    pub origin_x: i32,
    pub origin_y: i32,
    /// Device pixels per logical unit
    pub scale: f32,
}

impl CanvasImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Canvas width in logical units
    pub fn logical_width(&self) -> i32 {
        (self.image.width() as f32 / self.scale).round() as i32
    }

    /// Canvas height in logical units
    pub fn logical_height(&self) -> i32 {
        (self.image.height() as f32 / self.scale).round() as i32
    }

    /// Sample the pixel under a logical coordinate
    pub fn pixel_at_logical(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        if x < 0 || y < 0 {
            return None;
        }
        let px = (x as f32 * self.scale) as u32;
        let py = (y as f32 * self.scale) as u32;
        if px >= self.image.width() || py >= self.image.height() {
            return None;
        }
        Some(self.image.get_pixel(px, py).0)
    }
}

/// Composite per-display bitmaps into one canvas positioned by each
/// display's offset relative to the bounding box top-left.
///
/// Displays with empty bitmaps are tolerated: they still stretch the
/// bounding box but contribute no pixels, leaving a hole in the canvas.
pub fn stitch(displays: Vec<Display>, scale: f32) -> CanvasImage {
    let mut bounds: Option<Rect> = None;
    for display in &displays {
        let (w, h) = (display.image.width() as i32, display.image.height() as i32);
        if w == 0 || h == 0 {
            log::warn!("Display at ({}, {}) produced an empty bitmap", display.x, display.y);
        }
        let rect = Rect::new(
            display.x,
            display.y,
            display.x.saturating_add(w),
            display.y.saturating_add(h),
        );
        bounds = Some(match bounds.take() {
            Some(b) => Rect::new(
                b.left.min(rect.left),
                b.top.min(rect.top),
                b.right.max(rect.right),
                b.bottom.max(rect.bottom),
            ),
            None => rect,
        });
    }

    let bounds = bounds.unwrap_or_default();
    let width = bounds.width().max(0) as u32;
    let height = bounds.height().max(0) as u32;
    log::debug!(
        "Stitching {} display(s) into {width}x{height} at ({}, {})",
        displays.len(),
        bounds.left,
        bounds.top
    );

    let mut image = RgbaImage::new(width, height);
    for display in displays {
        let x = i64::from(display.x) - i64::from(bounds.left);
        let y = i64::from(display.y) - i64::from(bounds.top);
        image::imageops::overlay(&mut image, &display.image, x, y);
    }

    CanvasImage {
        image,
        origin_x: bounds.left,
        origin_y: bounds.top,
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, value: u8) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba([value, value, value, 255]))
    }

    #[test]
    fn test_stitch_two_side_by_side_displays() {
        // Left 1920x1080 at (0,0), right 1280x1024 at (1920,0)
        let canvas = stitch(
            vec![
                Display {
                    x: 0,
                    y: 0,
                    image: solid(1920, 1080, 10),
                },
                Display {
                    x: 1920,
                    y: 0,
                    image: solid(1280, 1024, 200),
                },
            ],
            1.0,
        );

        assert_eq!((canvas.width(), canvas.height()), (3200, 1080));
        assert_eq!((canvas.origin_x, canvas.origin_y), (0, 0));
        // Right-display pixels start at x offset 1920
        assert_eq!(canvas.image.get_pixel(1919, 100)[0], 10);
        assert_eq!(canvas.image.get_pixel(1920, 100)[0], 200);
        // Below the shorter right display there are no pixels
        assert_eq!(canvas.image.get_pixel(2000, 1050)[3], 0);
    }

    #[test]
    fn test_stitch_negative_origin() {
        let canvas = stitch(
            vec![
                Display {
                    x: -100,
                    y: -50,
                    image: solid(100, 50, 1),
                },
                Display {
                    x: 0,
                    y: 0,
                    image: solid(200, 100, 2),
                },
            ],
            1.0,
        );
        assert_eq!((canvas.origin_x, canvas.origin_y), (-100, -50));
        assert_eq!((canvas.width(), canvas.height()), (300, 150));
        assert_eq!(canvas.image.get_pixel(0, 0)[0], 1);
        assert_eq!(canvas.image.get_pixel(100, 50)[0], 2);
    }

    #[test]
    fn test_stitch_tolerates_empty_bitmap() {
        let canvas = stitch(
            vec![
                Display {
                    x: 0,
                    y: 0,
                    image: RgbaImage::new(0, 0),
                },
                Display {
                    x: 100,
                    y: 0,
                    image: solid(50, 50, 7),
                },
            ],
            1.0,
        );
        // The empty display still stretches the bounding box
        assert_eq!((canvas.width(), canvas.height()), (150, 50));
        assert_eq!(canvas.image.get_pixel(120, 10)[0], 7);
        assert_eq!(canvas.image.get_pixel(10, 10)[3], 0);
    }

    #[test]
    fn test_stitch_no_displays() {
        let canvas = stitch(Vec::new(), 1.0);
        assert_eq!((canvas.width(), canvas.height()), (0, 0));
    }

    #[test]
    fn test_pixel_at_logical_bounds() {
        let canvas = stitch(
            vec![Display {
                x: 0,
                y: 0,
                image: solid(10, 10, 42),
            }],
            1.0,
        );
        assert_eq!(canvas.pixel_at_logical(5, 5), Some([42, 42, 42, 255]));
        assert_eq!(canvas.pixel_at_logical(-1, 5), None);
        assert_eq!(canvas.pixel_at_logical(10, 5), None);
    }
}
