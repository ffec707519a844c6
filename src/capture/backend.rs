//! Desktop backends for the session's collaborator ports
//!
//! These adapt real desktop services (xcap monitors, the arboard clipboard,
//! rfd save dialogs) to the port traits the session core is written
//! against.

use anyhow::Context;
use image::RgbaImage;

use super::export::SaveTarget;
use super::image::Display;
use crate::config::SaveLocation;
use crate::session::ports::{ClipboardPort, DisplaySource, SaveDialogPort};

/// Display enumeration backed by xcap
#[derive(Default)]
pub struct XcapDisplays;

impl DisplaySource for XcapDisplays {
    fn list_displays(&mut self) -> anyhow::Result<Vec<Display>> {
        let monitors = xcap::Monitor::all().context("enumerating monitors")?;
        let mut displays = Vec::with_capacity(monitors.len());
        for monitor in monitors {
            let x = monitor.x().context("monitor position")?;
            let y = monitor.y().context("monitor position")?;
            let image = match monitor.capture_image() {
                Ok(image) => image,
                Err(err) => {
                    // A display that cannot be grabbed degrades to a
                    // transparent placeholder of its advertised size
                    log::warn!("Failed to capture monitor at ({x}, {y}): {err:?}");
                    let w = monitor.width().unwrap_or(0);
                    let h = monitor.height().unwrap_or(0);
                    RgbaImage::new(w, h)
                }
            };
            log::debug!(
                "Captured monitor at ({x}, {y}): {}x{}",
                image.width(),
                image.height()
            );
            displays.push(Display { x, y, image });
        }
        Ok(displays)
    }
}

/// Clipboard delivery backed by arboard
#[derive(Default)]
pub struct ArboardClipboard {
    clipboard: Option<arboard::Clipboard>,
}

impl ClipboardPort for ArboardClipboard {
    fn set_image(&mut self, img: &RgbaImage) -> anyhow::Result<()> {
        if self.clipboard.is_none() {
            self.clipboard = Some(arboard::Clipboard::new().context("opening clipboard")?);
        }
        let Some(clipboard) = self.clipboard.as_mut() else {
            anyhow::bail!("clipboard unavailable");
        };
        clipboard
            .set_image(arboard::ImageData {
                width: img.width() as usize,
                height: img.height() as usize,
                bytes: std::borrow::Cow::Borrowed(img.as_raw()),
            })
            .context("writing image to clipboard")?;
        Ok(())
    }
}

/// Save-destination picker backed by an rfd file dialog
pub struct RfdSaveDialog {
    pub location: SaveLocation,
}

impl SaveDialogPort for RfdSaveDialog {
    fn pick_save_path(&mut self) -> Option<SaveTarget> {
        let mut dialog = rfd::FileDialog::new()
            .set_title("Save screenshot")
            .add_filter("PNG image", &["png"])
            .add_filter("JPEG image", &["jpg", "jpeg"]);
        if let Some(default) = super::export::default_save_path(self.location) {
            if let Some(dir) = default.parent() {
                dialog = dialog.set_directory(dir);
            }
            if let Some(name) = default.file_name().and_then(|n| n.to_str()) {
                dialog = dialog.set_file_name(name);
            }
        }
        // A cancelled dialog is a no-op; the session stays open
        dialog.save_file().map(SaveTarget::new)
    }
}

/// Non-interactive save destination for scripted captures
pub struct DirectSave {
    pub target: SaveTarget,
}

impl SaveDialogPort for DirectSave {
    fn pick_save_path(&mut self) -> Option<SaveTarget> {
        Some(self.target.clone())
    }
}
