//! Collaborator ports for the screenshot session
//!
//! The session core never talks to the desktop directly; capture,
//! clipboard, save dialog and the windowing layer are all reached through
//! these traits. Desktop implementations live in `capture::backend`.

use crossbeam_channel::Sender;
use image::RgbaImage;

use super::messages::SessionSignal;
use crate::capture::image::Display;
use crate::capture::export::SaveTarget;
use crate::render::compose::Frame;

/// Source of per-display captures, consumed once at session start
pub trait DisplaySource {
    fn list_displays(&mut self) -> anyhow::Result<Vec<Display>>;
}

/// Clipboard delivery for the final image
pub trait ClipboardPort {
    fn set_image(&mut self, img: &RgbaImage) -> anyhow::Result<()>;
}

/// Destination picker for file saves.
///
/// Returning None means the user cancelled; the session treats that as a
/// no-op and stays open.
pub trait SaveDialogPort {
    fn pick_save_path(&mut self) -> Option<SaveTarget>;
}

/// Receiver for composed frames, one per state change
pub trait FrameSink {
    fn present(&mut self, frame: &Frame);
}

/// Frame sink that discards frames (headless runs and tests)
#[derive(Default)]
pub struct NoopFrameSink;

impl FrameSink for NoopFrameSink {
    fn present(&mut self, _frame: &Frame) {}
}

/// Everything a session needs from its environment, passed explicitly at
/// construction instead of looked up globally
pub struct Collaborators {
    pub clipboard: Box<dyn ClipboardPort>,
    pub save_dialog: Box<dyn SaveDialogPort>,
    pub frames: Box<dyn FrameSink>,
    /// Optional outcome notifications (captured / closed)
    pub signals: Option<Sender<SessionSignal>>,
}
