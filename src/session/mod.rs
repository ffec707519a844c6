//! The screenshot session
//!
//! This module contains:
//! - Event and signal types exchanged with the collaborators (messages.rs)
//! - Collaborator port traits (ports.rs)
//! - Session state and command handling (state.rs)
//! - Mouse handling for the interaction state machine (events.rs)
//! - Keyboard shortcuts (shortcuts.rs)
//! - The blocking `take_screenshot` entry point

mod events;
pub mod messages;
pub mod ports;
pub mod shortcuts;
pub mod state;

use crossbeam_channel::Receiver;
use image::RgbaImage;

pub use messages::{Key, KeyPress, MouseButton, PanelCommand, SessionEvent, SessionSignal};
pub use ports::{ClipboardPort, Collaborators, DisplaySource, FrameSink, SaveDialogPort};
pub use state::Session;

use crate::config::Config;

/// Capture all displays and run a screenshot session to completion.
///
/// Blocks the calling context until the session closes (confirm, save,
/// cancel or escape) and returns the final image, or None when the user
/// cancelled.
pub fn take_screenshot(
    source: &mut dyn DisplaySource,
    scale: f32,
    config: Config,
    collaborators: Collaborators,
    events: Receiver<SessionEvent>,
) -> anyhow::Result<Option<RgbaImage>> {
    let displays = source.list_displays()?;
    let canvas = crate::capture::stitch(displays, scale);
    log::debug!(
        "Session canvas {}x{} at ({}, {})",
        canvas.width(),
        canvas.height(),
        canvas.origin_x,
        canvas.origin_y
    );
    let session = Session::new(canvas, config, collaborators);
    Ok(session.run(events))
}


#[cfg(test)]
mod tests {
    use super::testing::{self, SharedClipboard};
    use super::*;
    use crate::capture::image::Display;
    use crate::domain::{Rect, Tool};

    struct FakeDisplays;

    impl DisplaySource for FakeDisplays {
        fn list_displays(&mut self) -> anyhow::Result<Vec<Display>> {
            Ok(vec![Display {
                x: 0,
                y: 0,
                image: RgbaImage::from_pixel(640, 480, image::Rgba([10, 20, 30, 255])),
            }])
        }
    }

    #[test]
    fn test_take_screenshot_scripted_confirm() {
        let clipboard = SharedClipboard::default();
        let (signal_tx, signal_rx) = crossbeam_channel::unbounded();
        let mut collaborators = testing::collaborators(clipboard.clone());
        collaborators.signals = Some(signal_tx);

        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(SessionEvent::MousePressed {
            x: 0,
            y: 0,
            button: MouseButton::Left,
        })
        .unwrap();
        tx.send(SessionEvent::MouseMoved { x: 639, y: 479 }).unwrap();
        tx.send(SessionEvent::MouseReleased {
            x: 639,
            y: 479,
            button: MouseButton::Left,
        })
        .unwrap();
        tx.send(SessionEvent::Panel(PanelCommand::Confirm)).unwrap();
        drop(tx);

        let result = take_screenshot(
            &mut FakeDisplays,
            1.0,
            crate::config::Config::default(),
            collaborators,
            rx,
        )
        .unwrap();

        let img = result.expect("confirm produces an image");
        assert_eq!((img.width(), img.height()), (640, 480));
        assert!(clipboard.0.borrow().is_some());

        // Captured then Closed
        assert!(matches!(
            signal_rx.try_recv().unwrap(),
            SessionSignal::Captured(_)
        ));
        assert!(matches!(signal_rx.try_recv().unwrap(), SessionSignal::Closed));
    }

    #[test]
    fn test_take_screenshot_cancelled() {
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(SessionEvent::Key(KeyPress {
            key: Key::Escape,
            ctrl: false,
        }))
        .unwrap();
        drop(tx);

        let result = take_screenshot(
            &mut FakeDisplays,
            1.0,
            crate::config::Config::default(),
            testing::collaborators(SharedClipboard::default()),
            rx,
        )
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_session_survives_cancelled_save_dialog() {
        let mut session = testing::session(400, 300);
        testing::press(&mut session, 10, 10);
        testing::drag(&mut session, 200, 150);
        testing::release(&mut session, 200, 150);

        // NoDialog cancels; the session must stay open with its state
        session.handle_event(SessionEvent::Panel(PanelCommand::Save));
        assert!(!session.is_closed());
        assert_eq!(session.selection(), Rect::new(10, 10, 200, 150));
        assert_eq!(session.tool(), Tool::MoveSelected);
    }

    #[test]
    fn test_confirm_without_selection_is_noop() {
        let mut session = testing::session(400, 300);
        session.handle_event(SessionEvent::Panel(PanelCommand::Confirm));
        assert!(!session.is_closed());
    }

    #[test]
    fn test_right_button_is_ignored() {
        let mut session = testing::session(400, 300);
        session.handle_event(SessionEvent::MousePressed {
            x: 10,
            y: 10,
            button: MouseButton::Right,
        });
        assert_eq!(session.selection(), Rect::default());
        session.handle_event(SessionEvent::MouseReleased {
            x: 50,
            y: 50,
            button: MouseButton::Right,
        });
        assert_eq!(session.tool(), Tool::Select);
    }
}
