//! Session state and command handling
//!
//! One `Session` owns all mutable state of a single screenshot: the
//! selection rectangle, the active tool, the draw log, style state, and
//! the text edit state. All mutation happens on the single event-handling
//! path; redraw only reads.

use ab_glyph::FontArc;
use crossbeam_channel::Receiver;
use image::RgbaImage;

use super::events;
use super::messages::{MouseButton, PanelCommand, SessionEvent, SessionSignal};
use super::ports::Collaborators;
use super::shortcuts;
use crate::annotations::DrawLog;
use crate::capture::export;
use crate::capture::image::CanvasImage;
use crate::config::{Config, FontSpec, ShapeColor};
use crate::domain::{DrawStep, PenStyle, Rect, Tool, Zone};
use crate::render::{compose, text};

pub struct Session {
    pub(crate) canvas: CanvasImage,
    /// Current selection; the all-zero rect means no selection yet
    pub(crate) selection: Rect,
    /// Selection as it was when the current drag started; resize deltas
    /// are applied against this
    pub(crate) selection_raw: Rect,
    pub(crate) tool: Tool,
    pub(crate) zone: Zone,
    pub(crate) mouse_pressed: bool,
    pub(crate) press_x: i32,
    pub(crate) press_y: i32,
    pub(crate) cursor_x: i32,
    pub(crate) cursor_y: i32,
    pub(crate) freehand_path: Vec<(f32, f32)>,
    pub(crate) log: DrawLog,
    pub(crate) pen: PenStyle,
    pub(crate) font: FontSpec,
    pub(crate) loaded_font: Option<FontArc>,
    pub(crate) text_anchor: Option<(i32, i32)>,
    pub(crate) text_buffer: String,
    /// Measured bounds of the live text preview, used to place the overlay
    pub(crate) text_size: Option<(f32, f32)>,
    pub(crate) config: Config,
    pub(crate) collaborators: Collaborators,
    pub(crate) result: Option<RgbaImage>,
    pub(crate) closed: bool,
}

impl Session {
    pub fn new(canvas: CanvasImage, config: Config, collaborators: Collaborators) -> Self {
        let pen = PenStyle::new(config.pen_color, config.pen_width);
        let font = config.font.clone();
        let loaded_font = text::load_font(&font);
        Self {
            canvas,
            selection: Rect::default(),
            selection_raw: Rect::default(),
            tool: Tool::Select,
            zone: Zone::Outside,
            mouse_pressed: false,
            press_x: 0,
            press_y: 0,
            cursor_x: 0,
            cursor_y: 0,
            freehand_path: Vec::new(),
            log: DrawLog::new(),
            pen,
            font,
            loaded_font,
            text_anchor: None,
            text_buffer: String::new(),
            text_size: None,
            config,
            collaborators,
            result: None,
            closed: false,
        }
    }

    pub fn canvas(&self) -> &CanvasImage {
        &self.canvas
    }

    pub fn selection(&self) -> Rect {
        self.selection
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn log(&self) -> &DrawLog {
        &self.log
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Drive the session until it closes, recomposing after every event.
    ///
    /// This is the synchronous façade over the event-driven core: the call
    /// blocks on the event channel and resumes only when a close command
    /// (or a disconnected channel) ends the session.
    pub fn run(mut self, events: Receiver<SessionEvent>) -> Option<RgbaImage> {
        self.redraw();
        while let Ok(event) = events.recv() {
            self.handle_event(event);
            if self.closed {
                break;
            }
            self.redraw();
        }
        self.result
    }

    /// Dispatch one input event through the single mutation path
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::MousePressed { x, y, button } => {
                if button == MouseButton::Left {
                    events::handle_mouse_pressed(self, x, y);
                }
            }
            SessionEvent::MouseMoved { x, y } => events::handle_mouse_moved(self, x, y),
            SessionEvent::MouseReleased { x, y, button } => {
                if button == MouseButton::Left {
                    events::handle_mouse_released(self, x, y);
                }
            }
            SessionEvent::Panel(command) => self.handle_panel_command(command),
            SessionEvent::PenColor(color) => self.set_pen_color(color),
            SessionEvent::PenWidth(width) => self.set_pen_width(width),
            SessionEvent::Font(font) => self.set_font(font),
            SessionEvent::TextChanged(text) => self.text_changed(text),
            SessionEvent::TextConfirmed => self.text_confirm(),
            SessionEvent::TextCancelled => self.text_cancel(),
            SessionEvent::Key(key) => {
                if let Some(command) = shortcuts::command_for_key(&key) {
                    self.handle_panel_command(command);
                }
            }
        }
    }

    /// Recompose the frame and hand it to the windowing layer
    pub fn redraw(&mut self) {
        let frame = compose::compose(self);
        self.collaborators.frames.present(&frame);
    }

    pub(crate) fn handle_panel_command(&mut self, command: PanelCommand) {
        match command {
            PanelCommand::Undo => self.undo_operation(),
            PanelCommand::Save => self.save_operation(),
            PanelCommand::Cancel => self.close(),
            PanelCommand::Confirm => self.confirm_operation(),
            _ => {
                if let Some(tool) = command.tool() {
                    log::debug!("Switching tool to {tool:?}");
                    self.tool = tool;
                    // Mode switches abandon any in-progress shape; a live
                    // text edit survives until confirmed or cancelled
                    self.log.abandon_non_text_pending();
                }
            }
        }
    }

    /// Undo acts on drawings first, then on the selection itself
    pub(crate) fn undo_operation(&mut self) {
        if !self.log.undo_step() {
            self.selection = Rect::default();
            self.selection_raw = Rect::default();
            self.tool = Tool::Select;
        }
    }

    pub(crate) fn set_pen_color(&mut self, color: ShapeColor) {
        self.pen.color = color;
    }

    pub(crate) fn set_pen_width(&mut self, width: u32) {
        self.pen.width = width;
    }

    pub(crate) fn set_font(&mut self, font: FontSpec) {
        self.loaded_font = text::load_font(&font);
        self.font = font;
    }

    pub(crate) fn text_changed(&mut self, content: String) {
        let Some((x, y)) = self.text_anchor else {
            return;
        };
        self.text_size = Some(text::measure(
            self.loaded_font.as_ref(),
            &content,
            self.font.size,
        ));
        self.log.set_pending(DrawStep::Text {
            x: x as f32,
            y: y as f32,
            text: content.clone(),
            font: self.font.clone(),
            color: self.pen.color,
        });
        self.text_buffer = content;
    }

    pub(crate) fn text_confirm(&mut self) {
        let Some((x, y)) = self.text_anchor.take() else {
            return;
        };
        self.log.push(DrawStep::Text {
            x: x as f32,
            y: y as f32,
            text: std::mem::take(&mut self.text_buffer),
            font: self.font.clone(),
            color: self.pen.color,
        });
        self.log.clear_pending();
        self.text_size = None;
    }

    pub(crate) fn text_cancel(&mut self) {
        self.log.clear_pending();
        self.text_anchor = None;
        self.text_buffer.clear();
        self.text_size = None;
    }

    /// Save to a file picked by the dialog; a cancelled dialog is a no-op
    pub(crate) fn save_operation(&mut self) {
        if self.selection.is_null() {
            log::warn!("Save requested without a selection");
            return;
        }
        let Some(target) = self.collaborators.save_dialog.pick_save_path() else {
            return;
        };
        let Some(img) = export::export_selection(&self.canvas, &self.log, self.selection) else {
            log::warn!("Selection is entirely outside the canvas");
            return;
        };
        if let Err(err) = export::save_to_file(&img, &target) {
            log::error!("Failed to save screenshot: {err:?}");
            return;
        }
        if self.config.copy_to_clipboard_on_save
            && let Err(err) = self.collaborators.clipboard.set_image(&img)
        {
            log::error!("Failed to copy screenshot to clipboard: {err:?}");
        }
        self.finish(img);
    }

    /// Confirm copies the selection to the clipboard and closes
    pub(crate) fn confirm_operation(&mut self) {
        if self.selection.is_null() {
            log::warn!("Confirm requested without a selection");
            return;
        }
        let Some(img) = export::export_selection(&self.canvas, &self.log, self.selection) else {
            log::warn!("Selection is entirely outside the canvas");
            return;
        };
        if let Err(err) = self.collaborators.clipboard.set_image(&img) {
            log::error!("Failed to copy screenshot to clipboard: {err:?}");
        }
        self.finish(img);
    }

    fn finish(&mut self, img: RgbaImage) {
        if let Some(signals) = &self.collaborators.signals
            && let Err(err) = signals.send(SessionSignal::Captured(img.clone()))
        {
            log::debug!("No listener for captured signal: {err:?}");
        }
        self.result = Some(img);
        self.close();
    }

    pub(crate) fn close(&mut self) {
        self.closed = true;
        if let Some(signals) = &self.collaborators.signals
            && let Err(err) = signals.send(SessionSignal::Closed)
        {
            log::debug!("No listener for closed signal: {err:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::backend::DirectSave;
    use crate::capture::export::SaveTarget;
    use crate::session::messages::{PanelCommand, SessionEvent};
    use crate::session::ports::NoopFrameSink;
    use crate::session::testing::{self, MemoryClipboard, SharedClipboard, drag, press, release};

    fn draw_one_line(session: &mut Session) {
        session.handle_event(SessionEvent::Panel(PanelCommand::DrawLine));
        press(session, 120, 120);
        drag(session, 200, 200);
        release(session, 200, 200);
    }

    fn selected_session() -> Session {
        let mut session = testing::session(400, 300);
        press(&mut session, 100, 100);
        drag(&mut session, 300, 250);
        release(&mut session, 300, 250);
        session
    }

    #[test]
    fn test_undo_pops_drawings_then_resets_selection() {
        let mut session = selected_session();
        draw_one_line(&mut session);
        draw_one_line(&mut session);
        assert_eq!(session.log.len(), 2);

        session.handle_event(SessionEvent::Panel(PanelCommand::Undo));
        assert_eq!(session.log.len(), 1);
        assert_eq!(session.tool, Tool::DrawLine);

        session.handle_event(SessionEvent::Panel(PanelCommand::Undo));
        assert_eq!(session.log.len(), 0);
        assert!(!session.selection.is_null());

        // Log empty: the next undo resets the selection and tool
        session.handle_event(SessionEvent::Panel(PanelCommand::Undo));
        assert!(session.selection.is_null());
        assert_eq!(session.tool, Tool::Select);

        // And once everything is empty, undo is a no-op
        session.handle_event(SessionEvent::Panel(PanelCommand::Undo));
        assert!(session.selection.is_null());
        assert_eq!(session.tool, Tool::Select);
        assert!(!session.is_closed());
    }

    #[test]
    fn test_mode_switch_abandons_shape_pending() {
        let mut session = selected_session();
        session.handle_event(SessionEvent::Panel(PanelCommand::DrawRect));
        press(&mut session, 120, 120);
        drag(&mut session, 200, 200);
        assert!(session.log.pending().is_some());

        session.handle_event(SessionEvent::Panel(PanelCommand::DrawArrow));
        assert!(session.log.pending().is_none());
        assert_eq!(session.tool, Tool::DrawArrow);
    }

    #[test]
    fn test_text_flow_confirm() {
        let mut session = selected_session();
        session.handle_event(SessionEvent::Panel(PanelCommand::DrawText));
        press(&mut session, 150, 150);
        release(&mut session, 150, 150);
        assert_eq!(session.text_anchor, Some((150, 150)));

        session.handle_event(SessionEvent::TextChanged("note".to_string()));
        assert!(session.log.pending().is_some_and(|s| s.is_text()));
        assert!(session.text_size.is_some());

        // A live text edit survives switching tools
        session.handle_event(SessionEvent::Panel(PanelCommand::DrawArrow));
        assert!(session.log.pending().is_some());
        session.handle_event(SessionEvent::Panel(PanelCommand::DrawText));

        session.handle_event(SessionEvent::TextConfirmed);
        assert_eq!(session.log.len(), 1);
        assert!(session.log.pending().is_none());
        assert_eq!(session.text_anchor, None);
        match session.log.steps().next() {
            Some(DrawStep::Text { x, y, text, .. }) => {
                assert_eq!((*x, *y), (150.0, 150.0));
                assert_eq!(text, "note");
            }
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn test_text_flow_cancel() {
        let mut session = selected_session();
        session.handle_event(SessionEvent::Panel(PanelCommand::DrawText));
        press(&mut session, 150, 150);
        session.handle_event(SessionEvent::TextChanged("oops".to_string()));

        session.handle_event(SessionEvent::TextCancelled);
        assert!(session.log.is_empty());
        assert!(session.log.pending().is_none());
        assert_eq!(session.text_anchor, None);
        assert_eq!(session.text_size, None);

        // After cancel the next click places a fresh anchor
        press(&mut session, 200, 180);
        assert_eq!(session.text_anchor, Some((200, 180)));
    }

    #[test]
    fn test_second_click_keeps_first_anchor() {
        let mut session = selected_session();
        session.handle_event(SessionEvent::Panel(PanelCommand::DrawText));
        press(&mut session, 150, 150);
        release(&mut session, 150, 150);
        press(&mut session, 220, 220);
        assert_eq!(session.text_anchor, Some((150, 150)));
    }

    #[test]
    fn test_style_is_snapshotted_per_step() {
        let mut session = selected_session();
        session.handle_event(SessionEvent::PenWidth(7));
        draw_one_line(&mut session);
        session.handle_event(SessionEvent::PenWidth(1));

        match session.log.steps().next() {
            Some(DrawStep::Line { style, .. }) => assert_eq!(style.width, 7),
            other => panic!("unexpected step {other:?}"),
        }
        assert_eq!(session.pen.width, 1);
    }

    #[test]
    fn test_confirm_copies_and_closes() {
        let clipboard = SharedClipboard::default();
        let mut session = Session::new(
            testing::canvas(400, 300),
            Config::default(),
            testing::collaborators(clipboard.clone()),
        );
        press(&mut session, 100, 100);
        drag(&mut session, 300, 250);
        release(&mut session, 300, 250);

        session.handle_event(SessionEvent::Panel(PanelCommand::Confirm));
        assert!(session.is_closed());
        let copied = clipboard.0.borrow();
        let img = copied.as_ref().expect("clipboard holds the capture");
        assert_eq!((img.width(), img.height()), (201, 151));
    }

    #[test]
    fn test_save_writes_file_and_optionally_copies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let clipboard = SharedClipboard::default();
        let collaborators = Collaborators {
            clipboard: Box::new(MemoryClipboard(clipboard.clone())),
            save_dialog: Box::new(DirectSave {
                target: SaveTarget::new(path.clone()),
            }),
            frames: Box::new(NoopFrameSink),
            signals: None,
        };
        let config = Config {
            copy_to_clipboard_on_save: true,
            ..Config::default()
        };
        let mut session = Session::new(testing::canvas(400, 300), config, collaborators);
        press(&mut session, 0, 0);
        drag(&mut session, 399, 299);
        release(&mut session, 399, 299);

        session.handle_event(SessionEvent::Panel(PanelCommand::Save));
        assert!(session.is_closed());
        assert!(path.exists());
        assert!(clipboard.0.borrow().is_some());

        let saved = image::open(&path).unwrap().to_rgba8();
        assert_eq!((saved.width(), saved.height()), (400, 300));
    }
}
