//! Event types for the screenshot session
//!
//! Everything the outside world can tell the session arrives as one
//! `SessionEvent`; everything the session tells the outside world leaves
//! as one `SessionSignal`.

use image::RgbaImage;

use crate::config::{FontSpec, ShapeColor};
use crate::domain::Tool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

/// Single discriminated command from the tool panel.
///
/// Tool variants switch the persistent mode; undo/save/cancel/confirm are
/// one-shot and never retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelCommand {
    Select,
    MoveSelected,
    DrawRect,
    DrawEllipse,
    DrawArrow,
    DrawLine,
    DrawFreehand,
    DrawText,
    Undo,
    Save,
    Cancel,
    Confirm,
}

impl PanelCommand {
    /// The persistent tool this command selects, if it is a mode switch
    pub fn tool(&self) -> Option<Tool> {
        match self {
            PanelCommand::Select => Some(Tool::Select),
            PanelCommand::MoveSelected => Some(Tool::MoveSelected),
            PanelCommand::DrawRect => Some(Tool::DrawRect),
            PanelCommand::DrawEllipse => Some(Tool::DrawEllipse),
            PanelCommand::DrawArrow => Some(Tool::DrawArrow),
            PanelCommand::DrawLine => Some(Tool::DrawLine),
            PanelCommand::DrawFreehand => Some(Tool::DrawFreehand),
            PanelCommand::DrawText => Some(Tool::DrawText),
            PanelCommand::Undo
            | PanelCommand::Save
            | PanelCommand::Cancel
            | PanelCommand::Confirm => None,
        }
    }
}

/// Keyboard key as seen by the session shortcuts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Character(char),
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub ctrl: bool,
}

/// Input event consumed by the session's single event-handling path
#[derive(Debug, Clone)]
pub enum SessionEvent {
    MousePressed { x: i32, y: i32, button: MouseButton },
    MouseMoved { x: i32, y: i32 },
    MouseReleased { x: i32, y: i32, button: MouseButton },
    /// Command from the external tool panel
    Panel(PanelCommand),
    /// Style panel changed the pen color
    PenColor(ShapeColor),
    /// Style panel changed the pen width
    PenWidth(u32),
    /// Style panel changed the font
    Font(FontSpec),
    /// Live edit from the external text input
    TextChanged(String),
    TextConfirmed,
    TextCancelled,
    Key(KeyPress),
}

/// Outcome notification emitted while the session closes
#[derive(Debug, Clone)]
pub enum SessionSignal {
    /// The final image was produced (saved or copied)
    Captured(RgbaImage),
    /// The session window is gone; the blocking entry point may resume
    Closed,
}
