//! Tool modes and cursor shapes for the screenshot session

use super::geometry::Zone;

/// Persistent interaction mode of the session
///
/// One-shot commands (undo, save, cancel, confirm) arrive on the same
/// panel channel but are never retained as a mode.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Defining a new selection rectangle
    #[default]
    Select,
    /// Selection exists; presses move or resize it
    MoveSelected,
    DrawRect,
    DrawEllipse,
    DrawArrow,
    DrawLine,
    DrawFreehand,
    DrawText,
}

impl Tool {
    /// Whether this tool draws annotations (as opposed to shaping the
    /// selection rectangle)
    pub fn is_draw_tool(&self) -> bool {
        matches!(
            self,
            Tool::DrawRect
                | Tool::DrawEllipse
                | Tool::DrawArrow
                | Tool::DrawLine
                | Tool::DrawFreehand
                | Tool::DrawText
        )
    }
}

/// Cursor glyph the windowing layer should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    Arrow,
    Crosshair,
    /// Horizontal resize (west/east edges)
    ResizeHorizontal,
    /// Vertical resize (north/south edges)
    ResizeVertical,
    /// Main-diagonal resize (north-west/south-east corners)
    ResizeDiagonal,
    /// Anti-diagonal resize (north-east/south-west corners)
    ResizeAntiDiagonal,
    /// Open hand over the selection interior
    OpenHand,
}

/// Cursor style as a pure function of tool and zone
pub fn cursor_shape(tool: Tool, zone: Zone) -> CursorShape {
    if tool.is_draw_tool() {
        return CursorShape::Crosshair;
    }
    match zone {
        Zone::W | Zone::E => CursorShape::ResizeHorizontal,
        Zone::N | Zone::S => CursorShape::ResizeVertical,
        Zone::NW | Zone::SE => CursorShape::ResizeDiagonal,
        Zone::NE | Zone::SW => CursorShape::ResizeAntiDiagonal,
        Zone::Inside => CursorShape::OpenHand,
        Zone::Outside => CursorShape::Arrow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_tools_always_crosshair() {
        for zone in [Zone::Inside, Zone::Outside, Zone::NW, Zone::S] {
            assert_eq!(cursor_shape(Tool::DrawArrow, zone), CursorShape::Crosshair);
            assert_eq!(cursor_shape(Tool::DrawText, zone), CursorShape::Crosshair);
        }
    }

    #[test]
    fn test_select_cursor_follows_zone() {
        assert_eq!(
            cursor_shape(Tool::MoveSelected, Zone::W),
            CursorShape::ResizeHorizontal
        );
        assert_eq!(
            cursor_shape(Tool::MoveSelected, Zone::N),
            CursorShape::ResizeVertical
        );
        assert_eq!(
            cursor_shape(Tool::MoveSelected, Zone::SE),
            CursorShape::ResizeDiagonal
        );
        assert_eq!(
            cursor_shape(Tool::MoveSelected, Zone::SW),
            CursorShape::ResizeAntiDiagonal
        );
        assert_eq!(
            cursor_shape(Tool::MoveSelected, Zone::Inside),
            CursorShape::OpenHand
        );
        assert_eq!(cursor_shape(Tool::Select, Zone::Outside), CursorShape::Arrow);
    }
}
