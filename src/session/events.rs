//! Mouse handling for the interaction state machine
//!
//! Press/move/release semantics depend on the active tool and, in the
//! select/move modes, on the zone the press landed in. Resize deltas are
//! applied against the raw rectangle captured when the drag started.

use super::state::Session;
use crate::domain::{DrawStep, Rect, Tool, Zone};

pub(crate) fn handle_mouse_pressed(session: &mut Session, x: i32, y: i32) {
    session.press_x = x;
    session.press_y = y;

    match session.tool {
        Tool::Select => match session.zone {
            Zone::Outside => {
                session.mouse_pressed = true;
                session.selection = Rect::new(x, y, x, y);
            }
            Zone::Inside => {
                session.mouse_pressed = true;
            }
            _ => {}
        },
        Tool::MoveSelected => {
            if session.zone == Zone::Outside {
                // Press outside the selection restarts a fresh one
                session.tool = Tool::Select;
                session.selection = Rect::new(x, y, x, y);
            }
            session.mouse_pressed = true;
        }
        Tool::DrawFreehand => {
            session.mouse_pressed = true;
            session.freehand_path.clear();
            session.freehand_path.push((x as f32, y as f32));
        }
        Tool::DrawText => {
            session.mouse_pressed = true;
            if session.text_anchor.is_none() {
                session.text_anchor = Some((x, y));
                session.text_size = None;
            }
        }
        _ => {
            session.mouse_pressed = true;
        }
    }
}

pub(crate) fn handle_mouse_moved(session: &mut Session, x: i32, y: i32) {
    session.cursor_x = x;
    session.cursor_y = y;

    if !session.mouse_pressed {
        session.zone = Zone::classify(session.selection.normalized(), x, y);
        return;
    }

    match session.tool {
        Tool::Select => {
            session.selection.right = x;
            session.selection.bottom = y;
        }
        Tool::MoveSelected => move_or_resize(session, x, y),
        Tool::DrawRect => {
            if let Some(step) = clipped_box_step(session, x, y, BoxKind::Rect) {
                session.log.set_pending(step);
            } else {
                session.log.clear_pending();
            }
        }
        Tool::DrawEllipse => {
            if let Some(step) = clipped_box_step(session, x, y, BoxKind::Ellipse) {
                session.log.set_pending(step);
            } else {
                session.log.clear_pending();
            }
        }
        Tool::DrawArrow => {
            let step = clamped_line_step(session, x, y, true);
            session.log.set_pending(step);
        }
        Tool::DrawLine => {
            let step = clamped_line_step(session, x, y, false);
            session.log.set_pending(step);
        }
        Tool::DrawFreehand => {
            let (cx, cy) = clamp_to_selection(session, x, y);
            session.freehand_path.push((cx as f32, cy as f32));
            session.log.set_pending(DrawStep::Freehand {
                points: session.freehand_path.clone(),
                style: session.pen,
            });
        }
        Tool::DrawText => {}
    }
}

pub(crate) fn handle_mouse_released(session: &mut Session, x: i32, y: i32) {
    if !session.mouse_pressed {
        return;
    }
    session.mouse_pressed = false;

    match session.tool {
        Tool::Select => {
            session.selection.right = x;
            session.selection.bottom = y;
            session.selection = session.selection.normalized();
            session.selection_raw = session.selection;
            session.tool = Tool::MoveSelected;
        }
        Tool::MoveSelected => {
            session.selection_raw = session.selection;
        }
        Tool::DrawRect => {
            if let Some(step) = clipped_box_step(session, x, y, BoxKind::Rect) {
                session.log.push(step);
            }
            session.log.clear_pending();
        }
        Tool::DrawEllipse => {
            if let Some(step) = clipped_box_step(session, x, y, BoxKind::Ellipse) {
                session.log.push(step);
            }
            session.log.clear_pending();
        }
        Tool::DrawArrow => {
            let step = clamped_line_step(session, x, y, true);
            session.log.push(step);
            session.log.clear_pending();
        }
        Tool::DrawLine => {
            let step = clamped_line_step(session, x, y, false);
            session.log.push(step);
            session.log.clear_pending();
        }
        Tool::DrawFreehand => {
            session.log.push(DrawStep::Freehand {
                points: std::mem::take(&mut session.freehand_path),
                style: session.pen,
            });
            session.log.clear_pending();
        }
        // Text commits through the confirm event, not the mouse
        Tool::DrawText => {}
    }
}

/// Drag the whole selection (clamped to the canvas) or resize the grabbed
/// edge/corner.
///
/// Left/top edges and the corners only reposition the grabbed side;
/// right/bottom are deliberately left unclamped against the canvas far
/// bounds. A west-edge drag that would cross the right edge is ignored.
fn move_or_resize(session: &mut Session, x: i32, y: i32) {
    let raw = session.selection_raw;
    session.selection = raw;
    let dx = x - session.press_x;
    let dy = y - session.press_y;

    match session.zone {
        Zone::Inside => {
            let width = raw.width();
            let height = raw.height();
            let canvas_w = session.canvas.logical_width();
            let canvas_h = session.canvas.logical_height();
            let mut rect = raw;

            let move_to_x = dx + raw.left;
            if 0 <= move_to_x && move_to_x <= canvas_w - 1 - width {
                rect.left = move_to_x;
                rect.right = move_to_x + width;
            }
            let move_to_y = dy + raw.top;
            if 0 <= move_to_y && move_to_y <= canvas_h - 1 - height {
                rect.top = move_to_y;
                rect.bottom = move_to_y + height;
            }

            session.selection = rect.normalized();
            session.selection_raw = session.selection;
            // Inside drags are incremental; the next delta is relative to
            // the position just applied
            session.press_x = x;
            session.press_y = y;
        }
        Zone::W => {
            let move_to_x = dx + raw.left;
            if move_to_x <= raw.right {
                session.selection.left = move_to_x;
                session.selection = session.selection.normalized();
            }
        }
        Zone::E => {
            session.selection.right = dx + raw.right;
            session.selection = session.selection.normalized();
        }
        Zone::N => {
            session.selection.top = dy + raw.top;
            session.selection = session.selection.normalized();
        }
        Zone::S => {
            session.selection.bottom = dy + raw.bottom;
            session.selection = session.selection.normalized();
        }
        Zone::NW => {
            session.selection.left = dx + raw.left;
            session.selection.top = dy + raw.top;
            session.selection = session.selection.normalized();
        }
        Zone::NE => {
            session.selection.right = dx + raw.right;
            session.selection.top = dy + raw.top;
            session.selection = session.selection.normalized();
        }
        Zone::SW => {
            session.selection.left = dx + raw.left;
            session.selection.bottom = dy + raw.bottom;
            session.selection = session.selection.normalized();
        }
        Zone::SE => {
            session.selection.right = dx + raw.right;
            session.selection.bottom = dy + raw.bottom;
            session.selection = session.selection.normalized();
        }
        Zone::Outside => {}
    }
}

enum BoxKind {
    Rect,
    Ellipse,
}

/// Rect/ellipse preview clipped to the intersection of the drag rectangle
/// and the selection rectangle; None when they do not overlap
fn clipped_box_step(session: &Session, x: i32, y: i32, kind: BoxKind) -> Option<DrawStep> {
    let selection = session.selection.normalized();
    let drag = Rect::from_points(session.press_x, session.press_y, x, y);
    let clipped = selection.intersect_inclusive(drag)?;

    let (start_x, start_y) = (clipped.left as f32, clipped.top as f32);
    let (end_x, end_y) = (clipped.right as f32, clipped.bottom as f32);
    Some(match kind {
        BoxKind::Rect => DrawStep::Rect {
            start_x,
            start_y,
            end_x,
            end_y,
            style: session.pen,
        },
        BoxKind::Ellipse => DrawStep::Ellipse {
            start_x,
            start_y,
            end_x,
            end_y,
            style: session.pen,
        },
    })
}

/// Line/arrow step with the moving endpoint clamped into the selection
fn clamped_line_step(session: &Session, x: i32, y: i32, arrow: bool) -> DrawStep {
    let (end_x, end_y) = clamp_to_selection(session, x, y);
    let (start_x, start_y) = (session.press_x as f32, session.press_y as f32);
    let (end_x, end_y) = (end_x as f32, end_y as f32);
    if arrow {
        DrawStep::Arrow {
            start_x,
            start_y,
            end_x,
            end_y,
            style: session.pen,
        }
    } else {
        DrawStep::Line {
            start_x,
            start_y,
            end_x,
            end_y,
            style: session.pen,
        }
    }
}

fn clamp_to_selection(session: &Session, x: i32, y: i32) -> (i32, i32) {
    let selection = session.selection.normalized();
    (
        x.clamp(selection.left, selection.right),
        y.clamp(selection.top, selection.bottom),
    )
}
