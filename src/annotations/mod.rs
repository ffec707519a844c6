//! Ordered log of completed annotation steps plus one in-progress preview
//!
//! The log is append-only except for undo (pop-last). Replay walks the
//! committed steps in order, then the pending step, handing each to a
//! renderer; it never mutates the log.

use crate::domain::DrawStep;

/// Receiver for replayed draw steps
///
/// Implemented by the image renderer; tests implement it with a recording
/// stub to observe replay order.
pub trait StepRenderer {
    fn draw_step(&mut self, step: &DrawStep);
}

/// The draw-operation log for one screenshot session
#[derive(Clone, Debug, Default)]
pub struct DrawLog {
    steps: Vec<DrawStep>,
    pending: Option<DrawStep>,
}

impl DrawLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished step
    pub fn push(&mut self, step: DrawStep) {
        self.steps.push(step);
    }

    /// Replace the in-progress preview step
    pub fn set_pending(&mut self, step: DrawStep) {
        self.pending = Some(step);
    }

    /// Discard the in-progress preview step
    pub fn clear_pending(&mut self) {
        self.pending = None;
    }

    /// Discard the preview unless it is a live text edit
    pub fn abandon_non_text_pending(&mut self) {
        if self.pending.as_ref().is_some_and(|s| !s.is_text()) {
            self.pending = None;
        }
    }

    pub fn pending(&self) -> Option<&DrawStep> {
        self.pending.as_ref()
    }

    /// Remove the most recent finished step.
    ///
    /// Returns false when there was nothing to remove; the caller decides
    /// what undo means then (the session resets the selection).
    pub fn undo_step(&mut self) -> bool {
        self.steps.pop().is_some()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Lazy traversal of the committed steps in order, then the pending step
    pub fn steps(&self) -> impl Iterator<Item = &DrawStep> {
        self.steps.iter().chain(self.pending.iter())
    }

    /// Replay every step through the renderer, committed first, pending last
    pub fn replay<R: StepRenderer>(&self, renderer: &mut R) {
        for step in self.steps() {
            renderer.draw_step(step);
        }
    }
}
