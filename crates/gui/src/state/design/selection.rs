//! Selection of at most one overlay

use shared::OverlayRef;

use super::DesignState;

impl DesignState {
    /// Current selection. A reference to a deleted overlay, or to one on the
    /// hidden side, reads as empty.
    pub fn selection(&self) -> Option<&OverlayRef> {
        self.doc
            .selection
            .as_ref()
            .filter(|sel| self.is_on_active_side(sel))
    }

    /// True when the overlay exists and sits on the current side
    pub(super) fn is_on_active_side(&self, overlay: &OverlayRef) -> bool {
        self.doc
            .find(overlay)
            .is_some_and(|view| view.common().side == self.doc.current_side)
    }

    /// Check if the given overlay id is the selected one
    pub fn is_selected(&self, id: &str) -> bool {
        self.selection().is_some_and(|s| s.id == id)
    }

    /// Select an existing overlay on the active side. Anything else is ignored.
    pub fn select(&mut self, overlay: OverlayRef) -> bool {
        if !self.is_on_active_side(&overlay) {
            return false;
        }
        if self.doc.selection.as_ref() != Some(&overlay) {
            self.doc.selection = Some(overlay);
            self.notify_mutated();
        }
        true
    }

    pub fn clear_selection(&mut self) {
        if self.doc.selection.take().is_some() {
            self.notify_mutated();
        }
    }
}
