//! Design state: the single mutable aggregate the host owns
//!
//! Every mutation bumps `revision`, which is how the scene manager learns it
//! has to resynchronize.

mod overlay_ops;
mod persistence;
mod selection;

use shared::{
    DesignDocument, ImageOverlay, MaterialKind, OverlayId, OverlayView, Rgb, Side, TextOverlay,
};

/// Design document plus a change counter
#[derive(Debug, Clone, Default)]
pub struct DesignState {
    doc: DesignDocument,
    revision: u64,
}

impl DesignState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a loaded document; a stale selection is dropped
    pub fn from_document(doc: DesignDocument) -> Self {
        let mut state = Self { doc, revision: 0 };
        state.drop_stale_selection();
        state
    }

    fn drop_stale_selection(&mut self) {
        if let Some(sel) = &self.doc.selection {
            if !self.is_on_active_side(sel) {
                self.doc.selection = None;
            }
        }
    }

    /// Replace the whole document (e.g. after File > Open)
    pub fn replace(&mut self, doc: DesignDocument) {
        let revision = self.revision + 1;
        *self = Self::from_document(doc);
        self.revision = revision;
    }

    pub fn document(&self) -> &DesignDocument {
        &self.doc
    }

    /// Monotonically increasing change counter
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Bump the revision after an out-of-band edit
    pub fn notify_mutated(&mut self) {
        self.revision += 1;
    }

    /// Apply an arbitrary edit to the document and bump the revision
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut DesignDocument) -> R) -> R {
        let result = f(&mut self.doc);
        self.drop_stale_selection();
        self.notify_mutated();
        result
    }

    // ── Garment ───────────────────────────────────────────────

    pub fn garment_color(&self) -> Rgb {
        self.doc.garment_color
    }

    pub fn set_garment_color(&mut self, color: Rgb) {
        if self.doc.garment_color != color {
            self.doc.garment_color = color;
            self.notify_mutated();
        }
    }

    pub fn material(&self) -> MaterialKind {
        self.doc.material
    }

    pub fn set_material(&mut self, material: MaterialKind) {
        if self.doc.material != material {
            self.doc.material = material;
            self.notify_mutated();
        }
    }

    // ── Sides ─────────────────────────────────────────────────

    pub fn current_side(&self) -> Side {
        self.doc.current_side
    }

    /// Switch the active side. Selection never survives a side change.
    pub fn set_side(&mut self, side: Side) {
        if self.doc.current_side == side {
            return;
        }
        self.doc.current_side = side;
        self.doc.selection = None;
        self.notify_mutated();
    }

    pub fn toggle_side(&mut self) {
        self.set_side(self.doc.current_side.opposite());
    }

    // ── Read access ───────────────────────────────────────────

    pub fn text_overlays(&self) -> &[TextOverlay] {
        &self.doc.text_overlays
    }

    pub fn image_overlays(&self) -> &[ImageOverlay] {
        &self.doc.image_overlays
    }

    pub fn overlays(&self) -> impl Iterator<Item = OverlayView<'_>> {
        self.doc.overlays()
    }

    /// Overlays attached to `side`, in stable order
    pub fn overlays_on(&self, side: Side) -> impl Iterator<Item = OverlayView<'_>> {
        self.doc.overlays().filter(move |o| o.common().side == side)
    }

    pub fn overlay_count_on(&self, side: Side) -> usize {
        self.overlays_on(side).count()
    }

    pub fn text(&self, id: &str) -> Option<&TextOverlay> {
        self.doc.text_overlays.iter().find(|t| t.common.id == id)
    }

    pub fn image(&self, id: &str) -> Option<&ImageOverlay> {
        self.doc.image_overlays.iter().find(|i| i.common.id == id)
    }

    /// Whether any overlay (text or image) has this id
    pub fn contains(&self, id: &OverlayId) -> bool {
        self.text(id).is_some() || self.image(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{OverlayRef, ShapeKind};

    #[test]
    fn test_new_state_is_empty_front() {
        let d = DesignState::new();
        assert_eq!(d.current_side(), Side::Front);
        assert_eq!(d.overlays().count(), 0);
        assert_eq!(d.revision(), 0);
        assert_eq!(d.garment_color(), Rgb::WHITE);
    }

    #[test]
    fn test_setters_bump_revision_only_on_change() {
        let mut d = DesignState::new();
        d.set_material(MaterialKind::Cotton);
        assert_eq!(d.revision(), 0);
        d.set_material(MaterialKind::Silk);
        assert_eq!(d.revision(), 1);
        d.set_garment_color(Rgb::new(10, 20, 30));
        assert_eq!(d.revision(), 2);
    }

    #[test]
    fn test_side_change_clears_selection() {
        let mut d = DesignState::new();
        let r = d.add_text(TextOverlay::new(Side::Front));
        assert_eq!(d.selection(), Some(&r));
        d.toggle_side();
        assert_eq!(d.current_side(), Side::Back);
        assert!(d.selection().is_none());
    }

    #[test]
    fn test_overlays_on_filters_by_side() {
        let mut d = DesignState::new();
        d.add_text(TextOverlay::new(Side::Front));
        d.add_shape(ShapeKind::Star, Rgb::BLACK);
        d.add_text(TextOverlay::new(Side::Back));
        assert_eq!(d.overlay_count_on(Side::Front), 2);
        assert_eq!(d.overlay_count_on(Side::Back), 1);
    }

    #[test]
    fn test_from_document_drops_stale_selection() {
        let mut doc = DesignDocument::default();
        doc.selection = Some(OverlayRef::text("ghost"));
        let d = DesignState::from_document(doc);
        assert!(d.document().selection.is_none());
    }

    #[test]
    fn test_edit_bumps_revision_and_validates_selection() {
        let mut d = DesignState::new();
        let r = d.add_text(TextOverlay::new(Side::Front));
        let before = d.revision();
        d.edit(|doc| doc.text_overlays.clear());
        assert!(d.revision() > before);
        assert!(d.selection().is_none());
        assert!(!d.contains(&r.id));
    }

    #[test]
    fn test_replace_keeps_revision_increasing() {
        let mut d = DesignState::new();
        d.add_text(TextOverlay::new(Side::Front));
        let before = d.revision();
        d.replace(DesignDocument::default());
        assert!(d.revision() > before);
        assert_eq!(d.overlays().count(), 0);
    }
}
