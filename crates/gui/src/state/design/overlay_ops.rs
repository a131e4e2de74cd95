//! Overlay create / update / delete

use shared::{ImageOverlay, OverlayKind, OverlayRef, Rgb, ShapeKind, TextOverlay};

use super::DesignState;

impl DesignState {
    /// Append a text overlay; it becomes the selection when it is on the active side
    pub fn add_text(&mut self, text: TextOverlay) -> OverlayRef {
        let r = OverlayRef::text(text.common.id.clone());
        self.doc.text_overlays.push(text);
        self.select_if_visible(&r);
        self.notify_mutated();
        r
    }

    /// Append an image overlay; it becomes the selection when it is on the active side
    pub fn add_image(&mut self, image: ImageOverlay) -> OverlayRef {
        let r = OverlayRef::image(image.common.id.clone());
        self.doc.image_overlays.push(image);
        self.select_if_visible(&r);
        self.notify_mutated();
        r
    }

    fn select_if_visible(&mut self, overlay: &OverlayRef) {
        if self.is_on_active_side(overlay) {
            self.doc.selection = Some(overlay.clone());
        }
    }

    /// Add a generated shape on the current side
    pub fn add_shape(&mut self, shape: ShapeKind, color: Rgb) -> OverlayRef {
        let side = self.current_side();
        self.add_image(ImageOverlay::new_shape(side, shape, color))
    }

    /// Mutable access to a text overlay; counts as a mutation
    pub fn text_mut(&mut self, id: &str) -> Option<&mut TextOverlay> {
        let idx = self.doc.text_overlays.iter().position(|t| t.common.id == id)?;
        self.notify_mutated();
        self.doc.text_overlays.get_mut(idx)
    }

    /// Mutable access to an image overlay; counts as a mutation
    pub fn image_mut(&mut self, id: &str) -> Option<&mut ImageOverlay> {
        let idx = self.doc.image_overlays.iter().position(|i| i.common.id == id)?;
        self.notify_mutated();
        self.doc.image_overlays.get_mut(idx)
    }

    /// Move an overlay. Returns false when it no longer exists.
    pub fn set_position(&mut self, overlay: &OverlayRef, position: [f32; 3]) -> bool {
        let Some(common) = self.doc.common_mut(overlay) else {
            return false;
        };
        if common.position != position {
            common.position = position;
            self.notify_mutated();
        }
        true
    }

    /// Move an overlay within its plane, leaving z untouched
    pub fn set_xy(&mut self, overlay: &OverlayRef, x: f32, y: f32) -> bool {
        let Some(common) = self.doc.common_mut(overlay) else {
            return false;
        };
        let z = common.position[2];
        self.set_position(overlay, [x, y, z])
    }

    pub fn set_rotation(&mut self, overlay: &OverlayRef, degrees: f32) -> bool {
        let Some(common) = self.doc.common_mut(overlay) else {
            return false;
        };
        common.set_rotation(degrees);
        self.notify_mutated();
        true
    }

    pub fn set_mirrored(&mut self, overlay: &OverlayRef, mirrored: bool) -> bool {
        let Some(common) = self.doc.common_mut(overlay) else {
            return false;
        };
        if common.mirrored != mirrored {
            common.mirrored = mirrored;
            self.notify_mutated();
        }
        true
    }

    /// Delete an overlay by reference. A selection naming it is cleared.
    pub fn remove(&mut self, overlay: &OverlayRef) -> bool {
        let before = self.doc.text_overlays.len() + self.doc.image_overlays.len();
        match overlay.kind {
            OverlayKind::Text => self.doc.text_overlays.retain(|t| t.common.id != overlay.id),
            OverlayKind::Image => self.doc.image_overlays.retain(|i| i.common.id != overlay.id),
        }
        let removed = self.doc.text_overlays.len() + self.doc.image_overlays.len() < before;
        if !removed {
            return false;
        }
        if self.doc.selection.as_ref() == Some(overlay) {
            self.doc.selection = None;
        }
        self.notify_mutated();
        true
    }

    /// Delete whatever is selected (Delete / Backspace)
    pub fn remove_selected(&mut self) -> bool {
        match self.selection().cloned() {
            Some(sel) => self.remove(&sel),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use shared::{Side, TextOverlay};

    use super::*;

    #[test]
    fn test_add_selects_new_overlay() {
        let mut d = DesignState::new();
        let r = d.add_shape(ShapeKind::Circle, Rgb::BLACK);
        assert_eq!(r.kind, OverlayKind::Image);
        assert_eq!(d.selection(), Some(&r));
        assert_eq!(d.image_overlays().len(), 1);
    }

    #[test]
    fn test_add_on_hidden_side_keeps_selection() {
        let mut d = DesignState::new();
        d.set_side(Side::Back);
        let back = d.add_text(TextOverlay::new(Side::Back));
        let front = d.add_text(TextOverlay::new(Side::Front));
        assert_eq!(d.selection(), Some(&back));
        assert!(!d.is_selected(&front.id));
        assert_eq!(d.text_overlays().len(), 2);
    }

    #[test]
    fn test_shape_lands_on_current_side() {
        let mut d = DesignState::new();
        d.set_side(Side::Back);
        let r = d.add_shape(ShapeKind::Square, Rgb::BLACK);
        let img = d.image(&r.id).unwrap();
        assert_eq!(img.common.side, Side::Back);
        assert_eq!(img.common.position[2], -0.11);
    }

    #[test]
    fn test_set_xy_keeps_z() {
        let mut d = DesignState::new();
        let r = d.add_text(TextOverlay::new(Side::Front));
        assert!(d.set_xy(&r, 0.4, -0.2));
        assert_eq!(d.text(&r.id).unwrap().common.position, [0.4, -0.2, 0.11]);
    }

    #[test]
    fn test_updates_on_missing_overlay_are_noops() {
        let mut d = DesignState::new();
        let ghost = OverlayRef::image("ghost");
        let rev = d.revision();
        assert!(!d.set_xy(&ghost, 1.0, 1.0));
        assert!(!d.set_rotation(&ghost, 10.0));
        assert!(!d.remove(&ghost));
        assert_eq!(d.revision(), rev);
    }

    #[test]
    fn test_remove_clears_matching_selection_only() {
        let mut d = DesignState::new();
        let a = d.add_text(TextOverlay::new(Side::Front));
        let b = d.add_text(TextOverlay::new(Side::Front));
        assert!(d.remove(&a));
        assert_eq!(d.selection(), Some(&b));
        assert!(d.remove_selected());
        assert!(d.selection().is_none());
        assert!(d.text_overlays().is_empty());
    }

    #[test]
    fn test_text_mut_bumps_revision() {
        let mut d = DesignState::new();
        let r = d.add_text(TextOverlay::new(Side::Front));
        let rev = d.revision();
        d.text_mut(&r.id).unwrap().content = "HELLO".into();
        assert!(d.revision() > rev);
        assert_eq!(d.text(&r.id).unwrap().content, "HELLO");
    }

    #[test]
    fn test_rotation_wraps_through_state() {
        let mut d = DesignState::new();
        let r = d.add_text(TextOverlay::new(Side::Front));
        d.set_rotation(&r, 725.0);
        assert!((d.text(&r.id).unwrap().common.rotation - 5.0).abs() < 1e-4);
    }
}
