//! Pointer interaction: pick, select and drag overlays
//!
//! One gesture at a time. A press on an overlay selects it and starts a
//! drag with orbit controls disabled; a press on empty space clears the
//! selection. Drags move the overlay in the plane `z = depth` recorded at
//! press time, so z and side never change.

use glam::{Vec2, Vec3};
use shared::OverlayRef;

use crate::scene::SceneManager;
use crate::state::DesignState;
use crate::viewport::camera::OrbitCamera;
use crate::viewport::picking::ray_plane_intersect;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        target: OverlayRef,
        /// Overlay z when the drag started
        depth: f32,
    },
}

/// What a pointer event did
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    /// Press hit an overlay; it is now selected and being dragged
    Selected(OverlayRef),
    /// Press hit nothing; selection cleared
    Deselected,
    Moved { overlay: OverlayRef, x: f32, y: f32 },
    DragEnded(OverlayRef),
    Ignored,
}

#[derive(Debug, Default)]
pub struct InteractionController {
    gesture: Gesture,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    pub fn drag_target(&self) -> Option<&OverlayRef> {
        match &self.gesture {
            Gesture::Dragging { target, .. } => Some(target),
            Gesture::Idle => None,
        }
    }

    /// Pointer pressed at `ndc` (-1..1, y up)
    pub fn pointer_down(&mut self, ndc: Vec2, scene: &mut SceneManager, design: &mut DesignState) -> PointerOutcome {
        if self.is_dragging() {
            self.end_drag(scene);
        }

        let ray = scene.ray_from_ndc(ndc);
        let hit = scene.hit_test(&ray).and_then(|hit| {
            let depth = design.document().find(&hit.overlay)?.common().position[2];
            Some((hit.overlay, depth))
        });

        match hit {
            Some((target, depth)) if design.select(target.clone()) => {
                scene.camera_mut().set_enabled(false);
                tracing::debug!("Drag start on {:?} {}", target.kind, target.id);
                self.gesture = Gesture::Dragging {
                    target: target.clone(),
                    depth,
                };
                PointerOutcome::Selected(target)
            }
            _ => {
                design.clear_selection();
                PointerOutcome::Deselected
            }
        }
    }

    /// Pointer moved to `ndc`; moves the dragged overlay in its plane
    pub fn pointer_move(&mut self, ndc: Vec2, scene: &SceneManager, design: &mut DesignState) -> PointerOutcome {
        let Gesture::Dragging { target, depth } = &self.gesture else {
            return PointerOutcome::Ignored;
        };
        let Some(view) = design.document().find(target) else {
            return PointerOutcome::Ignored;
        };
        if view.common().side != design.current_side() {
            return PointerOutcome::Ignored;
        }

        let ray = scene.ray_from_ndc(ndc);
        let plane_point = Vec3::new(0.0, 0.0, *depth);
        let Some(t) = ray_plane_intersect(&ray, plane_point, Vec3::Z) else {
            return PointerOutcome::Ignored;
        };
        let hit = ray.at(t);
        let target = target.clone();
        design.set_xy(&target, hit.x, hit.y);
        PointerOutcome::Moved {
            overlay: target,
            x: hit.x,
            y: hit.y,
        }
    }

    /// Pointer released; ends a drag and re-enables orbit controls
    pub fn pointer_up(&mut self, scene: &mut SceneManager) -> PointerOutcome {
        match self.end_drag(scene) {
            Some(target) => PointerOutcome::DragEnded(target),
            None => PointerOutcome::Ignored,
        }
    }

    fn end_drag(&mut self, scene: &mut SceneManager) -> Option<OverlayRef> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging { target, .. } => {
                scene.camera_mut().set_enabled(true);
                Some(target)
            }
            Gesture::Idle => None,
        }
    }

    // ── Screen-space convenience ──────────────────────────────

    pub fn pointer_down_at(
        &mut self,
        pos: egui::Pos2,
        rect: egui::Rect,
        scene: &mut SceneManager,
        design: &mut DesignState,
    ) -> PointerOutcome {
        self.pointer_down(OrbitCamera::screen_to_ndc(pos, rect), scene, design)
    }

    pub fn pointer_move_at(
        &mut self,
        pos: egui::Pos2,
        rect: egui::Rect,
        scene: &SceneManager,
        design: &mut DesignState,
    ) -> PointerOutcome {
        self.pointer_move(OrbitCamera::screen_to_ndc(pos, rect), scene, design)
    }
}

#[cfg(test)]
mod tests {
    use shared::{Rgb, ShapeKind, Side};

    use super::*;
    use crate::fixtures;
    use crate::state::AppSettings;

    fn setup() -> (SceneManager, DesignState, InteractionController) {
        let mut scene = SceneManager::new(&AppSettings::default()).unwrap();
        scene.set_viewport(400, 400);
        (scene, DesignState::new(), InteractionController::new())
    }

    /// NDC of a world point as seen by the scene camera
    fn ndc_of(scene: &SceneManager, p: Vec3) -> Vec2 {
        let clip = scene.camera().view_projection(scene.aspect()) * p.extend(1.0);
        Vec2::new(clip.x / clip.w, clip.y / clip.w)
    }

    #[test]
    fn test_press_on_overlay_selects_and_disables_orbit() {
        let (mut scene, mut design, mut ctl) = setup();
        let r = design.add_image(fixtures::shape_at(Side::Front, ShapeKind::Square, [0.5, 0.5, 0.11]));
        design.clear_selection();
        scene.sync(&design);

        let ndc = ndc_of(&scene, Vec3::new(0.5, 0.5, 0.11));
        assert_eq!(ctl.pointer_down(ndc, &mut scene, &mut design), PointerOutcome::Selected(r.clone()));
        assert_eq!(design.selection(), Some(&r));
        assert!(!scene.camera().is_enabled());
        assert!(ctl.is_dragging());
    }

    #[test]
    fn test_press_on_empty_space_deselects() {
        let (mut scene, mut design, mut ctl) = setup();
        design.add_shape(ShapeKind::Circle, Rgb::BLACK);
        scene.sync(&design);
        let ndc = ndc_of(&scene, Vec3::new(1.1, 1.6, 0.11));
        assert_eq!(ctl.pointer_down(ndc, &mut scene, &mut design), PointerOutcome::Deselected);
        assert!(design.selection().is_none());
        assert!(scene.camera().is_enabled());
    }

    #[test]
    fn test_drag_moves_xy_only() {
        let (mut scene, mut design, mut ctl) = setup();
        let r = design.add_shape(ShapeKind::Circle, Rgb::BLACK);
        scene.sync(&design);
        ctl.pointer_down(Vec2::ZERO, &mut scene, &mut design);

        let target = ndc_of(&scene, Vec3::new(0.5, -0.3, 0.11));
        let outcome = ctl.pointer_move(target, &scene, &mut design);
        assert!(matches!(outcome, PointerOutcome::Moved { .. }));
        let pos = design.image(&r.id).unwrap().common.position;
        assert!((pos[0] - 0.5).abs() < 1e-3);
        assert!((pos[1] + 0.3).abs() < 1e-3);
        assert_eq!(pos[2], 0.11);
        assert_eq!(design.image(&r.id).unwrap().common.side, Side::Front);
    }

    #[test]
    fn test_release_reenables_orbit() {
        let (mut scene, mut design, mut ctl) = setup();
        let r = design.add_shape(ShapeKind::Circle, Rgb::BLACK);
        scene.sync(&design);
        ctl.pointer_down(Vec2::ZERO, &mut scene, &mut design);
        assert_eq!(ctl.pointer_up(&mut scene), PointerOutcome::DragEnded(r));
        assert!(scene.camera().is_enabled());
        assert_eq!(ctl.pointer_up(&mut scene), PointerOutcome::Ignored);
    }

    #[test]
    fn test_move_without_drag_is_ignored() {
        let (scene, mut design, mut ctl) = setup();
        assert_eq!(ctl.pointer_move(Vec2::ZERO, &scene, &mut design), PointerOutcome::Ignored);
    }

    #[test]
    fn test_dragged_overlay_removed_externally() {
        let (mut scene, mut design, mut ctl) = setup();
        let r = design.add_shape(ShapeKind::Circle, Rgb::BLACK);
        scene.sync(&design);
        ctl.pointer_down(Vec2::ZERO, &mut scene, &mut design);
        design.remove(&r);
        let rev = design.revision();
        assert_eq!(ctl.pointer_move(Vec2::new(0.3, 0.3), &scene, &mut design), PointerOutcome::Ignored);
        assert_eq!(design.revision(), rev);
    }

    #[test]
    fn test_side_switch_mid_drag_blocks_moves() {
        let (mut scene, mut design, mut ctl) = setup();
        let r = design.add_shape(ShapeKind::Circle, Rgb::BLACK);
        scene.sync(&design);
        ctl.pointer_down(Vec2::ZERO, &mut scene, &mut design);
        design.set_side(Side::Back);
        ctl.pointer_move(Vec2::new(0.3, 0.3), &scene, &mut design);
        assert_eq!(design.image(&r.id).unwrap().common.position, [0.0, 0.0, 0.11]);
    }

    #[test]
    fn test_new_press_ends_previous_drag() {
        let (mut scene, mut design, mut ctl) = setup();
        design.add_shape(ShapeKind::Circle, Rgb::BLACK);
        scene.sync(&design);
        ctl.pointer_down(Vec2::ZERO, &mut scene, &mut design);
        let miss = ndc_of(&scene, Vec3::new(1.1, 1.6, 0.11));
        ctl.pointer_down(miss, &mut scene, &mut design);
        assert!(!ctl.is_dragging());
        assert!(scene.camera().is_enabled());
    }

    #[test]
    fn test_nearest_overlay_wins() {
        let (mut scene, mut design, mut ctl) = setup();
        let first = design.add_image(fixtures::shape_at(Side::Front, ShapeKind::Square, [0.0, 0.0, 0.11]));
        let nearer = design.add_image(fixtures::shape_at(Side::Front, ShapeKind::Square, [0.0, 0.0, 0.3]));
        scene.sync(&design);
        let outcome = ctl.pointer_down(Vec2::ZERO, &mut scene, &mut design);
        assert_eq!(outcome, PointerOutcome::Selected(nearer));
        assert_ne!(design.selection(), Some(&first));
    }

    #[test]
    fn test_screen_positions() {
        let (mut scene, mut design, mut ctl) = setup();
        let r = design.add_shape(ShapeKind::Circle, Rgb::BLACK);
        scene.sync(&design);
        let rect = egui::Rect::from_min_size(egui::pos2(100.0, 50.0), egui::vec2(400.0, 400.0));
        let outcome = ctl.pointer_down_at(rect.center(), rect, &mut scene, &mut design);
        assert_eq!(outcome, PointerOutcome::Selected(r));
    }
}
