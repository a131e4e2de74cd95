//! Headless test harness for driving a design end to end.
//!
//! Bundles a design, a mounted scene, the pointer controller and the
//! software renderer, so integration tests can edit, sync, click, drag and
//! export without a window or a GPU.

use glam::{Vec2, Vec3};
use shared::{ImageOverlay, OverlayRef, ShapeKind, Side, TextOverlay};

use crate::export::{export_png, ExportError, ExportedImage};
use crate::fixtures;
use crate::interaction::{InteractionController, PointerOutcome};
use crate::render::SoftwareRenderer;
use crate::scene::{SceneError, SceneManager, SyncReport};
use crate::state::{AppSettings, DesignState, ExportSettings};

/// Headless harness: design state, scene, controller and renderer
pub struct TestHarness {
    pub design: DesignState,
    pub scene: SceneManager,
    pub controller: InteractionController,
    pub settings: AppSettings,
    renderer: SoftwareRenderer,
}

impl TestHarness {
    /// Empty design with default settings and a 400x400 viewport.
    pub fn new() -> Result<Self, SceneError> {
        Self::with_settings(AppSettings::default())
    }

    pub fn with_settings(settings: AppSettings) -> Result<Self, SceneError> {
        let mut scene = SceneManager::new(&settings)?;
        scene.set_viewport(400, 400);
        Ok(Self {
            design: DesignState::new(),
            scene,
            controller: InteractionController::new(),
            settings,
            renderer: SoftwareRenderer::new(),
        })
    }

    // ── Design edits ──────────────────────────────────────────

    /// Add a text overlay on the current side
    pub fn add_text(&mut self, content: &str) -> OverlayRef {
        let side = self.design.current_side();
        self.design.add_text(TextOverlay::new(side).with_content(content))
    }

    /// Add a shape on the current side
    pub fn add_shape(&mut self, shape: ShapeKind) -> OverlayRef {
        let side = self.design.current_side();
        self.design.add_image(fixtures::shape_on(side, shape))
    }

    /// Add a shape on the current side at a position
    pub fn add_shape_at(&mut self, shape: ShapeKind, position: [f32; 3]) -> OverlayRef {
        let side = self.design.current_side();
        self.design.add_image(fixtures::shape_at(side, shape, position))
    }

    /// Add an embedded solid-color picture on the current side
    pub fn add_picture(&mut self, rgba: [u8; 4]) -> OverlayRef {
        let side = self.design.current_side();
        self.design.add_image(fixtures::picture_on(side, rgba))
    }

    pub fn add_image(&mut self, image: ImageOverlay) -> OverlayRef {
        self.design.add_image(image)
    }

    pub fn remove(&mut self, overlay: &OverlayRef) -> bool {
        self.design.remove(overlay)
    }

    pub fn set_side(&mut self, side: Side) {
        self.design.set_side(side);
    }

    pub fn toggle_side(&mut self) {
        self.design.toggle_side();
    }

    // ── Scene ─────────────────────────────────────────────────

    pub fn sync(&mut self) -> SyncReport {
        self.scene.sync(&self.design)
    }

    /// Sync until no picture load is pending. Returns false on timeout.
    pub fn sync_until_loaded(&mut self) -> bool {
        fixtures::sync_until_loaded(&mut self.scene, &self.design)
    }

    pub fn renderable_count(&self) -> usize {
        self.scene.renderables().len()
    }

    pub fn live_resources(&self) -> usize {
        self.scene.resources().live_count()
    }

    pub fn textures_created(&self) -> u64 {
        self.scene.resources().textures_created()
    }

    /// Ids of the current renderables, in scene order
    pub fn renderable_ids(&self) -> Vec<String> {
        self.scene.renderables().iter().map(|r| r.overlay.id.clone()).collect()
    }

    /// Renderables currently carrying a selection outline
    pub fn outlined(&self) -> Vec<String> {
        self.scene
            .renderables()
            .iter()
            .filter(|r| r.outline.is_some())
            .map(|r| r.overlay.id.clone())
            .collect()
    }

    pub fn position_of(&self, overlay: &OverlayRef) -> Option<[f32; 3]> {
        self.design.document().find(overlay).map(|v| v.common().position)
    }

    // ── Pointer ───────────────────────────────────────────────

    /// NDC of a world point through the current camera
    pub fn ndc_of(&self, point: Vec3) -> Vec2 {
        let clip = self.scene.camera().view_projection(self.scene.aspect()) * point.extend(1.0);
        Vec2::new(clip.x / clip.w, clip.y / clip.w)
    }

    pub fn press_ndc(&mut self, ndc: Vec2) -> PointerOutcome {
        self.controller.pointer_down(ndc, &mut self.scene, &mut self.design)
    }

    /// Press at the screen location of a world point
    pub fn press_at(&mut self, point: Vec3) -> PointerOutcome {
        let ndc = self.ndc_of(point);
        self.press_ndc(ndc)
    }

    /// Move the pointer over the screen location of a world point
    pub fn drag_to(&mut self, point: Vec3) -> PointerOutcome {
        let ndc = self.ndc_of(point);
        self.controller.pointer_move(ndc, &self.scene, &mut self.design)
    }

    pub fn release(&mut self) -> PointerOutcome {
        self.controller.pointer_up(&mut self.scene)
    }

    // ── Export ────────────────────────────────────────────────

    /// Sync and export with the harness export settings
    pub fn export(&mut self) -> Result<ExportedImage, ExportError> {
        let settings = self.settings.export.clone();
        self.export_with(&settings)
    }

    pub fn export_with(&mut self, settings: &ExportSettings) -> Result<ExportedImage, ExportError> {
        self.scene.sync(&self.design);
        export_png(&mut self.scene, &mut self.renderer, settings, &self.settings.viewport)
    }
}
