//! 3D viewport panel with OpenGL rendering

mod gl_renderer;
pub use tee_designer_lib::viewport::mesh;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use egui::Ui;

use crate::export::{export_png, ExportError, ExportedImage};
use crate::interaction::InteractionController;
use crate::render::{FrameRenderer, RenderError, SoftwareRenderer};
use crate::scene::{SceneError, SceneManager};
use crate::state::settings::FontSettings;
use crate::state::AppState;
use gl_renderer::{GlFrameRenderer, GlRenderer};

/// GL context plus the renderer that owns objects in it
struct GlBackend {
    gl: Arc<glow::Context>,
    renderer: Arc<Mutex<GlRenderer>>,
}

/// 3D viewport panel: owns the scene and routes pointer input
pub struct ViewportPanel {
    scene: SceneManager,
    controller: InteractionController,
    backend: Option<GlBackend>,
    /// Software fallback output when no GL context is available
    fallback: SoftwareRenderer,
    fallback_texture: Option<egui::TextureHandle>,
}

impl ViewportPanel {
    pub fn new(state: &AppState) -> Result<Self, SceneError> {
        Ok(Self {
            scene: SceneManager::new(&state.settings)?,
            controller: InteractionController::new(),
            backend: None,
            fallback: SoftwareRenderer::new(),
            fallback_texture: None,
        })
    }

    /// Initialize GL renderer (must be called with a GL context)
    pub fn init_gl(&mut self, gl: &Arc<glow::Context>) {
        match GlRenderer::new(gl) {
            Ok(renderer) => {
                self.backend = Some(GlBackend {
                    gl: gl.clone(),
                    renderer: Arc::new(Mutex::new(renderer)),
                });
            }
            Err(e) => tracing::error!("GL renderer unavailable, using software rendering: {e}"),
        }
    }

    pub fn scene(&self) -> &SceneManager {
        &self.scene
    }

    pub fn reset_camera(&mut self) {
        let side = self.scene.side();
        self.scene.camera_mut().face_side(side);
    }

    pub fn is_dragging(&self) -> bool {
        self.controller.is_dragging()
    }

    /// Reload fonts and redraw every text bitmap
    pub fn reload_fonts(&mut self, fonts: &FontSettings) {
        self.scene.reload_fonts(fonts);
    }

    /// Retry pictures that failed to load
    pub fn retry_failed_loads(&mut self) {
        self.scene.retry_failed_loads();
    }

    /// Export the active side with the configured export settings
    pub fn export(&mut self, state: &AppState) -> Result<ExportedImage, ExportError> {
        self.scene.sync(&state.design);
        let settings = &state.settings.export;
        let viewport = &state.settings.viewport;
        match &self.backend {
            Some(backend) => {
                let mut renderer = backend
                    .renderer
                    .lock()
                    .map_err(|_| RenderError::Backend("GL renderer lock poisoned".into()))?;
                let mut offscreen = GlFrameRenderer::new(&backend.gl, &mut renderer);
                export_png(&mut self.scene, &mut offscreen, settings, viewport)
            }
            None => export_png(&mut self.scene, &mut SoftwareRenderer::new(), settings, viewport),
        }
    }

    pub fn show(&mut self, ui: &mut Ui, state: &mut AppState) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
        self.scene
            .set_viewport(rect.width().round() as u32, rect.height().round() as u32);
        self.scene.sync(&state.design);

        self.handle_pointer(ui, &response, rect, state);
        self.handle_camera(ui, &response);

        // Reflect this frame's edits before drawing
        self.scene.sync(&state.design);
        self.free_released();

        if self.scene.pending_loads() > 0 {
            ui.ctx().request_repaint_after(Duration::from_millis(16));
        }

        if !ui.is_rect_visible(rect) {
            return;
        }
        self.render(ui, rect, state);
        self.draw_overlays(ui, rect, state);
    }

    pub fn destroy(&mut self) {
        self.scene.teardown();
        self.free_released();
        if let Some(backend) = self.backend.take() {
            if let Ok(mut renderer) = backend.renderer.lock() {
                renderer.destroy(&backend.gl);
            }
        }
    }

    fn handle_pointer(&mut self, ui: &Ui, response: &egui::Response, rect: egui::Rect, state: &mut AppState) {
        let (pressed, released, pos) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.interact_pos(),
            )
        });
        let Some(pos) = pos else {
            return;
        };

        if pressed && response.hovered() && !ui.input(|i| i.modifiers.alt) {
            self.controller
                .pointer_down_at(pos, rect, &mut self.scene, &mut state.design);
        }
        if self.controller.is_dragging() && response.dragged_by(egui::PointerButton::Primary) {
            self.controller
                .pointer_move_at(pos, rect, &self.scene, &mut state.design);
            ui.ctx().request_repaint();
        }
        if released {
            self.controller.pointer_up(&mut self.scene);
        }
    }

    fn handle_camera(&mut self, ui: &Ui, response: &egui::Response) {
        let orbiting = response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
            || (response.dragged_by(egui::PointerButton::Primary) && !self.controller.is_dragging());
        if orbiting {
            let delta = response.drag_delta();
            self.scene.camera_mut().rotate(delta.x * 0.5, delta.y * 0.5);
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > 0.1 {
                self.scene.camera_mut().zoom(scroll * 0.002);
            }
        }
    }

    /// Delete GPU copies of resources the scene dropped
    fn free_released(&mut self) {
        let released = self.scene.take_released();
        if released.is_empty() {
            return;
        }
        if let Some(backend) = &self.backend {
            if let Ok(mut renderer) = backend.renderer.lock() {
                renderer.release(&backend.gl, &released);
            }
        }
    }

    fn render(&mut self, ui: &mut Ui, rect: egui::Rect, state: &AppState) {
        let [r, g, b] = state.settings.viewport.background_color;
        let background = [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0];

        if let Some(backend) = &self.backend {
            let renderer = backend.renderer.clone();
            let frame = self.scene.render_frame(background);
            let callback = egui::PaintCallback {
                rect,
                callback: Arc::new(eframe::egui_glow::CallbackFn::new(move |info, painter| {
                    let vp = info.viewport_in_pixels();
                    let viewport = [vp.left_px, vp.from_bottom_px, vp.width_px, vp.height_px];
                    if let Ok(mut r) = renderer.lock() {
                        if let Err(e) = r.paint(painter.gl(), &frame, viewport) {
                            tracing::error!("Viewport paint failed: {e}");
                        }
                    }
                })),
            };
            ui.painter().add(callback);
        } else {
            // Fallback: software rendering at physical pixel size
            let ppp = ui.ctx().pixels_per_point();
            let (w, h) = ((rect.width() * ppp).round() as u32, (rect.height() * ppp).round() as u32);
            let [vw, vh] = self.scene.viewport();
            self.scene.set_viewport(w, h);
            let frame = self.scene.render_frame(background);
            self.scene.set_viewport(vw, vh);

            match self.fallback.render(&frame) {
                Ok(pixels) => {
                    let size = [pixels.width() as usize, pixels.height() as usize];
                    let image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_raw());
                    match &mut self.fallback_texture {
                        Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                        None => {
                            self.fallback_texture = Some(ui.ctx().load_texture(
                                "viewport-fallback",
                                image,
                                egui::TextureOptions::LINEAR,
                            ));
                        }
                    }
                    if let Some(texture) = &self.fallback_texture {
                        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                        ui.painter().image(texture.id(), rect, uv, egui::Color32::WHITE);
                    }
                }
                Err(e) => tracing::warn!("Software viewport render failed: {e}"),
            }
        }
    }

    fn draw_overlays(&self, ui: &mut Ui, rect: egui::Rect, state: &AppState) {
        let painter = ui.painter_at(rect);
        let text_color = egui::Color32::from_rgb(100, 100, 110);

        painter.text(
            rect.left_top() + egui::vec2(10.0, 8.0),
            egui::Align2::LEFT_TOP,
            format!("{} side", side_title(self.scene.side())),
            egui::FontId::proportional(13.0),
            text_color,
        );

        let pending = self.scene.pending_loads();
        if pending > 0 {
            painter.text(
                rect.right_top() + egui::vec2(-10.0, 8.0),
                egui::Align2::RIGHT_TOP,
                format!("Loading {pending} image(s)…"),
                egui::FontId::proportional(11.0),
                text_color,
            );
        }

        if state.design.overlay_count_on(state.design.current_side()) == 0 {
            painter.text(
                egui::pos2(rect.center().x, rect.bottom() - 20.0),
                egui::Align2::CENTER_BOTTOM,
                "Add text, a shape or an image from the design panel",
                egui::FontId::proportional(11.0),
                text_color,
            );
        } else {
            painter.text(
                egui::pos2(rect.center().x, rect.bottom() - 20.0),
                egui::Align2::CENTER_BOTTOM,
                "Click to select, drag to move, right-drag to orbit, scroll to zoom",
                egui::FontId::proportional(11.0),
                text_color,
            );
        }
    }
}

pub fn side_title(side: shared::Side) -> &'static str {
    match side {
        shared::Side::Front => "Front",
        shared::Side::Back => "Back",
    }
}
