//! Main application module

mod autosave;
mod keyboard;
mod menus;
mod styles;

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use eframe::egui;
use shared::DesignDocument;

use crate::scene::SceneError;
use crate::state::{AppState, DesignState};
use crate::ui::{design_panel, status_bar};
use autosave::{AutosaveTimer, AUTOSAVE_DELAY};
use crate::viewport::ViewportPanel;

/// Main application
pub struct DesignerApp {
    state: AppState,
    viewport: ViewportPanel,
    autosave: AutosaveTimer,
}

impl DesignerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, initial_design: Option<DesignDocument>) -> Result<Self, SceneError> {
        let mut state = AppState::default();

        // Load initial design: CLI argument takes priority, then autosave
        if let Some(doc) = initial_design {
            state.design = DesignState::from_document(doc);
        } else if let Some(autosave) = DesignState::load_autosave() {
            state.design = DesignState::from_document(autosave);
            tracing::info!("Loaded autosave design");
        }

        styles::configure_styles(&cc.egui_ctx);

        let mut viewport = ViewportPanel::new(&state)?;

        // Initialize GL renderer if glow context is available
        if let Some(gl) = cc.gl.as_ref() {
            viewport.init_gl(gl);
        }

        let autosave = AutosaveTimer::new(state.design.revision());

        Ok(Self {
            state,
            viewport,
            autosave,
        })
    }

    fn maybe_autosave(&mut self, ctx: &egui::Context) {
        let revision = self.state.design.revision();
        if self.autosave.poll(revision, self.viewport.is_dragging(), Instant::now()) {
            self.state.design.autosave();
            self.autosave.mark_saved(revision);
        } else if self.autosave.is_dirty() {
            ctx.request_repaint_after(AUTOSAVE_DELAY);
        }
    }

    fn handle_export(&mut self) {
        if !std::mem::take(&mut self.state.export_requested) {
            return;
        }
        let image = match self.viewport.export(&self.state) {
            Ok(image) => image,
            Err(e) => {
                tracing::error!("Export failed: {e}");
                self.state.status = Some(format!("Export failed: {e}"));
                return;
            }
        };

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let Some(path) = rfd::FileDialog::new()
            .set_title("Export design")
            .add_filter("PNG", &["png"])
            .set_file_name(image.suggested_file_name(millis))
            .save_file()
        else {
            return;
        };

        match std::fs::write(&path, &image.png) {
            Ok(()) => {
                tracing::info!("Saved export to {}", path.display());
                self.state.status = Some(format!("Exported {}", path.display()));
            }
            Err(e) => {
                tracing::error!("Failed to write export: {e}");
                self.state.status = Some(format!("Failed to write export: {e}"));
            }
        }
    }
}

impl eframe::App for DesignerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.maybe_autosave(ctx);

        keyboard::handle_keyboard(ctx, &mut self.state);

        // ── Menu bar ──────────────────────────────────────────
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                menus::file_menu(ui, &mut self.state);
                menus::edit_menu(ui, &mut self.state);
                menus::view_menu(ui, &mut self.state, &mut self.viewport);
                menus::settings_menu(ui, &mut self.state);
            });
        });

        // ── Settings window ──────────────────────────────────
        if menus::settings_window(ctx, &mut self.state) {
            self.viewport.reload_fonts(&self.state.settings.fonts);
        }

        // ── Status bar ───────────────────────────────────────
        if self.state.panels.status_bar {
            egui::TopBottomPanel::bottom("status_bar")
                .exact_height(22.0)
                .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)))
                .show(ctx, |ui| {
                    status_bar::show(ui, &self.state, self.viewport.scene());
                });
        }

        // ── Left panel: design controls ──────────────────────
        if self.state.panels.design_panel {
            egui::SidePanel::left("design_panel")
                .default_width(270.0)
                .width_range(220.0..=420.0)
                .resizable(true)
                .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(8)))
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        design_panel::show(ui, &mut self.state);
                    });
                });
        }

        // ── Central panel: 3D viewport ───────────────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.show(ui, &mut self.state);
            });

        self.handle_export();
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.state.design.autosave();
        self.state.settings.save();
        self.viewport.destroy();
    }
}
