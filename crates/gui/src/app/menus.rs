//! Application menu bar and settings window

use eframe::egui;
use shared::{DesignDocument, Side};

use crate::state::{AppSettings, AppState};
use crate::viewport::ViewportPanel;

/// Show the file menu
pub fn file_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("File", |ui| {
        if ui.button("New design").clicked() {
            state.design.replace(DesignDocument::default());
            ui.close_menu();
        }
        if ui.button("Open design…").clicked() {
            ui.close_menu();
            if let Some(path) = rfd::FileDialog::new()
                .set_title("Open design")
                .add_filter("JSON", &["json"])
                .pick_file()
            {
                match std::fs::read_to_string(&path) {
                    Ok(json) => match serde_json::from_str::<DesignDocument>(&json) {
                        Ok(doc) => {
                            state.design.replace(doc);
                            tracing::info!("Loaded design from {}", path.display());
                        }
                        Err(e) => tracing::error!("Failed to parse design: {e}"),
                    },
                    Err(e) => tracing::error!("Failed to read file: {e}"),
                }
            }
        }
        if ui.button("Save design…").clicked() {
            ui.close_menu();
            if let Some(path) = rfd::FileDialog::new()
                .set_title("Save design")
                .add_filter("JSON", &["json"])
                .set_file_name("design.json")
                .save_file()
            {
                match state.design.to_json() {
                    Ok(json) => {
                        if let Err(e) = std::fs::write(&path, json) {
                            tracing::error!("Failed to write design: {e}");
                        } else {
                            tracing::info!("Saved design to {}", path.display());
                        }
                    }
                    Err(e) => tracing::error!("Failed to serialize design: {e}"),
                }
            }
        }
        ui.separator();
        if ui.button("Export PNG…").clicked() {
            state.export_requested = true;
            ui.close_menu();
        }
        ui.separator();
        if ui.button("Quit").clicked() {
            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

/// Show the edit menu
pub fn edit_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("Edit", |ui| {
        let has_selection = state.design.selection().is_some();
        if ui
            .add_enabled(has_selection, egui::Button::new("Delete selected"))
            .clicked()
        {
            state.design.remove_selected();
            ui.close_menu();
        }
        if ui
            .add_enabled(has_selection, egui::Button::new("Deselect"))
            .clicked()
        {
            state.design.clear_selection();
            ui.close_menu();
        }
    });
}

/// Show the view menu
pub fn view_menu(ui: &mut egui::Ui, state: &mut AppState, viewport: &mut ViewportPanel) {
    ui.menu_button("View", |ui| {
        ui.checkbox(&mut state.panels.design_panel, "Design panel");
        ui.checkbox(&mut state.panels.status_bar, "Status bar");
        ui.separator();
        let side = state.design.current_side();
        if ui.selectable_label(side == Side::Front, "Front side").clicked() {
            state.design.set_side(Side::Front);
            ui.close_menu();
        }
        if ui.selectable_label(side == Side::Back, "Back side").clicked() {
            state.design.set_side(Side::Back);
            ui.close_menu();
        }
        ui.separator();
        if ui.button("Reset camera").clicked() {
            viewport.reset_camera();
            ui.close_menu();
        }
        if ui.button("Retry failed images").clicked() {
            viewport.retry_failed_loads();
            ui.close_menu();
        }
    });
}

/// Show the settings menu
pub fn settings_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("Settings", |ui| {
        if ui.button("Preferences…").clicked() {
            state.show_settings_window = true;
            ui.close_menu();
        }
    });
}

/// Show the settings window. Returns true when the user applied changes.
pub fn settings_window(ctx: &egui::Context, state: &mut AppState) -> bool {
    let mut open = state.show_settings_window;
    let mut applied = false;
    egui::Window::new("Preferences")
        .open(&mut open)
        .resizable(true)
        .default_width(360.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                show_viewport_settings(ui, state);
                show_camera_settings(ui, state);
                show_export_settings(ui, state);
                show_font_settings(ui, state);
                applied = show_settings_buttons(ui, state);
            });
        });
    state.show_settings_window = open;
    applied
}

fn rgb_edit(ui: &mut egui::Ui, label: &str, rgb: &mut [u8; 3]) {
    ui.horizontal(|ui| {
        ui.label(label);
        let mut color = egui::Color32::from_rgb(rgb[0], rgb[1], rgb[2]);
        if ui.color_edit_button_srgba(&mut color).changed() {
            *rgb = [color.r(), color.g(), color.b()];
        }
    });
}

fn show_viewport_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Viewport");
    rgb_edit(ui, "Background", &mut state.settings.viewport.background_color);
    rgb_edit(ui, "Selection outline", &mut state.settings.viewport.selection_color);
    ui.weak("Outline color applies after restart");
    ui.add_space(10.0);
}

fn show_camera_settings(ui: &mut egui::Ui, state: &mut AppState) {
    let camera = &mut state.settings.camera;
    ui.heading("Camera");
    ui.horizontal(|ui| {
        ui.label("Field of view");
        ui.add(egui::DragValue::new(&mut camera.fov_degrees).speed(0.5).range(20.0..=90.0).suffix("°"));
    });
    ui.horizontal(|ui| {
        ui.label("Distance");
        ui.add(egui::DragValue::new(&mut camera.distance).speed(0.1).range(1.0..=20.0));
    });
    ui.horizontal(|ui| {
        ui.label("Zoom range");
        ui.add(egui::DragValue::new(&mut camera.min_distance).speed(0.1).range(0.5..=20.0));
        ui.add(egui::DragValue::new(&mut camera.max_distance).speed(0.1).range(1.0..=50.0));
    });
    ui.weak("Camera settings apply after restart");
    ui.add_space(10.0);
}

fn show_export_settings(ui: &mut egui::Ui, state: &mut AppState) {
    let export = &mut state.settings.export;
    ui.heading("Export");
    ui.horizontal(|ui| {
        ui.label("Size");
        ui.add(egui::DragValue::new(&mut export.width).speed(8).range(64..=8192).suffix(" px"));
        ui.label("×");
        ui.add(egui::DragValue::new(&mut export.height).speed(8).range(64..=8192).suffix(" px"));
    });
    ui.checkbox(&mut export.transparent_background, "Transparent background");
    ui.add_space(10.0);
}

fn show_font_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Fonts");
    if state.settings.fonts.families.is_empty() {
        ui.weak("Built-in fonts only");
    }
    let mut remove = None;
    for (family, path) in &state.settings.fonts.families {
        ui.horizontal(|ui| {
            ui.label(family);
            ui.weak(path.display().to_string());
            if ui.small_button("✖").clicked() {
                remove = Some(family.clone());
            }
        });
    }
    if let Some(family) = remove {
        state.settings.fonts.families.remove(&family);
    }
    if ui.button("Add font file…").clicked() {
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Add font")
            .add_filter("Fonts", &["ttf", "otf"])
            .pick_file()
        {
            let family = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Custom".to_string());
            state.settings.fonts.families.insert(family, path);
        }
    }
    ui.weak("Font changes redraw text on Apply");
    ui.add_space(10.0);
}

fn show_settings_buttons(ui: &mut egui::Ui, state: &mut AppState) -> bool {
    let mut applied = false;
    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("Apply").clicked() {
            state.settings.save();
            applied = true;
        }
        if ui.button("Reset").clicked() {
            state.settings = AppSettings::default();
        }
        if ui.button("Close").clicked() {
            state.show_settings_window = false;
        }
    });
    applied
}
