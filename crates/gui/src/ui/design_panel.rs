//! Left design panel: side, garment, material, add overlays, export

use std::io::Cursor;

use egui::Ui;
use shared::{ImageOverlay, ImageSource, Rgb, ShapeKind, Side, TextOverlay};

use crate::catalog::{self, DEFAULT_SHAPE_COLOR, PRESET_COLORS};
use crate::state::AppState;
use crate::ui::properties;
use crate::viewport::side_title;

pub fn show(ui: &mut Ui, state: &mut AppState) {
    show_side(ui, state);
    ui.separator();
    show_garment(ui, state);
    ui.separator();
    show_material(ui, state);
    ui.separator();
    show_add(ui, state);
    ui.separator();
    properties::show(ui, state);
    ui.separator();

    ui.add_space(4.0);
    let export = egui::Button::new(egui::RichText::new("Export PNG").strong()).min_size(egui::vec2(ui.available_width(), 30.0));
    if ui.add(export).clicked() {
        state.export_requested = true;
    }
}

fn show_side(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Side");
    let current = state.design.current_side();
    ui.horizontal(|ui| {
        for side in [Side::Front, Side::Back] {
            let count = state.design.overlay_count_on(side);
            let label = format!("{} ({count})", side_title(side));
            if ui.selectable_label(current == side, label).clicked() {
                state.design.set_side(side);
            }
        }
    });
}

/// Preset swatch; returns true when clicked
pub fn swatch(ui: &mut Ui, color: Rgb, selected: bool) -> bool {
    let [r, g, b] = color.0;
    let (rect, response) = ui.allocate_exact_size(egui::vec2(22.0, 22.0), egui::Sense::click());
    let painter = ui.painter();
    painter.rect_filled(rect, 4.0, egui::Color32::from_rgb(r, g, b));
    let stroke = if selected {
        egui::Stroke::new(2.0, ui.visuals().selection.bg_fill)
    } else {
        egui::Stroke::new(1.0, egui::Color32::from_gray(200))
    };
    painter.rect_stroke(rect, 4.0, stroke, egui::StrokeKind::Inside);
    response.on_hover_text(color.to_hex()).clicked()
}

/// Color picker button bound to an `Rgb`; returns the new color on change
pub fn color_button(ui: &mut Ui, color: Rgb) -> Option<Rgb> {
    let [r, g, b] = color.0;
    let mut c = egui::Color32::from_rgb(r, g, b);
    if ui.color_edit_button_srgba(&mut c).changed() {
        Some(Rgb([c.r(), c.g(), c.b()]))
    } else {
        None
    }
}

fn show_garment(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Garment color");
    let current = state.design.garment_color();
    ui.horizontal_wrapped(|ui| {
        for color in PRESET_COLORS {
            if swatch(ui, color, color == current) {
                state.design.set_garment_color(color);
            }
        }
        if let Some(color) = color_button(ui, current) {
            state.design.set_garment_color(color);
        }
    });
}

fn show_material(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Material");
    let current = state.design.material();
    for params in catalog::materials() {
        let selected = params.kind == current;
        let response = ui
            .selectable_label(selected, egui::RichText::new(params.name).strong())
            .on_hover_text(params.description);
        if response.clicked() {
            state.design.set_material(params.kind);
        }
        if selected {
            ui.weak(params.description);
            ui.weak(format!(
                "Texture {}% · Shine {}%",
                params.texture_percent(),
                params.shine_percent()
            ));
        }
    }
}

fn show_add(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Add");
    let side = state.design.current_side();

    let draft_id = ui.id().with("text_draft");
    let mut draft: String = ui.data_mut(|d| d.get_temp(draft_id)).unwrap_or_default();
    ui.horizontal(|ui| {
        ui.add(egui::TextEdit::singleline(&mut draft).hint_text("Your text").desired_width(150.0));
        if ui.button("Add text").clicked() {
            let content = if draft.trim().is_empty() { "New Text".to_string() } else { draft.clone() };
            state.design.add_text(TextOverlay::new(side).with_content(content));
            draft.clear();
        }
    });
    ui.data_mut(|d| d.insert_temp(draft_id, draft));

    ui.label("Shapes");
    ui.horizontal_wrapped(|ui| {
        for shape in ShapeKind::all() {
            if ui.button(shape.label()).clicked() {
                state.design.add_shape(*shape, DEFAULT_SHAPE_COLOR);
            }
        }
    });

    if ui.button("Upload image…").clicked() {
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Upload image")
            .add_filter("Images", &["png", "jpg", "jpeg"])
            .pick_file()
        {
            match read_picture(&path, side) {
                Ok(overlay) => {
                    state.design.add_image(overlay);
                    tracing::info!("Added image {}", path.display());
                }
                Err(e) => {
                    tracing::warn!("Cannot use {}: {e}", path.display());
                    state.status = Some(format!("Cannot use image: {e}"));
                }
            }
        }
    }
}

/// Embed a picture file as a new overlay
fn read_picture(path: &std::path::Path, side: Side) -> Result<ImageOverlay, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    let (w, h) = image::ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .map_err(|e| e.to_string())?
        .into_dimensions()
        .map_err(|e| e.to_string())?;
    let aspect = if h > 0 { w as f32 / h as f32 } else { 1.0 };
    Ok(ImageOverlay::new_image(side, ImageSource::Embedded { bytes: bytes.into() }, aspect))
}
