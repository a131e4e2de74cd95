//! Properties of the selected overlay

use egui::Ui;
use shared::{FontStyle, FontWeight, ImageSource, OverlayKind, OverlayRef, TextDecoration};

use crate::catalog::FONT_FAMILIES;
use crate::state::AppState;
use crate::ui::design_panel::color_button;

pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Selected");

    let Some(selected) = state.design.selection().cloned() else {
        ui.weak("Click an overlay in the viewport to edit it");
        return;
    };

    match selected.kind {
        OverlayKind::Text => show_text(ui, state, &selected),
        OverlayKind::Image => show_image(ui, state, &selected),
    }
    show_placement(ui, state, &selected);

    ui.add_space(4.0);
    if ui.button("🗑 Delete").clicked() {
        state.design.remove(&selected);
    }
}

fn show_text(ui: &mut Ui, state: &mut AppState, selected: &OverlayRef) {
    let Some(original) = state.design.text(&selected.id) else {
        return;
    };
    let mut text = original.clone();

    ui.add(egui::TextEdit::multiline(&mut text.content).desired_rows(2));
    egui::Grid::new("text_props")
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            ui.label("Font");
            egui::ComboBox::from_id_salt("font_family")
                .selected_text(text.font_family.clone())
                .show_ui(ui, |ui| {
                    for family in FONT_FAMILIES {
                        ui.selectable_value(&mut text.font_family, family.to_string(), family);
                    }
                });
            ui.end_row();

            ui.label("Size");
            ui.add(egui::Slider::new(&mut text.font_size, 0.1..=1.0).step_by(0.05));
            ui.end_row();

            ui.label("Color");
            if let Some(color) = color_button(ui, text.color) {
                text.color = color;
            }
            ui.end_row();

            ui.label("Style");
            ui.horizontal(|ui| {
                let mut bold = text.weight == FontWeight::Bold;
                if ui.toggle_value(&mut bold, egui::RichText::new("B").strong()).changed() {
                    text.weight = if bold { FontWeight::Bold } else { FontWeight::Normal };
                }
                let mut italic = text.style == FontStyle::Italic;
                if ui.toggle_value(&mut italic, egui::RichText::new("I").italics()).changed() {
                    text.style = if italic { FontStyle::Italic } else { FontStyle::Normal };
                }
                let mut underline = text.decoration == TextDecoration::Underline;
                if ui.toggle_value(&mut underline, egui::RichText::new("U").underline()).changed() {
                    text.decoration = if underline { TextDecoration::Underline } else { TextDecoration::None };
                }
            });
            ui.end_row();
        });

    if text != *original {
        if let Some(target) = state.design.text_mut(&selected.id) {
            *target = text;
        }
    }
}

fn show_image(ui: &mut Ui, state: &mut AppState, selected: &OverlayRef) {
    let Some(original) = state.design.image(&selected.id) else {
        return;
    };
    let mut image = original.clone();

    egui::Grid::new("image_props")
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            ui.label("Source");
            match &mut image.source {
                ImageSource::Shape { shape, color } => {
                    ui.label(shape.label());
                    ui.end_row();
                    ui.label("Color");
                    if let Some(c) = color_button(ui, *color) {
                        *color = c;
                    }
                }
                ImageSource::Embedded { .. } => {
                    ui.label("Uploaded image");
                }
                ImageSource::File { path } => {
                    ui.label(path.display().to_string());
                }
            }
            ui.end_row();

            ui.label("Width");
            let before = image.width;
            ui.add(egui::Slider::new(&mut image.width, 0.1..=2.5));
            ui.end_row();
            // Keep proportions when the source has an aspect ratio
            if image.width != before {
                if let Some(aspect) = image.aspect_ratio.filter(|a| *a > 0.0) {
                    image.height = image.width / aspect;
                }
            }
            if image.aspect_ratio.is_none() {
                ui.label("Height");
                ui.add(egui::Slider::new(&mut image.height, 0.1..=3.5));
                ui.end_row();
            }
        });

    if image != *original {
        if let Some(target) = state.design.image_mut(&selected.id) {
            *target = image;
        }
    }
}

fn show_placement(ui: &mut Ui, state: &mut AppState, selected: &OverlayRef) {
    let Some(common) = state.design.document().find(selected).map(|v| v.common().clone()) else {
        return;
    };

    egui::Grid::new("placement_props")
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            let [mut x, mut y, z] = common.position;
            ui.label("Position");
            ui.horizontal(|ui| {
                let dx = ui.add(egui::DragValue::new(&mut x).speed(0.01).prefix("x ")).changed();
                let dy = ui.add(egui::DragValue::new(&mut y).speed(0.01).prefix("y ")).changed();
                if dx || dy {
                    state.design.set_position(selected, [x, y, z]);
                }
            });
            ui.end_row();

            let mut rotation = common.rotation;
            ui.label("Rotation");
            if ui
                .add(egui::Slider::new(&mut rotation, 0.0..=359.0).suffix("°"))
                .changed()
            {
                state.design.set_rotation(selected, rotation);
            }
            ui.end_row();

            let mut mirrored = common.mirrored;
            ui.label("Mirror");
            if ui.checkbox(&mut mirrored, "Flip horizontally").changed() {
                state.design.set_mirrored(selected, mirrored);
            }
            ui.end_row();
        });
}
