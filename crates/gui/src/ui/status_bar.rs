use egui::Ui;

use crate::scene::SceneManager;
use crate::state::AppState;
use crate::viewport::side_title;

pub fn show(ui: &mut Ui, state: &AppState, scene: &SceneManager) {
    ui.horizontal(|ui| {
        let side = state.design.current_side();
        ui.weak(format!(
            "{}: {} overlay(s)",
            side_title(side),
            state.design.overlay_count_on(side)
        ));

        ui.separator();

        match state.design.selection() {
            Some(selected) => {
                ui.label(format!("Selected: {:?}", selected.kind));
            }
            None => {
                ui.weak("Ready");
            }
        }

        let pending = scene.pending_loads();
        if pending > 0 {
            ui.separator();
            ui.colored_label(egui::Color32::from_rgb(200, 140, 40), format!("Loading {pending} image(s)"));
        }

        if let Some(status) = &state.status {
            ui.separator();
            ui.weak(status);
        }

        // Right-aligned version
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(concat!("Tee Designer v", env!("CARGO_PKG_VERSION")));
        });
    });
}
