//! Keyboard shortcut handling

use eframe::egui;

use crate::state::AppState;

/// Handle keyboard shortcuts for the application
pub fn handle_keyboard(ctx: &egui::Context, state: &mut AppState) {
    // Don't handle shortcuts when a text field is focused
    if ctx.memory(|m| m.focused().is_some()) {
        return;
    }

    let (delete, escape, tab, export) = ctx.input(|i| {
        (
            i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
            i.key_pressed(egui::Key::Escape),
            i.key_pressed(egui::Key::Tab),
            i.modifiers.command && i.key_pressed(egui::Key::E),
        )
    });

    // Delete / Backspace: remove the selected overlay
    if delete {
        state.design.remove_selected();
    }
    // Escape: deselect
    if escape {
        state.design.clear_selection();
    }
    // Tab: switch garment side
    if tab {
        state.design.toggle_side();
    }
    // Ctrl+E: export
    if export {
        state.export_requested = true;
    }
}
