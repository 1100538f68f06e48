//! Application-level shortcuts. Viewer interaction keys (W/S/A/B/H/F/G)
//! are handled by the widget itself.

use eframe::egui;

use shapeview_gui_lib::viewer::Viewer3d;

pub fn handle_keyboard(ctx: &egui::Context, viewer: &mut Viewer3d) {
    // Don't handle shortcuts when a text field is focused
    if ctx.memory(|m| m.focused().is_some()) {
        return;
    }

    ctx.input(|i| {
        // Escape — drop the current selection
        if i.key_pressed(egui::Key::Escape) {
            viewer.clear_selection();
        }
    });
}
