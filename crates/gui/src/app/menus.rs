//! Application menu bar.

use eframe::egui;

use shapeview_gui_lib::viewer::{DisplayMode, Viewer3d};
use shapeview_gui_lib::viewport::camera::Projection;

pub fn file_menu(ui: &mut egui::Ui, viewer: &mut Viewer3d) {
    ui.menu_button("File", |ui| {
        if ui.button("Open scene…").clicked() {
            ui.close_menu();
            if let Some(path) = rfd::FileDialog::new()
                .set_title("Open scene")
                .add_filter("JSON", &["json"])
                .pick_file()
            {
                match std::fs::read_to_string(&path) {
                    Ok(json) => match serde_json::from_str::<shared::SceneDescription>(&json) {
                        Ok(scene) => {
                            viewer.erase_all();
                            super::load_scene(viewer, &scene);
                            viewer.fit_all();
                            tracing::info!("Loaded scene from {}", path.display());
                        }
                        Err(e) => tracing::error!("Failed to parse scene: {e}"),
                    },
                    Err(e) => tracing::error!("Failed to read file: {e}"),
                }
            }
        }

        if ui.button("Export image…").clicked() {
            ui.close_menu();
            if let Some(path) = rfd::FileDialog::new()
                .set_title("Export image")
                .add_filter("PNG", &["png"])
                .add_filter("JPEG", &["jpg", "jpeg"])
                .set_file_name("viewport.png")
                .save_file()
            {
                if let Err(e) = viewer.export_image(path) {
                    tracing::error!("Export failed: {e}");
                }
            }
        }

        if ui.button("Background image…").clicked() {
            ui.close_menu();
            if let Some(path) = rfd::FileDialog::new()
                .set_title("Background image")
                .add_filter("Images", &["png", "jpg", "jpeg", "bmp"])
                .pick_file()
            {
                if let Err(e) = viewer.set_background_image(path, true) {
                    tracing::error!("Background image failed: {e}");
                }
            }
        }

        ui.separator();

        if ui.button("Erase all").clicked() {
            viewer.erase_all();
            ui.close_menu();
        }

        if ui.button("Quit").clicked() {
            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

pub fn view_menu(ui: &mut egui::Ui, viewer: &mut Viewer3d) {
    ui.menu_button("View", |ui| {
        let orientations: [(&str, fn(&mut Viewer3d)); 7] = [
            ("Top", Viewer3d::view_top),
            ("Bottom", Viewer3d::view_bottom),
            ("Left", Viewer3d::view_left),
            ("Right", Viewer3d::view_right),
            ("Front", Viewer3d::view_front),
            ("Rear", Viewer3d::view_rear),
            ("Isometric", Viewer3d::view_iso),
        ];
        for (label, apply) in orientations {
            if ui.button(label).clicked() {
                apply(viewer);
                ui.close_menu();
            }
        }

        ui.separator();

        let mut projection = viewer.camera.projection;
        ui.radio_value(&mut projection, Projection::Perspective, "Perspective");
        ui.radio_value(&mut projection, Projection::Orthographic, "Orthographic");
        if projection != viewer.camera.projection {
            match projection {
                Projection::Perspective => viewer.set_perspective(),
                Projection::Orthographic => viewer.set_orthographic(),
            }
        }

        ui.separator();

        let mut mode = viewer.display_mode();
        ui.radio_value(&mut mode, DisplayMode::Shaded, "Shaded");
        ui.radio_value(&mut mode, DisplayMode::Wireframe, "Wireframe");
        ui.radio_value(&mut mode, DisplayMode::HiddenLine, "Hidden line");
        if mode != viewer.display_mode() {
            match mode {
                DisplayMode::Shaded => viewer.set_mode_shaded(),
                DisplayMode::Wireframe => viewer.set_mode_wireframe(),
                DisplayMode::HiddenLine => viewer.set_mode_hidden_line(),
            }
        }

        ui.separator();

        ui.checkbox(&mut viewer.settings.grid.visible, "Grid");
        ui.checkbox(&mut viewer.settings.axes.visible, "Axes");

        let mut aa = viewer.rendering_params().msaa_samples > 0;
        if ui.checkbox(&mut aa, "Antialiasing").changed() {
            if aa {
                viewer.enable_antialiasing();
            } else {
                viewer.disable_antialiasing();
            }
        }

        ui.separator();

        if ui.button("Fit all").clicked() {
            viewer.fit_all();
            ui.close_menu();
        }
        if ui.button("Reset view").clicked() {
            viewer.reset_view();
            ui.close_menu();
        }
    });
}

pub fn selection_menu(ui: &mut egui::Ui, viewer: &mut Viewer3d) {
    ui.menu_button("Selection", |ui| {
        if ui.button("Vertices").clicked() {
            viewer.set_selection_mode_vertex();
            ui.close_menu();
        }
        if ui.button("Edges").clicked() {
            viewer.set_selection_mode_edge();
            ui.close_menu();
        }
        if ui.button("Faces").clicked() {
            viewer.set_selection_mode_face();
            ui.close_menu();
        }
        if ui.button("Solids").clicked() {
            viewer.set_selection_mode_solid();
            ui.close_menu();
        }
        if ui.button("Neutral").clicked() {
            viewer.set_selection_mode_neutral();
            ui.close_menu();
        }

        ui.separator();

        if ui.button("Cycle granularity").clicked() {
            viewer.cycle_selection_granularity();
            ui.close_menu();
        }
        if ui.button("Clear selection").clicked() {
            viewer.clear_selection();
            ui.close_menu();
        }
    });
}
