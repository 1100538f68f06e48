//! Application shell: menu bar, global shortcuts and the viewer widget.

mod keyboard;
mod menus;

use eframe::egui;
use shapeview_gui_lib::fixtures;
use shapeview_gui_lib::settings::ViewerSettings;
use shapeview_gui_lib::viewer::display::DisplayAttributes;
use shapeview_gui_lib::viewer::observer::SelectionEvent;
use shapeview_gui_lib::viewer::Viewer3d;
use shapeview_gui_lib::widget::ViewerWidget;
use shared::SceneDescription;

/// Main application
pub struct ViewerApp {
    viewer: Viewer3d,
    widget: ViewerWidget,
}

impl ViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, initial_scene: Option<SceneDescription>) -> Self {
        let mut viewer = Viewer3d::with_settings(ViewerSettings::load());

        let scene = initial_scene.unwrap_or_else(fixtures::demo_scene);
        load_scene(&mut viewer, &scene);
        viewer.fit_all();

        viewer.add_selection_listener(Box::new(|e: &SelectionEvent| {
            tracing::info!(count = e.selection.len(), origin = ?e.origin, "selection changed");
        }));

        let mut widget = ViewerWidget::new();
        if let Some(gl) = cc.gl.as_ref() {
            widget.init_gl(gl);
        }

        Self { viewer, widget }
    }
}

/// Display every object of a scene description; a bad object is logged
/// and skipped rather than aborting the rest of the scene.
pub fn load_scene(viewer: &mut Viewer3d, scene: &SceneDescription) {
    for obj in &scene.objects {
        let mut attrs = DisplayAttributes::default();
        if let Some(color) = &obj.color {
            attrs = attrs.with_color(color.clone());
        }
        if let Some(t) = obj.transparency {
            attrs = attrs.with_transparency(t);
        }
        if let Err(e) = viewer.display_shape(obj.item.clone(), attrs, false) {
            tracing::error!("Failed to display {:?}: {e}", obj.name);
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        keyboard::handle_keyboard(ctx, &mut self.viewer);

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                menus::file_menu(ui, &mut self.viewer);
                menus::view_menu(ui, &mut self.viewer);
                menus::selection_menu(ui, &mut self.viewer);
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.widget.show(ui, &mut self.viewer);
            });
    }

    fn on_exit(&mut self, _gl: Option<&glow::Context>) {
        self.viewer.settings.save();
    }
}
