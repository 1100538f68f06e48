//! Headless driver for integration tests: a `Viewer3d` with a fixed
//! viewport and a capturing selection listener, no GL required.

use std::sync::{Arc, Mutex};

use shared::{ColorSpec, Displayable, ObjectId, Point3};

use crate::viewer::display::DisplayAttributes;
use crate::viewer::observer::SelectionEvent;
use crate::viewer::Viewer3d;

pub struct TestHarness {
    pub viewer: Viewer3d,
    events: Arc<Mutex<Vec<SelectionEvent>>>,
}

impl TestHarness {
    /// Viewer looking down -Z at the origin through an 800x600 viewport
    pub fn new() -> Self {
        let mut viewer = Viewer3d::new();
        viewer.set_viewport(egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(800.0, 600.0),
        ));
        viewer.view_front();
        viewer.camera.distance = 12.0;

        let events: Arc<Mutex<Vec<SelectionEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        viewer.add_selection_listener(Box::new(move |e: &SelectionEvent| {
            sink.lock().unwrap().push(e.clone());
        }));

        Self { viewer, events }
    }

    pub fn display(&mut self, item: Displayable) -> ObjectId {
        self.viewer
            .display_shape(item, DisplayAttributes::default(), false)
            .expect("display without attributes cannot fail")
            .remove(0)
    }

    pub fn display_colored(&mut self, item: Displayable, color: &str) -> crate::viewer::error::Result<ObjectId> {
        let mut ids =
            self.viewer
                .display_colored_shape(item, ColorSpec::Named(color.to_string()), false)?;
        Ok(ids.remove(0))
    }

    pub fn display_box(&mut self, size: f64) -> ObjectId {
        self.display(Displayable::Shape(shared::primitives::box_solid(size, size, size)))
    }

    pub fn display_point(&mut self, x: f64, y: f64, z: f64) -> ObjectId {
        self.display(Displayable::Point(Point3::new(x, y, z)))
    }

    /// Screen position of a world point under the current camera
    pub fn screen_of(&self, world: [f32; 3]) -> Option<egui::Pos2> {
        self.viewer.camera.project(world, self.viewer.viewport())
    }

    pub fn center(&self) -> egui::Pos2 {
        self.viewer.viewport().center()
    }

    pub fn click(&mut self, pos: egui::Pos2) {
        self.viewer.select_at(pos.x, pos.y);
    }

    pub fn shift_click(&mut self, pos: egui::Pos2) {
        self.viewer.shift_select_at(pos.x, pos.y);
    }

    pub fn drag_select(&mut self, min: egui::Pos2, max: egui::Pos2) {
        self.viewer.select_in_rect(min, max);
    }

    pub fn object_count(&self) -> usize {
        self.viewer.objects().len()
    }

    /// Captured listener events, in order
    pub fn events(&self) -> Vec<SelectionEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
