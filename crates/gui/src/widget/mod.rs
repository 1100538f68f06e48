//! The event adapter: an egui widget that derives an interaction mode
//! from transient button/modifier state and forwards one viewer call per
//! event.

pub mod input;

use std::sync::{Arc, Mutex};

use egui::Ui;

use crate::viewer::color::Color;
use crate::viewer::{OverlayItem, Viewer3d};
use crate::viewport::gl_renderer::{GlRenderer, ObjectRender, RenderParams};
use input::{DragMode, ModifierState, PointerButtons};

/// Drag distance before a rubber-band rectangle is armed
const RUBBER_BAND_TOLERANCE: f32 = 2.0;

/// What the active rubber-band resolves to on release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RubberKind {
    Select,
    Zoom,
}

/// The 3D viewer widget
pub struct ViewerWidget {
    renderer: Option<Arc<Mutex<GlRenderer>>>,
    drag_start: Option<egui::Pos2>,
    rubber_band: Option<egui::Rect>,
    rubber_kind: Option<RubberKind>,
}

impl ViewerWidget {
    pub fn new() -> Self {
        Self {
            renderer: None,
            drag_start: None,
            rubber_band: None,
            rubber_kind: None,
        }
    }

    /// Initialize the GL renderer (must be called with a GL context)
    pub fn init_gl(&mut self, gl: &glow::Context) {
        let renderer = GlRenderer::new(gl);
        self.renderer = Some(Arc::new(Mutex::new(renderer)));
    }

    pub fn show(&mut self, ui: &mut Ui, viewer: &mut Viewer3d) -> egui::Response {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
        viewer.set_viewport(rect);

        self.handle_keys(ui, &response, viewer);
        self.handle_pointer(ui, &response, viewer);
        self.handle_wheel(ui, &response, viewer);

        if ui.is_rect_visible(rect) {
            self.paint_gl(ui, rect, viewer);
            self.draw_overlays(ui, rect, viewer);
        }

        if viewer.take_repaint_request() {
            ui.ctx().request_repaint();
        }

        response
    }

    // ── Keyboard ─────────────────────────────────────────────

    fn handle_keys(&mut self, ui: &Ui, response: &egui::Response, viewer: &mut Viewer3d) {
        if !response.hovered() {
            return;
        }
        let events = ui.input(|i| i.events.clone());
        for event in events {
            let egui::Event::Key { key, pressed: true, repeat: false, .. } = event else {
                continue;
            };
            match input::lookup_key(key) {
                Some(action) => input::apply_action(viewer, action),
                None => tracing::info!("key {key:?} not mapped to any viewer operation"),
            }
        }
    }

    // ── Pointer ──────────────────────────────────────────────

    fn handle_pointer(&mut self, ui: &Ui, response: &egui::Response, viewer: &mut Viewer3d) {
        let (buttons, modifiers) = ui.input(|i| {
            (
                PointerButtons {
                    left: i.pointer.primary_down(),
                    middle: i.pointer.middle_down(),
                    right: i.pointer.secondary_down(),
                },
                ModifierState { shift: i.modifiers.shift },
            )
        });

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.drag_start = Some(pos);
                viewer.start_rotation(pos);
            }
        }

        let mode = input::resolve_drag_mode(buttons, modifiers);
        let pointer_pos = response.interact_pointer_pos().or_else(|| response.hover_pos());

        if let Some(pos) = pointer_pos {
            match mode {
                DragMode::Rotate if response.dragged() => {
                    viewer.rotation(pos);
                    self.clear_rubber_band();
                }
                DragMode::DynamicZoom if response.dragged() => {
                    let delta = response.drag_delta();
                    viewer.dynamic_zoom(pos - delta, pos);
                    self.clear_rubber_band();
                }
                DragMode::Pan if response.dragged() => {
                    let delta = response.drag_delta();
                    viewer.pan(delta.x, -delta.y);
                    self.clear_rubber_band();
                }
                DragMode::AreaSelect if response.dragged() => {
                    self.update_rubber_band(pos, RubberKind::Select);
                }
                DragMode::AreaZoom if response.dragged() => {
                    self.update_rubber_band(pos, RubberKind::Zoom);
                }
                DragMode::Hover if response.hovered() => {
                    viewer.hover_at(pos.x, pos.y);
                }
                _ => {}
            }
        }

        self.handle_release(ui, response, modifiers, viewer);
    }

    fn handle_release(
        &mut self,
        ui: &Ui,
        response: &egui::Response,
        modifiers: ModifierState,
        viewer: &mut Viewer3d,
    ) {
        let (left_released, right_released, any_down) = ui.input(|i| {
            (
                i.pointer.primary_released(),
                i.pointer.secondary_released(),
                i.pointer.any_down(),
            )
        });

        // Releasing after a rectangle drag resolves the gesture
        if left_released {
            if let (Some(band), Some(RubberKind::Select)) = (self.rubber_band, self.rubber_kind) {
                viewer.select_in_rect(band.min, band.max);
                self.clear_rubber_band();
            }
        }
        if right_released {
            if let (Some(band), Some(RubberKind::Zoom)) = (self.rubber_band, self.rubber_kind) {
                viewer.zoom_area(band.min, band.max);
                self.clear_rubber_band();
            }
        }

        // A plain left click without an active rectangle selects
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if modifiers.shift {
                    viewer.shift_select_at(pos.x, pos.y);
                } else {
                    viewer.select_at(pos.x, pos.y);
                }
            }
        }

        if !any_down {
            self.drag_start = None;
        }
    }

    fn update_rubber_band(&mut self, pos: egui::Pos2, kind: RubberKind) {
        let Some(start) = self.drag_start else { return };
        let delta = pos - start;
        if self.rubber_band.is_none()
            && delta.x.abs() <= RUBBER_BAND_TOLERANCE
            && delta.y.abs() <= RUBBER_BAND_TOLERANCE
        {
            return;
        }
        self.rubber_band = Some(egui::Rect::from_two_pos(start, pos));
        self.rubber_kind = Some(kind);
    }

    fn clear_rubber_band(&mut self) {
        self.rubber_band = None;
        self.rubber_kind = None;
    }

    // ── Wheel ────────────────────────────────────────────────

    fn handle_wheel(&mut self, ui: &Ui, response: &egui::Response, viewer: &mut Viewer3d) {
        if !response.hovered() {
            return;
        }
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll.abs() > 0.1 {
            if let Some(pos) = response.hover_pos() {
                viewer.zoom_at_point(pos, scroll * 0.02);
            }
        }
    }

    // ── Painting ─────────────────────────────────────────────

    fn paint_gl(&mut self, ui: &mut Ui, rect: egui::Rect, viewer: &mut Viewer3d) {
        let Some(renderer) = &self.renderer else { return };
        let renderer = renderer.clone();

        let camera = viewer.camera.clone();
        let version = viewer.scene_version();
        let objects: Vec<ObjectRender> = viewer
            .objects()
            .iter()
            .filter(|o| o.visible)
            .map(|o| ObjectRender {
                id: o.id.clone(),
                mesh: o.mesh.clone(),
                lines: o.lines.clone(),
                alpha: o.alpha(),
                material: o.material.props(),
                texture: o.texture.clone(),
            })
            .collect();

        let grid_settings = viewer.settings.grid.clone();
        let axis_settings = viewer.settings.axes.clone();
        let display_mode = viewer.display_mode();
        let background = viewer.background().clone();
        let msaa = viewer.rendering_params().msaa_samples > 0;
        let select_color = Color::from_bytes(viewer.settings.highlight.select_color).to_array();
        let hover_color = Color::from_bytes(viewer.settings.highlight.hover_color).to_array();
        let selection = viewer.selection_by_object();
        let hovered = viewer.hovered().cloned();
        let export_path = viewer.take_export_request();

        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(eframe::egui_glow::CallbackFn::new(move |info, painter| {
                let gl = painter.gl();

                let clip = info.clip_rect_in_pixels();
                let viewport = [
                    clip.left_px as f32,
                    clip.from_bottom_px as f32,
                    clip.width_px as f32,
                    clip.height_px as f32,
                ];

                if let Ok(mut r) = renderer.lock() {
                    r.update_grid(gl, &grid_settings);
                    r.update_axes(gl, &axis_settings);
                    r.sync_objects(gl, version, &objects);

                    let params = RenderParams {
                        viewport,
                        display_mode,
                        background: background.clone(),
                        msaa,
                        grid_visible: grid_settings.visible,
                        axes_visible: axis_settings.visible,
                        axes_thickness: axis_settings.thickness,
                        select_color,
                        hover_color,
                        selection: selection.clone(),
                        hovered: hovered.clone(),
                        export_path: export_path.clone(),
                    };
                    r.paint(gl, &camera, &params);
                }
            })),
        };
        ui.painter().add(callback);
    }

    // ── Overlays ─────────────────────────────────────────────

    fn draw_overlays(&self, ui: &Ui, rect: egui::Rect, viewer: &Viewer3d) {
        let painter = ui.painter_at(rect);

        if viewer.settings.axes.show_labels && viewer.settings.axes.visible {
            self.draw_axis_labels(&painter, rect, viewer);
        }

        for item in viewer.overlays() {
            match item {
                OverlayItem::Text { position, text, height, color } => {
                    if let Some(screen) = viewer.camera.project(position.to_f32(), rect) {
                        if rect.contains(screen) {
                            painter.text(
                                screen,
                                egui::Align2::CENTER_BOTTOM,
                                text,
                                egui::FontId::proportional(*height),
                                color_to_egui(*color),
                            );
                        }
                    }
                }
                OverlayItem::Vector { origin, direction, color } => {
                    let tip = [
                        (origin.x + direction.x) as f32,
                        (origin.y + direction.y) as f32,
                        (origin.z + direction.z) as f32,
                    ];
                    let (Some(from), Some(to)) = (
                        viewer.camera.project(origin.to_f32(), rect),
                        viewer.camera.project(tip, rect),
                    ) else {
                        continue;
                    };
                    painter.arrow(
                        from,
                        to - from,
                        egui::Stroke::new(2.0, color_to_egui(*color)),
                    );
                }
            }
        }

        // Rubber-band rectangle for area select / zoom
        if let Some(band) = self.rubber_band {
            painter.rect_stroke(
                band,
                0.0,
                egui::Stroke::new(2.0, egui::Color32::BLACK),
                egui::StrokeKind::Outside,
            );
        }
    }

    fn draw_axis_labels(&self, painter: &egui::Painter, rect: egui::Rect, viewer: &Viewer3d) {
        let tip = viewer.settings.axes.length + 0.1;
        let labels = [
            ([tip, 0.0, 0.0], "X", egui::Color32::from_rgb(220, 70, 70)),
            ([0.0, tip, 0.0], "Y", egui::Color32::from_rgb(70, 200, 70)),
            ([0.0, 0.0, tip], "Z", egui::Color32::from_rgb(70, 110, 220)),
        ];

        for (pos, label, color) in &labels {
            if let Some(screen) = viewer.camera.project(*pos, rect) {
                if rect.contains(screen) {
                    painter.text(
                        screen,
                        egui::Align2::LEFT_BOTTOM,
                        *label,
                        egui::FontId::monospace(12.0),
                        *color,
                    );
                }
            }
        }
    }
}

impl Default for ViewerWidget {
    fn default() -> Self {
        Self::new()
    }
}

fn color_to_egui(c: Color) -> egui::Color32 {
    egui::Color32::from_rgb(
        (c.r * 255.0) as u8,
        (c.g * 255.0) as u8,
        (c.b * 255.0) as u8,
    )
}
