//! The viewport controller: owns the displayed objects, camera, selection
//! and render state, and exposes the operation surface the event adapter
//! forwards into.

pub mod color;
pub mod display;
pub mod error;
pub mod material;
pub mod observer;
pub mod selection;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::DVec3;
use shared::{ColorSpec, DeflectionParams, Displayable, ObjectId, Point3, Shape, Vec3d};

use crate::settings::ViewerSettings;
use crate::viewport::camera::{ArcBallCamera, Projection, ViewOrientation};
use crate::viewport::picking::{self, Aabb};
use self::color::{Color, Palette};
use self::display::{DisplayAttributes, DisplayObject};
use self::error::{Result, ViewerError};
use self::observer::{
    ListenerId, ListenerRegistry, SelectionEvent, SelectionListener, SelectionOrigin,
};
use self::selection::{Granularity, PickedItem, PickedPart, SelectionState};

/// How displayed shapes are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    Wireframe,
    #[default]
    Shaded,
    /// Visible-edge rendering: depth-tested edges over an invisible fill
    HiddenLine,
}

/// Rendering pipeline selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMethod {
    #[default]
    Rasterization,
    RayTracing,
}

/// The active rendering parameter set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderingParams {
    pub method: RenderMethod,
    pub raytracing_depth: u32,
    pub shadows: bool,
    pub reflections: bool,
    pub antialiasing: bool,
    pub transparent_shadows: bool,
    /// MSAA sample count, 0 disables
    pub msaa_samples: u32,
}

impl Default for RenderingParams {
    fn default() -> Self {
        Self {
            method: RenderMethod::Rasterization,
            raytracing_depth: 3,
            shadows: true,
            reflections: false,
            antialiasing: false,
            transparent_shadows: false,
            msaa_samples: 0,
        }
    }
}

/// Gradient fill direction for the background
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientFill {
    Vertical,
    Horizontal,
    Diagonal,
}

/// Viewport background
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    Solid(Color),
    Gradient {
        first: Color,
        second: Color,
        fill: GradientFill,
    },
    Image {
        path: PathBuf,
        stretch: bool,
    },
}

/// Non-pickable annotation drawn over the scene
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayItem {
    Text {
        position: Point3,
        text: String,
        height: f32,
        color: Color,
    },
    Vector {
        origin: Point3,
        direction: Vec3d,
        color: Color,
    },
}

/// Per-object selection breakdown handed to the renderer for highlights
#[derive(Debug, Clone, Default)]
pub struct SelectedParts {
    pub whole: bool,
    pub vertices: Vec<usize>,
    pub edges: Vec<usize>,
    pub faces: Vec<usize>,
}

/// The viewport controller
pub struct Viewer3d {
    pub camera: ArcBallCamera,
    pub settings: ViewerSettings,
    palette: Palette,
    deflection: DeflectionParams,
    objects: Vec<DisplayObject>,
    selection: SelectionState,
    listeners: ListenerRegistry,
    display_mode: DisplayMode,
    rendering: RenderingParams,
    background: Background,
    overlays: Vec<OverlayItem>,
    hovered: Option<ObjectId>,
    /// Plane for pointer-to-3D conversion: (origin, unit normal)
    activity_plane: (DVec3, DVec3),
    rotation_anchor: Option<egui::Pos2>,
    viewport: egui::Rect,
    scene_version: u64,
    export_request: Option<PathBuf>,
    repaint_requested: bool,
}

impl Viewer3d {
    pub fn new() -> Self {
        Self::with_settings(ViewerSettings::default())
    }

    pub fn with_settings(settings: ViewerSettings) -> Self {
        let background = Background::Solid(Color::from_bytes(settings.background_color));
        Self {
            camera: ArcBallCamera::new(),
            settings,
            palette: Palette::new(),
            deflection: DeflectionParams::default(),
            objects: Vec::new(),
            selection: SelectionState::default(),
            listeners: ListenerRegistry::default(),
            display_mode: DisplayMode::default(),
            rendering: RenderingParams::default(),
            background,
            overlays: Vec::new(),
            hovered: None,
            activity_plane: (DVec3::ZERO, DVec3::Z),
            rotation_anchor: None,
            viewport: egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0)),
            scene_version: 0,
            export_request: None,
            repaint_requested: false,
        }
    }

    // ── Viewport ─────────────────────────────────────────────

    /// Update the widget rectangle used for ray casting and projection
    pub fn set_viewport(&mut self, rect: egui::Rect) {
        self.viewport = rect;
    }

    pub fn viewport(&self) -> egui::Rect {
        self.viewport
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_deflection(&mut self, deflection: DeflectionParams) {
        self.deflection = deflection;
    }

    // ── Display ─────────────────────────────────────────────

    /// Display an entity, auto-wrapping raw geometry into the minimal
    /// shape. Returns the created object ids (one per entity).
    pub fn display_shape(
        &mut self,
        item: Displayable,
        attrs: DisplayAttributes,
        update: bool,
    ) -> Result<Vec<ObjectId>> {
        let object = DisplayObject::build(item, attrs, &self.palette, &self.deflection)?;
        let id = object.id.clone();
        tracing::debug!(id = %id, kind = ?object.shape.kind(), "display shape");
        self.objects.push(object);
        self.scene_version += 1;
        if update {
            self.fit_all();
        }
        self.request_repaint();
        Ok(vec![id])
    }

    /// Display with an explicit color request
    pub fn display_colored_shape(
        &mut self,
        item: Displayable,
        color: ColorSpec,
        update: bool,
    ) -> Result<Vec<ObjectId>> {
        // Resolve eagerly so a bad name fails before anything is shown
        self.palette.resolve(&color)?;
        self.display_shape(item, DisplayAttributes::default().with_color(color), update)
    }

    /// Remove every displayed object and clear the selection
    pub fn erase_all(&mut self) {
        self.objects.clear();
        self.selection.clear();
        self.hovered = None;
        self.scene_version += 1;
        self.request_repaint();
    }

    pub fn objects(&self) -> &[DisplayObject] {
        &self.objects
    }

    pub fn object(&self, id: &str) -> Option<&DisplayObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Show or hide one object. Returns false for an unknown id.
    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        match self.objects.iter_mut().find(|o| o.id == id) {
            Some(obj) => {
                if obj.visible != visible {
                    obj.visible = visible;
                    self.scene_version += 1;
                    self.request_repaint();
                }
                true
            }
            None => false,
        }
    }

    /// Version counter the renderer uses to re-sync GPU buffers
    pub fn scene_version(&self) -> u64 {
        self.scene_version
    }

    /// Bounding box over all visible objects
    pub fn scene_aabb(&self) -> Option<Aabb> {
        self.objects
            .iter()
            .filter(|o| o.visible)
            .filter_map(|o| o.aabb)
            .reduce(|a, b| a.union(&b))
    }

    // ── Overlays ─────────────────────────────────────────────

    pub fn register_overlay(&mut self, item: OverlayItem) {
        self.overlays.push(item);
        self.request_repaint();
    }

    /// Annotate a world position with text
    pub fn display_message(
        &mut self,
        position: Point3,
        text: impl Into<String>,
        height: f32,
        color: ColorSpec,
    ) -> Result<()> {
        let color = self.palette.resolve(&color)?;
        self.register_overlay(OverlayItem::Text {
            position,
            text: text.into(),
            height,
            color,
        });
        Ok(())
    }

    /// Draw a vector as an arrow overlay
    pub fn display_vector(&mut self, origin: Point3, direction: Vec3d, color: ColorSpec) -> Result<()> {
        let color = self.palette.resolve(&color)?;
        self.register_overlay(OverlayItem::Vector { origin, direction, color });
        Ok(())
    }

    pub fn overlays(&self) -> &[OverlayItem] {
        &self.overlays
    }

    pub fn clear_overlays(&mut self) {
        self.overlays.clear();
        self.request_repaint();
    }

    /// Show the origin triedron
    pub fn show_triedron(&mut self) {
        self.settings.axes.visible = true;
        self.request_repaint();
    }

    /// Hide the origin triedron
    pub fn hide_triedron(&mut self) {
        self.settings.axes.visible = false;
        self.request_repaint();
    }

    // ── Orientation and projection ───────────────────────────

    pub fn view_top(&mut self) {
        self.orient(ViewOrientation::Top)
    }

    pub fn view_bottom(&mut self) {
        self.orient(ViewOrientation::Bottom)
    }

    pub fn view_left(&mut self) {
        self.orient(ViewOrientation::Left)
    }

    pub fn view_right(&mut self) {
        self.orient(ViewOrientation::Right)
    }

    pub fn view_front(&mut self) {
        self.orient(ViewOrientation::Front)
    }

    pub fn view_rear(&mut self) {
        self.orient(ViewOrientation::Rear)
    }

    pub fn view_iso(&mut self) {
        self.orient(ViewOrientation::Iso)
    }

    fn orient(&mut self, orientation: ViewOrientation) {
        self.camera.set_orientation(orientation);
        self.request_repaint();
    }

    pub fn reset_view(&mut self) {
        self.camera = ArcBallCamera::new();
        self.request_repaint();
    }

    pub fn set_orthographic(&mut self) {
        self.camera.projection = Projection::Orthographic;
        self.request_repaint();
    }

    pub fn set_perspective(&mut self) {
        self.camera.projection = Projection::Perspective;
        self.request_repaint();
    }

    /// Frame all visible objects and repaint
    pub fn fit_all(&mut self) {
        if let Some(aabb) = self.scene_aabb() {
            self.camera.fit(&aabb);
        }
        self.request_repaint();
    }

    // ── Camera motion ────────────────────────────────────────

    /// Anchor an interactive rotation at a pointer position
    pub fn start_rotation(&mut self, pos: egui::Pos2) {
        self.rotation_anchor = Some(pos);
    }

    /// Continue a rotation: applies the delta from the last anchor
    pub fn rotation(&mut self, pos: egui::Pos2) {
        if let Some(anchor) = self.rotation_anchor {
            let delta = pos - anchor;
            self.camera.rotate(delta.x * 0.5, delta.y * 0.5);
        }
        self.rotation_anchor = Some(pos);
        self.request_repaint();
    }

    /// Zoom driven by horizontal pointer movement
    pub fn dynamic_zoom(&mut self, from: egui::Pos2, to: egui::Pos2) {
        self.camera.zoom((to.x - from.x) * 0.01);
        self.request_repaint();
    }

    /// Apply an absolute zoom factor: >1 moves closer
    pub fn zoom_factor(&mut self, factor: f32) {
        if factor > 0.0 {
            self.camera.zoom(1.0 - 1.0 / factor);
            self.request_repaint();
        }
    }

    /// Wheel zoom, anchored at the cursor when configured
    pub fn zoom_at_point(&mut self, pos: egui::Pos2, scroll_delta: f32) {
        let delta = scroll_delta * self.settings.zoom_speed;
        if self.settings.zoom_at_cursor {
            self.camera.zoom_at(pos, self.viewport, delta);
        } else {
            self.camera.zoom(delta);
        }
        self.request_repaint();
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.camera.pan(dx * 0.01, dy * 0.01);
        self.request_repaint();
    }

    /// Fit the view to a screen rectangle
    pub fn zoom_area(&mut self, min: egui::Pos2, max: egui::Pos2) {
        let rect = egui::Rect::from_two_pos(min, max);
        if rect.width() < 2.0 || rect.height() < 2.0 {
            return;
        }
        // Recenter on the rectangle center at target depth, then scale
        // the distance by the rectangle/viewport ratio.
        let forward = (self.camera.target - self.camera.eye_position()).normalize_or_zero();
        let ray = self.camera.screen_ray(rect.center(), self.viewport);
        let denom = ray.direction.dot(forward);
        if denom.abs() > 1e-6 {
            let t = (self.camera.target - ray.origin).dot(forward) / denom;
            self.camera.target = ray.origin + ray.direction * t;
        }
        let scale = (rect.width() / self.viewport.width())
            .max(rect.height() / self.viewport.height());
        self.camera.zoom(1.0 - scale);
        self.request_repaint();
    }

    // ── Display modes and rendering parameters ───────────────

    pub fn set_mode_wireframe(&mut self) {
        self.display_mode = DisplayMode::Wireframe;
        self.request_repaint();
    }

    pub fn set_mode_shaded(&mut self) {
        self.display_mode = DisplayMode::Shaded;
        self.request_repaint();
    }

    pub fn set_mode_hidden_line(&mut self) {
        self.display_mode = DisplayMode::HiddenLine;
        self.request_repaint();
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn set_rendering_params(&mut self, params: RenderingParams) {
        self.rendering = params;
        self.request_repaint();
    }

    pub fn rendering_params(&self) -> RenderingParams {
        self.rendering
    }

    /// Reset to plain rasterization with default parameters
    pub fn set_rasterization_mode(&mut self) {
        let msaa = self.rendering.msaa_samples;
        self.rendering = RenderingParams { msaa_samples: msaa, ..Default::default() };
        self.request_repaint();
    }

    /// Switch to ray-traced rendering parameters at the given depth
    pub fn set_raytracing_mode(&mut self, depth: u32) {
        self.rendering = RenderingParams {
            method: RenderMethod::RayTracing,
            raytracing_depth: depth,
            shadows: true,
            reflections: true,
            antialiasing: true,
            transparent_shadows: true,
            msaa_samples: self.rendering.msaa_samples.max(4),
        };
        self.request_repaint();
    }

    pub fn enable_antialiasing(&mut self) {
        self.rendering.antialiasing = true;
        self.rendering.msaa_samples = 4;
        self.request_repaint();
    }

    pub fn disable_antialiasing(&mut self) {
        self.rendering.antialiasing = false;
        self.rendering.msaa_samples = 0;
        self.request_repaint();
    }

    // ── Background and export ────────────────────────────────

    pub fn set_background_color(&mut self, color: ColorSpec) -> Result<()> {
        let color = self.palette.resolve(&color)?;
        self.background = Background::Solid(color);
        self.request_repaint();
        Ok(())
    }

    pub fn set_bg_gradient(
        &mut self,
        first: ColorSpec,
        second: ColorSpec,
        fill: GradientFill,
    ) -> Result<()> {
        let first = self.palette.resolve(&first)?;
        let second = self.palette.resolve(&second)?;
        self.background = Background::Gradient { first, second, fill };
        self.request_repaint();
        Ok(())
    }

    /// Use an image file as the background; the file must exist
    pub fn set_background_image(&mut self, path: impl AsRef<Path>, stretch: bool) -> Result<()> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ViewerError::MissingBackgroundImage(path.to_path_buf()));
        }
        self.background = Background::Image { path: path.to_path_buf(), stretch };
        self.request_repaint();
        Ok(())
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Queue a framebuffer dump to `path` on the next painted frame.
    /// The format is inferred from the file extension.
    pub fn export_image(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        if image::ImageFormat::from_path(&path).is_err() {
            return Err(ViewerError::UnsupportedImageFormat(path));
        }
        self.export_request = Some(path);
        self.request_repaint();
        Ok(())
    }

    pub fn take_export_request(&mut self) -> Option<PathBuf> {
        self.export_request.take()
    }

    pub fn request_repaint(&mut self) {
        self.repaint_requested = true;
    }

    pub fn take_repaint_request(&mut self) -> bool {
        std::mem::take(&mut self.repaint_requested)
    }

    // ── Selection granularity ────────────────────────────────

    pub fn set_selection_mode_vertex(&mut self) {
        self.selection.set_granularity(Granularity::Vertex);
    }

    pub fn set_selection_mode_edge(&mut self) {
        self.selection.set_granularity(Granularity::Edge);
    }

    pub fn set_selection_mode_face(&mut self) {
        self.selection.set_granularity(Granularity::Face);
    }

    pub fn set_selection_mode_solid(&mut self) {
        self.selection.set_granularity(Granularity::Solid);
    }

    pub fn set_selection_mode_neutral(&mut self) {
        self.selection.set_neutral();
    }

    /// Advance the vertex → edge → face → solid activation cycle
    pub fn cycle_selection_granularity(&mut self) -> Granularity {
        let g = self.selection.cycle_granularity();
        tracing::debug!(granularity = ?g, "selection granularity");
        g
    }

    /// Toggle solid-only picking; arming requires a non-empty selection
    pub fn toggle_solid_only(&mut self) {
        self.selection.toggle_solid_only();
    }

    pub fn selection_state(&self) -> &SelectionState {
        &self.selection
    }

    // ── Selection operations ─────────────────────────────────

    /// Replace the selection with whatever lies under the point
    pub fn select_at(&mut self, x: f32, y: f32) {
        let hit = self.pick_at(egui::pos2(x, y));
        self.selection.set_single(hit);
        self.request_repaint();
        self.notify_selection(SelectionOrigin::Point { x, y });
    }

    /// Toggle whatever lies under the point in or out of the selection
    pub fn shift_select_at(&mut self, x: f32, y: f32) {
        if let Some(item) = self.pick_at(egui::pos2(x, y)) {
            self.selection.toggle(item);
        }
        self.request_repaint();
        self.notify_selection(SelectionOrigin::Point { x, y });
    }

    /// Select all entities fully inside the rectangle
    pub fn select_in_rect(&mut self, min: egui::Pos2, max: egui::Pos2) {
        let sel = egui::Rect::from_two_pos(min, max);
        let granularity = self
            .selection
            .active_granularities()
            .first()
            .copied()
            .unwrap_or(Granularity::Solid);

        let mut items = Vec::new();
        for obj in self.objects.iter().filter(|o| o.visible) {
            for part in
                picking::parts_in_rect(&self.camera, self.viewport, sel, &obj.tess, granularity)
            {
                items.push(PickedItem { object_id: obj.id.clone(), part });
            }
        }
        self.selection.set_items(items);
        self.request_repaint();
        self.notify_selection(SelectionOrigin::Area {
            min: [sel.min.x, sel.min.y],
            max: [sel.max.x, sel.max.y],
        });
    }

    /// Move the pre-selection highlight to the object under the pointer
    pub fn hover_at(&mut self, x: f32, y: f32) {
        let hovered = self
            .pick_at(egui::pos2(x, y))
            .map(|item| item.object_id);
        if hovered != self.hovered {
            self.hovered = hovered;
            self.request_repaint();
        }
    }

    pub fn hovered(&self) -> Option<&ObjectId> {
        self.hovered.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.request_repaint();
    }

    /// Current selection snapshot, in pick order
    pub fn selected(&self) -> &[PickedItem] {
        self.selection.items()
    }

    /// Resolve the selection to topological shapes
    pub fn selected_shapes(&self) -> Vec<Shape> {
        self.selection
            .items()
            .iter()
            .filter_map(|item| self.picked_shape(item))
            .collect()
    }

    /// Resolve one picked item to its topological shape
    pub fn picked_shape(&self, item: &PickedItem) -> Option<Shape> {
        let obj = self.object(&item.object_id)?;
        match item.part {
            PickedPart::Whole => Some(obj.shape.clone()),
            PickedPart::Vertex(i) => obj.shape.vertices().get(i).cloned().map(Shape::Vertex),
            PickedPart::Edge(i) => obj.shape.edges().get(i).cloned().map(Shape::Edge),
            PickedPart::Face(i) => obj.shape.faces().get(i).cloned().map(Shape::Face),
        }
    }

    /// Selection grouped per object, for highlight rendering
    pub fn selection_by_object(&self) -> HashMap<ObjectId, SelectedParts> {
        let mut map: HashMap<ObjectId, SelectedParts> = HashMap::new();
        for item in self.selection.items() {
            let entry = map.entry(item.object_id.clone()).or_default();
            match item.part {
                PickedPart::Whole => entry.whole = true,
                PickedPart::Vertex(i) => entry.vertices.push(i),
                PickedPart::Edge(i) => entry.edges.push(i),
                PickedPart::Face(i) => entry.faces.push(i),
            }
        }
        map
    }

    fn pick_at(&self, pos: egui::Pos2) -> Option<PickedItem> {
        let granularities = self.selection.active_granularities();
        if granularities.is_empty() {
            return None;
        }

        let mut best: Option<(PickedItem, f32)> = None;
        for obj in self.objects.iter().filter(|o| o.visible) {
            let Some(hit) =
                picking::pick_part(&self.camera, self.viewport, pos, &obj.tess, granularities)
            else {
                continue;
            };
            if best.as_ref().is_none_or(|(_, d)| hit.eye_distance < *d) {
                best = Some((
                    PickedItem { object_id: obj.id.clone(), part: hit.part },
                    hit.eye_distance,
                ));
            }
        }
        best.map(|(item, _)| item)
    }

    fn notify_selection(&mut self, origin: SelectionOrigin) {
        let event = SelectionEvent {
            selection: self.selection.items().to_vec(),
            origin,
        };
        self.listeners.notify(&event);
    }

    // ── Listeners ────────────────────────────────────────────

    pub fn add_selection_listener(&mut self, listener: Box<dyn SelectionListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_selection_listener(&mut self, id: ListenerId) -> Result<()> {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // ── Pointer-to-3D conversion ─────────────────────────────

    /// Plane used by `screen_to_plane`, default XY at the origin
    pub fn set_activity_plane(&mut self, origin: Point3, normal: Vec3d) {
        self.activity_plane = (origin.to_dvec(), normal.to_dvec().normalize_or_zero());
    }

    /// Convert a pointer position to a 3D point on the activity plane.
    /// A failed conversion is logged and degrades to the plane origin so
    /// hover updates never interrupt interaction.
    pub fn screen_to_plane(&self, x: f32, y: f32) -> DVec3 {
        let (origin, normal) = self.activity_plane;
        let ray = self.camera.screen_ray(egui::pos2(x, y), self.viewport);
        let ro = ray.origin.as_dvec3();
        let rd = ray.direction.as_dvec3();

        let denom = rd.dot(normal);
        if denom.abs() < 1e-9 {
            tracing::error!("pointer ray is parallel to the activity plane");
            return origin;
        }
        let t = (origin - ro).dot(normal) / denom;
        let p = ro + rd * t;

        if self.settings.grid_snap > 0.0 {
            return self.snap_to_grid(p);
        }
        p
    }

    fn snap_to_grid(&self, p: DVec3) -> DVec3 {
        let step = self.settings.grid.size as f64;
        if step <= 0.0 {
            return p;
        }
        let snap = |c: f64| {
            let snapped = (c / step).round() * step;
            if (c - snapped).abs() < self.settings.grid_snap {
                snapped
            } else {
                c
            }
        };
        DVec3::new(snap(p.x), snap(p.y), snap(p.z))
    }
}

impl Default for Viewer3d {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use shared::primitives;

    use super::*;

    fn viewer_with_box() -> (Viewer3d, ObjectId) {
        let mut v = Viewer3d::new();
        v.view_front();
        v.camera.distance = 10.0;
        let ids = v
            .display_shape(
                Displayable::Shape(primitives::box_solid(2.0, 2.0, 2.0)),
                DisplayAttributes::default(),
                false,
            )
            .unwrap();
        (v, ids[0].clone())
    }

    #[test]
    fn test_display_returns_one_handle_per_entity() {
        let mut v = Viewer3d::new();
        let ids = v
            .display_shape(
                Displayable::Point(Point3::new(0.0, 0.0, 0.0)),
                DisplayAttributes::default(),
                false,
            )
            .unwrap();
        assert_eq!(ids.len(), 1);
        let obj = v.object(&ids[0]).unwrap();
        assert_eq!(obj.tess.vertices.len(), 1);
    }

    #[test]
    fn test_colored_display_rejects_unknown_name() {
        let mut v = Viewer3d::new();
        let result = v.display_colored_shape(
            Displayable::Point(Point3::ORIGIN),
            ColorSpec::Named("burgundy".into()),
            false,
        );
        assert!(result.is_err());
        assert!(v.objects().is_empty());
    }

    #[test]
    fn test_select_at_center_picks_box() {
        let (mut v, id) = viewer_with_box();
        let c = v.viewport().center();
        v.select_at(c.x, c.y);
        assert_eq!(v.selected().len(), 1);
        assert_eq!(v.selected()[0].object_id, id);

        // Clicking empty space clears
        v.select_at(1.0, 1.0);
        assert!(v.selected().is_empty());
    }

    #[test]
    fn test_shift_select_accumulates() {
        let mut v = Viewer3d::new();
        v.view_front();
        v.camera.distance = 14.0;
        let a = v
            .display_shape(
                Displayable::Point(Point3::new(-2.0, 0.0, 0.0)),
                DisplayAttributes::default(),
                false,
            )
            .unwrap();
        let b = v
            .display_shape(
                Displayable::Point(Point3::new(2.0, 0.0, 0.0)),
                DisplayAttributes::default(),
                false,
            )
            .unwrap();

        let pa = v.camera.project([-2.0, 0.0, 0.0], v.viewport()).unwrap();
        let pb = v.camera.project([2.0, 0.0, 0.0], v.viewport()).unwrap();

        v.select_at(pa.x, pa.y);
        v.shift_select_at(pb.x, pb.y);
        assert_eq!(v.selected().len(), 2);
        assert_eq!(v.selected()[0].object_id, a[0]);
        assert_eq!(v.selected()[1].object_id, b[0]);

        // Shift-clicking the first again removes it
        v.shift_select_at(pa.x, pa.y);
        assert_eq!(v.selected().len(), 1);
        assert_eq!(v.selected()[0].object_id, b[0]);
    }

    #[test]
    fn test_listeners_receive_selection_and_coordinates() {
        use std::sync::{Arc, Mutex};

        let (mut v, _) = viewer_with_box();
        let events: Arc<Mutex<Vec<SelectionEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        v.add_selection_listener(Box::new(move |e: &SelectionEvent| {
            sink.lock().unwrap().push(e.clone());
        }));

        let c = v.viewport().center();
        v.select_at(c.x, c.y);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].selection.len(), 1);
        assert_eq!(events[0].origin, SelectionOrigin::Point { x: c.x, y: c.y });
    }

    #[test]
    fn test_remove_listener_twice_errors() {
        let mut v = Viewer3d::new();
        let id = v.add_selection_listener(Box::new(|_: &SelectionEvent| {}));
        v.remove_selection_listener(id).unwrap();
        assert!(v.remove_selection_listener(id).is_err());
    }

    #[test]
    fn test_erase_all_clears_scene_and_selection() {
        let (mut v, _) = viewer_with_box();
        let c = v.viewport().center();
        v.select_at(c.x, c.y);
        assert!(!v.selected().is_empty());

        let version = v.scene_version();
        v.erase_all();
        assert!(v.objects().is_empty());
        assert!(v.selected().is_empty());
        assert!(v.scene_version() > version);
    }

    #[test]
    fn test_raytracing_mode_sets_full_parameter_set() {
        let mut v = Viewer3d::new();
        v.set_raytracing_mode(5);
        let p = v.rendering_params();
        assert_eq!(p.method, RenderMethod::RayTracing);
        assert_eq!(p.raytracing_depth, 5);
        assert!(p.shadows && p.reflections && p.antialiasing && p.transparent_shadows);

        v.set_rasterization_mode();
        assert_eq!(v.rendering_params().method, RenderMethod::Rasterization);
    }

    #[test]
    fn test_antialiasing_toggles_msaa() {
        let mut v = Viewer3d::new();
        v.enable_antialiasing();
        assert_eq!(v.rendering_params().msaa_samples, 4);
        v.disable_antialiasing();
        assert_eq!(v.rendering_params().msaa_samples, 0);
    }

    #[test]
    fn test_background_image_requires_existing_file() {
        let mut v = Viewer3d::new();
        let result = v.set_background_image("/definitely/not/here.png", true);
        assert!(matches!(result, Err(ViewerError::MissingBackgroundImage(_))));
    }

    #[test]
    fn test_export_rejects_unknown_extension() {
        let mut v = Viewer3d::new();
        assert!(matches!(
            v.export_image("/tmp/frame.xyz123"),
            Err(ViewerError::UnsupportedImageFormat(_))
        ));
        assert!(v.take_export_request().is_none());

        v.export_image("/tmp/frame.png").unwrap();
        assert!(v.take_export_request().is_some());
    }

    #[test]
    fn test_screen_to_plane_center_hits_origin() {
        let mut v = Viewer3d::new();
        v.view_front();
        // Looking down -Z at the XY activity plane through the origin
        let c = v.viewport().center();
        let p = v.screen_to_plane(c.x, c.y);
        assert!(p.length() < 1e-3, "expected origin, got {p:?}");
    }

    #[test]
    fn test_screen_to_plane_degrades_when_parallel() {
        let mut v = Viewer3d::new();
        v.view_front();
        // Plane parallel to the view direction
        v.set_activity_plane(Point3::new(5.0, 0.0, 0.0), Vec3d::new(0.0, 1.0, 0.0));
        v.camera.pitch = 0.0;
        let c = v.viewport().center();
        let p = v.screen_to_plane(c.x, c.y);
        assert_eq!(p, DVec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_grid_snap_rounds_nearby_coordinates() {
        let mut v = Viewer3d::new();
        v.settings.grid_snap = 0.2;
        v.settings.grid.size = 1.0;
        let p = v.snap_to_grid(DVec3::new(0.9, 2.05, -0.5));
        assert_eq!(p, DVec3::new(1.0, 2.0, -0.5));
    }

    #[test]
    fn test_hover_tracks_object_under_cursor() {
        let (mut v, id) = viewer_with_box();
        let c = v.viewport().center();
        v.hover_at(c.x, c.y);
        assert_eq!(v.hovered(), Some(&id));
        v.hover_at(1.0, 1.0);
        assert!(v.hovered().is_none());
    }
}
