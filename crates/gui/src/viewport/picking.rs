use glam::Vec3;
use shared::ShapeTessellation;

use super::camera::ArcBallCamera;
use crate::viewer::selection::{Granularity, PickedPart};

/// A ray in world space
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Smallest box containing all points; None for an empty set
    pub fn from_points<I: IntoIterator<Item = [f32; 3]>>(points: I) -> Option<Self> {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        let mut any = false;

        for p in points {
            let v = Vec3::from(p);
            min = min.min(v);
            max = max.max(v);
            any = true;
        }

        any.then_some(Self { min, max })
    }

    /// All tessellation points of a shape: face grids, edge polylines,
    /// vertex markers.
    pub fn from_tessellation(tess: &ShapeTessellation) -> Option<Self> {
        Self::from_points(all_points(tess))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

fn all_points(tess: &ShapeTessellation) -> impl Iterator<Item = [f32; 3]> + '_ {
    tess.faces
        .iter()
        .flat_map(|f| f.positions.iter().copied())
        .chain(tess.edges.iter().flat_map(|e| e.points.iter().copied()))
        .chain(tess.vertices.iter().copied())
}

/// Ray-AABB intersection using the slab method.
/// Returns the distance along the ray to the nearest hit, or None.
pub fn ray_aabb(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let inv_dir = Vec3::new(
        1.0 / ray.direction.x,
        1.0 / ray.direction.y,
        1.0 / ray.direction.z,
    );

    let t1 = (aabb.min.x - ray.origin.x) * inv_dir.x;
    let t2 = (aabb.max.x - ray.origin.x) * inv_dir.x;
    let t3 = (aabb.min.y - ray.origin.y) * inv_dir.y;
    let t4 = (aabb.max.y - ray.origin.y) * inv_dir.y;
    let t5 = (aabb.min.z - ray.origin.z) * inv_dir.z;
    let t6 = (aabb.max.z - ray.origin.z) * inv_dir.z;

    let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
    let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

    if tmax < 0.0 || tmin > tmax {
        return None;
    }

    Some(if tmin < 0.0 { tmax } else { tmin })
}

/// Möller-Trumbore ray-triangle intersection algorithm.
/// Returns the distance along the ray if hit, or None if no intersection.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > EPSILON).then_some(t)
}

/// Screen-space pick tolerance for vertices and edges
pub const PICK_TOLERANCE_PX: f32 = 8.0;

/// A picked sub-entity plus its distance from the eye, used to order
/// candidates across objects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartHit {
    pub part: PickedPart,
    pub eye_distance: f32,
}

/// Hit-test one object at a cursor position. Granularities are tried in
/// the order given; the first level that produces a hit wins.
pub fn pick_part(
    camera: &ArcBallCamera,
    rect: egui::Rect,
    cursor: egui::Pos2,
    tess: &ShapeTessellation,
    granularities: &[Granularity],
) -> Option<PartHit> {
    for &g in granularities {
        let hit = match g {
            Granularity::Vertex => pick_vertex(camera, rect, cursor, tess),
            Granularity::Edge => pick_edge(camera, rect, cursor, tess),
            Granularity::Face => pick_face(camera, rect, cursor, tess),
            Granularity::Solid => pick_whole(camera, rect, cursor, tess),
        };
        if hit.is_some() {
            return hit;
        }
    }
    None
}

fn eye_distance(camera: &ArcBallCamera, p: Vec3) -> f32 {
    (p - camera.eye_position()).length()
}

fn pick_vertex(
    camera: &ArcBallCamera,
    rect: egui::Rect,
    cursor: egui::Pos2,
    tess: &ShapeTessellation,
) -> Option<PartHit> {
    let mut best: Option<(usize, f32, f32)> = None; // (index, px, eye)

    for (i, &p) in tess.vertices.iter().enumerate() {
        let Some(screen) = camera.project(p, rect) else { continue };
        let px = screen.distance(cursor);
        if px > PICK_TOLERANCE_PX {
            continue;
        }
        if best.is_none_or(|(_, bpx, _)| px < bpx) {
            best = Some((i, px, eye_distance(camera, Vec3::from(p))));
        }
    }

    best.map(|(i, _, eye)| PartHit { part: PickedPart::Vertex(i), eye_distance: eye })
}

fn pick_edge(
    camera: &ArcBallCamera,
    rect: egui::Rect,
    cursor: egui::Pos2,
    tess: &ShapeTessellation,
) -> Option<PartHit> {
    let mut best: Option<(usize, f32, f32)> = None;

    for (i, polyline) in tess.edges.iter().enumerate() {
        for pair in polyline.points.windows(2) {
            let (Some(a), Some(b)) =
                (camera.project(pair[0], rect), camera.project(pair[1], rect))
            else {
                continue;
            };
            let (px, t) = point_segment_distance_2d(cursor, a, b);
            if px > PICK_TOLERANCE_PX {
                continue;
            }
            if best.is_none_or(|(_, bpx, _)| px < bpx) {
                let p = Vec3::from(pair[0]).lerp(Vec3::from(pair[1]), t);
                best = Some((i, px, eye_distance(camera, p)));
            }
        }
    }

    best.map(|(i, _, eye)| PartHit { part: PickedPart::Edge(i), eye_distance: eye })
}

fn pick_face(
    camera: &ArcBallCamera,
    rect: egui::Rect,
    cursor: egui::Pos2,
    tess: &ShapeTessellation,
) -> Option<PartHit> {
    let ray = camera.screen_ray(cursor, rect);
    let mut best: Option<(usize, f32)> = None;

    for (i, face) in tess.faces.iter().enumerate() {
        for tri in face.indices.chunks_exact(3) {
            let v0 = Vec3::from(face.positions[tri[0] as usize]);
            let v1 = Vec3::from(face.positions[tri[1] as usize]);
            let v2 = Vec3::from(face.positions[tri[2] as usize]);
            if let Some(t) = ray_triangle_intersect(&ray, v0, v1, v2) {
                if best.is_none_or(|(_, bt)| t < bt) {
                    best = Some((i, t));
                }
            }
        }
    }

    best.map(|(i, t)| PartHit { part: PickedPart::Face(i), eye_distance: t })
}

/// Whole-object pick: surface hit first, then edge or vertex proximity
/// so curve- and point-only objects stay selectable.
fn pick_whole(
    camera: &ArcBallCamera,
    rect: egui::Rect,
    cursor: egui::Pos2,
    tess: &ShapeTessellation,
) -> Option<PartHit> {
    pick_face(camera, rect, cursor, tess)
        .or_else(|| pick_edge(camera, rect, cursor, tess))
        .or_else(|| pick_vertex(camera, rect, cursor, tess))
        .map(|hit| PartHit { part: PickedPart::Whole, eye_distance: hit.eye_distance })
}

/// Distance from a point to a 2D segment, plus the parameter of the
/// closest point along the segment.
fn point_segment_distance_2d(p: egui::Pos2, a: egui::Pos2, b: egui::Pos2) -> (f32, f32) {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq < 1e-12 {
        return (p.distance(a), 0.0);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (p.distance(a + ab * t), t)
}

/// Sub-entities of one object lying entirely inside the selection
/// rectangle at the given granularity.
pub fn parts_in_rect(
    camera: &ArcBallCamera,
    rect: egui::Rect,
    sel: egui::Rect,
    tess: &ShapeTessellation,
    granularity: Granularity,
) -> Vec<PickedPart> {
    let inside = |p: [f32; 3]| {
        camera
            .project(p, rect)
            .is_some_and(|screen| sel.contains(screen))
    };

    match granularity {
        Granularity::Vertex => tess
            .vertices
            .iter()
            .enumerate()
            .filter(|(_, &p)| inside(p))
            .map(|(i, _)| PickedPart::Vertex(i))
            .collect(),
        Granularity::Edge => tess
            .edges
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.points.is_empty() && e.points.iter().all(|&p| inside(p)))
            .map(|(i, _)| PickedPart::Edge(i))
            .collect(),
        Granularity::Face => tess
            .faces
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.positions.is_empty() && f.positions.iter().all(|&p| inside(p)))
            .map(|(i, _)| PickedPart::Face(i))
            .collect(),
        Granularity::Solid => {
            let mut points = all_points(tess).peekable();
            if points.peek().is_some() && points.all(inside) {
                vec![PickedPart::Whole]
            } else {
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{primitives, tessellate, DeflectionParams};

    fn camera_and_rect() -> (ArcBallCamera, egui::Rect) {
        let mut cam = ArcBallCamera::new();
        cam.set_orientation(crate::viewport::camera::ViewOrientation::Front);
        cam.distance = 10.0;
        let rect = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0));
        (cam, rect)
    }

    fn box_tess() -> ShapeTessellation {
        tessellate::tessellate_shape(
            &primitives::box_solid(2.0, 2.0, 2.0),
            &DeflectionParams::default(),
        )
    }

    #[test]
    fn test_ray_aabb_hit_and_miss() {
        let aabb = Aabb { min: Vec3::splat(-1.0), max: Vec3::splat(1.0) };
        let hit = Ray { origin: Vec3::new(0.0, 0.0, 5.0), direction: Vec3::NEG_Z };
        assert!(ray_aabb(&hit, &aabb).is_some());
        let miss = Ray { origin: Vec3::new(5.0, 5.0, 5.0), direction: Vec3::Z };
        assert!(ray_aabb(&miss, &aabb).is_none());
    }

    #[test]
    fn test_ray_triangle_basic() {
        let ray = Ray { origin: Vec3::new(0.25, 0.25, 1.0), direction: Vec3::NEG_Z };
        let t = ray_triangle_intersect(
            &ray,
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        assert!((t.unwrap() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_center_click_hits_box() {
        let (cam, rect) = camera_and_rect();
        let tess = box_tess();
        let hit = pick_part(&cam, rect, rect.center(), &tess, &[Granularity::Solid]);
        assert_eq!(hit.unwrap().part, PickedPart::Whole);
    }

    #[test]
    fn test_corner_click_misses_box() {
        let (cam, rect) = camera_and_rect();
        let tess = box_tess();
        let hit = pick_part(&cam, rect, rect.min, &tess, &[Granularity::Solid]);
        assert!(hit.is_none());
    }

    #[test]
    fn test_face_granularity_resolves_front_face() {
        let (cam, rect) = camera_and_rect();
        let tess = box_tess();
        let hit = pick_part(&cam, rect, rect.center(), &tess, &[Granularity::Face]).unwrap();
        let PickedPart::Face(i) = hit.part else {
            panic!("expected face hit, got {:?}", hit.part)
        };
        // Looking down -Z: the nearest face is the +Z plane at z = 1
        let face = &tess.faces[i];
        assert!(face.positions.iter().all(|p| (p[2] - 1.0).abs() < 1e-5));
    }

    #[test]
    fn test_vertex_granularity_picks_projected_corner() {
        let (cam, rect) = camera_and_rect();
        let tess = box_tess();
        let corner = tess
            .vertices
            .iter()
            .position(|&p| p == [1.0, 1.0, 1.0])
            .unwrap();
        let screen = cam.project(tess.vertices[corner], rect).unwrap();
        let hit = pick_part(&cam, rect, screen, &tess, &[Granularity::Vertex]).unwrap();
        let PickedPart::Vertex(i) = hit.part else { panic!() };
        let p = tess.vertices[i];
        assert!((p[0] - 1.0).abs() < 1e-5 && (p[1] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_granularity_priority_vertex_over_face() {
        let (cam, rect) = camera_and_rect();
        let tess = box_tess();
        let screen = cam.project([1.0, 1.0, 1.0], rect).unwrap();
        let hit = pick_part(
            &cam,
            rect,
            screen,
            &tess,
            &[Granularity::Vertex, Granularity::Edge, Granularity::Face],
        )
        .unwrap();
        assert!(matches!(hit.part, PickedPart::Vertex(_)));
    }

    #[test]
    fn test_rect_select_whole_object() {
        let (cam, rect) = camera_and_rect();
        let tess = box_tess();
        let all = parts_in_rect(&cam, rect, rect, &tess, Granularity::Solid);
        assert_eq!(all, vec![PickedPart::Whole]);

        let tiny = egui::Rect::from_min_size(rect.center(), egui::vec2(4.0, 4.0));
        assert!(parts_in_rect(&cam, rect, tiny, &tess, Granularity::Solid).is_empty());
    }

    #[test]
    fn test_rect_select_vertices() {
        let (cam, rect) = camera_and_rect();
        let tess = box_tess();
        let verts = parts_in_rect(&cam, rect, rect, &tess, Granularity::Vertex);
        assert_eq!(verts.len(), 8);
    }
}
