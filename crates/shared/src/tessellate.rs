//! Tessellation of curves and surfaces into render-ready buffers.
//!
//! Faceting density is controlled by a chordal-deviation tolerance: the
//! maximum distance between the true geometry and its linear approximation.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::brep::Shape;
use crate::geometry::Curve;
use crate::Surface;

/// Faceting tolerances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeflectionParams {
    /// Maximum chordal deviation in model units
    pub chordal_deviation: f64,
    /// Lower bound on segments per curved span
    pub min_segments: u32,
    /// Upper bound on segments per curved span
    pub max_segments: u32,
}

impl Default for DeflectionParams {
    fn default() -> Self {
        Self {
            chordal_deviation: 0.05,
            min_segments: 8,
            max_segments: 256,
        }
    }
}

impl DeflectionParams {
    /// Segments needed to keep a circular span of `radius` and `sweep`
    /// radians within the chordal deviation.
    pub fn circular_segments(&self, radius: f64, sweep: f64) -> u32 {
        if radius <= 0.0 || sweep <= 0.0 {
            return 1;
        }
        let ratio = (1.0 - self.chordal_deviation / radius).clamp(-1.0, 1.0);
        let max_step = 2.0 * ratio.acos();
        let n = if max_step <= f64::EPSILON {
            self.max_segments
        } else {
            (sweep / max_step).ceil() as u32
        };
        n.clamp(self.min_segments, self.max_segments)
    }
}

/// Triangulated face: positions, per-vertex normals, triangle indices
#[derive(Debug, Clone, Default)]
pub struct FaceMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl FaceMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Polyline approximation of an edge
#[derive(Debug, Clone, Default)]
pub struct Polyline3 {
    pub points: Vec<[f32; 3]>,
}

/// CPU-side tessellation of a whole shape, retaining the topological
/// structure (per-face meshes, per-edge polylines, vertex points) so that
/// sub-shape picking can index into it.
#[derive(Debug, Clone, Default)]
pub struct ShapeTessellation {
    pub faces: Vec<FaceMesh>,
    pub edges: Vec<Polyline3>,
    pub vertices: Vec<[f32; 3]>,
}

impl ShapeTessellation {
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty() && self.edges.is_empty() && self.vertices.is_empty()
    }
}

/// Tessellate a shape into faces, edge polylines and vertex points
pub fn tessellate_shape(shape: &Shape, params: &DeflectionParams) -> ShapeTessellation {
    ShapeTessellation {
        faces: shape
            .faces()
            .iter()
            .map(|f| tessellate_surface(&f.surface, params))
            .collect(),
        edges: shape
            .edges()
            .iter()
            .map(|e| Polyline3 { points: tessellate_curve(&e.curve, params) })
            .collect(),
        vertices: shape.vertices().iter().map(|v| v.point.to_f32()).collect(),
    }
}

/// Flatten a curve into points within the chordal deviation
pub fn tessellate_curve(curve: &Curve, params: &DeflectionParams) -> Vec<[f32; 3]> {
    match curve {
        Curve::Segment { start, end } => vec![start.to_f32(), end.to_f32()],
        Curve::Polyline { points } => points.iter().map(|p| p.to_f32()).collect(),
        Curve::Arc { radius, start_angle, end_angle, .. } => {
            let n = params.circular_segments(*radius, (end_angle - start_angle).abs());
            sample_curve(curve, n)
        }
        Curve::Circle { radius, .. } => {
            let n = params.circular_segments(*radius, std::f64::consts::TAU);
            sample_curve(curve, n)
        }
        Curve::Bezier { control_points } => {
            if control_points.len() < 2 {
                return control_points.iter().map(|p| p.to_f32()).collect();
            }
            let mut out = vec![to_f32(curve.eval(0.0))];
            flatten_recursive(curve, 0.0, 1.0, params.chordal_deviation, 0, &mut out);
            out
        }
    }
}

fn sample_curve(curve: &Curve, segments: u32) -> Vec<[f32; 3]> {
    (0..=segments)
        .map(|i| to_f32(curve.eval(i as f64 / segments as f64)))
        .collect()
}

/// Midpoint-subdivision flattening: split while the midpoint strays from
/// the chord by more than the tolerance.
fn flatten_recursive(
    curve: &Curve,
    t0: f64,
    t1: f64,
    tolerance: f64,
    depth: u32,
    out: &mut Vec<[f32; 3]>,
) {
    let p0 = curve.eval(t0);
    let p1 = curve.eval(t1);
    let tm = 0.5 * (t0 + t1);
    let pm = curve.eval(tm);

    let deviation = point_chord_distance(pm, p0, p1);
    if deviation > tolerance && depth < 16 {
        flatten_recursive(curve, t0, tm, tolerance, depth + 1, out);
        flatten_recursive(curve, tm, t1, tolerance, depth + 1, out);
    } else {
        out.push(to_f32(p1));
    }
}

fn point_chord_distance(p: DVec3, a: DVec3, b: DVec3) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-24 {
        return (p - a).length();
    }
    let t = (p - a).dot(ab) / len_sq;
    (p - (a + t.clamp(0.0, 1.0) * ab)).length()
}

/// Triangulate a surface patch on a parameter grid sized by the deviation
pub fn tessellate_surface(surface: &Surface, params: &DeflectionParams) -> FaceMesh {
    let (nu, nv) = grid_size(surface, params);
    let mut mesh = FaceMesh::default();

    for j in 0..=nv {
        let v = j as f64 / nv as f64;
        for i in 0..=nu {
            let u = i as f64 / nu as f64;
            mesh.positions.push(to_f32(surface.eval(u, v)));
            mesh.normals.push(to_f32(surface.normal(u, v)));
        }
    }

    let row = nu + 1;
    for j in 0..nv {
        for i in 0..nu {
            let i0 = j * row + i;
            let i1 = i0 + 1;
            let i2 = i0 + row;
            let i3 = i2 + 1;
            mesh.indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }

    mesh
}

fn grid_size(surface: &Surface, params: &DeflectionParams) -> (u32, u32) {
    match surface {
        Surface::Plane { .. } => (1, 1),
        Surface::Cylinder { radius, sweep, .. } => {
            (params.circular_segments(*radius, *sweep), 1)
        }
        Surface::Sphere { radius, .. } => {
            let sectors = params.circular_segments(*radius, std::f64::consts::TAU);
            let rings = params.circular_segments(*radius, std::f64::consts::PI);
            (sectors, rings)
        }
        Surface::Disk { radius, .. } => {
            (params.circular_segments(*radius, std::f64::consts::TAU), 1)
        }
    }
}

fn to_f32(v: DVec3) -> [f32; 3] {
    [v.x as f32, v.y as f32, v.z as f32]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point3, Vec3d};
    use crate::primitives;

    #[test]
    fn test_segment_is_exact() {
        let c = Curve::Segment {
            start: Point3::ORIGIN,
            end: Point3::new(1.0, 1.0, 0.0),
        };
        let pts = tessellate_curve(&c, &DeflectionParams::default());
        assert_eq!(pts.len(), 2);
    }

    #[test]
    fn test_circle_meets_deviation() {
        let c = Curve::Circle { center: Point3::ORIGIN, normal: Vec3d::Z, radius: 10.0 };
        let params = DeflectionParams { chordal_deviation: 0.01, ..Default::default() };
        let pts = tessellate_curve(&c, &params);

        // Max sagitta of any chord must stay within tolerance
        for pair in pts.windows(2) {
            let a = DVec3::new(pair[0][0] as f64, pair[0][1] as f64, pair[0][2] as f64);
            let b = DVec3::new(pair[1][0] as f64, pair[1][1] as f64, pair[1][2] as f64);
            let mid = 0.5 * (a + b);
            let sagitta = 10.0 - mid.length();
            assert!(sagitta <= 0.0101, "sagitta {sagitta} exceeds tolerance");
        }
    }

    #[test]
    fn test_tighter_deviation_never_coarsens() {
        let coarse = DeflectionParams { chordal_deviation: 0.5, ..Default::default() };
        let fine = DeflectionParams { chordal_deviation: 0.005, ..Default::default() };
        assert!(
            fine.circular_segments(5.0, std::f64::consts::TAU)
                >= coarse.circular_segments(5.0, std::f64::consts::TAU)
        );
    }

    #[test]
    fn test_bezier_flattening_tracks_tolerance() {
        let c = Curve::Bezier {
            control_points: vec![
                Point3::ORIGIN,
                Point3::new(0.0, 4.0, 0.0),
                Point3::new(4.0, 4.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
            ],
        };
        let coarse = tessellate_curve(&c, &DeflectionParams { chordal_deviation: 1.0, ..Default::default() });
        let fine = tessellate_curve(&c, &DeflectionParams { chordal_deviation: 0.01, ..Default::default() });
        assert!(fine.len() > coarse.len());
        assert_eq!(fine.first(), Some(&[0.0f32, 0.0, 0.0]));
        assert_eq!(fine.last(), Some(&[4.0f32, 0.0, 0.0]));
    }

    #[test]
    fn test_plane_is_two_triangles() {
        let s = Surface::Plane {
            origin: Point3::ORIGIN,
            u_dir: Vec3d::new(1.0, 0.0, 0.0),
            v_dir: Vec3d::new(0.0, 1.0, 0.0),
            u_min: 0.0,
            u_max: 1.0,
            v_min: 0.0,
            v_max: 1.0,
        };
        let mesh = tessellate_surface(&s, &DeflectionParams::default());
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.positions.len(), mesh.normals.len());
    }

    #[test]
    fn test_box_tessellation_structure() {
        let shape = primitives::box_solid(2.0, 2.0, 2.0);
        let tess = tessellate_shape(&shape, &DeflectionParams::default());
        assert_eq!(tess.faces.len(), 6);
        assert_eq!(tess.edges.len(), 12);
        assert_eq!(tess.vertices.len(), 8);
        for face in &tess.faces {
            assert_eq!(face.triangle_count(), 2);
        }
    }
}
