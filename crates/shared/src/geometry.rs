//! Geometric primitives: points, directions, parametric curves and surfaces.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A point in 3D model space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const ORIGIN: Point3 = Point3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn to_dvec(self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    pub fn from_dvec(v: DVec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }

    pub fn to_f32(self) -> [f32; 3] {
        [self.x as f32, self.y as f32, self.z as f32]
    }
}

/// A direction/translation vector in 3D model space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3d {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const Z: Vec3d = Vec3d { x: 0.0, y: 0.0, z: 1.0 };

    pub fn to_dvec(self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    pub fn from_dvec(v: DVec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }

    pub fn length(self) -> f64 {
        self.to_dvec().length()
    }
}

/// Build an orthonormal (u, v) basis perpendicular to `normal`.
/// Deterministic: the same normal always yields the same basis.
pub fn plane_basis(normal: DVec3) -> (DVec3, DVec3) {
    let n = normal.normalize_or_zero();
    let pick = if n.z.abs() < 0.9 { DVec3::Z } else { DVec3::X };
    let u = pick.cross(n).normalize_or_zero();
    let v = n.cross(u);
    (u, v)
}

/// A bounded parametric curve, evaluated over t in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Curve {
    Segment {
        start: Point3,
        end: Point3,
    },
    Arc {
        center: Point3,
        normal: Vec3d,
        radius: f64,
        /// Radians, measured in the plane basis of `normal`
        start_angle: f64,
        end_angle: f64,
    },
    Circle {
        center: Point3,
        normal: Vec3d,
        radius: f64,
    },
    Polyline {
        points: Vec<Point3>,
    },
    Bezier {
        control_points: Vec<Point3>,
    },
}

impl Curve {
    /// Evaluate the curve at normalized parameter t in [0, 1]
    pub fn eval(&self, t: f64) -> DVec3 {
        match self {
            Curve::Segment { start, end } => start.to_dvec().lerp(end.to_dvec(), t),
            Curve::Arc { center, normal, radius, start_angle, end_angle } => {
                let angle = start_angle + t * (end_angle - start_angle);
                eval_circular(center.to_dvec(), normal.to_dvec(), *radius, angle)
            }
            Curve::Circle { center, normal, radius } => {
                eval_circular(center.to_dvec(), normal.to_dvec(), *radius, t * std::f64::consts::TAU)
            }
            Curve::Polyline { points } => {
                if points.is_empty() {
                    return DVec3::ZERO;
                }
                if points.len() == 1 {
                    return points[0].to_dvec();
                }
                let scaled = t.clamp(0.0, 1.0) * (points.len() - 1) as f64;
                let i = (scaled.floor() as usize).min(points.len() - 2);
                let frac = scaled - i as f64;
                points[i].to_dvec().lerp(points[i + 1].to_dvec(), frac)
            }
            Curve::Bezier { control_points } => de_casteljau(control_points, t),
        }
    }

    /// Curve start point
    pub fn start_point(&self) -> DVec3 {
        self.eval(0.0)
    }

    /// Curve end point
    pub fn end_point(&self) -> DVec3 {
        self.eval(1.0)
    }

    /// True if the curve forms a closed loop (no distinct endpoints)
    pub fn is_closed(&self) -> bool {
        match self {
            Curve::Circle { .. } => true,
            Curve::Arc { start_angle, end_angle, .. } => {
                ((end_angle - start_angle).abs() - std::f64::consts::TAU).abs() < 1e-9
            }
            _ => self.start_point().distance(self.end_point()) < 1e-12,
        }
    }
}

fn eval_circular(center: DVec3, normal: DVec3, radius: f64, angle: f64) -> DVec3 {
    let (u, v) = plane_basis(normal);
    center + radius * (angle.cos() * u + angle.sin() * v)
}

fn de_casteljau(poles: &[Point3], t: f64) -> DVec3 {
    if poles.is_empty() {
        return DVec3::ZERO;
    }
    let mut pts: Vec<DVec3> = poles.iter().map(|p| p.to_dvec()).collect();
    while pts.len() > 1 {
        for i in 0..pts.len() - 1 {
            pts[i] = pts[i].lerp(pts[i + 1], t);
        }
        pts.pop();
    }
    pts[0]
}

/// A bounded parametric surface patch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Surface {
    /// Planar rectangle: origin + u*u_dir + v*v_dir over the given ranges
    Plane {
        origin: Point3,
        u_dir: Vec3d,
        v_dir: Vec3d,
        u_min: f64,
        u_max: f64,
        v_min: f64,
        v_max: f64,
    },
    /// Lateral cylinder surface swept around `axis`, starting at `base`
    Cylinder {
        base: Point3,
        axis: Vec3d,
        radius: f64,
        height: f64,
        /// Angular sweep in radians (TAU for a full cylinder)
        sweep: f64,
    },
    Sphere {
        center: Point3,
        radius: f64,
    },
    /// Flat disk: u is the angle, v the radial fraction
    Disk {
        center: Point3,
        normal: Vec3d,
        radius: f64,
    },
}

impl Surface {
    /// Evaluate the surface at normalized parameters (u, v) in [0, 1] x [0, 1]
    pub fn eval(&self, u: f64, v: f64) -> DVec3 {
        match self {
            Surface::Plane { origin, u_dir, v_dir, u_min, u_max, v_min, v_max } => {
                let uu = u_min + u * (u_max - u_min);
                let vv = v_min + v * (v_max - v_min);
                origin.to_dvec() + uu * u_dir.to_dvec() + vv * v_dir.to_dvec()
            }
            Surface::Cylinder { base, axis, radius, height, sweep } => {
                let n = axis.to_dvec().normalize_or_zero();
                let (bu, bv) = plane_basis(n);
                let angle = u * sweep;
                base.to_dvec()
                    + *radius * (angle.cos() * bu + angle.sin() * bv)
                    + v * *height * n
            }
            Surface::Sphere { center, radius } => {
                let theta = u * std::f64::consts::TAU;
                let phi = v * std::f64::consts::PI;
                center.to_dvec()
                    + *radius
                        * DVec3::new(
                            phi.sin() * theta.cos(),
                            phi.cos(),
                            phi.sin() * theta.sin(),
                        )
            }
            Surface::Disk { center, normal, radius } => {
                let (bu, bv) = plane_basis(normal.to_dvec());
                let angle = u * std::f64::consts::TAU;
                center.to_dvec() + v * *radius * (angle.cos() * bu + angle.sin() * bv)
            }
        }
    }

    /// Outward surface normal at normalized parameters (u, v)
    pub fn normal(&self, u: f64, v: f64) -> DVec3 {
        match self {
            Surface::Plane { u_dir, v_dir, .. } => {
                u_dir.to_dvec().cross(v_dir.to_dvec()).normalize_or_zero()
            }
            Surface::Cylinder { axis, sweep, .. } => {
                let n = axis.to_dvec().normalize_or_zero();
                let (bu, bv) = plane_basis(n);
                let angle = u * sweep;
                angle.cos() * bu + angle.sin() * bv
            }
            Surface::Sphere { center, .. } => {
                (self.eval(u, v) - center.to_dvec()).normalize_or_zero()
            }
            Surface::Disk { normal, .. } => normal.to_dvec().normalize_or_zero(),
        }
    }

    /// Natural boundary of the patch, as curves. An unbounded direction
    /// (full sweep) contributes no seam edges.
    pub fn boundary_curves(&self) -> Vec<Curve> {
        match self {
            Surface::Plane { .. } => {
                let c = |u, v| Point3::from_dvec(self.eval(u, v));
                vec![
                    Curve::Segment { start: c(0.0, 0.0), end: c(1.0, 0.0) },
                    Curve::Segment { start: c(1.0, 0.0), end: c(1.0, 1.0) },
                    Curve::Segment { start: c(1.0, 1.0), end: c(0.0, 1.0) },
                    Curve::Segment { start: c(0.0, 1.0), end: c(0.0, 0.0) },
                ]
            }
            Surface::Cylinder { base, axis, radius, height, sweep } => {
                let n = axis.to_dvec().normalize_or_zero();
                let top = Point3::from_dvec(base.to_dvec() + *height * n);
                let full = (*sweep - std::f64::consts::TAU).abs() < 1e-9;
                let mut curves = if full {
                    vec![
                        Curve::Circle { center: *base, normal: *axis, radius: *radius },
                        Curve::Circle { center: top, normal: *axis, radius: *radius },
                    ]
                } else {
                    vec![
                        Curve::Arc {
                            center: *base,
                            normal: *axis,
                            radius: *radius,
                            start_angle: 0.0,
                            end_angle: *sweep,
                        },
                        Curve::Arc {
                            center: top,
                            normal: *axis,
                            radius: *radius,
                            start_angle: 0.0,
                            end_angle: *sweep,
                        },
                    ]
                };
                if !full {
                    // Seam edges at the sweep limits
                    for angle in [0.0, *sweep] {
                        let p = eval_circular(base.to_dvec(), n, *radius, angle);
                        curves.push(Curve::Segment {
                            start: Point3::from_dvec(p),
                            end: Point3::from_dvec(p + *height * n),
                        });
                    }
                }
                curves
            }
            Surface::Sphere { .. } => Vec::new(),
            Surface::Disk { center, normal, radius } => vec![Curve::Circle {
                center: *center,
                normal: *normal,
                radius: *radius,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_eval_endpoints() {
        let c = Curve::Segment {
            start: Point3::new(0.0, 0.0, 0.0),
            end: Point3::new(2.0, 0.0, 0.0),
        };
        assert_eq!(c.eval(0.0), DVec3::ZERO);
        assert_eq!(c.eval(1.0), DVec3::new(2.0, 0.0, 0.0));
        assert_eq!(c.eval(0.5), DVec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_circle_is_closed() {
        let c = Curve::Circle {
            center: Point3::ORIGIN,
            normal: Vec3d::Z,
            radius: 1.0,
        };
        assert!(c.is_closed());
        assert!((c.eval(0.0) - c.eval(1.0)).length() < 1e-9);
    }

    #[test]
    fn test_arc_stays_on_radius() {
        let c = Curve::Arc {
            center: Point3::new(1.0, 2.0, 3.0),
            normal: Vec3d::Z,
            radius: 2.5,
            start_angle: 0.3,
            end_angle: 2.1,
        };
        for i in 0..=10 {
            let p = c.eval(i as f64 / 10.0);
            let r = (p - DVec3::new(1.0, 2.0, 3.0)).length();
            assert!((r - 2.5).abs() < 1e-9, "radius drifted to {r}");
        }
    }

    #[test]
    fn test_bezier_interpolates_endpoints() {
        let c = Curve::Bezier {
            control_points: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 2.0, 0.0),
                Point3::new(3.0, 0.0, 0.0),
            ],
        };
        assert!((c.eval(0.0) - DVec3::ZERO).length() < 1e-12);
        assert!((c.eval(1.0) - DVec3::new(3.0, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_plane_eval_corners() {
        let s = Surface::Plane {
            origin: Point3::ORIGIN,
            u_dir: Vec3d::new(1.0, 0.0, 0.0),
            v_dir: Vec3d::new(0.0, 1.0, 0.0),
            u_min: -1.0,
            u_max: 1.0,
            v_min: 0.0,
            v_max: 2.0,
        };
        assert_eq!(s.eval(0.0, 0.0), DVec3::new(-1.0, 0.0, 0.0));
        assert_eq!(s.eval(1.0, 1.0), DVec3::new(1.0, 2.0, 0.0));
        assert_eq!(s.normal(0.5, 0.5), DVec3::Z);
    }

    #[test]
    fn test_sphere_normal_points_outward() {
        let s = Surface::Sphere { center: Point3::ORIGIN, radius: 3.0 };
        let p = s.eval(0.25, 0.5);
        let n = s.normal(0.25, 0.5);
        assert!((p.normalize() - n).length() < 1e-9);
    }

    #[test]
    fn test_plane_boundary_is_four_segments() {
        let s = Surface::Plane {
            origin: Point3::ORIGIN,
            u_dir: Vec3d::new(1.0, 0.0, 0.0),
            v_dir: Vec3d::new(0.0, 1.0, 0.0),
            u_min: 0.0,
            u_max: 1.0,
            v_min: 0.0,
            v_max: 1.0,
        };
        assert_eq!(s.boundary_curves().len(), 4);
    }

    #[test]
    fn test_full_cylinder_boundary_has_no_seam() {
        let s = Surface::Cylinder {
            base: Point3::ORIGIN,
            axis: Vec3d::Z,
            radius: 1.0,
            height: 2.0,
            sweep: std::f64::consts::TAU,
        };
        assert_eq!(s.boundary_curves().len(), 2);
    }
}
