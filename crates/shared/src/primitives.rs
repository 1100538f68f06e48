//! Ready-made solids used by the demo scene and tests.

use crate::brep::{Edge, Face, Shape, Shell, Solid, Vertex};
use crate::geometry::{Curve, Point3, Surface, Vec3d};

/// Axis-aligned box centered at the origin
pub fn box_solid(width: f64, height: f64, depth: f64) -> Shape {
    let hw = width * 0.5;
    let hh = height * 0.5;
    let hd = depth * 0.5;

    // (origin, u_dir, v_dir) per face, with u x v pointing outward
    let plane = |origin: Point3, u: Vec3d, v: Vec3d, u_max: f64, v_max: f64| Face {
        surface: Surface::Plane {
            origin,
            u_dir: u,
            v_dir: v,
            u_min: 0.0,
            u_max,
            v_min: 0.0,
            v_max,
        },
    };

    let x = Vec3d::new(1.0, 0.0, 0.0);
    let y = Vec3d::new(0.0, 1.0, 0.0);
    let z = Vec3d::new(0.0, 0.0, 1.0);
    let nx = Vec3d::new(-1.0, 0.0, 0.0);
    let ny = Vec3d::new(0.0, -1.0, 0.0);
    let nz = Vec3d::new(0.0, 0.0, -1.0);

    let faces = vec![
        // +Z / -Z
        plane(Point3::new(-hw, -hh, hd), x, y, width, height),
        plane(Point3::new(hw, -hh, -hd), nx, y, width, height),
        // +X / -X
        plane(Point3::new(hw, -hh, hd), nz, y, depth, height),
        plane(Point3::new(-hw, -hh, -hd), z, y, depth, height),
        // +Y / -Y
        plane(Point3::new(-hw, hh, hd), x, nz, width, depth),
        plane(Point3::new(-hw, -hh, -hd), x, z, width, depth),
    ];

    let corners = [
        Point3::new(-hw, -hh, -hd),
        Point3::new(hw, -hh, -hd),
        Point3::new(hw, hh, -hd),
        Point3::new(-hw, hh, -hd),
        Point3::new(-hw, -hh, hd),
        Point3::new(hw, -hh, hd),
        Point3::new(hw, hh, hd),
        Point3::new(-hw, hh, hd),
    ];

    // 4 bottom, 4 top, 4 vertical
    let edge_pairs = [
        (0, 1), (1, 2), (2, 3), (3, 0),
        (4, 5), (5, 6), (6, 7), (7, 4),
        (0, 4), (1, 5), (2, 6), (3, 7),
    ];
    let edges = edge_pairs
        .iter()
        .map(|&(a, b)| Edge {
            curve: Curve::Segment { start: corners[a], end: corners[b] },
        })
        .collect();

    Shape::Solid(Solid {
        shell: Shell { faces },
        edges,
        vertices: corners.iter().map(|&point| Vertex { point }).collect(),
    })
}

/// Right circular cylinder, base centered at the origin, axis +Z
pub fn cylinder_solid(radius: f64, height: f64) -> Shape {
    let base = Point3::ORIGIN;
    let top = Point3::new(0.0, 0.0, height);
    let axis = Vec3d::Z;

    let faces = vec![
        Face {
            surface: Surface::Cylinder {
                base,
                axis,
                radius,
                height,
                sweep: std::f64::consts::TAU,
            },
        },
        Face {
            surface: Surface::Disk { center: top, normal: axis, radius },
        },
        Face {
            surface: Surface::Disk {
                center: base,
                normal: Vec3d::new(0.0, 0.0, -1.0),
                radius,
            },
        },
    ];

    let edges = vec![
        Edge { curve: Curve::Circle { center: base, normal: axis, radius } },
        Edge { curve: Curve::Circle { center: top, normal: axis, radius } },
    ];

    Shape::Solid(Solid {
        shell: Shell { faces },
        edges,
        vertices: Vec::new(),
    })
}

/// Sphere centered at the origin
pub fn sphere_solid(radius: f64) -> Shape {
    Shape::Solid(Solid {
        shell: Shell {
            faces: vec![Face {
                surface: Surface::Sphere { center: Point3::ORIGIN, radius },
            }],
        },
        edges: Vec::new(),
        vertices: Vec::new(),
    })
}
