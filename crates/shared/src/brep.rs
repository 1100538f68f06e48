//! Boundary-representation topology: shapes described by their vertices,
//! edges, faces and shells.

use serde::{Deserialize, Serialize};

use crate::geometry::{Curve, Point3, Surface};

/// Topological vertex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub point: Point3,
}

/// Topological edge: a bounded curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub curve: Curve,
}

/// Topological face: a bounded surface patch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub surface: Surface,
}

/// A connected set of faces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shell {
    pub faces: Vec<Face>,
}

/// A closed region of space. Carries its boundary explicitly so that
/// sub-shape enumeration does not depend on shared-topology bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    pub shell: Shell,
    pub edges: Vec<Edge>,
    pub vertices: Vec<Vertex>,
}

/// Any displayable topological shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Vertex(Vertex),
    Edge(Edge),
    Face(Face),
    Shell(Shell),
    Solid(Solid),
    Compound(Vec<Shape>),
}

/// Shape classification, used for selection granularity and dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Vertex,
    Edge,
    Face,
    Shell,
    Solid,
    Compound,
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Vertex(_) => ShapeKind::Vertex,
            Shape::Edge(_) => ShapeKind::Edge,
            Shape::Face(_) => ShapeKind::Face,
            Shape::Shell(_) => ShapeKind::Shell,
            Shape::Solid(_) => ShapeKind::Solid,
            Shape::Compound(_) => ShapeKind::Compound,
        }
    }

    /// All topological vertices of the shape, in deterministic order.
    /// Edge endpoints count as vertices for open curves.
    pub fn vertices(&self) -> Vec<Vertex> {
        match self {
            Shape::Vertex(v) => vec![v.clone()],
            Shape::Edge(e) => {
                if e.curve.is_closed() {
                    Vec::new()
                } else {
                    vec![
                        Vertex { point: Point3::from_dvec(e.curve.start_point()) },
                        Vertex { point: Point3::from_dvec(e.curve.end_point()) },
                    ]
                }
            }
            Shape::Face(_) | Shape::Shell(_) => Vec::new(),
            Shape::Solid(s) => s.vertices.clone(),
            Shape::Compound(shapes) => shapes.iter().flat_map(|s| s.vertices()).collect(),
        }
    }

    /// All topological edges of the shape, in deterministic order.
    /// A lone face contributes its natural boundary curves.
    pub fn edges(&self) -> Vec<Edge> {
        match self {
            Shape::Vertex(_) => Vec::new(),
            Shape::Edge(e) => vec![e.clone()],
            Shape::Face(f) => f
                .surface
                .boundary_curves()
                .into_iter()
                .map(|curve| Edge { curve })
                .collect(),
            Shape::Shell(s) => s
                .faces
                .iter()
                .flat_map(|f| f.surface.boundary_curves())
                .map(|curve| Edge { curve })
                .collect(),
            Shape::Solid(s) => s.edges.clone(),
            Shape::Compound(shapes) => shapes.iter().flat_map(|s| s.edges()).collect(),
        }
    }

    /// All faces of the shape, in deterministic order
    pub fn faces(&self) -> Vec<Face> {
        match self {
            Shape::Vertex(_) | Shape::Edge(_) => Vec::new(),
            Shape::Face(f) => vec![f.clone()],
            Shape::Shell(s) => s.faces.clone(),
            Shape::Solid(s) => s.shell.faces.clone(),
            Shape::Compound(shapes) => shapes.iter().flat_map(|s| s.faces()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3d;

    fn unit_face() -> Face {
        Face {
            surface: Surface::Plane {
                origin: Point3::ORIGIN,
                u_dir: Vec3d::new(1.0, 0.0, 0.0),
                v_dir: Vec3d::new(0.0, 1.0, 0.0),
                u_min: 0.0,
                u_max: 1.0,
                v_min: 0.0,
                v_max: 1.0,
            },
        }
    }

    #[test]
    fn test_vertex_shape_has_one_vertex() {
        let s = Shape::Vertex(Vertex { point: Point3::new(1.0, 2.0, 3.0) });
        assert_eq!(s.kind(), ShapeKind::Vertex);
        assert_eq!(s.vertices().len(), 1);
        assert!(s.edges().is_empty());
        assert!(s.faces().is_empty());
    }

    #[test]
    fn test_open_edge_has_endpoint_vertices() {
        let s = Shape::Edge(Edge {
            curve: Curve::Segment {
                start: Point3::ORIGIN,
                end: Point3::new(1.0, 0.0, 0.0),
            },
        });
        assert_eq!(s.vertices().len(), 2);
        assert_eq!(s.edges().len(), 1);
    }

    #[test]
    fn test_closed_edge_has_no_vertices() {
        let s = Shape::Edge(Edge {
            curve: Curve::Circle {
                center: Point3::ORIGIN,
                normal: Vec3d::Z,
                radius: 1.0,
            },
        });
        assert!(s.vertices().is_empty());
    }

    #[test]
    fn test_face_contributes_boundary_edges() {
        let s = Shape::Face(unit_face());
        assert_eq!(s.faces().len(), 1);
        assert_eq!(s.edges().len(), 4);
    }

    #[test]
    fn test_compound_flattens_children() {
        let s = Shape::Compound(vec![
            Shape::Vertex(Vertex { point: Point3::ORIGIN }),
            Shape::Face(unit_face()),
        ]);
        assert_eq!(s.vertices().len(), 1);
        assert_eq!(s.faces().len(), 1);
        assert_eq!(s.edges().len(), 4);
    }
}
