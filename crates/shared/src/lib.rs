//! Shared data model for the shapeview viewer: geometry, boundary
//! representation, tessellation, and the serializable scene description.

pub mod brep;
pub mod geometry;
pub mod primitives;
pub mod tessellate;

pub use brep::{Edge, Face, Shape, ShapeKind, Shell, Solid, Vertex};
pub use geometry::{Curve, Point3, Surface, Vec3d};
pub use tessellate::{DeflectionParams, FaceMesh, Polyline3, ShapeTessellation};

use serde::{Deserialize, Serialize};

/// Unique identifier of a displayed object
pub type ObjectId = String;

/// Anything the viewer can display. Raw geometry is wrapped into the
/// minimal shape able to represent it before display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Displayable {
    Point(Point3),
    Curve(Curve),
    Surface(Surface),
    Shape(Shape),
}

impl Displayable {
    /// Wrap the entity into its minimal shape: point becomes a vertex,
    /// curve an edge, surface a face; shapes pass through unchanged.
    pub fn into_shape(self) -> Shape {
        match self {
            Displayable::Point(point) => Shape::Vertex(Vertex { point }),
            Displayable::Curve(curve) => Shape::Edge(Edge { curve }),
            Displayable::Surface(surface) => Shape::Face(Face { surface }),
            Displayable::Shape(shape) => shape,
        }
    }
}

/// A color request: either a palette name or an RGB triple.
/// Triples are accepted in the 0-255 byte range or the 0-1 unit range;
/// any component above 1 selects the byte interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Named(String),
    Rgb([f64; 3]),
}

/// One object of a scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    pub item: Displayable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparency: Option<f32>,
}

/// Serializable scene description loaded by the viewer binary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub objects: Vec<SceneObject>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_wraps_into_vertex() {
        let shape = Displayable::Point(Point3::new(1.0, 2.0, 3.0)).into_shape();
        assert_eq!(shape.kind(), ShapeKind::Vertex);
        assert_eq!(shape.vertices().len(), 1);
    }

    #[test]
    fn test_curve_wraps_into_edge() {
        let shape = Displayable::Curve(Curve::Segment {
            start: Point3::ORIGIN,
            end: Point3::new(1.0, 0.0, 0.0),
        })
        .into_shape();
        assert_eq!(shape.kind(), ShapeKind::Edge);
    }

    #[test]
    fn test_surface_wraps_into_face() {
        let shape = Displayable::Surface(Surface::Sphere {
            center: Point3::ORIGIN,
            radius: 1.0,
        })
        .into_shape();
        assert_eq!(shape.kind(), ShapeKind::Face);
    }

    #[test]
    fn test_shape_passes_through() {
        let solid = primitives::box_solid(1.0, 1.0, 1.0);
        let shape = Displayable::Shape(solid.clone()).into_shape();
        assert_eq!(shape, solid);
    }

    #[test]
    fn test_scene_description_round_trips() {
        let scene = SceneDescription {
            objects: vec![SceneObject {
                name: "probe".into(),
                item: Displayable::Point(Point3::new(0.0, 1.0, 0.0)),
                color: Some(ColorSpec::Named("red".into())),
                transparency: None,
            }],
        };
        let json = serde_json::to_string(&scene).unwrap();
        let back: SceneDescription = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scene);
    }

    #[test]
    fn test_color_spec_accepts_both_forms() {
        let named: ColorSpec = serde_json::from_str("\"blue\"").unwrap();
        assert_eq!(named, ColorSpec::Named("blue".into()));
        let rgb: ColorSpec = serde_json::from_str("[255.0, 0.0, 0.0]").unwrap();
        assert_eq!(rgb, ColorSpec::Rgb([255.0, 0.0, 0.0]));
    }
}
