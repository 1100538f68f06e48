//! Display objects: geometry wrapped into renderable, hit-testable form
//! with its display attributes resolved.

use std::path::PathBuf;

use shared::{
    tessellate, ColorSpec, DeflectionParams, Displayable, ObjectId, Shape, ShapeTessellation,
};
use uuid::Uuid;

use super::color::{Color, Palette};
use super::error::Result;
use super::material::Material;
use crate::viewport::mesh::{self, LineMeshData, MeshData};
use crate::viewport::picking::Aabb;

/// Texture mapping request. Coordinates are derived from object-space
/// positions; scale and origin adjust the projection.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureProps {
    pub path: PathBuf,
    pub scale: [f32; 2],
    pub repeat: bool,
    pub origin: [f32; 2],
}

impl TextureProps {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            scale: [1.0, 1.0],
            repeat: true,
            origin: [0.0, 0.0],
        }
    }
}

/// Optional attributes applied to an object before its first render
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayAttributes {
    pub color: Option<ColorSpec>,
    pub material: Option<Material>,
    /// 0 = opaque, 1 = invisible
    pub transparency: Option<f32>,
    pub texture: Option<TextureProps>,
}

impl DisplayAttributes {
    pub fn with_color(mut self, color: ColorSpec) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_transparency(mut self, transparency: f32) -> Self {
        self.transparency = Some(transparency);
        self
    }

    pub fn with_texture(mut self, texture: TextureProps) -> Self {
        self.texture = Some(texture);
        self
    }
}

/// Untinted object color, chosen so shading gradients stay visible
pub const DEFAULT_OBJECT_COLOR: Color = Color::new(0.76, 0.73, 0.65);

const EDGE_COLOR: [f32; 4] = [0.08, 0.08, 0.08, 1.0];

/// A displayed object: source shape, cached tessellation and render
/// buffers, resolved attributes. Owned by the viewer until erased.
pub struct DisplayObject {
    pub id: ObjectId,
    pub shape: Shape,
    pub tess: ShapeTessellation,
    pub aabb: Option<Aabb>,
    pub color: Color,
    pub material: Material,
    pub transparency: f32,
    pub texture: Option<TextureProps>,
    pub visible: bool,
    pub mesh: MeshData,
    pub lines: LineMeshData,
}

impl DisplayObject {
    /// Wrap a displayable entity, resolve its attributes and build the
    /// render buffers. Fails on an unresolvable color.
    pub fn build(
        item: Displayable,
        attrs: DisplayAttributes,
        palette: &Palette,
        deflection: &DeflectionParams,
    ) -> Result<Self> {
        let color = match &attrs.color {
            Some(spec) => palette.resolve(spec)?,
            None => DEFAULT_OBJECT_COLOR,
        };

        let shape = item.into_shape();
        let tess = tessellate::tessellate_shape(&shape, deflection);
        let aabb = Aabb::from_tessellation(&tess);
        let mesh = mesh::mesh_from_tessellation(&tess, color.to_array());
        let lines = mesh::lines_from_tessellation(&tess, EDGE_COLOR);

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            shape,
            tess,
            aabb,
            color,
            material: attrs.material.unwrap_or_default(),
            transparency: attrs.transparency.unwrap_or(0.0).clamp(0.0, 1.0),
            texture: attrs.texture,
            visible: true,
            mesh,
            lines,
        })
    }

    pub fn alpha(&self) -> f32 {
        1.0 - self.transparency
    }
}

#[cfg(test)]
mod tests {
    use shared::{Point3, ShapeKind};

    use super::*;

    #[test]
    fn test_point_builds_single_vertex_object() {
        let obj = DisplayObject::build(
            Displayable::Point(Point3::new(1.0, 2.0, 3.0)),
            DisplayAttributes::default(),
            &Palette::new(),
            &DeflectionParams::default(),
        )
        .unwrap();

        assert_eq!(obj.shape.kind(), ShapeKind::Vertex);
        assert_eq!(obj.tess.vertices.len(), 1);
        assert!(obj.tess.faces.is_empty());
        assert!(obj.aabb.is_some());
    }

    #[test]
    fn test_unknown_color_fails_build() {
        let result = DisplayObject::build(
            Displayable::Point(Point3::ORIGIN),
            DisplayAttributes::default().with_color(ColorSpec::Named("mauve".into())),
            &Palette::new(),
            &DeflectionParams::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_transparency_is_clamped() {
        let obj = DisplayObject::build(
            Displayable::Point(Point3::ORIGIN),
            DisplayAttributes::default().with_transparency(3.0),
            &Palette::new(),
            &DeflectionParams::default(),
        )
        .unwrap();
        assert_eq!(obj.transparency, 1.0);
        assert_eq!(obj.alpha(), 0.0);
    }
}
