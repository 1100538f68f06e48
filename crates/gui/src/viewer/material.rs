//! Material presets applied to display objects before first render.

use serde::{Deserialize, Serialize};

/// Lighting coefficients consumed by the mesh shader
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialProps {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
}

/// Named material presets. `Matte` is the default: low specular so the
/// object color reads clearly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    #[default]
    Matte,
    Plastic,
    Brass,
    Bronze,
    Steel,
    Aluminium,
    Glass,
}

impl Material {
    pub fn props(self) -> MaterialProps {
        match self {
            Material::Matte => MaterialProps {
                ambient: 0.25,
                diffuse: 0.75,
                specular: 0.05,
                shininess: 8.0,
            },
            Material::Plastic => MaterialProps {
                ambient: 0.2,
                diffuse: 0.7,
                specular: 0.35,
                shininess: 24.0,
            },
            Material::Brass => MaterialProps {
                ambient: 0.33,
                diffuse: 0.78,
                specular: 0.6,
                shininess: 28.0,
            },
            Material::Bronze => MaterialProps {
                ambient: 0.21,
                diffuse: 0.71,
                specular: 0.39,
                shininess: 26.0,
            },
            Material::Steel => MaterialProps {
                ambient: 0.23,
                diffuse: 0.55,
                specular: 0.75,
                shininess: 48.0,
            },
            Material::Aluminium => MaterialProps {
                ambient: 0.3,
                diffuse: 0.6,
                specular: 0.7,
                shininess: 40.0,
            },
            Material::Glass => MaterialProps {
                ambient: 0.1,
                diffuse: 0.4,
                specular: 0.9,
                shininess: 96.0,
            },
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_material_is_matte() {
        assert_eq!(Material::default(), Material::Matte);
        // The default stays below metallic specular levels
        assert!(Material::Matte.props().specular < Material::Steel.props().specular);
    }
}
