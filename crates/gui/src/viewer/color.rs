//! Color resolution: a fixed named palette plus RGB triples in either
//! the 0-255 byte range or the 0-1 unit range.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use shared::ColorSpec;

use super::error::{Result, ViewerError};

/// Linear RGB color with unit-range components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_bytes(rgb: [u8; 3]) -> Self {
        Self::new(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        )
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// The named color palette, built once at startup and passed by reference.
pub struct Palette {
    colors: HashMap<&'static str, Color>,
}

impl Palette {
    pub fn new() -> Self {
        let colors = HashMap::from([
            ("white", Color::new(1.0, 1.0, 1.0)),
            ("blue", Color::new(0.0, 0.0, 1.0)),
            ("red", Color::new(1.0, 0.0, 0.0)),
            ("green", Color::new(0.0, 1.0, 0.0)),
            ("yellow", Color::new(1.0, 1.0, 0.0)),
            ("cyan", Color::new(0.0, 1.0, 1.0)),
            ("black", Color::new(0.0, 0.0, 0.0)),
            ("orange", Color::new(1.0, 0.65, 0.0)),
        ]);
        Self { colors }
    }

    /// Resolve a palette name, case-insensitively
    pub fn resolve_name(&self, name: &str) -> Result<Color> {
        self.colors
            .get(name.to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| ViewerError::UnknownColor(name.to_string()))
    }

    /// Resolve a color request. Triples with any component above 1 are
    /// interpreted as bytes; components must be finite and non-negative.
    pub fn resolve(&self, spec: &ColorSpec) -> Result<Color> {
        match spec {
            ColorSpec::Named(name) => self.resolve_name(name),
            ColorSpec::Rgb(rgb) => {
                for &c in rgb {
                    if !c.is_finite() || c < 0.0 || c > 255.0 {
                        return Err(ViewerError::InvalidColorComponent(c));
                    }
                }
                let byte_range = rgb.iter().any(|&c| c > 1.0);
                let scale = if byte_range { 1.0 / 255.0 } else { 1.0 };
                Ok(Color::new(
                    (rgb[0] * scale) as f32,
                    (rgb[1] * scale) as f32,
                    (rgb[2] * scale) as f32,
                ))
            }
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_palette_names_resolve() {
        let palette = Palette::new();
        for name in ["white", "blue", "red", "green", "yellow", "cyan", "black", "orange"] {
            assert!(palette.resolve_name(name).is_ok(), "{name} missing");
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let palette = Palette::new();
        assert_eq!(
            palette.resolve_name("RED").unwrap(),
            palette.resolve_name("red").unwrap()
        );
    }

    #[test]
    fn test_unknown_name_errors() {
        let palette = Palette::new();
        assert!(matches!(
            palette.resolve_name("chartreuse"),
            Err(ViewerError::UnknownColor(_))
        ));
    }

    #[test]
    fn test_byte_and_unit_ranges_agree() {
        let palette = Palette::new();
        let bytes = palette.resolve(&ColorSpec::Rgb([255.0, 0.0, 127.5])).unwrap();
        let unit = palette.resolve(&ColorSpec::Rgb([1.0, 0.0, 0.5])).unwrap();
        assert!((bytes.r - unit.r).abs() < 1e-6);
        assert!((bytes.g - unit.g).abs() < 1e-6);
        assert!((bytes.b - unit.b).abs() < 1e-6);
    }

    #[test]
    fn test_unit_range_edge_case() {
        // All components <= 1 stay in unit scale
        let palette = Palette::new();
        let c = palette.resolve(&ColorSpec::Rgb([1.0, 1.0, 1.0])).unwrap();
        assert_eq!(c, Color::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_invalid_component_errors() {
        let palette = Palette::new();
        assert!(palette.resolve(&ColorSpec::Rgb([-0.1, 0.0, 0.0])).is_err());
        assert!(palette.resolve(&ColorSpec::Rgb([256.0, 0.0, 0.0])).is_err());
        assert!(palette.resolve(&ColorSpec::Rgb([f64::NAN, 0.0, 0.0])).is_err());
    }
}
