//! Canned shapes and scenes for the demo binary and tests.

use shared::{
    primitives, Curve, Displayable, Point3, SceneDescription, SceneObject, Surface, Vec3d,
};

pub fn unit_box() -> Displayable {
    Displayable::Shape(primitives::box_solid(1.0, 1.0, 1.0))
}

pub fn probe_point(x: f64, y: f64, z: f64) -> Displayable {
    Displayable::Point(Point3::new(x, y, z))
}

pub fn quarter_arc(radius: f64) -> Displayable {
    Displayable::Curve(Curve::Arc {
        center: Point3::ORIGIN,
        normal: Vec3d::Z,
        radius,
        start_angle: 0.0,
        end_angle: std::f64::consts::FRAC_PI_2,
    })
}

/// The scene shown when the binary starts without `--scene`
pub fn demo_scene() -> SceneDescription {
    use shared::ColorSpec;

    let object = |name: &str, item: Displayable, color: Option<&str>| SceneObject {
        name: name.to_string(),
        item,
        color: color.map(|c| ColorSpec::Named(c.to_string())),
        transparency: None,
    };

    SceneDescription {
        objects: vec![
            object(
                "base plate",
                Displayable::Shape(primitives::box_solid(6.0, 0.4, 4.0)),
                None,
            ),
            object(
                "column",
                Displayable::Shape(primitives::cylinder_solid(0.6, 2.5)),
                Some("blue"),
            ),
            object(
                "dome",
                Displayable::Shape(primitives::sphere_solid(0.9)),
                Some("orange"),
            ),
            object("datum", probe_point(3.5, 0.0, 0.0), Some("red")),
            object("guide", quarter_arc(2.0), Some("green")),
            object(
                "panel",
                Displayable::Surface(Surface::Plane {
                    origin: Point3::new(-3.0, 0.2, -2.0),
                    u_dir: Vec3d::new(0.0, 1.0, 0.0),
                    v_dir: Vec3d::new(0.0, 0.0, 1.0),
                    u_min: 0.0,
                    u_max: 2.0,
                    v_min: 0.0,
                    v_max: 1.5,
                }),
                Some("cyan"),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_scene_serializes() {
        let scene = demo_scene();
        assert!(!scene.objects.is_empty());
        let json = serde_json::to_string_pretty(&scene).unwrap();
        let back: SceneDescription = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scene);
    }
}
