use glam::{Mat4, Vec3, Vec4};

use super::picking::{Aabb, Ray};

/// Camera projection type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    Perspective,
    Orthographic,
}

/// Axis-aligned view orientation presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewOrientation {
    Top,
    Bottom,
    Left,
    Right,
    Front,
    Rear,
    Iso,
}

/// Arc-ball camera for the 3D viewport
#[derive(Debug, Clone)]
pub struct ArcBallCamera {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    /// Camera target point
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
    pub projection: Projection,
}

const MIN_DISTANCE: f32 = 0.2;
const MAX_DISTANCE: f32 = 400.0;
const MAX_PITCH: f32 = 1.5;

impl ArcBallCamera {
    pub fn new() -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.4,
            distance: 6.0,
            target: Vec3::ZERO,
            fov: 45.0_f32.to_radians(),
            projection: Projection::Perspective,
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx.to_radians();
        self.pitch = (self.pitch + dy.to_radians()).clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        let right = self.right_vector();
        let up = self.up_vector();
        self.target += right * dx + up * dy;
    }

    /// Snap to an axis-aligned orientation, keeping target and distance
    pub fn set_orientation(&mut self, orientation: ViewOrientation) {
        let (yaw, pitch) = match orientation {
            ViewOrientation::Top => (0.0, MAX_PITCH),
            ViewOrientation::Bottom => (0.0, -MAX_PITCH),
            ViewOrientation::Front => (0.0, 0.0),
            ViewOrientation::Rear => (std::f32::consts::PI, 0.0),
            ViewOrientation::Right => (std::f32::consts::FRAC_PI_2, 0.0),
            ViewOrientation::Left => (-std::f32::consts::FRAC_PI_2, 0.0),
            // Classic isometric: 45 degrees around, ~35.26 degrees up
            ViewOrientation::Iso => (std::f32::consts::FRAC_PI_4, 0.6155),
        };
        self.yaw = yaw;
        self.pitch = pitch;
    }

    /// Frame a bounding box: center the target and back off far enough
    /// for the whole box to fit the frustum.
    pub fn fit(&mut self, aabb: &Aabb) {
        let center = aabb.center();
        let radius = (aabb.max - aabb.min).length() * 0.5;
        if radius <= f32::EPSILON {
            self.target = center;
            return;
        }
        self.target = center;
        let margin = 1.15;
        self.distance = (radius * margin / (self.fov * 0.5).sin())
            .clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Zoom keeping the world point under the cursor fixed on screen
    pub fn zoom_at(&mut self, cursor: egui::Pos2, rect: egui::Rect, delta: f32) {
        let anchor = self.point_at_target_depth(cursor, rect);
        let before = self.distance;
        self.zoom(delta);
        let factor = self.distance / before;
        self.target = anchor + (self.target - anchor) * factor;
    }

    /// Intersection of the cursor ray with the plane through the target,
    /// perpendicular to the view direction.
    fn point_at_target_depth(&self, cursor: egui::Pos2, rect: egui::Rect) -> Vec3 {
        let ray = self.screen_ray(cursor, rect);
        let forward = (self.target - self.eye_position()).normalize_or_zero();
        let denom = ray.direction.dot(forward);
        if denom.abs() < 1e-6 {
            return self.target;
        }
        let t = (self.target - ray.origin).dot(forward) / denom;
        ray.origin + ray.direction * t
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let cy = self.yaw.cos();
        let sy = self.yaw.sin();
        let cp = self.pitch.cos();
        let sp = self.pitch.sin();

        self.target
            + Vec3::new(
                self.distance * cp * sy,
                self.distance * sp,
                self.distance * cp * cy,
            )
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        match self.projection {
            Projection::Perspective => Mat4::perspective_rh_gl(self.fov, aspect, 0.1, 1000.0),
            Projection::Orthographic => {
                // Match the perspective framing at target depth
                let half_h = self.distance * (self.fov * 0.5).tan();
                let half_w = half_h * aspect;
                Mat4::orthographic_rh_gl(-half_w, half_w, -half_h, half_h, 0.1, 1000.0)
            }
        }
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    fn right_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        fwd.cross(Vec3::Y).normalize_or_zero()
    }

    fn up_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        let right = self.right_vector();
        right.cross(fwd).normalize_or_zero()
    }

    /// Project a 3D point to 2D screen coords (for overlays)
    pub fn project(&self, point: [f32; 3], rect: egui::Rect) -> Option<egui::Pos2> {
        let aspect = rect.width() / rect.height();
        let vp = self.view_projection(aspect);
        let p = vp * Vec4::new(point[0], point[1], point[2], 1.0);
        if p.w <= 0.0 {
            return None;
        }
        let ndc = p.truncate() / p.w;
        let screen_x = rect.center().x + ndc.x * rect.width() * 0.5;
        let screen_y = rect.center().y - ndc.y * rect.height() * 0.5;
        Some(egui::pos2(screen_x, screen_y))
    }

    /// Cast a ray from a screen position into the 3D scene
    pub fn screen_ray(&self, screen_pos: egui::Pos2, rect: egui::Rect) -> Ray {
        let aspect = rect.width() / rect.height();

        // Screen → NDC
        let ndc_x = (screen_pos.x - rect.center().x) / (rect.width() * 0.5);
        let ndc_y = -(screen_pos.y - rect.center().y) / (rect.height() * 0.5);

        // Inverse view-projection
        let vp_inv = self.view_projection(aspect).inverse();

        // Unproject near and far points
        let near_ndc = Vec4::new(ndc_x, ndc_y, -1.0, 1.0);
        let far_ndc = Vec4::new(ndc_x, ndc_y, 1.0, 1.0);

        let near_world = vp_inv * near_ndc;
        let far_world = vp_inv * far_ndc;

        let near = near_world.truncate() / near_world.w;
        let far = far_world.truncate() / far_world.w;

        let direction = (far - near).normalize_or_zero();

        Ray { origin: near, direction }
    }
}

impl Default for ArcBallCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0))
    }

    #[test]
    fn test_front_view_looks_down_negative_z() {
        let mut cam = ArcBallCamera::new();
        cam.set_orientation(ViewOrientation::Front);
        let eye = cam.eye_position();
        assert!(eye.z > 0.0);
        assert!(eye.x.abs() < 1e-5 && eye.y.abs() < 1e-5);
    }

    #[test]
    fn test_screen_center_ray_passes_near_target() {
        let cam = ArcBallCamera::new();
        let rect = viewport();
        let ray = cam.screen_ray(rect.center(), rect);
        // Distance from the target to the ray should be ~0
        let to_target = cam.target - ray.origin;
        let along = to_target.dot(ray.direction);
        let closest = ray.origin + ray.direction * along;
        assert!((closest - cam.target).length() < 1e-3);
    }

    #[test]
    fn test_project_unproject_agree() {
        let cam = ArcBallCamera::new();
        let rect = viewport();
        let world = [1.0f32, 0.5, -0.5];
        let screen = cam.project(world, rect).unwrap();
        let ray = cam.screen_ray(screen, rect);
        // The world point must lie on the cursor ray
        let v = Vec3::from(world) - ray.origin;
        let dist = (v - ray.direction * v.dot(ray.direction)).length();
        assert!(dist < 1e-2, "off-ray by {dist}");
    }

    #[test]
    fn test_fit_contains_box() {
        let mut cam = ArcBallCamera::new();
        let aabb = Aabb { min: Vec3::splat(-2.0), max: Vec3::splat(2.0) };
        cam.fit(&aabb);
        assert_eq!(cam.target, Vec3::ZERO);
        // Eye must be outside the box
        assert!(cam.distance > 2.0 * 3.0f32.sqrt());
    }

    #[test]
    fn test_orthographic_ray_is_parallel_to_view() {
        let mut cam = ArcBallCamera::new();
        cam.projection = Projection::Orthographic;
        let rect = viewport();
        let forward = (cam.target - cam.eye_position()).normalize();
        let r1 = cam.screen_ray(egui::pos2(100.0, 100.0), rect);
        let r2 = cam.screen_ray(egui::pos2(700.0, 500.0), rect);
        assert!((r1.direction - forward).length() < 1e-3);
        assert!((r1.direction - r2.direction).length() < 1e-3);
    }

    #[test]
    fn test_zoom_clamps_distance() {
        let mut cam = ArcBallCamera::new();
        for _ in 0..100 {
            cam.zoom(0.9);
        }
        assert!(cam.distance >= MIN_DISTANCE);
        for _ in 0..100 {
            cam.zoom(-10.0);
        }
        assert!(cam.distance <= MAX_DISTANCE);
    }
}
