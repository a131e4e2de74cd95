use glam::{Mat4, Vec2, Vec3, Vec4};
use shared::Side;

use super::picking::Ray;
use crate::state::settings::CameraSettings;

const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;

/// Saved camera pose, restored after an export
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSnapshot {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub target: Vec3,
}

/// Orbit camera around the garment. Pan is not offered.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Horizontal rotation angle (radians); 0 looks at the front
    pub yaw: f32,
    /// Vertical rotation angle (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    /// Camera target point
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
    min_distance: f32,
    max_distance: f32,
    /// Distance used by the canonical side views
    home_distance: f32,
    /// Orbit controls accept input
    enabled: bool,
}

impl OrbitCamera {
    pub fn new(settings: &CameraSettings) -> Self {
        let min_distance = settings.min_distance.min(settings.max_distance);
        let max_distance = settings.max_distance.max(settings.min_distance);
        let home_distance = settings.distance.clamp(min_distance, max_distance);
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: home_distance,
            target: Vec3::ZERO,
            fov: settings.fov_degrees.to_radians(),
            min_distance,
            max_distance,
            home_distance,
            enabled: true,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable orbit input (disabled while an overlay is dragged)
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Orbit by degrees. Ignored while disabled.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        if !self.enabled {
            return;
        }
        self.yaw += dx.to_radians();
        self.pitch = (self.pitch + dy.to_radians()).clamp(-1.5, 1.5);
    }

    /// Dolly by a relative amount. Ignored while disabled.
    pub fn zoom(&mut self, delta: f32) {
        if !self.enabled {
            return;
        }
        self.distance = (self.distance * (1.0 - delta)).clamp(self.min_distance, self.max_distance);
    }

    /// Look straight at one face of the garment from the home distance
    pub fn face_side(&mut self, side: Side) {
        self.target = Vec3::ZERO;
        self.pitch = 0.0;
        self.distance = self.home_distance;
        self.yaw = match side {
            Side::Front => 0.0,
            Side::Back => std::f32::consts::PI,
        };
    }

    pub fn snapshot(&self) -> CameraSnapshot {
        CameraSnapshot {
            yaw: self.yaw,
            pitch: self.pitch,
            distance: self.distance,
            target: self.target,
        }
    }

    pub fn restore(&mut self, snapshot: CameraSnapshot) {
        self.yaw = snapshot.yaw;
        self.pitch = snapshot.pitch;
        self.distance = snapshot.distance;
        self.target = snapshot.target;
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
        Mat4::perspective_rh_gl(self.fov, aspect, NEAR, FAR)
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Cast a ray through normalized device coordinates (-1..1, y up)
    pub fn ray_from_ndc(&self, ndc: Vec2, aspect: f32) -> Ray {
        let vp_inv = self.view_projection(aspect).inverse();

        let near_world = vp_inv * Vec4::new(ndc.x, ndc.y, -1.0, 1.0);
        let far_world = vp_inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);

        let near = near_world.truncate() / near_world.w;
        let far = far_world.truncate() / far_world.w;

        Ray {
            origin: self.eye_position(),
            direction: (far - near).normalize_or_zero(),
        }
    }

    /// Screen position inside `rect` → NDC
    pub fn screen_to_ndc(screen_pos: egui::Pos2, rect: egui::Rect) -> Vec2 {
        Vec2::new(
            (screen_pos.x - rect.center().x) / (rect.width() * 0.5),
            -(screen_pos.y - rect.center().y) / (rect.height() * 0.5),
        )
    }

    /// Cast a ray from a screen position into the 3D scene
    pub fn screen_ray(&self, screen_pos: egui::Pos2, rect: egui::Rect) -> Ray {
        let aspect = rect.width() / rect.height();
        self.ray_from_ndc(Self::screen_to_ndc(screen_pos, rect), aspect)
    }

    /// Project a 3D point to 2D screen coords
    pub fn project(&self, point: Vec3, rect: egui::Rect) -> Option<egui::Pos2> {
        let aspect = rect.width() / rect.height();
        let p = self.view_projection(aspect) * point.extend(1.0);
        if p.w <= 0.0 {
            return None;
        }
        let ndc = p.truncate() / p.w;
        Some(egui::pos2(
            rect.center().x + ndc.x * rect.width() * 0.5,
            rect.center().y - ndc.y * rect.height() * 0.5,
        ))
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(&CameraSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_default_looks_at_front() {
        let cam = OrbitCamera::default();
        assert!(approx(cam.eye_position(), Vec3::new(0.0, 0.0, 5.0)));
    }

    #[test]
    fn test_face_back() {
        let mut cam = OrbitCamera::default();
        cam.rotate(30.0, 20.0);
        cam.face_side(Side::Back);
        assert!(approx(cam.eye_position(), Vec3::new(0.0, 0.0, -5.0)));
    }

    #[test]
    fn test_zoom_clamped() {
        let mut cam = OrbitCamera::default();
        cam.zoom(0.99);
        assert_eq!(cam.distance, 3.0);
        cam.zoom(-100.0);
        assert_eq!(cam.distance, 10.0);
    }

    #[test]
    fn test_disabled_ignores_input() {
        let mut cam = OrbitCamera::default();
        cam.set_enabled(false);
        let before = cam.snapshot();
        cam.rotate(45.0, 10.0);
        cam.zoom(0.5);
        assert_eq!(cam.snapshot(), before);
        cam.set_enabled(true);
        cam.rotate(45.0, 0.0);
        assert_ne!(cam.snapshot(), before);
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let cam = OrbitCamera::default();
        let ray = cam.ray_from_ndc(Vec2::ZERO, 1.0);
        assert!(approx(ray.direction, Vec3::NEG_Z));
    }

    #[test]
    fn test_project_then_unproject() {
        let cam = OrbitCamera::default();
        let rect = egui::Rect::from_min_size(egui::pos2(10.0, 20.0), egui::vec2(400.0, 300.0));
        let world = Vec3::new(0.5, -0.3, 0.11);
        let screen = cam.project(world, rect).unwrap();
        let ray = cam.screen_ray(screen, rect);
        let t = (0.11 - ray.origin.z) / ray.direction.z;
        assert!(approx(ray.at(t), world));
    }

    #[test]
    fn test_snapshot_restore() {
        let mut cam = OrbitCamera::default();
        cam.rotate(20.0, 5.0);
        let snap = cam.snapshot();
        cam.face_side(Side::Back);
        cam.restore(snap);
        assert_eq!(cam.snapshot(), snap);
    }
}
