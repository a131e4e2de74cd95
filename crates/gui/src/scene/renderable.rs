//! Derived per-overlay scene objects

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::{Mat4, Vec3};
use shared::{ImageOverlay, OverlayRef, OverlayView, Side, TextOverlay};

use super::resources::{GeometryId, TextureId};

/// Placement of an overlay plane on the garment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayTransform {
    pub position: Vec3,
    /// Degrees about the local Z (view) axis
    pub rotation_deg: f32,
    pub side: Side,
    /// -1 flips the plane horizontally
    pub scale_x: f32,
}

impl OverlayTransform {
    /// translate · rotY(π on the back) · rotZ · scale
    pub fn model_matrix(&self) -> Mat4 {
        let yaw = match self.side {
            Side::Front => 0.0,
            Side::Back => std::f32::consts::PI,
        };
        Mat4::from_translation(self.position)
            * Mat4::from_rotation_y(yaw)
            * Mat4::from_rotation_z(self.rotation_deg.to_radians())
            * Mat4::from_scale(Vec3::new(self.scale_x, 1.0, 1.0))
    }
}

/// Everything the scene needs to know to build or diff one overlay
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSpec {
    pub overlay: OverlayRef,
    pub width: f32,
    pub height: f32,
    pub transform: OverlayTransform,
    /// Changes exactly when the bitmap has to be regenerated
    pub texture_key: u64,
}

impl RenderSpec {
    pub fn of(view: OverlayView<'_>) -> Self {
        match view {
            OverlayView::Text(t) => Self::text(t),
            OverlayView::Image(i) => Self::image(i),
        }
    }

    /// Text mirrors in the bitmap, so the plane keeps a positive scale
    fn text(t: &TextOverlay) -> Self {
        Self {
            overlay: OverlayRef::text(t.common.id.clone()),
            width: t.font_size * 4.0,
            height: t.font_size * 2.0,
            transform: transform(&t.common, 1.0),
            texture_key: text_key(t),
        }
    }

    /// Pictures mirror via negative X scale, not by resampling
    fn image(i: &ImageOverlay) -> Self {
        let scale_x = if i.common.mirrored { -1.0 } else { 1.0 };
        Self {
            overlay: OverlayRef::image(i.common.id.clone()),
            width: i.width,
            height: i.height,
            transform: transform(&i.common, scale_x),
            texture_key: i.source.content_key(),
        }
    }

    pub fn geometry_key(&self) -> (u32, u32) {
        (self.width.to_bits(), self.height.to_bits())
    }
}

fn transform(common: &shared::OverlayCommon, scale_x: f32) -> OverlayTransform {
    OverlayTransform {
        position: Vec3::from(common.position),
        rotation_deg: common.rotation,
        side: common.side,
        scale_x,
    }
}

fn text_key(t: &TextOverlay) -> u64 {
    let mut h = DefaultHasher::new();
    t.content.hash(&mut h);
    t.font_family.hash(&mut h);
    t.font_size.to_bits().hash(&mut h);
    t.color.hash(&mut h);
    t.weight.hash(&mut h);
    t.style.hash(&mut h);
    t.decoration.hash(&mut h);
    t.common.mirrored.hash(&mut h);
    h.finish()
}

/// Scene object for one overlay on the active side
#[derive(Debug, Clone)]
pub struct OverlayRenderable {
    pub overlay: OverlayRef,
    pub width: f32,
    pub height: f32,
    pub transform: OverlayTransform,
    pub texture: TextureId,
    pub texture_key: u64,
    pub geometry: GeometryId,
    /// Selection outline, child of the plane
    pub outline: Option<GeometryId>,
}

impl OverlayRenderable {
    pub fn geometry_key(&self) -> (u32, u32) {
        (self.width.to_bits(), self.height.to_bits())
    }

    pub fn is_selected(&self) -> bool {
        self.outline.is_some()
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.transform.model_matrix()
    }

    /// World-space corners (bl, br, tr, tl) for hit-testing
    pub fn world_corners(&self) -> [Vec3; 4] {
        let m = self.model_matrix();
        let hw = self.width * 0.5;
        let hh = self.height * 0.5;
        [
            m.transform_point3(Vec3::new(-hw, -hh, 0.0)),
            m.transform_point3(Vec3::new(hw, -hh, 0.0)),
            m.transform_point3(Vec3::new(hw, hh, 0.0)),
            m.transform_point3(Vec3::new(-hw, hh, 0.0)),
        ]
    }

    /// Depth of the plane center along the view direction from `eye`
    pub fn distance_from(&self, eye: Vec3) -> f32 {
        (self.transform.position - eye).length()
    }
}

#[cfg(test)]
mod tests {
    use shared::{ImageSource, Rgb, ShapeKind};

    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_text_plane_size() {
        let mut t = TextOverlay::new(Side::Front);
        t.font_size = 0.5;
        let spec = RenderSpec::of(OverlayView::Text(&t));
        assert_eq!((spec.width, spec.height), (2.0, 1.0));
        assert_eq!(spec.transform.scale_x, 1.0);
    }

    #[test]
    fn test_text_key_ignores_placement() {
        let mut t = TextOverlay::new(Side::Front);
        let before = RenderSpec::of(OverlayView::Text(&t)).texture_key;
        t.common.position = [1.0, 2.0, 0.11];
        t.common.set_rotation(45.0);
        assert_eq!(RenderSpec::of(OverlayView::Text(&t)).texture_key, before);
        t.common.mirrored = true;
        assert_ne!(RenderSpec::of(OverlayView::Text(&t)).texture_key, before);
    }

    #[test]
    fn test_image_mirror_is_negative_scale() {
        let mut i = ImageOverlay::new_shape(Side::Front, ShapeKind::Star, Rgb::BLACK);
        let key = RenderSpec::of(OverlayView::Image(&i)).texture_key;
        i.common.mirrored = true;
        let spec = RenderSpec::of(OverlayView::Image(&i));
        assert_eq!(spec.transform.scale_x, -1.0);
        assert_eq!(spec.texture_key, key);
    }

    #[test]
    fn test_image_key_tracks_source() {
        let mut i = ImageOverlay::new_image(Side::Front, ImageSource::File { path: "a.png".into() }, 1.0);
        let key = RenderSpec::of(OverlayView::Image(&i)).texture_key;
        i.source = ImageSource::File { path: "b.png".into() };
        assert_ne!(RenderSpec::of(OverlayView::Image(&i)).texture_key, key);
    }

    #[test]
    fn test_back_side_faces_negative_z() {
        let t = OverlayTransform {
            position: Vec3::new(0.0, 0.0, -0.11),
            rotation_deg: 0.0,
            side: Side::Back,
            scale_x: 1.0,
        };
        let normal = t.model_matrix().transform_vector3(Vec3::Z);
        assert!(approx(normal, Vec3::NEG_Z));
        // Local +X reads left-to-right from behind
        let right = t.model_matrix().transform_vector3(Vec3::X);
        assert!(approx(right, Vec3::NEG_X));
    }

    #[test]
    fn test_rotation_about_view_axis() {
        let t = OverlayTransform {
            position: Vec3::ZERO,
            rotation_deg: 90.0,
            side: Side::Front,
            scale_x: 1.0,
        };
        let x = t.model_matrix().transform_vector3(Vec3::X);
        assert!(approx(x, Vec3::Y));
    }
}
