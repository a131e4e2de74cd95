//! Backend-neutral draw list for one frame

use std::sync::Arc;

use glam::{Mat4, Vec3};
use image::RgbaImage;
use shared::OverlayRef;

use super::lighting::Lighting;
use super::resources::{GeometryId, TextureId};
use crate::catalog::MaterialParams;
use crate::viewport::mesh::MeshData;

/// Garment draw: lit, opaque
#[derive(Debug, Clone)]
pub struct GarmentDraw {
    pub geometry: GeometryId,
    pub mesh: Arc<MeshData>,
    pub color: [f32; 3],
    pub material: MaterialParams,
}

/// One overlay plane: unlit, textured, straight alpha, double-sided
#[derive(Debug, Clone)]
pub struct OverlayDraw {
    pub overlay: OverlayRef,
    pub texture: TextureId,
    pub image: Arc<RgbaImage>,
    pub model: Mat4,
    pub width: f32,
    pub height: f32,
    pub selected: bool,
}

impl OverlayDraw {
    /// World-space corners (bl, br, tr, tl) with their texture coordinates
    pub fn corners(&self) -> [(Vec3, [f32; 2]); 4] {
        let hw = self.width * 0.5;
        let hh = self.height * 0.5;
        [
            (self.model.transform_point3(Vec3::new(-hw, -hh, 0.0)), [0.0, 1.0]),
            (self.model.transform_point3(Vec3::new(hw, -hh, 0.0)), [1.0, 1.0]),
            (self.model.transform_point3(Vec3::new(hw, hh, 0.0)), [1.0, 0.0]),
            (self.model.transform_point3(Vec3::new(-hw, hh, 0.0)), [0.0, 0.0]),
        ]
    }
}

/// Everything a renderer needs to produce one image
#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub width: u32,
    pub height: u32,
    pub view_proj: Mat4,
    pub eye: Vec3,
    pub lighting: Lighting,
    /// RGBA, 0..1; alpha 0 for a transparent background
    pub background: [f32; 4],
    pub garment: Option<GarmentDraw>,
    /// Sorted far to near
    pub overlays: Vec<OverlayDraw>,
    pub outline_color: [f32; 4],
}

impl RenderFrame {
    pub fn selected(&self) -> Option<&OverlayDraw> {
        self.overlays.iter().find(|o| o.selected)
    }
}
