//! Scene manager: derives renderables from the design state
//!
//! The manager owns the garment, the camera, the lights and one renderable
//! per overlay on the active side. `sync` diffs the design against what is
//! already built and only rebuilds what changed: placement changes never
//! touch textures, and a bitmap is regenerated only when its texture key
//! changes.

pub mod frame;
pub mod lighting;
pub mod loader;
pub mod renderable;
pub mod resources;

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec2;
use image::RgbaImage;
use shared::{ImageSource, MaterialKind, OverlayId, OverlayRef, OverlayView, Rgb, Side};
use thiserror::Error;

use crate::catalog;
use crate::state::{AppSettings, DesignState, FontSettings};
use crate::texture::{FontBook, TextureGenerator};
use crate::viewport::camera::OrbitCamera;
use crate::viewport::mesh::{self, MeshData};
use crate::viewport::picking::{pick_nearest, Ray};
use frame::{GarmentDraw, OverlayDraw, RenderFrame};
use lighting::Lighting;
use loader::ImageLoader;
use renderable::{OverlayRenderable, RenderSpec};
use resources::{GeometryData, GeometryId, Released, ResourcePool};

/// Garment box dimensions (width, height, depth)
pub const GARMENT_SIZE: [f32; 3] = [2.5, 3.5, 0.2];

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to start image loader: {0}")]
    LoaderStartup(#[from] std::io::Error),
}

/// What one `sync` call changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub added: usize,
    pub removed: usize,
    pub retextured: usize,
    pub resized: usize,
    pub moved: usize,
    pub outlines_added: usize,
    pub outlines_removed: usize,
    pub side_changed: bool,
    pub garment_changed: bool,
    pub loads_applied: usize,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Result of a pointer hit-test
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayHit {
    pub overlay: OverlayRef,
    pub distance: f32,
}

struct GarmentRenderable {
    geometry: GeometryId,
    mesh: Arc<MeshData>,
    color: Rgb,
    material: MaterialKind,
}

struct DecodedImage {
    source_key: u64,
    image: Arc<RgbaImage>,
}

pub struct SceneManager {
    pool: ResourcePool,
    generator: TextureGenerator,
    loader: ImageLoader,
    camera: OrbitCamera,
    lighting: Lighting,
    garment: Option<GarmentRenderable>,
    /// Same order as the design's overlays on the active side
    renderables: Vec<OverlayRenderable>,
    decoded: HashMap<OverlayId, DecodedImage>,
    /// Source key of the latest request per overlay
    pending: HashMap<OverlayId, u64>,
    failed: HashMap<OverlayId, u64>,
    stale_loads_discarded: u64,
    synced_revision: Option<u64>,
    side: Side,
    viewport: [u32; 2],
    outline_color: [f32; 4],
    mounted: bool,
}

impl SceneManager {
    /// Build and mount a scene
    pub fn new(settings: &AppSettings) -> Result<Self, SceneError> {
        let [r, g, b] = settings.viewport.selection_color;
        let mut scene = Self {
            pool: ResourcePool::new(),
            generator: TextureGenerator::new(&settings.fonts),
            loader: ImageLoader::new()?,
            camera: OrbitCamera::new(&settings.camera),
            lighting: Lighting::default(),
            garment: None,
            renderables: Vec::new(),
            decoded: HashMap::new(),
            pending: HashMap::new(),
            failed: HashMap::new(),
            stale_loads_discarded: 0,
            synced_revision: None,
            side: Side::Front,
            viewport: [800, 600],
            outline_color: [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0],
            mounted: false,
        };
        scene.mount();
        Ok(scene)
    }

    /// Create the garment. No-op when already mounted.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        let [w, h, d] = GARMENT_SIZE;
        let mesh = Arc::new(mesh::garment(w, h, d));
        let geometry = self.pool.create_geometry(GeometryData::Mesh(mesh.clone()));
        self.garment = Some(GarmentRenderable {
            geometry,
            mesh,
            color: Rgb::WHITE,
            material: MaterialKind::Cotton,
        });
        self.camera.face_side(self.side);
        self.synced_revision = None;
        self.mounted = true;
        tracing::info!("Scene mounted");
    }

    /// Release every resource, garment included
    pub fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        for r in std::mem::take(&mut self.renderables) {
            self.release_renderable(r);
        }
        if let Some(garment) = self.garment.take() {
            self.pool.release_geometry(garment.geometry);
        }
        self.pool.release_all();
        self.decoded.clear();
        self.pending.clear();
        self.failed.clear();
        self.synced_revision = None;
        self.mounted = false;
        tracing::info!("Scene torn down");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    // ── Synchronization ───────────────────────────────────────

    /// Bring the scene in line with the design.
    ///
    /// No-op when the revision is unchanged and no image finished loading.
    pub fn sync(&mut self, design: &DesignState) -> SyncReport {
        let mut report = SyncReport {
            loads_applied: self.drain_loads(design),
            ..SyncReport::default()
        };
        if !self.mounted {
            return SyncReport::default();
        }
        if self.synced_revision == Some(design.revision()) && report.loads_applied == 0 {
            return report;
        }

        let side = design.current_side();
        if side != self.side {
            self.side = side;
            self.camera.face_side(side);
            report.side_changed = true;
        }

        if let Some(garment) = &mut self.garment {
            if garment.color != design.garment_color() || garment.material != design.material() {
                garment.color = design.garment_color();
                garment.material = design.material();
                report.garment_changed = true;
            }
        }

        let selection = design.selection().cloned();
        let mut previous: HashMap<OverlayRef, OverlayRenderable> = std::mem::take(&mut self.renderables)
            .into_iter()
            .map(|r| (r.overlay.clone(), r))
            .collect();
        let mut next = Vec::with_capacity(design.overlay_count_on(side));

        for view in design.overlays_on(side) {
            let spec = RenderSpec::of(view);
            let built = match previous.remove(&spec.overlay) {
                Some(existing) => self.update_renderable(existing, &spec, view, &mut report),
                None => {
                    let created = self.create_renderable(&spec, view);
                    if created.is_some() {
                        report.added += 1;
                    }
                    created
                }
            };
            if let Some(mut r) = built {
                let selected = selection.as_ref() == Some(&r.overlay);
                self.apply_outline(&mut r, selected, &mut report);
                next.push(r);
            }
        }

        for (_, leftover) in previous {
            self.release_renderable(leftover);
            report.removed += 1;
        }
        self.renderables = next;
        self.purge_load_state(design);
        self.synced_revision = Some(design.revision());

        if !report.is_empty() {
            tracing::debug!("Scene sync: {report:?}");
        }
        report
    }

    fn update_renderable(
        &mut self,
        mut r: OverlayRenderable,
        spec: &RenderSpec,
        view: OverlayView<'_>,
        report: &mut SyncReport,
    ) -> Option<OverlayRenderable> {
        if r.texture_key != spec.texture_key {
            match self.bitmap_for(view) {
                Some(image) => {
                    self.pool.release_texture(r.texture);
                    r.texture = self.pool.create_texture(image);
                    r.texture_key = spec.texture_key;
                    report.retextured += 1;
                }
                None => {
                    // New source still loading or failed: the overlay is absent meanwhile
                    self.release_renderable(r);
                    report.removed += 1;
                    return None;
                }
            }
        }
        if r.geometry_key() != spec.geometry_key() {
            self.pool.release_geometry(r.geometry);
            r.geometry = self
                .pool
                .create_geometry(GeometryData::Quad(mesh::plane(spec.width, spec.height)));
            r.width = spec.width;
            r.height = spec.height;
            if let Some(outline) = r.outline.take() {
                self.pool.release_geometry(outline);
                r.outline = Some(self.create_outline(spec.width, spec.height));
            }
            report.resized += 1;
        }
        if r.transform != spec.transform {
            r.transform = spec.transform;
            report.moved += 1;
        }
        Some(r)
    }

    fn create_renderable(&mut self, spec: &RenderSpec, view: OverlayView<'_>) -> Option<OverlayRenderable> {
        let image = self.bitmap_for(view)?;
        let texture = self.pool.create_texture(image);
        let geometry = self
            .pool
            .create_geometry(GeometryData::Quad(mesh::plane(spec.width, spec.height)));
        Some(OverlayRenderable {
            overlay: spec.overlay.clone(),
            width: spec.width,
            height: spec.height,
            transform: spec.transform,
            texture,
            texture_key: spec.texture_key,
            geometry,
            outline: None,
        })
    }

    fn release_renderable(&mut self, r: OverlayRenderable) {
        if let Some(outline) = r.outline {
            self.pool.release_geometry(outline);
        }
        self.pool.release_geometry(r.geometry);
        self.pool.release_texture(r.texture);
    }

    fn create_outline(&mut self, width: f32, height: f32) -> GeometryId {
        self.pool
            .create_geometry(GeometryData::Lines(mesh::rect_outline(width, height, self.outline_color)))
    }

    fn apply_outline(&mut self, r: &mut OverlayRenderable, selected: bool, report: &mut SyncReport) {
        match (selected, r.outline) {
            (true, None) => {
                r.outline = Some(self.create_outline(r.width, r.height));
                report.outlines_added += 1;
            }
            (false, Some(outline)) => {
                self.pool.release_geometry(outline);
                r.outline = None;
                report.outlines_removed += 1;
            }
            _ => {}
        }
    }

    /// Bitmap for an overlay, or None while a picture is loading or broken
    fn bitmap_for(&mut self, view: OverlayView<'_>) -> Option<Arc<RgbaImage>> {
        match view {
            OverlayView::Text(t) => Some(Arc::new(self.generator.text_bitmap(t))),
            OverlayView::Image(i) => match &i.source {
                ImageSource::Shape { shape, color } => {
                    Some(Arc::new(self.generator.shape_bitmap(*shape, *color)))
                }
                source => {
                    let id = &i.common.id;
                    let key = source.content_key();
                    if let Some(decoded) = self.decoded.get(id).filter(|d| d.source_key == key) {
                        return Some(decoded.image.clone());
                    }
                    if self.failed.get(id) == Some(&key) || self.pending.get(id) == Some(&key) {
                        return None;
                    }
                    self.pending.insert(id.clone(), key);
                    self.loader.request(id.clone(), source.clone());
                    None
                }
            },
        }
    }

    /// Apply finished loads; returns how many produced a usable bitmap
    fn drain_loads(&mut self, design: &DesignState) -> usize {
        let mut applied = 0;
        while let Some(done) = self.loader.try_recv() {
            if self.pending.get(&done.overlay_id) == Some(&done.source_key) {
                self.pending.remove(&done.overlay_id);
            }
            let wanted = design
                .image(&done.overlay_id)
                .is_some_and(|i| i.source.content_key() == done.source_key);
            if !wanted {
                tracing::debug!("Discarding stale image load for overlay {}", done.overlay_id);
                self.stale_loads_discarded += 1;
                continue;
            }
            match done.result {
                Ok(image) => {
                    self.decoded.insert(
                        done.overlay_id,
                        DecodedImage {
                            source_key: done.source_key,
                            image: Arc::new(image),
                        },
                    );
                    applied += 1;
                }
                Err(e) => {
                    tracing::warn!("Image for overlay {} failed to load: {e}", done.overlay_id);
                    self.failed.insert(done.overlay_id, done.source_key);
                }
            }
        }
        applied
    }

    /// Forget cached bitmaps and load bookkeeping for overlays that are gone
    fn purge_load_state(&mut self, design: &DesignState) {
        let current: HashMap<&str, u64> = design
            .image_overlays()
            .iter()
            .filter(|i| i.source.needs_decode())
            .map(|i| (i.common.id.as_str(), i.source.content_key()))
            .collect();
        let keep = |id: &OverlayId, key: u64| current.get(id.as_str()) == Some(&key);
        self.decoded.retain(|id, d| keep(id, d.source_key));
        self.failed.retain(|id, key| keep(id, *key));
        self.pending.retain(|id, key| keep(id, *key));
    }

    /// Let failed picture loads run again on the next sync
    pub fn retry_failed_loads(&mut self) {
        if !self.failed.is_empty() {
            self.failed.clear();
            self.synced_revision = None;
        }
    }

    /// Swap in fonts from new settings; text bitmaps are redrawn on the next sync
    pub fn reload_fonts(&mut self, settings: &FontSettings) {
        *self.generator.fonts_mut() = FontBook::with_settings(settings);
        self.refresh_textures();
        tracing::info!("Reloaded fonts ({} registered families)", settings.families.len());
    }

    /// Regenerate every bitmap on the next sync
    pub fn refresh_textures(&mut self) {
        for r in &mut self.renderables {
            r.texture_key = 0;
        }
        self.synced_revision = None;
    }

    /// Picture loads not finished yet
    pub fn pending_loads(&self) -> usize {
        self.pending.len()
    }

    pub fn stale_loads_discarded(&self) -> u64 {
        self.stale_loads_discarded
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn renderables(&self) -> &[OverlayRenderable] {
        &self.renderables
    }

    pub fn renderable(&self, id: &str) -> Option<&OverlayRenderable> {
        self.renderables.iter().find(|r| r.overlay.id == id)
    }

    pub fn resources(&self) -> &ResourcePool {
        &self.pool
    }

    /// Ids released since the last call, for GPU mirrors to delete
    pub fn take_released(&mut self) -> Vec<Released> {
        self.pool.take_released()
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn garment_color(&self) -> Option<Rgb> {
        self.garment.as_ref().map(|g| g.color)
    }

    pub fn garment_material(&self) -> Option<MaterialKind> {
        self.garment.as_ref().map(|g| g.material)
    }

    // ── Viewport ──────────────────────────────────────────────

    /// Observe a host resize; zero sizes are clamped to one pixel
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = [width.max(1), height.max(1)];
    }

    pub fn viewport(&self) -> [u32; 2] {
        self.viewport
    }

    pub fn aspect(&self) -> f32 {
        self.viewport[0] as f32 / self.viewport[1] as f32
    }

    /// Camera ray through normalized device coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        self.camera.ray_from_ndc(ndc, self.aspect())
    }

    /// Nearest overlay renderable under the ray. The garment is never hit.
    pub fn hit_test(&self, ray: &Ray) -> Option<OverlayHit> {
        let candidates = self.renderables.iter().map(|r| (&r.overlay, r.world_corners()));
        pick_nearest(ray, candidates).map(|(overlay, distance)| OverlayHit {
            overlay: overlay.clone(),
            distance,
        })
    }

    // ── Frame ─────────────────────────────────────────────────

    /// Draw list for the current state at the current viewport size
    pub fn render_frame(&self, background: [f32; 4]) -> RenderFrame {
        let eye = self.camera.eye_position();
        let garment = self.garment.as_ref().map(|g| GarmentDraw {
            geometry: g.geometry,
            mesh: g.mesh.clone(),
            color: g.color.to_f32(),
            material: *catalog::material(g.material),
        });

        let mut overlays: Vec<(f32, OverlayDraw)> = self
            .renderables
            .iter()
            .filter_map(|r| {
                let image = self.pool.texture(r.texture)?.clone();
                Some((
                    r.distance_from(eye),
                    OverlayDraw {
                        overlay: r.overlay.clone(),
                        texture: r.texture,
                        image,
                        model: r.model_matrix(),
                        width: r.width,
                        height: r.height,
                        selected: r.is_selected(),
                    },
                ))
            })
            .collect();
        overlays.sort_by(|a, b| b.0.total_cmp(&a.0));

        RenderFrame {
            width: self.viewport[0],
            height: self.viewport[1],
            view_proj: self.camera.view_projection(self.aspect()),
            eye,
            lighting: self.lighting,
            background,
            garment,
            overlays: overlays.into_iter().map(|(_, d)| d).collect(),
            outline_color: self.outline_color,
        }
    }
}
