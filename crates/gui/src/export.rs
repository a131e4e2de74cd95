//! Still-image export of the active side
//!
//! The scene is framed straight-on at the export resolution, rendered once
//! and encoded as PNG. Camera and viewport are restored afterwards whether
//! or not rendering succeeded.

use std::io::Cursor;
use std::ops::{Deref, DerefMut};

use image::ImageFormat;
use shared::Side;
use thiserror::Error;

use crate::render::{FrameRenderer, RenderError};
use crate::scene::SceneManager;
use crate::state::{ExportSettings, ViewportSettings};
use crate::viewport::camera::CameraSnapshot;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("PNG encoding failed: {0}")]
    Encode(image::ImageError),
}

/// An encoded export of one garment side
#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub side: Side,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl ExportedImage {
    pub fn suggested_file_name(&self, unix_millis: u128) -> String {
        suggested_file_name(self.side, unix_millis)
    }
}

/// `tshirt-design-<side>-<millis>.png`
pub fn suggested_file_name(side: Side, unix_millis: u128) -> String {
    format!("tshirt-design-{}-{unix_millis}.png", side.label())
}

/// Export framing; puts camera and viewport back when dropped
struct Framing<'a> {
    scene: &'a mut SceneManager,
    camera: CameraSnapshot,
    viewport: [u32; 2],
}

impl<'a> Framing<'a> {
    fn new(scene: &'a mut SceneManager, width: u32, height: u32) -> Self {
        let camera = scene.camera().snapshot();
        let viewport = scene.viewport();
        let side = scene.side();
        scene.camera_mut().face_side(side);
        scene.set_viewport(width, height);
        Self {
            scene,
            camera,
            viewport,
        }
    }
}

impl Deref for Framing<'_> {
    type Target = SceneManager;

    fn deref(&self) -> &SceneManager {
        self.scene
    }
}

impl DerefMut for Framing<'_> {
    fn deref_mut(&mut self) -> &mut SceneManager {
        self.scene
    }
}

impl Drop for Framing<'_> {
    fn drop(&mut self) {
        self.scene.camera_mut().restore(self.camera);
        let [w, h] = self.viewport;
        self.scene.set_viewport(w, h);
    }
}

/// Background for an export frame
fn export_background(settings: &ExportSettings, viewport: &ViewportSettings) -> [f32; 4] {
    if settings.transparent_background {
        [0.0; 4]
    } else {
        let [r, g, b] = viewport.background_color;
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
    }
}

/// Render the active side straight-on and encode it as PNG.
///
/// Reads the scene as last synced; call `SceneManager::sync` first. The
/// selection outline is not drawn.
pub fn export_png(
    scene: &mut SceneManager,
    renderer: &mut dyn FrameRenderer,
    settings: &ExportSettings,
    viewport: &ViewportSettings,
) -> Result<ExportedImage, ExportError> {
    if settings.width == 0 || settings.height == 0 {
        return Err(RenderError::EmptyTarget {
            width: settings.width,
            height: settings.height,
        }
        .into());
    }

    let side = scene.side();
    let pixels = {
        let framing = Framing::new(scene, settings.width, settings.height);
        let mut frame = framing.render_frame(export_background(settings, viewport));
        for overlay in &mut frame.overlays {
            overlay.selected = false;
        }
        renderer.render(&frame)?
    };

    let mut out = Cursor::new(Vec::new());
    pixels.write_to(&mut out, ImageFormat::Png).map_err(ExportError::Encode)?;
    let png = out.into_inner();
    tracing::info!(
        "Exported {} side {}x{} ({} bytes)",
        side.label(),
        pixels.width(),
        pixels.height(),
        png.len()
    );

    Ok(ExportedImage {
        side,
        width: pixels.width(),
        height: pixels.height(),
        png,
    })
}

#[cfg(test)]
mod tests {
    use shared::ShapeKind;

    use super::*;
    use crate::render::SoftwareRenderer;
    use crate::scene::frame::RenderFrame;
    use crate::state::{AppSettings, DesignState};

    struct FailingRenderer;

    impl FrameRenderer for FailingRenderer {
        fn render(&mut self, _frame: &RenderFrame) -> Result<image::RgbaImage, RenderError> {
            Err(RenderError::Backend("no context".into()))
        }
    }

    fn small() -> ExportSettings {
        ExportSettings {
            width: 64,
            height: 48,
            transparent_background: true,
        }
    }

    fn scene_with_shape() -> (SceneManager, DesignState) {
        let mut scene = SceneManager::new(&AppSettings::default()).unwrap();
        let mut design = DesignState::new();
        design.add_shape(ShapeKind::Star, shared::Rgb::BLACK);
        scene.sync(&design);
        (scene, design)
    }

    #[test]
    fn test_file_name() {
        assert_eq!(suggested_file_name(Side::Front, 1700000000000), "tshirt-design-front-1700000000000.png");
        assert_eq!(suggested_file_name(Side::Back, 5), "tshirt-design-back-5.png");
    }

    #[test]
    fn test_export_size_and_png_signature() {
        let (mut scene, _design) = scene_with_shape();
        let out = export_png(&mut scene, &mut SoftwareRenderer::new(), &small(), &ViewportSettings::default()).unwrap();
        assert_eq!((out.width, out.height), (64, 48));
        assert_eq!(out.side, Side::Front);
        assert_eq!(&out.png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&out.png).unwrap();
        assert_eq!(decoded.width(), 64);
    }

    #[test]
    fn test_export_restores_camera_and_viewport() {
        let (mut scene, _design) = scene_with_shape();
        scene.set_viewport(300, 200);
        scene.camera_mut().rotate(40.0, 25.0);
        scene.camera_mut().zoom(1.5);
        let before = scene.camera().snapshot();

        export_png(&mut scene, &mut SoftwareRenderer::new(), &small(), &ViewportSettings::default()).unwrap();
        assert_eq!(scene.camera().snapshot(), before);
        assert_eq!(scene.viewport(), [300, 200]);
    }

    #[test]
    fn test_restore_on_render_failure() {
        let (mut scene, _design) = scene_with_shape();
        scene.set_viewport(320, 240);
        scene.camera_mut().rotate(10.0, 5.0);
        let before = scene.camera().snapshot();

        let err = export_png(&mut scene, &mut FailingRenderer, &small(), &ViewportSettings::default());
        assert!(matches!(err, Err(ExportError::Render(RenderError::Backend(_)))));
        assert_eq!(scene.camera().snapshot(), before);
        assert_eq!(scene.viewport(), [320, 240]);
    }

    #[test]
    fn test_zero_size_rejected() {
        let (mut scene, _design) = scene_with_shape();
        let settings = ExportSettings {
            width: 0,
            ..small()
        };
        let err = export_png(&mut scene, &mut SoftwareRenderer::new(), &settings, &ViewportSettings::default());
        assert!(matches!(err, Err(ExportError::Render(RenderError::EmptyTarget { .. }))));
    }

    #[test]
    fn test_export_does_not_touch_design() {
        let (mut scene, design) = scene_with_shape();
        let rev = design.revision();
        let selection = design.selection().cloned();
        export_png(&mut scene, &mut SoftwareRenderer::new(), &small(), &ViewportSettings::default()).unwrap();
        assert_eq!(design.revision(), rev);
        assert_eq!(design.selection().cloned(), selection);
    }

    #[test]
    fn test_two_exports_identical() {
        let (mut scene, _design) = scene_with_shape();
        let mut renderer = SoftwareRenderer::new();
        let a = export_png(&mut scene, &mut renderer, &small(), &ViewportSettings::default()).unwrap();
        let b = export_png(&mut scene, &mut renderer, &small(), &ViewportSettings::default()).unwrap();
        assert_eq!(a.png, b.png);
    }

    #[test]
    fn test_opaque_background() {
        let (mut scene, _design) = scene_with_shape();
        let settings = ExportSettings {
            transparent_background: false,
            ..small()
        };
        let out = export_png(&mut scene, &mut SoftwareRenderer::new(), &settings, &ViewportSettings::default()).unwrap();
        let img = image::load_from_memory(&out.png).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(0, 0).0, [243, 244, 246, 255]);
    }
}
