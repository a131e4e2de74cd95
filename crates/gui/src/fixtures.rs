//! Factory functions for creating test data.
//!
//! Provides helpers to construct overlays, designs and encoded pictures used in
//! tests and in the headless harness.

use std::io::Cursor;
use std::time::{Duration, Instant};

use image::{ImageFormat, Rgba, RgbaImage};
use shared::*;

use crate::scene::SceneManager;
use crate::state::DesignState;

// ── Pictures ────────────────────────────────────────────────────

/// Encode a solid-color PNG of the given size.
pub fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    match image.write_to(&mut out, ImageFormat::Png) {
        Ok(()) => out.into_inner(),
        Err(e) => {
            tracing::error!("PNG fixture encode failed: {e}");
            Vec::new()
        }
    }
}

/// Embedded solid-color picture source.
pub fn solid_png_source(width: u32, height: u32, rgba: [u8; 4]) -> ImageSource {
    ImageSource::Embedded {
        bytes: png_bytes(width, height, rgba).into(),
    }
}

// ── Overlay factories ───────────────────────────────────────────

/// Text overlay with the given content.
pub fn text_on(side: Side, content: &str) -> TextOverlay {
    TextOverlay::new(side).with_content(content)
}

/// Shape overlay in the default shape color.
pub fn shape_on(side: Side, shape: ShapeKind) -> ImageOverlay {
    ImageOverlay::new_shape(side, shape, crate::catalog::DEFAULT_SHAPE_COLOR)
}

/// Uploaded square picture of one solid color.
pub fn picture_on(side: Side, rgba: [u8; 4]) -> ImageOverlay {
    ImageOverlay::new_image(side, solid_png_source(8, 8, rgba), 1.0)
}

/// Shape overlay placed at a position.
pub fn shape_at(side: Side, shape: ShapeKind, position: [f32; 3]) -> ImageOverlay {
    let mut overlay = shape_on(side, shape);
    overlay.common.position = position;
    overlay
}

// ── Design factories ────────────────────────────────────────────

/// Design with one text and one shape on the front and one text on the back.
pub fn design_two_sides() -> DesignState {
    let mut design = DesignState::new();
    design.add_text(text_on(Side::Front, "FRONT"));
    design.add_image(shape_on(Side::Front, ShapeKind::Star));
    design.add_text(text_on(Side::Back, "BACK"));
    design.clear_selection();
    design
}

// ── Scene helpers ───────────────────────────────────────────────

/// Sync repeatedly until no picture load is pending. Returns false on timeout.
pub fn sync_until_loaded(scene: &mut SceneManager, design: &DesignState) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    scene.sync(design);
    while scene.pending_loads() > 0 {
        if Instant::now() > deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(2));
        scene.sync(design);
    }
    true
}
