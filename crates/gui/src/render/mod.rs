//! Frame renderers
//!
//! A renderer turns a `RenderFrame` into pixels. The software renderer lives
//! here; the GL renderer lives in the binary next to the egui viewport.

mod software;

use image::RgbaImage;
use thiserror::Error;

use crate::scene::frame::RenderFrame;
pub use software::SoftwareRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render target must not be empty ({width}x{height})")]
    EmptyTarget { width: u32, height: u32 },
    #[error("render backend failed: {0}")]
    Backend(String),
}

/// Anything that can draw a frame into an RGBA image (straight alpha)
pub trait FrameRenderer {
    fn render(&mut self, frame: &RenderFrame) -> Result<RgbaImage, RenderError>;
}
