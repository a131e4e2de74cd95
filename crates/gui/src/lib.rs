// Library crate: the design engine, testable without a window.
// GUI-specific modules (app, ui, GL viewport) remain in the binary crate.

pub mod catalog;
pub mod export;
pub mod fixtures;
pub mod harness;
pub mod interaction;
pub mod render;
pub mod scene;
pub mod state;
pub mod texture;

/// Camera, meshes and picking math shared by the scene and the GL viewport.
/// The egui viewport panel and GL renderer stay in the binary crate.
pub mod viewport {
    pub mod camera;
    pub mod mesh;
    pub mod picking;
}
