mod app;
mod ui;
mod viewport;

// Re-export library modules so that `crate::scene`, `crate::state`, etc.
// resolve to the lib crate types everywhere in the binary.
pub use tee_designer_lib::catalog;
pub use tee_designer_lib::export;
pub use tee_designer_lib::interaction;
pub use tee_designer_lib::render;
pub use tee_designer_lib::scene;
pub use tee_designer_lib::state;

use app::DesignerApp;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tee_designer=info,tee_designer_lib=info".into()),
        )
        .init();

    // Parse --design <path> argument
    let initial_design = parse_design_arg();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Tee Designer")
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "tee-designer",
        native_options,
        Box::new(move |cc| Ok(Box::new(DesignerApp::new(cc, initial_design)?))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

fn parse_design_arg() -> Option<shared::DesignDocument> {
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--design" && i + 1 < args.len() {
            let path = &args[i + 1];
            match std::fs::read_to_string(path) {
                Ok(json) => match serde_json::from_str::<shared::DesignDocument>(&json) {
                    Ok(doc) => {
                        tracing::info!(
                            "Loaded design from {path} ({} overlays)",
                            doc.text_overlays.len() + doc.image_overlays.len()
                        );
                        return Some(doc);
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse design JSON from {path}: {e}");
                    }
                },
                Err(e) => {
                    tracing::error!("Failed to read design file {path}: {e}");
                }
            }
            break;
        }
        i += 1;
    }
    None
}
