pub mod design;
pub mod settings;

pub use design::DesignState;
pub use settings::{AppSettings, CameraSettings, ExportSettings, FontSettings, ViewportSettings};

/// Panel visibility flags
pub struct PanelVisibility {
    pub design_panel: bool,
    pub status_bar: bool,
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self {
            design_panel: true,
            status_bar: true,
        }
    }
}

/// Combined application state
pub struct AppState {
    pub design: DesignState,
    pub panels: PanelVisibility,
    pub settings: AppSettings,
    /// Show settings window
    pub show_settings_window: bool,
    /// Last status line message (export results, load errors)
    pub status: Option<String>,
    /// Export the active side on the next frame
    pub export_requested: bool,
}

impl AppState {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            design: DesignState::new(),
            panels: PanelVisibility::default(),
            settings,
            show_settings_window: false,
            status: None,
            export_requested: false,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppSettings::load())
    }
}
