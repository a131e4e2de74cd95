//! Application settings

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Viewport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportSettings {
    /// Background color RGB
    pub background_color: [u8; 3],
    /// Selection outline color RGB
    pub selection_color: [u8; 3],
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            background_color: [243, 244, 246],
            selection_color: [0x0e, 0xa5, 0xe9],
        }
    }
}

/// Orbit camera settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Initial eye distance from the garment
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 50.0,
            distance: 5.0,
            min_distance: 3.0,
            max_distance: 10.0,
        }
    }
}

/// Still-image export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    pub width: u32,
    pub height: u32,
    /// Export with a transparent background instead of the viewport color
    pub transparent_background: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            width: 2048,
            height: 2048,
            transparent_background: true,
        }
    }
}

/// Extra font files, keyed by family name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontSettings {
    #[serde(default)]
    pub families: BTreeMap<String, PathBuf>,
}

/// All application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    /// Viewport settings
    #[serde(default)]
    pub viewport: ViewportSettings,
    /// Camera settings
    #[serde(default)]
    pub camera: CameraSettings,
    /// Export settings
    #[serde(default)]
    pub export: ExportSettings,
    /// Font settings
    #[serde(default)]
    pub fonts: FontSettings,
}

impl AppSettings {
    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        if let Some(dirs) = directories::ProjectDirs::from("com", "teedesigner", "tee-designer") {
            let config_path = dirs.config_dir().join("settings.json");
            if let Ok(json) = std::fs::read_to_string(&config_path) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    return settings;
                }
            }
        }
        Self::default()
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(dirs) = directories::ProjectDirs::from("com", "teedesigner", "tee-designer") {
            let config_dir = dirs.config_dir();
            if std::fs::create_dir_all(config_dir).is_ok() {
                let config_path = config_dir.join("settings.json");
                if let Ok(json) = serde_json::to_string_pretty(self) {
                    let _ = std::fs::write(config_path, json);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = AppSettings::default();
        assert_eq!(s.export.width, 2048);
        assert_eq!(s.export.height, 2048);
        assert!(s.export.transparent_background);
        assert_eq!(s.viewport.selection_color, [0x0e, 0xa5, 0xe9]);
        assert_eq!(s.camera.min_distance, 3.0);
        assert_eq!(s.camera.max_distance, 10.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s: AppSettings = serde_json::from_str(r#"{"export":{"width":512,"height":256,"transparent_background":false}}"#).unwrap();
        assert_eq!(s.export.width, 512);
        assert!(!s.export.transparent_background);
        assert_eq!(s.camera.fov_degrees, 50.0);
        assert!(s.fonts.families.is_empty());
    }
}
