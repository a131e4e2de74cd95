//! Save / load / autosave of designs

use shared::DesignDocument;

use super::DesignState;

impl DesignState {
    /// Serialize the design as pretty JSON
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(&self.doc).map_err(|e| format!("JSON encode error: {e}"))
    }

    /// Parse a design from JSON
    pub fn from_json(json: &str) -> Result<Self, String> {
        let doc: DesignDocument =
            serde_json::from_str(json).map_err(|e| format!("JSON parse error: {e}"))?;
        Ok(Self::from_document(doc))
    }

    fn autosave_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("com", "teedesigner", "tee-designer")
            .map(|dirs| dirs.data_dir().join("autosave.json"))
    }

    /// Save design to the autosave file
    pub fn autosave(&self) {
        if let Some(path) = Self::autosave_path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(json) = self.to_json() {
                if let Err(e) = std::fs::write(&path, json) {
                    tracing::warn!("Autosave to {} failed: {e}", path.display());
                }
            }
        }
    }

    /// Load the last autosaved design, if any
    pub fn load_autosave() -> Option<DesignDocument> {
        let path = Self::autosave_path()?;
        let json = std::fs::read_to_string(&path).ok()?;
        serde_json::from_str(&json).ok()
    }
}
