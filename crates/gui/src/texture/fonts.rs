//! Font lookup by CSS-style family name
//!
//! Only egui's bundled fonts ship with the app. Monospace family names map to
//! the bundled monospace face, everything else to the proportional face.
//! Users can register real font files per family in the settings.

use std::collections::HashMap;
use std::path::Path;

use ab_glyph::FontArc;

use crate::state::settings::FontSettings;

/// Family names rendered with the monospace face
const MONOSPACE_FAMILIES: [&str; 5] = ["courier new", "courier", "consolas", "monospace", "hack"];

/// Resolves family names to loaded fonts
pub struct FontBook {
    proportional: Option<FontArc>,
    monospace: Option<FontArc>,
    /// Lowercased family name → font
    registered: HashMap<String, FontArc>,
}

impl FontBook {
    /// Bundled fonts only
    pub fn new() -> Self {
        let defs = egui::FontDefinitions::default();
        let load = |family: egui::FontFamily| -> Option<FontArc> {
            let name = defs.families.get(&family)?.first()?;
            let data = defs.font_data.get(name)?;
            match FontArc::try_from_vec(data.font.to_vec()) {
                Ok(font) => Some(font),
                Err(e) => {
                    tracing::warn!("Bundled font '{name}' failed to parse: {e}");
                    None
                }
            }
        };
        Self {
            proportional: load(egui::FontFamily::Proportional),
            monospace: load(egui::FontFamily::Monospace),
            registered: HashMap::new(),
        }
    }

    /// Bundled fonts plus every family listed in the settings
    pub fn with_settings(settings: &FontSettings) -> Self {
        let mut book = Self::new();
        for (family, path) in &settings.families {
            if let Err(e) = book.register_file(family, path) {
                tracing::warn!("Font '{family}' not loaded: {e}");
            }
        }
        book
    }

    /// Register a font file under a family name
    pub fn register_file(&mut self, family: &str, path: &Path) -> Result<(), String> {
        let bytes = std::fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
        self.register_bytes(family, bytes)
    }

    /// Register in-memory TTF/OTF bytes under a family name
    pub fn register_bytes(&mut self, family: &str, bytes: Vec<u8>) -> Result<(), String> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| e.to_string())?;
        self.registered.insert(family.trim().to_lowercase(), font);
        Ok(())
    }

    pub fn is_registered(&self, family: &str) -> bool {
        self.registered.contains_key(&family.trim().to_lowercase())
    }

    /// Font for a family name; falls back to the bundled faces
    pub fn resolve(&self, family: &str) -> Option<&FontArc> {
        let key = family.trim().to_lowercase();
        if let Some(font) = self.registered.get(&key) {
            return Some(font);
        }
        if MONOSPACE_FAMILIES.contains(&key.as_str()) {
            self.monospace.as_ref().or(self.proportional.as_ref())
        } else {
            self.proportional.as_ref().or(self.monospace.as_ref())
        }
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use ab_glyph::Font;

    use super::*;

    #[test]
    fn test_bundled_fonts_resolve() {
        let book = FontBook::new();
        assert!(book.resolve("Arial").is_some());
        assert!(book.resolve("Courier New").is_some());
        assert!(book.resolve("Some Unknown Family").is_some());
    }

    #[test]
    fn test_monospace_family_uses_monospace_face() {
        let book = FontBook::new();
        let mono = book.resolve("courier new").unwrap();
        let prop = book.resolve("Arial").unwrap();
        let adv = |f: &FontArc, c: char| f.h_advance_unscaled(f.glyph_id(c));
        // Monospace: 'i' and 'W' advance the same
        assert_eq!(adv(mono, 'i'), adv(mono, 'W'));
        assert_ne!(adv(prop, 'i'), adv(prop, 'W'));
    }

    #[test]
    fn test_register_rejects_garbage() {
        let mut book = FontBook::new();
        assert!(book.register_bytes("Broken", vec![0, 1, 2, 3]).is_err());
        assert!(!book.is_registered("Broken"));
    }

    #[test]
    fn test_missing_font_file_is_error() {
        let mut book = FontBook::new();
        let err = book
            .register_file("Nope", Path::new("/definitely/not/here.ttf"))
            .unwrap_err();
        assert!(err.contains("here.ttf"));
    }
}
