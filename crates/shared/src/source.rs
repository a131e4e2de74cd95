use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Rgb;

/// Vector shapes offered by the shapes palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Circle,
    Square,
    Triangle,
    Star,
    Heart,
    Hexagon,
}

impl ShapeKind {
    pub fn all() -> &'static [ShapeKind] {
        &[
            ShapeKind::Circle,
            ShapeKind::Square,
            ShapeKind::Triangle,
            ShapeKind::Star,
            ShapeKind::Heart,
            ShapeKind::Hexagon,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Circle => "Circle",
            ShapeKind::Square => "Square",
            ShapeKind::Triangle => "Triangle",
            ShapeKind::Star => "Star",
            ShapeKind::Heart => "Heart",
            ShapeKind::Hexagon => "Hexagon",
        }
    }
}

/// Encoded picture bytes with their content hash taken once on creation
#[derive(Debug, Clone)]
pub struct EmbeddedBytes {
    bytes: Arc<[u8]>,
    key: u64,
}

impl EmbeddedBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        bytes.hash(&mut hasher);
        Self {
            bytes: bytes.into(),
            key: hasher.finish(),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Hash of the bytes
    pub fn key(&self) -> u64 {
        self.key
    }
}

impl From<Vec<u8>> for EmbeddedBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl Deref for EmbeddedBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl PartialEq for EmbeddedBytes {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.bytes == other.bytes
    }
}

impl Serialize for EmbeddedBytes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        base64_bytes::serialize(&self.bytes, serializer)
    }
}

impl<'de> Deserialize<'de> for EmbeddedBytes {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        base64_bytes::deserialize(deserializer).map(Self::new)
    }
}

/// Where an image overlay's pixels come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
    /// Encoded PNG/JPEG bytes kept inside the design
    Embedded { bytes: EmbeddedBytes },
    /// Image file on disk, decoded lazily
    File { path: PathBuf },
    /// Generated vector shape filled with a flat color
    Shape { shape: ShapeKind, color: Rgb },
}

impl ImageSource {
    /// Whether the bitmap has to be decoded asynchronously
    pub fn needs_decode(&self) -> bool {
        !matches!(self, ImageSource::Shape { .. })
    }

    /// Stable content key; changes whenever the pixels would change.
    /// Embedded bytes are not rehashed here.
    pub fn content_key(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        match self {
            ImageSource::Embedded { bytes } => {
                0u8.hash(&mut hasher);
                bytes.key().hash(&mut hasher);
            }
            ImageSource::File { path } => {
                1u8.hash(&mut hasher);
                path.hash(&mut hasher);
            }
            ImageSource::Shape { shape, color } => {
                2u8.hash(&mut hasher);
                shape.hash(&mut hasher);
                color.hash(&mut hasher);
            }
        }
        hasher.finish()
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_bytes_are_base64_in_json() {
        let src = ImageSource::Embedded { bytes: vec![1, 2, 3, 255].into() };
        let json = serde_json::to_value(&src).unwrap();
        assert_eq!(json["type"], "embedded");
        assert_eq!(json["bytes"], "AQID/w==");
        let back: ImageSource = serde_json::from_value(json).unwrap();
        assert_eq!(back, src);
    }

    #[test]
    fn test_content_key_tracks_color() {
        let a = ImageSource::Shape { shape: ShapeKind::Star, color: Rgb::BLACK };
        let b = ImageSource::Shape { shape: ShapeKind::Star, color: Rgb::WHITE };
        assert_ne!(a.content_key(), b.content_key());
        assert_eq!(a.content_key(), a.clone().content_key());
    }

    #[test]
    fn test_embedded_key_follows_bytes() {
        let a = EmbeddedBytes::new(vec![1, 2, 3]);
        let b = EmbeddedBytes::new(vec![1, 2, 4]);
        assert_eq!(a.key(), a.clone().key());
        assert_eq!(a.key(), EmbeddedBytes::new(vec![1, 2, 3]).key());
        assert_ne!(a.key(), b.key());
        assert_eq!(a.as_slice(), &[1, 2, 3]);

        let json = serde_json::to_string(&ImageSource::Embedded { bytes: a.clone() }).unwrap();
        let back: ImageSource = serde_json::from_str(&json).unwrap();
        assert_eq!(back.content_key(), ImageSource::Embedded { bytes: a }.content_key());
    }

    #[test]
    fn test_shapes_need_no_decode() {
        let shape = ImageSource::Shape { shape: ShapeKind::Heart, color: Rgb::BLACK };
        let file = ImageSource::File { path: "logo.png".into() };
        assert!(!shape.needs_decode());
        assert!(file.needs_decode());
    }
}
