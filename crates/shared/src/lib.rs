use serde::{Deserialize, Serialize};

mod color;
mod source;

pub use color::Rgb;
pub use source::{EmbeddedBytes, ImageSource, ShapeKind};

/// Unique overlay identifier (random UUID v4)
pub type OverlayId = String;

/// Generate a fresh collision-resistant overlay id
pub fn new_overlay_id() -> OverlayId {
    uuid::Uuid::new_v4().to_string()
}

/// Garment face an overlay is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    Front,
    Back,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Back => "back",
        }
    }

    /// Depth at which new overlays are placed, just outside the garment face
    pub fn default_depth(self) -> f32 {
        match self {
            Side::Front => 0.11,
            Side::Back => -0.11,
        }
    }
}

/// Garment fabric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    #[default]
    Cotton,
    Wool,
    Polyester,
    Silk,
    Nylon,
}

impl MaterialKind {
    pub fn all() -> &'static [MaterialKind] {
        &[
            MaterialKind::Cotton,
            MaterialKind::Wool,
            MaterialKind::Polyester,
            MaterialKind::Silk,
            MaterialKind::Nylon,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
}

/// Which overlay sequence an id lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    Text,
    Image,
}

/// Reference to one overlay: id plus the sequence it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayRef {
    pub id: OverlayId,
    pub kind: OverlayKind,
}

impl OverlayRef {
    pub fn text(id: impl Into<OverlayId>) -> Self {
        Self { id: id.into(), kind: OverlayKind::Text }
    }

    pub fn image(id: impl Into<OverlayId>) -> Self {
        Self { id: id.into(), kind: OverlayKind::Image }
    }
}

/// Fields every overlay carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayCommon {
    pub id: OverlayId,
    /// Garment-local position (x, y, z)
    pub position: [f32; 3],
    /// Degrees about the view axis, kept in [0, 360)
    pub rotation: f32,
    /// Horizontal flip
    #[serde(default)]
    pub mirrored: bool,
    pub side: Side,
}

impl OverlayCommon {
    pub fn new(side: Side) -> Self {
        Self {
            id: new_overlay_id(),
            position: [0.0, 0.0, side.default_depth()],
            rotation: 0.0,
            mirrored: false,
            side,
        }
    }

    /// Set rotation in degrees, wrapping into [0, 360)
    pub fn set_rotation(&mut self, degrees: f32) {
        let wrapped = degrees.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs
        self.rotation = if wrapped >= 360.0 { 0.0 } else { wrapped };
    }
}

/// Text placed on the garment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOverlay {
    #[serde(flatten)]
    pub common: OverlayCommon,
    pub content: String,
    pub font_family: String,
    /// Garment units; the rendered plane is `font_size * 4` wide
    pub font_size: f32,
    pub color: Rgb,
    #[serde(default)]
    pub weight: FontWeight,
    #[serde(default)]
    pub style: FontStyle,
    #[serde(default)]
    pub decoration: TextDecoration,
}

impl TextOverlay {
    pub fn new(side: Side) -> Self {
        Self {
            common: OverlayCommon::new(side),
            content: "New Text".to_string(),
            font_family: "Arial".to_string(),
            font_size: 0.3,
            color: Rgb::BLACK,
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
            decoration: TextDecoration::None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

/// Uploaded image or generated shape placed on the garment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageOverlay {
    #[serde(flatten)]
    pub common: OverlayCommon,
    pub source: ImageSource,
    pub width: f32,
    pub height: f32,
    /// Width / height of the source, used by callers that lock proportions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f32>,
}

impl ImageOverlay {
    /// Uploaded picture: one unit wide, height from the aspect ratio
    pub fn new_image(side: Side, source: ImageSource, aspect_ratio: f32) -> Self {
        let aspect = if aspect_ratio > 0.0 { aspect_ratio } else { 1.0 };
        Self {
            common: OverlayCommon::new(side),
            source,
            width: 1.0,
            height: 1.0 / aspect,
            aspect_ratio: Some(aspect),
        }
    }

    pub fn new_shape(side: Side, shape: ShapeKind, color: Rgb) -> Self {
        Self {
            common: OverlayCommon::new(side),
            source: ImageSource::Shape { shape, color },
            width: 0.8,
            height: 0.8,
            aspect_ratio: Some(1.0),
        }
    }
}

/// Borrowed view over either overlay variant
#[derive(Debug, Clone, Copy)]
pub enum OverlayView<'a> {
    Text(&'a TextOverlay),
    Image(&'a ImageOverlay),
}

impl<'a> OverlayView<'a> {
    pub fn common(&self) -> &'a OverlayCommon {
        match self {
            OverlayView::Text(t) => &t.common,
            OverlayView::Image(i) => &i.common,
        }
    }

    pub fn kind(&self) -> OverlayKind {
        match self {
            OverlayView::Text(_) => OverlayKind::Text,
            OverlayView::Image(_) => OverlayKind::Image,
        }
    }

    pub fn id(&self) -> &'a OverlayId {
        &self.common().id
    }

    pub fn to_ref(&self) -> OverlayRef {
        OverlayRef { id: self.id().clone(), kind: self.kind() }
    }
}

/// Complete serializable design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignDocument {
    pub garment_color: Rgb,
    #[serde(default)]
    pub material: MaterialKind,
    #[serde(default)]
    pub current_side: Side,
    #[serde(default)]
    pub text_overlays: Vec<TextOverlay>,
    #[serde(default)]
    pub image_overlays: Vec<ImageOverlay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<OverlayRef>,
}

impl Default for DesignDocument {
    fn default() -> Self {
        Self {
            garment_color: Rgb::WHITE,
            material: MaterialKind::Cotton,
            current_side: Side::Front,
            text_overlays: Vec::new(),
            image_overlays: Vec::new(),
            selection: None,
        }
    }
}

impl DesignDocument {
    /// All overlays in stable order: text first, then images
    pub fn overlays(&self) -> impl Iterator<Item = OverlayView<'_>> {
        self.text_overlays
            .iter()
            .map(OverlayView::Text)
            .chain(self.image_overlays.iter().map(OverlayView::Image))
    }

    pub fn find(&self, overlay: &OverlayRef) -> Option<OverlayView<'_>> {
        match overlay.kind {
            OverlayKind::Text => self
                .text_overlays
                .iter()
                .find(|t| t.common.id == overlay.id)
                .map(OverlayView::Text),
            OverlayKind::Image => self
                .image_overlays
                .iter()
                .find(|i| i.common.id == overlay.id)
                .map(OverlayView::Image),
        }
    }

    pub fn common_mut(&mut self, overlay: &OverlayRef) -> Option<&mut OverlayCommon> {
        match overlay.kind {
            OverlayKind::Text => self
                .text_overlays
                .iter_mut()
                .find(|t| t.common.id == overlay.id)
                .map(|t| &mut t.common),
            OverlayKind::Image => self
                .image_overlays
                .iter_mut()
                .find(|i| i.common.id == overlay.id)
                .map(|i| &mut i.common),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = TextOverlay::new(Side::Front);
        let b = TextOverlay::new(Side::Front);
        assert_ne!(a.common.id, b.common.id);
    }

    #[test]
    fn test_default_depth_by_side() {
        assert_eq!(OverlayCommon::new(Side::Front).position[2], 0.11);
        assert_eq!(OverlayCommon::new(Side::Back).position[2], -0.11);
    }

    #[test]
    fn test_rotation_wraps() {
        let mut c = OverlayCommon::new(Side::Front);
        c.set_rotation(370.0);
        assert!((c.rotation - 10.0).abs() < 1e-4);
        c.set_rotation(-90.0);
        assert!((c.rotation - 270.0).abs() < 1e-4);
        c.set_rotation(360.0);
        assert_eq!(c.rotation, 0.0);
    }

    #[test]
    fn test_image_height_from_aspect() {
        let img = ImageOverlay::new_image(
            Side::Front,
            ImageSource::File { path: "a.png".into() },
            2.0,
        );
        assert_eq!(img.width, 1.0);
        assert_eq!(img.height, 0.5);
    }

    #[test]
    fn test_overlays_order_text_then_image() {
        let mut doc = DesignDocument::default();
        doc.image_overlays
            .push(ImageOverlay::new_shape(Side::Front, ShapeKind::Circle, Rgb::BLACK));
        doc.text_overlays.push(TextOverlay::new(Side::Front));
        let kinds: Vec<OverlayKind> = doc.overlays().map(|o| o.kind()).collect();
        assert_eq!(kinds, vec![OverlayKind::Text, OverlayKind::Image]);
    }

    #[test]
    fn test_document_json_roundtrip_keeps_flattened_fields() {
        let mut doc = DesignDocument::default();
        let text = TextOverlay::new(Side::Back).with_content("HELLO");
        let id = text.common.id.clone();
        doc.text_overlays.push(text);
        doc.selection = Some(OverlayRef::text(id.clone()));

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["text_overlays"][0]["id"], id.as_str());
        assert_eq!(json["text_overlays"][0]["side"], "back");
        assert_eq!(json["garment_color"], "#ffffff");

        let back: DesignDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_find_respects_kind() {
        let mut doc = DesignDocument::default();
        let text = TextOverlay::new(Side::Front);
        let id = text.common.id.clone();
        doc.text_overlays.push(text);
        assert!(doc.find(&OverlayRef::text(id.clone())).is_some());
        assert!(doc.find(&OverlayRef::image(id)).is_none());
    }
}
