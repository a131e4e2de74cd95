//! Material catalog: fabric → shading parameters

use shared::{MaterialKind, Rgb};

/// Shading parameters for one fabric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub kind: MaterialKind,
    pub name: &'static str,
    pub description: &'static str,
    /// 0 = mirror-smooth, 1 = fully diffuse
    pub roughness: f32,
    /// 0 = dielectric, 1 = metal
    pub metalness: f32,
}

impl MaterialParams {
    /// Percentages shown in the material list ("Texture" / "Shine")
    pub fn texture_percent(&self) -> u32 {
        (self.roughness * 100.0).round() as u32
    }

    pub fn shine_percent(&self) -> u32 {
        (self.metalness * 100.0).round() as u32
    }
}

const CATALOG: [MaterialParams; 5] = [
    MaterialParams {
        kind: MaterialKind::Cotton,
        name: "Cotton",
        description: "Soft, breathable, and comfortable",
        roughness: 0.8,
        metalness: 0.0,
    },
    MaterialParams {
        kind: MaterialKind::Wool,
        name: "Wool",
        description: "Warm, textured, and cozy",
        roughness: 0.9,
        metalness: 0.0,
    },
    MaterialParams {
        kind: MaterialKind::Polyester,
        name: "Polyester",
        description: "Durable, wrinkle-resistant",
        roughness: 0.5,
        metalness: 0.1,
    },
    MaterialParams {
        kind: MaterialKind::Silk,
        name: "Silk",
        description: "Smooth, luxurious, and shiny",
        roughness: 0.2,
        metalness: 0.3,
    },
    MaterialParams {
        kind: MaterialKind::Nylon,
        name: "Nylon",
        description: "Strong, lightweight, and sleek",
        roughness: 0.4,
        metalness: 0.2,
    },
];

/// Look up the shading parameters for a fabric
pub fn material(kind: MaterialKind) -> &'static MaterialParams {
    match kind {
        MaterialKind::Cotton => &CATALOG[0],
        MaterialKind::Wool => &CATALOG[1],
        MaterialKind::Polyester => &CATALOG[2],
        MaterialKind::Silk => &CATALOG[3],
        MaterialKind::Nylon => &CATALOG[4],
    }
}

/// Every catalog entry, in display order
pub fn materials() -> &'static [MaterialParams] {
    &CATALOG
}

/// Garment color swatches offered next to the custom picker
pub const PRESET_COLORS: [Rgb; 12] = [
    Rgb::new(0xff, 0xff, 0xff),
    Rgb::new(0x1e, 0x1e, 0x1e),
    Rgb::new(0xd2, 0x2b, 0x2b),
    Rgb::new(0x2b, 0x65, 0xd2),
    Rgb::new(0x2b, 0xd2, 0x63),
    Rgb::new(0xd2, 0xd0, 0x2b),
    Rgb::new(0xb4, 0x2b, 0xd2),
    Rgb::new(0xd2, 0x78, 0x2b),
    Rgb::new(0x80, 0x80, 0x80),
    Rgb::new(0xf5, 0xa9, 0xb8),
    Rgb::new(0xad, 0xd8, 0xe6),
    Rgb::new(0x90, 0xee, 0x90),
];

/// Fonts offered in the text properties combo box
pub const FONT_FAMILIES: [&str; 8] = [
    "Arial",
    "Helvetica",
    "Times New Roman",
    "Georgia",
    "Courier New",
    "Verdana",
    "Impact",
    "Comic Sans MS",
];

/// Fill color for newly added shapes
pub const DEFAULT_SHAPE_COLOR: Rgb = Rgb::new(0x3b, 0x82, 0xf6);
