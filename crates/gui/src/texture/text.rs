use ab_glyph::{point, Font, FontArc, Glyph, PxScale, ScaleFont};
use shared::{FontStyle, FontWeight, TextDecoration, TextOverlay};

use super::{Coverage, TEXT_PX_PER_UNIT};

/// Horizontal slant for synthetic italic
const ITALIC_SHEAR: f32 = 0.2;

/// Lay out and rasterize one line of text centered in `coverage`.
/// Mirroring is left to the caller.
pub(super) fn rasterize(coverage: &mut Coverage, font: &FontArc, overlay: &TextOverlay) {
    let px = overlay.font_size.max(0.0) * TEXT_PX_PER_UNIT;
    if px <= 0.0 {
        return;
    }
    // ab_glyph scales by ascent-descent height; convert so `px` is the em size
    let scale = match font.units_per_em() {
        Some(upem) => PxScale::from(px * font.height_unscaled() / upem),
        None => PxScale::from(px),
    };
    let scaled = font.as_scaled(scale);

    let mut glyphs: Vec<Glyph> = Vec::new();
    let mut caret = 0.0f32;
    let mut prev = None;
    for c in overlay.content.chars().filter(|c| !c.is_control()) {
        let id = scaled.glyph_id(c);
        if let Some(p) = prev {
            caret += scaled.kern(p, id);
        }
        glyphs.push(id.with_scale_and_position(scale, point(caret, 0.0)));
        caret += scaled.h_advance(id);
        prev = Some(id);
    }
    let text_width = caret;

    let w = coverage.width() as f32;
    let h = coverage.height() as f32;
    let left = (w - text_width) / 2.0;
    // Center the em box vertically ("middle" baseline)
    let baseline = h / 2.0 + (scaled.ascent() + scaled.descent()) / 2.0;

    let mut ink = Coverage::new(coverage.width(), coverage.height());
    for mut glyph in glyphs {
        glyph.position = point(left + glyph.position.x, baseline);
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            let ox = bounds.min.x as i32;
            let oy = bounds.min.y as i32;
            outlined.draw(|x, y, c| ink.max_at(ox + x as i32, oy + y as i32, c));
        }
    }

    if overlay.style == FontStyle::Italic {
        ink.shear_horizontal(ITALIC_SHEAR, baseline);
    }
    if overlay.weight == FontWeight::Bold {
        ink.dilate_horizontal(((px / 24.0).round() as u32).max(1));
    }

    for y in 0..ink.height() {
        for x in 0..ink.width() {
            let c = ink.get(x, y);
            if c > 0.0 {
                coverage.max_at(x as i32, y as i32, c);
            }
        }
    }

    if overlay.decoration == TextDecoration::Underline && text_width > 0.0 {
        let center = h / 2.0 + overlay.font_size * TEXT_PX_PER_UNIT / 2.0;
        let half = overlay.font_size * 10.0 / 2.0;
        coverage.fill_rect(left, center - half, left + text_width, center + half);
    }
}
