//! Overlay texture generation
//!
//! Text and shape overlays are rasterized on the CPU into straight-alpha
//! RGBA bitmaps of a fixed size. Uploaded pictures are only downscaled.

pub mod fonts;
mod shape;
mod text;

use image::{imageops, Rgba, RgbaImage};
use shared::{Rgb, ShapeKind, TextOverlay};

use crate::state::settings::FontSettings;
pub use fonts::FontBook;

/// Text bitmap size (2:1, matches the `font_size*4 × font_size*2` plane)
pub const TEXT_TEXTURE_WIDTH: u32 = 512;
pub const TEXT_TEXTURE_HEIGHT: u32 = 256;

/// Shape bitmap edge length
pub const SHAPE_TEXTURE_SIZE: u32 = 200;

/// Font pixels per garment unit of `font_size`
pub const TEXT_PX_PER_UNIT: f32 = 200.0;

/// Longest edge a decoded picture is kept at
pub const MAX_IMAGE_EDGE: u32 = 1024;

/// Rasterizes overlay specs into bitmaps
pub struct TextureGenerator {
    fonts: FontBook,
}

impl TextureGenerator {
    pub fn new(settings: &FontSettings) -> Self {
        Self {
            fonts: FontBook::with_settings(settings),
        }
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    /// Render a text overlay into a 512 × 256 bitmap
    pub fn text_bitmap(&self, overlay: &TextOverlay) -> RgbaImage {
        let font = self.fonts.resolve(&overlay.font_family);
        let mut coverage = Coverage::new(TEXT_TEXTURE_WIDTH, TEXT_TEXTURE_HEIGHT);
        if let Some(font) = font {
            text::rasterize(&mut coverage, font, overlay);
        } else {
            tracing::warn!("No font available for '{}'", overlay.font_family);
        }
        if overlay.common.mirrored {
            coverage.flip_horizontal();
        }
        coverage.to_rgba(overlay.color)
    }

    /// Render a filled shape into a 200 × 200 bitmap
    pub fn shape_bitmap(&self, shape: ShapeKind, color: Rgb) -> RgbaImage {
        let mut coverage = Coverage::new(SHAPE_TEXTURE_SIZE, SHAPE_TEXTURE_SIZE);
        let scale = SHAPE_TEXTURE_SIZE as f64 / shape::VIEW_BOX;
        let path = kurbo::Affine::scale(scale) * shape::path(shape);
        coverage.fill_path(&path);
        coverage.to_rgba(color)
    }
}

/// Downscale a decoded picture so its long edge fits `MAX_IMAGE_EDGE`
pub fn fit_to_envelope(image: RgbaImage) -> RgbaImage {
    let (w, h) = image.dimensions();
    let long = w.max(h);
    if long <= MAX_IMAGE_EDGE {
        return image;
    }
    let scale = MAX_IMAGE_EDGE as f32 / long as f32;
    let nw = ((w as f32 * scale).round() as u32).max(1);
    let nh = ((h as f32 * scale).round() as u32).max(1);
    imageops::resize(&image, nw, nh, imageops::FilterType::Triangle)
}

// ── Coverage buffer ───────────────────────────────────────────

/// Single-channel coverage in [0, 1], row-major
#[derive(Debug, Clone)]
pub(crate) struct Coverage {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

/// Sub-scanlines per pixel row for path filling
const SUBSAMPLES: usize = 4;

impl Coverage {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; (width * height) as usize],
        }
    }

    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }

    /// Max-composite a coverage sample; out-of-bounds writes are dropped
    pub(crate) fn max_at(&mut self, x: i32, y: i32, value: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as u32 * self.width + x as u32) as usize;
        let v = value.clamp(0.0, 1.0);
        if v > self.data[idx] {
            self.data[idx] = v;
        }
    }

    /// Add horizontal span coverage `[x0, x1)` on row `y`, weighted
    fn add_span(&mut self, y: u32, x0: f64, x1: f64, weight: f32) {
        let x0 = x0.max(0.0);
        let x1 = x1.min(self.width as f64);
        if x1 <= x0 {
            return;
        }
        let row = (y * self.width) as usize;
        let first = x0.floor() as u32;
        let last = (x1.ceil() as u32).min(self.width);
        for px in first..last {
            let left = (px as f64).max(x0);
            let right = ((px + 1) as f64).min(x1);
            if right > left {
                let cell = &mut self.data[row + px as usize];
                *cell = (*cell + (right - left) as f32 * weight).min(1.0);
            }
        }
    }

    /// Fill a closed path with non-zero winding and anti-aliased edges
    pub(crate) fn fill_path(&mut self, path: &kurbo::BezPath) {
        let edges = flatten_edges(path);
        if edges.is_empty() {
            return;
        }
        let weight = 1.0 / SUBSAMPLES as f32;
        let mut crossings: Vec<(f64, i32)> = Vec::new();
        for y in 0..self.height {
            for s in 0..SUBSAMPLES {
                let sy = y as f64 + (s as f64 + 0.5) / SUBSAMPLES as f64;
                crossings.clear();
                for e in &edges {
                    if let Some(c) = e.crossing(sy) {
                        crossings.push(c);
                    }
                }
                if crossings.is_empty() {
                    continue;
                }
                crossings.sort_by(|a, b| a.0.total_cmp(&b.0));
                let mut winding = 0;
                let mut span_start = 0.0;
                for &(x, dir) in &crossings {
                    let was_inside = winding != 0;
                    winding += dir;
                    let inside = winding != 0;
                    if !was_inside && inside {
                        span_start = x;
                    } else if was_inside && !inside {
                        self.add_span(y, span_start, x, weight);
                    }
                }
            }
        }
    }

    /// Fill an axis-aligned rectangle with fractional edge coverage
    pub(crate) fn fill_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) {
        let top = y0.max(0.0);
        let bottom = y1.min(self.height as f32);
        if bottom <= top {
            return;
        }
        for y in top.floor() as u32..(bottom.ceil() as u32).min(self.height) {
            let v = (bottom.min(y as f32 + 1.0) - top.max(y as f32)).clamp(0.0, 1.0);
            if v > 0.0 {
                self.add_span(y, x0 as f64, x1 as f64, v);
            }
        }
    }

    /// Mirror left ↔ right
    pub(crate) fn flip_horizontal(&mut self) {
        let w = self.width as usize;
        for row in self.data.chunks_mut(w) {
            row.reverse();
        }
    }

    /// Grow coverage to the right by `radius` pixels (synthetic bold)
    pub(crate) fn dilate_horizontal(&mut self, radius: u32) {
        if radius == 0 {
            return;
        }
        let w = self.width as usize;
        let r = radius as usize;
        for row in self.data.chunks_mut(w) {
            let src = row.to_vec();
            for x in 0..w {
                let from = x.saturating_sub(r);
                row[x] = src[from..=x].iter().copied().fold(0.0, f32::max);
            }
        }
    }

    /// Slant rows about `pivot_y`: rows above shift right by `shear * dy`
    pub(crate) fn shear_horizontal(&mut self, shear: f32, pivot_y: f32) {
        let w = self.width as usize;
        for (y, row) in self.data.chunks_mut(w).enumerate() {
            let shift = shear * (pivot_y - (y as f32 + 0.5));
            if shift.abs() < 1e-3 {
                continue;
            }
            let src = row.to_vec();
            for (x, cell) in row.iter_mut().enumerate() {
                let sx = x as f32 - shift;
                let x0 = sx.floor();
                let t = sx - x0;
                let sample = |i: f32| -> f32 {
                    if i < 0.0 || i >= w as f32 {
                        0.0
                    } else {
                        src[i as usize]
                    }
                };
                *cell = sample(x0) * (1.0 - t) + sample(x0 + 1.0) * t;
            }
        }
    }

    /// Straight-alpha RGBA; fully transparent pixels keep the fill color
    pub(crate) fn to_rgba(&self, color: Rgb) -> RgbaImage {
        let [r, g, b] = color.0;
        let mut out = RgbaImage::new(self.width, self.height);
        for (pixel, &c) in out.pixels_mut().zip(&self.data) {
            let a = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
            *pixel = Rgba([r, g, b, a]);
        }
        out
    }
}

/// Line segment with winding direction, y0 < y1
#[derive(Debug, Clone, Copy)]
struct Edge {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    dir: i32,
}

impl Edge {
    fn new(a: kurbo::Point, b: kurbo::Point) -> Option<Self> {
        if (a.y - b.y).abs() < f64::EPSILON {
            return None;
        }
        Some(if a.y < b.y {
            Edge { x0: a.x, y0: a.y, x1: b.x, y1: b.y, dir: 1 }
        } else {
            Edge { x0: b.x, y0: b.y, x1: a.x, y1: a.y, dir: -1 }
        })
    }

    /// X where the scanline crosses this edge (half-open in y)
    fn crossing(&self, y: f64) -> Option<(f64, i32)> {
        if y < self.y0 || y >= self.y1 {
            return None;
        }
        let t = (y - self.y0) / (self.y1 - self.y0);
        Some((self.x0 + t * (self.x1 - self.x0), self.dir))
    }
}

fn flatten_edges(path: &kurbo::BezPath) -> Vec<Edge> {
    let mut edges = Vec::new();
    let mut start = kurbo::Point::ZERO;
    let mut current = kurbo::Point::ZERO;
    kurbo::flatten(path.iter(), 0.05, |el| match el {
        kurbo::PathEl::MoveTo(p) => {
            if current != start {
                edges.extend(Edge::new(current, start));
            }
            start = p;
            current = p;
        }
        kurbo::PathEl::LineTo(p) => {
            edges.extend(Edge::new(current, p));
            current = p;
        }
        kurbo::PathEl::ClosePath => {
            edges.extend(Edge::new(current, start));
            current = start;
        }
        // flatten only emits the three variants above
        _ => {}
    });
    if current != start {
        edges.extend(Edge::new(current, start));
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(c: &Coverage) -> f32 {
        c.data.iter().sum()
    }

    #[test]
    fn test_fill_rect_path_area() {
        let mut c = Coverage::new(20, 20);
        let rect = kurbo::Rect::new(2.0, 2.0, 12.0, 7.0);
        c.fill_path(&kurbo::Shape::to_path(&rect, 0.1));
        assert!((total(&c) - 50.0).abs() < 0.5);
        assert_eq!(c.get(5, 5), 1.0);
        assert_eq!(c.get(15, 15), 0.0);
    }

    #[test]
    fn test_fractional_edges() {
        let mut c = Coverage::new(10, 4);
        c.fill_rect(1.5, 0.0, 3.0, 4.0);
        assert!((c.get(1, 1) - 0.5).abs() < 1e-5);
        assert!((c.get(2, 1) - 1.0).abs() < 1e-5);
        assert_eq!(c.get(3, 1), 0.0);
    }

    #[test]
    fn test_flip_horizontal() {
        let mut c = Coverage::new(4, 1);
        c.max_at(0, 0, 1.0);
        c.flip_horizontal();
        assert_eq!(c.get(3, 0), 1.0);
        assert_eq!(c.get(0, 0), 0.0);
    }

    #[test]
    fn test_dilate_widens() {
        let mut c = Coverage::new(6, 1);
        c.max_at(1, 0, 1.0);
        c.dilate_horizontal(2);
        assert_eq!(c.get(3, 0), 1.0);
        assert_eq!(c.get(4, 0), 0.0);
        assert_eq!(c.get(0, 0), 0.0);
    }

    #[test]
    fn test_rgba_is_straight_alpha() {
        let mut c = Coverage::new(2, 1);
        c.max_at(0, 0, 0.5);
        let img = c.to_rgba(Rgb::new(200, 100, 50));
        assert_eq!(img.get_pixel(0, 0).0, [200, 100, 50, 128]);
        assert_eq!(img.get_pixel(1, 0).0, [200, 100, 50, 0]);
    }

    #[test]
    fn test_fit_to_envelope() {
        let big = RgbaImage::new(2048, 512);
        let small = fit_to_envelope(big);
        assert_eq!(small.dimensions(), (1024, 256));
        let tiny = fit_to_envelope(RgbaImage::new(10, 20));
        assert_eq!(tiny.dimensions(), (10, 20));
    }

    #[test]
    fn test_shape_bitmap_size_and_color() {
        let gen = TextureGenerator::new(&FontSettings::default());
        let img = gen.shape_bitmap(ShapeKind::Square, Rgb::new(59, 130, 246));
        assert_eq!(img.dimensions(), (SHAPE_TEXTURE_SIZE, SHAPE_TEXTURE_SIZE));
        // Square covers 10..90 of the 100 unit view box
        assert_eq!(img.get_pixel(100, 100).0, [59, 130, 246, 255]);
        assert_eq!(img.get_pixel(5, 5).0[3], 0);
    }
}
