//! Deterministic CPU rasterizer
//!
//! Used headless (tests, export without a GL context) and as the viewport
//! fallback. Colors are accumulated premultiplied and converted back to
//! straight alpha at the end.

use glam::{Mat4, Vec3, Vec4};
use image::{Rgba, RgbaImage};

use super::{FrameRenderer, RenderError};
use crate::scene::frame::{GarmentDraw, OverlayDraw, RenderFrame};
use crate::scene::lighting::Lighting;

#[derive(Debug, Default)]
pub struct SoftwareRenderer {
    color: Vec<[f32; 4]>,
    depth: Vec<f32>,
    width: u32,
    height: u32,
}

/// Vertex after projection
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    /// NDC depth in [-1, 1]
    z: f32,
    inv_w: f32,
}

impl SoftwareRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self, width: u32, height: u32, background: [f32; 4]) {
        let n = (width * height) as usize;
        let a = background[3].clamp(0.0, 1.0);
        let bg = [background[0] * a, background[1] * a, background[2] * a, a];
        self.width = width;
        self.height = height;
        self.color.clear();
        self.color.resize(n, bg);
        self.depth.clear();
        self.depth.resize(n, f32::INFINITY);
    }

    fn project(&self, view_proj: &Mat4, p: Vec3) -> Option<ScreenVertex> {
        let clip: Vec4 = *view_proj * p.extend(1.0);
        if clip.w <= 1e-5 {
            return None;
        }
        let inv_w = 1.0 / clip.w;
        let ndc = clip.truncate() * inv_w;
        Some(ScreenVertex {
            x: (ndc.x + 1.0) * 0.5 * self.width as f32,
            y: (1.0 - ndc.y) * 0.5 * self.height as f32,
            z: ndc.z,
            inv_w,
        })
    }

    // ── Garment ───────────────────────────────────────────────

    fn draw_garment(&mut self, frame: &RenderFrame, garment: &GarmentDraw) {
        let mesh = &garment.mesh;
        for tri in mesh.indices.chunks_exact(3) {
            let p = [mesh.position(tri[0]), mesh.position(tri[1]), mesh.position(tri[2])];
            let Some(v0) = self.project(&frame.view_proj, p[0]) else { continue };
            let Some(v1) = self.project(&frame.view_proj, p[1]) else { continue };
            let Some(v2) = self.project(&frame.view_proj, p[2]) else { continue };
            // Screen y points down, so front faces have negative signed area
            if edge(&v0, &v1, v2.x, v2.y) >= 0.0 {
                continue;
            }
            let centroid = (p[0] + p[1] + p[2]) / 3.0;
            let base = mul3(garment.color, mesh.color(tri[0]));
            let lit = shade(&frame.lighting, base, garment, mesh.normal(tri[0]), frame.eye - centroid);
            self.fill_opaque([v0, v1, v2], [lit[0], lit[1], lit[2], 1.0]);
        }
    }

    fn fill_opaque(&mut self, v: [ScreenVertex; 3], color: [f32; 4]) {
        let area = edge(&v[0], &v[1], v[2].x, v[2].y);
        if area.abs() < 1e-12 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.bounds(&v) else { return };
        for y in y0..y1 {
            for x in x0..x1 {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;
                let Some([b0, b1, b2]) = barycentric(&v, area, px, py) else { continue };
                let z = b0 * v[0].z + b1 * v[1].z + b2 * v[2].z;
                let idx = (y * self.width + x) as usize;
                if z < self.depth[idx] {
                    self.depth[idx] = z;
                    self.color[idx] = color;
                }
            }
        }
    }

    // ── Overlays ──────────────────────────────────────────────

    fn draw_overlay(&mut self, frame: &RenderFrame, overlay: &OverlayDraw) {
        let corners = overlay.corners();
        let mut projected = [None; 4];
        for (slot, (pos, _)) in projected.iter_mut().zip(corners.iter()) {
            *slot = self.project(&frame.view_proj, *pos);
        }
        let [Some(a), Some(b), Some(c), Some(d)] = projected else { return };
        let uv = [corners[0].1, corners[1].1, corners[2].1, corners[3].1];
        self.fill_textured([a, b, c], [uv[0], uv[1], uv[2]], overlay);
        self.fill_textured([a, c, d], [uv[0], uv[2], uv[3]], overlay);
    }

    /// Perspective-correct textured triangle, depth-tested, blended, no depth write
    fn fill_textured(&mut self, v: [ScreenVertex; 3], uv: [[f32; 2]; 3], overlay: &OverlayDraw) {
        let area = edge(&v[0], &v[1], v[2].x, v[2].y);
        if area.abs() < 1e-12 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.bounds(&v) else { return };
        for y in y0..y1 {
            for x in x0..x1 {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;
                let Some([b0, b1, b2]) = barycentric(&v, area, px, py) else { continue };
                let z = b0 * v[0].z + b1 * v[1].z + b2 * v[2].z;
                let idx = (y * self.width + x) as usize;
                if z >= self.depth[idx] {
                    continue;
                }
                let w0 = b0 * v[0].inv_w;
                let w1 = b1 * v[1].inv_w;
                let w2 = b2 * v[2].inv_w;
                let norm = w0 + w1 + w2;
                if norm <= 0.0 {
                    continue;
                }
                let u = (w0 * uv[0][0] + w1 * uv[1][0] + w2 * uv[2][0]) / norm;
                let t = (w0 * uv[0][1] + w1 * uv[1][1] + w2 * uv[2][1]) / norm;
                let src = sample_bilinear(&overlay.image, u, t);
                if src[3] <= 0.0 {
                    continue;
                }
                blend_over(&mut self.color[idx], src);
            }
        }
    }

    fn draw_outline(&mut self, overlay: &OverlayDraw, frame: &RenderFrame) {
        let corners = overlay.corners();
        let c = frame.outline_color;
        let color = [c[0] * c[3], c[1] * c[3], c[2] * c[3], c[3]];
        for i in 0..4 {
            let a = self.project(&frame.view_proj, corners[i].0);
            let b = self.project(&frame.view_proj, corners[(i + 1) % 4].0);
            if let (Some(a), Some(b)) = (a, b) {
                self.draw_line(a.x, a.y, b.x, b.y, color);
            }
        }
    }

    fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: [f32; 4]) {
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as u32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = (x0 + (x1 - x0) * t).floor();
            let y = (y0 + (y1 - y0) * t).floor();
            if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
                continue;
            }
            let idx = (y as u32 * self.width + x as u32) as usize;
            blend_over(&mut self.color[idx], color);
        }
    }

    /// Clamped pixel bounding box of a triangle
    fn bounds(&self, v: &[ScreenVertex; 3]) -> Option<(u32, u32, u32, u32)> {
        let min_x = v.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor().max(0.0);
        let min_y = v.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor().max(0.0);
        let max_x = v.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).ceil().min(self.width as f32);
        let max_y = v.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).ceil().min(self.height as f32);
        if min_x >= max_x || min_y >= max_y {
            return None;
        }
        Some((min_x as u32, min_y as u32, max_x as u32, max_y as u32))
    }

    fn finish(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.width, self.height);
        for (pixel, c) in out.pixels_mut().zip(&self.color) {
            let a = c[3].clamp(0.0, 1.0);
            let straight = |v: f32| {
                if a > 0.0 {
                    ((v / a).clamp(0.0, 1.0) * 255.0).round() as u8
                } else {
                    0
                }
            };
            *pixel = Rgba([straight(c[0]), straight(c[1]), straight(c[2]), (a * 255.0).round() as u8]);
        }
        out
    }
}

impl FrameRenderer for SoftwareRenderer {
    fn render(&mut self, frame: &RenderFrame) -> Result<RgbaImage, RenderError> {
        if frame.width == 0 || frame.height == 0 {
            return Err(RenderError::EmptyTarget {
                width: frame.width,
                height: frame.height,
            });
        }
        self.reset(frame.width, frame.height, frame.background);
        if let Some(garment) = &frame.garment {
            self.draw_garment(frame, garment);
        }
        for overlay in &frame.overlays {
            self.draw_overlay(frame, overlay);
        }
        if let Some(selected) = frame.selected() {
            self.draw_outline(selected, frame);
        }
        Ok(self.finish())
    }
}

// ── Helpers ──────────────────────────────────────────────────

fn edge(a: &ScreenVertex, b: &ScreenVertex, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

/// Barycentric weights of a pixel center, None when outside
fn barycentric(v: &[ScreenVertex; 3], area: f32, px: f32, py: f32) -> Option<[f32; 3]> {
    let b0 = edge(&v[1], &v[2], px, py) / area;
    let b1 = edge(&v[2], &v[0], px, py) / area;
    let b2 = edge(&v[0], &v[1], px, py) / area;
    if b0 < 0.0 || b1 < 0.0 || b2 < 0.0 {
        return None;
    }
    Some([b0, b1, b2])
}

fn mul3(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] * b[0], a[1] * b[1], a[2] * b[2]]
}

fn shade(lighting: &Lighting, base: [f32; 3], garment: &GarmentDraw, normal: Vec3, view_dir: Vec3) -> [f32; 3] {
    lighting.shade(base, &garment.material, normal, view_dir)
}

/// Bilinear sample, clamp-to-edge, returned premultiplied in 0..1
fn sample_bilinear(image: &RgbaImage, u: f32, v: f32) -> [f32; 4] {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return [0.0; 4];
    }
    let x = (u * w as f32 - 0.5).clamp(0.0, (w - 1) as f32);
    let y = (v * h as f32 - 0.5).clamp(0.0, (h - 1) as f32);
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let texel = |tx: u32, ty: u32| -> [f32; 4] {
        let p = image.get_pixel(tx, ty).0;
        let a = p[3] as f32 / 255.0;
        [
            p[0] as f32 / 255.0 * a,
            p[1] as f32 / 255.0 * a,
            p[2] as f32 / 255.0 * a,
            a,
        ]
    };
    let (t00, t10, t01, t11) = (texel(x0, y0), texel(x1, y0), texel(x0, y1), texel(x1, y1));
    let mut out = [0.0; 4];
    for c in 0..4 {
        let top = t00[c] + (t10[c] - t00[c]) * fx;
        let bottom = t01[c] + (t11[c] - t01[c]) * fx;
        out[c] = top + (bottom - top) * fy;
    }
    out
}

/// Premultiplied source-over
fn blend_over(dst: &mut [f32; 4], src: [f32; 4]) {
    let k = 1.0 - src[3];
    for c in 0..4 {
        dst[c] = src[c] + dst[c] * k;
    }
}
