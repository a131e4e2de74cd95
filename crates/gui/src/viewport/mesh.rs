use glam::Vec3;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, r, g, b]
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// 9 floats per vertex: position(3) + normal(3) + color(3)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub const STRIDE: usize = 9;

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / Self::STRIDE
    }

    pub fn position(&self, index: u32) -> Vec3 {
        let b = index as usize * Self::STRIDE;
        Vec3::new(self.vertices[b], self.vertices[b + 1], self.vertices[b + 2])
    }

    pub fn normal(&self, index: u32) -> Vec3 {
        let b = index as usize * Self::STRIDE + 3;
        Vec3::new(self.vertices[b], self.vertices[b + 1], self.vertices[b + 2])
    }

    pub fn color(&self, index: u32) -> [f32; 3] {
        let b = index as usize * Self::STRIDE + 6;
        [self.vertices[b], self.vertices[b + 1], self.vertices[b + 2]]
    }
}

/// Textured quad mesh: interleaved [pos.x, pos.y, pos.z, u, v]
#[derive(Debug, Clone, PartialEq)]
pub struct QuadMeshData {
    /// 5 floats per vertex: position(3) + uv(2)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl QuadMeshData {
    pub const STRIDE: usize = 5;

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / Self::STRIDE
    }

    pub fn position(&self, index: u32) -> Vec3 {
        let b = index as usize * Self::STRIDE;
        Vec3::new(self.vertices[b], self.vertices[b + 1], self.vertices[b + 2])
    }

    pub fn uv(&self, index: u32) -> [f32; 2] {
        let b = index as usize * Self::STRIDE + 3;
        [self.vertices[b], self.vertices[b + 1]]
    }
}

/// Lines mesh: interleaved [pos.x, pos.y, pos.z, r, g, b, a]
#[derive(Debug, Clone, PartialEq)]
pub struct LineMeshData {
    /// 7 floats per vertex: position(3) + color(4)
    pub vertices: Vec<f32>,
}

impl LineMeshData {
    pub const STRIDE: usize = 7;

    /// Line segments as position pairs
    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.vertices
            .chunks_exact(Self::STRIDE * 2)
            .map(|c| (Vec3::new(c[0], c[1], c[2]), Vec3::new(c[7], c[8], c[9])))
    }
}

// ── Primitive generation ─────────────────────────────────────

/// Axis-aligned box centered at the origin
pub fn cube(w: f32, h: f32, d: f32, color: [f32; 3]) -> MeshData {
    let hw = w * 0.5;
    let hh = h * 0.5;
    let hd = d * 0.5;

    let faces: [([Vec3; 4], Vec3); 6] = [
        // Front (+Z)
        ([Vec3::new(-hw, -hh, hd), Vec3::new(hw, -hh, hd), Vec3::new(hw, hh, hd), Vec3::new(-hw, hh, hd)], Vec3::Z),
        // Back (-Z)
        ([Vec3::new(hw, -hh, -hd), Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, hh, -hd), Vec3::new(hw, hh, -hd)], Vec3::NEG_Z),
        // Right (+X)
        ([Vec3::new(hw, -hh, hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, hh, -hd), Vec3::new(hw, hh, hd)], Vec3::X),
        // Left (-X)
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, -hh, hd), Vec3::new(-hw, hh, hd), Vec3::new(-hw, hh, -hd)], Vec3::NEG_X),
        // Top (+Y)
        ([Vec3::new(-hw, hh, hd), Vec3::new(hw, hh, hd), Vec3::new(hw, hh, -hd), Vec3::new(-hw, hh, -hd)], Vec3::Y),
        // Bottom (-Y)
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, -hh, hd), Vec3::new(-hw, -hh, hd)], Vec3::NEG_Y),
    ];

    let mut vertices = Vec::with_capacity(24 * MeshData::STRIDE);
    let mut indices = Vec::with_capacity(36);

    for (quad, normal) in &faces {
        let base = (vertices.len() / MeshData::STRIDE) as u32;
        for v in quad {
            vertices.extend_from_slice(&[v.x, v.y, v.z, normal.x, normal.y, normal.z, color[0], color[1], color[2]]);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

/// Garment body: a white box the renderer tints with the garment color
pub fn garment(w: f32, h: f32, d: f32) -> MeshData {
    cube(w, h, d, [1.0, 1.0, 1.0])
}

/// Flat quad in the local XY plane facing +Z, centered at the origin.
/// `v = 0` is the top edge so bitmap rows map top-down.
pub fn plane(w: f32, h: f32) -> QuadMeshData {
    let hw = w * 0.5;
    let hh = h * 0.5;
    #[rustfmt::skip]
    let vertices = vec![
        -hw, -hh, 0.0, 0.0, 1.0,
         hw, -hh, 0.0, 1.0, 1.0,
         hw,  hh, 0.0, 1.0, 0.0,
        -hw,  hh, 0.0, 0.0, 0.0,
    ];
    QuadMeshData {
        vertices,
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

/// Closed rectangle outline in the local XY plane (4 segments)
pub fn rect_outline(w: f32, h: f32, color: [f32; 4]) -> LineMeshData {
    let hw = w * 0.5;
    let hh = h * 0.5;
    let corners = [
        Vec3::new(-hw, -hh, 0.0),
        Vec3::new(hw, -hh, 0.0),
        Vec3::new(hw, hh, 0.0),
        Vec3::new(-hw, hh, 0.0),
    ];
    let mut vertices = Vec::with_capacity(8 * LineMeshData::STRIDE);
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        push_line_vert(&mut vertices, a.x, a.y, a.z, color);
        push_line_vert(&mut vertices, b.x, b.y, b.z, color);
    }
    LineMeshData { vertices }
}

// ── Helpers ──────────────────────────────────────────────────

fn push_line_vert(v: &mut Vec<f32>, px: f32, py: f32, pz: f32, c: [f32; 4]) {
    v.extend_from_slice(&[px, py, pz, c[0], c[1], c[2], c[3]]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_counts() {
        let m = garment(2.5, 3.5, 0.2);
        assert_eq!(m.vertex_count(), 24);
        assert_eq!(m.indices.len(), 36);
        assert_eq!(m.color(0), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_cube_front_face_depth() {
        let m = garment(2.5, 3.5, 0.2);
        // First face is +Z
        assert_eq!(m.normal(0), Vec3::Z);
        assert!((m.position(0).z - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_plane_uv_top_down() {
        let p = plane(2.0, 1.0);
        assert_eq!(p.vertex_count(), 4);
        // Top-left corner samples uv (0, 0)
        assert_eq!(p.position(3), Vec3::new(-1.0, 0.5, 0.0));
        assert_eq!(p.uv(3), [0.0, 0.0]);
        assert_eq!(p.uv(1), [1.0, 1.0]);
    }

    #[test]
    fn test_outline_is_closed_loop() {
        let o = rect_outline(2.0, 2.0, [0.0, 0.0, 1.0, 1.0]);
        let segs: Vec<_> = o.segments().collect();
        assert_eq!(segs.len(), 4);
        for i in 0..4 {
            assert_eq!(segs[i].1, segs[(i + 1) % 4].0);
        }
    }
}
