//! Scene lights and the shading model every backend uses

use glam::Vec3;

use crate::catalog::MaterialParams;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: f32,
    pub directional: f32,
    /// Unit vector pointing from the surface towards the light
    pub direction: Vec3,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: 1.5,
            directional: 1.0,
            direction: Vec3::new(5.0, 5.0, 5.0).normalize(),
        }
    }
}

impl Lighting {
    /// Lit color of a surface point.
    ///
    /// Lambert diffuse scaled by `1 - metalness` plus a Blinn-Phong lobe whose
    /// strength falls with roughness and whose tint moves toward the base color
    /// with metalness. Intensities are radiometric, hence the `1/π`.
    pub fn shade(&self, base: [f32; 3], material: &MaterialParams, normal: Vec3, view_dir: Vec3) -> [f32; 3] {
        let n = normal.normalize_or_zero();
        let v = view_dir.normalize_or_zero();
        let l = self.direction;

        let ndl = n.dot(l).max(0.0);
        let diffuse = (self.ambient + self.directional * ndl) / std::f32::consts::PI
            * (1.0 - material.metalness);

        let h = (l + v).normalize_or_zero();
        let ndh = n.dot(h).max(0.0);
        let r = material.roughness.clamp(0.05, 1.0);
        let shininess = 2.0 / (r * r * r * r) - 2.0;
        let strength = (1.0 - r) * (1.0 - r) * self.directional;
        let lobe = if ndl > 0.0 { ndh.powf(shininess.max(1.0)) * strength } else { 0.0 };

        let mut out = [0.0; 3];
        for c in 0..3 {
            let spec_tint = 0.04 + (base[c] - 0.04) * material.metalness;
            out[c] = (base[c] * diffuse + spec_tint * lobe).clamp(0.0, 1.0);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use shared::MaterialKind;

    use super::*;
    use crate::catalog::material;

    #[test]
    fn test_front_face_brighter_than_back() {
        let light = Lighting::default();
        let cotton = material(MaterialKind::Cotton);
        let front = light.shade([1.0; 3], cotton, Vec3::Z, Vec3::Z);
        let back = light.shade([1.0; 3], cotton, Vec3::NEG_Z, Vec3::NEG_Z);
        assert!(front[0] > back[0]);
        assert!(back[0] > 0.0);
    }

    #[test]
    fn test_metalness_darkens_diffuse() {
        let light = Lighting::default();
        let cotton = light.shade([0.5; 3], material(MaterialKind::Cotton), Vec3::Z, Vec3::Z);
        let silk = light.shade([0.5; 3], material(MaterialKind::Silk), Vec3::Z, Vec3::Z);
        assert!(silk[0] < cotton[0]);
    }

    #[test]
    fn test_smooth_highlight_on_mirror_direction() {
        let light = Lighting::default();
        let silk = material(MaterialKind::Silk);
        let n = light.direction;
        // Viewing along the light direction puts the half vector on the normal
        let lit = light.shade([0.2; 3], silk, n, n);
        let plain = light.shade([0.2; 3], silk, n, Vec3::Z.cross(n).normalize());
        assert!(lit[0] > plain[0]);
    }

    #[test]
    fn test_output_is_clamped() {
        let light = Lighting { ambient: 100.0, ..Lighting::default() };
        let c = light.shade([1.0; 3], material(MaterialKind::Wool), Vec3::Z, Vec3::Z);
        assert_eq!(c, [1.0; 3]);
    }
}
