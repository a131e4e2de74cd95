use glam::Vec3;

/// A ray in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Point at distance `t` along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Möller-Trumbore ray-triangle intersection algorithm.
/// Returns the distance along the ray if hit, or None if no intersection.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    // Intersection is behind ray origin
    if t > EPSILON {
        Some(t)
    } else {
        None
    }
}

/// Intersect a quad given as four corners in winding order (two triangles)
pub fn ray_quad_intersect(ray: &Ray, corners: &[Vec3; 4]) -> Option<f32> {
    let [a, b, c, d] = *corners;
    match (
        ray_triangle_intersect(ray, a, b, c),
        ray_triangle_intersect(ray, a, c, d),
    ) {
        (Some(t0), Some(t1)) => Some(t0.min(t1)),
        (t0, t1) => t0.or(t1),
    }
}

/// Intersect the infinite plane through `point` with normal `normal`.
/// Returns the distance along the ray, or None when parallel or behind.
pub fn ray_plane_intersect(ray: &Ray, point: Vec3, normal: Vec3) -> Option<f32> {
    let denom = normal.dot(ray.direction);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = normal.dot(point - ray.origin) / denom;
    if t >= 0.0 {
        Some(t)
    } else {
        None
    }
}

/// Pick the nearest quad hit by the ray. Ties keep the earlier candidate.
pub fn pick_nearest<T>(ray: &Ray, candidates: impl IntoIterator<Item = (T, [Vec3; 4])>) -> Option<(T, f32)> {
    let mut best: Option<(T, f32)> = None;

    for (key, corners) in candidates {
        if let Some(dist) = ray_quad_intersect(ray, &corners) {
            if best.as_ref().is_none_or(|(_, d)| dist < *d) {
                best = Some((key, dist));
            }
        }
    }

    best
}
