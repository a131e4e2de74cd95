//! GPU-independent resource bookkeeping
//!
//! Every texture and geometry the scene uses is allocated here. Released ids
//! are queued so a GPU backend can delete its mirrored objects.

use std::collections::HashMap;
use std::sync::Arc;

use image::RgbaImage;

use crate::viewport::mesh::{LineMeshData, MeshData, QuadMeshData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u64);

/// CPU copy of a geometry
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryData {
    Mesh(Arc<MeshData>),
    Quad(QuadMeshData),
    Lines(LineMeshData),
}

/// A resource handed back to the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Released {
    Texture(TextureId),
    Geometry(GeometryId),
}

#[derive(Default)]
pub struct ResourcePool {
    next_id: u64,
    textures: HashMap<TextureId, Arc<RgbaImage>>,
    geometries: HashMap<GeometryId, GeometryData>,
    released: Vec<Released>,
    textures_created: u64,
    geometries_created: u64,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn create_texture(&mut self, image: Arc<RgbaImage>) -> TextureId {
        let id = TextureId(self.next());
        self.textures.insert(id, image);
        self.textures_created += 1;
        id
    }

    pub fn create_geometry(&mut self, data: GeometryData) -> GeometryId {
        let id = GeometryId(self.next());
        self.geometries.insert(id, data);
        self.geometries_created += 1;
        id
    }

    pub fn texture(&self, id: TextureId) -> Option<&Arc<RgbaImage>> {
        self.textures.get(&id)
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&GeometryData> {
        self.geometries.get(&id)
    }

    pub fn release_texture(&mut self, id: TextureId) {
        if self.textures.remove(&id).is_some() {
            self.released.push(Released::Texture(id));
        }
    }

    pub fn release_geometry(&mut self, id: GeometryId) {
        if self.geometries.remove(&id).is_some() {
            self.released.push(Released::Geometry(id));
        }
    }

    /// Release everything still alive
    pub fn release_all(&mut self) {
        let mut textures: Vec<TextureId> = self.textures.keys().copied().collect();
        textures.sort();
        for id in textures {
            self.release_texture(id);
        }
        let mut geometries: Vec<GeometryId> = self.geometries.keys().copied().collect();
        geometries.sort();
        for id in geometries {
            self.release_geometry(id);
        }
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_geometries(&self) -> usize {
        self.geometries.len()
    }

    pub fn live_count(&self) -> usize {
        self.live_textures() + self.live_geometries()
    }

    /// Total textures ever created
    pub fn textures_created(&self) -> u64 {
        self.textures_created
    }

    pub fn geometries_created(&self) -> u64 {
        self.geometries_created
    }

    /// Drain the queue of released ids
    pub fn take_released(&mut self) -> Vec<Released> {
        std::mem::take(&mut self.released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::mesh;

    #[test]
    fn test_create_and_release() {
        let mut pool = ResourcePool::new();
        let t = pool.create_texture(Arc::new(RgbaImage::new(2, 2)));
        let g = pool.create_geometry(GeometryData::Quad(mesh::plane(1.0, 1.0)));
        assert_eq!(pool.live_count(), 2);
        assert!(pool.texture(t).is_some());

        pool.release_texture(t);
        pool.release_geometry(g);
        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.take_released(), vec![Released::Texture(t), Released::Geometry(g)]);
        assert!(pool.take_released().is_empty());
    }

    #[test]
    fn test_double_release_queues_once() {
        let mut pool = ResourcePool::new();
        let t = pool.create_texture(Arc::new(RgbaImage::new(1, 1)));
        pool.release_texture(t);
        pool.release_texture(t);
        assert_eq!(pool.take_released().len(), 1);
    }

    #[test]
    fn test_ids_never_reused() {
        let mut pool = ResourcePool::new();
        let a = pool.create_texture(Arc::new(RgbaImage::new(1, 1)));
        pool.release_texture(a);
        let b = pool.create_texture(Arc::new(RgbaImage::new(1, 1)));
        assert_ne!(a, b);
        assert_eq!(pool.textures_created(), 2);
    }

    #[test]
    fn test_release_all() {
        let mut pool = ResourcePool::new();
        pool.create_texture(Arc::new(RgbaImage::new(1, 1)));
        pool.create_geometry(GeometryData::Mesh(Arc::new(mesh::garment(1.0, 1.0, 1.0))));
        pool.release_all();
        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.take_released().len(), 2);
    }
}
