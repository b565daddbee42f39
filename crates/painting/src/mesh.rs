//! Triangle surface geometry shared by sculpting, painting and raycasting.
//!
//! Topology (index buffer, UVs, vertex count) is fixed at construction. Only
//! vertex positions can change, and only through a fixed-length slice, so a
//! session can never add or remove vertices.

use glam::{Affine3A, Mat3, Vec2, Vec3};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("Index count {0} is not a multiple of 3")]
    NotTriangles(usize),
    #[error("Index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("UV count {uvs} does not match vertex count {vertices}")]
    UvCountMismatch { uvs: usize, vertices: usize },
}

/// Whether the host allows the geometry to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshAccess {
    #[default]
    ReadWrite,
    ReadOnly,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    pub fn from_points(points: &[Vec3]) -> Self {
        let mut aabb = Self::empty();
        for &p in points {
            aabb.include_point(p);
        }
        aabb
    }

    pub fn include_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }
}

/// A triangle surface with a local-to-world transform.
#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    /// Name used in diagnostics
    pub name: String,
    access: MeshAccess,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
    uvs: Vec<Vec2>,
    transform: Affine3A,
    inverse: Affine3A,
    bounds: Aabb,
    /// Bumped on every committed mutation
    revision: u64,
}

impl SurfaceMesh {
    /// Build a surface, validating topology. Normals and bounds are derived.
    ///
    /// `uvs` may be empty for surfaces without a UV mapping.
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        uvs: Vec<Vec2>,
        transform: Affine3A,
    ) -> Result<Self, MeshError> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::NotTriangles(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: positions.len(),
            });
        }
        if !uvs.is_empty() && uvs.len() != positions.len() {
            return Err(MeshError::UvCountMismatch {
                uvs: uvs.len(),
                vertices: positions.len(),
            });
        }

        let mut mesh = Self {
            name: name.into(),
            access: MeshAccess::ReadWrite,
            normals: vec![Vec3::ZERO; positions.len()],
            bounds: Aabb::empty(),
            positions,
            indices,
            uvs,
            transform,
            inverse: transform.inverse(),
            revision: 0,
        };
        mesh.recompute_normals();
        mesh.recompute_bounds();
        Ok(mesh)
    }

    /// A flat square in the local XZ plane, centered on the origin, facing +Y.
    ///
    /// `subdivisions` quads per side; UVs span 0..1.
    pub fn plane(
        name: impl Into<String>,
        size: f32,
        subdivisions: u32,
        transform: Affine3A,
    ) -> Self {
        let n = subdivisions.max(1);
        let stride = n + 1;
        let half = size * 0.5;

        let mut positions = Vec::with_capacity((stride * stride) as usize);
        let mut uvs = Vec::with_capacity((stride * stride) as usize);
        for z in 0..stride {
            for x in 0..stride {
                let u = x as f32 / n as f32;
                let v = z as f32 / n as f32;
                positions.push(Vec3::new(-half + u * size, 0.0, -half + v * size));
                uvs.push(Vec2::new(u, v));
            }
        }

        let mut indices = Vec::with_capacity((n * n * 6) as usize);
        for z in 0..n {
            for x in 0..n {
                let i0 = z * stride + x;
                let i1 = i0 + 1;
                let i2 = i0 + stride;
                let i3 = i2 + 1;
                indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
            }
        }

        let mut mesh = Self {
            name: name.into(),
            access: MeshAccess::ReadWrite,
            normals: vec![Vec3::Y; positions.len()],
            bounds: Aabb::from_points(&positions),
            positions,
            indices,
            uvs,
            transform,
            inverse: transform.inverse(),
            revision: 0,
        };
        mesh.recompute_normals();
        mesh
    }

    /// Mark the geometry as read-only or writable.
    pub fn with_access(mut self, access: MeshAccess) -> Self {
        self.access = access;
        self
    }

    pub fn access(&self) -> MeshAccess {
        self.access
    }

    pub fn is_writable(&self) -> bool {
        self.access == MeshAccess::ReadWrite
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Mutable positions. The slice length is fixed; call [`Self::commit`]
    /// after writing.
    pub fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// Vertex indices of a triangle, or None if out of range.
    pub fn triangle(&self, tri_index: usize) -> Option<[u32; 3]> {
        let base = tri_index.checked_mul(3)?;
        let tri = self.indices.get(base..base + 3)?;
        Some([tri[0], tri[1], tri[2]])
    }

    pub fn transform(&self) -> Affine3A {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Affine3A) {
        self.transform = transform;
        self.inverse = transform.inverse();
        self.revision += 1;
    }

    pub fn world_to_local_point(&self, point: Vec3) -> Vec3 {
        self.inverse.transform_point3(point)
    }

    pub fn world_to_local_vector(&self, vector: Vec3) -> Vec3 {
        self.inverse.transform_vector3(vector)
    }

    pub fn local_to_world_point(&self, point: Vec3) -> Vec3 {
        self.transform.transform_point3(point)
    }

    /// Map a world-space normal into local space (transpose of the linear part).
    pub fn world_to_local_normal(&self, normal: Vec3) -> Vec3 {
        (Mat3::from(self.transform.matrix3).transpose() * normal).normalize_or_zero()
    }

    /// Local-space bounds, current as of the last commit.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Finish a batch of position writes: normals, bounds and revision.
    pub fn commit(&mut self) {
        self.recompute_normals();
        self.recompute_bounds();
        self.revision += 1;
    }

    /// Area-weighted vertex normals from the current positions.
    pub fn recompute_normals(&mut self) {
        self.normals.iter_mut().for_each(|n| *n = Vec3::ZERO);

        for tri in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let p0 = self.positions[i0];
            let face = (self.positions[i1] - p0).cross(self.positions[i2] - p0);
            self.normals[i0] += face;
            self.normals[i1] += face;
            self.normals[i2] += face;
        }

        for normal in &mut self.normals {
            *normal = normal.normalize_or_zero();
        }
    }

    pub fn recompute_bounds(&mut self) {
        self.bounds = Aabb::from_points(&self.positions);
    }
}
