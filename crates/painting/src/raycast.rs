//! Picking against the collision proxy.
//!
//! The proxy is a snapshot of a [`SurfaceMesh`] and only sees geometry
//! changes after [`CollisionProxy::resync`]. Casts run in the surface's local
//! space and report hits in world space.

use chisel_config::DEFAULT_RAYCAST_MAX_DISTANCE;
use glam::{Affine3A, Mat3, Vec2, Vec3};
use tracing::trace;

use crate::mesh::SurfaceMesh;
use crate::types::{Ray, SurfaceHit};

const EPSILON: f32 = 1e-6;

/// Parametric distance and barycentric weights of a triangle hit.
///
/// The first vertex carries weight `1 - u - v`.
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    pub t: f32,
    pub u: f32,
    pub v: f32,
}

/// Moller-Trumbore test of a ray against one triangle.
///
/// Both faces are hittable. Hits behind the origin return `None`.
pub fn ray_triangle_intersection(
    origin: Vec3,
    dir: Vec3,
    a: Vec3,
    b: Vec3,
    c: Vec3,
) -> Option<TriangleHit> {
    let ab = b - a;
    let ac = c - a;

    let p = dir.cross(ac);
    let det = ab.dot(p);
    if det.abs() < EPSILON {
        return None;
    }
    let inv = det.recip();

    let s = origin - a;
    let u = s.dot(p) * inv;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(ab);
    let v = dir.dot(q) * inv;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = ac.dot(q) * inv;
    (t >= EPSILON).then_some(TriangleHit { t, u, v })
}

/// Blend per-vertex values with barycentric weights.
pub fn interpolate_vec3(a: Vec3, b: Vec3, c: Vec3, u: f32, v: f32) -> Vec3 {
    a * (1.0 - u - v) + b * u + c * v
}

pub fn interpolate_vec2(a: Vec2, b: Vec2, c: Vec2, u: f32, v: f32) -> Vec2 {
    a * (1.0 - u - v) + b * u + c * v
}

/// Ray-castable snapshot of a surface.
#[derive(Debug, Clone)]
pub struct CollisionProxy {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
    uvs: Vec<Vec2>,
    transform: Affine3A,
    inverse: Affine3A,
    normal_matrix: Mat3,
    /// Surface revision this proxy mirrors
    revision: u64,
}

impl CollisionProxy {
    /// Snapshot the surface's current geometry.
    pub fn from_mesh(mesh: &SurfaceMesh) -> Self {
        let transform = mesh.transform();
        Self {
            positions: mesh.positions().to_vec(),
            normals: mesh.normals().to_vec(),
            indices: mesh.indices().to_vec(),
            uvs: mesh.uvs().to_vec(),
            transform,
            inverse: transform.inverse(),
            normal_matrix: normal_matrix(transform),
            revision: mesh.revision(),
        }
    }

    /// Copy the surface's current positions, normals and transform.
    ///
    /// Topology is fixed for a session, so indices and UVs are kept.
    pub fn resync(&mut self, mesh: &SurfaceMesh) {
        self.positions.clear();
        self.positions.extend_from_slice(mesh.positions());
        self.normals.clear();
        self.normals.extend_from_slice(mesh.normals());
        if self.transform != mesh.transform() {
            self.transform = mesh.transform();
            self.inverse = self.transform.inverse();
            self.normal_matrix = normal_matrix(self.transform);
        }
        self.revision = mesh.revision();
        trace!(revision = self.revision, "collision proxy resynced");
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the proxy mirrors the surface's latest committed state.
    pub fn is_synced_with(&self, mesh: &SurfaceMesh) -> bool {
        self.revision == mesh.revision()
    }

    /// Get the number of triangles in the proxy
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the vertex indices for a triangle
    pub fn triangle_indices(&self, tri_index: usize) -> Option<(u32, u32, u32)> {
        let base = tri_index.checked_mul(3)?;
        let tri = self.indices.get(base..base + 3)?;
        Some((tri[0], tri[1], tri[2]))
    }

    /// Get the local-space vertex positions for a triangle
    pub fn triangle_positions(&self, tri_index: usize) -> Option<(Vec3, Vec3, Vec3)> {
        let (i0, i1, i2) = self.triangle_indices(tri_index)?;
        Some((
            self.positions[i0 as usize],
            self.positions[i1 as usize],
            self.positions[i2 as usize],
        ))
    }

    /// World-space vertex positions for a triangle
    pub fn triangle_world_positions(&self, tri_index: usize) -> Option<(Vec3, Vec3, Vec3)> {
        let (p0, p1, p2) = self.triangle_positions(tri_index)?;
        Some((
            self.transform.transform_point3(p0),
            self.transform.transform_point3(p1),
            self.transform.transform_point3(p2),
        ))
    }

    /// UVs for a triangle, or None when the surface has no UV mapping
    pub fn triangle_uvs(&self, tri_index: usize) -> Option<(Vec2, Vec2, Vec2)> {
        if self.uvs.is_empty() {
            return None;
        }
        let (i0, i1, i2) = self.triangle_indices(tri_index)?;
        Some((
            self.uvs[i0 as usize],
            self.uvs[i1 as usize],
            self.uvs[i2 as usize],
        ))
    }

    pub fn transform(&self) -> Affine3A {
        self.transform
    }
}

fn normal_matrix(transform: Affine3A) -> Mat3 {
    Mat3::from(transform.matrix3).inverse().transpose()
}

/// Resolves camera rays into surface hits.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceRaycaster {
    /// Hits farther than this (world units) are ignored
    pub max_distance: f32,
}

impl Default for SurfaceRaycaster {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_RAYCAST_MAX_DISTANCE,
        }
    }
}

impl SurfaceRaycaster {
    pub fn new(max_distance: f32) -> Self {
        Self { max_distance }
    }

    /// Cast a world-space ray against the proxy and return the closest hit.
    pub fn cast(&self, ray: &Ray, proxy: &CollisionProxy) -> Option<SurfaceHit> {
        if ray.direction == Vec3::ZERO {
            return None;
        }

        let local_origin = proxy.inverse.transform_point3(ray.origin);
        let local_dir = proxy.inverse.transform_vector3(ray.direction);

        let mut closest_hit: Option<(TriangleHit, usize)> = None;

        // Brute force over all triangles, one active surface at a time
        for tri_idx in 0..proxy.triangle_count() {
            let Some((v0, v1, v2)) = proxy.triangle_positions(tri_idx) else {
                continue;
            };

            if let Some(hit) = ray_triangle_intersection(local_origin, local_dir, v0, v1, v2) {
                let dominated = match &closest_hit {
                    Some((prev, _)) => hit.t >= prev.t,
                    None => false,
                };
                if !dominated {
                    closest_hit = Some((hit, tri_idx));
                }
            }
        }

        let (hit, tri_idx) = closest_hit?;
        let (i0, i1, i2) = proxy.triangle_indices(tri_idx)?;

        let local_point = local_origin + local_dir * hit.t;
        let point = proxy.transform.transform_point3(local_point);
        let distance = point.distance(ray.origin);
        if distance > self.max_distance {
            return None;
        }

        let local_normal = interpolate_vec3(
            proxy.normals[i0 as usize],
            proxy.normals[i1 as usize],
            proxy.normals[i2 as usize],
            hit.u,
            hit.v,
        );
        let local_normal = if local_normal.length_squared() > EPSILON {
            local_normal
        } else {
            let (v0, v1, v2) = proxy.triangle_positions(tri_idx)?;
            (v1 - v0).cross(v2 - v0)
        };
        let normal = (proxy.normal_matrix * local_normal).normalize_or_zero();

        let uv = proxy
            .triangle_uvs(tri_idx)
            .map(|(uv0, uv1, uv2)| interpolate_vec2(uv0, uv1, uv2, hit.u, hit.v));

        Some(SurfaceHit {
            point,
            normal,
            uv,
            triangle_index: tri_idx as u32,
            distance,
        })
    }
}
