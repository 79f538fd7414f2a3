use std::collections::HashMap;

use serde::Serialize;

use super::diagnostics::MeshDiagnostics;
use super::{Point3, Tolerance, Vec3};

/// Contiguous range of the index buffer rendered with one material.
///
/// `start` and `count` are measured in indices (three per triangle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MaterialGroup {
    pub start: usize,
    pub count: usize,
    pub material_index: usize,
}

impl MaterialGroup {
    #[must_use]
    pub const fn new(start: usize, count: usize, material_index: usize) -> Self {
        Self {
            start,
            count,
            material_index,
        }
    }

    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.count
    }

    #[must_use]
    pub const fn triangle_count(&self) -> usize {
        self.count / 3
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    #[error("mesh indices are not a triangle list (len % 3 != 0)")]
    NotTriangleList,
    #[error("mesh has invalid vertex coordinates (NaN/Inf)")]
    InvalidVertices,
    #[error("mesh has out-of-bounds vertex indices")]
    IndexOutOfBounds,
    #[error("mesh attribute buffers do not match vertex count")]
    AttributeLengthMismatch,
    #[error("material groups do not partition the index buffer")]
    InvalidGroups,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
    pub uvs: Option<Vec<[f64; 2]>>,
    pub normals: Option<Vec<[f64; 3]>>,
    /// Empty means the whole index buffer uses material 0.
    pub groups: Vec<MaterialGroup>,
}

impl Mesh {
    /// Create a new mesh with positions and indices only.
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            uvs: None,
            normals: None,
            groups: Vec::new(),
        }
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn position(&self, index: usize) -> Option<Point3> {
        self.positions.get(index).copied().map(Point3::from_array)
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions
            .iter()
            .any(|p| !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite())
    }

    /// Returns true if all vertex indices are within bounds.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len();
        self.indices.iter().all(|&i| (i as usize) < n)
    }

    #[must_use]
    pub fn has_triangle_indices(&self) -> bool {
        self.indices.len() % 3 == 0
    }

    /// Returns true if all optional vertex attribute buffers match `positions.len()`.
    #[must_use]
    pub fn has_valid_attribute_lengths(&self) -> bool {
        let n = self.positions.len();
        self.uvs.as_ref().is_none_or(|uvs| uvs.len() == n)
            && self.normals.as_ref().is_none_or(|normals| normals.len() == n)
    }

    /// Returns true if groups are sorted, whole triangles, non-overlapping and
    /// cover the index buffer exactly once.
    #[must_use]
    pub fn has_valid_groups(&self) -> bool {
        if self.groups.is_empty() {
            return true;
        }
        let mut cursor = 0;
        for group in &self.groups {
            if group.start != cursor || group.count % 3 != 0 {
                return false;
            }
            cursor = group.end();
        }
        cursor == self.indices.len()
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        if !self.has_triangle_indices() {
            return Err(MeshError::NotTriangleList);
        }
        if self.has_invalid_vertices() {
            return Err(MeshError::InvalidVertices);
        }
        if !self.has_valid_indices() {
            return Err(MeshError::IndexOutOfBounds);
        }
        if !self.has_valid_attribute_lengths() {
            return Err(MeshError::AttributeLengthMismatch);
        }
        if !self.has_valid_groups() {
            return Err(MeshError::InvalidGroups);
        }
        Ok(())
    }

    /// Material index of triangle `tri`, if it lies inside the index buffer.
    #[must_use]
    pub fn material_of_triangle(&self, tri: usize) -> Option<usize> {
        let offset = tri * 3;
        if offset >= self.indices.len() {
            return None;
        }
        if self.groups.is_empty() {
            return Some(0);
        }
        self.groups
            .iter()
            .find(|group| offset >= group.start && offset < group.end())
            .map(|group| group.material_index)
    }

    /// Returns the position buffer as a flat slice: `[x0, y0, z0, x1, y1, z1, ...]`.
    #[must_use]
    pub fn positions_flat(&self) -> &[f64] {
        flatten_f64_array_slice::<3>(&self.positions)
    }

    /// Returns the UV buffer as a flat slice: `[u0, v0, u1, v1, ...]`.
    #[must_use]
    pub fn uvs_flat(&self) -> Option<&[f64]> {
        self.uvs.as_deref().map(flatten_f64_array_slice::<2>)
    }

    /// Returns the normal buffer as a flat slice: `[nx0, ny0, nz0, ...]`.
    #[must_use]
    pub fn normals_flat(&self) -> Option<&[f64]> {
        self.normals.as_deref().map(flatten_f64_array_slice::<3>)
    }
}

fn flatten_f64_array_slice<const N: usize>(data: &[[f64; N]]) -> &[f64] {
    let count = data.len().checked_mul(N).unwrap_or(0);
    let ptr = data.as_ptr().cast::<f64>();
    // SAFETY: `[[f64; N]]` is stored contiguously, and we compute the element count as `len * N`.
    unsafe { std::slice::from_raw_parts(ptr, count) }
}

/// Builds the final mesh: topology checks, outward orientation for closed
/// surfaces and smooth vertex normals.
pub(crate) fn finalize_mesh(
    points: Vec<Point3>,
    uvs: Option<Vec<[f64; 2]>>,
    mut indices: Vec<u32>,
    groups: Vec<MaterialGroup>,
    tol: Tolerance,
) -> (Mesh, MeshDiagnostics) {
    let degenerate_triangle_count = count_degenerate_triangles(&points, &indices, tol);
    let (open_edge_count, non_manifold_edge_count) = count_edge_topology(&indices);

    let mut warnings = Vec::new();
    let mut orientation_flipped = false;
    if open_edge_count == 0 && non_manifold_edge_count == 0 {
        let volume = signed_volume(&points, &indices);
        if volume.is_finite() && volume < 0.0 {
            flip_all_triangles(&mut indices);
            orientation_flipped = true;
            warnings.push("mesh orientation flipped (outward)".to_string());
        }
    }
    if non_manifold_edge_count > 0 {
        warnings.push("mesh has non-manifold edges".to_string());
    }
    if degenerate_triangle_count > 0 {
        warnings.push(format!("mesh has {degenerate_triangle_count} degenerate triangles"));
    }

    let normals = compute_smooth_normals(&points, &indices);

    let mesh = Mesh {
        positions: points.into_iter().map(Point3::to_array).collect(),
        indices,
        uvs,
        normals: Some(normals),
        groups,
    };

    let diagnostics = MeshDiagnostics {
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        degenerate_triangle_count,
        open_edge_count,
        non_manifold_edge_count,
        orientation_flipped,
        warnings,
    };

    (mesh, diagnostics)
}

fn count_degenerate_triangles(points: &[Point3], indices: &[u32], tol: Tolerance) -> usize {
    indices
        .chunks_exact(3)
        .filter(|tri| {
            let (Some(a), Some(b), Some(c)) = (
                points.get(tri[0] as usize),
                points.get(tri[1] as usize),
                points.get(tri[2] as usize),
            ) else {
                return true;
            };
            let area2 = b.sub_point(*a).cross(c.sub_point(*a)).length_squared();
            !area2.is_finite() || area2 <= tol.eps_squared() * tol.eps_squared()
        })
        .count()
}

fn count_edge_topology(indices: &[u32]) -> (usize, usize) {
    let mut edge_counts: HashMap<(u32, u32), u32> = HashMap::new();

    for tri in indices.chunks_exact(3) {
        let i0 = tri[0];
        let i1 = tri[1];
        let i2 = tri[2];

        if i0 == i1 || i1 == i2 || i0 == i2 {
            continue;
        }

        for (ea, eb) in [(i0, i1), (i1, i2), (i2, i0)] {
            let (lo, hi) = if ea <= eb { (ea, eb) } else { (eb, ea) };
            *edge_counts.entry((lo, hi)).or_insert(0) += 1;
        }
    }

    let mut open_edge_count = 0usize;
    let mut non_manifold_edge_count = 0usize;
    for count in edge_counts.into_values() {
        if count == 1 {
            open_edge_count += 1;
        } else if count > 2 {
            non_manifold_edge_count += 1;
        }
    }

    (open_edge_count, non_manifold_edge_count)
}

fn flip_all_triangles(indices: &mut [u32]) {
    for tri in indices.chunks_exact_mut(3) {
        tri.swap(1, 2);
    }
}

pub(crate) fn signed_volume(points: &[Point3], indices: &[u32]) -> f64 {
    let mut volume = 0.0;
    for tri in indices.chunks_exact(3) {
        let (Some(a), Some(b), Some(c)) = (
            points.get(tri[0] as usize),
            points.get(tri[1] as usize),
            points.get(tri[2] as usize),
        ) else {
            continue;
        };
        volume += a.to_vec3().dot(b.to_vec3().cross(c.to_vec3()));
    }

    volume / 6.0
}

fn compute_smooth_normals(points: &[Point3], indices: &[u32]) -> Vec<[f64; 3]> {
    let mut sums = vec![Vec3::ZERO; points.len()];

    for tri in indices.chunks_exact(3) {
        let i0 = tri[0] as usize;
        let i1 = tri[1] as usize;
        let i2 = tri[2] as usize;

        let (Some(a), Some(b), Some(c)) = (points.get(i0), points.get(i1), points.get(i2)) else {
            continue;
        };

        // Area-weighted face normal.
        let n = b.sub_point(*a).cross(c.sub_point(*a));
        sums[i0] = sums[i0] + n;
        sums[i1] = sums[i1] + n;
        sums[i2] = sums[i2] + n;
    }

    sums.into_iter()
        .map(|n| n.normalized().unwrap_or(Vec3::Z).to_array())
        .collect()
}
