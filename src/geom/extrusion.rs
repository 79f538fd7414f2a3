//! Rail extrusion: a rectangular profile swept along an open spline through the
//! rail polyline.
//!
//! Rings are placed at arc-length-uniform positions and oriented with
//! parallel-transport frames; profile `x` runs along the frame normal and `y`
//! along the binormal. Flat caps close both ends, so the result is a closed solid
//! with `8 * steps + 4` triangles.

use serde::{Deserialize, Serialize};

use super::curve::{CatmullRom3, CurveError, CurveSampler, ResolutionPolicy};
use super::diagnostics::MeshDiagnostics;
use super::frame::{FrameError, parallel_transport_frames};
use super::mesh::{Mesh, finalize_mesh};
use super::{Point3, Tolerance};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtrusionCaps {
    pub start: bool,
    pub end: bool,
}

impl ExtrusionCaps {
    pub const NONE: Self = Self { start: false, end: false };
    pub const BOTH: Self = Self { start: true, end: true };
}

/// Rectangular rail cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RailProfile {
    /// Extent along the frame binormal.
    pub width: f64,
    /// Extent along the frame normal.
    pub height: f64,
}

impl Default for RailProfile {
    fn default() -> Self {
        Self {
            width: 0.1,
            height: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("rail profile width must be finite and > 0, got {0}")]
    InvalidWidth(f64),
    #[error("rail profile height must be finite and > 0, got {0}")]
    InvalidHeight(f64),
}

impl RailProfile {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn check(&self) -> Result<(), ProfileError> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(ProfileError::InvalidWidth(self.width));
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(ProfileError::InvalidHeight(self.height));
        }
        Ok(())
    }

    /// Closed outline `(0,0) (0,w) (h,w) (h,0)` in `(normal, binormal)` coordinates,
    /// reordered counter-clockwise when needed.
    #[must_use]
    pub fn outline(&self) -> Vec<[f64; 2]> {
        let mut outline = vec![
            [0.0, 0.0],
            [0.0, self.width],
            [self.height, self.width],
            [self.height, 0.0],
        ];
        if signed_area(&outline) < 0.0 {
            outline.reverse();
        }
        outline
    }
}

fn signed_area(outline: &[[f64; 2]]) -> f64 {
    let n = outline.len();
    (0..n)
        .map(|i| {
            let a = outline[i];
            let b = outline[(i + 1) % n];
            a[0] * b[1] - b[0] * a[1]
        })
        .sum::<f64>()
        * 0.5
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RailExtrusionOptions {
    pub caps: ExtrusionCaps,
    pub resolution: ResolutionPolicy,
}

impl Default for RailExtrusionOptions {
    fn default() -> Self {
        Self {
            caps: ExtrusionCaps::BOTH,
            resolution: ResolutionPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ExtrusionError {
    #[error("rail is too short to sample (length {length})")]
    RailTooShort { length: f64 },
    #[error("rail extrusion has {0} vertices, more than a 32-bit index buffer can address")]
    TooManyVertices(usize),
    #[error(transparent)]
    Curve(#[from] CurveError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RailExtrusion {
    pub mesh: Mesh,
    pub diagnostics: MeshDiagnostics,
    /// Segments along the rail.
    pub steps: usize,
    /// Arc length of the spline the profile was swept along.
    pub path_length: f64,
}

pub fn extrude_rail(
    rail: &[Point3],
    profile: RailProfile,
    options: RailExtrusionOptions,
) -> Result<RailExtrusion, ExtrusionError> {
    extrude_rail_with_tolerance(rail, profile, options, Tolerance::default_geom())
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn extrude_rail_with_tolerance(
    rail: &[Point3],
    profile: RailProfile,
    options: RailExtrusionOptions,
    tol: Tolerance,
) -> Result<RailExtrusion, ExtrusionError> {
    profile.check()?;

    let sampler = CurveSampler::new(CatmullRom3::open(rail.to_vec())?);
    let path_length = sampler.length();
    let steps = options.resolution.steps_for_length(path_length);
    if steps == 0 {
        return Err(ExtrusionError::RailTooShort {
            length: path_length,
        });
    }

    let outline = profile.outline();
    let ring_size = outline.len();
    let vertex_count = steps.saturating_add(1).saturating_mul(ring_size);
    if u32::try_from(vertex_count).is_err() {
        return Err(ExtrusionError::TooManyVertices(vertex_count));
    }

    let tangents = (0..=steps)
        .map(|j| {
            sampler
                .tangent_at_length_fraction(j as f64 / steps as f64)
                .ok_or(FrameError::DegenerateTangent { index: j })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let frames = parallel_transport_frames(&tangents, tol)?;
    let centers = sampler.spaced_points(steps);

    let mut vertices: Vec<Point3> = Vec::with_capacity(vertex_count);
    for (center, frame) in centers.iter().zip(&frames) {
        vertices.extend(outline.iter().map(|[x, y]| {
            center
                .add_vec(frame.normal.mul_scalar(*x))
                .add_vec(frame.binormal.mul_scalar(*y))
        }));
    }

    let cap_triangles = 2 * (ring_size - 2);
    let mut indices: Vec<u32> = Vec::with_capacity((steps * ring_size * 2 + cap_triangles) * 3);
    for j in 0..steps {
        for k in 0..ring_size {
            let k_next = (k + 1) % ring_size;
            let i0 = (j * ring_size + k) as u32;
            let i1 = (j * ring_size + k_next) as u32;
            let i2 = ((j + 1) * ring_size + k_next) as u32;
            let i3 = ((j + 1) * ring_size + k) as u32;

            indices.extend_from_slice(&[i0, i1, i2]);
            indices.extend_from_slice(&[i0, i2, i3]);
        }
    }

    // Convex outline: fan caps. Start faces -tangent, end faces +tangent.
    if options.caps.start {
        for k in 1..ring_size - 1 {
            indices.extend_from_slice(&[0, (k + 1) as u32, k as u32]);
        }
    }
    if options.caps.end {
        let base = (steps * ring_size) as u32;
        for k in 1..ring_size - 1 {
            indices.extend_from_slice(&[base, base + k as u32, base + (k + 1) as u32]);
        }
    }

    let (mesh, mut diagnostics) = finalize_mesh(vertices, None, indices, Vec::new(), tol);
    if diagnostics.orientation_flipped {
        log::warn!("rail extrusion produced inward faces; orientation flipped");
    }
    if steps < rail.len() / 2 {
        diagnostics.add_warning(format!(
            "rail sampled with {steps} steps for {} input points",
            rail.len()
        ));
    }

    Ok(RailExtrusion {
        mesh,
        diagnostics,
        steps,
        path_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_matches_track_rails() {
        let profile = RailProfile::default();
        assert_eq!(profile.width, 0.1);
        assert_eq!(profile.height, 0.05);
        assert!(profile.check().is_ok());
    }

    #[test]
    fn outline_is_counter_clockwise() {
        let outline = RailProfile::default().outline();
        assert_eq!(outline.len(), 4);
        assert!(signed_area(&outline) > 0.0);
        assert!((signed_area(&outline) - 0.005).abs() < 1e-12);
    }

    #[test]
    fn profile_rejects_non_positive_extent() {
        assert_eq!(
            RailProfile::new(0.0, 0.05).check(),
            Err(ProfileError::InvalidWidth(0.0))
        );
        assert!(matches!(
            RailProfile::new(0.1, f64::NAN).check(),
            Err(ProfileError::InvalidHeight(_))
        ));
    }
}
