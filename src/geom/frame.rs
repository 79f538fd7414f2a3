//! Moving reference frames along sampled curves.
//!
//! - [`horizontal_frames`]: track frames whose normal is forced into the XY plane
//!   (no banking), computed as a left fold seeded with a world-up binormal.
//! - [`parallel_transport_frames`]: rotation-minimizing frames used to orient the
//!   rail cross-section.

use super::core::{Tolerance, Vec3};
use super::curve::{Curve3, CurveSampler};

/// Binormal carried into the first horizontal frame.
pub const SEED_BINORMAL: Vec3 = Vec3::Z;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub tangent: Vec3,
    pub normal: Vec3,
    pub binormal: Vec3,
}

impl Frame {
    #[must_use]
    pub const fn new(tangent: Vec3, normal: Vec3, binormal: Vec3) -> Self {
        Self {
            tangent,
            normal,
            binormal,
        }
    }

    /// Frame for a tangent with the normal seeded from the tangent's smallest
    /// axis component, so the seed is never parallel to the tangent.
    #[must_use]
    pub fn from_tangent(tangent: Vec3) -> Option<Self> {
        let tangent = tangent.normalized()?;
        let a = tangent.abs();

        let mut min = f64::MAX;
        let mut axis = Vec3::X;
        if a.x <= min {
            min = a.x;
            axis = Vec3::X;
        }
        if a.y <= min {
            min = a.y;
            axis = Vec3::Y;
        }
        if a.z <= min {
            axis = Vec3::Z;
        }

        let side = tangent.cross(axis).normalized()?;
        let normal = tangent.cross(side).normalized()?;
        let binormal = tangent.cross(normal);
        Some(Self::new(tangent, normal, binormal))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame computation requires at least one segment")]
    NoSegments,
    #[error("tangent is undefined at sample {index}")]
    DegenerateTangent { index: usize },
    #[error("horizontal normal vanishes at sample {index} (vertical tangent)")]
    DegenerateNormal { index: usize },
    #[error("binormal vanishes at sample {index}")]
    DegenerateBinormal { index: usize },
}

impl FrameError {
    #[must_use]
    pub fn index(self) -> Option<usize> {
        match self {
            Self::NoSegments => None,
            Self::DegenerateTangent { index }
            | Self::DegenerateNormal { index }
            | Self::DegenerateBinormal { index } => Some(index),
        }
    }
}

/// One step of the horizontal fold: `normal = tangent × prev_binormal` with `z`
/// cleared, then `binormal = normal × tangent`.
pub fn horizontal_frame_step(
    prev_binormal: Vec3,
    tangent: Vec3,
    index: usize,
    tol: Tolerance,
) -> Result<Frame, FrameError> {
    let normal = tangent.cross(prev_binormal).horizontal();
    if tol.is_zero_vec3(normal) {
        return Err(FrameError::DegenerateNormal { index });
    }
    let normal = normal
        .normalized()
        .ok_or(FrameError::DegenerateNormal { index })?;

    let binormal = normal.cross(tangent);
    if tol.is_zero_vec3(binormal) {
        return Err(FrameError::DegenerateBinormal { index });
    }
    let binormal = binormal
        .normalized()
        .ok_or(FrameError::DegenerateBinormal { index })?;

    Ok(Frame::new(tangent, normal, binormal))
}

/// Horizontal frames at `segments + 1` uniform parameter samples `j / segments`.
#[allow(clippy::cast_precision_loss)]
pub fn horizontal_frames<C: Curve3>(
    sampler: &CurveSampler<C>,
    segments: usize,
    tol: Tolerance,
) -> Result<Vec<Frame>, FrameError> {
    if segments == 0 {
        return Err(FrameError::NoSegments);
    }

    let (frames, _) = (0..=segments).try_fold(
        (Vec::with_capacity(segments + 1), SEED_BINORMAL),
        |(mut frames, binormal), index| {
            let t = index as f64 / segments as f64;
            let tangent = sampler
                .tangent(t)
                .ok_or(FrameError::DegenerateTangent { index })?;
            let frame = horizontal_frame_step(binormal, tangent, index, tol)?;
            frames.push(frame);
            Ok::<_, FrameError>((frames, frame.binormal))
        },
    )?;

    Ok(frames)
}

/// Rotation-minimizing frames for a sequence of unit tangents.
pub fn parallel_transport_frames(
    tangents: &[Vec3],
    tol: Tolerance,
) -> Result<Vec<Frame>, FrameError> {
    let Some(first) = tangents.first().copied() else {
        return Err(FrameError::NoSegments);
    };

    let mut frames = Vec::with_capacity(tangents.len());
    frames.push(Frame::from_tangent(first).ok_or(FrameError::DegenerateTangent { index: 0 })?);

    for (index, tangent) in tangents.iter().copied().enumerate().skip(1) {
        let tangent = tangent
            .normalized()
            .ok_or(FrameError::DegenerateTangent { index })?;
        let prev = frames[index - 1];
        frames.push(parallel_transport_frame(&prev, tangent, tol));
    }

    Ok(frames)
}

fn parallel_transport_frame(prev_frame: &Frame, new_tangent: Vec3, tol: Tolerance) -> Frame {
    let old_tangent = prev_frame.tangent;

    let cross = old_tangent.cross(new_tangent);
    if cross.length_squared() < tol.eps_squared() {
        if old_tangent.dot(new_tangent) < 0.0 {
            return Frame::new(new_tangent, -prev_frame.normal, -prev_frame.binormal);
        }
        return Frame::new(new_tangent, prev_frame.normal, prev_frame.binormal);
    }

    let rotation_axis = cross.normalized().unwrap_or(Vec3::Z);
    let angle = old_tangent.dot(new_tangent).clamp(-1.0, 1.0).acos();

    let new_normal = rotate_vector(prev_frame.normal, rotation_axis, angle)
        .normalized()
        .unwrap_or(prev_frame.normal);
    let new_binormal = new_tangent
        .cross(new_normal)
        .normalized()
        .unwrap_or(prev_frame.binormal);

    Frame::new(new_tangent, new_normal, new_binormal)
}

/// Rodrigues rotation of `v` about the unit `axis`.
fn rotate_vector(v: Vec3, axis: Vec3, angle: f64) -> Vec3 {
    let cos_angle = angle.cos();
    let sin_angle = angle.sin();

    let k_cross_v = axis.cross(v);
    let k_dot_v = axis.dot(v);

    v.mul_scalar(cos_angle)
        .add(k_cross_v.mul_scalar(sin_angle))
        .add(axis.mul_scalar(k_dot_v * (1.0 - cos_angle)))
}
