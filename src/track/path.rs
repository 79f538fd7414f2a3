//! Closed track centerline input.

use crate::geom::{CatmullRom3, Point3, Tolerance};

use super::error::PathError;

/// Ordered control points of a closed track centerline.
///
/// The loop is implicit: the last point connects back to the first. A trailing
/// point that repeats the first one is dropped on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPath {
    points: Vec<Point3>,
}

impl TrackPath {
    pub const MIN_POINTS: usize = 3;

    pub fn new(mut points: Vec<Point3>) -> Result<Self, PathError> {
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(PathError::NonFinitePoint { index });
        }

        if points.len() > 1 {
            if let (Some(first), Some(last)) = (points.first(), points.last()) {
                if Tolerance::DEFAULT.approx_eq_point3(*first, *last) {
                    points.pop();
                }
            }
        }

        if points.len() < Self::MIN_POINTS {
            return Err(PathError::TooFewPoints {
                count: points.len(),
            });
        }

        Ok(Self { points })
    }

    pub fn from_arrays(points: &[[f64; 3]]) -> Result<Self, PathError> {
        Self::new(points.iter().copied().map(Point3::from_array).collect())
    }

    /// Reads `[x0, y0, z0, x1, y1, z1, ...]`.
    pub fn from_flat(coords: &[f64]) -> Result<Self, PathError> {
        if coords.len() % 3 != 0 {
            return Err(PathError::RaggedCoordinates { len: coords.len() });
        }
        Self::new(
            coords
                .chunks_exact(3)
                .map(|c| Point3::new(c[0], c[1], c[2]))
                .collect(),
        )
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closed centripetal Catmull-Rom spline through the control points.
    pub fn spline(&self) -> Result<CatmullRom3, PathError> {
        Ok(CatmullRom3::closed(self.points.clone())?)
    }
}
