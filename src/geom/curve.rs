//! Curve evaluation and sampling.
//!
//! Provides the centripetal Catmull-Rom spline used for track centerlines (closed)
//! and rail paths (open), plus a [`CurveSampler`] that caches an arc-length table
//! for total length, uniform and arc-length-uniform resampling.

use serde::{Deserialize, Serialize};

use super::core::{Point3, Tolerance, Vec3};

/// Uniform parameter divisions used when measuring the total arc length.
pub const ARC_LENGTH_DIVISIONS: usize = 200;

/// Exponent applied to squared chord length for centripetal knot spacing
/// (`|Δ|^0.5 == (|Δ|²)^0.25`).
const CENTRIPETAL_EXPONENT: f64 = 0.25;

pub trait Curve3 {
    fn point_at(&self, t: f64) -> Point3;

    #[must_use]
    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn derivative_at(&self, t: f64) -> Vec3;

    /// Returns the unit tangent vector at parameter `t`.
    /// Returns `None` if the derivative is zero or degenerate.
    #[must_use]
    fn tangent_at(&self, t: f64) -> Option<Vec3> {
        self.derivative_at(t).normalized()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CurveError {
    #[error("curve requires at least 2 control points, got {count}")]
    TooFewPoints { count: usize },
    #[error("control point {index} has non-finite coordinates")]
    NonFinitePoint { index: usize },
}

// ─────────────────────────────────────────────────────────────────────────────
// Catmull-Rom
// ─────────────────────────────────────────────────────────────────────────────

/// One axis of a cubic segment, `p(s) = c0 + c1*s + c2*s^2 + c3*s^3`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CubicPoly {
    c0: f64,
    c1: f64,
    c2: f64,
    c3: f64,
}

impl CubicPoly {
    fn hermite(x0: f64, x1: f64, t0: f64, t1: f64) -> Self {
        Self {
            c0: x0,
            c1: t0,
            c2: -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1,
            c3: 2.0 * x0 - 2.0 * x1 + t0 + t1,
        }
    }

    fn nonuniform_catmull_rom(
        x0: f64,
        x1: f64,
        x2: f64,
        x3: f64,
        dt0: f64,
        dt1: f64,
        dt2: f64,
    ) -> Self {
        // Tangents parameterized over [t1, t2], then rescaled to [0, 1].
        let t1 = ((x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1) * dt1;
        let t2 = ((x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2) * dt1;
        Self::hermite(x1, x2, t1, t2)
    }

    fn value(self, s: f64) -> f64 {
        let s2 = s * s;
        self.c0 + self.c1 * s + self.c2 * s2 + self.c3 * s2 * s
    }

    fn slope(self, s: f64) -> f64 {
        self.c1 + 2.0 * self.c2 * s + 3.0 * self.c3 * s * s
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CubicSegment {
    x: CubicPoly,
    y: CubicPoly,
    z: CubicPoly,
}

impl CubicSegment {
    fn centripetal(p0: Point3, p1: Point3, p2: Point3, p3: Point3) -> Self {
        let floor = Tolerance::REPEATED_POINT.eps;
        let mut dt0 = p0.distance_squared_to(p1).powf(CENTRIPETAL_EXPONENT);
        let mut dt1 = p1.distance_squared_to(p2).powf(CENTRIPETAL_EXPONENT);
        let mut dt2 = p2.distance_squared_to(p3).powf(CENTRIPETAL_EXPONENT);

        // Repeated control points.
        if dt1 < floor {
            dt1 = 1.0;
        }
        if dt0 < floor {
            dt0 = dt1;
        }
        if dt2 < floor {
            dt2 = dt1;
        }

        Self {
            x: CubicPoly::nonuniform_catmull_rom(p0.x, p1.x, p2.x, p3.x, dt0, dt1, dt2),
            y: CubicPoly::nonuniform_catmull_rom(p0.y, p1.y, p2.y, p3.y, dt0, dt1, dt2),
            z: CubicPoly::nonuniform_catmull_rom(p0.z, p1.z, p2.z, p3.z, dt0, dt1, dt2),
        }
    }

    fn point(self, s: f64) -> Point3 {
        Point3::new(self.x.value(s), self.y.value(s), self.z.value(s))
    }

    fn slope(self, s: f64) -> Vec3 {
        Vec3::new(self.x.slope(s), self.y.slope(s), self.z.slope(s))
    }
}

/// Centripetal Catmull-Rom spline through ordered control points.
///
/// Closed curves wrap around the control points and are periodic in `t`.
/// Open curves extrapolate phantom end points (`2·P0 − P1`, `2·Pn−1 − Pn−2`)
/// and clamp `t` to `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CatmullRom3 {
    points: Vec<Point3>,
    closed: bool,
}

impl CatmullRom3 {
    pub fn new(points: Vec<Point3>, closed: bool) -> Result<Self, CurveError> {
        if points.len() < 2 {
            return Err(CurveError::TooFewPoints {
                count: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(CurveError::NonFinitePoint { index });
        }
        Ok(Self { points, closed })
    }

    pub fn closed(points: Vec<Point3>) -> Result<Self, CurveError> {
        Self::new(points, true)
    }

    pub fn open(points: Vec<Point3>) -> Result<Self, CurveError> {
        Self::new(points, false)
    }

    #[must_use]
    pub fn control_points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len() - 1
        }
    }

    /// Maps `t` to `(segment index, local parameter)`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn locate(&self, t: f64) -> (usize, f64) {
        let segments = self.segment_count();
        let t = if self.closed {
            t.rem_euclid(1.0)
        } else {
            t.clamp(0.0, 1.0)
        };

        let p = segments as f64 * t;
        let mut index = p.floor().max(0.0) as usize;
        let mut weight = p - index as f64;

        if self.closed {
            index %= segments;
        } else if index >= segments {
            // t == 1 lands on the last control point: end of the final segment.
            index = segments - 1;
            weight = p - index as f64;
        }

        (index, weight)
    }

    fn segment(&self, index: usize) -> CubicSegment {
        let l = self.points.len();
        let p1 = self.points[index % l];
        let p2 = self.points[(index + 1) % l];

        let p0 = if self.closed {
            self.points[(index + l - 1) % l]
        } else if index > 0 {
            self.points[index - 1]
        } else {
            let first = self.points[0];
            first.add_vec(first.sub_point(self.points[1]))
        };

        let p3 = if self.closed {
            self.points[(index + 2) % l]
        } else if index + 2 < l {
            self.points[index + 2]
        } else {
            let last = self.points[l - 1];
            last.add_vec(last.sub_point(self.points[l - 2]))
        };

        CubicSegment::centripetal(p0, p1, p2, p3)
    }
}

impl Curve3 for CatmullRom3 {
    fn point_at(&self, t: f64) -> Point3 {
        let (index, weight) = self.locate(t);
        self.segment(index).point(weight)
    }

    #[allow(clippy::cast_precision_loss)]
    fn derivative_at(&self, t: f64) -> Vec3 {
        let (index, weight) = self.locate(t);
        self.segment(index)
            .slope(weight)
            .mul_scalar(self.segment_count() as f64)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Arc-length table
// ─────────────────────────────────────────────────────────────────────────────

/// An entry in the arc-length lookup table.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ArcLengthEntry {
    parameter: f64,
    arc_length: f64,
}

/// Builds an arc-length lookup table with `divisions + 1` entries.
#[allow(clippy::cast_precision_loss)]
fn build_arc_length_table<C: Curve3>(curve: &C, divisions: usize) -> Vec<ArcLengthEntry> {
    let divisions = divisions.max(1);
    let (t0, t1) = curve.domain();
    let span = t1 - t0;

    let mut table = Vec::with_capacity(divisions + 1);
    let mut prev = curve.point_at(t0);
    let mut cumulative = 0.0;

    table.push(ArcLengthEntry {
        parameter: t0,
        arc_length: 0.0,
    });

    for i in 1..=divisions {
        let t = t0 + span * (i as f64 / divisions as f64);
        let curr = curve.point_at(t);
        cumulative += curr.sub_point(prev).length();
        table.push(ArcLengthEntry {
            parameter: t,
            arc_length: cumulative,
        });
        prev = curr;
    }

    table
}

/// Finds the parameter value corresponding to a target arc length.
fn parameter_at_arc_length(table: &[ArcLengthEntry], t0: f64, t1: f64, target_length: f64) -> f64 {
    if table.len() < 2 {
        return table.first().map_or(t0, |entry| entry.parameter);
    }

    let total = table.last().map_or(0.0, |e| e.arc_length);
    if target_length <= 0.0 {
        return t0;
    }
    if target_length >= total {
        return t1;
    }

    let idx = table
        .binary_search_by(|entry| {
            entry
                .arc_length
                .partial_cmp(&target_length)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or_else(|i| i.saturating_sub(1));

    let idx = idx.min(table.len() - 2);
    let e0 = &table[idx];
    let e1 = &table[idx + 1];

    let segment_length = e1.arc_length - e0.arc_length;
    if segment_length.abs() < 1e-14 {
        return e0.parameter;
    }

    let ratio = (target_length - e0.arc_length) / segment_length;
    e0.parameter + (e1.parameter - e0.parameter) * ratio.clamp(0.0, 1.0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Sampling
// ─────────────────────────────────────────────────────────────────────────────

/// Step-count heuristic: `round(round(length) * samples_per_unit)`.
///
/// The inner rounding is kept so existing assets regenerate with the same
/// sample counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionPolicy {
    pub samples_per_unit: f64,
}

impl ResolutionPolicy {
    #[must_use]
    pub const fn new(samples_per_unit: f64) -> Self {
        Self { samples_per_unit }
    }

    /// Number of segments for a curve of the given length. Zero for
    /// non-positive or non-finite input.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn steps_for_length(self, length: f64) -> usize {
        let steps = (length.round() * self.samples_per_unit).round();
        if steps.is_finite() && steps > 0.0 {
            steps as usize
        } else {
            0
        }
    }
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self::new(2.0)
    }
}

/// Uniformly resampled curve: `n + 1` positions and their cumulative chord lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledCurve {
    pub positions: Vec<Point3>,
    pub cumulative_lengths: Vec<f64>,
}

impl SampledCurve {
    /// Number of segments (`positions.len() - 1`).
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.positions.len().saturating_sub(1)
    }

    /// Cumulative chord length at the last sample.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.cumulative_lengths.last().copied().unwrap_or(0.0)
    }

    /// Fraction of the sampled length reached at sample `j`; exactly 0 at the first
    /// sample and 1 at the last.
    #[must_use]
    pub fn length_fraction(&self, j: usize) -> f64 {
        let total = self.total_length();
        if j + 1 >= self.cumulative_lengths.len() {
            return 1.0;
        }
        self.cumulative_lengths[j] / total
    }
}

/// Evaluation front-end for a curve with a cached arc-length table.
#[derive(Debug, Clone)]
pub struct CurveSampler<C> {
    curve: C,
    table: Vec<ArcLengthEntry>,
}

impl<C: Curve3> CurveSampler<C> {
    pub fn new(curve: C) -> Self {
        let table = build_arc_length_table(&curve, ARC_LENGTH_DIVISIONS);
        Self { curve, table }
    }

    #[must_use]
    pub fn point(&self, t: f64) -> Point3 {
        self.curve.point_at(t)
    }

    #[must_use]
    pub fn tangent(&self, t: f64) -> Option<Vec3> {
        self.curve.tangent_at(t)
    }

    /// Total arc length over [`ARC_LENGTH_DIVISIONS`] uniform parameter steps.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.table.last().map_or(0.0, |e| e.arc_length)
    }

    /// `divisions + 1` positions at uniform parameter steps `0, 1/n, …, 1`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn points(&self, divisions: usize) -> Vec<Point3> {
        let divisions = divisions.max(1);
        (0..=divisions)
            .map(|j| self.curve.point_at(j as f64 / divisions as f64))
            .collect()
    }

    /// Cumulative chord lengths matching [`Self::points`]; the first value is 0.
    #[must_use]
    pub fn cumulative_lengths(&self, divisions: usize) -> Vec<f64> {
        cumulative_chord_lengths(&self.points(divisions))
    }

    /// Positions and cumulative lengths at the same resolution.
    #[must_use]
    pub fn sample(&self, divisions: usize) -> SampledCurve {
        let positions = self.points(divisions);
        let cumulative_lengths = cumulative_chord_lengths(&positions);
        SampledCurve {
            positions,
            cumulative_lengths,
        }
    }

    /// Curve parameter at a fraction `u` of the total arc length.
    #[must_use]
    pub fn parameter_at_length_fraction(&self, u: f64) -> f64 {
        let (t0, t1) = self.curve.domain();
        let target = u.clamp(0.0, 1.0) * self.length();
        parameter_at_arc_length(&self.table, t0, t1, target)
    }

    #[must_use]
    pub fn point_at_length_fraction(&self, u: f64) -> Point3 {
        self.curve.point_at(self.parameter_at_length_fraction(u))
    }

    #[must_use]
    pub fn tangent_at_length_fraction(&self, u: f64) -> Option<Vec3> {
        self.curve.tangent_at(self.parameter_at_length_fraction(u))
    }

    /// `divisions + 1` positions at uniform arc-length fractions.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn spaced_points(&self, divisions: usize) -> Vec<Point3> {
        let divisions = divisions.max(1);
        (0..=divisions)
            .map(|j| self.point_at_length_fraction(j as f64 / divisions as f64))
            .collect()
    }
}

fn cumulative_chord_lengths(points: &[Point3]) -> Vec<f64> {
    let mut lengths = Vec::with_capacity(points.len());
    let mut cumulative = 0.0;
    let mut prev: Option<Point3> = None;
    for p in points.iter().copied() {
        if let Some(prev) = prev {
            cumulative += p.distance_to(prev);
        }
        lengths.push(cumulative);
        prev = Some(p);
    }
    lengths
}
