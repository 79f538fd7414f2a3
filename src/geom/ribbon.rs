//! Width-segmented ribbon mesh along a sampled centerline.
//!
//! The grid has one row per curve sample and one column per lane offset. Every
//! vertex is the centerline point shifted along the horizontal frame normal;
//! heights come straight from the centerline. Triangles are emitted lane by lane
//! so each lane forms one contiguous [`MaterialGroup`].

use serde::{Deserialize, Serialize};

use super::curve::SampledCurve;
use super::diagnostics::MeshDiagnostics;
use super::frame::Frame;
use super::mesh::{MaterialGroup, Mesh, finalize_mesh};
use super::rail::{RailCurve, RailExtractor};
use super::{Point3, Tolerance};

/// Lateral offsets (fractions of the track width) of the ribbon columns.
pub const DEFAULT_LANE_OFFSETS: [f64; 6] = [-0.55, -0.45, -0.35, 0.35, 0.45, 0.55];
pub const DEFAULT_LEFT_RAIL_COLUMN: usize = 2;
pub const DEFAULT_RIGHT_RAIL_COLUMN: usize = 4;

/// Column layout of the ribbon and the columns that seed the rails.
///
/// The default rail columns are asymmetric (`-0.35` on the left, `+0.45` on the
/// right); they are kept so existing tracks keep their rail placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneLayout {
    pub offsets: Vec<f64>,
    pub left_rail_column: usize,
    pub right_rail_column: usize,
}

impl Default for LaneLayout {
    fn default() -> Self {
        Self {
            offsets: DEFAULT_LANE_OFFSETS.to_vec(),
            left_rail_column: DEFAULT_LEFT_RAIL_COLUMN,
            right_rail_column: DEFAULT_RIGHT_RAIL_COLUMN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("lane layout requires at least 2 offsets, got {count}")]
    TooFewOffsets { count: usize },
    #[error("lane offset {index} is not finite")]
    NonFiniteOffset { index: usize },
    #[error("lane offset {index} is not greater than the previous offset")]
    UnsortedOffsets { index: usize },
    #[error("rail column {column} is out of range for {columns} columns")]
    RailColumnOutOfRange { column: usize, columns: usize },
}

impl LaneLayout {
    #[must_use]
    pub fn with_offsets(mut self, offsets: Vec<f64>) -> Self {
        self.offsets = offsets;
        self
    }

    #[must_use]
    pub fn with_rail_columns(mut self, left: usize, right: usize) -> Self {
        self.left_rail_column = left;
        self.right_rail_column = right;
        self
    }

    /// Vertices per row (`wss`).
    #[must_use]
    pub fn columns(&self) -> usize {
        self.offsets.len()
    }

    /// Lanes (quads) per row (`ws`).
    #[must_use]
    pub fn lanes(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn check(&self) -> Result<(), LayoutError> {
        let columns = self.columns();
        if columns < 2 {
            return Err(LayoutError::TooFewOffsets { count: columns });
        }
        if let Some(index) = self.offsets.iter().position(|v| !v.is_finite()) {
            return Err(LayoutError::NonFiniteOffset { index });
        }
        if let Some(index) = (1..columns).find(|&i| self.offsets[i] <= self.offsets[i - 1]) {
            return Err(LayoutError::UnsortedOffsets { index });
        }
        for column in [self.left_rail_column, self.right_rail_column] {
            if column >= columns {
                return Err(LayoutError::RailColumnOutOfRange { column, columns });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum RibbonError {
    #[error("ribbon requires at least 2 samples, got {count}")]
    TooFewSamples { count: usize },
    #[error("expected {expected} frames, got {actual}")]
    FrameCountMismatch { expected: usize, actual: usize },
    #[error("sampled centerline has zero length")]
    ZeroLength,
    #[error("track width must be finite and > 0, got {0}")]
    InvalidWidth(f64),
    #[error("ribbon vertex ({row}, {column}) is not finite")]
    NonFiniteVertex { row: usize, column: usize },
    #[error("ribbon has {0} vertices, more than a 32-bit index buffer can address")]
    TooManyVertices(usize),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Ribbon mesh plus the rail polylines recorded while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Ribbon {
    pub mesh: Mesh,
    pub diagnostics: MeshDiagnostics,
    pub left_rail: RailCurve,
    pub right_rail: RailCurve,
}

/// Builds the ribbon mesh for `sampled.positions` and one frame per sample.
///
/// - vertex `(j, i)`: `centerline[j].xy + width * offsets[i] * normal[j].xy`
/// - quad `(j, i)`: `a = j*wss+i, b = (j+1)*wss+i, c = (j+1)*wss+i+1, d = j*wss+i+1`,
///   triangles `(a, b, c)` and `(a, c, d)` in group `i`
/// - UV `(j, i)`: `(cumulative[j] / cumulative[last], i / ws)`
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn build_ribbon(
    sampled: &SampledCurve,
    frames: &[Frame],
    layout: &LaneLayout,
    width: f64,
    tol: Tolerance,
) -> Result<Ribbon, RibbonError> {
    layout.check()?;
    if !width.is_finite() || width <= 0.0 {
        return Err(RibbonError::InvalidWidth(width));
    }

    let rows = sampled.positions.len();
    if rows < 2 {
        return Err(RibbonError::TooFewSamples { count: rows });
    }
    if frames.len() != rows {
        return Err(RibbonError::FrameCountMismatch {
            expected: rows,
            actual: frames.len(),
        });
    }
    let total = sampled.total_length();
    if !total.is_finite() || tol.is_zero_length(total) {
        return Err(RibbonError::ZeroLength);
    }

    let wss = layout.columns();
    let ws = layout.lanes();
    let ls = rows - 1;

    let vertex_count = rows.saturating_mul(wss);
    if u32::try_from(vertex_count).is_err() {
        return Err(RibbonError::TooManyVertices(vertex_count));
    }

    let mut positions = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);
    let mut rails = RailExtractor::new(layout.left_rail_column, layout.right_rail_column, rows);

    for (j, (center, frame)) in sampled.positions.iter().zip(frames).enumerate() {
        let row = ribbon_row(*center, frame, layout, width);
        if let Some(column) = row.iter().position(|p| !p.is_finite()) {
            return Err(RibbonError::NonFiniteVertex { row: j, column });
        }

        let u = sampled.length_fraction(j);
        uvs.extend((0..wss).map(|i| [u, i as f64 / ws as f64]));
        rails.record_row(&row);
        positions.extend(row);
    }

    let mut indices: Vec<u32> = Vec::with_capacity(ls * ws * 6);
    let mut groups = Vec::with_capacity(ws);
    for i in 0..ws {
        let start = indices.len();
        for j in 0..ls {
            let a = (j * wss + i) as u32;
            let b = ((j + 1) * wss + i) as u32;
            let c = ((j + 1) * wss + i + 1) as u32;
            let d = (j * wss + i + 1) as u32;
            indices.extend_from_slice(&[a, b, c, a, c, d]);
        }
        groups.push(MaterialGroup::new(start, indices.len() - start, i));
    }

    let (mesh, diagnostics) = finalize_mesh(positions, Some(uvs), indices, groups, tol);
    let (left_rail, right_rail) = rails.finish();

    Ok(Ribbon {
        mesh,
        diagnostics,
        left_rail,
        right_rail,
    })
}

/// One grid row: the centerline point shifted by each lane offset along the
/// horizontal part of the frame normal.
#[must_use]
pub fn ribbon_row(center: Point3, frame: &Frame, layout: &LaneLayout, width: f64) -> Vec<Point3> {
    layout
        .offsets
        .iter()
        .map(|offset| center.offset_xy(frame.normal.horizontal().mul_scalar(width * offset)))
        .collect()
}
