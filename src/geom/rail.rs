//! Rail centerlines taken from fixed columns of the ribbon grid.

use serde::Serialize;

use super::Point3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RailSide {
    Left,
    Right,
}

impl RailSide {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left_rail",
            Self::Right => "right_rail",
        }
    }
}

/// Ordered open polyline: one point per ribbon row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RailCurve {
    pub side: RailSide,
    /// Ribbon column the points were taken from.
    pub column: usize,
    #[serde(serialize_with = "serialize_points")]
    pub points: Vec<Point3>,
}

impl RailCurve {
    #[must_use]
    pub fn new(side: RailSide, column: usize, points: Vec<Point3>) -> Self {
        Self {
            side,
            column,
            points,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Polyline length through the recorded points.
    #[must_use]
    pub fn polyline_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[1].distance_to(pair[0]))
            .sum()
    }
}

fn serialize_points<S>(points: &[Point3], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(points.iter().map(|p| p.to_array()))
}

/// Collects the two rail columns while ribbon rows are generated.
#[derive(Debug, Clone)]
pub struct RailExtractor {
    left: RailCurve,
    right: RailCurve,
}

impl RailExtractor {
    #[must_use]
    pub fn new(left_column: usize, right_column: usize, rows: usize) -> Self {
        Self {
            left: RailCurve::new(RailSide::Left, left_column, Vec::with_capacity(rows)),
            right: RailCurve::new(RailSide::Right, right_column, Vec::with_capacity(rows)),
        }
    }

    /// Records one ribbon row. Columns missing from `row` are skipped.
    pub fn record_row(&mut self, row: &[Point3]) {
        if let Some(p) = row.get(self.left.column) {
            self.left.points.push(*p);
        }
        if let Some(p) = row.get(self.right.column) {
            self.right.points.push(*p);
        }
    }

    #[must_use]
    pub fn finish(self) -> (RailCurve, RailCurve) {
        (self.left, self.right)
    }
}

/// Reads column `column` from a row-major grid with `columns` vertices per row.
#[must_use]
pub fn extract_column(positions: &[[f64; 3]], columns: usize, column: usize) -> Vec<Point3> {
    if columns == 0 || column >= columns {
        return Vec::new();
    }
    positions
        .chunks_exact(columns)
        .map(|row| Point3::from_array(row[column]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extractor_records_requested_columns() {
        let mut extractor = RailExtractor::new(0, 2, 2);
        extractor.record_row(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ]);
        extractor.record_row(&[
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ]);
        let (left, right) = extractor.finish();
        assert_eq!(left.side, RailSide::Left);
        assert_eq!(left.points, vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)]);
        assert_eq!(right.points, vec![Point3::new(2.0, 0.0, 0.0), Point3::new(2.0, 1.0, 0.0)]);
        assert!((right.polyline_length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn extract_column_from_grid() {
        let grid = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
        let column = extract_column(&grid, 2, 1);
        assert_eq!(column, vec![Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0)]);
        assert!(extract_column(&grid, 2, 2).is_empty());
    }
}
