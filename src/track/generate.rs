//! Track generation: centerline sampling, horizontal frames, ribbon and rails.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use crate::geom::{
    CurveSampler, ExtrusionCaps, Mesh, MeshDiagnostics, RailCurve, RailExtrusionOptions,
    RailSide, Tolerance, build_ribbon, extrude_rail_with_tolerance, horizontal_frames,
};

use super::config::{TextureTiling, TrackConfig};
use super::error::{GeometryError, TrackResult};
use super::path::TrackPath;

/// Per-mesh diagnostics of one generated track.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackDiagnostics {
    pub ribbon: MeshDiagnostics,
    pub left_rail: MeshDiagnostics,
    pub right_rail: MeshDiagnostics,
}

impl TrackDiagnostics {
    /// Both rails are closed manifold solids.
    #[must_use]
    pub fn rails_are_solid(&self) -> bool {
        self.left_rail.is_valid_solid() && self.right_rail.is_valid_solid()
    }

    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "ribbon [{}] left_rail [{}] right_rail [{}]",
            self.ribbon.summary(),
            self.left_rail.summary(),
            self.right_rail.summary()
        )
    }
}

/// Everything generated for one closed track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackGeometry {
    /// Lane ribbon; one material group per lane.
    pub ribbon: Mesh,
    pub left_rail: Mesh,
    pub right_rail: Mesh,
    pub left_rail_curve: RailCurve,
    pub right_rail_curve: RailCurve,
    pub tiling: TextureTiling,
    /// Centerline segments; the ribbon has `steps + 1` rows.
    pub steps: usize,
    /// Arc length of the centerline spline.
    pub total_length: f64,
    pub diagnostics: TrackDiagnostics,
}

impl TrackGeometry {
    #[must_use]
    pub fn rail(&self, side: RailSide) -> (&Mesh, &RailCurve) {
        match side {
            RailSide::Left => (&self.left_rail, &self.left_rail_curve),
            RailSide::Right => (&self.right_rail, &self.right_rail_curve),
        }
    }
}

pub fn generate(path: &TrackPath, config: &TrackConfig) -> TrackResult<TrackGeometry> {
    generate_with_tolerance(path, config, Tolerance::default_geom())
}

pub fn generate_with_tolerance(
    path: &TrackPath,
    config: &TrackConfig,
    tol: Tolerance,
) -> TrackResult<TrackGeometry> {
    config.validate()?;

    let sampler = CurveSampler::new(path.spline()?);
    let total_length = sampler.length();
    let steps = config.resolution.steps_for_length(total_length);
    log::debug!(
        "track centerline: {} control points, length {total_length:.4}, {steps} steps",
        path.len()
    );
    if steps == 0 {
        return Err(GeometryError::TooShort {
            length: total_length,
        }
        .into());
    }
    let columns = config.lanes.columns();
    let vertex_count = steps
        .checked_add(1)
        .and_then(|rows| rows.checked_mul(columns))
        .filter(|&count| u32::try_from(count).is_ok());
    if vertex_count.is_none() {
        return Err(GeometryError::TooManyVertices { steps, columns }.into());
    }

    let sampled = sampler.sample(steps);
    let frames = horizontal_frames(&sampler, steps, tol).map_err(GeometryError::from)?;
    let ribbon = build_ribbon(&sampled, &frames, &config.lanes, config.track_width, tol)
        .map_err(GeometryError::from)?;
    log::debug!("ribbon: {}", ribbon.diagnostics.summary());

    let options = RailExtrusionOptions {
        caps: ExtrusionCaps::BOTH,
        resolution: config.resolution,
    };
    let left =
        extrude_rail_with_tolerance(&ribbon.left_rail.points, config.rail_profile, options, tol)
            .map_err(|source| GeometryError::Rail {
                side: RailSide::Left,
                source,
            })?;
    let right =
        extrude_rail_with_tolerance(&ribbon.right_rail.points, config.rail_profile, options, tol)
            .map_err(|source| GeometryError::Rail {
                side: RailSide::Right,
                source,
            })?;

    for (side, rail) in [(RailSide::Left, &left), (RailSide::Right, &right)] {
        log::debug!("{}: {} steps, {}", side.name(), rail.steps, rail.diagnostics.summary());
        if !rail.diagnostics.is_valid_solid() {
            log::warn!("{} is not a closed solid: {}", side.name(), rail.diagnostics.summary());
        }
    }

    Ok(TrackGeometry {
        ribbon: ribbon.mesh,
        left_rail: left.mesh,
        right_rail: right.mesh,
        left_rail_curve: ribbon.left_rail,
        right_rail_curve: ribbon.right_rail,
        tiling: config.tiling(total_length),
        steps,
        total_length,
        diagnostics: TrackDiagnostics {
            ribbon: ribbon.diagnostics,
            left_rail: left.diagnostics,
            right_rail: right.diagnostics,
        },
    })
}

/// Generates independent tracks with one shared configuration. Results keep the
/// input order.
#[cfg(feature = "parallel")]
pub fn generate_batch(
    paths: &[TrackPath],
    config: &TrackConfig,
) -> Vec<TrackResult<TrackGeometry>> {
    paths.par_iter().map(|path| generate(path, config)).collect()
}

/// Generates independent tracks with one shared configuration. Results keep the
/// input order.
#[cfg(not(feature = "parallel"))]
pub fn generate_batch(
    paths: &[TrackPath],
    config: &TrackConfig,
) -> Vec<TrackResult<TrackGeometry>> {
    paths.iter().map(|path| generate(path, config)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{TrackError, TrackErrorKind};

    fn square(side: f64) -> TrackPath {
        TrackPath::from_arrays(&[
            [0.0, 0.0, 0.0],
            [side, 0.0, 0.0],
            [side, side, 0.0],
            [0.0, side, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn counts_follow_step_rule() {
        let config = TrackConfig::default();
        let geometry = generate(&square(10.0), &config).unwrap();
        let steps = config.resolution.steps_for_length(geometry.total_length);

        assert_eq!(geometry.steps, steps);
        assert_eq!(geometry.ribbon.vertex_count(), (steps + 1) * 6);
        assert_eq!(geometry.ribbon.triangle_count(), steps * 5 * 2);
        assert_eq!(geometry.left_rail_curve.len(), steps + 1);
        assert_eq!(geometry.right_rail_curve.len(), steps + 1);
        assert_eq!(geometry.tiling.repeat_u, geometry.total_length * 2.0);
    }

    #[test]
    fn tiny_path_is_degenerate() {
        let err = generate(&square(0.01), &TrackConfig::default()).unwrap_err();
        assert_eq!(err.kind(), TrackErrorKind::DegenerateGeometry);
    }

    #[test]
    fn invalid_config_is_reported_before_sampling() {
        let config = TrackConfig::default().with_track_width(-2.0);
        let err = generate(&square(0.01), &config).unwrap_err();
        assert_eq!(err.kind(), TrackErrorKind::Configuration);
    }

    #[test]
    fn oversized_track_is_rejected_before_sampling() {
        let err = generate(&square(1e13), &TrackConfig::default()).unwrap_err();
        assert_eq!(err.kind(), TrackErrorKind::DegenerateGeometry);
        assert!(matches!(
            err,
            TrackError::DegenerateGeometry(GeometryError::TooManyVertices { columns: 6, .. })
        ));
    }

    #[test]
    fn batch_keeps_order() {
        let paths = [square(10.0), square(0.01), square(5.0)];
        let results = generate_batch(&paths, &TrackConfig::default());
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        let small = results[2].as_ref().unwrap();
        let large = results[0].as_ref().unwrap();
        assert!(small.steps < large.steps);
    }
}
