use track_engine::geom::{
    CatmullRom3, CurveSampler, LaneLayout, Point3, RailProfile, ResolutionPolicy,
};
use track_engine::{
    GeometryError, TrackConfig, TrackError, TrackErrorKind, TrackPath, generate, generate_batch,
};

#[allow(clippy::cast_precision_loss)]
fn ring(count: usize, radius: f64, hill: f64) -> TrackPath {
    let points: Vec<[f64; 3]> = (0..count)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / count as f64;
            [radius * a.cos(), radius * a.sin(), hill * (2.0 * a).sin()]
        })
        .collect();
    TrackPath::from_arrays(&points).expect("valid ring")
}

/// Circle with a circumference of 40 units.
fn forty_unit_ring() -> TrackPath {
    ring(64, 40.0 / std::f64::consts::TAU, 0.0)
}

#[test]
fn forty_unit_track_has_reference_counts() {
    let geometry = generate(&forty_unit_ring(), &TrackConfig::default()).expect("generate");

    assert!((geometry.total_length - 40.0).abs() < 0.1);
    assert_eq!(geometry.steps, 80);
    assert_eq!(geometry.ribbon.vertex_count(), 486);
    assert_eq!(geometry.ribbon.triangle_count(), 800);
    assert_eq!(geometry.diagnostics.ribbon.triangle_count, 800);
    assert_eq!(geometry.left_rail_curve.len(), 81);
    assert_eq!(geometry.right_rail_curve.len(), 81);
}

#[test]
fn counts_follow_the_step_rule_on_hilly_tracks() {
    let config = TrackConfig::default();
    let geometry = generate(&ring(12, 9.0, 1.5), &config).expect("generate");
    let steps = config.resolution.steps_for_length(geometry.total_length);

    assert_eq!(geometry.steps, steps);
    assert_eq!(geometry.ribbon.vertex_count(), (steps + 1) * 6);
    assert_eq!(geometry.ribbon.triangle_count(), steps * 5 * 2);
}

#[test]
fn ribbon_rows_are_level_and_full_width() {
    let config = TrackConfig::default().with_track_width(3.0);
    let geometry = generate(&ring(10, 8.0, 2.0), &config).expect("generate");

    for row in geometry.ribbon.positions.chunks_exact(6) {
        let first = Point3::from_array(row[0]);
        let last = Point3::from_array(row[5]);
        assert!(row.iter().all(|p| p[2] == row[0][2]));
        let span = ((last.x - first.x).powi(2) + (last.y - first.y).powi(2)).sqrt();
        assert!((span - 1.1 * 3.0).abs() < 1e-9);
    }
}

#[test]
fn uv_u_spans_zero_to_one() {
    let geometry = generate(&forty_unit_ring(), &TrackConfig::default()).expect("generate");
    let uvs = geometry.ribbon.uvs.as_ref().expect("ribbon uvs");
    let last_row = geometry.steps * 6;

    for i in 0..6 {
        assert_eq!(uvs[i][0], 0.0);
        assert_eq!(uvs[last_row + i][0], 1.0);
    }
    assert!(uvs.chunks_exact(6).all(|row| row.iter().all(|uv| uv[0] == row[0][0])));
}

#[test]
fn tiling_uses_total_length() {
    let config = TrackConfig::default().with_tile_repeat(0.5, 3.0);
    let geometry = generate(&forty_unit_ring(), &config).expect("generate");
    assert_eq!(geometry.tiling.repeat_u, geometry.total_length * 0.5);
    assert_eq!(geometry.tiling.repeat_v, 3.0);
}

#[test]
fn material_groups_partition_triangles() {
    let geometry = generate(&ring(16, 6.0, 0.5), &TrackConfig::default()).expect("generate");
    let mesh = &geometry.ribbon;

    assert_eq!(mesh.groups.len(), 5);
    assert!(mesh.has_valid_groups());
    let total: usize = mesh.groups.iter().map(|g| g.triangle_count()).sum();
    assert_eq!(total, mesh.triangle_count());
    for group in &mesh.groups {
        assert_eq!(group.triangle_count(), geometry.steps * 2);
    }
}

#[test]
fn rails_are_closed_solids() {
    let config = TrackConfig::default();
    let geometry = generate(&ring(20, 7.0, 1.0), &config).expect("generate");

    for (mesh, curve, diag) in [
        (
            &geometry.left_rail,
            &geometry.left_rail_curve,
            &geometry.diagnostics.left_rail,
        ),
        (
            &geometry.right_rail,
            &geometry.right_rail_curve,
            &geometry.diagnostics.right_rail,
        ),
    ] {
        assert_eq!(curve.len(), geometry.steps + 1);

        let spline = CatmullRom3::open(curve.points.clone()).expect("rail spline");
        let sampler = CurveSampler::new(spline);
        let rail_steps = config.resolution.steps_for_length(sampler.length());
        assert_eq!(mesh.triangle_count(), 8 * rail_steps + 4);
        assert_eq!(mesh.vertex_count(), (rail_steps + 1) * 4);
        assert!(diag.is_valid_solid(), "{}", diag.summary());
    }
    assert!(geometry.diagnostics.rails_are_solid());
}

#[test]
fn generation_is_deterministic() {
    let config = TrackConfig::default();
    let path = ring(14, 10.0, 1.0);
    let a = generate(&path, &config).expect("generate");
    let b = generate(&path, &config).expect("generate");
    assert_eq!(a, b);
}

#[test]
fn invalid_paths_are_reported() {
    let err: TrackError = TrackPath::from_arrays(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]])
        .unwrap_err()
        .into();
    assert_eq!(err.kind(), TrackErrorKind::InvalidPath);

    let points = [[0.0, 0.0, 0.0], [1.0, 0.0, f64::NAN], [0.0, 1.0, 0.0]];
    let err: TrackError = TrackPath::from_arrays(&points).unwrap_err().into();
    assert_eq!(err.kind(), TrackErrorKind::InvalidPath);
}

#[test]
fn tiny_tracks_are_degenerate() {
    let err = generate(&ring(8, 0.02, 0.0), &TrackConfig::default()).unwrap_err();
    assert_eq!(err.kind(), TrackErrorKind::DegenerateGeometry);
}

#[test]
fn coincident_points_are_degenerate() {
    let path = TrackPath::from_arrays(&[[1.0, 1.0, 1.0]; 4]).expect("finite points");
    let err = generate(&path, &TrackConfig::default()).unwrap_err();
    assert_eq!(err.kind(), TrackErrorKind::DegenerateGeometry);
}

#[test]
fn vertical_track_has_no_horizontal_frame() {
    let path = TrackPath::from_arrays(&[[0.0, 0.0, 0.0], [0.0, 0.0, 4.0], [0.0, 0.0, 8.0]])
        .expect("finite points");
    let err = generate(&path, &TrackConfig::default()).unwrap_err();
    assert_eq!(err.kind(), TrackErrorKind::DegenerateGeometry);
    assert!(
        matches!(err, TrackError::DegenerateGeometry(GeometryError::Frame(_))),
        "{err}"
    );
}

#[test]
fn oversized_track_is_reported_not_allocated() {
    let side = 1e13;
    let path = TrackPath::from_arrays(&[
        [0.0, 0.0, 0.0],
        [side, 0.0, 0.0],
        [side, side, 0.0],
        [0.0, side, 0.0],
    ])
    .expect("finite points");
    let err = generate(&path, &TrackConfig::default()).unwrap_err();
    assert_eq!(err.kind(), TrackErrorKind::DegenerateGeometry);
}

#[test]
fn bad_configuration_is_reported() {
    let path = forty_unit_ring();
    let configs = [
        TrackConfig::default().with_rail_profile(RailProfile::new(0.0, 0.05)),
        TrackConfig::default().with_lanes(LaneLayout::default().with_offsets(vec![0.5])),
        TrackConfig::default().with_lanes(
            LaneLayout::default().with_offsets(vec![-0.5, 0.0, f64::NAN]),
        ),
        TrackConfig::default().with_resolution(ResolutionPolicy::new(0.0)),
        TrackConfig::default().with_tile_repeat(2.0, -1.0),
    ];
    for config in &configs {
        let err = generate(&path, config).unwrap_err();
        assert_eq!(err.kind(), TrackErrorKind::Configuration, "{err}");
    }
}

#[test]
fn batch_matches_single_generation() {
    let config = TrackConfig::default();
    let paths = [ring(12, 5.0, 0.0), ring(8, 0.02, 0.0), ring(24, 9.0, 1.0)];
    let results = generate_batch(&paths, &config);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().ok(), generate(&paths[0], &config).as_ref().ok());
    assert!(results[1].is_err());
    assert_eq!(results[2].as_ref().ok(), generate(&paths[2], &config).as_ref().ok());
}

#[test]
fn default_config_matches_reference_values() {
    let config = TrackConfig::default();
    assert_eq!(config.track_width, 1.0);
    assert_eq!(config.tile_repeat_scale, 2.0);
    assert_eq!(config.tile_repeat_v, 2.0);
    assert_eq!(config.lanes.offsets, vec![-0.55, -0.45, -0.35, 0.35, 0.45, 0.55]);
    assert_eq!(config.lanes.left_rail_column, 2);
    assert_eq!(config.lanes.right_rail_column, 4);
    assert_eq!(config.rail_profile, RailProfile::new(0.1, 0.05));
}
