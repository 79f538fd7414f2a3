use crate::geom::mesh::signed_volume;
use crate::geom::{
    CatmullRom3, CurveError, CurveSampler, ExtrusionCaps, ExtrusionError, Point3, ProfileError,
    RailExtrusionOptions, RailProfile, ResolutionPolicy, extrude_rail,
};

fn straight_rail() -> Vec<Point3> {
    (0..=10).map(|i| Point3::new(f64::from(i), 0.0, 0.0)).collect()
}

#[allow(clippy::cast_precision_loss)]
fn quarter_arc() -> Vec<Point3> {
    (0..=12)
        .map(|i| {
            let a = std::f64::consts::FRAC_PI_2 * i as f64 / 12.0;
            Point3::new(5.0 * a.cos(), 5.0 * a.sin(), 0.2 * i as f64)
        })
        .collect()
}

fn points(mesh: &crate::geom::Mesh) -> Vec<Point3> {
    mesh.positions.iter().copied().map(Point3::from_array).collect()
}

#[test]
fn straight_rail_is_a_closed_box() {
    let options = RailExtrusionOptions::default();
    let rail = extrude_rail(&straight_rail(), RailProfile::default(), options).unwrap();

    assert!((rail.path_length - 10.0).abs() < 1e-9);
    assert_eq!(rail.steps, 20);
    assert_eq!(rail.mesh.vertex_count(), 21 * 4);
    assert_eq!(rail.mesh.triangle_count(), 8 * 20 + 4);
    assert!(rail.diagnostics.is_valid_solid());
    assert_eq!(rail.diagnostics.degenerate_triangle_count, 0);
    assert!(rail.mesh.uvs.is_none());
    assert!(rail.mesh.normals.is_some());
    assert!(rail.mesh.validate().is_ok());

    let volume = signed_volume(&points(&rail.mesh), &rail.mesh.indices);
    assert!((volume - 10.0 * 0.1 * 0.05).abs() < 1e-9);
}

#[test]
fn curved_rail_triangle_count_scales_with_steps() {
    let rail_points = quarter_arc();
    let rail = extrude_rail(&rail_points, RailProfile::default(), RailExtrusionOptions::default())
        .unwrap();

    let sampler = CurveSampler::new(CatmullRom3::open(rail_points).unwrap());
    let steps = ResolutionPolicy::default().steps_for_length(sampler.length());
    assert_eq!(rail.steps, steps);
    assert_eq!(rail.mesh.triangle_count(), 8 * steps + 4);
    assert!(rail.diagnostics.is_valid_solid());
    assert!(signed_volume(&points(&rail.mesh), &rail.mesh.indices) > 0.0);
}

#[test]
fn rail_without_caps_is_an_open_tube() {
    let options = RailExtrusionOptions {
        caps: ExtrusionCaps::NONE,
        ..RailExtrusionOptions::default()
    };
    let rail = extrude_rail(&straight_rail(), RailProfile::default(), options).unwrap();

    assert_eq!(rail.mesh.triangle_count(), 8 * 20);
    assert_eq!(rail.diagnostics.open_edge_count, 8);
    assert_eq!(rail.diagnostics.non_manifold_edge_count, 0);
}

#[test]
fn density_controls_rail_steps() {
    let options = RailExtrusionOptions {
        resolution: ResolutionPolicy::new(1.0),
        ..RailExtrusionOptions::default()
    };
    let rail = extrude_rail(&straight_rail(), RailProfile::default(), options).unwrap();
    assert_eq!(rail.steps, 10);
    assert_eq!(rail.mesh.triangle_count(), 84);
}

#[test]
fn short_rail_is_rejected() {
    let rail = [Point3::ORIGIN, Point3::new(0.1, 0.0, 0.0)];
    let options = RailExtrusionOptions::default();
    let err = extrude_rail(&rail, RailProfile::default(), options).unwrap_err();
    assert!(matches!(err, ExtrusionError::RailTooShort { .. }));
}

#[test]
fn invalid_profile_and_path_are_rejected() {
    let err = extrude_rail(
        &straight_rail(),
        RailProfile::new(-0.1, 0.05),
        RailExtrusionOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err, ExtrusionError::Profile(ProfileError::InvalidWidth(-0.1)));

    let options = RailExtrusionOptions::default();
    let err = extrude_rail(&[Point3::ORIGIN], RailProfile::default(), options).unwrap_err();
    assert_eq!(err, ExtrusionError::Curve(CurveError::TooFewPoints { count: 1 }));
}
