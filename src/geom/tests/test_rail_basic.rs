use crate::geom::{
    CatmullRom3, CurveSampler, LaneLayout, Point3, RailSide, Tolerance, build_ribbon,
    extract_column, horizontal_frames,
};

fn loop_sampler() -> CurveSampler<CatmullRom3> {
    CurveSampler::new(
        CatmullRom3::closed(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(6.0, 0.0, 0.5),
            Point3::new(6.0, 6.0, 1.0),
            Point3::new(0.0, 6.0, 0.5),
        ])
        .unwrap(),
    )
}

#[test]
fn rails_match_ribbon_columns() {
    let sampler = loop_sampler();
    let tol = Tolerance::default_geom();
    let sampled = sampler.sample(30);
    let frames = horizontal_frames(&sampler, 30, tol).unwrap();
    let layout = LaneLayout::default();
    let ribbon = build_ribbon(&sampled, &frames, &layout, 1.0, tol).unwrap();

    assert_eq!(ribbon.left_rail.side, RailSide::Left);
    assert_eq!(ribbon.right_rail.side, RailSide::Right);
    assert_eq!(ribbon.left_rail.column, 2);
    assert_eq!(ribbon.right_rail.column, 4);
    assert_eq!(ribbon.left_rail.len(), 31);
    assert_eq!(ribbon.right_rail.len(), 31);

    assert_eq!(
        ribbon.left_rail.points,
        extract_column(&ribbon.mesh.positions, layout.columns(), 2)
    );
    assert_eq!(
        ribbon.right_rail.points,
        extract_column(&ribbon.mesh.positions, layout.columns(), 4)
    );
}

#[test]
fn default_rails_sit_at_asymmetric_offsets() {
    let sampler = loop_sampler();
    let tol = Tolerance::default_geom();
    let sampled = sampler.sample(20);
    let frames = horizontal_frames(&sampler, 20, tol).unwrap();
    let ribbon = build_ribbon(&sampled, &frames, &LaneLayout::default(), 2.0, tol).unwrap();

    for ((center, left), right) in sampled
        .positions
        .iter()
        .zip(&ribbon.left_rail.points)
        .zip(&ribbon.right_rail.points)
    {
        assert!((center.distance_to(*left) - 0.7).abs() < 1e-9);
        assert!((center.distance_to(*right) - 0.9).abs() < 1e-9);
        assert_eq!(left.z, center.z);
        assert_eq!(right.z, center.z);
    }
}

#[test]
fn flat_closed_track_rails_start_where_they_end() {
    let sampler = CurveSampler::new(
        CatmullRom3::closed(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(6.0, 0.0, 0.0),
            Point3::new(6.0, 6.0, 0.0),
            Point3::new(0.0, 6.0, 0.0),
        ])
        .unwrap(),
    );
    let tol = Tolerance::default_geom();
    let sampled = sampler.sample(16);
    let frames = horizontal_frames(&sampler, 16, tol).unwrap();
    let ribbon = build_ribbon(&sampled, &frames, &LaneLayout::default(), 1.0, tol).unwrap();

    let first = ribbon.left_rail.points[0];
    let last = ribbon.left_rail.points[16];
    assert!(Tolerance::new(1e-9).approx_eq_point3(first, last));
    assert!(ribbon.left_rail.polyline_length() > 0.0);
}

#[test]
fn rail_names() {
    assert_eq!(RailSide::Left.name(), "left_rail");
    assert_eq!(RailSide::Right.name(), "right_rail");
}
