use crate::geom::{
    CatmullRom3, CurveSampler, Frame, FrameError, Point3, SEED_BINORMAL, Tolerance, Vec3,
    horizontal_frame_step, horizontal_frames, parallel_transport_frames,
};

fn assert_orthonormal(frame: &Frame) {
    assert!((frame.tangent.length() - 1.0).abs() < 1e-9);
    assert!((frame.normal.length() - 1.0).abs() < 1e-9);
    assert!((frame.binormal.length() - 1.0).abs() < 1e-9);
    assert!(frame.tangent.dot(frame.normal).abs() < 1e-9);
    assert!(frame.tangent.dot(frame.binormal).abs() < 1e-9);
    assert!(frame.normal.dot(frame.binormal).abs() < 1e-9);
}

fn hilly_loop() -> CurveSampler<CatmullRom3> {
    CurveSampler::new(
        CatmullRom3::closed(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(8.0, 0.0, 1.0),
            Point3::new(8.0, 6.0, 2.0),
            Point3::new(0.0, 6.0, 0.5),
        ])
        .unwrap(),
    )
}

#[test]
fn horizontal_frames_cover_every_sample() {
    let frames = horizontal_frames(&hilly_loop(), 24, Tolerance::default_geom()).unwrap();
    assert_eq!(frames.len(), 25);
}

#[test]
fn horizontal_normals_stay_in_the_ground_plane() {
    let frames = horizontal_frames(&hilly_loop(), 40, Tolerance::default_geom()).unwrap();
    for frame in &frames {
        assert_eq!(frame.normal.z, 0.0);
        assert!((frame.normal.length() - 1.0).abs() < 1e-12);
        assert!((frame.binormal.length() - 1.0).abs() < 1e-12);
    }
}

#[test]
fn planar_track_keeps_binormal_up() {
    let sampler = CurveSampler::new(
        CatmullRom3::closed(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(5.0, 5.0, 0.0),
            Point3::new(0.0, 5.0, 0.0),
        ])
        .unwrap(),
    );
    let frames = horizontal_frames(&sampler, 16, Tolerance::default_geom()).unwrap();
    for frame in &frames {
        assert!(frame.binormal.sub(Vec3::Z).length() < 1e-9);
        // Normal points to the right of the direction of travel.
        let right = frame.tangent.cross(Vec3::Z);
        assert!(frame.normal.dot(right) > 0.0);
    }
}

#[test]
fn vertical_tangent_is_reported_with_index() {
    let err =
        horizontal_frame_step(SEED_BINORMAL, Vec3::Z, 3, Tolerance::default_geom()).unwrap_err();
    assert_eq!(err, FrameError::DegenerateNormal { index: 3 });
    assert_eq!(err.index(), Some(3));
}

#[test]
fn zero_segments_is_an_error() {
    let err = horizontal_frames(&hilly_loop(), 0, Tolerance::default_geom()).unwrap_err();
    assert_eq!(err, FrameError::NoSegments);
    assert_eq!(err.index(), None);
}

#[test]
fn parallel_transport_on_straight_line_is_constant() {
    let tangents = vec![Vec3::X; 5];
    let frames = parallel_transport_frames(&tangents, Tolerance::default_geom()).unwrap();
    assert_eq!(frames.len(), 5);
    for frame in &frames {
        assert_orthonormal(frame);
        assert_eq!(frame.normal, frames[0].normal);
    }
}

#[test]
fn parallel_transport_follows_a_turn() {
    let tangents: Vec<Vec3> = (0..=8)
        .map(|i| {
            let a = std::f64::consts::FRAC_PI_2 * f64::from(i) / 8.0;
            Vec3::new(a.cos(), a.sin(), 0.0)
        })
        .collect();
    let frames = parallel_transport_frames(&tangents, Tolerance::default_geom()).unwrap();
    for (frame, tangent) in frames.iter().zip(&tangents) {
        assert_orthonormal(frame);
        assert!(frame.tangent.sub(*tangent).length() < 1e-12);
    }
}

#[test]
fn parallel_transport_needs_tangents() {
    assert_eq!(
        parallel_transport_frames(&[], Tolerance::default_geom()).unwrap_err(),
        FrameError::NoSegments
    );
    assert_eq!(
        parallel_transport_frames(&[Vec3::X, Vec3::ZERO], Tolerance::default_geom()).unwrap_err(),
        FrameError::DegenerateTangent { index: 1 }
    );
}

#[test]
fn frame_from_tangent_is_orthonormal() {
    for tangent in [Vec3::X, Vec3::Y, Vec3::Z, Vec3::new(1.0, 2.0, -3.0)] {
        let frame = Frame::from_tangent(tangent).unwrap();
        assert_orthonormal(&frame);
    }
    assert!(Frame::from_tangent(Vec3::ZERO).is_none());
}
