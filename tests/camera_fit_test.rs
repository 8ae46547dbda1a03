use cgmath::{Deg, InnerSpace, Point3};
use holo_terrain::{
    camera::{
        Camera, CameraFrame,
        fit::{self, DEFAULT_PADDING, FAR_FACTOR, MIN_FIT_DISTANCE, NEAR_PLANE, fit_distance},
        orbit::OrbitControls,
    },
    data_structures::extent::BoundingExtent,
};

use crate::common::test_utils::assert_close;

mod common;

fn extent_of_size(x: f32, y: f32, z: f32) -> BoundingExtent {
    BoundingExtent::new(
        Point3::new(-x / 2.0, -y / 2.0, -z / 2.0),
        Point3::new(x / 2.0, y / 2.0, z / 2.0),
    )
}

#[test]
fn fit_distance_grows_with_size_and_padding() {
    let sizes = [0.001, 0.5, 1.0, 10.0, 250.0, 10_000.0];
    let paddings = [0.5, 0.9, 1.0, 1.1, 2.0];
    for fov in [30.0, 60.0, 90.0] {
        for padding in paddings {
            for pair in sizes.windows(2) {
                assert!(
                    fit_distance(pair[0], Deg(fov), padding) < fit_distance(pair[1], Deg(fov), padding),
                    "not increasing in size at {pair:?}, padding {padding}, fov {fov}"
                );
            }
        }
        for size in sizes {
            for pair in paddings.windows(2) {
                assert!(
                    fit_distance(size, Deg(fov), pair[0]) < fit_distance(size, Deg(fov), pair[1]),
                    "not increasing in padding at {pair:?}, size {size}, fov {fov}"
                );
            }
        }
    }
}

#[test]
fn far_plane_always_beyond_near_plane() {
    for size in [0.0, 1e-6, 0.01, 1.0, 42.0, 1e5] {
        let mut frame = CameraFrame::new(800, 600, 60.0);
        let mut controls = OrbitControls::default();
        let result = fit::fit(&mut frame, &mut controls, &extent_of_size(size, size, size), 1.1);

        assert_eq!(result.near, NEAR_PLANE);
        assert_close(result.far, result.distance * FAR_FACTOR);
        assert!(result.far > result.near, "far {} <= near {} for size {size}", result.far, result.near);
        assert_eq!(frame.projection.znear(), result.near);
        assert_eq!(frame.projection.zfar(), result.far);
    }
}

#[test]
fn fit_is_idempotent() {
    let extent = BoundingExtent::new(Point3::new(-3.0, 0.0, -1.0), Point3::new(7.0, 4.0, 2.0));
    let mut frame = CameraFrame::new(1024, 768, 60.0);
    let mut controls = OrbitControls::default();

    let first = fit::fit(&mut frame, &mut controls, &extent, 1.1);
    let camera_after_first = frame.camera.clone();
    let second = fit::fit(&mut frame, &mut controls, &extent, 1.1);

    assert_eq!(first, second);
    assert_eq!(frame.camera, camera_after_first);
    assert_eq!(controls.target, Point3::new(0.0, 0.0, 0.0));
}

#[test]
fn fit_drops_pending_orbit_motion() {
    let extent = extent_of_size(4.0, 1.0, 4.0);
    let mut frame = CameraFrame::new(800, 600, 60.0);
    let mut controls = OrbitControls::default();
    controls.rotate(0.8, -0.3);
    controls.zoom(0.5);

    let result = fit::fit(&mut frame, &mut controls, &extent, 1.1);

    assert!(controls.is_idle());
    assert_eq!(frame.camera.position, result.position);
    assert!(!controls.update(&mut frame.camera));
    assert_eq!(frame.camera.position, result.position);
}

#[test]
fn frames_ten_by_two_by_ten_extent() {
    let extent = extent_of_size(10.0, 2.0, 10.0);
    let mut frame = CameraFrame::new(800, 600, 60.0);
    let mut controls = OrbitControls::default();

    let result = fit::fit(&mut frame, &mut controls, &extent, 0.9);

    // (5 / tan(30°)) * 0.9
    assert_close(result.distance, 7.794);
    assert_eq!(result.max_dim, 10.0);
    assert_close(frame.camera.position.x, 0.0);
    // elevation follows the largest dimension
    assert_close(frame.camera.position.y, 6.0);
    assert_close(frame.camera.position.z, 7.794);
    assert_eq!(frame.camera.target, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(controls.target, Point3::new(0.0, 0.0, 0.0));
}

#[test]
fn flat_extent_uses_largest_dimension() {
    let flat = extent_of_size(8.0, 0.0, 2.0);
    let mut frame = CameraFrame::new(800, 600, 60.0);
    let mut controls = OrbitControls::default();

    let result = fit::fit(&mut frame, &mut controls, &flat, 1.0);

    assert_eq!(result.max_dim, 8.0);
    assert_close(result.distance, fit_distance(8.0, Deg(60.0), 1.0));
}

#[test]
fn degenerate_extent_is_clamped_off_the_target() {
    let point = BoundingExtent::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0));
    let mut frame = CameraFrame::new(800, 600, 60.0);
    let mut controls = OrbitControls::default();

    assert_eq!(fit_distance(0.0, Deg(60.0), 1.1), 0.0);
    let result = fit::fit(&mut frame, &mut controls, &point, 1.1);

    assert_eq!(result.distance, MIN_FIT_DISTANCE);
    assert_ne!(frame.camera.position, frame.camera.target);
    assert!(frame.view_proj().x.x.is_finite());
}

#[test]
fn invalid_padding_falls_back_to_default() {
    let extent = extent_of_size(2.0, 2.0, 2.0);
    for padding in [0.0, -1.0, f32::NAN, f32::INFINITY] {
        let mut frame = CameraFrame::new(800, 600, 45.0);
        let mut controls = OrbitControls::default();
        let result = fit::fit(&mut frame, &mut controls, &extent, padding);
        assert_close(result.distance, fit_distance(2.0, Deg(45.0), DEFAULT_PADDING));
    }
}

#[test]
fn wheel_zoom_stops_at_the_near_plane() {
    let mut camera = Camera::new((0.0, 0.0, 1.0), (0.0, 0.0, 0.0));
    let mut controls = OrbitControls::default();

    for _ in 0..50 {
        controls.zoom(0.01);
        controls.update(&mut camera);
    }

    let radius = (camera.position - camera.target).magnitude();
    assert!(radius >= NEAR_PLANE * 0.999, "radius {radius} closer than the near plane");
    assert_close(radius, NEAR_PLANE);
}
