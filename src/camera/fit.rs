//! Auto-fit: place the camera so an extent of any scale is fully in view.
//!
//! The distance is the one at which an object of diameter `maxDim` exactly
//! fills the vertical frustum, scaled by a padding factor. The camera sits on
//! the +z axis, lifted by `0.6 * maxDim` for a slightly elevated view, and
//! looks at the world origin. Near and far planes follow the distance so that
//! tiny and huge assets are framed alike.

use cgmath::{Angle, Point3, Rad};

use crate::{
    camera::{CameraFrame, orbit::OrbitControls},
    data_structures::extent::BoundingExtent,
};

/// Scenes are re-centered on the origin before fitting, nothing gets closer.
pub const NEAR_PLANE: f32 = 0.01;
/// `far = distance * FAR_FACTOR`
pub const FAR_FACTOR: f32 = 50.0;
/// Height of the camera relative to the largest dimension.
pub const ELEVATION_FACTOR: f32 = 0.6;
/// Lower bound for the applied distance; a camera on its own target has no view direction.
pub const MIN_FIT_DISTANCE: f32 = NEAR_PLANE;
pub const DEFAULT_PADDING: f32 = 1.1;

/// What [`fit`] applied to the frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitResult {
    pub max_dim: f32,
    pub distance: f32,
    pub position: Point3<f32>,
    pub near: f32,
    pub far: f32,
}

/// Distance at which `max_dim` fills a vertical field of view of `fov`, times `padding`.
///
/// Unclamped: zero for zero-sized geometry.
pub fn fit_distance<A: Into<Rad<f32>>>(max_dim: f32, fov: A, padding: f32) -> f32 {
    let fov: Rad<f32> = fov.into();
    let half_fov = fov / 2.0;
    ((max_dim / 2.0) / half_fov.tan()).abs() * padding
}

/// Frames `extent` in `frame` and re-targets `controls` on the origin.
///
/// Pending orbit motion is dropped, so fitting the same extent twice yields
/// the same camera. The projection is rebuilt once for the new clip planes.
pub fn fit(
    frame: &mut CameraFrame,
    controls: &mut OrbitControls,
    extent: &BoundingExtent,
    padding: f32,
) -> FitResult {
    let padding = if padding.is_finite() && padding > 0.0 {
        padding
    } else {
        log::warn!("Invalid fit padding {padding}, using {DEFAULT_PADDING}");
        DEFAULT_PADDING
    };

    let max_dim = extent.max_dimension();
    let raw = fit_distance(max_dim, frame.fov(), padding);
    let distance = if raw < MIN_FIT_DISTANCE {
        log::warn!(
            "Extent with largest dimension {max_dim} is degenerate, clamping camera distance {raw} to {MIN_FIT_DISTANCE}"
        );
        MIN_FIT_DISTANCE
    } else {
        raw
    };

    let near = NEAR_PLANE;
    let far = distance * FAR_FACTOR;
    let position = Point3::new(0.0, max_dim * ELEVATION_FACTOR, distance);
    let origin = Point3::new(0.0, 0.0, 0.0);

    frame.projection.set_clip_planes(near, far);
    frame.camera.position = position;
    frame.camera.look_at(origin);

    controls.stop();
    controls.target = origin;
    controls.update(&mut frame.camera);

    log::info!("Camera fit: max dimension {max_dim}, distance {distance}, far plane {far}");

    FitResult {
        max_dim,
        distance,
        position,
        near,
        far,
    }
}
