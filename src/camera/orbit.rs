use std::f32::consts::PI;

use cgmath::{InnerSpace, Point3, Vector3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::camera::{Camera, fit::NEAR_PLANE};

const POLAR_EPSILON: f32 = 1e-4;

/// Orbit controller with damped motion around a look-target.
///
/// Input only accumulates pending rotation/zoom; [`update`](Self::update) is
/// called once per frame and applies a `damping` fraction of the pending
/// rotation to the camera, so motion eases out over several frames.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
}

impl OrbitControls {
    pub fn new(damping: f32) -> Self {
        Self {
            target: Point3::new(0.0, 0.0, 0.0),
            damping: damping.clamp(0.0, 1.0),
            rotate_speed: 0.005,
            zoom_speed: 0.95,
            min_distance: NEAR_PLANE,
            max_distance: f32::INFINITY,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            dragging: false,
            last_cursor: None,
        }
    }

    /// Drops pending damped motion.
    pub fn stop(&mut self) {
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
    }

    pub fn is_idle(&self) -> bool {
        self.delta_theta.abs() < f32::EPSILON
            && self.delta_phi.abs() < f32::EPSILON
            && (self.scale - 1.0).abs() < f32::EPSILON
    }

    pub fn rotate(&mut self, d_theta: f32, d_phi: f32) {
        self.delta_theta += d_theta;
        self.delta_phi += d_phi;
    }

    /// `factor < 1` moves closer.
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.scale *= factor;
        }
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput { button: MouseButton::Left, state, .. } => {
                self.dragging = *state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                let xy = (position.x, position.y);
                if let (Some(last), true) = (self.last_cursor, self.dragging) {
                    let dx = (xy.0 - last.0) as f32 * self.rotate_speed;
                    let dy = (xy.1 - last.1) as f32 * self.rotate_speed;
                    self.rotate(-dx, -dy);
                }
                self.last_cursor = Some(xy);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
                };
                // Positive scroll = zoom in
                self.zoom(self.zoom_speed.powf(scroll));
            }
            _ => {}
        }
    }

    /// Applies pending motion to `camera` and points it at the target.
    ///
    /// Returns `true` when the camera position changed.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        camera.target = self.target;
        if self.is_idle() {
            return false;
        }

        let offset: Vector3<f32> = camera.position - self.target;
        let radius = offset.magnitude();
        if radius <= f32::EPSILON {
            self.stop();
            return false;
        }

        let fraction = if self.damping > 0.0 { self.damping } else { 1.0 };
        let theta = offset.x.atan2(offset.z) + self.delta_theta * fraction;
        let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos() + self.delta_phi * fraction)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        camera.position = self.target + offset;

        if self.damping > 0.0 {
            self.delta_theta *= 1.0 - self.damping;
            self.delta_phi *= 1.0 - self.damping;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.scale = 1.0;
        true
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(0.05)
    }
}
