use std::f32::consts::TAU;

use cgmath::{InnerSpace, Point3, Vector3};

use crate::hologram::{HologramKind, HologramUniformSet};

/// Inputs of one fragment, all in world space.
#[derive(Clone, Copy, Debug)]
pub struct FragmentSample {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    /// Direction from the surface towards the eye.
    pub view_dir: Vector3<f32>,
}

/// Output of the fragment function plus the terms that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shade {
    pub color: [f32; 3],
    pub alpha: f32,
    pub fresnel: f32,
    /// Scan band or ring value in `0..=1`.
    pub pattern: f32,
    pub intensity: f32,
}

/// Hermite interpolation as defined by WGSL/GLSL.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Cheap static 2D hash in `0..1`.
pub fn hash2(x: f32, y: f32) -> f32 {
    fract((x * 127.1 + y * 311.7).sin() * 43_758.547)
}

/// Argument of the pattern's sine: scan bands travel up, rings travel outwards.
pub(crate) fn pattern_phase(set: &HologramUniformSet, position: Point3<f32>) -> f32 {
    let u = set.values();
    let t = set.effective_time();
    match set.kind() {
        HologramKind::TerrainScan => position.y * u.pattern_density + t * TAU * u.pattern_speed,
        HologramKind::PathRing => {
            let dx = position.x - u.center[0];
            let dz = position.z - u.center[2];
            let r = (dx * dx + dz * dz).sqrt();
            r * u.pattern_density - t * TAU * u.pattern_speed
        }
    }
}

/// Evaluates the hologram fragment function exactly as the shader does.
pub fn shade(set: &HologramUniformSet, fragment: &FragmentSample) -> Shade {
    let u = set.values();

    let n = fragment.normal.normalize();
    let v = fragment.view_dir.normalize();
    let ndv = n.dot(v).clamp(0.0, 1.0);
    let fresnel = (1.0 - ndv).powf(u.fresnel_power);

    let low_edge = match set.kind() {
        HologramKind::TerrainScan => 0.15,
        HologramKind::PathRing => 0.2,
    };
    let pattern = smoothstep(low_edge, 1.0, pattern_phase(set, fragment.position).sin());

    let noise = 0.85 + 0.15 * hash2(fragment.position.x, fragment.position.z);

    let intensity = (0.25 + fresnel * u.glow) * (0.55 + 0.45 * pattern) * noise;
    let alpha = u.opacity * (0.35 + 0.65 * fresnel) * (0.65 + 0.35 * pattern);

    Shade {
        color: u.color.map(|c| c * intensity),
        alpha,
        fresnel,
        pattern,
        intensity,
    }
}
