use cgmath::{Point3, Vector3};
use holo_terrain::{
    hologram::{
        FragmentSample, HologramKind, HologramUniformSet, HologramUniforms, UniformValue, hash2, shade,
        smoothstep,
    },
    pipelines::hologram::shader_source,
};
use wgpu::naga::{
    front::wgsl,
    valid::{Capabilities, ValidationFlags, Validator},
};

use crate::common::test_utils::assert_close;

mod common;

fn terrain() -> HologramUniformSet {
    HologramUniformSet::new(HologramKind::TerrainScan, HologramUniforms::terrain())
}

fn path() -> HologramUniformSet {
    HologramUniformSet::new(HologramKind::PathRing, HologramUniforms::path())
}

/// A fragment seen at an angle, so fresnel is neither 0 nor 1.
fn oblique(position: Point3<f32>) -> FragmentSample {
    FragmentSample {
        position,
        normal: Vector3::new(0.0, 1.0, 0.0),
        view_dir: Vector3::new(0.0, 1.0, 1.0),
    }
}

#[test]
fn defaults_match_the_two_looks() {
    assert!(terrain().is_paused());
    assert!(!path().is_paused());
    assert_eq!(terrain().get("uColor").unwrap(), UniformValue::Color([0.2, 0.85, 1.0]));
    assert_eq!(path().get("uRingDensity").unwrap(), UniformValue::Float(12.0));
    assert_eq!(path().get("uCenter").unwrap(), UniformValue::Vec3([0.0; 3]));
    assert_eq!(std::mem::size_of::<HologramUniforms>(), 64);
}

#[test]
fn paused_terrain_is_frozen_in_time() {
    let mut set = terrain();
    set.set("uPaused", UniformValue::Float(1.0)).unwrap();
    let fragment = oblique(Point3::new(0.3, 0.1, -2.0));

    set.set_time(1.3);
    let early = shade(&set, &fragment);
    set.set_time(97.25);
    let late = shade(&set, &fragment);

    assert_eq!(early, late);
    assert_eq!(set.effective_time(), 0.0);
}

#[test]
fn running_terrain_moves_the_scan_bands() {
    let mut set = terrain();
    set.set_paused(false);
    let fragment = oblique(Point3::new(0.3, 0.1, -2.0));

    set.set_time(0.0);
    let before = shade(&set, &fragment);
    set.set_time(1.0);
    let after = shade(&set, &fragment);

    assert_ne!(before.pattern, after.pattern);
    assert_ne!(before.intensity, after.intensity);
    // only the pattern depends on time
    assert_eq!(before.fresnel, after.fresnel);
}

#[test]
fn scan_band_follows_world_height() {
    let mut set = terrain();
    set.set_time(0.0);
    let u = *set.values();
    for y in [-1.0f32, 0.0, 0.1, 0.25, 2.0] {
        let s = shade(&set, &oblique(Point3::new(0.0, y, 0.0)));
        assert_close(s.pattern, smoothstep(0.15, 1.0, (y * u.pattern_density).sin()));
    }
}

#[test]
fn ring_pattern_vanishes_at_the_ring_center() {
    let mut set = path();
    set.set_center([3.0, 0.0, -2.0]);
    set.set_time(0.0);
    let u = *set.values();
    // height does not enter the radius
    let fragment = oblique(Point3::new(3.0, 5.0, -2.0));

    let s = shade(&set, &fragment);

    let ring = smoothstep(0.2, 1.0, 0.0f32.sin());
    let noise = 0.85 + 0.15 * hash2(3.0, -2.0);
    let expected = (0.25 + s.fresnel * u.glow) * (0.55 + 0.45 * ring) * noise;
    assert_eq!(s.pattern, 0.0);
    assert_close(s.intensity, expected);
    assert_close(s.color[0], u.color[0] * expected);
    assert_close(s.alpha, u.opacity * (0.35 + 0.65 * s.fresnel) * 0.65);
}

#[test]
fn paused_ring_center_stays_dark_at_any_time() {
    let mut set = path();
    set.set_paused(true);
    set.set_time(12.5);
    let s = shade(&set, &oblique(Point3::new(0.0, 1.0, 0.0)));
    assert_eq!(s.pattern, 0.0);
}

#[test]
fn fresnel_brightens_grazing_angles() {
    let set = terrain();
    let position = Point3::new(0.0, 0.0, 0.0);
    let facing = shade(
        &set,
        &FragmentSample {
            position,
            normal: Vector3::new(0.0, 0.0, 1.0),
            view_dir: Vector3::new(0.0, 0.0, 1.0),
        },
    );
    let grazing = shade(
        &set,
        &FragmentSample {
            position,
            normal: Vector3::new(0.0, 1.0, 0.0),
            view_dir: Vector3::new(0.0, 0.0, 1.0),
        },
    );

    assert_close(facing.fresnel, 0.0);
    assert_close(grazing.fresnel, 1.0);
    assert!(grazing.intensity > facing.intensity);
    assert!(grazing.alpha > facing.alpha);
}

#[test]
fn noise_stays_in_range() {
    for i in 0..200 {
        let (x, z) = (i as f32 * 0.37 - 30.0, i as f32 * -1.13 + 7.0);
        let h = hash2(x, z);
        assert!((0.0..1.0).contains(&h), "hash2({x}, {z}) = {h}");
    }
}

#[test]
fn uniform_lookup_is_checked_by_name_and_type() {
    let mut terrain = terrain();
    let mut path = path();

    assert!(terrain.names().contains(&"uScanDensity"));
    assert!(!terrain.names().contains(&"uRingDensity"));
    assert!(path.names().contains(&"uCenter"));

    assert!(terrain.get("uCenter").is_err());
    assert!(terrain.get("uRingSpeed").is_err());
    assert!(path.get("uScanSpeed").is_err());
    assert!(terrain.get("uNope").is_err());

    assert!(terrain.set("uOpacity", UniformValue::Color([1.0; 3])).is_err());
    assert!(path.set("uCenter", UniformValue::Float(1.0)).is_err());

    terrain.set("uScanSpeed", UniformValue::Float(2.0)).unwrap();
    path.set("uCenter", UniformValue::Vec3([1.0, 2.0, 3.0])).unwrap();
    assert_eq!(terrain.values().pattern_speed, 2.0);
    assert_eq!(path.values().center, [1.0, 2.0, 3.0]);

    for name in path.names() {
        assert!(path.get(name).is_ok(), "{name} listed but not readable");
    }
}

#[test]
fn shader_template_is_specialised_per_material() {
    let scan = shader_source(HologramKind::TerrainScan);
    let ring = shader_source(HologramKind::PathRing);

    assert!(scan.contains("const PATTERN_MODE: u32 = 0u;"));
    assert!(ring.contains("const PATTERN_MODE: u32 = 1u;"));
    assert!(!scan.contains("{{") && !ring.contains("{{"));
    assert!(scan.contains("fn fs_main") && scan.contains("fn vs_main"));
}

#[test]
fn shader_validates_for_both_materials() {
    for kind in [HologramKind::TerrainScan, HologramKind::PathRing] {
        let source = shader_source(kind);
        let module = wgsl::parse_str(&source)
            .unwrap_or_else(|e| panic!("{kind:?} shader does not parse:\n{}", e.emit_to_string(&source)));

        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .unwrap_or_else(|e| panic!("{kind:?} shader is invalid: {e:?}"));

        for entry in ["vs_main", "fs_main"] {
            assert!(module.entry_points.iter().any(|ep| ep.name == entry), "{kind:?} lacks {entry}");
        }
    }
}
