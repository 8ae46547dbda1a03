//! Hologram materials.
//!
//! Two shading models share one fragment function and differ in the spatial
//! pattern that animates across the surface:
//!
//! - [`HologramKind::TerrainScan`] sweeps horizontal scan bands along world height
//! - [`HologramKind::PathRing`] emits rings expanding from a world-space center
//!
//! Each material owns a [`HologramUniformSet`]: the named, typed uniforms the
//! shader reads every frame. Only `uTime` changes per frame; the rest is fixed
//! at construction (`uPaused` can additionally be toggled by the user).
//!
//! [`shade`] is a CPU mirror of the WGSL fragment stage in
//! `pipelines/hologram.wgsl`, so the look can be checked without a GPU.

mod shade;

use std::fmt;

use anyhow::bail;

pub use shade::{FragmentSample, Shade, hash2, shade, smoothstep};

/// Which spatial pattern a hologram material animates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HologramKind {
    TerrainScan,
    PathRing,
}

impl HologramKind {
    /// Value substituted for `PATTERN_MODE` in the shader template.
    pub fn pattern_mode(&self) -> u32 {
        match self {
            HologramKind::TerrainScan => 0,
            HologramKind::PathRing => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HologramKind::TerrainScan => "terrain",
            HologramKind::PathRing => "path",
        }
    }

    fn uniform_names(&self) -> &'static [&'static str] {
        match self {
            HologramKind::TerrainScan => &[
                "uTime",
                "uPaused",
                "uColor",
                "uOpacity",
                "uFresnelPower",
                "uScanDensity",
                "uScanSpeed",
                "uGlow",
            ],
            HologramKind::PathRing => &[
                "uTime",
                "uPaused",
                "uColor",
                "uOpacity",
                "uFresnelPower",
                "uRingDensity",
                "uRingSpeed",
                "uGlow",
                "uCenter",
            ],
        }
    }
}

impl fmt::Display for HologramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Uniform block as laid out for the shader.
///
/// Every `vec3` is followed by a scalar so the struct matches WGSL's 16 byte
/// alignment for uniform buffers without implicit padding.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct HologramUniforms {
    pub color: [f32; 3],
    pub time: f32,
    pub center: [f32; 3],
    pub paused: f32,
    pub opacity: f32,
    pub fresnel_power: f32,
    pub pattern_density: f32,
    pub pattern_speed: f32,
    pub glow: f32,
    _padding: [f32; 3],
}

impl HologramUniforms {
    /// Cyan scan bands, paused until toggled.
    pub fn terrain() -> Self {
        Self {
            color: [0.2, 0.85, 1.0],
            time: 0.0,
            center: [0.0; 3],
            paused: 1.0,
            opacity: 0.85,
            fresnel_power: 2.5,
            pattern_density: 6.0,
            pattern_speed: 0.35,
            glow: 1.6,
            _padding: [0.0; 3],
        }
    }

    /// Amber sonar rings, always animated.
    pub fn path() -> Self {
        Self {
            color: [1.0, 0.6, 0.2],
            time: 0.0,
            center: [0.0; 3],
            paused: 0.0,
            opacity: 0.95,
            fresnel_power: 1.8,
            pattern_density: 12.0,
            pattern_speed: 0.6,
            glow: 2.2,
            _padding: [0.0; 3],
        }
    }
}

/// A typed uniform value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Color([f32; 3]),
    Vec3([f32; 3]),
}

impl UniformValue {
    fn type_name(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "float",
            UniformValue::Color(_) => "color",
            UniformValue::Vec3(_) => "vec3",
        }
    }
}

/// The live uniforms of one hologram material, addressed by shader name.
#[derive(Clone, Debug, PartialEq)]
pub struct HologramUniformSet {
    kind: HologramKind,
    values: HologramUniforms,
}

impl HologramUniformSet {
    pub fn new(kind: HologramKind, values: HologramUniforms) -> Self {
        Self { kind, values }
    }

    pub fn kind(&self) -> HologramKind {
        self.kind
    }

    /// Identifiers accepted by [`get`](Self::get) and [`set`](Self::set).
    pub fn names(&self) -> &'static [&'static str] {
        self.kind.uniform_names()
    }

    pub fn values(&self) -> &HologramUniforms {
        &self.values
    }

    pub fn get(&self, name: &str) -> anyhow::Result<UniformValue> {
        let v = &self.values;
        let value = match (self.kind, name) {
            (_, "uTime") => UniformValue::Float(v.time),
            (_, "uPaused") => UniformValue::Float(v.paused),
            (_, "uColor") => UniformValue::Color(v.color),
            (_, "uOpacity") => UniformValue::Float(v.opacity),
            (_, "uFresnelPower") => UniformValue::Float(v.fresnel_power),
            (_, "uGlow") => UniformValue::Float(v.glow),
            (HologramKind::TerrainScan, "uScanDensity")
            | (HologramKind::PathRing, "uRingDensity") => UniformValue::Float(v.pattern_density),
            (HologramKind::TerrainScan, "uScanSpeed")
            | (HologramKind::PathRing, "uRingSpeed") => UniformValue::Float(v.pattern_speed),
            (HologramKind::PathRing, "uCenter") => UniformValue::Vec3(v.center),
            (kind, name) => bail!("{kind} hologram has no uniform named {name}"),
        };
        Ok(value)
    }

    pub fn set(&mut self, name: &str, value: UniformValue) -> anyhow::Result<()> {
        let current = self.get(name)?;
        if std::mem::discriminant(&current) != std::mem::discriminant(&value) {
            bail!(
                "uniform {name} of the {} hologram expects a {}, got a {}",
                self.kind,
                current.type_name(),
                value.type_name()
            );
        }
        let v = &mut self.values;
        match (name, value) {
            ("uTime", UniformValue::Float(f)) => v.time = f,
            ("uPaused", UniformValue::Float(f)) => v.paused = f.clamp(0.0, 1.0),
            ("uColor", UniformValue::Color(c)) => v.color = c,
            ("uOpacity", UniformValue::Float(f)) => v.opacity = f,
            ("uFresnelPower", UniformValue::Float(f)) => v.fresnel_power = f,
            ("uGlow", UniformValue::Float(f)) => v.glow = f,
            ("uScanDensity" | "uRingDensity", UniformValue::Float(f)) => v.pattern_density = f,
            ("uScanSpeed" | "uRingSpeed", UniformValue::Float(f)) => v.pattern_speed = f,
            ("uCenter", UniformValue::Vec3(c)) => v.center = c,
            _ => unreachable!("name and type were checked against get()"),
        }
        Ok(())
    }

    /// Per-frame update; seconds from the shared clock.
    pub fn set_time(&mut self, seconds: f32) {
        self.values.time = seconds;
    }

    pub fn is_paused(&self) -> bool {
        self.values.paused >= 0.5
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.values.paused = if paused { 1.0 } else { 0.0 };
    }

    /// Ring origin. Ignored by the scan pattern.
    pub fn set_center(&mut self, center: [f32; 3]) {
        self.values.center = center;
    }

    /// Seconds the animation has actually advanced: `uTime * (1 - uPaused)`.
    pub fn effective_time(&self) -> f32 {
        self.values.time * (1.0 - self.values.paused)
    }
}
