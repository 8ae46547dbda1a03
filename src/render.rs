//! Render composition and pipeline batching.
//!
//! Scene nodes describe what they want drawn with a [`Render`] tree. The
//! renderer flattens it into one batch per hologram material so that each
//! pipeline is bound once per frame.

use crate::hologram::HologramKind;

/// Buffers of one uploaded mesh with its world transform.
pub struct Drawable<'a> {
    pub vertex: &'a wgpu::Buffer,
    pub index: &'a wgpu::Buffer,
    pub instance: &'a wgpu::Buffer,
    pub num_elements: u32,
}

/// Specifies how a scene object should be rendered.
///
/// - `None` renders nothing
/// - `Hologram(kind, Drawable)` renders a mesh with the given hologram material
/// - `Composed(Vec<Render>)` recursively renders a composition of renders
pub enum Render<'a> {
    None,
    Hologram(HologramKind, Drawable<'a>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    /// Sorts the tree into per-material batches, preserving tree order.
    pub(crate) fn set_pipelines(
        self,
        terrain: &mut Vec<Drawable<'a>>,
        path: &mut Vec<Drawable<'a>>,
    ) {
        match self {
            Render::Hologram(HologramKind::TerrainScan, drawable) => terrain.push(drawable),
            Render::Hologram(HologramKind::PathRing, drawable) => path.push(drawable),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(terrain, path)),
            Render::None => (),
        }
    }
}
