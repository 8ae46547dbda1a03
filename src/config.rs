use std::path::PathBuf;

use crate::{
    composition::{AssetStage, PostLoad},
    hologram::{HologramKind, HologramUniforms},
};

/// Everything the viewer needs to know before it opens a window.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    /// Directory (native) or URL prefix (web) the asset paths are relative to.
    pub asset_root: PathBuf,
    pub terrain_asset: String,
    pub path_asset: String,
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
    /// Auto-fit padding, `1.0` frames the largest dimension edge to edge.
    pub padding: f32,
    /// `0xRRGGBB`
    pub clear_colour: u32,
    pub damping: f32,
    pub terrain: HologramUniforms,
    pub path: HologramUniforms,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
            terrain_asset: "models/soft.gltf".to_string(),
            path_asset: "models/path.gltf".to_string(),
            fov_deg: 60.0,
            padding: crate::camera::fit::DEFAULT_PADDING,
            clear_colour: 0x111111,
            damping: 0.05,
            terrain: HologramUniforms::terrain(),
            path: HologramUniforms::path(),
        }
    }
}

impl ViewerConfig {
    /// Terrain first, centered and framed, then the path into the same root.
    pub fn plan(&self) -> Vec<AssetStage> {
        vec![
            AssetStage {
                path: self.terrain_asset.clone(),
                material: HologramKind::TerrainScan,
                post_load: PostLoad::CenterAndFit,
            },
            AssetStage {
                path: self.path_asset.clone(),
                material: HologramKind::PathRing,
                post_load: PostLoad::None,
            },
        ]
    }

    pub fn clear_color(&self) -> wgpu::Color {
        let channel = |shift: u32| ((self.clear_colour >> shift) & 0xff) as f64 / 255.0;
        wgpu::Color {
            r: channel(16),
            g: channel(8),
            b: channel(0),
            a: 1.0,
        }
    }
}
