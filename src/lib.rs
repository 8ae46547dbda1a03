//! holo-terrain
//!
//! A small native and WASM viewer that loads a terrain mesh and a route mesh,
//! frames them automatically whatever their native scale, and renders both
//! with animated hologram shading: a fresnel rim glow plus travelling scan
//! bands on the terrain and expanding rings along the route.
//!
//! High-level modules
//! - `camera`: camera, projection, auto-fit and orbit controls
//! - `hologram`: the two hologram materials, their uniforms and a CPU shading reference
//! - `composition`: the ordered load → center → fit → load chain
//! - `session`: the single owned viewer state shared by the loop and the chain
//! - `config`: viewer configuration and the default asset plan
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: meshes, transforms, bounds and the scene graph
//! - `pipelines`: the hologram render pipelines and their WGSL template
//! - `resources`: glTF asset loading
//! - `render`: render composition for per-material batching
//! - `app`: the winit event loop and [`run`]
//!

pub mod app;
pub mod camera;
pub mod composition;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod hologram;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod session;

pub use app::run;
pub use config::ViewerConfig;
