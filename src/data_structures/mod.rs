//! Scene data: geometry, transforms, bounds and the scene graph.
//!
//! - `extent` holds axis-aligned bounds and their transforms
//! - `instance` holds per-node transformation data and its GPU layout
//! - `mesh` contains CPU geometry and its GPU upload
//! - `scene_graph` enables hierarchical scene organization
//! - `texture` contains the depth buffer wrapper

pub mod extent;
pub mod instance;
pub mod mesh;
pub mod scene_graph;
pub mod texture;
