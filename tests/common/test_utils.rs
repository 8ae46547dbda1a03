use std::{cell::RefCell, collections::HashMap, future::Future, rc::Rc};

use anyhow::anyhow;
use cgmath::Vector3;
use holo_terrain::{
    data_structures::{
        instance::Instance,
        mesh::{MeshGeometry, MeshVertex},
        scene_graph::{ContainerNode, MeshNode, SceneNode},
    },
    resources::AssetLoader,
};

/// Closed box between `min` and `max`, 8 vertices and 12 triangles.
pub fn box_mesh(name: &str, min: [f32; 3], max: [f32; 3]) -> MeshGeometry {
    let corner = |i: usize| MeshVertex {
        position: [
            if i & 1 == 0 { min[0] } else { max[0] },
            if i & 2 == 0 { min[1] } else { max[1] },
            if i & 4 == 0 { min[2] } else { max[2] },
        ],
        normal: [0.0, 1.0, 0.0],
    };
    let vertices = (0..8).map(corner).collect();
    #[rustfmt::skip]
    let indices = vec![
        0, 2, 1, 1, 2, 3, // -z
        4, 5, 6, 5, 7, 6, // +z
        0, 1, 4, 1, 5, 4, // -y
        2, 6, 3, 3, 6, 7, // +y
        0, 4, 2, 2, 4, 6, // -x
        1, 3, 5, 3, 7, 5, // +x
    ];
    let mut geometry = MeshGeometry::new(name, vertices, Some(indices));
    geometry.compute_normals();
    geometry
}

/// What the mock loader hands out for a path.
#[derive(Clone, Copy, Debug)]
pub enum MockAsset {
    /// A single box mesh, placed with a node translation.
    Box {
        min: [f32; 3],
        max: [f32; 3],
        translation: [f32; 3],
    },
    /// A group without any geometry.
    Empty,
}

impl MockAsset {
    fn build(&self, path: &str) -> Box<dyn SceneNode> {
        match *self {
            MockAsset::Box { min, max, translation } => {
                let mut node = MeshNode::new(box_mesh(path, min, max));
                node.set_local_transform(Instance::from(Vector3::from(translation)));
                Box::new(node)
            }
            MockAsset::Empty => Box::new(ContainerNode::new(path)),
        }
    }
}

/// In-memory loader; unknown paths fail like a missing file.
#[derive(Clone, Default)]
pub struct MockLoader {
    assets: HashMap<String, MockAsset>,
    requests: Rc<RefCell<Vec<String>>>,
}

impl MockLoader {
    pub fn with(mut self, path: &str, asset: MockAsset) -> Self {
        self.assets.insert(path.to_string(), asset);
        self
    }

    /// Every path `load` was called with, in call order.
    pub fn requests(&self) -> Rc<RefCell<Vec<String>>> {
        self.requests.clone()
    }
}

impl AssetLoader for MockLoader {
    fn load(&self, path: &str) -> impl Future<Output = anyhow::Result<Box<dyn SceneNode>>> {
        self.requests.borrow_mut().push(path.to_string());
        let result = match self.assets.get(path) {
            Some(asset) => Ok(asset.build(path)),
            None => Err(anyhow!("{path}: not found")),
        };
        async move { result }
    }
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() <= 1e-3 * expected.abs().max(1.0),
        "expected {expected}, got {actual}"
    );
}
