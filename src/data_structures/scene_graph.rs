//! Scene graph and hierarchical scene organization.
//!
//! Loaded assets become trees of [`SceneNode`]s: [`ContainerNode`]s only group
//! and transform, [`MeshNode`]s additionally carry geometry and a hologram
//! material. World transforms are propagated top-down by
//! [`SceneNode::update_world_transforms`]; bounds and materials are handled
//! by the free functions at the end of this module.

use cgmath::{Matrix4, SquareMatrix};

use crate::{
    data_structures::{
        extent::BoundingExtent,
        instance::{Instance, InstanceRaw},
        mesh::{GpuMesh, MeshGeometry},
    },
    hologram::HologramKind,
    render::{Drawable, Render},
};

pub trait SceneNode: Send {
    fn name(&self) -> &str;

    fn get_local_transform(&self) -> &Instance;

    fn set_local_transform(&mut self, instance: Instance);

    fn get_world_transform(&self) -> &Matrix4<f32>;

    /**
     * Recomputes this node's world matrix as `parent * local` and passes it down to all children.
     */
    fn update_world_transforms(&mut self, parent: &Matrix4<f32>);

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    /// Local-space bounds of the node's own geometry, ignoring children.
    fn local_bounds(&self) -> Option<BoundingExtent>;

    /// Material of the node's own geometry. Containers have none.
    fn material(&self) -> Option<HologramKind>;

    /// Sets the material of the node's own geometry; a no-op for containers.
    fn set_material(&mut self, material: HologramKind);

    /// Uploads new geometry and the current world transforms.
    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device);

    fn get_render(&self) -> Render<'_>;
}

pub struct ContainerNode {
    name: String,
    local: Instance,
    world: Matrix4<f32>,
    pub children: Vec<Box<dyn SceneNode>>,
}

impl ContainerNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local: Instance::default(),
            world: Matrix4::identity(),
            children: Vec::new(),
        }
    }
}

impl SceneNode for ContainerNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_local_transform(&self) -> &Instance {
        &self.local
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn get_world_transform(&self) -> &Matrix4<f32> {
        &self.world
    }

    fn update_world_transforms(&mut self, parent: &Matrix4<f32>) {
        self.world = *parent * self.local.to_matrix();
        for child in self.children.iter_mut() {
            child.update_world_transforms(&self.world);
        }
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn local_bounds(&self) -> Option<BoundingExtent> {
        None
    }

    fn material(&self) -> Option<HologramKind> {
        None
    }

    fn set_material(&mut self, _: HologramKind) {}

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device));
    }

    fn get_render(&self) -> Render<'_> {
        Render::Composed(self.children.iter().map(|child| child.get_render()).collect())
    }
}

/// GPU copies of a mesh and of its world transform.
struct MeshBuffers {
    mesh: GpuMesh,
    instance_buffer: wgpu::Buffer,
}

pub struct MeshNode {
    local: Instance,
    world: Matrix4<f32>,
    geometry: MeshGeometry,
    material: Option<HologramKind>,
    buffers: Option<MeshBuffers>,
    children: Vec<Box<dyn SceneNode>>,
}

impl MeshNode {
    pub fn new(geometry: MeshGeometry) -> Self {
        Self {
            local: Instance::default(),
            world: Matrix4::identity(),
            geometry,
            material: None,
            buffers: None,
            children: Vec::new(),
        }
    }
}

impl SceneNode for MeshNode {
    fn name(&self) -> &str {
        &self.geometry.name
    }

    fn get_local_transform(&self) -> &Instance {
        &self.local
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn get_world_transform(&self) -> &Matrix4<f32> {
        &self.world
    }

    fn update_world_transforms(&mut self, parent: &Matrix4<f32>) {
        self.world = *parent * self.local.to_matrix();
        for child in self.children.iter_mut() {
            child.update_world_transforms(&self.world);
        }
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn local_bounds(&self) -> Option<BoundingExtent> {
        self.geometry.bounds()
    }

    fn material(&self) -> Option<HologramKind> {
        self.material
    }

    fn set_material(&mut self, material: HologramKind) {
        self.material = Some(material);
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        use wgpu::util::DeviceExt;

        let raw: [InstanceRaw; 1] = [InstanceRaw::from_world(&self.world)];
        match &self.buffers {
            Some(buffers) => {
                queue.write_buffer(&buffers.instance_buffer, 0, bytemuck::cast_slice(&raw));
            }
            None if self.geometry.indices.is_empty() => (),
            None => {
                let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{:?} Instance Buffer", self.geometry.name)),
                    contents: bytemuck::cast_slice(&raw),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                });
                self.buffers = Some(MeshBuffers {
                    mesh: self.geometry.upload(device),
                    instance_buffer,
                });
            }
        }
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device));
    }

    fn get_render(&self) -> Render<'_> {
        let own = match (&self.buffers, self.material) {
            (Some(buffers), Some(material)) if buffers.mesh.num_elements > 0 => Render::Hologram(
                material,
                Drawable {
                    vertex: &buffers.mesh.vertex_buffer,
                    index: &buffers.mesh.index_buffer,
                    instance: &buffers.instance_buffer,
                    num_elements: buffers.mesh.num_elements,
                },
            ),
            // no material yet, or nothing uploaded
            _ => Render::None,
        };
        if self.children.is_empty() {
            return own;
        }
        Render::Composed(
            std::iter::once(own)
                .chain(self.children.iter().map(|child| child.get_render()))
                .collect(),
        )
    }
}

/// Sets `material` on every mesh in the subtree.
pub fn apply_material(node: &mut dyn SceneNode, material: HologramKind) {
    node.set_material(material);
    for child in node.get_children_mut().iter_mut() {
        apply_material(child.as_mut(), material);
    }
}

/// World-space extent of all geometry in the subtree.
///
/// Uses the world matrices from the last [`SceneNode::update_world_transforms`].
pub fn world_extent(node: &dyn SceneNode) -> Option<BoundingExtent> {
    let own = node
        .local_bounds()
        .map(|bounds| bounds.transformed(node.get_world_transform()));
    node.get_children()
        .iter()
        .filter_map(|child| world_extent(child.as_ref()))
        .fold(own, |acc, extent| match acc {
            Some(acc) => Some(acc.union(&extent)),
            None => Some(extent),
        })
}

/// Number of nodes in the subtree that carry geometry.
pub fn mesh_count(node: &dyn SceneNode) -> usize {
    let own = usize::from(node.local_bounds().is_some());
    own + node
        .get_children()
        .iter()
        .map(|child| mesh_count(child.as_ref()))
        .sum::<usize>()
}

/// Visits every node depth-first, parents before children.
pub fn visit(node: &dyn SceneNode, f: &mut dyn FnMut(&dyn SceneNode)) {
    f(node);
    for child in node.get_children() {
        visit(child.as_ref(), f);
    }
}
