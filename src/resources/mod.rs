//! Asset loading: glTF files into CPU-side scene graphs.
//!
//! Loading never touches the GPU. A loaded asset is a tree of
//! [`SceneNode`]s whose meshes are uploaded by the render loop on the first
//! frame that draws them, so loaders can run while frames keep rendering.

use std::{
    future::Future,
    path::{Path, PathBuf},
};

use anyhow::{Context as _, bail};
use cgmath::Quaternion;

use crate::data_structures::{
    instance::Instance,
    mesh::{MeshGeometry, MeshVertex},
    scene_graph::{ContainerNode, MeshNode, SceneNode},
};

/// Something that turns an asset path into a scene subtree.
///
/// The viewer uses [`GltfLoader`]; tests substitute their own.
pub trait AssetLoader {
    fn load(&self, path: &str) -> impl Future<Output = anyhow::Result<Box<dyn SceneNode>>>;
}

/// Loads `.gltf` (with external `.bin` buffers) and `.glb` files.
///
/// Paths are resolved against `root`: a directory natively, a URL prefix
/// relative to the page origin on the web.
#[derive(Clone, Debug)]
pub struct GltfLoader {
    root: PathBuf,
}

impl GltfLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn load_gltf(&self, path: &str) -> anyhow::Result<Box<dyn SceneNode>> {
        let bytes = load_binary(&self.root, path)
            .await
            .with_context(|| format!("Failed to read {path}"))?;
        let gltf::Gltf { document, mut blob } =
            gltf::Gltf::from_slice(&bytes).with_context(|| format!("{path} is not a valid glTF file"))?;

        let base = Path::new(path).parent().unwrap_or(Path::new(""));
        let mut buffers = Vec::new();
        for buffer in document.buffers() {
            let data = match buffer.source() {
                gltf::buffer::Source::Bin => blob
                    .take()
                    .with_context(|| format!("{path} references a binary chunk it does not contain"))?,
                gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                    bail!("{path}: embedded data URIs are not supported, export as .glb or with a separate .bin")
                }
                gltf::buffer::Source::Uri(uri) => {
                    // URIs in glTF are percent-encoded, file names are not
                    let decoded = percent_encoding::percent_decode_str(uri)
                        .decode_utf8()
                        .with_context(|| format!("{path}: buffer URI {uri} is not valid UTF-8"))?;
                    let uri = base.join(&*decoded);
                    let uri = uri.to_string_lossy();
                    load_binary(&self.root, &uri)
                        .await
                        .with_context(|| format!("Failed to read buffer {uri} of {path}"))?
                }
            };
            if data.len() < buffer.length() {
                bail!(
                    "{path}: buffer {} holds {} bytes, expected {}",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                );
            }
            buffers.push(data);
        }

        let name = path.to_string();
        #[cfg(not(target_arch = "wasm32"))]
        let root = tokio::task::spawn_blocking(move || build_scene(&name, &document, &buffers)).await??;
        #[cfg(target_arch = "wasm32")]
        let root = build_scene(&name, &document, &buffers)?;

        log::info!("Loaded {path}");
        Ok(root)
    }
}

impl AssetLoader for GltfLoader {
    fn load(&self, path: &str) -> impl Future<Output = anyhow::Result<Box<dyn SceneNode>>> {
        self.load_gltf(path)
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(root: &Path, file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("page has no origin"))?;
    let base = reqwest::Url::parse(&format!("{origin}/"))?;
    let root = root.to_string_lossy();
    let base = if root.is_empty() || root == "." {
        base
    } else {
        base.join(&format!("{}/", root.trim_end_matches('/')))?
    };
    Ok(base.join(file_name)?)
}

pub async fn load_binary(root: &Path, file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(root, file_name)?;
        let response = reqwest::get(url).await?.error_for_status()?;
        response.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = tokio::fs::read(root.join(file_name)).await?;

    Ok(data)
}

/// Builds the node tree of the default scene (or the first one).
///
/// A scene with several root nodes is wrapped in a container named `name`.
pub fn build_scene(
    name: &str,
    document: &gltf::Document,
    buffers: &[Vec<u8>],
) -> anyhow::Result<Box<dyn SceneNode>> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .with_context(|| format!("{name} contains no scene"))?;

    let mut roots = scene
        .nodes()
        .map(|node| to_scene_node(node, buffers))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let root = if roots.len() == 1 {
        roots.remove(0)
    } else {
        let mut root = ContainerNode::new(name);
        root.children = roots;
        Box::new(root)
    };
    Ok(root)
}

fn node_transform(node: &gltf::Node) -> Instance {
    let (translation, [x, y, z, w], scale) = node.transform().decomposed();
    Instance {
        position: translation.into(),
        rotation: Quaternion::new(w, x, y, z),
        scale: scale.into(),
    }
}

pub fn to_scene_node(node: gltf::Node, buffers: &[Vec<u8>]) -> anyhow::Result<Box<dyn SceneNode>> {
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node{}", node.index()));

    let mut meshes = match node.mesh() {
        Some(mesh) => load_primitives(&name, &mesh, buffers)?,
        None => Vec::new(),
    };

    let mut scene_node: Box<dyn SceneNode> = if meshes.len() == 1 {
        Box::new(MeshNode::new(meshes.remove(0)))
    } else {
        let mut container = ContainerNode::new(name);
        for geometry in meshes {
            container.add_child(Box::new(MeshNode::new(geometry)));
        }
        Box::new(container)
    };
    scene_node.set_local_transform(node_transform(&node));

    for child in node.children() {
        scene_node.add_child(to_scene_node(child, buffers)?);
    }
    Ok(scene_node)
}

fn load_primitives(
    node_name: &str,
    mesh: &gltf::Mesh,
    buffers: &[Vec<u8>],
) -> anyhow::Result<Vec<MeshGeometry>> {
    let mesh_name = mesh.name().unwrap_or(node_name);
    let mut meshes = Vec::new();
    for primitive in mesh.primitives() {
        let name = format!("{mesh_name}#{}", primitive.index());
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!("Skipping primitive {name}: only triangle lists are drawn, got {:?}", primitive.mode());
            continue;
        }
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

        let Some(positions) = reader.read_positions() else {
            log::warn!("Skipping primitive {name}: it has no positions");
            continue;
        };
        let mut vertices: Vec<MeshVertex> = positions
            .map(|position| MeshVertex {
                position,
                normal: Default::default(),
            })
            .collect();

        let has_normals = match reader.read_normals() {
            Some(normals) => {
                vertices
                    .iter_mut()
                    .zip(normals)
                    .for_each(|(vertex, normal)| vertex.normal = normal);
                true
            }
            None => false,
        };

        let indices = reader.read_indices().map(|raw| raw.into_u32().collect::<Vec<u32>>());
        if let Some(indices) = &indices {
            if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
                bail!("Primitive {name} indexes vertex {bad} of {}", vertices.len());
            }
        }

        let mut geometry = MeshGeometry::new(name, vertices, indices);
        if !has_normals {
            log::debug!("Computing normals for {}", geometry.name);
            geometry.compute_normals();
        }
        meshes.push(geometry);
    }
    Ok(meshes)
}
