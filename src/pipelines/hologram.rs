use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::InstanceRaw,
        mesh::{MeshVertex, Vertex},
        texture::Texture,
    },
    hologram::{HologramKind, HologramUniformSet},
};

const SHADER_TEMPLATE: &str = include_str!("hologram.wgsl");
const PATTERN_MODE_TOKEN: &str = "{{PATTERN_MODE}}";

/// WGSL source of the hologram shader specialised for `kind`.
pub fn shader_source(kind: HologramKind) -> String {
    SHADER_TEMPLATE.replace(PATTERN_MODE_TOKEN, &kind.pattern_mode().to_string())
}

/// Additive blending: layers glow on top of each other and the background.
pub const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Pipeline, uniform buffer and bind group of one hologram material.
#[derive(Debug)]
pub struct HologramPass {
    pub kind: HologramKind,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub render_pipeline: wgpu::RenderPipeline,
}

/// GPU side of both hologram materials (group 1).
#[derive(Debug)]
pub struct HologramResources {
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub terrain: HologramPass,
    pub path: HologramPass,
}

impl HologramResources {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        terrain: &HologramUniformSet,
        path: &HologramUniformSet,
    ) -> Self {
        let bind_group_layout = mk_bind_group_layout(device);
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Hologram Pipeline Layout"),
            bind_group_layouts: &[camera_bind_group_layout, &bind_group_layout],
            push_constant_ranges: &[],
        });
        let mk_pass = |set: &HologramUniformSet| {
            let kind = set.kind();
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{kind} Hologram Uniform Buffer")),
                contents: bytemuck::cast_slice(&[*set.values()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
                label: Some(&format!("{kind}_hologram_bind_group")),
            });
            let shader = wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{kind} Hologram Shader")),
                source: wgpu::ShaderSource::Wgsl(shader_source(kind).into()),
            };
            let render_pipeline = mk_render_pipeline(
                device,
                &layout,
                config.format,
                Some(ADDITIVE_BLEND),
                Some(Texture::DEPTH_FORMAT),
                false,
                None,
                &[MeshVertex::desc(), InstanceRaw::desc()],
                shader,
            );
            HologramPass {
                kind,
                buffer,
                bind_group,
                render_pipeline,
            }
        };
        let terrain = mk_pass(terrain);
        let path = mk_pass(path);
        Self {
            bind_group_layout,
            terrain,
            path,
        }
    }

    pub fn pass(&self, kind: HologramKind) -> &HologramPass {
        match kind {
            HologramKind::TerrainScan => &self.terrain,
            HologramKind::PathRing => &self.path,
        }
    }

    /// Uploads the current values of `set` to its material's buffer.
    pub fn write(&self, queue: &wgpu::Queue, set: &HologramUniformSet) {
        queue.write_buffer(
            &self.pass(set.kind()).buffer,
            0,
            bytemuck::cast_slice(&[*set.values()]),
        );
    }
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("hologram_bind_group_layout"),
    })
}

#[allow(clippy::too_many_arguments)]
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    depth_write_enabled: bool,
    cull_mode: Option<wgpu::Face>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Hologram Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // both faces of a hologram are visible
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
