//! Camera state, projection and the GPU camera uniform.
//!
//! - [`CameraFrame`] is the mutable camera record of a session: a look-at
//!   [`Camera`] plus its perspective [`Projection`]
//! - [`fit`] frames a [`BoundingExtent`](crate::data_structures::extent::BoundingExtent)
//! - [`orbit`] holds the damped orbit controller that pivots around a target
//! - [`CameraResources`] mirrors the frame into a uniform buffer for the shaders

pub mod fit;
pub mod orbit;

use cgmath::{Deg, Matrix4, Point3, Vector3, perspective};
use wgpu::util::DeviceExt;

/// Converts cgmath's OpenGL clip space (z in -1..1) to wgpu's (z in 0..1).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// A camera at `position` looking at `target`, y up.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>, T: Into<Point3<f32>>>(position: P, target: T) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
        }
    }

    pub fn look_at<T: Into<Point3<f32>>>(&mut self, target: T) {
        self.target = target.into();
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, Vector3::unit_y())
    }
}

/// Perspective projection with a cached matrix.
///
/// The matrix is only rebuilt by [`update_projection_matrix`](Self::update_projection_matrix);
/// `updates` counts how often that happened.
#[derive(Clone, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Deg<f32>,
    znear: f32,
    zfar: f32,
    matrix: Matrix4<f32>,
    updates: u64,
}

impl Projection {
    pub fn new<F: Into<Deg<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        let fovy: Deg<f32> = fovy.into();
        let mut projection = Self {
            aspect: aspect_of(width, height),
            // tan(fov / 2) must stay finite and positive
            fovy: Deg(fovy.0.clamp(1.0, 179.0)),
            znear,
            zfar,
            matrix: Matrix4::from_scale(1.0),
            updates: 0,
        };
        projection.update_projection_matrix();
        projection
    }

    /// Sets the aspect from a viewport size and rebuilds the matrix once.
    /// A zero-sized viewport (minimized window) is ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = aspect_of(width, height);
        self.update_projection_matrix();
    }

    /// Sets both clip planes and rebuilds the matrix once.
    pub fn set_clip_planes(&mut self, znear: f32, zfar: f32) {
        self.znear = znear;
        self.zfar = zfar;
        self.update_projection_matrix();
    }

    pub fn update_projection_matrix(&mut self) {
        self.matrix = OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        self.updates += 1;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        self.matrix
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fovy(&self) -> Deg<f32> {
        self.fovy
    }

    pub fn znear(&self) -> f32 {
        self.znear
    }

    pub fn zfar(&self) -> f32 {
        self.zfar
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }
}

fn aspect_of(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

/// The camera record owned by a session.
///
/// Only the auto-fit routine and the resize handler mutate it.
#[derive(Clone, Debug)]
pub struct CameraFrame {
    pub camera: Camera,
    pub projection: Projection,
}

impl CameraFrame {
    /// Initial placement before anything is loaded, mirrors a small unit-scale scene.
    pub fn new(width: u32, height: u32, fov_deg: f32) -> Self {
        Self {
            camera: Camera::new((0.0, 1.5, 4.0), (0.0, 0.0, 0.0)),
            projection: Projection::new(width, height, Deg(fov_deg), 0.1, 1000.0),
        }
    }

    /// Viewport changed: new aspect, new projection, same position and target.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    pub fn fov(&self) -> Deg<f32> {
        self.projection.fovy()
    }

    pub fn view_proj(&self) -> Matrix4<f32> {
        self.projection.calc_matrix() * self.camera.calc_matrix()
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, frame: &CameraFrame) {
        self.view_position = frame.camera.position.to_homogeneous().into();
        self.view_proj = frame.view_proj().into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU side of the camera: uniform buffer and its bind group (group 0).
#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, frame: &CameraFrame) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(frame);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, frame: &CameraFrame) {
        self.uniform.update_view_proj(frame);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}
