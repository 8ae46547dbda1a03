//! Application event loop.
//!
//! Each frame:
//! 1. Pump the composition chain (native) so finished loads get attached
//! 2. Advance both hologram clocks and ease the orbit controls
//! 3. Upload new meshes, transforms and uniforms
//! 4. Draw the terrain batch, then the path batch, into one render pass
//! 5. Present frame
//!
//! Loading never blocks this loop. Natively the composition future lives on
//! a [`LocalPool`] that is polled once per frame inside the tokio runtime
//! context; on the web it runs through `spawn_local`.

use std::{iter, sync::Arc};

#[cfg(not(target_arch = "wasm32"))]
use futures::{executor::LocalPool, task::LocalSpawnExt};
use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    composition::{CompositionReport, compose},
    config::ViewerConfig,
    context::Context,
    data_structures::{scene_graph::SceneNode, texture::Texture},
    hologram::HologramKind,
    render::Drawable,
    resources::GltfLoader,
    session::{SharedSession, ViewerSession},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// GPU context plus surface status.
#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, session: SharedSession, clear_colour: wgpu::Color) -> anyhow::Result<Self> {
        let ctx = Context::new(window, &session, clear_colour).await?;
        Ok(Self {
            ctx,
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, session: &mut ViewerSession, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            session.resize(width, height);
            self.ctx.surface.configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
        }
    }

    fn render(&mut self, session: &mut ViewerSession) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        session.root.write_to_buffers(&self.ctx.queue, &self.ctx.device);
        self.ctx.camera.write(&self.ctx.queue, &session.frame);
        self.ctx.holograms.write(&self.ctx.queue, &session.terrain);
        self.ctx.holograms.write(&self.ctx.queue, &session.path);

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let mut terrain: Vec<Drawable> = Vec::new();
            let mut path: Vec<Drawable> = Vec::new();
            session.root.get_render().set_pipelines(&mut terrain, &mut path);

            for (kind, batch) in [(HologramKind::TerrainScan, terrain), (HologramKind::PathRing, path)] {
                if batch.is_empty() {
                    continue;
                }
                let pass = self.ctx.holograms.pass(kind);
                render_pass.set_pipeline(&pass.render_pipeline);
                render_pass.set_bind_group(0, &self.ctx.camera.bind_group, &[]);
                render_pass.set_bind_group(1, &pass.bind_group, &[]);
                for drawable in batch {
                    render_pass.set_vertex_buffer(0, drawable.vertex.slice(..));
                    render_pass.set_vertex_buffer(1, drawable.instance.slice(..));
                    render_pass.set_index_buffer(drawable.index.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..drawable.num_elements, 0, 0..1);
                }
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub enum ViewerEvent {
    #[allow(dead_code)]
    Initialized(AppState),
    Composed(CompositionReport),
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[cfg(not(target_arch = "wasm32"))]
    pool: LocalPool,
    proxy: winit::event_loop::EventLoopProxy<ViewerEvent>,
    config: ViewerConfig,
    session: SharedSession,
    state: Option<AppState>,
    composition_started: bool,
    clock: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<ViewerEvent>, config: ViewerConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        // Real size arrives with the first resize.
        let session = ViewerSession::new(&config, 1, 1).shared();
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            #[cfg(not(target_arch = "wasm32"))]
            pool: LocalPool::new(),
            proxy,
            config,
            session,
            state: None,
            composition_started: false,
            clock: Instant::now(),
        })
    }

    /// Starts the ordered load of all assets. Runs at most once.
    fn start_composition(&mut self) {
        if self.composition_started {
            return;
        }
        self.composition_started = true;

        let loader = GltfLoader::new(self.config.asset_root.clone());
        let stages = self.config.plan();
        let session = self.session.clone();
        let proxy = self.proxy.clone();
        let chain = async move {
            let report = compose(session, loader, stages).await;
            if proxy.send_event(ViewerEvent::Composed(report)).is_err() {
                log::warn!("Event loop closed before the scene was composed");
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        if let Err(e) = self.pool.spawner().spawn_local(chain) {
            log::error!("Unable to start loading assets: {e}");
        }
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(chain);
    }
}

impl ApplicationHandler<ViewerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("holo-terrain");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Unable to create a window: {e}");
                event_loop.exit();
                return;
            }
        };

        let init_future = AppState::new(window, self.session.clone(), self.config.clear_color());

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(mut app_state) => {
                    let size = app_state.ctx.window.inner_size();
                    app_state.resize(&mut self.session.borrow_mut(), size.width, size.height);
                    self.state = Some(app_state);
                }
                Err(e) => {
                    log::error!("App initialization failed. Cannot create the main context: {e:#}");
                    event_loop.exit();
                    return;
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match init_future.await {
                    Ok(app_state) => {
                        if proxy.send_event(ViewerEvent::Initialized(app_state)).is_err() {
                            log::error!("Event loop closed during initialization");
                        }
                    }
                    Err(e) => log::error!("App initialization failed. Cannot create the main context: {e:#}"),
                }
            });
        }

        self.start_composition();
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Initialized(mut app_state) => {
                // This is the message from our wasm `spawn_local`
                let size = app_state.ctx.window.inner_size();
                app_state.resize(&mut self.session.borrow_mut(), size.width, size.height);
                app_state.ctx.window.request_redraw();
                self.state = Some(app_state);
            }
            ViewerEvent::Composed(report) => {
                match &report.failed {
                    None => log::info!("Scene composed: {}", report.loaded.join(", ")),
                    Some(failure) => log::error!(
                        "Scene incomplete, {failure}; loaded [{}], skipped [{}]",
                        report.loaded.join(", "),
                        report.skipped.join(", ")
                    ),
                }
                if let Some(state) = &self.state {
                    state.ctx.window.request_redraw();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        self.session.borrow_mut().handle_window_events(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                state.resize(&mut self.session.borrow_mut(), size.width, size.height)
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Space),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.session.borrow_mut().toggle_pause();
            }
            WindowEvent::RedrawRequested => {
                #[cfg(not(target_arch = "wasm32"))]
                {
                    let _guard = self.async_runtime.enter();
                    self.pool.run_until_stalled();
                }

                let seconds = self.clock.elapsed().as_secs_f32();
                let mut session = self.session.borrow_mut();
                session.advance(seconds);
                match state.render(&mut session) {
                    Ok(_) => (),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(&mut session, size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Opens the viewer window and runs until it is closed.
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop, config)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run(ViewerConfig::default()).map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{e:#}")))
}
