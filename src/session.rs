//! The viewer's single owned context.
//!
//! A [`ViewerSession`] holds everything the frame loop, the composition
//! chain and the input handlers mutate: the camera, the orbit controls, the
//! scene root and both hologram uniform sets. There are no globals; the
//! session is shared between the event loop and the composition chain as a
//! [`SharedSession`].

use std::{cell::RefCell, rc::Rc};

use cgmath::{Matrix4, SquareMatrix, Vector3};
use winit::event::WindowEvent;

use crate::{
    camera::{
        CameraFrame,
        fit::{self, FitResult},
        orbit::OrbitControls,
    },
    config::ViewerConfig,
    data_structures::{
        extent::BoundingExtent,
        scene_graph::{self, ContainerNode, SceneNode},
    },
    hologram::{HologramKind, HologramUniformSet},
};

pub type SharedSession = Rc<RefCell<ViewerSession>>;

pub struct ViewerSession {
    pub frame: CameraFrame,
    pub controls: OrbitControls,
    pub root: ContainerNode,
    pub terrain: HologramUniformSet,
    pub path: HologramUniformSet,
    padding: f32,
    centered: bool,
}

impl ViewerSession {
    pub fn new(config: &ViewerConfig, width: u32, height: u32) -> Self {
        Self {
            frame: CameraFrame::new(width, height, config.fov_deg),
            controls: OrbitControls::new(config.damping),
            root: ContainerNode::new("scene root"),
            terrain: HologramUniformSet::new(HologramKind::TerrainScan, config.terrain),
            path: HologramUniformSet::new(HologramKind::PathRing, config.path),
            padding: config.padding,
            centered: false,
        }
    }

    pub fn shared(self) -> SharedSession {
        Rc::new(RefCell::new(self))
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }

    /// Inserts a loaded subtree under the root and refreshes world transforms.
    pub fn attach(&mut self, subtree: Box<dyn SceneNode>) {
        self.root.add_child(subtree);
        self.root.update_world_transforms(&Matrix4::identity());
    }

    /// World-space extent of everything attached so far.
    pub fn root_extent(&self) -> Option<BoundingExtent> {
        scene_graph::world_extent(&self.root)
    }

    pub fn is_centered(&self) -> bool {
        self.centered
    }

    /// Moves the root by `-extent.center()` and puts the ring origin at the
    /// world origin. Happens once per session; later calls are ignored.
    pub fn center_on(&mut self, extent: &BoundingExtent) -> bool {
        if self.centered {
            log::warn!("Scene root is already centered, ignoring second centering on {:?}", extent.center());
            return false;
        }
        let center = extent.center();
        let mut local = self.root.get_local_transform().clone();
        local.position = -Vector3::new(center.x, center.y, center.z);
        self.root.set_local_transform(local);
        self.root.update_world_transforms(&Matrix4::identity());
        self.path.set_center([0.0; 3]);
        self.centered = true;
        log::info!("Scene root centered on {center:?}");
        true
    }

    pub fn fit_to(&mut self, extent: &BoundingExtent) -> FitResult {
        fit::fit(&mut self.frame, &mut self.controls, extent, self.padding)
    }

    /// Centers the root on its current extent and frames it.
    ///
    /// Returns `None` when nothing with geometry is attached or the root was
    /// centered before.
    pub fn center_and_fit(&mut self) -> Option<FitResult> {
        let Some(extent) = self.root_extent() else {
            log::warn!("Scene root has no geometry, skipping centering and camera fit");
            return None;
        };
        if !self.center_on(&extent) {
            return None;
        }
        Some(self.fit_to(&extent))
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.frame.resize(width, height);
    }

    /// One frame: both materials read the same clock, then the orbit eases.
    pub fn advance(&mut self, seconds: f32) {
        self.terrain.set_time(seconds);
        self.path.set_time(seconds);
        self.controls.update(&mut self.frame.camera);
    }

    /// Flips the terrain pause flag and returns the new state.
    pub fn toggle_pause(&mut self) -> bool {
        let paused = !self.terrain.is_paused();
        self.terrain.set_paused(paused);
        log::info!("Terrain scan {}", if paused { "paused" } else { "running" });
        paused
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        self.controls.handle_window_events(event);
    }
}
