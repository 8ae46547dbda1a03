//! Ordered scene composition.
//!
//! [`compose`] runs a plan of [`AssetStage`]s strictly one after another:
//! load, apply the material to every mesh, attach under the root, run the
//! post-load hook. Only then does the next stage start loading. With the
//! default plan this means the path inherits the centering and ring origin
//! derived from the terrain without computing an extent of its own.
//!
//! The chain runs beside the frame loop and shares the session with it, so a
//! session borrow is never held across an `.await`.

use std::fmt;

use crate::{
    camera::fit::FitResult,
    data_structures::scene_graph,
    hologram::HologramKind,
    resources::AssetLoader,
    session::SharedSession,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostLoad {
    /// Center the root on its extent, move the ring origin there and fit the camera.
    CenterAndFit,
    None,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssetStage {
    pub path: String,
    pub material: HologramKind,
    pub post_load: PostLoad,
}

#[derive(Debug)]
pub struct StageFailure {
    pub path: String,
    pub error: anyhow::Error,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.path, self.error)
    }
}

/// What happened to each stage of a plan.
#[derive(Debug, Default)]
pub struct CompositionReport {
    pub loaded: Vec<String>,
    pub failed: Option<StageFailure>,
    /// Stages never started because an earlier one failed.
    pub skipped: Vec<String>,
    /// Result of the last camera fit, if any stage triggered one.
    pub fit: Option<FitResult>,
}

impl CompositionReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_none() && self.skipped.is_empty()
    }
}

/// Runs `stages` in order against `session`.
///
/// Load errors are logged and end the chain; they never propagate.
pub async fn compose<L: AssetLoader>(
    session: SharedSession,
    loader: L,
    stages: Vec<AssetStage>,
) -> CompositionReport {
    let mut report = CompositionReport::default();
    let mut stages = stages.into_iter();

    while let Some(stage) = stages.next() {
        log::info!("Loading {} as {} hologram", stage.path, stage.material);
        let mut subtree = match loader.load(&stage.path).await {
            Ok(subtree) => subtree,
            Err(error) => {
                log::error!("Failed to load {}: {error:#}", stage.path);
                report.skipped = stages.by_ref().map(|stage| stage.path).collect();
                if !report.skipped.is_empty() {
                    log::warn!("Skipping {} after failed load", report.skipped.join(", "));
                }
                report.failed = Some(StageFailure {
                    path: stage.path,
                    error,
                });
                break;
            }
        };

        scene_graph::apply_material(subtree.as_mut(), stage.material);
        let meshes = scene_graph::mesh_count(subtree.as_ref());
        {
            let mut session = session.borrow_mut();
            session.attach(subtree);
            if stage.post_load == PostLoad::CenterAndFit {
                if let Some(fit) = session.center_and_fit() {
                    report.fit = Some(fit);
                }
            }
        }
        log::info!("Attached {} with {meshes} meshes", stage.path);
        report.loaded.push(stage.path);
    }

    report
}
