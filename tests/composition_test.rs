use cgmath::{Deg, Point3};
use futures::executor::block_on;
use holo_terrain::{
    camera::fit::fit_distance,
    composition::{AssetStage, PostLoad, compose},
    config::ViewerConfig,
    data_structures::scene_graph::{SceneNode, visit, world_extent},
    hologram::HologramKind,
    session::{SharedSession, ViewerSession},
};

use crate::common::test_utils::{MockAsset, MockLoader, assert_close};

mod common;

const TERRAIN: &str = "models/soft.gltf";
const PATH: &str = "models/path.gltf";

/// 10 x 2 x 10 terrain whose center sits at (105, 1, 55).
fn terrain_asset() -> MockAsset {
    MockAsset::Box {
        min: [0.0, 0.0, 0.0],
        max: [10.0, 2.0, 10.0],
        translation: [100.0, 0.0, 50.0],
    }
}

/// Route segment modelled in the same coordinates as the terrain.
fn path_asset() -> MockAsset {
    MockAsset::Box {
        min: [-1.0, 0.0, -1.0],
        max: [1.0, 0.5, 1.0],
        translation: [105.0, 2.0, 55.0],
    }
}

fn session() -> SharedSession {
    ViewerSession::new(&ViewerConfig::default(), 800, 600).shared()
}

fn materials(node: &dyn SceneNode) -> Vec<HologramKind> {
    let mut out = Vec::new();
    visit(node, &mut |n: &dyn SceneNode| out.extend(n.material()));
    out
}

#[test]
fn terrain_loads_and_path_fails() {
    let session = session();
    let loader = MockLoader::default().with(TERRAIN, terrain_asset());

    let report = block_on(compose(session.clone(), loader, ViewerConfig::default().plan()));

    assert_eq!(report.loaded, vec![TERRAIN.to_string()]);
    let failure = report.failed.as_ref().expect("path load should fail");
    assert_eq!(failure.path, PATH);
    assert!(report.skipped.is_empty());
    assert!(!report.is_complete());

    let session = session.borrow();
    assert_eq!(session.root.get_children().len(), 1);
    assert_eq!(materials(session.root.get_children()[0].as_ref()), vec![HologramKind::TerrainScan]);

    // fit to the terrain: maxDim 10 with the default padding
    let fit = report.fit.expect("terrain should be framed");
    assert_eq!(fit.max_dim, 10.0);
    assert_close(fit.distance, fit_distance(10.0, Deg(60.0), 1.1));
    assert_eq!(session.frame.camera.position, fit.position);
    assert_eq!(session.frame.camera.target, Point3::new(0.0, 0.0, 0.0));
}

#[test]
fn failed_terrain_never_starts_the_path() {
    let session = session();
    let loader = MockLoader::default().with(PATH, path_asset());
    let requests = loader.requests();
    let camera_before = session.borrow().frame.camera.clone();

    let report = block_on(compose(session.clone(), loader, ViewerConfig::default().plan()));

    assert_eq!(*requests.borrow(), vec![TERRAIN.to_string()]);
    assert!(report.loaded.is_empty());
    assert_eq!(report.failed.as_ref().map(|f| f.path.as_str()), Some(TERRAIN));
    assert_eq!(report.skipped, vec![PATH.to_string()]);
    assert!(report.fit.is_none());

    let session = session.borrow();
    assert!(session.root.get_children().is_empty());
    assert!(!session.is_centered());
    assert_eq!(session.frame.camera, camera_before);
}

#[test]
fn stages_run_in_plan_order() {
    let session = session();
    let loader = MockLoader::default()
        .with(TERRAIN, terrain_asset())
        .with(PATH, path_asset());
    let requests = loader.requests();

    let report = block_on(compose(session.clone(), loader, ViewerConfig::default().plan()));

    assert!(report.is_complete());
    assert_eq!(*requests.borrow(), vec![TERRAIN.to_string(), PATH.to_string()]);
    let session = session.borrow();
    let children = session.root.get_children();
    assert_eq!(children.len(), 2);
    assert_eq!(materials(children[0].as_ref()), vec![HologramKind::TerrainScan]);
    assert_eq!(materials(children[1].as_ref()), vec![HologramKind::PathRing]);
}

#[test]
fn root_is_centered_on_the_terrain_and_rings_agree() {
    let session = session();
    let loader = MockLoader::default()
        .with(TERRAIN, terrain_asset())
        .with(PATH, path_asset());

    block_on(compose(session.clone(), loader, ViewerConfig::default().plan()));

    let session = session.borrow();
    assert!(session.is_centered());
    let root_position = session.root.get_local_transform().position;
    assert_close(root_position.x, -105.0);
    assert_close(root_position.y, -1.0);
    assert_close(root_position.z, -55.0);

    // the terrain center now sits where the rings start
    let terrain = world_extent(session.root.get_children()[0].as_ref()).unwrap();
    let center = terrain.center();
    let ring_center = session.path.values().center;
    assert_eq!(ring_center, [0.0, 0.0, 0.0]);
    assert_close(center.x, ring_center[0]);
    assert_close(center.y, ring_center[1]);
    assert_close(center.z, ring_center[2]);

    // the path inherits the translation without an extent of its own
    let path = world_extent(session.root.get_children()[1].as_ref()).unwrap();
    assert_close(path.center().x, 0.0);
    assert_close(path.center().z, 0.0);
    assert_close(path.min.y, 1.0);
}

#[test]
fn second_centering_is_ignored() {
    let session = session();
    let loader = MockLoader::default()
        .with(TERRAIN, terrain_asset())
        .with(PATH, path_asset());
    let stages = vec![
        AssetStage {
            path: TERRAIN.to_string(),
            material: HologramKind::TerrainScan,
            post_load: PostLoad::CenterAndFit,
        },
        AssetStage {
            path: PATH.to_string(),
            material: HologramKind::PathRing,
            post_load: PostLoad::CenterAndFit,
        },
    ];

    let report = block_on(compose(session.clone(), loader, stages));

    assert!(report.is_complete());
    let fit = report.fit.expect("first stage fits");
    let session = session.borrow();
    let root_position = session.root.get_local_transform().position;
    assert_close(root_position.x, -105.0);
    assert_close(root_position.z, -55.0);
    assert_eq!(session.frame.camera.position, fit.position);
}

#[test]
fn empty_terrain_skips_centering_but_path_still_loads() {
    let session = session();
    let loader = MockLoader::default()
        .with(TERRAIN, MockAsset::Empty)
        .with(PATH, path_asset());
    let camera_before = session.borrow().frame.camera.clone();

    let report = block_on(compose(session.clone(), loader, ViewerConfig::default().plan()));

    assert!(report.is_complete());
    assert!(report.fit.is_none());
    let session = session.borrow();
    assert!(!session.is_centered());
    assert_eq!(session.root.get_children().len(), 2);
    assert_eq!(session.frame.camera, camera_before);
}
