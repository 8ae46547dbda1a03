use holo_terrain::ViewerConfig;

fn main() -> anyhow::Result<()> {
    // Expects models/soft.gltf and models/path.gltf below the working directory.
    holo_terrain::run(ViewerConfig::default())
}
