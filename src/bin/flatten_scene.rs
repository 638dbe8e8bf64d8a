//! Scene flattener binary: builds the pastel cube scene and writes the
//! flattened octree buffer to disk.
//!
//! Usage: cargo run --release --bin flatten_scene -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>    Scene config JSON (defaults apply to missing fields)
//!   --depth <D>        Initial octree depth (default: 16)
//!   --size <N>         Voxels per cube side (default: 10)
//!   --seed <SEED>      Random seed for voxel colors (default: 12345)
//!   --out <PATH>       Flattened buffer output (default: "svo_buffer.bin")
//!   --snapshot <PATH>  Also save a compressed octree snapshot here

use std::path::{Path, PathBuf};
use std::time::Instant;

use svoxel::core::logging;
use svoxel::scene::{self, SceneConfig};
use svoxel::storage::disk_io;
use svoxel::voxel::svo::decode;

fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => match SceneConfig::load(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load scene config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => SceneConfig::default(),
    };
    if let Some(depth) = parse_u32_arg(&args, "--depth") {
        config.octree.initial_depth = depth;
    }
    if let Some(size) = parse_u32_arg(&args, "--size") {
        config.cube_size = size;
    }
    if let Some(seed) = parse_u64_arg(&args, "--seed") {
        config.seed = seed;
    }
    let out = parse_str_arg(&args, "--out")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("svo_buffer.bin"));
    let snapshot = parse_str_arg(&args, "--snapshot").map(PathBuf::from);

    if let Err(e) = run(&config, &out, snapshot.as_deref()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(config: &SceneConfig, out: &Path, snapshot: Option<&Path>) -> svoxel::core::Result<()> {
    log::info!(
        "Building {}^3 pastel cube (seed {}, initial depth {})",
        config.cube_size, config.seed, config.octree.initial_depth
    );

    let start = Instant::now();
    let octree = scene::build_scene(config)?;
    let stats = octree.stats();
    log::info!(
        "Populated {} voxels in {:.1?}: depth {}, {} branches, {} leaves",
        stats.voxel_count,
        start.elapsed(),
        stats.depth,
        stats.branch_count,
        stats.leaf_count
    );

    let start = Instant::now();
    let buffer = octree.flatten()?;
    log::info!(
        "Flattened octree with buffer size: {} words ({:.1} KiB) in {:.1?}",
        buffer.len(),
        (buffer.len() * 4) as f64 / 1024.0,
        start.elapsed()
    );

    // Validate the encoding before writing it out
    let flat = decode(&buffer)?;
    debug_assert_eq!(flat.leaf_count(), stats.leaf_count);

    disk_io::write_flat_buffer(out, &buffer)?;
    log::info!("Wrote {}", out.display());

    if let Some(path) = snapshot {
        disk_io::save_octree(path, &octree)?;
        log::info!("Saved octree snapshot to {}", path.display());
    }

    Ok(())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u64_arg(args: &[String], flag: &str) -> Option<u64> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
