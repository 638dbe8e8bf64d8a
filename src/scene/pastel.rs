//! Cube of random pastel voxels centred in the addressable region

use glam::IVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::SceneConfig;
use crate::core::Result;
use crate::voxel::svo::Octree;
use crate::voxel::voxel::Voxel;

/// Random opaque color with every channel in the upper half (128..=255)
pub fn pastel_color(rng: &mut impl Rng) -> Voxel {
    Voxel::opaque(
        rng.random::<u8>() / 2 + 128,
        rng.random::<u8>() / 2 + 128,
        rng.random::<u8>() / 2 + 128,
    )
}

/// Fill a `size`^3 cube around the centre of the octree's current region.
///
/// Returns the number of voxels written.
pub fn populate_pastel_cube(octree: &mut Octree, size: u32, seed: u64) -> usize {
    let mut rng = StdRng::seed_from_u64(seed);

    let center = (octree.min_incl().as_i64vec3() + octree.max_incl().as_i64vec3()) / 2;
    let min = center - (size / 2) as i64;
    let size = size as i64;

    let mut written = 0;
    for x in min.x..min.x + size {
        for y in min.y..min.y + size {
            for z in min.z..min.z + size {
                octree.insert(IVec3::new(x as i32, y as i32, z as i32), pastel_color(&mut rng));
                written += 1;
            }
        }
    }
    log::debug!("Populated {} pastel voxels around {}", written, center);
    written
}

/// Build an octree from configuration and fill it with the pastel cube
pub fn build_scene(config: &SceneConfig) -> Result<Octree> {
    let mut octree = Octree::from_config(&config.octree)?;
    populate_pastel_cube(&mut octree, config.cube_size, config.seed);
    Ok(octree)
}
