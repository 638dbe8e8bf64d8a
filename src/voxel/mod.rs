//! Voxel data structures and operations

pub mod voxel;
pub mod svo;

pub use voxel::Voxel;
pub use svo::{Octree, OctreeConfig};
