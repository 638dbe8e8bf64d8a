//! Svoxel - a growable sparse voxel octree with a flat GPU buffer encoding

pub mod core;
pub mod math;
pub mod voxel;
pub mod scene;
pub mod storage;
