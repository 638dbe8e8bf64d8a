//! Sparse Voxel Octree implementation

pub mod address;
pub mod config;
pub mod node;
pub mod octree;
pub mod flatten;
pub mod decode;

pub use address::{OctantPath, DEFAULT_DEPTH, MAX_DEPTH, MIN_DEPTH};
pub use config::OctreeConfig;
pub use node::{Branch, Leaf, SvoNode};
pub use octree::{Octree, OctreeStats};
pub use flatten::{BRANCH_NODE, INDEX_MASK, LEAF_NODE, NODE_TYPE_MASK};
pub use decode::{decode, FlatNode, FlatTree};
