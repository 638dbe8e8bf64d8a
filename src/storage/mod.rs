//! Octree snapshots and flattened buffer files

pub mod disk_io;

pub use disk_io::{
    OctreeData,
    serialize_octree, deserialize_octree,
    compress_octree, decompress_octree,
    save_octree, load_octree,
    write_flat_buffer, read_flat_buffer,
};
