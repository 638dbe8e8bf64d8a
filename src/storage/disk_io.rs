//! Octree serialization and disk I/O

use std::io;
use std::path::Path;

use rkyv::{Archive, Deserialize, Serialize};

use crate::voxel::svo::{Octree, SvoNode};

/// Serializable octree snapshot
///
/// The node arena is archived as-is; the root stays at index 0.
#[derive(Archive, Deserialize, Serialize)]
pub struct OctreeData {
    pub depth: u32,
    pub nodes: Vec<SvoNode>,
}

/// Serialize an octree to bytes (uncompressed)
pub fn serialize_octree(octree: &Octree) -> Result<Vec<u8>, io::Error> {
    let data = OctreeData {
        depth: octree.depth(),
        nodes: octree.nodes_slice().to_vec(),
    };

    let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&data)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    Ok(bytes.to_vec())
}

/// Deserialize an octree from bytes (uncompressed)
pub fn deserialize_octree(data: &[u8]) -> Result<Octree, io::Error> {
    // Archived data must be aligned; callers may hand us any byte slice
    let mut aligned = rkyv::util::AlignedVec::<16>::with_capacity(data.len());
    aligned.extend_from_slice(data);

    let octree_data = rkyv::from_bytes::<OctreeData, rkyv::rancor::Error>(&aligned)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

    Octree::from_serialized(octree_data.depth, octree_data.nodes)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
}

/// Compress a serialized octree using LZ4
pub fn compress_octree(octree: &Octree) -> Result<Vec<u8>, io::Error> {
    let serialized = serialize_octree(octree)?;
    Ok(lz4_flex::compress_prepend_size(&serialized))
}

/// Decompress and deserialize an octree
pub fn decompress_octree(data: &[u8]) -> Result<Octree, io::Error> {
    let decompressed = lz4_flex::decompress_size_prepended(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("LZ4 decompression failed: {}", e)))?;
    deserialize_octree(&decompressed)
}

/// Save an octree snapshot to disk (compressed)
pub fn save_octree(path: &Path, octree: &Octree) -> Result<(), io::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let compressed = compress_octree(octree)?;
    std::fs::write(path, compressed)?;

    Ok(())
}

/// Load an octree snapshot from disk (if it exists)
pub fn load_octree(path: &Path) -> Result<Option<Octree>, io::Error> {
    if !path.exists() {
        return Ok(None);
    }

    let compressed = std::fs::read(path)?;
    decompress_octree(&compressed).map(Some)
}

/// Write a flattened buffer as raw host-endian words
pub fn write_flat_buffer(path: &Path, words: &[u32]) -> Result<(), io::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytemuck::cast_slice::<u32, u8>(words))
}

/// Read a buffer written by `write_flat_buffer`
pub fn read_flat_buffer(path: &Path) -> Result<Vec<u32>, io::Error> {
    let bytes = std::fs::read(path)?;
    if bytes.len() % std::mem::size_of::<u32>() != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("flattened buffer length {} is not a whole number of words", bytes.len()),
        ));
    }
    Ok(bytemuck::pod_collect_to_vec(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::Voxel;
    use glam::IVec3;

    fn populated() -> Octree {
        let mut octree = Octree::with_depth(3).unwrap();
        for i in -8..8 {
            octree.insert(IVec3::new(i, -i - 1, i / 2), Voxel::new(i as u8, 10, 20, 255));
        }
        // Written zero color must survive as a written slot
        octree.insert(IVec3::new(0, 0, 7), Voxel::EMPTY);
        octree
    }

    fn assert_same_voxels(a: &Octree, b: &Octree) {
        let mut left = Vec::new();
        a.for_each_voxel(|pos, voxel| left.push((pos, voxel)));
        let mut right = Vec::new();
        b.for_each_voxel(|pos, voxel| right.push((pos, voxel)));
        assert_eq!(left, right);
    }

    #[test]
    fn test_serialize_deserialize() {
        let octree = populated();
        let bytes = serialize_octree(&octree).expect("serialization failed");
        let restored = deserialize_octree(&bytes).expect("deserialization failed");

        assert_eq!(restored.depth(), octree.depth());
        assert_eq!(restored.node_count(), octree.node_count());
        assert_same_voxels(&octree, &restored);
        assert_eq!(restored.at(IVec3::new(0, 0, 7)).unwrap(), Voxel::EMPTY);
    }

    #[test]
    fn test_deserialize_unaligned_slice() {
        let octree = populated();
        let bytes = serialize_octree(&octree).unwrap();
        let mut shifted = vec![0u8];
        shifted.extend_from_slice(&bytes);

        let restored = deserialize_octree(&shifted[1..]).expect("unaligned input rejected");
        assert_same_voxels(&octree, &restored);
    }

    #[test]
    fn test_deserialize_garbage() {
        let err = deserialize_octree(&[1, 2, 3]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_compress_decompress() {
        let octree = populated();
        let compressed = compress_octree(&octree).expect("compression failed");
        let restored = decompress_octree(&compressed).expect("decompression failed");
        assert_same_voxels(&octree, &restored);

        let uncompressed = serialize_octree(&octree).unwrap();
        assert!(compressed.len() <= uncompressed.len());
    }

    #[test]
    fn test_restored_tree_keeps_growing() {
        let restored = decompress_octree(&compress_octree(&populated()).unwrap()).unwrap();
        let mut octree = restored;
        octree.insert(IVec3::new(500, 0, 0), Voxel::opaque(1, 1, 1));
        assert_eq!(octree.depth(), 9);
        assert_eq!(octree.at(IVec3::new(-8, 7, -4)).unwrap(), Voxel::new(248, 10, 20, 255));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scene.svo");
        let octree = populated();

        save_octree(&path, &octree).unwrap();
        let loaded = load_octree(&path).unwrap().expect("snapshot missing");
        assert_same_voxels(&octree, &loaded);

        assert!(load_octree(&dir.path().join("absent.svo")).unwrap().is_none());
    }

    #[test]
    fn test_flat_buffer_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buffer.bin");
        let buffer = populated().flatten().unwrap();

        write_flat_buffer(&path, &buffer).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len() as usize, buffer.len() * 4);
        assert_eq!(read_flat_buffer(&path).unwrap(), buffer);

        std::fs::write(&path, [0u8; 5]).unwrap();
        assert_eq!(read_flat_buffer(&path).unwrap_err().kind(), io::ErrorKind::InvalidData);
    }
}
