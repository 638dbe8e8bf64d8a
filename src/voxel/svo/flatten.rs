//! Linear word encoding of an octree for GPU upload
//!
//! Layout, one `u32` per word, host byte order:
//! - every node starts with a tag word: kind in the top 2 bits, the node's
//!   own start index in the low 30 bits;
//! - a branch tag is followed by the full encodings of its present children
//!   (slot order), then 8 words holding each child's start index, 0 if empty;
//! - a leaf tag is followed by 8 slots x (r, g, b, a) words.
//!
//! Word 0 is always the root's tag, so 0 never names a child.

use super::node::SvoNode;
use super::octree::Octree;
use crate::core::{Error, Result};
use crate::voxel::voxel::VOXEL_WORDS;

/// Tag bit for leaf nodes
pub const LEAF_NODE: u32 = 0x8000_0000;
/// Tag bit for branch nodes
pub const BRANCH_NODE: u32 = 0x4000_0000;
/// Selects the node kind bits of a tag word
pub const NODE_TYPE_MASK: u32 = 0xC000_0000;
/// Selects the index bits of a tag word
pub const INDEX_MASK: u32 = 0x3FFF_FFFF;

/// Words in a branch encoding, excluding its children
pub const BRANCH_WORDS: usize = 1 + 8;
/// Words in a leaf encoding
pub const LEAF_WORDS: usize = 1 + 8 * VOXEL_WORDS;

impl Octree {
    /// Serialize the whole tree into a new word buffer
    pub fn flatten(&self) -> Result<Vec<u32>> {
        let mut buffer = Vec::with_capacity(self.flattened_len());
        self.flatten_into(&mut buffer)?;
        Ok(buffer)
    }

    /// Serialize the whole tree into `buffer`, replacing its contents.
    ///
    /// Reuses the buffer's allocation across repeated snapshots.
    pub fn flatten_into(&self, buffer: &mut Vec<u32>) -> Result<()> {
        buffer.clear();
        buffer.reserve(self.flattened_len());
        self.flatten_node(0, buffer)?;
        debug_assert_eq!(buffer.len(), self.flattened_len());
        Ok(())
    }

    /// Exact word count `flatten` will produce
    pub fn flattened_len(&self) -> usize {
        let stats = self.stats();
        stats.branch_count * BRANCH_WORDS + stats.leaf_count * LEAF_WORDS
    }

    /// Emit one node and its subtree, returning the node's start index
    fn flatten_node(&self, node_index: u32, buffer: &mut Vec<u32>) -> Result<u32> {
        let start = buffer.len();
        if start > INDEX_MASK as usize {
            return Err(Error::BufferIndexOverflow { index: start });
        }
        let start = start as u32;

        match self.node(node_index) {
            SvoNode::Branch(branch) => {
                buffer.push(BRANCH_NODE | start);
                let mut child_starts = [0u32; 8];
                for (octant, child) in branch.children.iter().enumerate() {
                    if let Some(child) = *child {
                        child_starts[octant] = self.flatten_node(child, buffer)?;
                    }
                }
                buffer.extend_from_slice(&child_starts);
            }
            SvoNode::Leaf(leaf) => {
                buffer.push(LEAF_NODE | start);
                for voxel in &leaf.voxels {
                    buffer.extend_from_slice(&voxel.to_words());
                }
            }
        }
        Ok(start)
    }
}

/// Node kind bits of a tag word
pub fn tag_kind(word: u32) -> u32 {
    word & NODE_TYPE_MASK
}

/// Index bits of a tag word
pub fn tag_index(word: u32) -> u32 {
    word & INDEX_MASK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::svo::address;
    use crate::voxel::voxel::Voxel;
    use glam::IVec3;

    /// Branch child tables in a flattened buffer, found by walking it the
    /// way a consumer would: children first, then the 8-word table.
    fn walk(buffer: &[u32], at: usize, tables: &mut Vec<(usize, [u32; 8])>) -> usize {
        let tag = buffer[at];
        match tag_kind(tag) {
            LEAF_NODE => at + LEAF_WORDS,
            BRANCH_NODE => {
                let mut next = at + 1;
                while tag_kind(buffer[next]) != 0 {
                    next = walk(buffer, next, tables);
                }
                let mut table = [0u32; 8];
                table.copy_from_slice(&buffer[next..next + 8]);
                tables.push((at, table));
                next + 8
            }
            other => panic!("unexpected tag kind {:#x} at {}", other, at),
        }
    }

    fn count_kind(buffer: &[u32], kind: u32) -> usize {
        let mut tables = Vec::new();
        walk(buffer, 0, &mut tables);
        let mut count = if tag_kind(buffer[0]) == kind { 1 } else { 0 };
        for (_, table) in tables {
            count += table.iter().filter(|&&c| c != 0 && tag_kind(buffer[c as usize]) == kind).count();
        }
        count
    }

    #[test]
    fn test_empty_tree() {
        let octree = Octree::new();
        let buffer = octree.flatten().unwrap();
        assert_eq!(buffer.len(), BRANCH_WORDS);
        assert_eq!(buffer[0], BRANCH_NODE);
        assert!(buffer[1..].iter().all(|&w| w == 0));
    }

    #[test]
    fn test_single_voxel_at_origin() {
        let mut octree = Octree::new();
        let depth = octree.depth() as usize;
        octree.insert(IVec3::ZERO, Voxel::new(200, 150, 100, 255));
        let buffer = octree.flatten().unwrap();

        assert_eq!(count_kind(&buffer, BRANCH_NODE), depth);
        assert_eq!(count_kind(&buffer, LEAF_NODE), 1);
        assert_eq!(buffer.len(), depth * BRANCH_WORDS + LEAF_WORDS);

        // A single chain: each branch tag is followed directly by its child,
        // so the leaf tag sits at word `depth`
        let leaf_start = depth;
        assert_eq!(buffer[leaf_start], LEAF_NODE | leaf_start as u32);

        let slot = address::index_of(IVec3::ZERO, octree.depth()).leaf_slot() as usize;
        let first = leaf_start + 1 + slot * VOXEL_WORDS;
        assert_eq!(&buffer[first..first + 4], &[200, 150, 100, 255]);

        // Every other slot is unset
        let colors = &buffer[leaf_start + 1..leaf_start + LEAF_WORDS];
        assert_eq!(colors.iter().filter(|&&w| w != 0).count(), 4);
    }

    #[test]
    fn test_root_tag_and_child_kinds() {
        let mut octree = Octree::with_depth(4).unwrap();
        for (i, pos) in [
            IVec3::new(0, 0, 0),
            IVec3::new(-16, 5, 9),
            IVec3::new(15, 15, -16),
            IVec3::new(-1, -1, -1),
            IVec3::new(7, -8, 3),
        ]
        .into_iter()
        .enumerate()
        {
            octree.insert(pos, Voxel::opaque(i as u8 + 1, 0, 0));
        }
        let buffer = octree.flatten().unwrap();

        assert_eq!(tag_kind(buffer[0]), BRANCH_NODE);
        assert_eq!(tag_index(buffer[0]), 0);

        let mut tables = Vec::new();
        assert_eq!(walk(&buffer, 0, &mut tables), buffer.len());

        // Branches whose children are leaves are exactly those at depth - 1;
        // check kinds by following tables level by level from the root
        let table_of = |at: usize| tables.iter().find(|(start, _)| *start == at).map(|(_, t)| *t);
        let mut level = vec![0usize];
        for depth in 1..=octree.depth() {
            let mut next = Vec::new();
            for at in level {
                let table = table_of(at).expect("branch has a child table");
                for &child in table.iter().filter(|&&c| c != 0) {
                    let expected = if depth == octree.depth() { LEAF_NODE } else { BRANCH_NODE };
                    assert_eq!(tag_kind(buffer[child as usize]), expected);
                    assert_eq!(tag_index(buffer[child as usize]), child);
                    next.push(child as usize);
                }
            }
            level = next;
        }
        assert_eq!(level.len(), octree.stats().leaf_count);
    }

    #[test]
    fn test_deterministic_and_idempotent() {
        let mut octree = Octree::with_depth(5).unwrap();
        for i in -20..20 {
            octree.insert(IVec3::new(i, i * 3 % 17, -i), Voxel::opaque(i as u8, 1, 2));
        }
        let first = octree.flatten().unwrap();
        let second = octree.flatten().unwrap();
        assert_eq!(first, second);

        let mut reused = vec![0xdead_beef; 3];
        octree.flatten_into(&mut reused).unwrap();
        assert_eq!(reused, first);

        // A clone built through a different insertion order flattens the same
        let mut reordered = Octree::with_depth(5).unwrap();
        for i in (-20..20).rev() {
            reordered.insert(IVec3::new(i, i * 3 % 17, -i), Voxel::opaque(i as u8, 1, 2));
        }
        assert_eq!(reordered.flatten().unwrap(), first);
    }

    #[test]
    fn test_flattened_len_matches() {
        let mut octree = Octree::with_depth(3).unwrap();
        for x in -8..8 {
            octree.insert(IVec3::new(x, 0, 0), Voxel::opaque(1, 2, 3));
        }
        assert_eq!(octree.flatten().unwrap().len(), octree.flattened_len());
    }

    #[test]
    fn test_flatten_after_growth() {
        let mut octree = Octree::with_depth(2).unwrap();
        octree.insert(IVec3::new(1, 1, 1), Voxel::opaque(9, 9, 9));
        octree.insert(IVec3::new(40, 0, 0), Voxel::opaque(8, 8, 8));
        let buffer = octree.flatten().unwrap();

        assert_eq!(count_kind(&buffer, LEAF_NODE), 2);
        assert_eq!(buffer.len(), octree.flattened_len());
    }
}
