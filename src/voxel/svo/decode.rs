//! Reader for flattened octree buffers
//!
//! Parses what [`Octree::flatten`](super::Octree::flatten) produces, checking
//! every structural rule of the format, and answers point queries by chasing
//! child-table indices the same way a GPU traversal would.

use std::collections::HashMap;

use glam::IVec3;

use super::address::{self, MAX_DEPTH};
use super::flatten::{tag_index, tag_kind, BRANCH_NODE, LEAF_NODE};
use crate::core::{Error, Result};
use crate::voxel::voxel::{Voxel, VOXEL_WORDS};

/// One decoded node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlatNode {
    Branch {
        offset: u32,
        /// Start index of each child, 0 when absent
        children: [u32; 8],
    },
    Leaf {
        offset: u32,
        voxels: [Voxel; 8],
    },
}

impl FlatNode {
    /// Word index of this node's tag
    pub fn offset(&self) -> u32 {
        match self {
            FlatNode::Branch { offset, .. } | FlatNode::Leaf { offset, .. } => *offset,
        }
    }
}

/// Validated view of a flattened buffer
#[derive(Clone, Debug)]
pub struct FlatTree {
    /// Nodes in buffer (preorder) order
    nodes: Vec<FlatNode>,
    by_offset: HashMap<u32, usize>,
    /// Branch levels above the leaves, if any leaf exists
    leaf_depth: Option<u32>,
}

impl FlatTree {
    /// Nodes in buffer order; the root comes first
    pub fn nodes(&self) -> &[FlatNode] {
        &self.nodes
    }

    /// Node whose tag sits at `offset`
    pub fn node_at(&self, offset: u32) -> Option<&FlatNode> {
        self.by_offset.get(&offset).map(|&i| &self.nodes[i])
    }

    pub fn branch_count(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, FlatNode::Branch { .. })).count()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, FlatNode::Leaf { .. })).count()
    }

    /// Depth at which leaves were found; None for a tree without leaves
    pub fn leaf_depth(&self) -> Option<u32> {
        self.leaf_depth
    }

    /// Color stored for `pos` in a tree of the given depth.
    ///
    /// Returns `Ok(None)` when the path hits an empty child slot. Slots of an
    /// existing leaf that were never written read back as `Voxel::EMPTY`.
    pub fn sample(&self, pos: IVec3, depth: u32) -> Result<Option<Voxel>> {
        if depth > MAX_DEPTH || address::bounds_test(pos, depth) != 0 {
            return Err(Error::OutOfRange { pos, depth });
        }
        let path = address::index_of(pos, depth);

        let mut offset = 0u32;
        for octant in path.branch_digits() {
            match self.node_at(offset) {
                Some(FlatNode::Branch { children, .. }) => {
                    let child = children[octant as usize];
                    if child == 0 {
                        return Ok(None);
                    }
                    offset = child;
                }
                _ => return Err(malformed(offset as usize, "expected a branch on the path")),
            }
        }
        match self.node_at(offset) {
            Some(FlatNode::Leaf { voxels, .. }) => Ok(Some(voxels[path.leaf_slot() as usize])),
            _ => Err(malformed(offset as usize, "expected a leaf at the end of the path")),
        }
    }
}

fn malformed(offset: usize, reason: impl Into<String>) -> Error {
    Error::MalformedBuffer { offset, reason: reason.into() }
}

/// Parse and validate a flattened buffer
pub fn decode(words: &[u32]) -> Result<FlatTree> {
    if words.is_empty() {
        return Err(malformed(0, "empty buffer"));
    }
    if tag_kind(words[0]) != BRANCH_NODE {
        return Err(malformed(0, "root is not a branch"));
    }

    let mut decoder = Decoder {
        words,
        cursor: 0,
        nodes: Vec::new(),
        leaf_depth: None,
    };
    decoder.node(0)?;
    if decoder.cursor != words.len() {
        return Err(malformed(decoder.cursor, "trailing words after the root encoding"));
    }

    let by_offset = decoder
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.offset(), i))
        .collect();
    Ok(FlatTree {
        nodes: decoder.nodes,
        by_offset,
        leaf_depth: decoder.leaf_depth,
    })
}

struct Decoder<'a> {
    words: &'a [u32],
    cursor: usize,
    nodes: Vec<FlatNode>,
    leaf_depth: Option<u32>,
}

impl Decoder<'_> {
    fn word(&mut self) -> Result<u32> {
        let word = self
            .words
            .get(self.cursor)
            .copied()
            .ok_or_else(|| malformed(self.cursor, "unexpected end of buffer"))?;
        self.cursor += 1;
        Ok(word)
    }

    fn peek(&self) -> Result<u32> {
        self.words
            .get(self.cursor)
            .copied()
            .ok_or_else(|| malformed(self.cursor, "unexpected end of buffer"))
    }

    /// Decode the node starting at the cursor, returning its offset
    fn node(&mut self, level: u32) -> Result<u32> {
        let offset = self.cursor;
        if level > MAX_DEPTH {
            return Err(malformed(offset, "nesting deeper than the maximum depth"));
        }
        let tag = self.word()?;
        if tag_index(tag) as usize != offset {
            return Err(malformed(
                offset,
                format!("tag index {} does not match its position", tag_index(tag)),
            ));
        }

        // Tag index matched the position, so the offset fits in 30 bits
        let offset = offset as u32;
        match tag_kind(tag) {
            BRANCH_NODE => {
                let mut starts = Vec::with_capacity(8);
                while tag_kind(self.peek()?) != 0 {
                    if starts.len() == 8 {
                        return Err(malformed(self.cursor, "branch has more than 8 children"));
                    }
                    starts.push(self.node(level + 1)?);
                }

                let table_at = self.cursor;
                let mut children = [0u32; 8];
                for child in children.iter_mut() {
                    *child = self.word()?;
                }
                let listed: Vec<u32> = children.iter().copied().filter(|&c| c != 0).collect();
                if listed != starts {
                    return Err(malformed(table_at, "child table does not match the child encodings"));
                }
                self.nodes.push(FlatNode::Branch { offset, children });
            }
            LEAF_NODE => {
                if level == 0 {
                    return Err(malformed(offset as usize, "root is not a branch"));
                }
                match self.leaf_depth {
                    None => self.leaf_depth = Some(level),
                    Some(depth) if depth != level => {
                        return Err(malformed(offset as usize, "leaves at mixed depths"));
                    }
                    Some(_) => {}
                }

                let mut voxels = [Voxel::EMPTY; 8];
                for voxel in voxels.iter_mut() {
                    let at = self.cursor;
                    let mut channels = [0u32; VOXEL_WORDS];
                    for channel in channels.iter_mut() {
                        *channel = self.word()?;
                    }
                    *voxel = Voxel::from_words(channels)
                        .ok_or_else(|| malformed(at, "color channel wider than 8 bits"))?;
                }
                self.nodes.push(FlatNode::Leaf { offset, voxels });
            }
            kind => {
                return Err(malformed(offset as usize, format!("unknown node kind {:#x}", kind)));
            }
        }
        Ok(offset)
    }
}
