//! Sparse Voxel Octree container

use glam::IVec3;

use super::address::{self, OctantPath, DEFAULT_DEPTH, MAX_DEPTH, MIN_DEPTH};
use super::config::OctreeConfig;
use super::node::{Branch, Leaf, SvoNode};
use crate::core::{Error, Result};
use crate::voxel::voxel::Voxel;

/// Growable sparse voxel octree over signed integer coordinates
///
/// Nodes live in an arena; the root branch is always at index 0. Every leaf
/// sits exactly `depth` branch levels below the root.
#[derive(Debug, Clone)]
pub struct Octree {
    /// All octree nodes (root is at index 0)
    nodes: Vec<SvoNode>,
    /// Branch levels above the leaves
    depth: u32,
}

/// Node and voxel counts for an octree
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OctreeStats {
    pub depth: u32,
    pub branch_count: usize,
    pub leaf_count: usize,
    /// Written leaf slots
    pub voxel_count: usize,
}

impl Octree {
    /// Create an empty octree at the default depth
    pub fn new() -> Self {
        Self::empty(DEFAULT_DEPTH)
    }

    /// Create an empty octree addressing `[-2^depth, 2^depth - 1]`
    pub fn with_depth(depth: u32) -> Result<Self> {
        if !(MIN_DEPTH..=MAX_DEPTH).contains(&depth) {
            return Err(Error::InvalidDepth { depth });
        }
        Ok(Self::empty(depth))
    }

    /// Create an empty octree from configuration
    pub fn from_config(config: &OctreeConfig) -> Result<Self> {
        Self::with_depth(config.initial_depth)
    }

    fn empty(depth: u32) -> Self {
        Self {
            nodes: vec![SvoNode::Branch(Branch::EMPTY)],
            depth,
        }
    }

    /// Reconstruct octree from serialized node data.
    ///
    /// Rejects arenas whose shape breaks the octree invariants: the root must
    /// be a branch at index 0, every other node must be referenced exactly
    /// once, and leaves must sit exactly `depth` levels down.
    pub fn from_serialized(depth: u32, nodes: Vec<SvoNode>) -> Result<Self> {
        if !(MIN_DEPTH..=MAX_DEPTH).contains(&depth) {
            return Err(Error::InvalidDepth { depth });
        }
        match nodes.first() {
            Some(SvoNode::Branch(_)) => {}
            Some(SvoNode::Leaf(_)) => {
                return Err(Error::CorruptSnapshot("root node is a leaf".into()));
            }
            None => return Err(Error::CorruptSnapshot("no root node".into())),
        }

        let mut seen = vec![false; nodes.len()];
        seen[0] = true;
        let mut stack = vec![(0u32, 0u32)];
        while let Some((index, level)) = stack.pop() {
            let SvoNode::Branch(branch) = &nodes[index as usize] else {
                continue;
            };
            for child in branch.children.iter().flatten().copied() {
                let Some(slot) = seen.get_mut(child as usize) else {
                    return Err(Error::CorruptSnapshot(format!(
                        "node {} references missing node {}", index, child
                    )));
                };
                if *slot {
                    return Err(Error::CorruptSnapshot(format!(
                        "node {} is referenced more than once", child
                    )));
                }
                *slot = true;

                let child_level = level + 1;
                let expect_leaf = child_level == depth;
                if nodes[child as usize].is_leaf() != expect_leaf {
                    return Err(Error::CorruptSnapshot(format!(
                        "node {} at level {} has the wrong kind for depth {}",
                        child, child_level, depth
                    )));
                }
                stack.push((child, child_level));
            }
        }

        if let Some(orphan) = seen.iter().position(|s| !s) {
            return Err(Error::CorruptSnapshot(format!("node {} is unreachable", orphan)));
        }

        Ok(Self { nodes, depth })
    }

    /// Get all nodes as slice (for serialization)
    pub fn nodes_slice(&self) -> &[SvoNode] {
        &self.nodes
    }

    /// Get node by index
    pub fn node(&self, index: u32) -> &SvoNode {
        &self.nodes[index as usize]
    }

    /// Get number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Current depth (branch levels above the leaves)
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Smallest addressable coordinate on every axis
    pub fn min_incl(&self) -> IVec3 {
        IVec3::splat(address::min_incl(self.depth))
    }

    /// Largest addressable coordinate on every axis
    pub fn max_incl(&self) -> IVec3 {
        IVec3::splat(address::max_incl(self.depth))
    }

    /// Check whether `pos` is addressable without growing
    pub fn contains(&self, pos: IVec3) -> bool {
        address::bounds_test(pos, self.depth) == 0
    }

    /// Check if octree is empty (only has empty root)
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Write `voxel` at `pos`, growing the addressable region if needed
    pub fn insert(&mut self, pos: IVec3, voxel: Voxel) {
        log::trace!(
            "Inserting voxel ({}, {}, {}, {}) at {}",
            voxel.r, voxel.g, voxel.b, voxel.a, pos
        );
        *self.obtain_mutable(pos) = voxel;
    }

    /// Writable slot for `pos`, creating the path (and growing) as needed.
    /// The slot counts as written from this point on.
    pub fn obtain_mutable(&mut self, pos: IVec3) -> &mut Voxel {
        self.ensure_space(pos);
        let path = address::index_of(pos, self.depth);
        self.find_or_create(path)
    }

    /// Voxel at `pos`; never grows or allocates
    pub fn at(&self, pos: IVec3) -> Result<Voxel> {
        let (leaf, slot) = self.locate(pos)?;
        Ok(*self.leaf(leaf).get(slot))
    }

    /// Mutable voxel at `pos`; never grows or allocates
    pub fn at_mut(&mut self, pos: IVec3) -> Result<&mut Voxel> {
        let (leaf, slot) = self.locate(pos)?;
        Ok(self.leaf_mut(leaf).get_mut(slot))
    }

    /// Resolve `pos` to (leaf index, slot) for a previously written voxel
    fn locate(&self, pos: IVec3) -> Result<(u32, u8)> {
        if !self.contains(pos) {
            return Err(Error::OutOfRange { pos, depth: self.depth });
        }
        let path = address::index_of(pos, self.depth);
        let slot = path.leaf_slot();
        match self.find_leaf(path) {
            Some(leaf) if self.leaf(leaf).is_occupied(slot) => Ok((leaf, slot)),
            _ => Err(Error::UnpopulatedSlot { pos }),
        }
    }

    /// Walk the branch digits without creating anything
    fn find_leaf(&self, path: OctantPath) -> Option<u32> {
        let mut node_index = 0u32;
        for octant in path.branch_digits() {
            node_index = self.branch(node_index).child(octant)?;
        }
        Some(node_index)
    }

    fn find_or_create(&mut self, path: OctantPath) -> &mut Voxel {
        let mut node_index = 0u32;
        for level in 0..self.depth {
            let child_is_leaf = level + 1 == self.depth;
            node_index = self.child_or_insert(node_index, path.digit(level), child_is_leaf);
        }
        self.leaf_mut(node_index).get_mut(path.leaf_slot())
    }

    fn child_or_insert(&mut self, parent: u32, octant: u8, leaf: bool) -> u32 {
        if let Some(child) = self.branch(parent).child(octant) {
            return child;
        }
        let child = self.add_node(if leaf {
            SvoNode::Leaf(Leaf::EMPTY)
        } else {
            SvoNode::Branch(Branch::EMPTY)
        });
        self.branch_mut(parent).set_child(octant, child);
        child
    }

    /// Add a node and return its index
    fn add_node(&mut self, node: SvoNode) -> u32 {
        let index = self.nodes.len() as u32;
        self.nodes.push(node);
        index
    }

    fn branch(&self, index: u32) -> &Branch {
        match &self.nodes[index as usize] {
            SvoNode::Branch(branch) => branch,
            SvoNode::Leaf(_) => unreachable!("node {} above the leaf level is a leaf", index),
        }
    }

    fn branch_mut(&mut self, index: u32) -> &mut Branch {
        match &mut self.nodes[index as usize] {
            SvoNode::Branch(branch) => branch,
            SvoNode::Leaf(_) => unreachable!("node {} above the leaf level is a leaf", index),
        }
    }

    fn leaf(&self, index: u32) -> &Leaf {
        match &self.nodes[index as usize] {
            SvoNode::Leaf(leaf) => leaf,
            SvoNode::Branch(_) => unreachable!("node {} at the leaf level is a branch", index),
        }
    }

    fn leaf_mut(&mut self, index: u32) -> &mut Leaf {
        match &mut self.nodes[index as usize] {
            SvoNode::Leaf(leaf) => leaf,
            SvoNode::Branch(_) => unreachable!("node {} at the leaf level is a branch", index),
        }
    }
}

impl Octree {
    /// Grow until `pos` is addressable.
    ///
    /// Any `i32` coordinate fits at `MAX_DEPTH`, so this always terminates.
    fn ensure_space(&mut self, pos: IVec3) {
        let magnitude = address::bounds_test(pos, self.depth);
        if magnitude != 0 {
            self.grow_to(address::required_depth(magnitude));
        }
    }

    /// Grow to at least `depth` branch levels, keeping every stored voxel
    pub fn reserve_depth(&mut self, depth: u32) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(Error::GrowthExhausted { requested: depth, max: MAX_DEPTH });
        }
        self.grow_to(depth);
        Ok(())
    }

    fn grow_to(&mut self, depth: u32) {
        debug_assert!(depth <= MAX_DEPTH);
        while self.depth < depth {
            self.grow_once();
        }
    }

    /// Add one branch level above the current root.
    ///
    /// Shifting coordinates by `2^(D+1)` instead of `2^D` flips the old top
    /// bit into the new second bit on every axis: a child at octant `o` moves
    /// under new root octant `o`, behind a fresh branch at octant `o ^ 7`.
    fn grow_once(&mut self) {
        let old_children = self.branch(0).children;
        let mut root = Branch::EMPTY;
        for (octant, child) in old_children.iter().enumerate() {
            let Some(child) = *child else { continue };
            let octant = octant as u8;
            let mut bridge = Branch::EMPTY;
            bridge.set_child(octant ^ 0b111, child);
            let bridge_index = self.add_node(SvoNode::Branch(bridge));
            root.set_child(octant, bridge_index);
        }
        self.nodes[0] = SvoNode::Branch(root);
        self.depth += 1;
        log::debug!("Grew octree to depth {} ({} nodes)", self.depth, self.nodes.len());
    }
}

impl Octree {
    /// Count branches, leaves and written voxels
    pub fn stats(&self) -> OctreeStats {
        let mut stats = OctreeStats {
            depth: self.depth,
            ..Default::default()
        };
        for node in &self.nodes {
            match node {
                SvoNode::Branch(_) => stats.branch_count += 1,
                SvoNode::Leaf(leaf) => {
                    stats.leaf_count += 1;
                    stats.voxel_count += leaf.set_count();
                }
            }
        }
        stats
    }

    /// Visit every written voxel in Morton order
    pub fn for_each_voxel<F: FnMut(IVec3, Voxel)>(&self, mut callback: F) {
        let mut digits = Vec::with_capacity(self.depth as usize);
        self.for_each_voxel_recursive(0, &mut digits, &mut callback);
    }

    fn for_each_voxel_recursive<F: FnMut(IVec3, Voxel)>(
        &self,
        node_index: u32,
        digits: &mut Vec<u8>,
        callback: &mut F,
    ) {
        match &self.nodes[node_index as usize] {
            SvoNode::Branch(branch) => {
                for octant in 0..8u8 {
                    if let Some(child) = branch.child(octant) {
                        digits.push(octant);
                        self.for_each_voxel_recursive(child, digits, callback);
                        digits.pop();
                    }
                }
            }
            SvoNode::Leaf(leaf) => {
                for slot in 0..8u8 {
                    if leaf.is_occupied(slot) {
                        let pos = address::position_of(OctantPath::from_digits(digits, slot));
                        callback(pos, *leaf.get(slot));
                    }
                }
            }
        }
    }
}

impl Default for Octree {
    fn default() -> Self {
        Self::new()
    }
}
