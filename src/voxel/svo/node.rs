//! Sparse Voxel Octree node

use rkyv::{Archive, Deserialize, Serialize};

use crate::voxel::voxel::Voxel;

/// Interior node: up to 8 children, indexed by octant digit.
///
/// Children are arena indices into the owning octree. Index 0 is the root
/// and never appears as a child.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Archive, Deserialize, Serialize)]
pub struct Branch {
    pub children: [Option<u32>; 8],
}

impl Branch {
    /// Branch with no children
    pub const EMPTY: Branch = Branch { children: [None; 8] };

    /// Child at octant
    pub fn child(&self, octant: u8) -> Option<u32> {
        debug_assert!(octant < 8);
        self.children[octant as usize]
    }

    /// Set child at octant
    pub fn set_child(&mut self, octant: u8, child: u32) {
        debug_assert!(octant < 8);
        self.children[octant as usize] = Some(child);
    }

    /// Bit i set when child i exists
    pub fn child_mask(&self) -> u8 {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_some())
            .fold(0u8, |mask, (i, _)| mask | (1 << i))
    }

    /// Count number of present children
    pub fn child_count(&self) -> u8 {
        self.child_mask().count_ones() as u8
    }
}

/// Terminal node: 8 voxel slots indexed by the finest octant digit.
///
/// `occupied` has bit i set once slot i has been handed out for writing, so a
/// written zero color is distinguishable from a slot nobody touched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Archive, Deserialize, Serialize)]
pub struct Leaf {
    pub voxels: [Voxel; 8],
    pub occupied: u8,
}

impl Leaf {
    /// Leaf with every slot unset
    pub const EMPTY: Leaf = Leaf { voxels: [Voxel::EMPTY; 8], occupied: 0 };

    /// Voxel at slot
    pub fn get(&self, slot: u8) -> &Voxel {
        &self.voxels[slot as usize]
    }

    /// Mutable voxel at slot; marks the slot occupied
    pub fn get_mut(&mut self, slot: u8) -> &mut Voxel {
        debug_assert!(slot < 8);
        self.occupied |= 1 << slot;
        &mut self.voxels[slot as usize]
    }

    /// Check if slot has been written
    pub fn is_occupied(&self, slot: u8) -> bool {
        debug_assert!(slot < 8);
        (self.occupied >> slot) & 1 != 0
    }

    /// Number of written slots
    pub fn set_count(&self) -> usize {
        self.occupied.count_ones() as usize
    }
}

/// Octree node, either a branch or a leaf
#[derive(Clone, Copy, Debug, PartialEq, Eq, Archive, Deserialize, Serialize)]
pub enum SvoNode {
    Branch(Branch),
    Leaf(Leaf),
}

impl SvoNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, SvoNode::Leaf(_))
    }

    pub fn as_branch(&self) -> Option<&Branch> {
        match self {
            SvoNode::Branch(branch) => Some(branch),
            SvoNode::Leaf(_) => None,
        }
    }

    pub fn as_branch_mut(&mut self) -> Option<&mut Branch> {
        match self {
            SvoNode::Branch(branch) => Some(branch),
            SvoNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            SvoNode::Leaf(leaf) => Some(leaf),
            SvoNode::Branch(_) => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut Leaf> {
        match self {
            SvoNode::Leaf(leaf) => Some(leaf),
            SvoNode::Branch(_) => None,
        }
    }
}

impl Default for SvoNode {
    fn default() -> Self {
        SvoNode::Branch(Branch::EMPTY)
    }
}
