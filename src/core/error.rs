//! Error types for the svoxel crate

use glam::IVec3;
use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// Bounded lookup on a coordinate outside `[-2^D, 2^D - 1]`
    #[error("position {pos} is outside the addressable range of depth {depth}")]
    OutOfRange { pos: IVec3, depth: u32 },

    /// Bounded lookup on an in-range coordinate that was never written
    #[error("no voxel has been written at {pos}")]
    UnpopulatedSlot { pos: IVec3 },

    #[error("cannot grow octree to depth {requested} (maximum is {max})")]
    GrowthExhausted { requested: u32, max: u32 },

    #[error("invalid octree depth {depth}")]
    InvalidDepth { depth: u32 },

    /// A node start index no longer fits in the 30 tag bits
    #[error("flattened node index {index} does not fit in a tag word")]
    BufferIndexOverflow { index: usize },

    #[error("malformed flattened buffer at word {offset}: {reason}")]
    MalformedBuffer { offset: usize, reason: String },

    #[error("corrupt octree snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
