//! Octree construction settings

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::address::DEFAULT_DEPTH;
use crate::core::{Error, Result};

/// Settings for constructing an [`Octree`](super::Octree)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Branch levels above the leaves; addressable range is `[-2^D, 2^D - 1]`
    pub initial_depth: u32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            initial_depth: DEFAULT_DEPTH,
        }
    }
}

impl OctreeConfig {
    /// Parse from a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
