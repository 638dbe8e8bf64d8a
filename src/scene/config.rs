//! Scene configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::voxel::svo::OctreeConfig;

/// Configuration for the pastel cube scene
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Octree the scene is written into
    pub octree: OctreeConfig,
    /// Voxels per cube side
    pub cube_size: u32,
    /// Random seed for voxel colors
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            octree: OctreeConfig::default(),
            cube_size: 10,
            seed: 12345,
        }
    }
}

impl SceneConfig {
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
