//! Demo scenes for populating an octree

pub mod config;
pub mod pastel;

pub use config::SceneConfig;
pub use pastel::{build_scene, pastel_color, populate_pastel_cube};
