//! Import data structures: models, materials, textures, scene graphs, and instances.
//!
//! This module contains the core data types flowing through the import pipeline:
//!
//! - `model` contains the structured model description produced by format parsers
//! - `material` holds per-material texture slots, before and after resolution
//! - `texture` contains the decoded texture asset and creation utilities
//! - `instance` holds per-node transformation data
//! - `scene_graph` enables hierarchical scene organization

pub mod instance;
pub mod material;
pub mod model;
pub mod scene_graph;
pub mod texture;
