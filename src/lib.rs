//! flow-import
//!
//! A lightweight, cross-platform 3D model import pipeline for native and WASM
//! targets. An import request turns a source model file into a scene-graph
//! subtree through a cooperative multi-stage pipeline (parse, material
//! library, texture fetch, material build, scene build) with phase-weighted
//! progress per import, an import cache that serves repeated requests by
//! cloning, and per-import success/failure reporting. Format parsers, scene
//! builders and texture resolution are pluggable at trait seams.
//!
//! High-level modules
//! - `import`: the import orchestrator, request and configuration types
//! - `progress`: per-import progress records and the active-import registry
//! - `cache`: completed-import cache keyed by source path
//! - `builder`: incremental scene/material building behind the engine seam
//! - `formats`: pluggable file format parsers (OBJ provided)
//! - `resources`: fetching raw bytes and texture resolution strategies
//! - `data_structures`: models, materials, textures, scene graphs, instances
//! - `sched`: cooperative scheduling helpers for interleaving imports
//!

pub mod builder;
pub mod cache;
pub mod data_structures;
pub mod formats;
pub mod import;
pub mod progress;
pub mod resources;
pub mod sched;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use import::{ImportOptions, ImportRequest, Importer};

/// Wire up logging for the current platform.
pub fn init_logging() {
    #[cfg(not(target_arch = "wasm32"))]
    let _ = env_logger::try_init();
    #[cfg(target_arch = "wasm32")]
    let _ = console_log::init_with_level(log::Level::Info);
}
