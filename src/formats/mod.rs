//! Pluggable model file format parsers.
//!
//! Each supported file format implements [`ModelFormat`]; the orchestrator is
//! format-agnostic and drives whichever implementation the caller selected.
//! [`detect_format`] offers extension-based selection for callers that don't
//! carry their own detection step.

use anyhow::Result;

use crate::{
    data_structures::{material::MaterialSlotData, model::StructuredModel},
    resources::extension_of,
    sched::BoxFuture,
};

pub mod obj;

pub trait ModelFormat {
    /// Whether this format carries an associated material library. Only then
    /// does the orchestrator enter the material-library parse stage.
    fn has_material_library(&self) -> bool;

    /// Pre-scan of all texture references of a source file, without running a
    /// full import. Used by design-time importers for dependency listing.
    fn parse_texture_paths(&self, source_path: &str) -> Result<Vec<String>>;

    /// Parse the source file into a structured model. A failure here is fatal
    /// to the import.
    fn load_model_file<'a>(
        &'a mut self,
        source_path: &'a str,
    ) -> BoxFuture<'a, Result<StructuredModel>>;

    /// Parse the associated material library. Only invoked after a successful
    /// [`load_model_file`](Self::load_model_file) and only when
    /// [`has_material_library`](Self::has_material_library) holds. A failure
    /// here is fatal to the import.
    fn load_material_library<'a>(
        &'a mut self,
        source_path: &'a str,
    ) -> BoxFuture<'a, Result<Vec<MaterialSlotData>>>;
}

/// Pick a parser by file extension. Returns `None` for unknown formats.
pub fn detect_format(source_path: &str) -> Option<Box<dyn ModelFormat>> {
    match extension_of(source_path)?.to_ascii_lowercase().as_str() {
        "obj" => Some(Box::new(obj::ObjFormat::new())),
        _ => None,
    }
}
