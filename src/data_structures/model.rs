//! Structured model descriptions produced by format parsers.
//!
//! The import orchestrator treats a [`StructuredModel`] as opaque beyond its
//! object and group counts; the scene builder turns it into a node tree.

use std::rc::Rc;

/// Raw mesh channels of one object, laid out flat as parsers emit them.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    /// Flat `[x, y, z]` triples.
    pub positions: Vec<f32>,
    /// Flat `[x, y, z]` triples, may be empty.
    pub normals: Vec<f32>,
    /// Flat `[u, v]` pairs, may be empty.
    pub tex_coords: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// One top-level object of a parsed model.
#[derive(Clone, Debug)]
pub struct ModelObject {
    pub name: String,
    pub mesh: Rc<MeshData>,
    /// Index into the material library's material list, when assigned.
    pub material_id: Option<usize>,
}

/// A named grouping over objects, by index into the object list.
#[derive(Clone, Debug)]
pub struct ModelGroup {
    pub name: String,
    pub members: Vec<usize>,
}

/// The parsed model a format implementation hands to the scene builder.
#[derive(Clone, Debug, Default)]
pub struct StructuredModel {
    pub name: String,
    pub objects: Vec<ModelObject>,
    pub groups: Vec<ModelGroup>,
}

impl StructuredModel {
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
