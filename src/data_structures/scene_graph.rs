//! Scene graph and hierarchical scene organization.
//!
//! Provides traits and structures for building a scene graph: a hierarchical
//! representation of imported objects. Nodes are shared as
//! `Rc<RefCell<dyn SceneNode>>` handles so a completed import can live in the
//! import cache while callers hold references into the same tree, and so
//! cached trees can be deep-cloned into cheap instanced duplicates.

use std::{cell::RefCell, rc::Rc};

use crate::data_structures::{
    instance::Instance,
    material::BuiltMaterial,
    model::MeshData,
};

/// Shared handle to a scene node.
pub type SceneNodeRef = Rc<RefCell<dyn SceneNode>>;

pub trait SceneNode {
    fn name(&self) -> &str;

    fn set_name(&mut self, name: &str);

    fn local_transform(&self) -> Instance;

    fn set_local_transform(&mut self, instance: Instance);

    fn children(&self) -> &[SceneNodeRef];

    fn add_child(&mut self, child: SceneNodeRef);

    /// Recursively copy this node's subtree.
    ///
    /// Node structure and transforms are copied; mesh and material payloads
    /// are shared between the copies, so duplicating a cached import stays
    /// cheap regardless of mesh size.
    fn deep_clone(&self) -> SceneNodeRef;

    /// The mesh payload, for model nodes.
    fn mesh(&self) -> Option<Rc<MeshData>> {
        None
    }

    /// The material payload, for model nodes.
    fn material(&self) -> Option<Rc<BuiltMaterial>> {
        None
    }

    /// Number of nodes in this subtree, this node included.
    fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|child| child.borrow().node_count())
            .sum::<usize>()
    }

    /// Flattened `(name, world transform)` pairs for this subtree.
    fn world_transforms(&self, parent: &Instance) -> Vec<(String, Instance)> {
        let world = parent * &self.local_transform();
        let mut transforms = vec![(self.name().to_string(), world.clone())];
        for child in self.children() {
            transforms.extend(child.borrow().world_transforms(&world));
        }
        transforms
    }
}

impl std::fmt::Debug for dyn SceneNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneNode")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Depth-first search for a node by name.
pub fn find_node(root: &SceneNodeRef, name: &str) -> Option<SceneNodeRef> {
    if root.borrow().name() == name {
        return Some(root.clone());
    }
    for child in root.borrow().children() {
        if let Some(found) = find_node(child, name) {
            return Some(found);
        }
    }
    None
}

/// A node without a mesh of its own: import roots and group containers.
pub struct ContainerNode {
    name: String,
    local: Instance,
    children: Vec<SceneNodeRef>,
}

impl ContainerNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            local: Instance::default(),
            children: Vec::new(),
        }
    }

    pub fn new_ref(name: &str) -> SceneNodeRef {
        Rc::new(RefCell::new(Self::new(name)))
    }
}

impl SceneNode for ContainerNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn local_transform(&self) -> Instance {
        self.local.clone()
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn children(&self) -> &[SceneNodeRef] {
        &self.children
    }

    fn add_child(&mut self, child: SceneNodeRef) {
        self.children.push(child);
    }

    fn deep_clone(&self) -> SceneNodeRef {
        Rc::new(RefCell::new(Self {
            name: self.name.clone(),
            local: self.local.clone(),
            children: self
                .children
                .iter()
                .map(|child| child.borrow().deep_clone())
                .collect(),
        }))
    }
}

/// A node carrying one object's mesh and its (optional) material.
pub struct ModelNode {
    name: String,
    local: Instance,
    children: Vec<SceneNodeRef>,
    mesh: Rc<MeshData>,
    material: Option<Rc<BuiltMaterial>>,
}

impl ModelNode {
    pub fn new(name: &str, mesh: Rc<MeshData>, material: Option<Rc<BuiltMaterial>>) -> Self {
        Self {
            name: name.to_string(),
            local: Instance::default(),
            children: Vec::new(),
            mesh,
            material,
        }
    }

    pub fn new_ref(
        name: &str,
        mesh: Rc<MeshData>,
        material: Option<Rc<BuiltMaterial>>,
    ) -> SceneNodeRef {
        Rc::new(RefCell::new(Self::new(name, mesh, material)))
    }
}

impl SceneNode for ModelNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn local_transform(&self) -> Instance {
        self.local.clone()
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn children(&self) -> &[SceneNodeRef] {
        &self.children
    }

    fn add_child(&mut self, child: SceneNodeRef) {
        self.children.push(child);
    }

    fn deep_clone(&self) -> SceneNodeRef {
        Rc::new(RefCell::new(Self {
            name: self.name.clone(),
            local: self.local.clone(),
            children: self
                .children
                .iter()
                .map(|child| child.borrow().deep_clone())
                .collect(),
            mesh: Rc::clone(&self.mesh),
            material: self.material.clone(),
        }))
    }

    fn mesh(&self) -> Option<Rc<MeshData>> {
        Some(Rc::clone(&self.mesh))
    }

    fn material(&self) -> Option<Rc<BuiltMaterial>> {
        self.material.clone()
    }
}
