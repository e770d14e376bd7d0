//! Scene and material building.
//!
//! The build side of the pipeline is engine-specific and shared across file
//! formats, so it sits behind the [`SceneBuilder`] trait: the orchestrator
//! initializes a build, then repeatedly invokes one incremental step per
//! scheduler turn until the builder reports completion, folding the running
//! counts into its progress record.
//!
//! [`DefaultSceneBuilder`] is the engine-agnostic implementation: materials
//! fold into [`BuiltMaterial`]s one per step, groups become container nodes
//! under the import root, and each object becomes a model node attached to
//! its group (or to the root when ungrouped).

use std::rc::Rc;

use anyhow::{Result, ensure};

use crate::{
    data_structures::{
        material::{BuiltMaterial, MaterialSlotData},
        model::{MeshData, StructuredModel},
        scene_graph::{ContainerNode, ModelNode, SceneNodeRef},
    },
    import::ImportOptions,
};

/// Running counts of the material build stage.
#[derive(Clone, Debug, Default)]
pub struct MaterialProgress {
    pub built: usize,
    pub total: usize,
}

/// Running counts of the scene build stage.
#[derive(Clone, Debug, Default)]
pub struct SceneProgress {
    pub objects_built: usize,
    pub objects_total: usize,
    pub groups_built: usize,
    pub groups_total: usize,
}

pub trait SceneBuilder {
    fn init_build_materials(&mut self, materials: Vec<MaterialSlotData>);

    /// Build one material and update `info`. Returns whether more work is
    /// pending.
    fn build_materials(&mut self, info: &mut MaterialProgress) -> bool;

    /// Prepare the incremental scene build under `root`.
    fn start_build_scene(
        &mut self,
        model: StructuredModel,
        root: SceneNodeRef,
        options: &ImportOptions,
    ) -> Result<()>;

    /// Build one group or object node and update `info`. Returns whether more
    /// work is pending.
    fn build_scene(&mut self, info: &mut SceneProgress) -> bool;
}

#[derive(Default)]
pub struct DefaultSceneBuilder {
    materials: Vec<MaterialSlotData>,
    built_materials: Vec<Rc<BuiltMaterial>>,
    next_material: usize,
    model: Option<StructuredModel>,
    root: Option<SceneNodeRef>,
    options: ImportOptions,
    group_nodes: Vec<SceneNodeRef>,
    object_group: Vec<Option<usize>>,
    next_group: usize,
    next_object: usize,
}

impl DefaultSceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Materials built so far, indexed like the material library.
    pub fn built_materials(&self) -> &[Rc<BuiltMaterial>] {
        &self.built_materials
    }
}

impl SceneBuilder for DefaultSceneBuilder {
    fn init_build_materials(&mut self, materials: Vec<MaterialSlotData>) {
        self.materials = materials;
        self.built_materials = Vec::with_capacity(self.materials.len());
        self.next_material = 0;
    }

    fn build_materials(&mut self, info: &mut MaterialProgress) -> bool {
        if self.next_material < self.materials.len() {
            let slots = self.materials[self.next_material].clone();
            self.built_materials.push(Rc::new(BuiltMaterial::from(slots)));
            self.next_material += 1;
        }
        info.built = self.next_material;
        info.total = self.materials.len();
        self.next_material < self.materials.len()
    }

    fn start_build_scene(
        &mut self,
        model: StructuredModel,
        root: SceneNodeRef,
        options: &ImportOptions,
    ) -> Result<()> {
        ensure!(
            !model.objects.is_empty(),
            "model {} contains no objects",
            model.name
        );
        let mut object_group = vec![None; model.objects.len()];
        for (group_idx, group) in model.groups.iter().enumerate() {
            for &member in &group.members {
                ensure!(
                    member < model.objects.len(),
                    "group {} references object {member} out of bounds",
                    group.name
                );
                object_group[member] = Some(group_idx);
            }
        }
        self.object_group = object_group;
        self.options = options.clone();
        self.group_nodes = Vec::with_capacity(model.groups.len());
        self.next_group = 0;
        self.next_object = 0;
        self.model = Some(model);
        self.root = Some(root);
        Ok(())
    }

    fn build_scene(&mut self, info: &mut SceneProgress) -> bool {
        let (Some(model), Some(root)) = (&self.model, &self.root) else {
            return false;
        };
        // Groups first, as objects attach into their group's container.
        if self.next_group < model.groups.len() {
            let group = &model.groups[self.next_group];
            let node = ContainerNode::new_ref(&group.name);
            root.borrow_mut().add_child(node.clone());
            self.group_nodes.push(node);
            self.next_group += 1;
        } else if self.next_object < model.objects.len() {
            let object = &model.objects[self.next_object];
            let mesh = convert_mesh(&object.mesh, &self.options);
            let material = object
                .material_id
                .and_then(|id| self.built_materials.get(id).cloned());
            let node = ModelNode::new_ref(&object.name, mesh, material);
            let parent = match self.object_group[self.next_object] {
                Some(group_idx) => &self.group_nodes[group_idx],
                None => root,
            };
            parent.borrow_mut().add_child(node);
            self.next_object += 1;
        }
        info.groups_built = self.next_group;
        info.groups_total = model.groups.len();
        info.objects_built = self.next_object;
        info.objects_total = model.objects.len();
        self.next_group < model.groups.len() || self.next_object < model.objects.len()
    }
}

/// Apply the configured model scale and vertical-axis conversion to mesh data.
///
/// Scale and axis conversion are baked into the mesh so the import root keeps
/// an identity transform; duplicating a cached import can then overwrite the
/// copy's local transform with the instance transform without losing them.
/// The Z-up conversion (x, y, z) → (x, z, -y) is a rotation, so triangle
/// winding is preserved and indices stay untouched.
fn convert_mesh(mesh: &Rc<MeshData>, options: &ImportOptions) -> Rc<MeshData> {
    if options.model_scale == 1.0 && !options.vertical_axis_is_z {
        return Rc::clone(mesh);
    }
    let remap = |channel: &[f32], scale: f32| {
        let mut out = Vec::with_capacity(channel.len());
        for chunk in channel.chunks_exact(3) {
            let (x, y, z) = (chunk[0] * scale, chunk[1] * scale, chunk[2] * scale);
            if options.vertical_axis_is_z {
                out.extend([x, z, -y]);
            } else {
                out.extend([x, y, z]);
            }
        }
        out
    };
    Rc::new(MeshData {
        positions: remap(&mesh.positions, options.model_scale),
        // Normals are directions, the scale doesn't apply.
        normals: remap(&mesh.normals, 1.0),
        tex_coords: mesh.tex_coords.clone(),
        indices: mesh.indices.clone(),
    })
}
