#![allow(dead_code)]

use std::{cell::Cell, rc::Rc};

use anyhow::{Result, bail};
use flow_import::{
    builder::DefaultSceneBuilder,
    data_structures::{
        material::{MaterialSlotData, TextureSlot},
        model::{MeshData, ModelGroup, ModelObject, StructuredModel},
        texture::Texture,
    },
    formats::ModelFormat,
    import::{ImportOptions, Importer},
    resources::texture::TextureResolver,
    sched::{BoxFuture, yield_now},
};

/// In-memory model format: yields once while "parsing", then produces the
/// configured number of objects and single-member groups. Parse invocations
/// are counted through a shared cell so tests can assert cache behaviour.
pub struct StubFormat {
    pub objects: usize,
    pub groups: usize,
    pub materials: Vec<MaterialSlotData>,
    pub fail_parse: bool,
    pub parse_calls: Rc<Cell<usize>>,
}

impl StubFormat {
    pub fn new(objects: usize, groups: usize) -> Self {
        assert!(groups <= objects, "stub groups take one object each");
        Self {
            objects,
            groups,
            materials: Vec::new(),
            fail_parse: false,
            parse_calls: Rc::new(Cell::new(0)),
        }
    }

    pub fn with_materials(mut self, materials: Vec<MaterialSlotData>) -> Self {
        self.materials = materials;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_parse = true;
        self
    }

    pub fn counting(mut self, calls: &Rc<Cell<usize>>) -> Self {
        self.parse_calls = calls.clone();
        self
    }
}

impl ModelFormat for StubFormat {
    fn has_material_library(&self) -> bool {
        true
    }

    fn parse_texture_paths(&self, _source_path: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn load_model_file<'a>(
        &'a mut self,
        source_path: &'a str,
    ) -> BoxFuture<'a, Result<StructuredModel>> {
        Box::pin(async move {
            yield_now().await;
            self.parse_calls.set(self.parse_calls.get() + 1);
            if self.fail_parse {
                bail!("malformed model file {source_path}");
            }
            let objects = (0..self.objects)
                .map(|i| ModelObject {
                    name: format!("object_{i}"),
                    mesh: Rc::new(MeshData::default()),
                    material_id: if self.materials.is_empty() {
                        None
                    } else {
                        Some(i % self.materials.len())
                    },
                })
                .collect();
            let groups = (0..self.groups)
                .map(|g| ModelGroup {
                    name: format!("group_{g}"),
                    members: vec![g],
                })
                .collect();
            Ok(StructuredModel {
                name: "stub".to_string(),
                objects,
                groups,
            })
        })
    }

    fn load_material_library<'a>(
        &'a mut self,
        _source_path: &'a str,
    ) -> BoxFuture<'a, Result<Vec<MaterialSlotData>>> {
        Box::pin(async move {
            yield_now().await;
            Ok(self.materials.clone())
        })
    }
}

/// Resolver serving 1x1 textures from memory, failing for paths that contain
/// the configured substring (a stand-in for a 404 or a decode error).
#[derive(Default)]
pub struct StubResolver {
    pub fail_substring: Option<String>,
}

impl StubResolver {
    pub fn failing_on(substring: &str) -> Self {
        Self {
            fail_substring: Some(substring.to_string()),
        }
    }
}

impl TextureResolver for StubResolver {
    fn resolve<'a>(
        &'a self,
        _base_dir: &'a str,
        relative: &'a str,
    ) -> BoxFuture<'a, Result<Texture>> {
        Box::pin(async move {
            yield_now().await;
            if let Some(fail) = &self.fail_substring {
                if relative.contains(fail.as_str()) {
                    bail!("404 not found: {relative}");
                }
            }
            Ok(Texture {
                name: relative.to_string(),
                image: image::DynamicImage::new_rgba8(1, 1),
            })
        })
    }
}

pub fn importer(reuse_cached_imports: bool) -> Importer {
    let options = ImportOptions {
        reuse_cached_imports,
        ..Default::default()
    };
    Importer::with_resolver(options, Rc::new(StubResolver::default()))
}

pub fn builder() -> DefaultSceneBuilder {
    DefaultSceneBuilder::new()
}

pub fn material_with(name: &str, diffuse: Option<&str>, bump: Option<&str>) -> MaterialSlotData {
    MaterialSlotData {
        name: name.to_string(),
        diffuse: TextureSlot::from_path(diffuse.map(String::from)),
        bump: TextureSlot::from_path(bump.map(String::from)),
        ..Default::default()
    }
}
