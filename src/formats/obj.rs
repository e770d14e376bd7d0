//! Wavefront OBJ/MTL parsing.

use std::{
    collections::BTreeMap,
    io::{BufReader, Cursor},
    rc::Rc,
};

use anyhow::{Context, Result, bail};

use crate::{
    data_structures::{
        material::{MaterialSlotData, TextureSlot},
        model::{MeshData, ModelGroup, ModelObject, StructuredModel},
    },
    formats::ModelFormat,
    resources::{base_dir_of, file_stem_of, join_path, load_string},
    sched::BoxFuture,
};

/// OBJ parser backed by `tobj`.
///
/// The MTL library is fetched and parsed alongside the model file (that is
/// how the format works), so its result is stashed until the orchestrator
/// enters the material-library stage.
#[derive(Default)]
pub struct ObjFormat {
    pending_materials: Option<Result<Vec<tobj::Material>, tobj::LoadError>>,
}

impl ObjFormat {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelFormat for ObjFormat {
    fn has_material_library(&self) -> bool {
        true
    }

    fn parse_texture_paths(&self, source_path: &str) -> Result<Vec<String>> {
        // The pre-scan exists for design-time dependency listing, which is a
        // native workflow; on WASM it reports no dependencies.
        #[cfg(target_arch = "wasm32")]
        {
            let _ = source_path;
            Ok(Vec::new())
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let obj_text = std::fs::read_to_string(source_path)
                .with_context(|| format!("failed to read {source_path}"))?;
            let base_dir = base_dir_of(source_path);
            let mut paths = Vec::new();
            for line in obj_text.lines() {
                let Some(mtl_name) = line.trim().strip_prefix("mtllib ") else {
                    continue;
                };
                let mtl_path = join_path(&base_dir, mtl_name.trim());
                let mtl_text = match std::fs::read_to_string(&mtl_path) {
                    Ok(text) => text,
                    Err(err) => {
                        log::warn!("skipping material library {mtl_path}: {err}");
                        continue;
                    }
                };
                let (materials, _) =
                    tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mtl_text)))
                        .with_context(|| format!("failed to parse material library {mtl_path}"))?;
                for material in materials {
                    for texture in [
                        material.diffuse_texture,
                        material.normal_texture,
                        material.specular_texture,
                        material.dissolve_texture,
                    ] {
                        match texture {
                            Some(path) if !path.is_empty() => paths.push(path),
                            _ => (),
                        }
                    }
                }
            }
            Ok(paths)
        }
    }

    fn load_model_file<'a>(
        &'a mut self,
        source_path: &'a str,
    ) -> BoxFuture<'a, Result<StructuredModel>> {
        Box::pin(async move {
            let obj_text = load_string(source_path)
                .await
                .with_context(|| format!("failed to fetch {source_path}"))?;
            let base_dir = base_dir_of(source_path);
            let mut obj_reader = BufReader::new(Cursor::new(obj_text));

            let (models, obj_materials) = tobj::load_obj_buf_async(
                &mut obj_reader,
                &tobj::LoadOptions {
                    triangulate: true,
                    single_index: true,
                    ..Default::default()
                },
                |p| {
                    let mtl_path = join_path(&base_dir, &p);
                    async move {
                        match load_string(&mtl_path).await {
                            Ok(mat_text) => {
                                tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mat_text)))
                            }
                            Err(err) => {
                                log::error!(
                                    "failed to fetch material library {mtl_path}: {err:#}"
                                );
                                Err(tobj::LoadError::OpenFileFailed)
                            }
                        }
                    }
                },
            )
            .await
            .with_context(|| format!("failed to parse {source_path}"))?;

            let objects: Vec<ModelObject> = models
                .into_iter()
                .enumerate()
                .map(|(idx, m)| ModelObject {
                    name: if m.name.is_empty() {
                        format!("mesh_{idx}")
                    } else {
                        m.name
                    },
                    mesh: Rc::new(MeshData {
                        positions: m.mesh.positions,
                        normals: m.mesh.normals,
                        tex_coords: m.mesh.texcoords,
                        indices: m.mesh.indices,
                    }),
                    material_id: m.mesh.material_id,
                })
                .collect();

            // tobj flattens `o`/`g` statements into a flat model list, so
            // grouping is reconstructed over shared materials: objects with
            // the same material form one render batch.
            let mut by_material: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
            for (idx, object) in objects.iter().enumerate() {
                if let Some(id) = object.material_id {
                    by_material.entry(id).or_default().push(idx);
                }
            }
            let groups = by_material
                .into_iter()
                .filter(|(_, members)| members.len() >= 2)
                .map(|(id, members)| {
                    let name = obj_materials
                        .as_ref()
                        .ok()
                        .and_then(|materials| materials.get(id))
                        .map(|material| material.name.clone())
                        .unwrap_or_else(|| format!("material_{id}"));
                    ModelGroup { name, members }
                })
                .collect();

            self.pending_materials = Some(obj_materials);

            Ok(StructuredModel {
                name: file_stem_of(source_path).to_string(),
                objects,
                groups,
            })
        })
    }

    fn load_material_library<'a>(
        &'a mut self,
        source_path: &'a str,
    ) -> BoxFuture<'a, Result<Vec<MaterialSlotData>>> {
        Box::pin(async move {
            let Some(pending) = self.pending_materials.take() else {
                bail!("material library for {source_path} requested before the model file");
            };
            let materials = pending
                .with_context(|| format!("failed to parse material library for {source_path}"))?;
            Ok(materials
                .into_iter()
                .map(|m| MaterialSlotData {
                    name: m.name,
                    diffuse: TextureSlot::from_path(m.diffuse_texture),
                    bump: TextureSlot::from_path(m.normal_texture),
                    specular: TextureSlot::from_path(m.specular_texture),
                    opacity: TextureSlot::from_path(m.dissolve_texture),
                })
                .collect())
        })
    }
}
