//! The import orchestrator.
//!
//! [`Importer`] drives one cooperative pipeline per import request:
//! parse → material-library parse → texture fetch → material build → scene
//! build. Progress is tracked per import with phase-weighted percentages,
//! completed imports are cached by source path so repeated requests clone
//! instead of re-parsing, and a request that arrives while the same path is
//! already being imported awaits that import's cache entry.
//!
//! An import is a plain future; callers interleave any number of them with
//! [`sched::run_all`](crate::sched::run_all) or their own single-threaded
//! executor. Every stage boundary and incremental build step is an explicit
//! suspension point.
//!
//! # Failure semantics
//!
//! A parse or scene-setup failure is fatal: the progress record keeps its
//! error flag and message, the future resolves to `Err`, and the path's
//! in-progress cache entry is cleared so waiters and later requests can
//! retry. A texture that fails to fetch or decode is not fatal: the slot
//! stays empty and the import carries on.

use std::{cell::RefCell, rc::Rc};

use anyhow::{Context, Result};
use futures_intrusive::sync::LocalManualResetEvent;
use instant::Instant;

use crate::{
    builder::{MaterialProgress, SceneBuilder, SceneProgress},
    cache::ImportCache,
    data_structures::{
        instance::Instance,
        material::{MaterialSlotData, TextureSlot},
        scene_graph::{ContainerNode, SceneNodeRef},
    },
    formats::ModelFormat,
    progress::{GlobalProgress, ProgressHandle, ProgressRecord},
    resources::{base_dir_of, file_stem_of},
    resources::texture::{FetchTextureResolver, TextureResolver},
    sched::yield_now,
};

/// Share of the total percentage reached when the model file is parsed.
pub const FILE_LOAD_WEIGHT: f32 = 8.0;
/// Share of the total percentage covered by the texture fetch stage.
pub const TEXTURE_WEIGHT: f32 = 1.0;
/// Share of the total percentage covered by the material build stage.
pub const MATERIAL_WEIGHT: f32 = 1.0;
/// Share of the total percentage covered by the scene build stage.
pub const SCENE_WEIGHT: f32 = 90.0;

const BUILD_BASE: f32 = FILE_LOAD_WEIGHT + TEXTURE_WEIGHT + MATERIAL_WEIGHT;

/// One request to turn a source model file into a scene-graph subtree.
pub struct ImportRequest {
    /// Name for the imported root node. Falls back to the source file's stem
    /// when empty or absent.
    pub display_name: Option<String>,
    /// Also the cache key.
    pub source_path: String,
    /// Existing node the imported subtree is attached under, if any.
    pub parent: Option<SceneNodeRef>,
}

impl ImportRequest {
    pub fn new(source_path: &str) -> Self {
        Self {
            display_name: None,
            source_path: source_path.to_string(),
            parent: None,
        }
    }

    pub fn named(mut self, display_name: &str) -> Self {
        self.display_name = Some(display_name.to_string());
        self
    }

    pub fn under(mut self, parent: SceneNodeRef) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Import configuration, read-only to the orchestrator.
#[derive(Clone, Debug)]
pub struct ImportOptions {
    /// Source files treat Z as the vertical axis and are converted to Y-up.
    pub vertical_axis_is_z: bool,
    /// Uniform scale baked into imported mesh data.
    pub model_scale: f32,
    /// Serve repeated requests for the same path by cloning the cached tree.
    pub reuse_cached_imports: bool,
    /// Local transform applied to duplicates cloned from the cache.
    pub instance_position: cgmath::Vector3<f32>,
    pub instance_rotation: cgmath::Euler<cgmath::Deg<f32>>,
    pub instance_scale: cgmath::Vector3<f32>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            vertical_axis_is_z: false,
            model_scale: 1.0,
            reuse_cached_imports: false,
            instance_position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            instance_rotation: cgmath::Euler::new(
                cgmath::Deg(0.0),
                cgmath::Deg(0.0),
                cgmath::Deg(0.0),
            ),
            instance_scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

enum CacheDecision {
    Clone(SceneNodeRef),
    Wait(Rc<LocalManualResetEvent>),
    Fresh,
}

/// The stateful import driver.
///
/// Owns the import cache and the progress registry shared by all imports it
/// runs; constructed once at startup and cleared per test. All state is
/// single-threaded, guarded by the cooperative scheduling model.
pub struct Importer {
    cache: Rc<RefCell<ImportCache>>,
    progress: Rc<RefCell<GlobalProgress>>,
    resolver: Rc<dyn TextureResolver>,
    options: ImportOptions,
}

impl Importer {
    pub fn new(options: ImportOptions) -> Self {
        Self::with_resolver(options, Rc::new(FetchTextureResolver))
    }

    pub fn with_resolver(options: ImportOptions, resolver: Rc<dyn TextureResolver>) -> Self {
        Self {
            cache: Rc::new(RefCell::new(ImportCache::new())),
            progress: Rc::new(RefCell::new(GlobalProgress::new())),
            resolver,
            options,
        }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn cache(&self) -> Rc<RefCell<ImportCache>> {
        self.cache.clone()
    }

    /// The registry a progress UI watches while imports run.
    pub fn global_progress(&self) -> Rc<RefCell<GlobalProgress>> {
        self.progress.clone()
    }

    /// Inspect a completed import without issuing a new request.
    pub fn cached_result(&self, source_path: &str) -> Option<SceneNodeRef> {
        self.cache.borrow().try_get_built(source_path)
    }

    /// Drop all cached imports and progress records.
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
        self.progress.borrow_mut().clear();
    }

    /// Run one import request through the pipeline.
    ///
    /// Resolves to the imported (or cloned) root node. The caller supplies
    /// the format parser matching the source file and a scene builder for the
    /// target engine; both are exclusive to this import.
    pub async fn import(
        &self,
        request: ImportRequest,
        format: &mut dyn ModelFormat,
        builder: &mut dyn SceneBuilder,
    ) -> Result<SceneNodeRef> {
        let stem = file_stem_of(&request.source_path).to_string();
        let display_name = match request.display_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => stem.clone(),
        };
        let record = ProgressRecord::shared(&display_name);
        self.progress.borrow_mut().register(record.clone());
        let started = Instant::now();
        yield_now().await;

        let result = self
            .run_stages(&request, &stem, &display_name, format, builder, &record)
            .await;
        match &result {
            Ok(_) => log::info!(
                "imported {} in {:?}",
                request.source_path,
                started.elapsed()
            ),
            Err(err) => {
                record.borrow_mut().fail(&format!("{err:#}"));
                self.cache.borrow_mut().clear_in_progress(&request.source_path);
                log::error!("import of {} failed: {err:#}", request.source_path);
            }
        }
        self.progress.borrow_mut().unregister(&record);
        result
    }

    async fn run_stages(
        &self,
        request: &ImportRequest,
        stem: &str,
        display_name: &str,
        format: &mut dyn ModelFormat,
        builder: &mut dyn SceneBuilder,
        record: &ProgressHandle,
    ) -> Result<SceneNodeRef> {
        let path = &request.source_path;

        loop {
            let decision = {
                let mut cache = self.cache.borrow_mut();
                if !self.options.reuse_cached_imports {
                    cache.mark_in_progress(path);
                    CacheDecision::Fresh
                } else if let Some(node) = cache.try_get_built(path) {
                    CacheDecision::Clone(node)
                } else if let Some(event) = cache.in_progress_event(path) {
                    CacheDecision::Wait(event)
                } else {
                    cache.mark_in_progress(path);
                    CacheDecision::Fresh
                }
            };
            match decision {
                CacheDecision::Clone(node) => {
                    return Ok(self.clone_from_cache(request, stem, node, record));
                }
                CacheDecision::Wait(event) => {
                    record
                        .borrow_mut()
                        .set_status("waiting for a running import of the same file");
                    event.wait().await;
                    // Either built (clone it) or cleared after a failure
                    // (retry as a fresh parse); decided by the next round.
                }
                CacheDecision::Fresh => break,
            }
        }

        record.borrow_mut().set_status("parsing model file");
        let model = format
            .load_model_file(path)
            .await
            .with_context(|| format!("failed to parse model file {path}"))?;
        record.borrow_mut().set_percentage(FILE_LOAD_WEIGHT);

        let materials = if format.has_material_library() {
            record.borrow_mut().set_status("parsing material library");
            format
                .load_material_library(path)
                .await
                .with_context(|| format!("failed to parse material library for {path}"))?
        } else {
            Vec::new()
        };

        let materials = self.fetch_textures(path, materials, record).await;

        builder.init_build_materials(materials);
        let mut material_info = MaterialProgress::default();
        record.borrow_mut().set_status("building materials");
        while builder.build_materials(&mut material_info) {
            let built = ratio(material_info.built, material_info.total);
            record
                .borrow_mut()
                .set_percentage(FILE_LOAD_WEIGHT + TEXTURE_WEIGHT + MATERIAL_WEIGHT * built);
            yield_now().await;
        }
        record.borrow_mut().set_percentage(BUILD_BASE);

        let root = ContainerNode::new_ref(display_name);
        if let Some(parent) = &request.parent {
            parent.borrow_mut().add_child(root.clone());
        }
        builder
            .start_build_scene(model, root.clone(), &self.options)
            .with_context(|| format!("failed to set up scene build for {path}"))?;
        let mut scene_info = SceneProgress::default();
        while builder.build_scene(&mut scene_info) {
            {
                let mut record = record.borrow_mut();
                record.set_status(&format!(
                    "{}/{} objects, {}/{} groups",
                    scene_info.objects_built,
                    scene_info.objects_total,
                    scene_info.groups_built,
                    scene_info.groups_total
                ));
                record.set_percentage(BUILD_BASE + SCENE_WEIGHT * scene_completion(&scene_info));
            }
            yield_now().await;
        }

        self.cache.borrow_mut().commit_built(path, root.clone());
        {
            let mut record = record.borrow_mut();
            record.set_status("done");
            record.set_percentage(100.0);
        }
        Ok(root)
    }

    fn clone_from_cache(
        &self,
        request: &ImportRequest,
        stem: &str,
        cached: SceneNodeRef,
        record: &ProgressHandle,
    ) -> SceneNodeRef {
        let count = self
            .cache
            .borrow_mut()
            .bump_and_get_instance_count(&request.source_path);
        let copy = cached.borrow().deep_clone();
        {
            let mut copy = copy.borrow_mut();
            // The synthesized instance name only applies when the request
            // didn't name the duplicate itself.
            match request.display_name.as_deref() {
                Some(name) if !name.is_empty() => copy.set_name(name),
                _ => copy.set_name(&format!("{stem}_{count}")),
            }
            copy.set_local_transform(Instance {
                position: self.options.instance_position,
                rotation: self.options.instance_rotation.into(),
                scale: self.options.instance_scale,
            });
        }
        if let Some(parent) = &request.parent {
            parent.borrow_mut().add_child(copy.clone());
        }
        let mut record = record.borrow_mut();
        record.set_status("cloned from cache");
        record.set_percentage(100.0);
        copy
    }

    async fn fetch_textures(
        &self,
        path: &str,
        mut materials: Vec<MaterialSlotData>,
        record: &ProgressHandle,
    ) -> Vec<MaterialSlotData> {
        let base_dir = base_dir_of(path);
        let total = materials.len();
        record.borrow_mut().set_status("fetching textures");
        for (idx, material) in materials.iter_mut().enumerate() {
            let material_name = material.name.clone();
            for (role, slot) in material.slots_mut() {
                let relative = match slot {
                    TextureSlot::Path(relative) => relative.clone(),
                    _ => continue,
                };
                match self.resolver.resolve(&base_dir, &relative).await {
                    Ok(texture) => *slot = TextureSlot::Resolved(texture),
                    Err(err) => {
                        log::warn!(
                            "leaving {role} slot of material {material_name} empty, \
                             {relative} did not resolve: {err:#}"
                        );
                        *slot = TextureSlot::Empty;
                    }
                }
            }
            record
                .borrow_mut()
                .set_percentage(FILE_LOAD_WEIGHT + TEXTURE_WEIGHT * ratio(idx + 1, total));
        }
        record
            .borrow_mut()
            .set_percentage(FILE_LOAD_WEIGHT + TEXTURE_WEIGHT);
        materials
    }
}

fn ratio(done: usize, total: usize) -> f32 {
    if total == 0 {
        1.0
    } else {
        done as f32 / total as f32
    }
}

/// Fraction of the scene build completed, averaging the object and group
/// fractions over the phases that have any work. Keeps the scene phase within
/// its weight so the percentage hits 100 only at successful completion.
fn scene_completion(info: &SceneProgress) -> f32 {
    let mut sum = 0.0;
    let mut phases = 0.0;
    if info.objects_total > 0 {
        sum += info.objects_built as f32 / info.objects_total as f32;
        phases += 1.0;
    }
    if info.groups_total > 0 {
        sum += info.groups_built as f32 / info.groups_total as f32;
        phases += 1.0;
    }
    if phases == 0.0 { 0.0 } else { sum / phases }
}
