//! Texture resolution strategies.
//!
//! A material slot references a texture by a source-relative path. How that
//! path becomes a decoded [`Texture`] depends on the environment: at runtime
//! the bytes are fetched from the import's base directory and decoded by file
//! extension, while a design-time importer resolves against a store of
//! pre-imported assets. The strategy is chosen by whoever constructs the
//! [`Importer`](crate::import::Importer).

use std::collections::HashMap;

use anyhow::{Result, anyhow};

use crate::{
    data_structures::texture::Texture,
    resources::{extension_of, join_path, load_binary},
    sched::BoxFuture,
};

pub trait TextureResolver {
    /// Resolve a slot's relative path against the import's base directory.
    ///
    /// Failures here are non-fatal to the import; the orchestrator logs them
    /// and leaves the slot empty.
    fn resolve<'a>(&'a self, base_dir: &'a str, relative: &'a str)
    -> BoxFuture<'a, Result<Texture>>;
}

/// Runtime strategy: fetch the bytes from `base_dir + relative` (filesystem on
/// native, HTTP on WASM) and decode them according to the file extension.
#[derive(Default)]
pub struct FetchTextureResolver;

impl TextureResolver for FetchTextureResolver {
    fn resolve<'a>(
        &'a self,
        base_dir: &'a str,
        relative: &'a str,
    ) -> BoxFuture<'a, Result<Texture>> {
        Box::pin(async move {
            let path = join_path(base_dir, relative);
            let data = load_binary(&path).await?;
            Texture::from_bytes(&data, &path, extension_of(relative))
        })
    }
}

/// Design-time strategy: look the texture up by file name in a store of
/// already-imported assets. No fetching or decoding happens.
#[derive(Default)]
pub struct AssetStoreResolver {
    store: HashMap<String, Texture>,
}

impl AssetStoreResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file_name: &str, texture: Texture) {
        self.store.insert(file_name.to_string(), texture);
    }
}

impl TextureResolver for AssetStoreResolver {
    fn resolve<'a>(
        &'a self,
        _base_dir: &'a str,
        relative: &'a str,
    ) -> BoxFuture<'a, Result<Texture>> {
        Box::pin(async move {
            let file_name = relative
                .rsplit(|c| c == '/' || c == '\\')
                .next()
                .unwrap_or(relative);
            self.store
                .get(file_name)
                .cloned()
                .ok_or_else(|| anyhow!("no pre-imported texture named {file_name}"))
        })
    }
}
