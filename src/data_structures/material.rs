//! Material descriptions flowing through the import pipeline.
//!
//! A format parser produces [`MaterialSlotData`] with up to four texture slots
//! referenced by source-relative paths. The texture fetch stage resolves each
//! slot into a decoded [`Texture`]; the material build stage then folds the
//! slots into a [`BuiltMaterial`] consumed by scene nodes.

use crate::data_structures::texture::Texture;

/// One texture role of a material.
///
/// Starts out as a source-relative `Path`, becomes `Resolved` once fetched and
/// decoded, or `Empty` when absent or when resolution failed (non-fatal).
#[derive(Clone, Debug, Default)]
pub enum TextureSlot {
    #[default]
    Empty,
    Path(String),
    Resolved(Texture),
}

impl TextureSlot {
    pub fn from_path(path: Option<String>) -> Self {
        match path {
            Some(p) if !p.is_empty() => Self::Path(p),
            _ => Self::Empty,
        }
    }

    pub fn texture(&self) -> Option<&Texture> {
        match self {
            Self::Resolved(texture) => Some(texture),
            _ => None,
        }
    }
}

/// Per-material texture slots as parsed from a material library.
#[derive(Clone, Debug, Default)]
pub struct MaterialSlotData {
    pub name: String,
    pub diffuse: TextureSlot,
    pub bump: TextureSlot,
    pub specular: TextureSlot,
    pub opacity: TextureSlot,
}

impl MaterialSlotData {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// All four slots with their role names, for uniform iteration.
    pub fn slots_mut(&mut self) -> [(&'static str, &mut TextureSlot); 4] {
        [
            ("diffuse", &mut self.diffuse),
            ("bump", &mut self.bump),
            ("specular", &mut self.specular),
            ("opacity", &mut self.opacity),
        ]
    }
}

/// A material after the build stage: every slot either carries a decoded
/// texture or stays empty. Shared between instanced nodes via `Rc`.
#[derive(Clone, Debug, Default)]
pub struct BuiltMaterial {
    pub name: String,
    pub diffuse: Option<Texture>,
    pub bump: Option<Texture>,
    pub specular: Option<Texture>,
    pub opacity: Option<Texture>,
}

impl From<MaterialSlotData> for BuiltMaterial {
    fn from(slots: MaterialSlotData) -> Self {
        let take = |slot: TextureSlot| match slot {
            TextureSlot::Resolved(texture) => Some(texture),
            _ => None,
        };
        Self {
            name: slots.name,
            diffuse: take(slots.diffuse),
            bump: take(slots.bump),
            specular: take(slots.specular),
            opacity: take(slots.opacity),
        }
    }
}
