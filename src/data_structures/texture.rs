//! Decoded texture assets and texture creation utilities.

use anyhow::*;
use image::{GenericImageView, ImageFormat, load_from_memory_with_format};

/// A decoded texture asset.
///
/// Holds the decoded pixel data of a texture referenced by a material slot.
/// Typically created via [`from_bytes`](Self::from_bytes) after the raw image
/// file was fetched; engine backends upload the contained image to the GPU.
#[derive(Clone, Debug)]
pub struct Texture {
    pub name: String,
    pub image: image::DynamicImage,
}

impl Texture {
    /// Decode a texture from raw byte data (image file contents).
    ///
    /// # Arguments
    ///
    /// * `bytes` represent raw image file data (PNG, JPEG, etc.)
    /// * `label` is used as the texture name
    /// * `extension` is an optional file extension hint (e.g., "png"). If None, auto-detect.
    ///
    /// An extension that doesn't map to a known image format is an error; the
    /// import pipeline treats it as a non-fatal per-slot failure.
    pub fn from_bytes(bytes: &[u8], label: &str, extension: Option<&str>) -> Result<Self> {
        let image = match extension {
            None => image::load_from_memory(bytes)?,
            Some(ext) => {
                let format = ImageFormat::from_extension(ext)
                    .ok_or_else(|| anyhow!("unsupported texture format: {ext}"))?;
                load_from_memory_with_format(bytes, format)?
            }
        };
        Ok(Self {
            name: label.to_string(),
            image,
        })
    }

    /// Width and height of the decoded image in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}
