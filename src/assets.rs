//! Texture loading
//!
//! Synchronous texture loads from the filesystem. Textures are released when
//! the last `Texture2D` handle is dropped, so whoever owns the handle owns the
//! GPU resource.

use macroquad::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for texture loading
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },
}

/// Load an image file into a nearest-filtered texture.
///
/// Needs a live macroquad context.
pub fn load_texture_file<P: AsRef<Path>>(path: P) -> Result<Texture2D, AssetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = Image::from_file_with_format(&bytes, None).map_err(|e| AssetError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let texture = Texture2D::from_image(&image);
    texture.set_filter(FilterMode::Nearest);
    log::debug!("loaded texture {} ({}x{})", path.display(), image.width, image.height);
    Ok(texture)
}
