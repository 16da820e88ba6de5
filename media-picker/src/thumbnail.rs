//! Thumbnail rendering and the on-disk thumbnail cache
//!
//! Thumbnails are rendered upright (camera orientation applied), scaled to
//! fit a square edge and stored as WebP keyed by asset id and edge length.
//! Rendering is synchronous; UI callers go through [`load_thumbnail`] which
//! moves the work off the async runtime.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::ImageFormat;
use uuid::Uuid;

use crate::export::{apply_orientation, read_orientation};

/// Error type for thumbnail operations
#[derive(Debug)]
pub enum ThumbnailError {
    ImageLoadError(String),
    ImageSaveError(String),
    IoError(std::io::Error),
    PathError(String),
}

impl std::fmt::Display for ThumbnailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThumbnailError::ImageLoadError(msg) => write!(f, "Image load error: {}", msg),
            ThumbnailError::ImageSaveError(msg) => write!(f, "Image save error: {}", msg),
            ThumbnailError::IoError(e) => write!(f, "IO error: {}", e),
            ThumbnailError::PathError(msg) => write!(f, "Path error: {}", msg),
        }
    }
}

impl std::error::Error for ThumbnailError {}

impl From<std::io::Error> for ThumbnailError {
    fn from(err: std::io::Error) -> Self {
        ThumbnailError::IoError(err)
    }
}

/// Renders an upright WebP thumbnail fitting into edge x edge
pub fn render_thumbnail(source_path: &str, edge: u32) -> Result<Vec<u8>, ThumbnailError> {
    log::debug!("Rendering thumbnail for {} at {}px", source_path, edge);

    let bytes = std::fs::read(source_path)?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| ThumbnailError::ImageLoadError(format!("Failed to load image: {}", e)))?;
    let img = apply_orientation(img, read_orientation(&bytes));

    let thumb = img.resize(edge, edge, FilterType::Lanczos3);

    let mut buffer = Cursor::new(Vec::new());
    thumb
        .write_to(&mut buffer, ImageFormat::WebP)
        .map_err(|e| ThumbnailError::ImageSaveError(format!("Failed to write thumbnail: {}", e)))?;

    Ok(buffer.into_inner())
}

/// Cache file for one asset at one edge length
pub fn cache_path(cache_dir: &Path, asset: &Uuid, edge: u32) -> PathBuf {
    cache_dir.join(format!("{}_{}.webp", asset, edge))
}

/// Returns cached thumbnail bytes, rendering and storing them on first use
pub fn cached_thumbnail(
    cache_dir: &Path,
    asset: &Uuid,
    edge: u32,
    source_path: &str,
) -> Result<Vec<u8>, ThumbnailError> {
    let path = cache_path(cache_dir, asset, edge);
    if path.exists() {
        return Ok(std::fs::read(&path)?);
    }

    let bytes = render_thumbnail(source_path, edge)?;

    std::fs::create_dir_all(cache_dir)?;
    std::fs::write(&path, &bytes)?;
    log::debug!("Thumbnail cached: {:?}", path);

    Ok(bytes)
}

/// Renders or loads a cached thumbnail without blocking the async runtime
pub async fn load_thumbnail(
    cache_dir: PathBuf,
    asset: Uuid,
    edge: u32,
    source_path: String,
) -> Result<Vec<u8>, ThumbnailError> {
    tokio::task::spawn_blocking(move || cached_thumbnail(&cache_dir, &asset, edge, &source_path))
        .await
        .map_err(|e| ThumbnailError::PathError(format!("Task join error: {}", e)))?
}
