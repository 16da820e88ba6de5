//! Library abstraction the picker front end is written against
//!
//! A `MediaLibrary` hands out album lists and filtered asset snapshots and
//! pushes change notifications over a channel. The SQLite-backed
//! implementation lives in `catalog`.

use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use crate::models::{Album, AlbumId, Asset, MediaFilter};
use crate::thumbnail::ThumbnailError;

/// Result type for library operations
pub type LibraryResult<T> = Result<T, LibraryError>;

/// Errors surfaced by media library implementations
#[derive(Debug)]
pub enum LibraryError {
    DatabaseError(rusqlite::Error),
    ThumbnailError(ThumbnailError),
    NotFound(String),
    IoError(std::io::Error),
    Other(String),
}

impl std::fmt::Display for LibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryError::DatabaseError(e) => write!(f, "Database error: {}", e),
            LibraryError::ThumbnailError(e) => write!(f, "Thumbnail error: {}", e),
            LibraryError::NotFound(msg) => write!(f, "Not found: {}", msg),
            LibraryError::IoError(e) => write!(f, "IO error: {}", e),
            LibraryError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for LibraryError {}

impl From<rusqlite::Error> for LibraryError {
    fn from(err: rusqlite::Error) -> Self {
        LibraryError::DatabaseError(err)
    }
}

impl From<ThumbnailError> for LibraryError {
    fn from(err: ThumbnailError) -> Self {
        LibraryError::ThumbnailError(err)
    }
}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::IoError(err)
    }
}

/// Immutable snapshot of one album's contents under a filter.
///
/// Change reconciliation diffs a stored snapshot against a fresh fetch, so
/// the snapshot carries everything needed to rerun the same query.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetFetch {
    pub album: AlbumId,
    pub filter: MediaFilter,
    pub assets: Vec<Asset>,
}

impl AssetFetch {
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn index_of(&self, id: &Uuid) -> Option<usize> {
        self.assets.iter().position(|a| &a.id == id)
    }
}

/// Index-level delta between two snapshots of the same album
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IncrementalChanges {
    /// Indices into the snapshot before the change
    pub removed: Vec<usize>,
    /// Indices into the snapshot after the change
    pub inserted: Vec<usize>,
    /// Indices into the snapshot before the change
    pub changed: Vec<usize>,
}

impl IncrementalChanges {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.inserted.is_empty() && self.changed.is_empty()
    }
}

/// Outcome of reconciling a stored snapshot with current library content
#[derive(Debug, Clone, PartialEq)]
pub struct AssetChangeDetails {
    pub after: AssetFetch,
    /// None when the delta cannot be expressed as deletions, insertions and
    /// reloads, e.g. when surviving assets were reordered
    pub incremental: Option<IncrementalChanges>,
}

/// Broadcast on the change feed whenever library content mutates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryChange {
    pub generation: u64,
}

/// Backend the picker components talk to.
///
/// Implementations must be shareable across threads; the rendering side
/// wraps thumbnail calls in `spawn_blocking`.
pub trait MediaLibrary: Send + Sync {
    /// Album snapshots as the backend enumerates them, one group per
    /// source. Counts and cover thumbnails already respect the filter.
    fn fetch_album_groups(&self, filter: &MediaFilter) -> LibraryResult<Vec<Vec<Album>>>;

    /// Assets of one album in display order, restricted by the filter
    fn fetch_assets(&self, album: &AlbumId, filter: &MediaFilter) -> LibraryResult<AssetFetch>;

    /// Reconciles a previously fetched snapshot against current content
    fn change_details(&self, before: &AssetFetch) -> LibraryResult<AssetChangeDetails>;

    /// Thumbnail bytes for one asset, rendered and cached on demand
    fn thumbnail(&self, asset: &Uuid, edge: u32) -> LibraryResult<Vec<u8>>;

    /// Advisory hint that thumbnails for these assets are needed soon.
    /// Implementations may ignore it; correctness never depends on it.
    fn start_caching(&self, assets: &[Uuid], edge: u32);

    /// Advisory hint that previously announced assets left the prefetch
    /// window
    fn stop_caching(&self, assets: &[Uuid], edge: u32);

    fn stop_all_caching(&self);

    /// Change feed; every mutation bumps the generation
    fn subscribe(&self) -> UnboundedReceiver<LibraryChange>;
}

/// Diffs two asset lists into deletions, insertions and reloads.
///
/// Indices for `removed` and `changed` refer to `before`, `inserted` to
/// `after`. Returns None when the surviving assets changed relative order,
/// which the grid can only honor with a full reload.
pub fn diff_snapshots(before: &[Asset], after: &[Asset]) -> Option<IncrementalChanges> {
    let before_ids: HashMap<Uuid, usize> =
        before.iter().enumerate().map(|(i, a)| (a.id, i)).collect();
    let after_ids: HashMap<Uuid, usize> =
        after.iter().enumerate().map(|(i, a)| (a.id, i)).collect();

    let survivors_before: Vec<Uuid> = before
        .iter()
        .filter(|a| after_ids.contains_key(&a.id))
        .map(|a| a.id)
        .collect();
    let survivors_after: Vec<Uuid> = after
        .iter()
        .filter(|a| before_ids.contains_key(&a.id))
        .map(|a| a.id)
        .collect();
    if survivors_before != survivors_after {
        return None;
    }

    let removed = before
        .iter()
        .enumerate()
        .filter(|(_, a)| !after_ids.contains_key(&a.id))
        .map(|(i, _)| i)
        .collect();
    let inserted = after
        .iter()
        .enumerate()
        .filter(|(_, a)| !before_ids.contains_key(&a.id))
        .map(|(i, _)| i)
        .collect();
    let mut changed = Vec::new();
    for (i, asset) in before.iter().enumerate() {
        if let Some(&j) = after_ids.get(&asset.id) {
            if &after[j] != asset {
                changed.push(i);
            }
        }
    }

    Some(IncrementalChanges {
        removed,
        inserted,
        changed,
    })
}
