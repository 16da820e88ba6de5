//! Album list ordering and change handling
//!
//! The backend enumerates albums in storage order; the picker shows smart
//! albums first, in the configured priority, followed by user albums in
//! enumeration order. Smart kinds missing from the priority list are not
//! shown at all.

use std::collections::HashMap;

use crate::library::{LibraryResult, MediaLibrary};
use crate::models::{Album, AlbumId, MediaFilter, PickerOptions, SmartAlbumKind};

/// Ordered album list derived from raw backend enumeration groups
#[derive(Debug, Clone, Default)]
pub struct AlbumIndex {
    priority: Vec<SmartAlbumKind>,
    groups: Vec<Vec<Album>>,
    entries: Vec<Album>,
}

impl AlbumIndex {
    pub fn new(priority: Vec<SmartAlbumKind>) -> Self {
        Self {
            priority,
            groups: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Partitions the raw groups and rebuilds the display order.
    ///
    /// A smart kind may carry several albums; they stay adjacent in
    /// enumeration order at the kind's priority slot.
    pub fn rebuild(&mut self, groups: Vec<Vec<Album>>) {
        let mut smart: HashMap<SmartAlbumKind, Vec<Album>> = HashMap::new();
        let mut user = Vec::new();

        for album in groups.iter().flatten() {
            match &album.id {
                AlbumId::User(_) => user.push(album.clone()),
                AlbumId::Smart(kind) => {
                    if self.priority.contains(kind) {
                        smart.entry(*kind).or_default().push(album.clone());
                    }
                }
            }
        }

        let mut entries = Vec::new();
        for kind in &self.priority {
            if let Some(albums) = smart.remove(kind) {
                entries.extend(albums);
            }
        }
        entries.extend(user);

        self.entries = entries;
        self.groups = groups;
    }

    /// Rebuilds only when the fetched groups differ from the stored
    /// snapshot. Returns whether anything changed.
    pub fn apply(&mut self, groups: Vec<Vec<Album>>) -> bool {
        if self.groups == groups {
            return false;
        }
        self.rebuild(groups);
        true
    }

    pub fn entries(&self) -> &[Album] {
        &self.entries
    }
}

/// Drives the album screen: initial load plus change-feed refreshes
pub struct AlbumListController {
    filter: MediaFilter,
    index: AlbumIndex,
}

impl AlbumListController {
    pub fn new(options: &PickerOptions) -> Self {
        Self {
            filter: options.filter,
            index: AlbumIndex::new(options.smart_album_priority.clone()),
        }
    }

    /// Initial population of the album list
    pub fn refresh(&mut self, library: &dyn MediaLibrary) -> LibraryResult<()> {
        let groups = library.fetch_album_groups(&self.filter)?;
        self.index.rebuild(groups);
        Ok(())
    }

    /// Re-fetches after a change notification. Returns true when the list
    /// was rebuilt and the screen needs a reload.
    pub fn handle_change(&mut self, library: &dyn MediaLibrary) -> LibraryResult<bool> {
        let groups = library.fetch_album_groups(&self.filter)?;
        Ok(self.index.apply(groups))
    }

    pub fn albums(&self) -> &[Album] {
        self.index.entries()
    }

    pub fn filter(&self) -> &MediaFilter {
        &self.filter
    }
}
