//! Asset grid state: layout math, prefetch hints and change application
//!
//! The controller owns one album snapshot and translates scroll geometry
//! into thumbnail caching hints via [`PreheatWindow`]. Selection and
//! delegate calls stay with the session; the grid only answers which asset
//! sits where.

use uuid::Uuid;

use crate::library::{AssetChangeDetails, AssetFetch, IncrementalChanges};
use crate::models::Asset;
use crate::viewport::{PreheatWindow, Rect};

/// Gap between grid cells in layout points
pub const GRID_SPACING: f64 = 2.0;

/// Column layout for a given grid width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub width: f64,
    pub columns: u32,
    pub spacing: f64,
}

impl GridLayout {
    pub fn new(width: f64, columns: u32) -> Self {
        Self {
            width,
            columns: columns.max(1),
            spacing: GRID_SPACING,
        }
    }

    /// Square cell edge: the width minus the gaps, split across columns
    pub fn cell_edge(&self) -> f64 {
        (self.width - self.spacing * (self.columns - 1) as f64) / self.columns as f64
    }

    /// Pixel edge for thumbnail requests at the given display scale
    pub fn thumbnail_edge(&self, scale: f64) -> u32 {
        (self.cell_edge() * scale).round().max(1.0) as u32
    }

    fn row_height(&self) -> f64 {
        self.cell_edge() + self.spacing
    }

    /// Total content height for a number of assets
    pub fn content_height(&self, count: usize) -> f64 {
        let rows = count.div_ceil(self.columns as usize);
        if rows == 0 {
            return 0.0;
        }
        rows as f64 * self.cell_edge() + (rows - 1) as f64 * self.spacing
    }

    /// Indices of the cells whose rows intersect the rect, clamped to count
    pub fn indices_in_rect(&self, rect: &Rect, count: usize) -> Vec<usize> {
        if count == 0 || rect.is_empty() || rect.max_y() <= 0.0 || self.cell_edge() <= 0.0 {
            return Vec::new();
        }
        let row_height = self.row_height();
        let first_row = (rect.min_y().max(0.0) / row_height).floor() as usize;
        let last_row = ((rect.max_y() - 1e-9).max(0.0) / row_height).floor() as usize;

        let start = first_row * self.columns as usize;
        let end = ((last_row + 1) * self.columns as usize).min(count);
        if start >= end {
            return Vec::new();
        }
        (start..end).collect()
    }
}

/// Thumbnail caching hints derived from one viewport update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheUpdate {
    pub start: Vec<Uuid>,
    pub stop: Vec<Uuid>,
    pub edge: u32,
}

/// How the grid screen should apply a library change
#[derive(Debug, Clone, PartialEq)]
pub enum GridReload {
    /// Snapshot identical, nothing to do
    Unchanged,
    /// Batch updates: deletions at old indices, then insertions at new
    /// indices, then reloads at old indices
    Incremental(IncrementalChanges),
    /// The delta cannot be expressed as batch updates
    Full,
}

/// Monotonic tag guarding async thumbnail loads against recycled cells.
///
/// A cell advances its tag when it is bound to a new index; a load result
/// arriving with an older tag belongs to a previous occupant and is
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct CellTag {
    current: u64,
}

impl CellTag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidates outstanding loads and returns the tag for the next one
    pub fn advance(&mut self) -> u64 {
        self.current += 1;
        self.current
    }

    pub fn is_current(&self, tag: u64) -> bool {
        self.current == tag
    }
}

/// Drives one album's asset grid
pub struct AssetGridController {
    fetch: AssetFetch,
    layout: GridLayout,
    preheat: PreheatWindow,
    thumbnail_scale: f64,
}

impl AssetGridController {
    pub fn new(fetch: AssetFetch, layout: GridLayout) -> Self {
        Self {
            fetch,
            layout,
            preheat: PreheatWindow::new(),
            thumbnail_scale: 1.0,
        }
    }

    /// Display scale used to convert cell points into thumbnail pixels
    pub fn set_thumbnail_scale(&mut self, scale: f64) {
        if scale > 0.0 {
            self.thumbnail_scale = scale;
        }
    }

    pub fn fetch(&self) -> &AssetFetch {
        &self.fetch
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.fetch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fetch.is_empty()
    }

    pub fn asset_at(&self, index: usize) -> Option<&Asset> {
        self.fetch.assets.get(index)
    }

    /// Pixel edge the grid currently requests thumbnails at
    pub fn thumbnail_edge(&self) -> u32 {
        self.layout.thumbnail_edge(self.thumbnail_scale)
    }

    /// Replaces the layout, e.g. after rotation. The preheat window resets
    /// because its geometry no longer lines up with the new rows.
    pub fn set_layout(&mut self, layout: GridLayout) {
        if layout != self.layout {
            self.layout = layout;
            self.preheat.reset();
        }
    }

    /// Feeds a scroll position; returns caching hints when the preheat
    /// window moved far enough
    pub fn update_viewport(&mut self, visible: Rect) -> Option<CacheUpdate> {
        let diff = self.preheat.update(visible)?;
        let start = self.assets_in_bands(&diff.added);
        let stop = self.assets_in_bands(&diff.removed);
        if start.is_empty() && stop.is_empty() {
            return None;
        }
        Some(CacheUpdate {
            start,
            stop,
            edge: self.thumbnail_edge(),
        })
    }

    /// Applies reconciled change details and resets the preheat window so
    /// stale geometry never maps onto the new snapshot
    pub fn apply_change(&mut self, details: AssetChangeDetails) -> GridReload {
        if details.after.assets == self.fetch.assets {
            return GridReload::Unchanged;
        }
        let reload = match details.incremental {
            Some(inc) => GridReload::Incremental(inc),
            None => GridReload::Full,
        };
        self.fetch = details.after;
        self.preheat.reset();
        reload
    }

    fn assets_in_bands(&self, bands: &[Rect]) -> Vec<Uuid> {
        let mut ids = Vec::new();
        for band in bands {
            for index in self.layout.indices_in_rect(band, self.fetch.len()) {
                if let Some(asset) = self.fetch.assets.get(index) {
                    ids.push(asset.id);
                }
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaFilter;
    use crate::models::AlbumId;
    use crate::models::SmartAlbumKind;
    use chrono::Utc;

    fn fetch_of(count: usize) -> AssetFetch {
        AssetFetch {
            album: AlbumId::Smart(SmartAlbumKind::UserLibrary),
            filter: MediaFilter::default(),
            assets: (0..count)
                .map(|i| Asset::image(format!("a{}.jpg", i), Utc::now()))
                .collect(),
        }
    }

    // Width 406 with 4 columns gives a clean 100pt cell and 102pt rows
    fn layout() -> GridLayout {
        GridLayout::new(406.0, 4)
    }

    #[test]
    fn test_cell_edge_splits_width_minus_gaps() {
        assert_eq!(layout().cell_edge(), 100.0);
        assert_eq!(layout().thumbnail_edge(2.0), 200);
        assert_eq!(GridLayout::new(375.0, 4).cell_edge(), 92.25);
    }

    #[test]
    fn test_content_height_counts_full_rows() {
        let layout = layout();
        assert_eq!(layout.content_height(0), 0.0);
        assert_eq!(layout.content_height(4), 100.0);
        // Three rows: 3 cells plus 2 gaps
        assert_eq!(layout.content_height(10), 304.0);
    }

    #[test]
    fn test_indices_in_rect_clamps_to_count() {
        let layout = layout();
        let first_row = layout.indices_in_rect(&Rect::new(0.0, 0.0, 406.0, 102.0), 10);
        assert_eq!(first_row, vec![0, 1, 2, 3]);

        let spanning = layout.indices_in_rect(&Rect::new(0.0, 100.0, 406.0, 110.0), 10);
        assert_eq!(spanning, (0..10).collect::<Vec<_>>());

        let above = layout.indices_in_rect(&Rect::new(0.0, -500.0, 406.0, 400.0), 10);
        assert!(above.is_empty());

        let below = layout.indices_in_rect(&Rect::new(0.0, 1000.0, 406.0, 100.0), 10);
        assert!(below.is_empty());
    }

    #[test]
    fn test_viewport_updates_emit_start_and_stop_ids() {
        let fetch = fetch_of(40);
        let ids: Vec<Uuid> = fetch.assets.iter().map(|a| a.id).collect();
        let mut grid = AssetGridController::new(fetch, layout());

        // First update: preheat covers [-204, 612), rows 0..=5
        let first = grid
            .update_viewport(Rect::new(0.0, 0.0, 406.0, 408.0))
            .unwrap();
        assert_eq!(first.start, ids[0..24].to_vec());
        assert!(first.stop.is_empty());
        assert_eq!(first.edge, 100);

        // Small scroll: inside the debounce margin
        assert!(grid
            .update_viewport(Rect::new(0.0, 80.0, 406.0, 408.0))
            .is_none());

        // Scroll down past the margin: new rows start, top rows stop
        let second = grid
            .update_viewport(Rect::new(0.0, 408.0, 406.0, 408.0))
            .unwrap();
        assert!(!second.start.is_empty());
        assert!(!second.stop.is_empty());
        assert!(second.start.iter().all(|id| !first.start[0..4].contains(id)));
    }

    #[test]
    fn test_apply_change_resets_preheat() {
        let fetch = fetch_of(8);
        let mut grid = AssetGridController::new(fetch.clone(), layout());
        grid.update_viewport(Rect::new(0.0, 0.0, 406.0, 204.0))
            .unwrap();

        let mut after = fetch.clone();
        after.assets.remove(0);
        let reload = grid.apply_change(AssetChangeDetails {
            after,
            incremental: Some(IncrementalChanges {
                removed: vec![0],
                inserted: Vec::new(),
                changed: Vec::new(),
            }),
        });
        assert!(matches!(reload, GridReload::Incremental(_)));
        assert_eq!(grid.len(), 7);

        // The forgotten window makes the same viewport a fresh full add
        let update = grid
            .update_viewport(Rect::new(0.0, 0.0, 406.0, 204.0))
            .unwrap();
        assert!(update.stop.is_empty());
        assert!(!update.start.is_empty());
    }

    #[test]
    fn test_apply_change_distinguishes_unchanged_and_full() {
        let fetch = fetch_of(4);
        let mut grid = AssetGridController::new(fetch.clone(), layout());

        let unchanged = grid.apply_change(AssetChangeDetails {
            after: fetch.clone(),
            incremental: Some(IncrementalChanges::default()),
        });
        assert_eq!(unchanged, GridReload::Unchanged);

        let mut reordered = fetch.clone();
        reordered.assets.swap(0, 3);
        let full = grid.apply_change(AssetChangeDetails {
            after: reordered,
            incremental: None,
        });
        assert_eq!(full, GridReload::Full);
    }

    #[test]
    fn test_rotation_resets_preheat_window() {
        let mut grid = AssetGridController::new(fetch_of(20), layout());
        grid.update_viewport(Rect::new(0.0, 0.0, 406.0, 204.0))
            .unwrap();

        grid.set_layout(GridLayout::new(736.0, 7));
        let update = grid
            .update_viewport(Rect::new(0.0, 0.0, 736.0, 204.0))
            .unwrap();
        assert!(update.stop.is_empty());
    }

    #[test]
    fn test_cell_tag_invalidates_previous_loads() {
        let mut tag = CellTag::new();
        let first = tag.advance();
        assert!(tag.is_current(first));

        let second = tag.advance();
        assert!(!tag.is_current(first));
        assert!(tag.is_current(second));
    }
}
