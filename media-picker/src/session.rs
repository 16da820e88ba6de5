//! Picking session: the composition root
//!
//! One session serves one picking flow. It owns the selection, the album
//! list, the grid for the currently open album and the host delegate, all
//! on a single owning thread. Library change notifications cross over on
//! a channel and are folded in by [`MediaPickerSession::drain_changes`].

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::albums::AlbumListController;
use crate::grid::{AssetGridController, GridLayout, GridReload};
use crate::library::{LibraryChange, LibraryError, LibraryResult, MediaLibrary};
use crate::models::{Album, AlbumId, Asset, PickerOptions};
use crate::selection::{SelectionChange, SelectionSet};
use crate::viewport::Rect;

/// Host-side callbacks for picking outcomes.
///
/// Only [`PickerDelegate::did_finish_picking`] is required; everything
/// else defaults to a no-op or to "no opinion".
pub trait PickerDelegate {
    /// The pick was confirmed. Fired at most once per session.
    fn did_finish_picking(&mut self, assets: Vec<Asset>);

    /// The picker was dismissed without a pick.
    fn did_cancel(&mut self) {}

    /// Veto hook for taps on unselected cells. `Some(false)` blocks the
    /// selection, `Some(true)` allows it even past the maximum gate,
    /// `None` leaves the decision to the selection policy.
    fn should_select_asset(&mut self, _asset: &Asset) -> Option<bool> {
        None
    }

    fn did_select_asset(&mut self, _asset: &Asset) {}

    fn did_deselect_asset(&mut self, _asset: &Asset) {}
}

/// What a tap on a grid cell did
#[derive(Debug, Clone, PartialEq)]
pub enum TapResult {
    /// Single-selection mode confirmed the pick; the session is over
    Finished,
    /// The asset joined the selection. `replaced` carries an auto-
    /// deselected predecessor whose cell highlight must be cleared.
    Selected { replaced: Option<Asset> },
    /// The asset left the selection
    Deselected,
    /// Blocked by the delegate or by the maximum gate
    Rejected,
    /// Tap on an empty cell, or after the session already ended
    Ignored,
}

/// UI work owed after draining change notifications
#[derive(Debug, Default, PartialEq)]
pub struct SessionRefresh {
    pub albums_changed: bool,
    pub grid: Option<GridReload>,
}

/// Composition root for one picking flow
pub struct MediaPickerSession {
    options: PickerOptions,
    library: Arc<dyn MediaLibrary>,
    selection: SelectionSet,
    albums: AlbumListController,
    grid: Option<AssetGridController>,
    delegate: Box<dyn PickerDelegate>,
    changes: UnboundedReceiver<LibraryChange>,
    finished: bool,
}

impl MediaPickerSession {
    /// Subscribes to the library change feed and seeds the selection from
    /// the options
    pub fn new(
        options: PickerOptions,
        library: Arc<dyn MediaLibrary>,
        delegate: Box<dyn PickerDelegate>,
    ) -> Self {
        let changes = library.subscribe();
        let selection =
            SelectionSet::with_assets(options.policy, options.initial_selection.clone());
        let albums = AlbumListController::new(&options);
        Self {
            options,
            library,
            selection,
            albums,
            grid: None,
            delegate,
            changes,
            finished: false,
        }
    }

    pub fn options(&self) -> &PickerOptions {
        &self.options
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    /// Whether the Done action may be offered right now
    pub fn commit_enabled(&self) -> bool {
        !self.finished && self.selection.is_minimum_fulfilled()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Initial population of the album list
    pub fn load_albums(&mut self) -> LibraryResult<()> {
        self.albums.refresh(self.library.as_ref())
    }

    pub fn albums(&self) -> &[Album] {
        self.albums.albums()
    }

    /// Fetches the album's assets and swaps in a grid controller for them
    pub fn open_album(&mut self, album: &AlbumId, layout: GridLayout) -> LibraryResult<()> {
        let fetch = self.library.fetch_assets(album, self.albums.filter())?;
        self.grid = Some(AssetGridController::new(fetch, layout));
        Ok(())
    }

    /// Drops the grid and withdraws all caching hints
    pub fn close_album(&mut self) {
        if self.grid.take().is_some() {
            self.library.stop_all_caching();
        }
    }

    pub fn grid(&self) -> Option<&AssetGridController> {
        self.grid.as_ref()
    }

    pub fn grid_mut(&mut self) -> Option<&mut AssetGridController> {
        self.grid.as_mut()
    }

    /// Forwards a scroll position to the preheat engine and turns the
    /// resulting bands into caching hints
    pub fn update_viewport(&mut self, visible: Rect) {
        let Some(grid) = self.grid.as_mut() else {
            return;
        };
        if let Some(update) = grid.update_viewport(visible) {
            if !update.start.is_empty() {
                self.library.start_caching(&update.start, update.edge);
            }
            if !update.stop.is_empty() {
                self.library.stop_caching(&update.stop, update.edge);
            }
        }
    }

    /// Handles a tap on the grid cell at `index`.
    ///
    /// Single-selection mode finishes immediately with the tapped asset.
    /// In multiple-selection mode a tap toggles membership, subject to the
    /// delegate veto and the maximum gate. Auto-deselect eviction is
    /// reported through [`TapResult::Selected`] but does not fire
    /// `did_deselect_asset`: it is not a user gesture.
    pub fn toggle_at(&mut self, index: usize) -> TapResult {
        if self.finished {
            return TapResult::Ignored;
        }
        let Some(asset) = self
            .grid
            .as_ref()
            .and_then(|grid| grid.asset_at(index))
            .cloned()
        else {
            return TapResult::Ignored;
        };

        if !self.options.policy.allows_multiple {
            if self.delegate.should_select_asset(&asset) == Some(false) {
                return TapResult::Rejected;
            }
            self.finished = true;
            self.delegate.did_finish_picking(vec![asset]);
            return TapResult::Finished;
        }

        if self.selection.contains(&asset.id) {
            return match self.selection.remove(&asset.id) {
                Some(removed) => {
                    self.delegate.did_deselect_asset(&removed);
                    TapResult::Deselected
                }
                None => TapResult::Ignored,
            };
        }

        let change = match self.delegate.should_select_asset(&asset) {
            Some(false) => return TapResult::Rejected,
            Some(true) => self.selection.add_overriding_limit(asset.clone()),
            None => self.selection.add(asset.clone()),
        };
        match change {
            SelectionChange::Added => {
                self.delegate.did_select_asset(&asset);
                TapResult::Selected { replaced: None }
            }
            SelectionChange::Replaced(old) => {
                self.delegate.did_select_asset(&asset);
                TapResult::Selected {
                    replaced: Some(old),
                }
            }
            SelectionChange::Unchanged => TapResult::Rejected,
        }
    }

    /// Delivers the selection to the delegate, in pick order. Returns
    /// false when the minimum is not fulfilled yet or the session already
    /// ended.
    pub fn finish(&mut self) -> bool {
        if self.finished || !self.selection.is_minimum_fulfilled() {
            return false;
        }
        self.finished = true;
        self.delegate
            .did_finish_picking(self.selection.assets().to_vec());
        true
    }

    /// Tells the delegate the picker was dismissed. Later calls are
    /// ignored, as is cancelling after a finished pick.
    pub fn cancel(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.delegate.did_cancel();
    }

    /// Drains queued change notifications and reconciles the album list
    /// and the open grid against current library content. Returns what the
    /// UI must redraw. Call on the owning thread.
    pub fn drain_changes(&mut self) -> LibraryResult<SessionRefresh> {
        let mut pending = false;
        while self.changes.try_recv().is_ok() {
            pending = true;
        }
        if !pending {
            return Ok(SessionRefresh::default());
        }

        let albums_changed = self.albums.handle_change(self.library.as_ref())?;

        let mut grid_reload = None;
        let mut drop_grid = false;
        if let Some(grid) = self.grid.as_mut() {
            match self.library.change_details(grid.fetch()) {
                Ok(details) => {
                    let reload = grid.apply_change(details);
                    if reload != GridReload::Unchanged {
                        // The preheat window was reset, pending hints are stale
                        self.library.stop_all_caching();
                        grid_reload = Some(reload);
                    }
                }
                Err(LibraryError::NotFound(_)) => {
                    log::warn!("Open album disappeared from the library, closing the grid");
                    drop_grid = true;
                    grid_reload = Some(GridReload::Full);
                }
                Err(err) => return Err(err),
            }
        }
        if drop_grid {
            self.grid = None;
            self.library.stop_all_caching();
        }

        Ok(SessionRefresh {
            albums_changed,
            grid: grid_reload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    use crate::catalog::CatalogLibrary;
    use crate::models::{SelectionPolicy, SmartAlbumKind};

    #[derive(Default)]
    struct RecorderState {
        finished: Vec<Vec<Asset>>,
        cancelled: usize,
        selected: Vec<Uuid>,
        deselected: Vec<Uuid>,
        veto: Option<bool>,
    }

    /// Delegate that records every callback; cloned handles share state so
    /// the test can inspect what the session reported
    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<RecorderState>>);

    impl Recorder {
        fn state(&self) -> std::sync::MutexGuard<'_, RecorderState> {
            self.0.lock().unwrap()
        }
    }

    impl PickerDelegate for Recorder {
        fn did_finish_picking(&mut self, assets: Vec<Asset>) {
            self.state().finished.push(assets);
        }

        fn did_cancel(&mut self) {
            self.state().cancelled += 1;
        }

        fn should_select_asset(&mut self, _asset: &Asset) -> Option<bool> {
            self.state().veto
        }

        fn did_select_asset(&mut self, asset: &Asset) {
            self.state().selected.push(asset.id);
        }

        fn did_deselect_asset(&mut self, asset: &Asset) {
            self.state().deselected.push(asset.id);
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn library_with(count: usize) -> (Arc<CatalogLibrary>, Vec<Asset>) {
        let dir = std::env::temp_dir().join(format!("picker-session-{}", Uuid::new_v4()));
        let lib = CatalogLibrary::open_in_memory(dir).unwrap();
        let mut assets = Vec::new();
        for i in 0..count {
            let asset = Asset::image(format!("{}.jpg", i), at(1, 1 + i as u32));
            lib.insert_asset(None, &asset).unwrap();
            assets.push(asset);
        }
        (Arc::new(lib), assets)
    }

    fn policy(minimum: usize, maximum: usize, allows_multiple: bool) -> PickerOptions {
        PickerOptions {
            policy: SelectionPolicy {
                minimum,
                maximum,
                allows_multiple,
            },
            ..PickerOptions::default()
        }
    }

    fn open_session(
        library: Arc<CatalogLibrary>,
        options: PickerOptions,
        recorder: Recorder,
    ) -> MediaPickerSession {
        let mut session = MediaPickerSession::new(options, library, Box::new(recorder));
        session.load_albums().unwrap();
        session
            .open_album(
                &AlbumId::Smart(SmartAlbumKind::UserLibrary),
                GridLayout::new(406.0, 4),
            )
            .unwrap();
        session
    }

    #[test]
    fn test_single_select_finishes_on_first_tap() {
        let (lib, assets) = library_with(3);
        let recorder = Recorder::default();
        let mut session = open_session(lib, policy(1, 0, false), recorder.clone());

        assert_eq!(session.toggle_at(1), TapResult::Finished);
        assert!(session.is_finished());
        {
            let state = recorder.state();
            assert_eq!(state.finished.len(), 1);
            assert_eq!(state.finished[0], vec![assets[1].clone()]);
        }

        // The session is over, nothing reacts anymore
        assert_eq!(session.toggle_at(0), TapResult::Ignored);
        assert!(!session.finish());
        session.cancel();
        assert_eq!(recorder.state().cancelled, 0);
    }

    #[test]
    fn test_finish_respects_minimum_and_fires_once() {
        let (lib, assets) = library_with(3);
        let recorder = Recorder::default();
        let mut session = open_session(lib, policy(2, 0, true), recorder.clone());

        assert!(matches!(session.toggle_at(0), TapResult::Selected { .. }));
        assert!(!session.commit_enabled());
        assert!(!session.finish());

        assert!(matches!(session.toggle_at(1), TapResult::Selected { .. }));
        assert!(session.commit_enabled());
        assert!(session.finish());
        assert!(!session.finish());

        let state = recorder.state();
        assert_eq!(state.finished.len(), 1);
        // Delivered in pick order
        assert_eq!(
            state.finished[0],
            vec![assets[0].clone(), assets[1].clone()]
        );
    }

    #[test]
    fn test_cancel_notifies_once() {
        let (lib, _) = library_with(1);
        let recorder = Recorder::default();
        let mut session = open_session(lib, policy(1, 0, true), recorder.clone());

        session.cancel();
        session.cancel();
        assert_eq!(recorder.state().cancelled, 1);
        assert_eq!(session.toggle_at(0), TapResult::Ignored);
    }

    #[test]
    fn test_veto_blocks_and_override_exceeds_gate() {
        let (lib, _) = library_with(4);
        let recorder = Recorder::default();
        let mut session = open_session(lib, policy(1, 2, true), recorder.clone());

        recorder.state().veto = Some(false);
        assert_eq!(session.toggle_at(0), TapResult::Rejected);
        assert_eq!(session.selected_count(), 0);
        assert!(recorder.state().selected.is_empty());

        recorder.state().veto = None;
        assert!(matches!(session.toggle_at(0), TapResult::Selected { .. }));
        assert!(matches!(session.toggle_at(1), TapResult::Selected { .. }));
        // Maximum reached, policy rejects the third pick
        assert_eq!(session.toggle_at(2), TapResult::Rejected);

        recorder.state().veto = Some(true);
        assert!(matches!(session.toggle_at(2), TapResult::Selected { .. }));
        assert_eq!(session.selected_count(), 3);
    }

    #[test]
    fn test_auto_deselect_reports_replacement_without_callback() {
        let (lib, assets) = library_with(2);
        let recorder = Recorder::default();
        let mut session = open_session(lib, policy(1, 1, true), recorder.clone());

        assert_eq!(
            session.toggle_at(0),
            TapResult::Selected { replaced: None }
        );
        assert_eq!(
            session.toggle_at(1),
            TapResult::Selected {
                replaced: Some(assets[0].clone())
            }
        );
        assert_eq!(session.selected_count(), 1);

        let state = recorder.state();
        assert_eq!(state.selected, vec![assets[0].id, assets[1].id]);
        // Eviction is not a user gesture
        assert!(state.deselected.is_empty());
    }

    #[test]
    fn test_toggle_deselects_in_multiple_mode() {
        let (lib, assets) = library_with(2);
        let recorder = Recorder::default();
        let mut session = open_session(lib, policy(1, 0, true), recorder.clone());

        assert!(matches!(session.toggle_at(0), TapResult::Selected { .. }));
        assert_eq!(session.toggle_at(0), TapResult::Deselected);
        assert_eq!(session.selected_count(), 0);
        assert_eq!(recorder.state().deselected, vec![assets[0].id]);
    }

    #[test]
    fn test_preseeded_selection_counts_toward_commit() {
        let (lib, assets) = library_with(3);
        let recorder = Recorder::default();
        let mut options = policy(2, 0, true);
        options.initial_selection = vec![
            assets[0].clone(),
            assets[0].clone(),
            assets[2].clone(),
        ];
        let mut session = open_session(lib, options, recorder.clone());

        // The duplicate seed entry was dropped
        assert_eq!(session.selected_count(), 2);
        assert!(session.commit_enabled());
        assert!(session.finish());
        assert_eq!(
            recorder.state().finished[0],
            vec![assets[0].clone(), assets[2].clone()]
        );
    }

    #[test]
    fn test_drain_changes_reconciles_albums_and_grid() {
        let (lib, _) = library_with(2);
        let recorder = Recorder::default();
        let mut session = open_session(lib.clone(), policy(1, 0, true), recorder);

        // Nothing queued yet
        assert_eq!(session.drain_changes().unwrap(), SessionRefresh::default());

        lib.insert_asset(None, &Asset::image("late.jpg", at(2, 1)))
            .unwrap();
        let refresh = session.drain_changes().unwrap();
        assert!(refresh.albums_changed);
        match refresh.grid {
            Some(GridReload::Incremental(changes)) => {
                assert_eq!(changes.inserted, vec![2]);
                assert!(changes.removed.is_empty());
            }
            other => panic!("expected incremental reload, got {:?}", other),
        }
        assert_eq!(session.grid().map(|grid| grid.len()), Some(3));

        // Coalesced, so a second drain owes nothing
        assert_eq!(session.drain_changes().unwrap(), SessionRefresh::default());
    }

    #[test]
    fn test_vanished_album_closes_grid() {
        let (lib, _) = library_with(1);
        let album = lib.create_album("Trip").unwrap();
        lib.insert_asset(Some(&album), &Asset::image("trip.jpg", at(3, 1)))
            .unwrap();

        let recorder = Recorder::default();
        let mut session =
            MediaPickerSession::new(policy(1, 0, true), lib.clone(), Box::new(recorder));
        session.load_albums().unwrap();
        session
            .open_album(&AlbumId::User(album), GridLayout::new(406.0, 4))
            .unwrap();
        assert_eq!(session.grid().map(|grid| grid.len()), Some(1));

        lib.remove_album(&album).unwrap();
        let refresh = session.drain_changes().unwrap();
        assert!(refresh.albums_changed);
        assert_eq!(refresh.grid, Some(GridReload::Full));
        assert!(session.grid().is_none());
    }
}
