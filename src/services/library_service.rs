// Library boot: opens the catalog and seeds it on first run

use std::sync::Arc;

use media_picker::{
    AlbumId, AssetChangeDetails, AssetFetch, CatalogLibrary, ImportSummary, LibraryChange,
    LibraryError, LibraryResult, MediaFilter, MediaLibrary, SmartAlbumKind,
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::AppError;

/// Result of opening the library at startup
pub struct Bootstrap {
    pub library: Arc<CatalogLibrary>,
    /// Present when this start seeded an empty catalog from the media dir
    pub import: Option<ImportSummary>,
}

/// Opens the catalog database; an empty catalog is seeded from the
/// configured media directory, later starts reuse what is already there
pub fn open_library(config: &AppConfig) -> Result<Bootstrap, AppError> {
    let library = Arc::new(CatalogLibrary::open(
        &config.db_path(),
        config.thumbnail_dir(),
    )?);
    let import = if catalog_is_empty(library.as_ref())? && config.media_dir.is_dir() {
        let summary = library.import_directory(&config.media_dir)?;
        log::info!(
            "Seeded catalog from {:?}: {} assets, {} albums, {} skipped",
            config.media_dir,
            summary.assets,
            summary.albums,
            summary.skipped
        );
        Some(summary)
    } else {
        None
    };
    Ok(Bootstrap { library, import })
}

fn catalog_is_empty(library: &CatalogLibrary) -> LibraryResult<bool> {
    let all = library.fetch_assets(
        &AlbumId::Smart(SmartAlbumKind::UserLibrary),
        &MediaFilter::default(),
    )?;
    Ok(all.is_empty())
}

/// Boot result for the UI shell, always usable
#[allow(dead_code)]
pub struct UiBoot {
    pub library: Arc<dyn MediaLibrary>,
    pub import: Option<ImportSummary>,
    pub error: Option<AppError>,
}

/// Like [`open_library`], but a failed open degrades to a stub library
/// whose queries report the outage, so the screens still render
#[allow(dead_code)]
pub fn boot_ui(config: &AppConfig) -> UiBoot {
    match open_library(config) {
        Ok(boot) => UiBoot {
            library: boot.library,
            import: boot.import,
            error: None,
        },
        Err(error) => {
            log::error!("Library boot failed: {}", error);
            UiBoot {
                library: Arc::new(UnavailableLibrary),
                import: None,
                error: Some(error),
            }
        }
    }
}

/// Stand-in after a failed boot; every query fails politely
#[allow(dead_code)]
struct UnavailableLibrary;

#[allow(dead_code)]
fn unavailable() -> LibraryError {
    LibraryError::Other("Media library unavailable".to_string())
}

impl MediaLibrary for UnavailableLibrary {
    fn fetch_album_groups(&self, _filter: &MediaFilter) -> LibraryResult<Vec<Vec<media_picker::Album>>> {
        Err(unavailable())
    }

    fn fetch_assets(&self, _album: &AlbumId, _filter: &MediaFilter) -> LibraryResult<AssetFetch> {
        Err(unavailable())
    }

    fn change_details(&self, _before: &AssetFetch) -> LibraryResult<AssetChangeDetails> {
        Err(unavailable())
    }

    fn thumbnail(&self, _asset: &Uuid, _edge: u32) -> LibraryResult<Vec<u8>> {
        Err(unavailable())
    }

    fn start_caching(&self, _assets: &[Uuid], _edge: u32) {}

    fn stop_caching(&self, _assets: &[Uuid], _edge: u32) {}

    fn stop_all_caching(&self) {}

    fn subscribe(&self) -> UnboundedReceiver<LibraryChange> {
        // Sender dropped on purpose, the feed just stays empty
        let (_tx, rx) = unbounded_channel();
        rx
    }
}
