// Scripted picking run for builds without a renderer feature.
//
// Boots the library, opens the main album, walks the viewport so the
// preheat engine issues caching hints, picks a few assets and hands them
// to the export sink. Everything of interest lands in the log.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use media_picker::{
    AlbumId, GridLayout, MediaLibrary, MediaPickerSession, Rect, SmartAlbumKind, TapResult,
};

use crate::config::{AppConfig, CONFIG_FILE};
use crate::error::AppError;
use crate::services::{open_library, ExportSink};

/// Logical grid metrics for the scripted run
const GRID_WIDTH: f64 = 406.0;
const VIEWPORT_HEIGHT: f64 = 560.0;

pub fn run() -> Result<(), AppError> {
    let config = AppConfig::load(Path::new(CONFIG_FILE));
    let boot = open_library(&config)?;
    let library: Arc<dyn MediaLibrary> = boot.library;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(drive(config, library))
}

async fn drive(config: AppConfig, library: Arc<dyn MediaLibrary>) -> Result<(), AppError> {
    let options = config.picker_options();
    let columns = options.columns_portrait;
    let sink = ExportSink::new(config.export_dir.clone(), config.export_quality);
    let mut session = MediaPickerSession::new(options, library, Box::new(sink.clone()));

    session.load_albums()?;
    if session.albums().is_empty() {
        log::warn!(
            "No albums to pick from, put media under {:?}",
            config.media_dir
        );
        session.cancel();
        return Ok(());
    }
    for album in session.albums() {
        log::info!("Album {:?}: {} items", album.title, album.count);
    }

    session.open_album(
        &AlbumId::Smart(SmartAlbumKind::UserLibrary),
        GridLayout::new(GRID_WIDTH, columns),
    )?;
    let total = session.grid().map(|grid| grid.len()).unwrap_or(0);
    log::info!(
        "Opened {:?} with {} assets",
        SmartAlbumKind::UserLibrary.title(),
        total
    );

    // Scroll down a few pages so the preheat window moves and the
    // thumbnail warmers get something to do
    for page in 0..3u32 {
        session.update_viewport(Rect::new(
            0.0,
            f64::from(page) * VIEWPORT_HEIGHT,
            GRID_WIDTH,
            VIEWPORT_HEIGHT,
        ));
        tokio::time::sleep(Duration::from_millis(150)).await;
    }

    if session.options().policy.allows_multiple {
        let policy = session.options().policy;
        let want = if policy.maximum > 0 {
            policy.maximum.min(total)
        } else {
            total.min(3)
        };
        for index in 0..want {
            match session.toggle_at(index) {
                TapResult::Selected { replaced: Some(old) } => {
                    log::debug!("Selected cell {}, auto-deselected {}", index, old.id);
                }
                result => log::debug!("Tap on cell {} -> {:?}", index, result),
            }
        }
        if !session.finish() {
            log::warn!(
                "Selection below the minimum of {}, cancelling",
                policy.minimum
            );
            session.cancel();
        }
    } else if session.toggle_at(0) != TapResult::Finished {
        session.cancel();
    }

    let state = sink.snapshot();
    if state.cancelled {
        log::info!("Run ended without a pick");
    } else {
        log::info!(
            "Exported {} files ({} failures) to {:?}",
            state.report.files.len(),
            state.report.failures.len(),
            config.export_dir
        );
        for (id, reason) in &state.report.failures {
            log::warn!("Export failure {}: {}", id, reason);
        }
    }
    Ok(())
}
