//! SQLite-backed media catalog
//!
//! Implements [`MediaLibrary`] over a single SQLite database plus a WebP
//! thumbnail cache directory. Every mutation bumps a generation counter and
//! fans out on the change feed. [`CatalogLibrary::import_directory`] builds
//! a catalog from a folder tree: loose files land in the library, each
//! subdirectory becomes a user album.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use crate::library::{
    diff_snapshots, AssetChangeDetails, AssetFetch, LibraryChange, LibraryError, LibraryResult,
    MediaLibrary,
};
use crate::models::{Album, AlbumId, Asset, MediaFilter, MediaKind, SmartAlbumKind};
use crate::schema::init_catalog_schema;
use crate::thumbnail;

/// Columns every asset query selects, in `TryFrom<&Row>` order
const ASSET_COLUMNS: &str =
    "uuid, kind, path, duration, created_at, width, height, favorite, slomo, burst_id";

/// How many days back an asset counts as recently added
const RECENT_DAYS: i64 = 30;

/// Trailing asset ids carried on an album snapshot for its cover
const COVER_THUMBNAILS: usize = 3;

/// Counts from one [`CatalogLibrary::import_directory`] run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub albums: usize,
    pub assets: usize,
    pub skipped: usize,
}

/// Media library stored in SQLite
pub struct CatalogLibrary {
    conn: Mutex<Connection>,
    thumbnail_dir: PathBuf,
    generation: AtomicU64,
    subscribers: Mutex<Vec<UnboundedSender<LibraryChange>>>,
    wanted: Arc<Mutex<HashSet<(Uuid, u32)>>>,
}

impl CatalogLibrary {
    /// Opens or creates a catalog database at the given path
    pub fn open(db_path: &Path, thumbnail_dir: PathBuf) -> LibraryResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        init_catalog_schema(&conn)?;
        Ok(Self::with_connection(conn, thumbnail_dir))
    }

    /// In-memory catalog, mainly for tests and demos
    pub fn open_in_memory(thumbnail_dir: PathBuf) -> LibraryResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_catalog_schema(&conn)?;
        Ok(Self::with_connection(conn, thumbnail_dir))
    }

    fn with_connection(conn: Connection, thumbnail_dir: PathBuf) -> Self {
        Self {
            conn: Mutex::new(conn),
            thumbnail_dir,
            generation: AtomicU64::new(0),
            subscribers: Mutex::new(Vec::new()),
            wanted: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    fn lock_conn(&self) -> LibraryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| LibraryError::Other("Catalog connection lock poisoned".to_string()))
    }

    /// Current change generation; starts at 0 for a fresh catalog
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    fn notify(&self) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let change = LibraryChange { generation };
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|tx| tx.send(change).is_ok());
        }
    }

    /// Creates an empty user album appended after the existing ones
    pub fn create_album(&self, title: &str) -> LibraryResult<Uuid> {
        let id = {
            let conn = self.lock_conn()?;
            create_album_in(&conn, title)?
        };
        self.notify();
        Ok(id)
    }

    /// Inserts one asset, optionally into a user album
    pub fn insert_asset(&self, album: Option<&Uuid>, asset: &Asset) -> LibraryResult<()> {
        {
            let conn = self.lock_conn()?;
            insert_asset_in(&conn, album, asset)?;
        }
        self.notify();
        Ok(())
    }

    /// Deletes a user album; its assets stay in the library unassigned
    pub fn remove_album(&self, album: &Uuid) -> LibraryResult<()> {
        {
            let conn = self.lock_conn()?;
            let rows = conn.execute(
                "DELETE FROM albums WHERE uuid = ?1",
                params![album.to_string()],
            )?;
            if rows == 0 {
                return Err(LibraryError::NotFound(format!("Album {} not found", album)));
            }
        }
        self.notify();
        Ok(())
    }

    /// Removes one asset from the catalog
    pub fn remove_asset(&self, asset: &Uuid) -> LibraryResult<()> {
        {
            let conn = self.lock_conn()?;
            let rows = conn.execute(
                "DELETE FROM assets WHERE uuid = ?1",
                params![asset.to_string()],
            )?;
            if rows == 0 {
                return Err(LibraryError::NotFound(format!("Asset {} not found", asset)));
            }
        }
        self.notify();
        Ok(())
    }

    /// Toggles the favorite flag of one asset
    pub fn set_favorite(&self, asset: &Uuid, favorite: bool) -> LibraryResult<()> {
        {
            let conn = self.lock_conn()?;
            let rows = conn.execute(
                "UPDATE assets SET favorite = ?1 WHERE uuid = ?2",
                params![favorite, asset.to_string()],
            )?;
            if rows == 0 {
                return Err(LibraryError::NotFound(format!("Asset {} not found", asset)));
            }
        }
        self.notify();
        Ok(())
    }

    /// Scans a directory into the catalog.
    ///
    /// Loose files join the library only; each first-level subdirectory
    /// becomes a user album holding its files. Unreadable and unrecognized
    /// files are counted as skipped, never fatal.
    pub fn import_directory(&self, root: &Path) -> LibraryResult<ImportSummary> {
        let mut summary = ImportSummary::default();
        let mut entries: Vec<PathBuf> = std::fs::read_dir(root)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        entries.sort();

        {
            let conn = self.lock_conn()?;
            for path in &entries {
                if path.is_dir() {
                    let title = path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("Album")
                        .to_string();
                    let album_id = create_album_in(&conn, &title)?;
                    summary.albums += 1;

                    let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
                        .filter_map(|entry| entry.ok().map(|e| e.path()))
                        .filter(|p| p.is_file())
                        .collect();
                    files.sort();
                    for file in files {
                        import_file(&conn, &file, Some(&album_id), &mut summary);
                    }
                } else {
                    import_file(&conn, path, None, &mut summary);
                }
            }
        }
        self.notify();

        log::debug!(
            "Imported {:?}: {} albums, {} assets, {} skipped",
            root,
            summary.albums,
            summary.assets,
            summary.skipped
        );
        Ok(summary)
    }

    fn asset_paths(&self, assets: &[Uuid]) -> LibraryResult<Vec<(Uuid, String)>> {
        let conn = self.lock_conn()?;
        let mut out = Vec::with_capacity(assets.len());
        for id in assets {
            let path: Option<String> = conn
                .query_row(
                    "SELECT path FROM assets WHERE uuid = ?1",
                    params![id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(path) = path {
                out.push((*id, path));
            }
        }
        Ok(out)
    }
}

impl MediaLibrary for CatalogLibrary {
    fn fetch_album_groups(&self, filter: &MediaFilter) -> LibraryResult<Vec<Vec<Album>>> {
        let conn = self.lock_conn()?;

        let mut smart_group = Vec::new();
        for kind in SmartAlbumKind::ALL {
            let assets = filtered(smart_album_assets(&conn, kind)?, filter);
            smart_group.push(album_snapshot(
                AlbumId::Smart(kind),
                kind.title().to_string(),
                &assets,
            ));
        }

        let mut user_group = Vec::new();
        let mut stmt =
            conn.prepare("SELECT uuid, title FROM albums ORDER BY position, created_at")?;
        let albums: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<_>>()?;
        for (uuid_str, title) in albums {
            let id = parse_uuid(&uuid_str)?;
            let assets = filtered(user_album_assets(&conn, &id)?, filter);
            user_group.push(album_snapshot(AlbumId::User(id), title, &assets));
        }

        Ok(vec![smart_group, user_group])
    }

    fn fetch_assets(&self, album: &AlbumId, filter: &MediaFilter) -> LibraryResult<AssetFetch> {
        let conn = self.lock_conn()?;
        let assets = match album {
            AlbumId::Smart(kind) => smart_album_assets(&conn, *kind)?,
            AlbumId::User(id) => {
                let title: Option<String> = conn
                    .query_row(
                        "SELECT title FROM albums WHERE uuid = ?1",
                        params![id.to_string()],
                        |row| row.get(0),
                    )
                    .optional()?;
                if title.is_none() {
                    return Err(LibraryError::NotFound(format!("Album {} not found", id)));
                }
                user_album_assets(&conn, id)?
            }
        };
        Ok(AssetFetch {
            album: album.clone(),
            filter: *filter,
            assets: filtered(assets, filter),
        })
    }

    fn change_details(&self, before: &AssetFetch) -> LibraryResult<AssetChangeDetails> {
        let after = self.fetch_assets(&before.album, &before.filter)?;
        let incremental = diff_snapshots(&before.assets, &after.assets);
        Ok(AssetChangeDetails { after, incremental })
    }

    fn thumbnail(&self, asset: &Uuid, edge: u32) -> LibraryResult<Vec<u8>> {
        let path: Option<String> = {
            let conn = self.lock_conn()?;
            conn.query_row(
                "SELECT path FROM assets WHERE uuid = ?1",
                params![asset.to_string()],
                |row| row.get(0),
            )
            .optional()?
        };
        // Render without holding the connection lock
        let path =
            path.ok_or_else(|| LibraryError::NotFound(format!("Asset {} not found", asset)))?;
        Ok(thumbnail::cached_thumbnail(
            &self.thumbnail_dir,
            asset,
            edge,
            &path,
        )?)
    }

    fn start_caching(&self, assets: &[Uuid], edge: u32) {
        if assets.is_empty() {
            return;
        }
        if let Ok(mut wanted) = self.wanted.lock() {
            for id in assets {
                wanted.insert((*id, edge));
            }
        }

        let targets = match self.asset_paths(assets) {
            Ok(targets) => targets,
            Err(e) => {
                log::debug!("Preheat lookup failed: {}", e);
                return;
            }
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let wanted = Arc::clone(&self.wanted);
                let dir = self.thumbnail_dir.clone();
                handle.spawn_blocking(move || {
                    for (id, path) in targets {
                        let keep = wanted
                            .lock()
                            .map(|w| w.contains(&(id, edge)))
                            .unwrap_or(false);
                        if !keep {
                            continue;
                        }
                        if let Err(e) = thumbnail::cached_thumbnail(&dir, &id, edge, &path) {
                            log::debug!("Preheat skipped {}: {}", id, e);
                        }
                    }
                });
            }
            Err(_) => {
                log::debug!("No async runtime, preheat request recorded only");
            }
        }
    }

    fn stop_caching(&self, assets: &[Uuid], edge: u32) {
        if let Ok(mut wanted) = self.wanted.lock() {
            for id in assets {
                wanted.remove(&(*id, edge));
            }
        }
    }

    fn stop_all_caching(&self) {
        if let Ok(mut wanted) = self.wanted.lock() {
            wanted.clear();
        }
    }

    fn subscribe(&self) -> UnboundedReceiver<LibraryChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }
}

fn parse_uuid(s: &str) -> LibraryResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| LibraryError::Other(format!("Malformed uuid {}: {}", s, e)))
}

fn filtered(assets: Vec<Asset>, filter: &MediaFilter) -> Vec<Asset> {
    assets.into_iter().filter(|a| filter.matches(a)).collect()
}

fn album_snapshot(id: AlbumId, title: String, assets: &[Asset]) -> Album {
    let recent_thumbnails: Vec<Uuid> = assets
        .iter()
        .rev()
        .take(COVER_THUMBNAILS)
        .map(|a| a.id)
        .collect();
    Album {
        id,
        title,
        count: assets.len(),
        recent_thumbnails,
    }
}

fn smart_where(kind: SmartAlbumKind) -> &'static str {
    match kind {
        SmartAlbumKind::UserLibrary => "",
        SmartAlbumKind::Favorites => "WHERE favorite = 1",
        SmartAlbumKind::RecentlyAdded => "WHERE created_at >= ?1",
        SmartAlbumKind::Panoramas => "WHERE height > 0 AND width >= 2 * height",
        SmartAlbumKind::Videos => "WHERE kind = 'video'",
        SmartAlbumKind::SlomoVideos => "WHERE slomo = 1",
        SmartAlbumKind::Bursts => "WHERE burst_id IS NOT NULL",
    }
}

fn smart_album_assets(conn: &Connection, kind: SmartAlbumKind) -> rusqlite::Result<Vec<Asset>> {
    if kind == SmartAlbumKind::Bursts {
        // One representative per burst, the earliest shot. SQLite resolves
        // the bare columns from the row that carries MIN(created_at).
        let sql = "SELECT uuid, kind, path, duration, MIN(created_at) AS created_at,
                          width, height, favorite, slomo, burst_id
                   FROM assets WHERE burst_id IS NOT NULL
                   GROUP BY burst_id ORDER BY created_at, uuid";
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| Asset::try_from(row))?;
        return rows.collect();
    }

    let sql = format!(
        "SELECT {} FROM assets {} ORDER BY created_at, uuid",
        ASSET_COLUMNS,
        smart_where(kind)
    );
    let mut stmt = conn.prepare(&sql)?;
    if kind == SmartAlbumKind::RecentlyAdded {
        let cutoff = Utc::now() - Duration::days(RECENT_DAYS);
        let rows = stmt.query_map(params![cutoff], |row| Asset::try_from(row))?;
        rows.collect()
    } else {
        let rows = stmt.query_map([], |row| Asset::try_from(row))?;
        rows.collect()
    }
}

fn user_album_assets(conn: &Connection, album: &Uuid) -> rusqlite::Result<Vec<Asset>> {
    let sql = format!(
        "SELECT {} FROM assets WHERE album_id = ?1 ORDER BY created_at, uuid",
        ASSET_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![album.to_string()], |row| Asset::try_from(row))?;
    rows.collect()
}

fn create_album_in(conn: &Connection, title: &str) -> LibraryResult<Uuid> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO albums (uuid, title, position)
         VALUES (?1, ?2, (SELECT COALESCE(MAX(position), 0) + 1 FROM albums))",
        params![id.to_string(), title],
    )?;
    Ok(id)
}

fn insert_asset_in(conn: &Connection, album: Option<&Uuid>, asset: &Asset) -> LibraryResult<()> {
    conn.execute(
        "INSERT INTO assets (uuid, album_id, kind, path, duration, created_at,
                             width, height, favorite, slomo, burst_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            asset.id.to_string(),
            album.map(|a| a.to_string()),
            asset.kind.as_str(),
            asset.file_path,
            asset.duration,
            asset.created_at,
            asset.width,
            asset.height,
            asset.favorite,
            asset.slomo,
            asset.burst_id,
        ],
    )?;
    Ok(())
}

/// Classifies and inserts one file; failures count as skipped
fn import_file(conn: &Connection, path: &Path, album: Option<&Uuid>, summary: &mut ImportSummary) {
    let kind = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") | Some("png") | Some("webp") => MediaKind::Image,
        Some("mp4") | Some("mov") | Some("m4v") => MediaKind::Video,
        _ => {
            summary.skipped += 1;
            return;
        }
    };

    let created_at = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());
    let file_path = path.to_string_lossy().to_string();

    let mut asset = match kind {
        MediaKind::Image => Asset::image(file_path, created_at),
        // Duration stays 0 for imports; containers are not parsed
        MediaKind::Video => Asset::video(file_path, created_at, 0.0),
    };

    if kind == MediaKind::Image {
        match image::image_dimensions(path) {
            Ok((w, h)) => {
                asset.width = w;
                asset.height = h;
                asset.panorama = h > 0 && w >= 2 * h;
            }
            Err(e) => log::debug!("No dimensions for {:?}: {}", path, e),
        }
    }

    match insert_asset_in(conn, album, &asset) {
        Ok(()) => summary.assets += 1,
        Err(e) => {
            log::warn!("Import skipped {:?}: {}", path, e);
            summary.skipped += 1;
        }
    }
}
