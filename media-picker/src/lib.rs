//! # Media Picker
//!
//! A reusable photo and video picker library with album browsing, grid
//! selection and EXIF-preserving export.
//!
//! This crate provides the cross-platform picking flow, including:
//! - Album list with smart albums ordered by a configurable priority
//! - Asset grid with bounded multi-selection and auto-deselect
//! - Viewport-driven thumbnail preheating (WebP, disk-cached)
//! - Incremental reconciliation of library changes
//! - A SQLite-backed media catalog as the built-in library backend
//!
//! ## Platform Separation
//!
//! This crate focuses on picking logic behind the [`MediaLibrary`] trait.
//! Rendering and platform media access (e.g. Android content resolvers)
//! belong in the application crate; the optional `components` feature adds
//! Dioxus building blocks on top.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use media_picker::{
//!     Asset, CatalogLibrary, MediaPickerSession, PickerDelegate, PickerOptions,
//! };
//!
//! struct PrintSink;
//!
//! impl PickerDelegate for PrintSink {
//!     fn did_finish_picking(&mut self, assets: Vec<Asset>) {
//!         println!("picked {} assets", assets.len());
//!     }
//! }
//!
//! let library = Arc::new(CatalogLibrary::open(db_path, thumb_dir)?);
//! let mut session =
//!     MediaPickerSession::new(PickerOptions::default(), library, Box::new(PrintSink));
//! session.load_albums()?;
//! ```

pub mod albums;
pub mod catalog;
pub mod export;
pub mod grid;
pub mod library;
pub mod models;
pub mod schema;
pub mod selection;
pub mod session;
pub mod thumbnail;
pub mod viewport;

#[cfg(feature = "components")]
pub mod components;

pub use albums::{AlbumIndex, AlbumListController};
pub use catalog::{CatalogLibrary, ImportSummary};
pub use export::{
    apply_orientation, export_asset, export_jpeg, read_orientation, ExportError, ExportResult,
    DEFAULT_EXPORT_QUALITY,
};
pub use grid::{AssetGridController, CacheUpdate, CellTag, GridLayout, GridReload, GRID_SPACING};
pub use library::{
    diff_snapshots, AssetChangeDetails, AssetFetch, IncrementalChanges, LibraryChange,
    LibraryError, LibraryResult, MediaLibrary,
};
pub use models::{
    format_duration, media_summary, Album, AlbumId, Asset, KindFilter, MediaFilter, MediaKind,
    PickerOptions, SelectionPolicy, SmartAlbumKind,
};
pub use schema::init_catalog_schema;
pub use selection::{SelectionChange, SelectionSet};
pub use session::{MediaPickerSession, PickerDelegate, SessionRefresh, TapResult};
pub use thumbnail::{cached_thumbnail, load_thumbnail, render_thumbnail, ThumbnailError};
pub use viewport::{BandDiff, PreheatWindow, Rect};

#[cfg(feature = "components")]
pub use components::{AlbumCover, AssetThumbnail, ImageLoadState, PickerContext};
