//! Dioxus UI components for the picker
//!
//! Service-backed building blocks: they hold the library handle and load
//! their own thumbnail data. Widgets without service knowledge (tiles,
//! rows, toolbars) live in the dioxus-picker crate.

#[cfg(feature = "components")]
use dioxus::prelude::*;

#[cfg(feature = "components")]
use std::sync::Arc;

#[cfg(feature = "components")]
use uuid::Uuid;

#[cfg(feature = "components")]
use crate::grid::CellTag;

#[cfg(feature = "components")]
use crate::library::MediaLibrary;

#[cfg(feature = "components")]
use crate::models::PickerOptions;

#[cfg(feature = "components")]
/// Shared handle the picker screens provide via `use_context`
#[derive(Clone)]
pub struct PickerContext {
    pub library: Arc<dyn MediaLibrary>,
    pub options: PickerOptions,
}

#[cfg(feature = "components")]
impl PickerContext {
    pub fn new(library: Arc<dyn MediaLibrary>, options: PickerOptions) -> Self {
        Self { library, options }
    }

    /// Loads a thumbnail on a blocking task and converts it to a data URL
    pub async fn thumbnail_data_url(&self, asset: Uuid, edge: u32) -> Option<String> {
        let library = self.library.clone();
        match tokio::task::spawn_blocking(move || library.thumbnail(&asset, edge)).await {
            Ok(Ok(bytes)) => Some(webp_data_url(&bytes)),
            Ok(Err(e)) => {
                log::debug!("Thumbnail for {} failed: {}", asset, e);
                None
            }
            Err(e) => {
                log::debug!("Thumbnail task for {} failed: {}", asset, e);
                None
            }
        }
    }
}

#[cfg(feature = "components")]
/// Loading lifecycle of an asynchronously fetched thumbnail
#[derive(Debug, Clone)]
pub enum ImageLoadState {
    Loading,
    Loaded(String),
    Failed,
}

#[cfg(feature = "components")]
fn webp_data_url(bytes: &[u8]) -> String {
    use base64::{engine::general_purpose, Engine as _};

    format!(
        "data:image/webp;base64,{}",
        general_purpose::STANDARD.encode(bytes)
    )
}

#[cfg(feature = "components")]
/// Thumbnail image, loaded through the library.
///
/// Pass the owning cell's tag register plus the tag value captured when
/// the cell was bound; a completion for a recycled cell then keeps the
/// placeholder instead of overwriting the new occupant.
#[component]
pub fn AssetThumbnail(
    asset: Uuid,
    edge: u32,
    #[props(default = None)] cell: Option<Signal<CellTag>>,
    #[props(default = 0)] tag: u64,
    #[props(default = "Photo".to_string())] alt: String,
) -> Element {
    let context = use_context::<PickerContext>();

    let image_state = use_resource(move || {
        let context = context.clone();
        async move {
            let loaded = context.thumbnail_data_url(asset, edge).await;
            if let Some(cell) = cell {
                if !cell.read().is_current(tag) {
                    return ImageLoadState::Loading;
                }
            }
            match loaded {
                Some(url) => ImageLoadState::Loaded(url),
                None => ImageLoadState::Failed,
            }
        }
    });

    rsx! {
        div {
            style: format!("width: {edge}px; height: {edge}px; overflow: hidden; background: #efeff4;"),
            match image_state().unwrap_or(ImageLoadState::Loading) {
                ImageLoadState::Loading => rsx! {
                    div { style: "width: 100%; height: 100%;" }
                },
                ImageLoadState::Loaded(url) => rsx! {
                    img {
                        src: "{url}",
                        alt: "{alt}",
                        style: "width: 100%; height: 100%; object-fit: cover;",
                    }
                },
                ImageLoadState::Failed => rsx! {
                    div {
                        style: "width: 100%; height: 100%; display: flex; align-items: center; justify-content: center; color: #b3b3b6;",
                        "📷"
                    }
                },
            }
        }
    }
}

#[cfg(feature = "components")]
/// Stacked cover for an album row: up to three of the album's most recent
/// thumbnails, newest in front. Empty albums get a drawn placeholder.
#[component]
pub fn AlbumCover(
    #[props(default = vec![])] thumbnails: Vec<Uuid>,
    #[props(default = 68)] edge: u32,
) -> Element {
    let context = use_context::<PickerContext>();

    let covers = use_resource(move || {
        let context = context.clone();
        let ids = thumbnails.clone();
        async move {
            let mut urls = Vec::new();
            for id in ids.into_iter().take(3) {
                if let Some(url) = context.thumbnail_data_url(id, edge).await {
                    urls.push(url);
                }
            }
            urls
        }
    });

    let urls = covers().unwrap_or_default();
    rsx! {
        div {
            style: format!("position: relative; width: {}px; height: {}px;", edge, edge + 4),
            if urls.is_empty() {
                svg {
                    width: "{edge}",
                    height: "{edge}",
                    view_box: "0 0 68 68",
                    style: "position: absolute; left: 0; top: 4px;",
                    rect { width: "68", height: "68", fill: "#efeff4" }
                    circle { cx: "24", cy: "22", r: "6", fill: "#b3b3b6" }
                    path { d: "M10 52 L28 32 L40 44 L48 36 L58 52 Z", fill: "#b3b3b6" }
                }
            } else {
                for (layer, url) in urls.iter().enumerate().rev() {
                    img {
                        src: "{url}",
                        style: format!(
                            "position: absolute; left: {}px; top: {}px; width: {}px; height: {}px; object-fit: cover; border: 1px solid white;",
                            2 * layer,
                            4 - 2 * layer,
                            edge as usize - 4 * layer,
                            edge as usize - 4 * layer,
                        ),
                    }
                }
            }
        }
    }
}
