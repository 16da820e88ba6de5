use dioxus::prelude::*;
use dioxus_picker::{AssetTile, EmptyGrid, PickerBar};
use media_picker::components::PickerContext;
use media_picker::{
    format_duration, media_summary, Asset, GridReload, MediaKind, MediaPickerSession, Rect,
    TapResult, GRID_SPACING,
};

use super::GRID_WIDTH;
use crate::error::AppError;
use crate::Screen;

/// Rows jumped per pager step
const PAGE_ROWS: usize = 4;
/// Logical height of the visible grid window
const VIEWPORT_HEIGHT: f64 = 560.0;

/// Asset grid for the currently open album, with pager-driven scrolling.
///
/// Only the rows around the visible window are mounted; every scroll step
/// feeds the session's preheat engine through `update_viewport`.
#[component]
pub fn GridScreen(title: String, on_navigate: EventHandler<Screen>) -> Element {
    let mut session = use_context::<Signal<MediaPickerSession>>();
    let mut status = use_signal(|| None::<String>);
    let mut scroll_row = use_signal(|| 0usize);

    // Fold queued library changes in when the screen comes up
    use_effect(move || {
        let result = session.write().drain_changes();
        match result {
            Ok(refresh) => {
                if refresh.grid == Some(GridReload::Full) {
                    scroll_row.set(0);
                }
            }
            Err(e) => status.set(Some(AppError::from(e).user_message())),
        }
    });

    // The preheat window follows the pager position
    use_effect(move || {
        let row = scroll_row();
        let mut guard = session.write();
        let y = match guard.grid() {
            Some(grid) => row as f64 * (grid.layout().cell_edge() + GRID_SPACING),
            None => return,
        };
        guard.update_viewport(Rect::new(0.0, y, GRID_WIDTH, VIEWPORT_HEIGHT));
    });

    let guard = session.read();
    let Some(grid) = guard.grid() else {
        drop(guard);
        return rsx! {
            div { style: "padding: 24px; text-align: center;",
                p { style: "color: #555;", "This album is no longer available." }
                button {
                    style: "margin-top: 12px; padding: 8px 16px; color: #0066cc; background: none; border: 1px solid #0066cc; border-radius: 6px; cursor: pointer;",
                    onclick: move |_| on_navigate.call(Screen::Albums),
                    "Back to albums"
                }
            }
        };
    };

    let row_height = grid.layout().cell_edge() + GRID_SPACING;
    let edge = grid.layout().cell_edge().round() as u32;
    let thumb_edge = grid.thumbnail_edge();
    let total_rows = grid.len().div_ceil(grid.layout().columns as usize);
    let max_row = total_rows.saturating_sub(PAGE_ROWS);
    let empty = grid.is_empty();

    // Window the mounted tiles to the visible rows plus one row overscan
    let window = Rect::new(
        0.0,
        scroll_row() as f64 * row_height - row_height,
        GRID_WIDTH,
        VIEWPORT_HEIGHT + 2.0 * row_height,
    );
    let tiles: Vec<(usize, Asset, bool)> = grid
        .layout()
        .indices_in_rect(&window, grid.len())
        .into_iter()
        .filter_map(|index| {
            grid.asset_at(index)
                .map(|asset| (index, asset.clone(), guard.selection().contains(&asset.id)))
        })
        .collect();

    let images = grid
        .fetch()
        .assets
        .iter()
        .filter(|asset| asset.kind == MediaKind::Image)
        .count();
    let summary = media_summary(images, grid.len() - images, guard.options().filter.kind);

    let prompt = guard.options().prompt.clone();
    let count_label = guard
        .options()
        .shows_selection_count
        .then(|| guard.selected_count());
    let commit = guard.commit_enabled();
    drop(guard);

    let tap = move |index: usize| {
        let result = session.write().toggle_at(index);
        match result {
            TapResult::Finished => on_navigate.call(Screen::Done),
            TapResult::Rejected => status.set(Some("Selection limit reached".to_string())),
            _ => status.set(None),
        }
    };

    rsx! {
        div { style: "display: flex; flex-direction: column; height: 100%; background: white;",
            PickerBar {
                prompt,
                selected_count: count_label,
                commit_enabled: commit,
                on_done: move |_| {
                    if session.write().finish() {
                        on_navigate.call(Screen::Done);
                    }
                },
                on_cancel: move |_| {
                    session.write().cancel();
                    on_navigate.call(Screen::Done);
                },
            }
            div { style: "display: flex; align-items: center; gap: 8px; padding: 4px 12px; border-bottom: 1px solid #f0f0f0;",
                button {
                    style: "background: none; border: none; color: #0066cc; font-size: 15px; cursor: pointer;",
                    onclick: move |_| {
                        session.write().close_album();
                        on_navigate.call(Screen::Albums);
                    },
                    "‹ Albums"
                }
                span { style: "flex: 1; text-align: center; font-size: 15px; font-weight: 600; color: #111;",
                    "{title}"
                }
                button {
                    style: "padding: 4px 10px; font-size: 14px; cursor: pointer;",
                    onclick: move |_| scroll_row.set(scroll_row().saturating_sub(PAGE_ROWS)),
                    "▲"
                }
                button {
                    style: "padding: 4px 10px; font-size: 14px; cursor: pointer;",
                    onclick: move |_| scroll_row.set((scroll_row() + PAGE_ROWS).min(max_row)),
                    "▼"
                }
            }
            if let Some(message) = status() {
                div { style: "padding: 8px 16px; background: #fff3cd; color: #856404; font-size: 13px;",
                    "{message}"
                }
            }
            div { style: "flex: 1; overflow: hidden;",
                if empty {
                    EmptyGrid {}
                } else {
                    div { style: "display: flex; flex-wrap: wrap; gap: 2px; width: {GRID_WIDTH}px; margin: 0 auto;",
                        for (index, asset, selected) in tiles {
                            GridTile {
                                key: "{asset.id}",
                                index,
                                asset,
                                selected,
                                edge,
                                thumb_edge,
                                on_tap: move |index| tap(index),
                            }
                        }
                    }
                }
            }
            div { style: "padding: 10px; text-align: center; font-size: 13px; color: #8e8e93; border-top: 1px solid #f0f0f0;",
                "{summary}"
            }
        }
    }
}

/// One grid cell: loads its thumbnail and renders it as a tile
#[component]
fn GridTile(
    index: usize,
    asset: Asset,
    selected: bool,
    edge: u32,
    thumb_edge: u32,
    on_tap: EventHandler<usize>,
) -> Element {
    let context = use_context::<PickerContext>();
    let id = asset.id;
    let data_url = use_resource(move || {
        let context = context.clone();
        async move { context.thumbnail_data_url(id, thumb_edge).await }
    });

    let duration_label =
        (asset.kind == MediaKind::Video).then(|| format_duration(asset.duration));

    rsx! {
        AssetTile {
            data_url: data_url().flatten(),
            edge,
            selected,
            duration_label,
            slomo: asset.slomo,
            on_tap: move |_| on_tap.call(index),
        }
    }
}
