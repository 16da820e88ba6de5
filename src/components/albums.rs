use dioxus::prelude::*;
use dioxus_picker::{EmptyGrid, PickerBar};
use media_picker::components::AlbumCover;
use media_picker::{Album, AlbumId, GridLayout, MediaPickerSession};

use super::GRID_WIDTH;
use crate::error::AppError;
use crate::Screen;

fn album_key(album: &Album) -> String {
    match &album.id {
        AlbumId::Smart(kind) => format!("smart-{:?}", kind),
        AlbumId::User(uuid) => uuid.to_string(),
    }
}

/// Album browser: smart albums first, user albums below
#[component]
pub fn AlbumsScreen(on_navigate: EventHandler<Screen>) -> Element {
    let mut session = use_context::<Signal<MediaPickerSession>>();
    let mut status = use_signal(|| None::<String>);

    // (Re)load the album list whenever this screen comes up
    use_effect(move || {
        let result = session.write().load_albums();
        if let Err(e) = result {
            status.set(Some(AppError::from(e).user_message()));
        }
    });

    let (rows, prompt, count_label, commit, columns) = {
        let guard = session.read();
        let rows: Vec<(String, Album)> = guard
            .albums()
            .iter()
            .map(|album| (album_key(album), album.clone()))
            .collect();
        (
            rows,
            guard.options().prompt.clone(),
            guard
                .options()
                .shows_selection_count
                .then(|| guard.selected_count()),
            guard.commit_enabled(),
            guard.options().columns_portrait,
        )
    };
    let empty = rows.is_empty();

    let open_album = move |album: Album| {
        let result = session
            .write()
            .open_album(&album.id, GridLayout::new(GRID_WIDTH, columns));
        match result {
            Ok(()) => on_navigate.call(Screen::Grid { title: album.title }),
            Err(e) => status.set(Some(AppError::from(e).user_message())),
        }
    };

    rsx! {
        div { style: "display: flex; flex-direction: column; height: 100%; background: #f5f5f5;",
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
            if let Some(message) = status() {
                div { style: "padding: 8px 16px; background: #fff3cd; color: #856404; font-size: 13px;",
                    "⚠️ {message}"
                }
            }
            div { style: "flex: 1; overflow-y: auto;",
                if empty {
                    EmptyGrid { message: "No albums yet" }
                } else {
                    for (k, album) in rows {
                        AlbumEntry {
                            key: "{k}",
                            album,
                            on_open: move |album| open_album(album),
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn AlbumEntry(album: Album, on_open: EventHandler<Album>) -> Element {
    let covers = album.recent_thumbnails.clone();
    let title = album.title.clone();
    let count = album.count;

    rsx! {
        div {
            style: "display: flex; align-items: center; gap: 12px; padding: 8px 16px; cursor: pointer; border-bottom: 1px solid #f0f0f0; background: white;",
            onclick: move |_| on_open.call(album.clone()),
            AlbumCover { thumbnails: covers }
            div { style: "flex: 1; min-width: 0;",
                div { style: "font-size: 16px; color: #111; white-space: nowrap; overflow: hidden; text-overflow: ellipsis;",
                    "{title}"
                }
                div { style: "font-size: 13px; color: #8e8e93;", "{count}" }
            }
            span { style: "color: #c7c7cc; font-size: 20px;", "›" }
        }
    }
}
