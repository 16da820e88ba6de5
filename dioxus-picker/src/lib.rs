use dioxus::prelude::*;

/// A single grid tile in the picker
///
/// Renders the thumbnail with the selection and video chrome around it.
/// Data loading stays with the parent; the tile only receives a data URL.
///
/// # Example
/// ```rust,ignore
/// AssetTile {
///     data_url: Some("data:image/webp;base64,...".to_string()),
///     edge: 100,
///     selected: true,
///     duration_label: Some("01:24".to_string()),
///     on_tap: move |_| {
///         // Toggle the selection in the parent
///     },
/// }
/// ```
#[component]
pub fn AssetTile(
    /// Pre-loaded thumbnail as a data URL; None shows a placeholder
    #[props(default = None)]
    data_url: Option<String>,
    /// Edge length of the square tile in logical pixels
    #[props(default = 100)]
    edge: u32,
    /// Draw the selection border and checkmark
    #[props(default = false)]
    selected: bool,
    /// Video badge text, e.g. "01:24"; None hides the badge
    #[props(default = None)]
    duration_label: Option<String>,
    /// Swap the video glyph for the slo-mo squiggle
    #[props(default = false)]
    slomo: bool,
    /// Render dimmed and swallow taps
    #[props(default = false)]
    disabled: bool,
    /// Callback when the tile is tapped
    #[props(default)]
    on_tap: Option<EventHandler<()>>,
) -> Element {
    let container_style = format!(
        "position: relative; width: {edge}px; height: {edge}px; overflow: hidden; background: #efeff4; {}",
        if disabled {
            "opacity: 0.4;"
        } else {
            "cursor: pointer;"
        }
    );

    rsx! {
        div {
            style: "{container_style}",
            onclick: move |_| {
                if disabled {
                    return;
                }
                if let Some(handler) = &on_tap {
                    handler.call(());
                }
            },
            if let Some(url) = &data_url {
                img {
                    src: "{url}",
                    style: "width: 100%; height: 100%; object-fit: cover;",
                }
            } else {
                div {
                    style: "width: 100%; height: 100%; display: flex; align-items: center; justify-content: center; color: #b3b3b6;",
                    "📷"
                }
            }
            if let Some(label) = &duration_label {
                div {
                    style: "position: absolute; left: 0; right: 0; bottom: 0; display: flex; justify-content: space-between; align-items: center; padding: 2px 6px; background: linear-gradient(transparent, rgba(0, 0, 0, 0.6)); color: white; font-size: 12px;",
                    span {
                        if slomo { "∿" } else { "▶" }
                    }
                    span { "{label}" }
                }
            }
            if selected {
                div {
                    style: "position: absolute; top: 0; left: 0; right: 0; bottom: 0; border: 2px solid #0066cc; box-sizing: border-box;",
                }
                div {
                    style: "position: absolute; bottom: 4px; right: 4px; width: 24px; height: 24px; background: #0066cc; border-radius: 50%; display: flex; align-items: center; justify-content: center; color: white; font-size: 16px;",
                    "✓"
                }
            }
        }
    }
}

/// One row in the album list: stacked covers, title, count and a chevron
#[component]
pub fn AlbumRow(
    /// Up to three cover thumbnails as data URLs, newest first
    #[props(default = vec![])]
    cover_urls: Vec<String>,
    /// Localized album title
    title: String,
    /// Number of matching assets in the album
    count: usize,
    /// Callback when the row is tapped
    #[props(default)]
    on_click: Option<EventHandler<()>>,
) -> Element {
    rsx! {
        div {
            style: "display: flex; align-items: center; gap: 12px; padding: 8px 16px; cursor: pointer; border-bottom: 1px solid #f0f0f0; background: white;",
            onclick: move |_| {
                if let Some(handler) = &on_click {
                    handler.call(());
                }
            },
            div {
                style: "position: relative; width: 68px; height: 72px; flex-shrink: 0;",
                if cover_urls.is_empty() {
                    div {
                        style: "position: absolute; left: 0; top: 4px; width: 68px; height: 68px; background: #efeff4; display: flex; align-items: center; justify-content: center; color: #b3b3b6; font-size: 28px;",
                        "📷"
                    }
                } else {
                    for (layer, url) in cover_urls.iter().take(3).enumerate().rev() {
                        img {
                            src: "{url}",
                            style: format!(
                                "position: absolute; left: {}px; top: {}px; width: {}px; height: {}px; object-fit: cover; border: 1px solid white;",
                                2 * layer,
                                4 - 2 * layer,
                                68 - 4 * layer,
                                68 - 4 * layer,
                            ),
                        }
                    }
                }
            }
            div {
                style: "flex: 1; min-width: 0;",
                div {
                    style: "font-size: 17px; color: #222; white-space: nowrap; overflow: hidden; text-overflow: ellipsis;",
                    "{title}"
                }
                div { style: "font-size: 14px; color: #888;", "{count}" }
            }
            div { style: "color: #c7c7cc; font-size: 20px;", "›" }
        }
    }
}

/// Toolbar above the picker screens: Cancel, prompt, count and Done
#[component]
pub fn PickerBar(
    /// Prompt shown in the title position
    #[props(default = None)]
    prompt: Option<String>,
    /// Running selection count, shown when Some
    #[props(default = None)]
    selected_count: Option<usize>,
    /// Whether the Done action is currently allowed
    #[props(default = false)]
    commit_enabled: bool,
    /// Callback for the Done button
    #[props(default)]
    on_done: Option<EventHandler<()>>,
    /// Callback for the Cancel button
    #[props(default)]
    on_cancel: Option<EventHandler<()>>,
) -> Element {
    let done_style = format!(
        "padding: 8px 16px; background: none; font-size: 16px; font-weight: 600; border: none; {}",
        if commit_enabled {
            "color: #0066cc; cursor: pointer;"
        } else {
            "color: #b3b3b6;"
        }
    );

    rsx! {
        div {
            style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 16px; background: #f8f8f8; border-bottom: 1px solid #e0e0e0;",
            button {
                style: "padding: 8px 16px; background: none; color: #0066cc; font-size: 16px; cursor: pointer; border: none;",
                onclick: move |_| {
                    if let Some(handler) = &on_cancel {
                        handler.call(());
                    }
                },
                "Cancel"
            }
            div {
                style: "color: #333; font-size: 16px; font-weight: 500;",
                if let Some(prompt) = &prompt {
                    "{prompt}"
                }
                if let Some(count) = selected_count {
                    span {
                        style: "color: #666; font-weight: 400; margin-left: 8px;",
                        "{count} selected"
                    }
                }
            }
            button {
                style: "{done_style}",
                disabled: !commit_enabled,
                onclick: move |_| {
                    if !commit_enabled {
                        return;
                    }
                    if let Some(handler) = &on_done {
                        handler.call(());
                    }
                },
                "Done"
            }
        }
    }
}

/// Placeholder for an album with no matching assets
#[component]
pub fn EmptyGrid(
    #[props(default = "No photos or videos".to_string())] message: String,
) -> Element {
    rsx! {
        div {
            style: "padding: 48px 24px; text-align: center; color: #999;",
            div { style: "font-size: 40px; margin-bottom: 12px;", "📷" }
            div { style: "font-size: 16px;", "{message}" }
        }
    }
}
