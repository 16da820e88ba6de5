use dioxus::prelude::*;
use media_picker::components::AssetThumbnail;
use uuid::Uuid;

use crate::services::ExportSink;

/// End screen: what the export sink did with the pick
#[component]
pub fn DoneScreen() -> Element {
    let sink = use_context::<ExportSink>();
    let state = sink.snapshot();

    let cancelled = state.cancelled;
    let error = state.error.clone();
    let exported = state.report.files.len();
    let manifest = state
        .report
        .manifest
        .as_ref()
        .map(|path| path.display().to_string());
    let failures: Vec<String> = state
        .report
        .failures
        .iter()
        .map(|(id, reason)| format!("{}: {}", id, reason))
        .collect();
    let picked: Vec<(Uuid, String)> = state
        .picked
        .iter()
        .map(|asset| (asset.id, asset.file_path.clone()))
        .collect();

    rsx! {
        div { style: "padding: 24px; max-width: 480px; margin: 0 auto;",
            if cancelled {
                h2 { style: "margin: 0 0 8px 0; font-size: 20px; color: #111;", "Nothing picked" }
                p { style: "color: #555; font-size: 14px;",
                    "The picker was dismissed without a selection."
                }
            } else {
                h2 { style: "margin: 0 0 8px 0; font-size: 20px; color: #111;", "Export finished" }
                p { style: "color: #555; font-size: 14px;", "{exported} files written" }
                if let Some(message) = error {
                    div { style: "padding: 8px 12px; background: #f8d7da; color: #721c24; font-size: 13px; border-radius: 6px; margin-bottom: 12px;",
                        "{message}"
                    }
                }
                if let Some(path) = manifest {
                    p { style: "font-size: 12px; color: #8e8e93; word-break: break-all;",
                        "Manifest: {path}"
                    }
                }
                div { style: "display: flex; flex-direction: column; gap: 8px; margin-top: 16px;",
                    for (id, path) in picked {
                        div {
                            key: "{id}",
                            style: "display: flex; align-items: center; gap: 12px;",
                            AssetThumbnail { asset: id, edge: 72 }
                            span { style: "font-size: 12px; color: #555; word-break: break-all;",
                                "{path}"
                            }
                        }
                    }
                }
                if !failures.is_empty() {
                    h3 { style: "margin: 16px 0 4px 0; font-size: 14px; color: #721c24;",
                        "Not exported"
                    }
                    for line in failures {
                        p { style: "font-size: 12px; color: #721c24; margin: 2px 0;", "{line}" }
                    }
                }
            }
        }
    }
}
