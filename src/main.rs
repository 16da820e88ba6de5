#[cfg(any(feature = "web", feature = "desktop", feature = "mobile"))]
use dioxus::prelude::*;

#[cfg(any(feature = "web", feature = "desktop", feature = "mobile"))]
mod components;
mod config;
mod error;
#[cfg(not(any(feature = "web", feature = "desktop", feature = "mobile")))]
mod headless;
mod services;

#[cfg(any(feature = "web", feature = "desktop", feature = "mobile"))]
use components::{AlbumsScreen, DoneScreen, GridScreen};

fn init_logging() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default().with_max_level(log::LevelFilter::Info),
        );
    }
    #[cfg(not(target_os = "android"))]
    {
        env_logger::init();
    }
}

#[cfg(any(feature = "web", feature = "desktop", feature = "mobile"))]
fn main() {
    init_logging();
    dioxus::launch(App);
}

#[cfg(not(any(feature = "web", feature = "desktop", feature = "mobile")))]
fn main() {
    init_logging();
    if let Err(e) = headless::run() {
        log::error!("Startup failed: {}", e);
        std::process::exit(1);
    }
}

/// Screen navigation for the app
#[cfg(any(feature = "web", feature = "desktop", feature = "mobile"))]
#[derive(Clone, PartialEq, Debug)]
pub enum Screen {
    Albums,
    Grid { title: String },
    Done,
}

#[cfg(any(feature = "web", feature = "desktop", feature = "mobile"))]
#[component]
fn App() -> Element {
    use std::rc::Rc;

    use media_picker::components::PickerContext;
    use media_picker::MediaPickerSession;

    let config = use_hook(|| config::AppConfig::load(std::path::Path::new(config::CONFIG_FILE)));
    let boot = use_hook(|| Rc::new(services::boot_ui(&config)));
    let options = use_hook(|| config.picker_options());
    let sink = use_hook(|| {
        services::ExportSink::new(config.export_dir.clone(), config.export_quality)
    });
    use_context_provider(|| PickerContext::new(boot.library.clone(), options.clone()));
    use_context_provider(|| sink.clone());
    use_context_provider(|| {
        Signal::new(MediaPickerSession::new(
            options.clone(),
            boot.library.clone(),
            Box::new(sink.clone()),
        ))
    });

    let mut current_screen = use_signal(|| Screen::Albums);
    let boot_error = boot.error.as_ref().map(|e| e.user_message());

    rsx! {
        div { style: "display: flex; flex-direction: column; height: 100vh; font-family: sans-serif;",
            if let Some(message) = boot_error {
                div { style: "padding: 8px 16px; background: #f8d7da; color: #721c24; font-size: 13px;",
                    "⚠️ {message}"
                }
            }
            div { style: "flex: 1; overflow-y: auto;",
                match current_screen() {
                    Screen::Albums => rsx! {
                        AlbumsScreen { on_navigate: move |s| current_screen.set(s) }
                    },
                    Screen::Grid { title } => rsx! {
                        GridScreen { title, on_navigate: move |s| current_screen.set(s) }
                    },
                    Screen::Done => rsx! {
                        DoneScreen {}
                    },
                }
            }
        }
    }
}
