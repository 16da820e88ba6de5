use std::fs;
use std::path::{Path, PathBuf};

use media_picker::{KindFilter, MediaFilter, PickerOptions, SelectionPolicy, DEFAULT_EXPORT_QUALITY};
use serde::{Deserialize, Serialize};

/// Config file looked up in the working directory
pub const CONFIG_FILE: &str = "fotokorb.toml";

/// App configuration, loaded from TOML with per-field fallback to defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory scanned into the catalog on first start
    pub media_dir: PathBuf,
    /// Directory picked media is exported to
    pub export_dir: PathBuf,
    /// Directory holding the catalog database and the thumbnail cache
    pub data_dir: PathBuf,
    pub columns_portrait: u32,
    pub columns_landscape: u32,
    pub minimum_selection: usize,
    /// 0 = unbounded
    pub maximum_selection: usize,
    pub allows_multiple: bool,
    pub kind: KindFilter,
    /// Longest video duration offered for picking, in seconds
    pub max_video_seconds: Option<f64>,
    pub show_selection_count: bool,
    pub prompt: Option<String>,
    /// JPEG quality for exported images, 1-100
    pub export_quality: u8,
}

fn base_dir() -> PathBuf {
    if cfg!(target_os = "android") {
        PathBuf::from("/storage/emulated/0/Android/data/de.teilgedanken.fotokorb/files")
    } else {
        PathBuf::from(".")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            media_dir: base_dir().join("media"),
            export_dir: base_dir().join("exports"),
            data_dir: base_dir().join("data"),
            columns_portrait: 4,
            columns_landscape: 7,
            minimum_selection: 1,
            maximum_selection: 0,
            allows_multiple: true,
            kind: KindFilter::Any,
            max_video_seconds: None,
            show_selection_count: true,
            prompt: None,
            export_quality: DEFAULT_EXPORT_QUALITY,
        }
    }
}

impl AppConfig {
    /// Converts to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Reads the config file; a missing or broken file means defaults
    pub fn load(path: &Path) -> AppConfig {
        match fs::read_to_string(path) {
            Ok(content) => match AppConfig::from_toml(&content) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Ignoring broken config {:?}: {}", path, e);
                    AppConfig::default()
                }
            },
            Err(_) => {
                log::info!("No config at {:?}, using defaults", path);
                AppConfig::default()
            }
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("catalog.db")
    }

    pub fn thumbnail_dir(&self) -> PathBuf {
        self.data_dir.join("thumbnails")
    }

    /// Picker session options derived from this config
    pub fn picker_options(&self) -> PickerOptions {
        PickerOptions {
            filter: MediaFilter {
                kind: self.kind,
                max_video_seconds: self.max_video_seconds,
            },
            policy: SelectionPolicy {
                minimum: self.minimum_selection,
                maximum: self.maximum_selection,
                allows_multiple: self.allows_multiple,
            },
            columns_portrait: self.columns_portrait,
            columns_landscape: self.columns_landscape,
            shows_selection_count: self.show_selection_count,
            prompt: self.prompt.clone(),
            ..PickerOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.toml"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "minimum_selection = [not toml").unwrap();
        assert_eq!(AppConfig::load(&path), AppConfig::default());
    }

    #[test]
    fn test_partial_toml_keeps_remaining_defaults() {
        let config = AppConfig::from_toml(
            "media_dir = \"/pics\"\nminimum_selection = 2\nkind = \"Image\"\n",
        )
        .unwrap();
        assert_eq!(config.media_dir, PathBuf::from("/pics"));
        assert_eq!(config.minimum_selection, 2);
        assert_eq!(config.kind, KindFilter::Image);
        assert_eq!(config.columns_portrait, 4);
        assert_eq!(config.export_quality, DEFAULT_EXPORT_QUALITY);
    }

    #[test]
    fn test_picker_options_carry_policy_and_filter() {
        let config = AppConfig {
            minimum_selection: 2,
            maximum_selection: 5,
            allows_multiple: true,
            kind: KindFilter::Video,
            max_video_seconds: Some(60.0),
            prompt: Some("Pick some".to_string()),
            ..AppConfig::default()
        };
        let options = config.picker_options();
        assert_eq!(options.policy.minimum, 2);
        assert_eq!(options.policy.maximum, 5);
        assert!(options.policy.allows_multiple);
        assert_eq!(options.filter.kind, KindFilter::Video);
        assert_eq!(options.filter.max_video_seconds, Some(60.0));
        assert_eq!(options.prompt.as_deref(), Some("Pick some"));
        assert!(options.initial_selection.is_empty());
    }
}
