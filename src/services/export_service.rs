// Export sink: receives the picked assets and writes them out

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use media_picker::{export_asset, Asset, PickerDelegate};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

/// Top-level structure of the manifest.json written next to the exports
#[derive(Serialize)]
struct ExportManifest {
    format_version: u32,
    exported_at: String,
    app_version: String,
    quality: u8,
    assets: Vec<ManifestEntry>,
}

#[derive(Serialize)]
struct ManifestEntry {
    id: String,
    source: String,
    file: String,
}

/// Outcome of one export run
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub files: Vec<PathBuf>,
    pub failures: Vec<(Uuid, String)>,
    pub manifest: Option<PathBuf>,
}

/// Exports every picked asset into `target_dir` and writes a manifest.json
/// describing what landed there. Individual assets may fail without
/// aborting the run; their errors are collected in the report.
pub fn export_picked(assets: &[Asset], target_dir: &Path, quality: u8) -> Result<ExportReport, AppError> {
    fs::create_dir_all(target_dir)?;

    let mut report = ExportReport::default();
    let mut entries = Vec::new();
    for asset in assets {
        match export_asset(asset, target_dir, quality) {
            Ok(path) => {
                let file = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                entries.push(ManifestEntry {
                    id: asset.id.to_string(),
                    source: asset.file_path.clone(),
                    file,
                });
                report.files.push(path);
            }
            Err(e) => {
                log::warn!("Export of {} failed: {}", asset.id, e);
                report.failures.push((asset.id, e.to_string()));
            }
        }
    }

    let manifest = ExportManifest {
        format_version: 1,
        exported_at: Utc::now().to_rfc3339(),
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        quality,
        assets: entries,
    };
    let manifest_path = target_dir.join("manifest.json");
    let json = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| AppError::Other(format!("Failed to serialize manifest.json: {}", e)))?;
    fs::write(&manifest_path, json)?;
    report.manifest = Some(manifest_path);

    log::info!(
        "Exported {} of {} picked assets to {:?}",
        report.files.len(),
        assets.len(),
        target_dir
    );
    Ok(report)
}

/// What the sink has seen so far
#[derive(Debug, Clone, Default)]
pub struct SinkState {
    pub picked: Vec<Asset>,
    pub report: ExportReport,
    pub error: Option<String>,
    pub cancelled: bool,
    pub finished: bool,
}

/// Picker delegate that exports the confirmed selection.
///
/// Handles are cheap clones over shared state, so the UI can keep one and
/// read the outcome after the session handed the pick over.
#[derive(Clone)]
pub struct ExportSink {
    target_dir: PathBuf,
    quality: u8,
    state: Arc<Mutex<SinkState>>,
}

impl ExportSink {
    pub fn new(target_dir: PathBuf, quality: u8) -> Self {
        Self {
            target_dir,
            quality,
            state: Arc::new(Mutex::new(SinkState::default())),
        }
    }

    /// Copy of the current state; a poisoned lock reads as default
    pub fn snapshot(&self) -> SinkState {
        self.state
            .lock()
            .map(|state| state.clone())
            .unwrap_or_default()
    }
}

impl PickerDelegate for ExportSink {
    fn did_finish_picking(&mut self, assets: Vec<Asset>) {
        let outcome = export_picked(&assets, &self.target_dir, self.quality);
        if let Ok(mut state) = self.state.lock() {
            state.finished = true;
            state.picked = assets;
            match outcome {
                Ok(report) => state.report = report,
                Err(e) => {
                    log::error!("Export run failed: {}", e);
                    state.error = Some(e.to_string());
                }
            }
        }
    }

    fn did_cancel(&mut self) {
        log::info!("Picking cancelled, nothing exported");
        if let Ok(mut state) = self.state.lock() {
            state.finished = true;
            state.cancelled = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn jpeg_asset(dir: &Path, name: &str) -> Asset {
        let path = dir.join(name);
        image::RgbImage::new(6, 4).save(&path).unwrap();
        let mut asset = Asset::image(path.to_string_lossy().to_string(), Utc::now());
        asset.width = 6;
        asset.height = 4;
        asset
    }

    #[test]
    fn test_export_picked_writes_files_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        let assets = vec![jpeg_asset(dir.path(), "a.jpg"), jpeg_asset(dir.path(), "b.jpg")];

        let report = export_picked(&assets, &target, 85).unwrap();
        assert_eq!(report.files.len(), 2);
        assert!(report.failures.is_empty());
        for file in &report.files {
            assert!(file.exists());
        }

        let manifest: serde_json::Value =
            serde_json::from_slice(&fs::read(report.manifest.unwrap()).unwrap()).unwrap();
        assert_eq!(manifest["format_version"], 1);
        assert_eq!(manifest["quality"], 85);
        let entries = manifest["assets"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["id"], assets[0].id.to_string());
    }

    #[test]
    fn test_export_picked_collects_failures() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        let good = jpeg_asset(dir.path(), "good.jpg");
        let missing = Asset::image(
            dir.path().join("gone.jpg").to_string_lossy().to_string(),
            Utc::now(),
        );

        let report = export_picked(&[missing.clone(), good], &target, 90).unwrap();
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, missing.id);

        // The manifest only lists what actually landed
        let manifest: serde_json::Value =
            serde_json::from_slice(&fs::read(report.manifest.unwrap()).unwrap()).unwrap();
        assert_eq!(manifest["assets"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_sink_exports_on_finish() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        let mut sink = ExportSink::new(target.clone(), 90);
        let reader = sink.clone();
        let asset = jpeg_asset(dir.path(), "pick.jpg");

        sink.did_finish_picking(vec![asset.clone()]);

        let state = reader.snapshot();
        assert!(state.finished);
        assert!(!state.cancelled);
        assert_eq!(state.picked, vec![asset]);
        assert_eq!(state.report.files.len(), 1);
        assert!(target.join("manifest.json").exists());
    }

    #[test]
    fn test_sink_records_cancel() {
        let mut sink = ExportSink::new(PathBuf::from("/nowhere"), 90);
        let reader = sink.clone();

        sink.did_cancel();

        let state = reader.snapshot();
        assert!(state.finished);
        assert!(state.cancelled);
        assert!(state.report.files.is_empty());
    }
}
