//! EXIF-preserving JPEG export and camera orientation handling
//!
//! Re-encoding a JPEG drops its metadata, so the original APP1 EXIF
//! segment is carried over into the fresh encode. Sources without EXIF
//! export as a plain re-encode. Orientation helpers are shared with the
//! thumbnail renderer.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::models::{Asset, MediaKind};

/// Default JPEG quality for exported images
pub const DEFAULT_EXPORT_QUALITY: u8 = 90;

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while exporting assets
#[derive(Debug)]
pub enum ExportError {
    ImageError(String),
    IoError(std::io::Error),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::ImageError(msg) => write!(f, "Image error: {}", msg),
            ExportError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::IoError(err)
    }
}

/// EXIF orientation (tag 274) of an encoded image, 1 when absent or invalid
pub fn read_orientation(bytes: &[u8]) -> u32 {
    let mut reader = Cursor::new(bytes);
    match exif::Reader::new().read_from_container(&mut reader) {
        Ok(data) => {
            if let Some(field) = data.get_field(exif::Tag::Orientation, exif::In::PRIMARY) {
                if let Some(v @ 1..=8) = field.value.get_uint(0) {
                    return v;
                }
            }
            1
        }
        Err(_) => 1,
    }
}

/// Rotates and mirrors decoded pixels upright for the given orientation
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Returns the raw APP1 EXIF segment, marker bytes included, if the JPEG
/// carries one before the scan data
pub fn exif_segment(jpeg: &[u8]) -> Option<&[u8]> {
    if jpeg.len() < 4 || jpeg[0..2] != [0xFF, 0xD8] {
        return None;
    }
    let mut i = 2;
    while i + 4 <= jpeg.len() {
        if jpeg[i] != 0xFF {
            return None;
        }
        let marker = jpeg[i + 1];
        // Start of scan: only pixel data follows
        if marker == 0xDA {
            return None;
        }
        let len = u16::from_be_bytes([jpeg[i + 2], jpeg[i + 3]]) as usize;
        if len < 2 || i + 2 + len > jpeg.len() {
            return None;
        }
        if marker == 0xE1 && jpeg[i + 4..].starts_with(b"Exif\x00\x00") {
            return Some(&jpeg[i..i + 2 + len]);
        }
        i += 2 + len;
    }
    None
}

/// Inserts the EXIF segment of `source` into `encoded` right after the SOI
/// marker. Either side lacking what the splice needs leaves `encoded`
/// untouched.
pub fn splice_exif(source: &[u8], encoded: Vec<u8>) -> Vec<u8> {
    let Some(segment) = exif_segment(source) else {
        return encoded;
    };
    if encoded.len() < 2 || encoded[0..2] != [0xFF, 0xD8] {
        return encoded;
    }
    let mut out = Vec::with_capacity(encoded.len() + segment.len());
    out.extend_from_slice(&encoded[0..2]);
    out.extend_from_slice(segment);
    out.extend_from_slice(&encoded[2..]);
    out
}

/// Re-encodes an image as JPEG at the given quality, carrying the source's
/// EXIF block over when it has one.
///
/// Pixels keep their stored layout; viewers keep rotating via the copied
/// orientation tag, so nothing ends up rotated twice.
pub fn export_jpeg(source: &[u8], quality: u8) -> ExportResult<Vec<u8>> {
    let img = image::load_from_memory(source)
        .map_err(|e| ExportError::ImageError(format!("Failed to decode source: {}", e)))?;

    let mut encoded = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut encoded, quality);
    img.write_with_encoder(encoder)
        .map_err(|e| ExportError::ImageError(format!("Failed to encode JPEG: {}", e)))?;

    Ok(splice_exif(source, encoded))
}

/// Writes one picked asset into `target_dir` and returns the written path.
///
/// Images re-encode as EXIF-preserving JPEG named by asset id; videos copy
/// byte for byte under their original extension.
pub fn export_asset(asset: &Asset, target_dir: &Path, quality: u8) -> ExportResult<PathBuf> {
    std::fs::create_dir_all(target_dir)?;
    match asset.kind {
        MediaKind::Image => {
            let source = std::fs::read(&asset.file_path)?;
            let bytes = export_jpeg(&source, quality)?;
            let target = target_dir.join(format!("{}.jpg", asset.id));
            std::fs::write(&target, bytes)?;
            log::debug!("Exported image to {:?}", target);
            Ok(target)
        }
        MediaKind::Video => {
            let extension = Path::new(&asset.file_path)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("mov");
            let target = target_dir.join(format!("{}.{}", asset.id, extension));
            std::fs::copy(&asset.file_path, &target)?;
            log::debug!("Exported video to {:?}", target);
            Ok(target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use image::RgbImage;
    use tempfile::tempdir;

    /// APP1 segment holding a minimal TIFF block whose only entry is
    /// orientation 6 (rotate 90 clockwise to view)
    fn orientation_app1() -> Vec<u8> {
        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"II\x2A\x00\x08\x00\x00\x00"); // little endian, IFD at 8
        tiff.extend_from_slice(&[0x01, 0x00]); // one entry
        tiff.extend_from_slice(&[0x12, 0x01]); // tag 274
        tiff.extend_from_slice(&[0x03, 0x00]); // SHORT
        tiff.extend_from_slice(&[0x01, 0x00, 0x00, 0x00]); // count 1
        tiff.extend_from_slice(&[0x06, 0x00, 0x00, 0x00]); // value 6
        tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // no next IFD

        let payload_len = 2 + 6 + tiff.len();
        let mut segment = vec![0xFF, 0xE1];
        segment.extend_from_slice(&(payload_len as u16).to_be_bytes());
        segment.extend_from_slice(b"Exif\x00\x00");
        segment.extend_from_slice(&tiff);
        segment
    }

    fn plain_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([10, 200, 90]),
        ));
        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, 90);
        img.write_with_encoder(encoder).unwrap();
        out
    }

    fn jpeg_with_orientation(width: u32, height: u32) -> Vec<u8> {
        splice_exif(
            &{
                let mut fake = vec![0xFF, 0xD8];
                fake.extend_from_slice(&orientation_app1());
                fake.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02]);
                fake
            },
            plain_jpeg(width, height),
        )
    }

    #[test]
    fn test_exif_segment_found_before_scan_data() {
        let jpeg = jpeg_with_orientation(8, 8);
        let segment = exif_segment(&jpeg).unwrap();
        assert_eq!(&segment[0..2], &[0xFF, 0xE1]);
        assert!(segment[4..].starts_with(b"Exif\x00\x00"));
    }

    #[test]
    fn test_plain_jpeg_has_no_exif_segment() {
        assert!(exif_segment(&plain_jpeg(8, 8)).is_none());
        assert!(exif_segment(b"not a jpeg").is_none());
    }

    #[test]
    fn test_read_orientation_parses_tag_274() {
        assert_eq!(read_orientation(&jpeg_with_orientation(8, 8)), 6);
        assert_eq!(read_orientation(&plain_jpeg(8, 8)), 1);
        assert_eq!(read_orientation(b"garbage"), 1);
    }

    #[test]
    fn test_apply_orientation_rotates_dimensions() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(4, 2));
        let rotated = apply_orientation(img.clone(), 6);
        assert_eq!((rotated.width(), rotated.height()), (2, 4));
        let flipped = apply_orientation(img.clone(), 3);
        assert_eq!((flipped.width(), flipped.height()), (4, 2));
        let upright = apply_orientation(img, 1);
        assert_eq!((upright.width(), upright.height()), (4, 2));
    }

    #[test]
    fn test_export_keeps_exif_and_decodes() {
        let source = jpeg_with_orientation(32, 16);
        let exported = export_jpeg(&source, 80).unwrap();

        assert_eq!(read_orientation(&exported), 6);
        let img = image::load_from_memory(&exported).unwrap();
        assert_eq!((img.width(), img.height()), (32, 16));
    }

    #[test]
    fn test_export_without_exif_is_plain_reencode() {
        let exported = export_jpeg(&plain_jpeg(16, 16), 80).unwrap();
        assert!(exif_segment(&exported).is_none());
        assert!(image::load_from_memory(&exported).is_ok());
    }

    #[test]
    fn test_export_rejects_undecodable_source() {
        assert!(matches!(
            export_jpeg(b"definitely not an image", 80),
            Err(ExportError::ImageError(_))
        ));
    }

    #[test]
    fn test_export_asset_copies_videos_byte_for_byte() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("clip.mp4");
        std::fs::write(&source, b"fake container bytes").unwrap();

        let asset = Asset::video(source.to_str().unwrap().to_string(), Utc::now(), 4.0);
        let out_dir = dir.path().join("out");
        let written = export_asset(&asset, &out_dir, 90).unwrap();
        assert_eq!(written.extension().and_then(|e| e.to_str()), Some("mp4"));
        assert_eq!(std::fs::read(written).unwrap(), b"fake container bytes");
    }

    #[test]
    fn test_export_asset_writes_jpeg_for_images() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("photo.jpg");
        std::fs::write(&source, jpeg_with_orientation(24, 24)).unwrap();

        let asset = Asset::image(source.to_str().unwrap().to_string(), Utc::now());
        let written = export_asset(&asset, &dir.path().join("out"), 85).unwrap();

        let bytes = std::fs::read(written).unwrap();
        assert_eq!(read_orientation(&bytes), 6);
    }
}
