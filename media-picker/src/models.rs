use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Media kind of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Stable string form used by the catalog schema
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    pub fn parse(s: &str) -> Option<MediaKind> {
        match s {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }
}

/// Kind restriction for a picking session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KindFilter {
    Any,
    Image,
    Video,
}

/// Restricts which assets a picking session sees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaFilter {
    pub kind: KindFilter,
    /// Maximum video duration in seconds; None disables the ceiling
    pub max_video_seconds: Option<f64>,
}

impl Default for MediaFilter {
    fn default() -> Self {
        Self {
            kind: KindFilter::Any,
            max_video_seconds: None,
        }
    }
}

impl MediaFilter {
    /// Decides whether an asset passes the filter.
    ///
    /// The duration ceiling only ever excludes videos: with `KindFilter::Any`
    /// an over-long video is dropped while every image is kept.
    pub fn matches(&self, asset: &Asset) -> bool {
        let kind_ok = match self.kind {
            KindFilter::Any => true,
            KindFilter::Image => asset.kind == MediaKind::Image,
            KindFilter::Video => asset.kind == MediaKind::Video,
        };
        if !kind_ok {
            return false;
        }
        if asset.kind == MediaKind::Video {
            if let Some(ceiling) = self.max_video_seconds {
                return asset.duration <= ceiling;
            }
        }
        true
    }
}

/// A single photo or video in the library.
///
/// Assets are cheap metadata records; pixel data stays with the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub kind: MediaKind,
    /// Duration in seconds, 0.0 for images
    pub duration: f64,
    pub created_at: DateTime<Utc>,
    pub file_path: String,
    pub width: u32,
    pub height: u32,
    pub favorite: bool,
    /// High-frame-rate video (slo-mo badge in the grid)
    pub slomo: bool,
    pub panorama: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burst_id: Option<String>,
}

impl Asset {
    /// Creates an image asset with a fresh id and no subtype flags
    pub fn image(file_path: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: MediaKind::Image,
            duration: 0.0,
            created_at,
            file_path: file_path.into(),
            width: 0,
            height: 0,
            favorite: false,
            slomo: false,
            panorama: false,
            burst_id: None,
        }
    }

    /// Creates a video asset with a fresh id and the given duration
    pub fn video(file_path: impl Into<String>, created_at: DateTime<Utc>, duration: f64) -> Self {
        Self {
            kind: MediaKind::Video,
            duration,
            ..Self::image(file_path, created_at)
        }
    }
}

impl<'r> TryFrom<&Row<'r>> for Asset {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'r>) -> Result<Self, Self::Error> {
        let uuid_str: String = row.get(0)?;
        let kind_str: String = row.get(1)?;
        let file_path: String = row.get(2)?;
        let duration: f64 = row.get(3)?;
        let created_at: DateTime<Utc> = row.get(4)?;
        let width: u32 = row.get(5)?;
        let height: u32 = row.get(6)?;
        let favorite: bool = row.get(7)?;
        let slomo: bool = row.get(8)?;
        let burst_id: Option<String> = row.get(9)?;

        let id = Uuid::parse_str(&uuid_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Asset {
            id,
            kind: MediaKind::parse(&kind_str).unwrap_or(MediaKind::Image),
            duration,
            created_at,
            file_path,
            width,
            height,
            favorite,
            slomo,
            // Wide enough counts as a panorama, no stored flag
            panorama: height > 0 && width >= 2 * height,
            burst_id,
        })
    }
}

/// Smart album groupings derived by the library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmartAlbumKind {
    UserLibrary,
    Favorites,
    RecentlyAdded,
    Panoramas,
    Videos,
    SlomoVideos,
    Bursts,
}

impl SmartAlbumKind {
    pub const ALL: [SmartAlbumKind; 7] = [
        SmartAlbumKind::UserLibrary,
        SmartAlbumKind::Favorites,
        SmartAlbumKind::RecentlyAdded,
        SmartAlbumKind::Panoramas,
        SmartAlbumKind::Videos,
        SmartAlbumKind::SlomoVideos,
        SmartAlbumKind::Bursts,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SmartAlbumKind::UserLibrary => "All Photos",
            SmartAlbumKind::Favorites => "Favorites",
            SmartAlbumKind::RecentlyAdded => "Recently Added",
            SmartAlbumKind::Panoramas => "Panoramas",
            SmartAlbumKind::Videos => "Videos",
            SmartAlbumKind::SlomoVideos => "Slo-mo",
            SmartAlbumKind::Bursts => "Bursts",
        }
    }
}

/// Album identity: a fixed smart grouping or a user-created album
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlbumId {
    Smart(SmartAlbumKind),
    User(Uuid),
}

/// One row of the album browser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    /// Asset count under the session's media filter
    pub count: usize,
    /// Up to three trailing asset ids, most recent first
    pub recent_thumbnails: Vec<Uuid>,
}

/// Selection limits for one picking session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    pub minimum: usize,
    /// 0 = unbounded
    pub maximum: usize,
    pub allows_multiple: bool,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            minimum: 1,
            maximum: 0,
            allows_multiple: false,
        }
    }
}

/// Host configuration for a picking session
#[derive(Debug, Clone, PartialEq)]
pub struct PickerOptions {
    pub filter: MediaFilter,
    pub policy: SelectionPolicy,
    /// Assets selected before the session is presented
    pub initial_selection: Vec<Asset>,
    pub columns_portrait: u32,
    pub columns_landscape: u32,
    /// Recognized smart albums, in display priority order
    pub smart_album_priority: Vec<SmartAlbumKind>,
    /// Show a running "N selected" label in the toolbar
    pub shows_selection_count: bool,
    pub prompt: Option<String>,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            filter: MediaFilter::default(),
            policy: SelectionPolicy::default(),
            initial_selection: Vec::new(),
            columns_portrait: 4,
            columns_landscape: 7,
            smart_album_priority: vec![
                SmartAlbumKind::UserLibrary,
                SmartAlbumKind::RecentlyAdded,
                SmartAlbumKind::Panoramas,
                SmartAlbumKind::Videos,
                SmartAlbumKind::Bursts,
            ],
            shows_selection_count: false,
            prompt: None,
        }
    }
}

/// Formats a video duration for the grid badge.
///
/// Zero-padded positional style: "mm:ss", or "hh:mm:ss" from one hour up.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.round().max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Footer summary line under the asset grid
pub fn media_summary(images: usize, videos: usize, filter: KindFilter) -> String {
    let photos_part = if images == 1 {
        format!("{} Photo", images)
    } else {
        format!("{} Photos", images)
    };
    let videos_part = if videos == 1 {
        format!("{} Video", videos)
    } else {
        format!("{} Videos", videos)
    };
    match filter {
        KindFilter::Any => format!("{}, {}", photos_part, videos_part),
        KindFilter::Image => photos_part,
        KindFilter::Video => videos_part,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(duration: f64) -> Asset {
        Asset::video("/tmp/v.mp4", Utc::now(), duration)
    }

    #[test]
    fn test_format_duration_pads_minutes_and_seconds() {
        assert_eq!(format_duration(34.0), "00:34");
        assert_eq!(format_duration(65.0), "01:05");
        assert_eq!(format_duration(0.0), "00:00");
    }

    #[test]
    fn test_format_duration_adds_hours_from_3600() {
        assert_eq!(format_duration(3661.0), "01:01:01");
        assert_eq!(format_duration(3599.0), "59:59");
        // Rounding happens before the hour check
        assert_eq!(format_duration(3599.7), "01:00:00");
    }

    #[test]
    fn test_filter_any_with_ceiling_keeps_images() {
        let filter = MediaFilter {
            kind: KindFilter::Any,
            max_video_seconds: Some(100.0),
        };
        assert!(filter.matches(&Asset::image("/tmp/p.jpg", Utc::now())));
        assert!(filter.matches(&video(100.0)));
        assert!(!filter.matches(&video(100.5)));
    }

    #[test]
    fn test_filter_by_kind() {
        let images_only = MediaFilter {
            kind: KindFilter::Image,
            max_video_seconds: None,
        };
        assert!(!images_only.matches(&video(5.0)));
        assert!(images_only.matches(&Asset::image("/tmp/p.jpg", Utc::now())));

        let videos_only = MediaFilter {
            kind: KindFilter::Video,
            max_video_seconds: Some(10.0),
        };
        assert!(videos_only.matches(&video(10.0)));
        assert!(!videos_only.matches(&video(11.0)));
        assert!(!videos_only.matches(&Asset::image("/tmp/p.jpg", Utc::now())));
    }

    #[test]
    fn test_media_summary_pluralization() {
        assert_eq!(media_summary(1, 1, KindFilter::Any), "1 Photo, 1 Video");
        assert_eq!(media_summary(3, 1, KindFilter::Any), "3 Photos, 1 Video");
        assert_eq!(media_summary(3, 2, KindFilter::Any), "3 Photos, 2 Videos");
        assert_eq!(media_summary(1, 0, KindFilter::Image), "1 Photo");
        assert_eq!(media_summary(0, 5, KindFilter::Video), "5 Videos");
    }
}
