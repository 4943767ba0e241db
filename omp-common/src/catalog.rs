//! Catalog item types
//!
//! One normalized `MediaItem` shape covers every provider and both media
//! kinds. Provider-specific track/video shapes are converted into this type
//! at the catalog boundary; the playback engine never sees raw provider data.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Media kind for a catalog entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// One playable catalog entry (audio track or video)
///
/// Immutable once loaded from the catalog. Shared by reference
/// (`Arc<MediaItem>`) between the catalog provider and the playlist cursor.
///
/// `duration_secs` is advisory catalog metadata; the authoritative duration
/// for transport display is whatever the media element reports once its
/// metadata loads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaItem {
    /// Stable identifier (generated when the catalog source has none)
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Media kind (audio track or video)
    pub kind: MediaKind,

    /// Display title
    pub title: String,

    /// Artist or author label
    pub artist: String,

    /// Advisory duration in seconds from catalog metadata
    #[serde(default)]
    pub duration_secs: Option<f64>,

    /// Playable URL (may be empty for entries without a source yet)
    pub media_url: String,

    /// Artwork/thumbnail URL
    #[serde(default)]
    pub artwork_url: Option<String>,

    /// Genre or category label ("romance", "comedy", "gospel", ...)
    #[serde(default)]
    pub category: Option<String>,

    /// Album name (audio entries)
    #[serde(default)]
    pub album: Option<String>,

    /// Release year
    #[serde(default)]
    pub year: Option<u32>,

    /// Featured in the catalog's highlight rail
    #[serde(default)]
    pub featured: bool,

    /// Free-form search tags
    #[serde(default)]
    pub tags: Vec<String>,
}
