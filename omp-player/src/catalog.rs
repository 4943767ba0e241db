//! Catalog provider
//!
//! The catalog is an external collaborator from the engine's point of view:
//! a synchronous source of `MediaItem`s the UI layer queries to build
//! playlists. Filtering and search are simple in-memory predicates; no
//! pagination contract is assumed.

use crate::error::{Error, Result};
use omp_common::{MediaItem, MediaKind};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Filter/search parameters for a catalog query
///
/// All fields are optional; an empty query returns the whole catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    /// Restrict to one media kind
    pub kind: Option<MediaKind>,

    /// Category/genre label; "all" (any case) matches everything
    pub category: Option<String>,

    /// Case-insensitive substring search over title, artist, album and tags
    pub search: Option<String>,

    /// Restrict to featured (or explicitly non-featured) entries
    pub featured: Option<bool>,

    /// Restrict to entries carrying this tag
    pub tag: Option<String>,
}

/// Synchronous catalog source consumed by the playlist layer
pub trait CatalogProvider: Send + Sync {
    /// Items matching the query, in catalog order
    fn query(&self, query: &CatalogQuery) -> Vec<Arc<MediaItem>>;

    /// Look up a single item by id
    fn get(&self, id: Uuid) -> Option<Arc<MediaItem>>;

    /// Distinct category labels, optionally restricted to one kind
    fn categories(&self, kind: Option<MediaKind>) -> Vec<String>;
}

/// In-memory catalog backed by a JSON file or the built-in demo set
#[derive(Debug)]
pub struct StaticCatalog {
    items: Vec<Arc<MediaItem>>,
}

impl StaticCatalog {
    /// Create a catalog from already-normalized items
    pub fn new(items: Vec<MediaItem>) -> Self {
        Self {
            items: items.into_iter().map(Arc::new).collect(),
        }
    }

    /// Load a catalog from a JSON file containing a `MediaItem` array
    ///
    /// Entries without an `id` get one generated, so hand-authored catalog
    /// files stay small.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let items: Vec<MediaItem> = serde_json::from_str(&text)
            .map_err(|e| Error::Catalog(format!("{}: {}", path.display(), e)))?;
        info!("Loaded {} catalog items from {}", items.len(), path.display());
        Ok(Self::new(items))
    }

    /// Built-in demo catalog used when no catalog file is configured
    pub fn demo() -> Self {
        let mut items = vec![
            demo_item(
                MediaKind::Audio,
                "Sunrise Over the Valley",
                "The Platform Lights",
                214.0,
                "afro-fusion",
                true,
                &["upbeat", "morning"],
            ),
            demo_item(
                MediaKind::Audio,
                "Slow Train Home",
                "Amara K.",
                187.0,
                "soul",
                false,
                &["mellow", "evening"],
            ),
            demo_item(
                MediaKind::Audio,
                "Crossing Signals",
                "Benga Brothers",
                242.0,
                "benga",
                true,
                &["dance", "classic"],
            ),
            demo_item(
                MediaKind::Audio,
                "Harbour Lights",
                "Amara K.",
                199.0,
                "soul",
                false,
                &["mellow"],
            ),
            demo_item(
                MediaKind::Video,
                "Night Crossing",
                "J. Odhiambo",
                5403.0,
                "adventure",
                true,
                &["thriller"],
            ),
            demo_item(
                MediaKind::Video,
                "The Long Platform",
                "S. Wanjiru",
                4920.0,
                "romance",
                false,
                &["drama"],
            ),
            demo_item(
                MediaKind::Video,
                "Bouncing Ticket",
                "K. Mutua",
                5160.0,
                "comedy",
                false,
                &["family"],
            ),
        ];

        // Album/year only make sense for the audio entries
        for item in items.iter_mut().filter(|i| i.kind == MediaKind::Audio) {
            item.album = Some("Onboard Sessions Vol. 1".to_string());
            item.year = Some(2023);
        }

        Self::new(items)
    }

    /// Advisory duration for a media URL, for element metadata resolution
    pub fn duration_for_url(&self, url: &str) -> Option<f64> {
        self.items
            .iter()
            .find(|item| item.media_url == url)
            .and_then(|item| item.duration_secs)
    }

    /// Number of catalog entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog has no entries
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn demo_item(
    kind: MediaKind,
    title: &str,
    artist: &str,
    duration_secs: f64,
    category: &str,
    featured: bool,
    tags: &[&str],
) -> MediaItem {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let ext = match kind {
        MediaKind::Audio => "mp3",
        MediaKind::Video => "mp4",
    };

    MediaItem {
        id: Uuid::new_v4(),
        kind,
        title: title.to_string(),
        artist: artist.to_string(),
        duration_secs: Some(duration_secs),
        media_url: format!("https://media.example/{}/{}.{}", kind, slug, ext),
        artwork_url: Some(format!("https://media.example/art/{}.jpg", slug)),
        category: Some(category.to_string()),
        album: None,
        year: None,
        featured,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// Whether an item matches every restriction a query carries
fn matches(item: &MediaItem, query: &CatalogQuery) -> bool {
    if let Some(kind) = query.kind {
        if item.kind != kind {
            return false;
        }
    }

    if let Some(ref category) = query.category {
        // "all" is the UI's no-filter category
        if !category.eq_ignore_ascii_case("all") {
            let matched = item
                .category
                .as_ref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category));
            if !matched {
                return false;
            }
        }
    }

    if let Some(featured) = query.featured {
        if item.featured != featured {
            return false;
        }
    }

    if let Some(ref tag) = query.tag {
        let tagged = item.tags.iter().any(|t| t.eq_ignore_ascii_case(tag));
        if !tagged {
            return false;
        }
    }

    if let Some(ref search) = query.search {
        let needle = search.to_lowercase();
        if !needle.is_empty() {
            let mut haystacks = vec![item.title.to_lowercase(), item.artist.to_lowercase()];
            if let Some(ref album) = item.album {
                haystacks.push(album.to_lowercase());
            }
            haystacks.extend(item.tags.iter().map(|t| t.to_lowercase()));

            if !haystacks.iter().any(|h| h.contains(&needle)) {
                return false;
            }
        }
    }

    true
}

impl CatalogProvider for StaticCatalog {
    fn query(&self, query: &CatalogQuery) -> Vec<Arc<MediaItem>> {
        self.items
            .iter()
            .filter(|item| matches(item, query))
            .cloned()
            .collect()
    }

    fn get(&self, id: Uuid) -> Option<Arc<MediaItem>> {
        self.items.iter().find(|item| item.id == id).cloned()
    }

    fn categories(&self, kind: Option<MediaKind>) -> Vec<String> {
        let mut labels: Vec<String> = self
            .items
            .iter()
            .filter(|item| kind.is_none() || Some(item.kind) == kind)
            .filter_map(|item| item.category.clone())
            .collect();
        labels.sort();
        labels.dedup();
        labels
    }
}
